// src/ingest/fallback.rs
//! Embedded fallback dataset, used whenever the feed yields no valid rows.

use once_cell::sync::Lazy;

use crate::member::Member;

const SAMPLE_MEMBERS_JSON: &str = include_str!("../../data/sample_members.json");

static SAMPLE_MEMBERS: Lazy<Vec<Member>> = Lazy::new(|| {
    match serde_json::from_str::<Vec<Member>>(SAMPLE_MEMBERS_JSON) {
        Ok(v) => v.into_iter().filter(Member::is_valid).collect(),
        Err(e) => {
            tracing::error!(error = ?e, "embedded sample members are malformed");
            Vec::new()
        }
    }
});

/// A fresh copy of the fallback dataset.
pub fn fallback_members() -> Vec<Member> {
    SAMPLE_MEMBERS.clone()
}
