//! # Ranking
//!
//! Orders catalog members. The default `hot` mode blends three signals,
//! each min-max normalised over the whole input:
//!
//! - `clicks7d` (missing → 0), weight 0.6
//! - `score` (missing → 0), weight 0.3
//! - `createdAt` timestamp, weight 0.1; min/max only over parseable dates,
//!   unparseable or missing dates contribute 0
//!
//! Hotness is returned as a side table aligned with the input; members are
//! never mutated. All orderings are stable.

pub mod normalize;

use std::cmp::Ordering;

use crate::member::Member;
pub use normalize::{min_max, minmax_normalise, parse_timestamp};

pub const W_CLICKS: f64 = 0.6;
pub const W_SCORE: f64 = 0.3;
pub const W_RECENCY: f64 = 0.1;

/// Requested ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Hot,
    Recent,
    Clicks,
    Score,
    /// Unknown mode: input order is kept.
    Unsorted,
}

impl SortMode {
    pub fn from_param(s: &str) -> Self {
        match s {
            "hot" => SortMode::Hot,
            "recent" => SortMode::Recent,
            "clicks" => SortMode::Clicks,
            "score" => SortMode::Score,
            _ => SortMode::Unsorted,
        }
    }
}

/// Millis since epoch, 0 when missing or unparseable.
pub fn created_at_millis(m: &Member) -> i64 {
    m.created_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(0)
}

/// Hotness per member, aligned with `members`.
pub fn hotness(members: &[Member]) -> Vec<f64> {
    if members.is_empty() {
        return Vec::new();
    }

    let clicks: Vec<f64> = members.iter().map(|m| m.clicks_7d.unwrap_or(0.0)).collect();
    let scores: Vec<f64> = members.iter().map(|m| m.score.unwrap_or(0.0)).collect();
    let dates: Vec<Option<f64>> = members
        .iter()
        .map(|m| m.created_at.as_deref().and_then(parse_timestamp).map(|t| t as f64))
        .collect();

    let (min_c, max_c) = min_max(clicks.iter().copied()).unwrap_or_default();
    let (min_s, max_s) = min_max(scores.iter().copied()).unwrap_or_default();
    let date_range = min_max(dates.iter().flatten().copied());

    clicks
        .iter()
        .zip(&scores)
        .zip(&dates)
        .map(|((&c, &s), d)| {
            let n_clicks = minmax_normalise(c, min_c, max_c);
            let n_score = minmax_normalise(s, min_s, max_s);
            let n_date = match (d, date_range) {
                (Some(t), Some((lo, hi))) => minmax_normalise(*t, lo, hi),
                _ => 0.0,
            };
            W_CLICKS * n_clicks + W_SCORE * n_score + W_RECENCY * n_date
        })
        .collect()
}

/// Sort by descending hotness. Ties keep input order.
pub fn compute_rank(members: Vec<Member>) -> Vec<Member> {
    let scores = hotness(&members);
    let mut paired: Vec<(f64, Member)> = scores.into_iter().zip(members).collect();
    paired.sort_by(|a, b| b.0.total_cmp(&a.0));
    paired.into_iter().map(|(_, m)| m).collect()
}

/// Order members by `mode`.
pub fn sort_members(mut members: Vec<Member>, mode: SortMode) -> Vec<Member> {
    match mode {
        SortMode::Hot => return compute_rank(members),
        SortMode::Recent => members.sort_by_key(|m| std::cmp::Reverse(created_at_millis(m))),
        SortMode::Clicks => members.sort_by(|a, b| desc(a.clicks_7d, b.clicks_7d)),
        SortMode::Score => members.sort_by(|a, b| desc(a.score, b.score)),
        SortMode::Unsorted => {}
    }
    members
}

fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}
