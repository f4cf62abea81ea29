// src/ingest/types.rs
use anyhow::Result;

use crate::member::Member;

/// Where an ingestion result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrigin {
    Feed,
    Fallback,
}

/// Deduplicated members plus the source used.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub members: Vec<Member>,
    pub origin: FeedOrigin,
}

/// A provider of raw CSV feed text.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
    fn name(&self) -> &'static str;
}
