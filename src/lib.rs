// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod clicks;
pub mod config;
pub mod ingest;
pub mod member;
pub mod metrics;
pub mod query;
pub mod rank;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::ingest::{dedupe_by_url, fetch_members, parse_csv, RANK_TAG};
pub use crate::member::{Category, Member, Price};
pub use crate::rank::{compute_rank, hotness, sort_members, SortMode};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber. Filter from `RUST_LOG`, defaulting to
/// this crate at info and everything else at warn. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ai_tool_rank=info,ingest=info,clicks=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
