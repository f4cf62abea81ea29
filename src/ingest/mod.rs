// src/ingest/mod.rs
pub mod fallback;
pub mod feed;
pub mod parse;
pub mod types;

pub use fallback::fallback_members;
pub use parse::{parse_csv, parse_csv_with_stats, ParseStats};
pub use types::{FeedOrigin, FeedSource, Ingested};

use crate::member::Member;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Cache tag under which ingested members are stored; revalidation targets it.
pub const RANK_TAG: &str = "rank-members";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_rows_total", "Data rows read from the feed.");
        describe_counter!(
            "ingest_dropped_total",
            "Feed rows dropped for missing id/name/url."
        );
        describe_counter!(
            "ingest_dedup_total",
            "Members collapsed by url deduplication."
        );
        describe_counter!(
            "ingest_feed_errors_total",
            "Feed fetch errors (network or non-OK status)."
        );
        describe_counter!(
            "ingest_fallback_total",
            "Ingest runs that used the embedded fallback dataset."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_histogram!("ingest_fetch_ms", "Feed fetch time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when ingestion last ran."
        );
    });
}

/// Collapse members sharing a `url`.
///
/// Keys keep the position of their first occurrence; the value is the
/// last occurrence's record.
pub fn dedupe_by_url(members: Vec<Member>) -> Vec<Member> {
    let mut slot_by_url: HashMap<String, usize> = HashMap::with_capacity(members.len());
    let mut out: Vec<Member> = Vec::with_capacity(members.len());

    for m in members {
        match slot_by_url.get(&m.url) {
            Some(&slot) => out[slot] = m,
            None => {
                slot_by_url.insert(m.url.clone(), out.len());
                out.push(m);
            }
        }
    }

    out
}

/// Load members from `feed`, falling back to the embedded dataset when the
/// feed is disabled, unreachable or yields no valid rows. Never fails.
pub async fn fetch_members(feed: Option<&dyn FeedSource>) -> Ingested {
    ensure_metrics_described();

    let mut members = Vec::new();
    if let Some(feed) = feed {
        match feed.fetch().await {
            Ok(text) => {
                let t0 = std::time::Instant::now();
                let (parsed, stats) = parse_csv_with_stats(&text);
                histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
                counter!("ingest_rows_total").increment(stats.rows as u64);
                counter!("ingest_dropped_total").increment(stats.dropped as u64);

                tracing::info!(
                    target: "ingest",
                    feed = feed.name(),
                    rows = stats.rows,
                    kept = stats.kept,
                    dropped = stats.dropped,
                    "loaded members from feed"
                );
                members = parsed;
            }
            Err(e) => {
                tracing::warn!(error = ?e, feed = feed.name(), "feed fetch failed");
                counter!("ingest_feed_errors_total").increment(1);
            }
        }
    }

    let origin = if members.is_empty() {
        members = fallback_members();
        counter!("ingest_fallback_total").increment(1);
        tracing::info!(target: "ingest", count = members.len(), "using fallback members");
        FeedOrigin::Fallback
    } else {
        FeedOrigin::Feed
    };

    let before = members.len();
    let members = dedupe_by_url(members);
    counter!("ingest_dedup_total").increment((before - members.len()) as u64);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    Ingested { members, origin }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::feed::StaticFeed;

    fn m(id: &str, url: &str) -> Member {
        Member::new(id, id.to_uppercase(), url)
    }

    #[test]
    fn dedup_keeps_first_position_and_last_value() {
        let input = vec![m("a", "u1"), m("b", "u2"), m("c", "u1"), m("d", "u3"), m("e", "u2")];
        let out = dedupe_by_url(input);
        let ids: Vec<_> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "e", "d"]);
    }

    #[test]
    fn dedup_of_unique_input_is_identity() {
        let input = vec![m("a", "u1"), m("b", "u2")];
        assert_eq!(dedupe_by_url(input.clone()), input);
    }

    #[tokio::test]
    async fn feed_rows_are_parsed_and_deduplicated() {
        let feed = StaticFeed::new("id,name,url\n1,Foo,http://x\n,Bad,http://y\n2,Baz,http://x");
        let got = fetch_members(Some(&feed)).await;
        assert_eq!(got.origin, FeedOrigin::Feed);
        assert_eq!(got.members.len(), 1);
        assert_eq!(got.members[0].id, "2");
        assert_eq!(got.members[0].name, "Baz");
    }

    #[tokio::test]
    async fn disabled_feed_uses_fallback() {
        let got = fetch_members(None).await;
        assert_eq!(got.origin, FeedOrigin::Fallback);
        assert_eq!(got.members, fallback_members());
    }

    #[tokio::test]
    async fn feed_without_valid_rows_uses_fallback() {
        let feed = StaticFeed::new("id,name,url\n,NoId,http://y");
        let got = fetch_members(Some(&feed)).await;
        assert_eq!(got.origin, FeedOrigin::Fallback);
        assert!(!got.members.is_empty());
    }
}
