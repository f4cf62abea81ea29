//! # Member cache
//! Holds the last ingestion result for a freshness window (absolute TTL, no
//! sliding refresh). Revalidation drops the entry by tag so the next read
//! reloads from the feed.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use crate::ingest::{Ingested, RANK_TAG};

#[derive(Debug)]
struct Entry {
    loaded_at: Instant,
    value: Ingested,
}

#[derive(Debug, Default)]
struct Slot {
    /// Bumped on every invalidation; a load only stores its result if this
    /// is unchanged since it started.
    generation: u64,
    entry: Option<Entry>,
}

#[derive(Debug)]
pub struct MemberCache {
    ttl: Duration,
    inner: RwLock<Slot>,
    // Held across a load so concurrent misses share one feed fetch.
    load_lock: Mutex<()>,
}

impl MemberCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(Slot::default()),
            load_lock: Mutex::new(()),
        }
    }

    /// Fresh cached value and the current generation.
    async fn lookup(&self) -> (Option<Ingested>, u64) {
        let slot = self.inner.read().await;
        let value = slot
            .entry
            .as_ref()
            .filter(|e| e.loaded_at.elapsed() < self.ttl)
            .map(|e| e.value.clone());
        (value, slot.generation)
    }

    /// Cached value while fresh, else run `loader` and store its result.
    ///
    /// A result whose load overlapped an [`invalidate`](Self::invalidate) is
    /// returned to its caller but not stored.
    pub async fn get_or_load<F, Fut>(&self, loader: F) -> Ingested
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Ingested>,
    {
        if let (Some(value), _) = self.lookup().await {
            metrics::counter!("member_cache_hits_total").increment(1);
            return value;
        }

        let _flight = self.load_lock.lock().await;
        let (cached, generation) = self.lookup().await;
        if let Some(value) = cached {
            metrics::counter!("member_cache_hits_total").increment(1);
            return value;
        }

        metrics::counter!("member_cache_misses_total").increment(1);
        let fresh = loader().await;

        let mut slot = self.inner.write().await;
        if slot.generation == generation {
            slot.entry = Some(Entry {
                loaded_at: Instant::now(),
                value: fresh.clone(),
            });
        } else {
            tracing::debug!("discarding member load superseded by invalidation");
        }
        fresh
    }

    /// Drop the cached entry if `tag` names it. Returns whether it matched.
    pub async fn invalidate(&self, tag: &str) -> bool {
        if tag != RANK_TAG {
            return false;
        }
        let mut slot = self.inner.write().await;
        slot.generation += 1;
        slot.entry = None;
        tracing::info!(tag, generation = slot.generation, "member cache invalidated");
        true
    }

    pub async fn is_warm(&self) -> bool {
        self.lookup().await.0.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FeedOrigin;
    use crate::member::Member;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn ingested(id: &str) -> Ingested {
        Ingested {
            members: vec![Member::new(id, id, format!("https://{id}"))],
            origin: FeedOrigin::Feed,
        }
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = MemberCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let loads = &counter;

        for _ in 0..3 {
            let got = cache
                .get_or_load(move || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    ingested("a")
                })
                .await;
            assert_eq!(got.members[0].id, "a");
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(cache.is_warm().await);
    }

    #[tokio::test]
    async fn invalidate_by_tag_forces_reload() {
        let cache = MemberCache::new(Duration::from_secs(60));
        cache.get_or_load(|| async { ingested("old") }).await;

        assert!(!cache.invalidate("other-tag").await);
        assert!(cache.is_warm().await);

        assert!(cache.invalidate(RANK_TAG).await);
        assert!(!cache.is_warm().await);

        let got = cache.get_or_load(|| async { ingested("new") }).await;
        assert_eq!(got.members[0].id, "new");
    }

    #[tokio::test]
    async fn zero_ttl_always_reloads() {
        let cache = MemberCache::new(Duration::ZERO);
        cache.get_or_load(|| async { ingested("one") }).await;
        let got = cache.get_or_load(|| async { ingested("two") }).await;
        assert_eq!(got.members[0].id, "two");
    }

    #[tokio::test]
    async fn invalidation_during_load_is_not_overwritten() {
        let cache = MemberCache::new(Duration::from_secs(60));
        let started = Notify::new();
        let release = Notify::new();
        let (started_ref, release_ref) = (&started, &release);

        let slow_load = cache.get_or_load(move || async move {
            started_ref.notify_one();
            release_ref.notified().await;
            ingested("stale")
        });
        let revalidate = async {
            started.notified().await;
            assert!(cache.invalidate(RANK_TAG).await);
            release.notify_one();
        };
        let (in_flight, ()) = tokio::join!(slow_load, revalidate);
        assert_eq!(in_flight.members[0].id, "stale");
        assert!(!cache.is_warm().await);

        let got = cache.get_or_load(|| async { ingested("fresh") }).await;
        assert_eq!(got.members[0].id, "fresh");
    }

    #[tokio::test]
    async fn concurrent_cold_reads_share_one_load() {
        let cache = MemberCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            ingested("a")
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_load(load),
            cache.get_or_load(load),
            cache.get_or_load(load),
        );
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        for got in [a, b, c] {
            assert_eq!(got.members[0].id, "a");
        }
    }
}
