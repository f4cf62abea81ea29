//! Outbound click counting for the redirect endpoint.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Counts redirects per target URL. Owned by the caller and injected into
/// the redirect handler.
pub trait ClickCounter: Send + Sync {
    /// Record one click and return the new total for `url`.
    fn increment(&self, url: &str) -> u64;
    fn get(&self, url: &str) -> u64;
    /// All totals, highest first (ties by url).
    fn snapshot(&self) -> Vec<(String, u64)>;
}

/// Process-local counter; totals are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryClickCounter {
    inner: Mutex<HashMap<String, u64>>,
}

impl InMemoryClickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }
}

impl ClickCounter for InMemoryClickCounter {
    fn increment(&self, url: &str) -> u64 {
        let mut map = self.lock();
        let n = map.entry(url.to_string()).or_insert(0);
        *n += 1;
        *n
    }

    fn get(&self, url: &str) -> u64 {
        let map = self.lock();
        map.get(url).copied().unwrap_or(0)
    }

    fn snapshot(&self) -> Vec<(String, u64)> {
        let map = self.lock();
        let mut v: Vec<(String, u64)> = map.iter().map(|(k, &n)| (k.clone(), n)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn increments_per_url() {
        let c = InMemoryClickCounter::new();
        assert_eq!(c.increment("https://a"), 1);
        assert_eq!(c.increment("https://a"), 2);
        assert_eq!(c.increment("https://b"), 1);
        assert_eq!(c.get("https://a"), 2);
        assert_eq!(c.get("https://zzz"), 0);
        assert_eq!(
            c.snapshot(),
            vec![("https://a".to_string(), 2), ("https://b".to_string(), 1)]
        );
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let c = Arc::new(InMemoryClickCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        c.increment("https://hot");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.get("https://hot"), 800);
    }
}
