//! Fetch statistics tracking.
//!
//! Thread-safe counters for fetch outcomes. The legacy fetch helpers hide every
//! failure from the caller, so these counters are the only record of why a
//! fetch came back empty.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FetchErrorKind;

/// Thread-safe fetch statistics tracker.
///
/// Every `FetchErrorKind` is initialized to zero on creation, so lookups never
/// miss. Share across tasks with `Arc`.
pub struct FetchStats {
    failures: HashMap<FetchErrorKind, AtomicUsize>,
    successes: AtomicUsize,
}

impl FetchStats {
    /// Creates a tracker with all counters at zero.
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FetchErrorKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }

        FetchStats {
            failures,
            successes: AtomicUsize::new(0),
        }
    }

    /// Increment a failure counter.
    pub fn increment_failure(&self, kind: FetchErrorKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map. \
                 This indicates a bug in FetchStats initialization.",
                kind
            );
        }
    }

    /// Record a fetch that returned a body.
    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the count for a failure category.
    pub fn get_failure_count(&self, kind: FetchErrorKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of successful fetches.
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    /// Total failures across all categories.
    pub fn total_failures(&self) -> usize {
        self.failures
            .values()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    /// Logs a one-line summary of non-zero counters at info level.
    pub fn log_summary(&self) {
        let mut parts: Vec<String> = FetchErrorKind::iter()
            .filter_map(|kind| {
                let count = self.get_failure_count(kind);
                (count > 0).then(|| format!("{}={}", kind.as_str(), count))
            })
            .collect();
        parts.sort();
        log::info!(
            "Fetch summary: {} succeeded, {} failed{}{}",
            self.successes(),
            self.total_failures(),
            if parts.is_empty() { "" } else { " - " },
            parts.join(", ")
        );
    }
}

impl Default for FetchStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_stats_initialization() {
        let stats = FetchStats::new();
        for kind in FetchErrorKind::iter() {
            assert_eq!(stats.get_failure_count(kind), 0);
        }
        assert_eq!(stats.successes(), 0);
        assert_eq!(stats.total_failures(), 0);
    }

    #[test]
    fn test_fetch_stats_multiple_increments() {
        let stats = FetchStats::new();
        stats.increment_failure(FetchErrorKind::Connect);
        stats.increment_failure(FetchErrorKind::Connect);
        stats.increment_failure(FetchErrorKind::Timeout);
        stats.record_success();

        assert_eq!(stats.get_failure_count(FetchErrorKind::Connect), 2);
        assert_eq!(stats.get_failure_count(FetchErrorKind::Timeout), 1);
        assert_eq!(stats.total_failures(), 3);
        assert_eq!(stats.successes(), 1);
    }

    #[test]
    fn test_fetch_stats_concurrent_increments() {
        let stats = std::sync::Arc::new(FetchStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = std::sync::Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.increment_failure(FetchErrorKind::Request);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert_eq!(stats.get_failure_count(FetchErrorKind::Request), 800);
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        let stats = FetchStats::new();
        stats.log_summary();
        stats.increment_failure(FetchErrorKind::HttpServerError);
        stats.log_summary();
    }
}
