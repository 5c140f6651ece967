//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters the buffer pool maintains about its own behavior.
///
/// All counters are atomic and updated with `Ordering::Relaxed`: each only
/// needs atomicity, not synchronization with the others, so a snapshot may
/// be momentarily inconsistent across counters. That is fine for what these
/// feed (logging and cache-effectiveness checks, not control flow).
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    write_backs: AtomicU64,
}

impl BufferPoolStats {
    /// Create a tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A requested page was already cached.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A requested page had to be decoded from its heap file.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A cached page was dropped to make room.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// A dirty page was written back to its heap file.
    pub fn record_write_back(&self) {
        self.write_backs.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of page requests served from the cache, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// A non-atomic copy of the counters for display and assertions.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            write_backs: self.write_backs.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub write_backs: u64,
}

impl StatsSnapshot {
    /// Fraction of page requests served from the cache, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool stats: {} hits / {} misses ({:.1}% hit rate), {} evictions, {} write-backs",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.evictions,
            self.write_backs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = BufferPoolStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.hits, 0);
        assert_eq!(snap.misses, 0);
        assert_eq!(snap.evictions, 0);
        assert_eq!(snap.write_backs, 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = BufferPoolStats::new();
        for _ in 0..7 {
            stats.record_hit();
        }
        for _ in 0..3 {
            stats.record_miss();
        }
        assert_eq!(stats.hit_rate(), 0.7);
    }

    #[test]
    fn test_display() {
        let stats = BufferPoolStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();

        let rendered = format!("{}", stats.snapshot());
        assert!(rendered.contains("1 hits / 1 misses"));
        assert!(rendered.contains("50.0% hit rate"));
        assert!(rendered.contains("1 evictions"));
    }
}
