//! # Pool Statistics
//!
//! Hit/miss counters shared between pools. A single `Arc<PoolStats>` can be
//! handed to every pool of a subsystem to get one aggregate view.

use std::sync::atomic::{AtomicU64, Ordering};

/// Observability counters for one or more pools.
#[derive(Debug, Default)]
pub struct PoolStats {
    /// `get` calls served from the available list.
    hits: AtomicU64,
    /// `get` calls that had to construct new objects first.
    misses: AtomicU64,
    /// Objects constructed by factories.
    created: AtomicU64,
    /// Successful releases.
    released: AtomicU64,
    /// Releases dropped because a capacity cap was reached.
    dropped: AtomicU64,
}

impl PoolStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_created(&self, count: u64) {
        self.created.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.created.store(0, Ordering::Relaxed);
        self.released.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
    }
}

/// Plain copy of [`PoolStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// `get` calls served from the available list.
    pub hits: u64,
    /// `get` calls that had to construct new objects first.
    pub misses: u64,
    /// Objects constructed by factories.
    pub created: u64,
    /// Successful releases.
    pub released: u64,
    /// Releases dropped because a capacity cap was reached.
    pub dropped: u64,
}

impl PoolStatsSnapshot {
    /// Fraction of `get` calls served without construction (1.0 when idle).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            1.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Sums two snapshots.
    #[must_use]
    pub fn merged(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            created: self.created + other.created,
            released: self.released + other.released,
            dropped: self.dropped + other.dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_idle_is_one() {
        assert!((PoolStatsSnapshot::default().hit_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counters_and_reset() {
        let stats = PoolStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_created(8);

        let snap = stats.snapshot();
        assert_eq!(snap.hits, 3);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.created, 8);
        assert!((snap.hit_rate() - 0.75).abs() < 1e-9);

        stats.reset();
        assert_eq!(stats.snapshot(), PoolStatsSnapshot::default());
    }
}
