//! Page store statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by a page store.
///
/// Counters are atomic so `get`, which only borrows the store, can still
/// count reads.
///
/// # Example
/// ```
/// use cowtree::StoreStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = StoreStats::new();
/// stats.pages_allocated.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().live_pages(), 1);
/// ```
#[derive(Debug)]
pub struct StoreStats {
    /// Number of `get` calls.
    pub pages_read: AtomicU64,

    /// Number of `allocate` calls.
    pub pages_allocated: AtomicU64,

    /// Number of `deallocate` calls.
    pub pages_freed: AtomicU64,
}

impl StoreStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            pages_read: AtomicU64::new(0),
            pages_allocated: AtomicU64::new(0),
            pages_freed: AtomicU64::new(0),
        }
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_allocated: self.pages_allocated.load(Ordering::Relaxed),
            pages_freed: self.pages_freed.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.pages_read.store(0, Ordering::Relaxed);
        self.pages_allocated.store(0, Ordering::Relaxed);
        self.pages_freed.store(0, Ordering::Relaxed);
    }
}

impl Default for StoreStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`StoreStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub pages_read: u64,
    pub pages_allocated: u64,
    pub pages_freed: u64,
}

impl StatsSnapshot {
    /// Pages allocated and not yet freed.
    pub fn live_pages(&self) -> u64 {
        self.pages_allocated.saturating_sub(self.pages_freed)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ reads: {}, allocated: {}, freed: {}, live: {} }}",
            self.pages_read,
            self.pages_allocated,
            self.pages_freed,
            self.live_pages()
        )
    }
}
