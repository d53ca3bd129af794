//! Scan counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the cursors of one scan context.
#[derive(Debug, Default)]
pub struct ScanStats {
    traversals: AtomicU64,
    opens: AtomicU64,
    rows: AtomicU64,
}

impl ScanStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one step of a scan.
    #[inline]
    pub fn record_traversal(&self) {
        self.traversals.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one cursor open.
    #[inline]
    pub fn record_open(&self) {
        self.opens.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one row returned.
    #[inline]
    pub fn record_row(&self) {
        self.rows.fetch_add(1, Ordering::Relaxed);
    }

    /// Steps taken, including the final one that found nothing.
    pub fn traversals(&self) -> u64 {
        self.traversals.load(Ordering::Relaxed)
    }

    /// Cursor opens.
    pub fn opens(&self) -> u64 {
        self.opens.load(Ordering::Relaxed)
    }

    /// Rows returned.
    pub fn rows(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        self.traversals.store(0, Ordering::Relaxed);
        self.opens.store(0, Ordering::Relaxed);
        self.rows.store(0, Ordering::Relaxed);
    }
}

impl std::fmt::Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ScanStats {{ traversals: {}, opens: {}, rows: {} }}",
            self.traversals(),
            self.opens(),
            self.rows()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = ScanStats::new();
        stats.record_open();
        stats.record_traversal();
        stats.record_traversal();
        stats.record_row();
        assert_eq!(stats.opens(), 1);
        assert_eq!(stats.traversals(), 2);
        assert_eq!(stats.rows(), 1);
        assert!(stats.to_string().contains("traversals: 2"));
        stats.reset();
        assert_eq!(stats.traversals(), 0);
    }
}
