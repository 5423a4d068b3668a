//! Progress tracking for export operations
//!
//! This module provides a progress bar for the fetch phase, giving users
//! real-time feedback on how many records have been pulled from the index.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Sentinel for "total not known yet"
const UNKNOWN_TOTAL: u64 = u64::MAX;

/// Progress tracker for export operations
///
/// Tracks record fetching progress and displays a progress bar with speed.
/// The total is usually only known after the first page arrives, so the
/// tracker starts as a spinner and switches to a bar once it is set.
pub struct ProgressTracker {
    /// Number of records fetched so far
    processed: AtomicU64,
    /// Total reported by the backend
    total: AtomicU64,
    /// Start time of the operation
    start_time: Instant,
    /// Progress bar (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `total` - Total number of records if known (None for unknown)
    /// * `enable_bar` - Whether to display a progress bar
    ///
    /// # Returns
    /// * `Self` - New progress tracker instance
    pub fn new(total: Option<u64>, enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| match total {
            Some(n) => {
                let bar = ProgressBar::new(n);
                bar.set_style(Self::bar_style());
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                let template = "{spinner:.green} {pos} records {msg}";
                if let Ok(style) = ProgressStyle::default_spinner().template(template) {
                    bar.set_style(style);
                }
                bar
            }
        });

        Self {
            processed: AtomicU64::new(0),
            total: AtomicU64::new(total.unwrap_or(UNKNOWN_TOTAL)),
            start_time: Instant::now(),
            bar,
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }

    /// Set or correct the total number of records
    pub fn set_total(&self, total: u64) {
        let previous = self.total.swap(total, Ordering::Relaxed);
        if previous == total {
            return;
        }

        if let Some(ref bar) = self.bar {
            if previous == UNKNOWN_TOTAL {
                bar.set_style(Self::bar_style());
            }
            bar.set_length(total);
        }
    }

    /// Update progress with new count
    ///
    /// # Arguments
    /// * `count` - Total number of records fetched so far
    pub fn update(&self, count: u64) {
        self.processed.store(count, Ordering::Relaxed);

        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} records/sec)", speed));
            }
        }
    }

    /// Records fetched so far
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Total, once known
    pub fn total(&self) -> Option<u64> {
        match self.total.load(Ordering::Relaxed) {
            UNKNOWN_TOTAL => None,
            n => Some(n),
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker_with_total() {
        let tracker = ProgressTracker::new(Some(1000), false);
        tracker.update(500);
        assert_eq!(tracker.processed(), 500);
        assert_eq!(tracker.total(), Some(1000));
    }

    #[test]
    fn test_progress_tracker_total_learned_later() {
        let tracker = ProgressTracker::new(None, false);
        assert_eq!(tracker.total(), None);

        tracker.set_total(42);
        tracker.update(10);
        assert_eq!(tracker.total(), Some(42));
        assert_eq!(tracker.processed(), 10);
        tracker.finish();
    }

    #[test]
    fn test_hidden_bar_accepts_updates() {
        let tracker = ProgressTracker::new(None, true);
        tracker.set_total(3);
        tracker.update(3);
        tracker.finish();
        assert_eq!(tracker.processed(), 3);
    }
}
