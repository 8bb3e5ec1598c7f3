//! Completion counting for bulk retrievals.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts completed retrievals, optionally mirrored on a terminal progress bar.
///
/// A single counter is created by the caller and shared with the engine by
/// handle. Each task ticks it exactly once when it finishes, whether the
/// fetch succeeded or not.
#[derive(Debug)]
pub struct ProgressCounter {
    total: u64,
    completed: AtomicU64,
    bar: ProgressBar,
}

impl ProgressCounter {
    /// A counter with no visible output.
    pub fn hidden(total: u64) -> Self {
        Self::with_bar(total, ProgressBar::hidden())
    }

    /// A counter drawing a progress bar on stderr.
    pub fn with_terminal_bar(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg} | {elapsed_precise} elapsed, ETA {eta_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░ "),
        );
        bar.set_message("objects");
        Self::with_bar(total, bar)
    }

    fn with_bar(total: u64, bar: ProgressBar) -> Self {
        bar.set_length(total);
        Self {
            total,
            completed: AtomicU64::new(0),
            bar,
        }
    }

    /// Records one finished task.
    pub fn tick(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
        self.bar.inc(1);
    }

    /// Number of tasks finished so far.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Number of tasks the run was sized for.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Updates the bar message with the object currently being handled.
    pub(crate) fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Finalizes the bar.
    pub fn finish(&self, msg: impl Into<String>) {
        self.bar.finish_with_message(msg.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_concurrent_ticks_are_not_lost() {
        let counter = Arc::new(ProgressCounter::hidden(8 * 1000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.tick();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.completed(), 8000);
        assert_eq!(counter.total(), 8000);
    }
}
