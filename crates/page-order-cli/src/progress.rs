use indicatif::{ProgressBar, ProgressStyle};
use page_order_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Sort phase: bar over the comparison upper bound n·(n−1)/2, which the
///   cache and merge short-circuiting usually keep well below
/// - Rename phase: bar over the planned files
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style(template: &str) -> ProgressStyle {
        ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS)
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_sort_start(&self, estimated_comparisons: usize) {
        let pb = ProgressBar::new(estimated_comparisons as u64);
        pb.set_style(Self::bar_style(
            "  {spinner:.cyan} Comparing [{bar:30.cyan/dim}] {pos}/{len} (upper bound, {elapsed})",
        ));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_compare_progress(&self, completed: usize, estimated_total: usize) {
        self.with_bar(|pb| {
            if pb.length() != Some(estimated_total as u64) {
                pb.set_length(estimated_total as u64);
            }
            pb.set_position(completed as u64);
        });
    }

    fn on_sort_complete(&self, oracle_calls: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Sort complete: {} comparisons in {:.2}s",
            oracle_calls, duration_secs
        );
    }

    fn on_rename_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::bar_style(
            "  {spinner:.cyan} Renaming [{bar:30.cyan/dim}] {pos}/{len} files",
        ));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_rename_progress(&self, done: usize, _total: usize) {
        self.with_bar(|pb| pb.set_position(done as u64));
    }

    fn on_rename_complete(&self, succeeded: usize, failed: usize, duration_secs: f64) {
        self.finish_bar();
        let mark = if failed == 0 {
            "\x1b[32m✓\x1b[0m"
        } else {
            "\x1b[31m✗\x1b[0m"
        };
        eprintln!(
            "  {} Rename complete: {} succeeded, {} failed in {:.2}s",
            mark, succeeded, failed, duration_secs
        );
    }
}
