/// Trait for reporting ordering and rename progress.
///
/// Called synchronously on the thread driving the operation. All methods have
/// default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_sort_start(&self, _estimated_comparisons: usize) {}
    /// Fired after every oracle consultation. Cache hits are not reported.
    fn on_compare_progress(&self, _completed: usize, _estimated_total: usize) {}
    fn on_sort_complete(&self, _oracle_calls: usize, _duration_secs: f64) {}
    fn on_rename_start(&self, _total: usize) {}
    fn on_rename_progress(&self, _done: usize, _total: usize) {}
    fn on_rename_complete(&self, _succeeded: usize, _failed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
