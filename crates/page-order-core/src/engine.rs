use crate::analysis::sequence::SequenceReport;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::model::FileItem;
use crate::ordering::{ComparisonCache, ContentOrderSorter, Oracle};
use crate::progress::ProgressReporter;
use crate::rename::{RenameLog, RenameTransaction};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct OrderingEngine {
    config: EngineConfig,
    target_dir: Option<PathBuf>,
    cache: Option<ComparisonCache>,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub report: SequenceReport,
    pub order: Vec<FileItem>,
    pub rename_log: RenameLog,
    pub oracle_calls: usize,
    pub failed_comparisons: usize,
    pub validate_duration: Duration,
    pub sort_duration: Duration,
    pub rename_duration: Duration,
    /// Cache after the run, for callers that keep it across sessions.
    pub cache: ComparisonCache,
}

impl OrderingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            target_dir: None,
            cache: None,
        }
    }

    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    /// Seed the session with an existing cache instead of a fresh one.
    pub fn with_cache(mut self, cache: ComparisonCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline:
    /// 1. Validate the current numeric naming (advisory only)
    /// 2. Sort by oracle verdicts through the comparison cache
    /// 3. Rename into a zero-padded sequence, with backup if configured
    pub fn run<O: Oracle>(
        self,
        files: &[FileItem],
        oracle: O,
        reporter: &dyn ProgressReporter,
    ) -> Result<PipelineResult, Error> {
        if files.is_empty() {
            return Err(Error::EmptyInput);
        }
        let validator = self.config.validator()?;

        // Phase 1: Validate
        let validate_start = Instant::now();
        let report = validator.validate(files);
        let validate_duration = validate_start.elapsed();
        if !report.is_valid {
            info!(
                "Current naming has {} missing and {} duplicated numbers",
                report.missing_count,
                report.duplicates.len()
            );
        }

        // Phase 2: Sort
        let cache = match self.cache {
            Some(cache) => cache,
            None => ComparisonCache::with_enabled(self.config.enable_comparison_cache),
        };
        let mut sorter = ContentOrderSorter::new(oracle).with_cache(cache);
        let outcome = sorter.sort_detailed(files, reporter);
        if outcome.cancelled {
            warn!("Sort cancelled, no files were renamed");
            return Err(Error::Cancelled);
        }
        debug!(
            "Sort finished: {} oracle calls, {} cache hits",
            outcome.oracle_calls, outcome.cache_hits
        );

        // Phase 3: Rename
        let rename_start = Instant::now();
        let transaction =
            RenameTransaction::new(self.config.rename_options(self.target_dir.clone()));
        let rename_log = transaction.execute_with_progress(&outcome.order, reporter)?;
        let rename_duration = rename_start.elapsed();

        Ok(PipelineResult {
            report,
            order: outcome.order,
            rename_log,
            oracle_calls: outcome.oracle_calls,
            failed_comparisons: outcome.failures,
            validate_duration,
            sort_duration: outcome.duration,
            rename_duration,
            cache: sorter.into_cache(),
        })
    }
}
