use super::cache::ComparisonCache;
use super::oracle::Oracle;
use super::verdict::Verdict;
use crate::error::OracleError;
use crate::model::FileItem;
use crate::progress::ProgressReporter;
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub order: Vec<FileItem>,
    pub oracle_calls: usize,
    pub cache_hits: usize,
    /// Comparisons whose oracle call failed and were treated as Unknown.
    pub failures: usize,
    /// The oracle signalled cancellation; the order past that point is the
    /// input order.
    pub cancelled: bool,
    pub duration: Duration,
}

/// Per-sort counters shared by every comparison of one run.
struct SortSession<'r> {
    reporter: &'r dyn ProgressReporter,
    estimated_total: usize,
    oracle_calls: usize,
    cache_hits: usize,
    failures: usize,
    cancelled: bool,
}

/// Produces a total order over a file set from pairwise oracle verdicts.
///
/// Uses a stable merge sort where Unknown counts as equal, so items the oracle
/// cannot separate keep their input order. Intransitive verdicts give a
/// best-effort order rather than an error.
pub struct ContentOrderSorter<O> {
    oracle: O,
    cache: ComparisonCache,
}

impl<O: Oracle> ContentOrderSorter<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            cache: ComparisonCache::new(),
        }
    }

    pub fn with_cache(mut self, cache: ComparisonCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ComparisonCache {
        &self.cache
    }

    pub fn into_cache(self) -> ComparisonCache {
        self.cache
    }

    pub fn sort(&mut self, files: &[FileItem], reporter: &dyn ProgressReporter) -> Vec<FileItem> {
        self.sort_detailed(files, reporter).order
    }

    pub fn sort_detailed(
        &mut self,
        files: &[FileItem],
        reporter: &dyn ProgressReporter,
    ) -> SortOutcome {
        let start = Instant::now();
        let n = files.len();
        let estimated_total = n * n.saturating_sub(1) / 2;

        info!("Sorting {} files by content", n);
        debug!("Estimated comparisons: {}", estimated_total);
        reporter.on_sort_start(estimated_total);

        let mut session = SortSession {
            reporter,
            estimated_total,
            oracle_calls: 0,
            cache_hits: 0,
            failures: 0,
            cancelled: false,
        };

        let order = if n <= 1 {
            files.to_vec()
        } else {
            let indices: Vec<usize> = (0..n).collect();
            self.merge_sort(files, indices, &mut session)
                .into_iter()
                .map(|i| files[i].clone())
                .collect()
        };

        let duration = start.elapsed();
        reporter.on_sort_complete(session.oracle_calls, duration.as_secs_f64());
        info!(
            "Sorting complete in {:.2}s: {} oracle calls, {} cache hits, {} failed comparisons",
            duration.as_secs_f64(),
            session.oracle_calls,
            session.cache_hits,
            session.failures,
        );
        if session.cancelled {
            warn!("Sorting was cancelled; remaining comparisons were treated as unknown");
        }

        SortOutcome {
            order,
            oracle_calls: session.oracle_calls,
            cache_hits: session.cache_hits,
            failures: session.failures,
            cancelled: session.cancelled,
            duration,
        }
    }

    fn merge_sort(
        &mut self,
        files: &[FileItem],
        indices: Vec<usize>,
        session: &mut SortSession<'_>,
    ) -> Vec<usize> {
        if indices.len() <= 1 {
            return indices;
        }

        let mut left = indices;
        let right = left.split_off(left.len() / 2);
        let left = self.merge_sort(files, left, session);
        let right = self.merge_sort(files, right, session);

        let mut merged = Vec::with_capacity(left.len() + right.len());
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            // Only a strict "right before left" moves the right item first.
            if self.compare(&files[left[i]], &files[right[j]], session) == Ordering::Greater {
                merged.push(right[j]);
                j += 1;
            } else {
                merged.push(left[i]);
                i += 1;
            }
        }
        merged.extend_from_slice(&left[i..]);
        merged.extend_from_slice(&right[j..]);
        merged
    }

    fn compare(&mut self, a: &FileItem, b: &FileItem, session: &mut SortSession<'_>) -> Ordering {
        if session.cancelled {
            return self
                .cache
                .lookup(a, b)
                .unwrap_or(Verdict::Unknown)
                .as_ordering();
        }

        let hits_before = self.cache.stats().hits;
        let failures_before = session.failures;
        let oracle = &self.oracle;
        let resolved = self
            .cache
            .try_resolve(a, b, |x, y| consult(oracle, x, y, session));
        if self.cache.stats().hits > hits_before {
            session.cache_hits += 1;
        }
        if session.failures > failures_before {
            self.cache.mark_session_only(a, b);
        }

        match resolved {
            Ok(verdict) => verdict.as_ordering(),
            Err(_) => {
                session.cancelled = true;
                Ordering::Equal
            }
        }
    }
}

/// One oracle call. Failures other than cancellation degrade to Unknown. The
/// caller keeps that Unknown for the rest of the session only.
fn consult<O: Oracle>(
    oracle: &O,
    a: &FileItem,
    b: &FileItem,
    session: &mut SortSession<'_>,
) -> Result<Verdict, OracleError> {
    debug!("Comparing: {} vs {}", a, b);
    let result = oracle.compare(a, b);
    session.oracle_calls += 1;
    session
        .reporter
        .on_compare_progress(session.oracle_calls, session.estimated_total);

    match result {
        Ok(verdict) => {
            debug!("Comparison result for {} vs {}: {:?}", a, b, verdict);
            Ok(verdict)
        }
        Err(OracleError::Cancelled) => Err(OracleError::Cancelled),
        Err(e) => {
            warn!("Comparison {} vs {} failed, treating as unknown: {}", a, b, e);
            session.failures += 1;
            Ok(Verdict::Unknown)
        }
    }
}
