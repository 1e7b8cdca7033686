use std::cell::Cell;
use std::collections::HashSet;
use std::sync::Mutex;

use page_order_core::ordering::ComparisonCache;
use page_order_core::{
    oracle_fn, ContentOrderSorter, FileItem, OracleError, ProgressReporter, SilentReporter,
    Verdict,
};
use tempfile::tempdir;

fn items(names: &[&str]) -> Vec<FileItem> {
    names
        .iter()
        .map(|n| FileItem::new(format!("/volume/{}", n)))
        .collect()
}

fn names(files: &[FileItem]) -> Vec<String> {
    files.iter().map(|f| f.file_name()).collect()
}

/// True page order is hidden in the leading letter of the name.
fn by_letter(a: &FileItem, b: &FileItem) -> Result<Verdict, OracleError> {
    Ok(match a.stem[..1].cmp(&b.stem[..1]) {
        std::cmp::Ordering::Less => Verdict::First,
        std::cmp::Ordering::Greater => Verdict::Second,
        std::cmp::Ordering::Equal => Verdict::Unknown,
    })
}

#[derive(Default)]
struct RecordingReporter {
    progress: Mutex<Vec<(usize, usize)>>,
    started_with: Mutex<Option<usize>>,
}

impl ProgressReporter for RecordingReporter {
    fn on_sort_start(&self, estimated_comparisons: usize) {
        *self.started_with.lock().unwrap() = Some(estimated_comparisons);
    }

    fn on_compare_progress(&self, completed: usize, estimated_total: usize) {
        self.progress.lock().unwrap().push((completed, estimated_total));
    }
}

#[test]
fn test_cache_calls_oracle_once_per_unordered_pair() {
    let files = items(&["a.jpg", "b.jpg", "c.jpg"]);
    let calls = Cell::new(0);
    let mut cache = ComparisonCache::new();

    let mut ask = |x: &FileItem, y: &FileItem| {
        cache.resolve(x, y, |p, q| {
            calls.set(calls.get() + 1);
            by_letter(p, q).unwrap()
        })
    };

    let ab = ask(&files[0], &files[1]);
    let ba = ask(&files[1], &files[0]);
    let ab_again = ask(&files[0], &files[1]);
    let cb = ask(&files[2], &files[1]);
    let bc = ask(&files[1], &files[2]);

    assert_eq!(ab, Verdict::First);
    assert_eq!(ba, ab.inverse());
    assert_eq!(ab_again, ab);
    assert_eq!(bc, cb.inverse());
    assert_eq!(calls.get(), 2);
    assert_eq!(cache.size(), 2);
}

#[test]
fn test_sort_recovers_true_order() {
    let files = items(&["e_scan.jpg", "b_scan.jpg", "d_scan.jpg", "a_scan.jpg", "c_scan.jpg"]);
    let mut sorter = ContentOrderSorter::new(oracle_fn(by_letter));
    let sorted = sorter.sort(&files, &SilentReporter);
    assert_eq!(
        names(&sorted),
        ["a_scan.jpg", "b_scan.jpg", "c_scan.jpg", "d_scan.jpg", "e_scan.jpg"]
    );
}

#[test]
fn test_all_unknown_keeps_input_order() {
    let files = items(&["z.jpg", "a.jpg", "m.jpg", "b.jpg", "y.jpg", "c.jpg"]);
    let mut sorter = ContentOrderSorter::new(oracle_fn(|_, _| Ok(Verdict::Unknown)));
    let outcome = sorter.sort_detailed(&files, &SilentReporter);
    assert_eq!(outcome.order, files);
    assert!(outcome.oracle_calls > 0);
}

#[test]
fn test_ties_keep_relative_order() {
    // Two groups by leading letter; within a group the oracle cannot decide.
    let files = items(&["b1.jpg", "a1.jpg", "b2.jpg", "a2.jpg", "b3.jpg"]);
    let mut sorter = ContentOrderSorter::new(oracle_fn(by_letter));
    let sorted = sorter.sort(&files, &SilentReporter);
    assert_eq!(names(&sorted), ["a1.jpg", "a2.jpg", "b1.jpg", "b2.jpg", "b3.jpg"]);
}

#[test]
fn test_single_oracle_failure_still_orders_everything() {
    let files = items(&["f.jpg", "c.jpg", "a.jpg", "e.jpg", "b.jpg", "d.jpg", "g.jpg"]);
    let oracle = oracle_fn(|a: &FileItem, b: &FileItem| {
        let pair = [a.stem.as_str(), b.stem.as_str()];
        if pair.contains(&"c") && pair.contains(&"a") {
            return Err(OracleError::Unavailable("model crashed".to_string()));
        }
        by_letter(a, b)
    });
    let mut sorter = ContentOrderSorter::new(oracle);
    let outcome = sorter.sort_detailed(&files, &SilentReporter);

    assert_eq!(outcome.order.len(), files.len());
    let unique: HashSet<_> = outcome.order.iter().map(|f| f.path.clone()).collect();
    assert_eq!(unique.len(), files.len());
    assert!(outcome.failures <= 1);
    assert!(!outcome.cancelled);
}

#[test]
fn test_intransitive_verdicts_do_not_panic() {
    // rock < paper < scissors < rock
    let beats = |a: &str, b: &str| {
        matches!(
            (a, b),
            ("rock", "paper") | ("paper", "scissors") | ("scissors", "rock")
        )
    };
    let files = items(&["scissors.jpg", "rock.jpg", "paper.jpg", "rock2.jpg"]);
    let oracle = oracle_fn(move |a: &FileItem, b: &FileItem| {
        let (x, y) = (a.stem.trim_end_matches('2'), b.stem.trim_end_matches('2'));
        Ok(if beats(x, y) {
            Verdict::First
        } else if beats(y, x) {
            Verdict::Second
        } else {
            Verdict::Unknown
        })
    });
    let mut sorter = ContentOrderSorter::new(oracle);
    let sorted = sorter.sort(&files, &SilentReporter);
    let mut sorted_names = names(&sorted);
    sorted_names.sort();
    let mut expected = names(&files);
    expected.sort();
    assert_eq!(sorted_names, expected);
}

#[test]
fn test_progress_reported_per_oracle_call() {
    let files = items(&["d.jpg", "c.jpg", "b.jpg", "a.jpg"]);
    let reporter = RecordingReporter::default();
    let mut sorter = ContentOrderSorter::new(oracle_fn(by_letter));
    let outcome = sorter.sort_detailed(&files, &reporter);

    let progress = reporter.progress.lock().unwrap();
    assert_eq!(*reporter.started_with.lock().unwrap(), Some(6));
    assert_eq!(progress.len(), outcome.oracle_calls);
    for (i, (completed, total)) in progress.iter().enumerate() {
        assert_eq!(*completed, i + 1);
        assert_eq!(*total, 6);
        assert!(completed <= total);
    }
}

#[test]
fn test_second_sort_is_served_from_cache() {
    let files = items(&["c.jpg", "a.jpg", "b.jpg", "d.jpg"]);
    let calls = Cell::new(0);
    let oracle = oracle_fn(|a: &FileItem, b: &FileItem| {
        calls.set(calls.get() + 1);
        by_letter(a, b)
    });
    let mut sorter = ContentOrderSorter::new(oracle);

    let first = sorter.sort_detailed(&files, &SilentReporter);
    let calls_after_first = calls.get();
    assert_eq!(first.oracle_calls, calls_after_first);

    let second = sorter.sort_detailed(&files, &SilentReporter);
    assert_eq!(second.oracle_calls, 0);
    assert_eq!(calls.get(), calls_after_first);
    assert_eq!(second.order, first.order);
}

#[test]
fn test_disabled_cache_repeats_calls() {
    let files = items(&["b.jpg", "a.jpg"]);
    let calls = Cell::new(0);
    let oracle = oracle_fn(|a: &FileItem, b: &FileItem| {
        calls.set(calls.get() + 1);
        by_letter(a, b)
    });
    let mut sorter = ContentOrderSorter::new(oracle).with_cache(ComparisonCache::disabled());
    sorter.sort(&files, &SilentReporter);
    sorter.sort(&files, &SilentReporter);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_cache_persists_across_sessions() {
    let tmp = tempdir().unwrap();
    let cache_file = tmp.path().join("comparisons.json");
    let files = items(&["c.jpg", "a.jpg", "b.jpg"]);

    let mut sorter = ContentOrderSorter::new(oracle_fn(by_letter));
    let first = sorter.sort(&files, &SilentReporter);
    sorter.cache().save(&cache_file).unwrap();

    let cache = ComparisonCache::load(&cache_file).unwrap();
    assert_eq!(cache.size(), sorter.cache().size());

    let oracle = oracle_fn(|_, _| panic!("all verdicts should come from the loaded cache"));
    let mut reloaded = ContentOrderSorter::new(oracle).with_cache(cache);
    assert_eq!(reloaded.sort(&files, &SilentReporter), first);
}

#[test]
fn test_load_missing_cache_file_is_empty() {
    let tmp = tempdir().unwrap();
    let cache = ComparisonCache::load(&tmp.path().join("none.json")).unwrap();
    assert!(cache.is_empty());
    assert!(cache.is_enabled());
}

#[test]
fn test_failed_comparison_is_retried_in_next_session() {
    let tmp = tempdir().unwrap();
    let cache_file = tmp.path().join("comparisons.json");
    let files = items(&["b.jpg", "a.jpg"]);

    let failing_calls = Cell::new(0);
    let failing = oracle_fn(|_, _| {
        failing_calls.set(failing_calls.get() + 1);
        Err(OracleError::Unavailable("model offline".to_string()))
    });
    let mut sorter = ContentOrderSorter::new(failing);
    let outcome = sorter.sort_detailed(&files, &SilentReporter);
    assert_eq!(outcome.failures, 1);
    assert_eq!(outcome.order, files);

    // Within the session the degraded verdict is reused.
    sorter.sort(&files, &SilentReporter);
    assert_eq!(failing_calls.get(), 1);
    sorter.cache().save(&cache_file).unwrap();

    let healthy_calls = Cell::new(0);
    let healthy = oracle_fn(|a: &FileItem, b: &FileItem| {
        healthy_calls.set(healthy_calls.get() + 1);
        by_letter(a, b)
    });
    let cache = ComparisonCache::load(&cache_file).unwrap();
    assert!(cache.is_empty());
    let mut next = ContentOrderSorter::new(healthy).with_cache(cache);
    assert_eq!(names(&next.sort(&files, &SilentReporter)), ["a.jpg", "b.jpg"]);
    assert_eq!(healthy_calls.get(), 1);
}
