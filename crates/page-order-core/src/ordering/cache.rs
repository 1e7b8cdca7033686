use super::verdict::Verdict;
use crate::error::Error;
use crate::model::FileItem;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

#[derive(Serialize, Deserialize)]
struct CachedComparison {
    first: String,
    second: String,
    verdict: Verdict,
}

/// Memoizes oracle verdicts per unordered pair for one session.
///
/// A verdict is stored under the ordered pair it was first asked for. A later
/// query for the reversed pair is answered with the inverted verdict, so the
/// oracle runs at most once per unordered pair.
///
/// Entries marked session-only answer lookups like any other but are never
/// written by [`ComparisonCache::save`].
#[derive(Debug)]
pub struct ComparisonCache {
    enabled: bool,
    entries: HashMap<(String, String), Verdict>,
    session_only: HashSet<(String, String)>,
    stats: CacheStats,
}

impl Default for ComparisonCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonCache {
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// Cache that stores nothing; every resolve calls the oracle.
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
            session_only: HashSet::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached verdict for (a, b), inverting a stored (b, a) entry.
    pub fn lookup(&self, a: &FileItem, b: &FileItem) -> Option<Verdict> {
        if !self.enabled {
            return None;
        }
        let (ka, kb) = (a.key(), b.key());
        if let Some(v) = self.entries.get(&(ka.clone(), kb.clone())) {
            return Some(*v);
        }
        self.entries.get(&(kb, ka)).map(|v| v.inverse())
    }

    pub fn resolve<F>(&mut self, a: &FileItem, b: &FileItem, oracle_call: F) -> Verdict
    where
        F: FnOnce(&FileItem, &FileItem) -> Verdict,
    {
        match self.try_resolve(a, b, |x, y| Ok::<_, Infallible>(oracle_call(x, y))) {
            Ok(verdict) => verdict,
            Err(never) => match never {},
        }
    }

    /// Like [`ComparisonCache::resolve`], but an `Err` from `oracle_call` is
    /// passed through and nothing is stored for the pair.
    pub fn try_resolve<F, E>(
        &mut self,
        a: &FileItem,
        b: &FileItem,
        oracle_call: F,
    ) -> Result<Verdict, E>
    where
        F: FnOnce(&FileItem, &FileItem) -> Result<Verdict, E>,
    {
        if let Some(verdict) = self.lookup(a, b) {
            trace!("Using cached comparison for {} vs {}", a, b);
            self.stats.hits += 1;
            return Ok(verdict);
        }

        self.stats.misses += 1;
        let verdict = oracle_call(a, b)?;
        if self.enabled {
            self.entries.insert((a.key(), b.key()), verdict);
        }
        Ok(verdict)
    }

    /// Keep the stored verdict for (a, b) out of saved cache files, so a later
    /// session asks the oracle again.
    pub fn mark_session_only(&mut self, a: &FileItem, b: &FileItem) {
        let (ka, kb) = (a.key(), b.key());
        if self.entries.contains_key(&(ka.clone(), kb.clone())) {
            self.session_only.insert((ka, kb));
        } else if self.entries.contains_key(&(kb.clone(), ka.clone())) {
            self.session_only.insert((kb, ka));
        }
    }

    pub fn is_session_only(&self, a: &FileItem, b: &FileItem) -> bool {
        let (ka, kb) = (a.key(), b.key());
        self.session_only.contains(&(ka.clone(), kb.clone()))
            || self.session_only.contains(&(kb, ka))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.session_only.clear();
        self.stats = CacheStats::default();
        info!("Comparison cache cleared");
    }

    /// Number of stored entries (one per unordered pair).
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Load a cache written by [`ComparisonCache::save`]. A missing file gives
    /// an empty enabled cache.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut cache = Self::new();
        if !path.exists() {
            debug!("No comparison cache at {}, starting empty", path.display());
            return Ok(cache);
        }

        let content = fs::read_to_string(path)?;
        let stored: Vec<CachedComparison> = serde_json::from_str(&content)?;
        for entry in stored {
            // Keep the first orientation seen for a pair.
            if cache
                .entries
                .contains_key(&(entry.second.clone(), entry.first.clone()))
            {
                continue;
            }
            cache.entries.insert((entry.first, entry.second), entry.verdict);
        }
        info!(
            "Loaded {} cached comparisons from {}",
            cache.size(),
            path.display()
        );
        Ok(cache)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let mut stored: Vec<CachedComparison> = self
            .entries
            .iter()
            .filter(|(key, _)| !self.session_only.contains(*key))
            .map(|((first, second), verdict)| CachedComparison {
                first: first.clone(),
                second: second.clone(),
                verdict: *verdict,
            })
            .collect();
        stored.sort_by(|x, y| (&x.first, &x.second).cmp(&(&y.first, &y.second)));

        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(path, content)?;
        debug!("Saved {} cached comparisons to {}", stored.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn pair() -> (FileItem, FileItem) {
        (FileItem::new("/b/a.jpg"), FileItem::new("/b/b.jpg"))
    }

    #[test]
    fn test_reverse_lookup_is_inverted() {
        let (a, b) = pair();
        let calls = Cell::new(0);
        let mut cache = ComparisonCache::new();

        let forward = cache.resolve(&a, &b, |_, _| {
            calls.set(calls.get() + 1);
            Verdict::First
        });
        let reverse = cache.resolve(&b, &a, |_, _| {
            calls.set(calls.get() + 1);
            Verdict::First
        });

        assert_eq!(forward, Verdict::First);
        assert_eq!(reverse, Verdict::Second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_disabled_always_calls_oracle() {
        let (a, b) = pair();
        let calls = Cell::new(0);
        let mut cache = ComparisonCache::disabled();
        for _ in 0..3 {
            cache.resolve(&a, &b, |_, _| {
                calls.set(calls.get() + 1);
                Verdict::Second
            });
        }
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.lookup(&a, &b), None);
    }

    #[test]
    fn test_failed_call_is_not_stored() {
        let (a, b) = pair();
        let mut cache = ComparisonCache::new();
        let failed: Result<Verdict, &str> = cache.try_resolve(&a, &b, |_, _| Err("offline"));
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let ok: Result<Verdict, &str> = cache.try_resolve(&b, &a, |_, _| Ok(Verdict::First));
        assert_eq!(ok, Ok(Verdict::First));
        assert_eq!(cache.lookup(&a, &b), Some(Verdict::Second));
    }

    #[test]
    fn test_clear() {
        let (a, b) = pair();
        let mut cache = ComparisonCache::new();
        cache.resolve(&a, &b, |_, _| Verdict::Unknown);
        assert_eq!(cache.lookup(&b, &a), Some(Verdict::Unknown));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup(&a, &b), None);
    }

    #[test]
    fn test_session_only_entries_are_not_saved() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cache.json");
        let (a, b) = pair();
        let c = FileItem::new("/b/c.jpg");

        let mut cache = ComparisonCache::new();
        cache.resolve(&a, &b, |_, _| Verdict::Unknown);
        cache.resolve(&a, &c, |_, _| Verdict::First);
        cache.mark_session_only(&b, &a);
        assert!(cache.is_session_only(&a, &b));
        assert!(!cache.is_session_only(&a, &c));
        // Still answers within the session.
        assert_eq!(cache.lookup(&b, &a), Some(Verdict::Unknown));

        cache.save(&path).unwrap();
        let loaded = ComparisonCache::load(&path).unwrap();
        assert_eq!(loaded.size(), 1);
        assert_eq!(loaded.lookup(&a, &b), None);
        assert_eq!(loaded.lookup(&c, &a), Some(Verdict::Second));
    }
}
