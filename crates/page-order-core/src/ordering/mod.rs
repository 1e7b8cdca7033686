pub mod cache;
pub mod oracle;
pub mod sorter;
pub mod verdict;

pub use cache::{CacheStats, ComparisonCache};
pub use oracle::{oracle_fn, FilenameOracle, FnOracle, Oracle};
pub use sorter::{ContentOrderSorter, SortOutcome};
pub use verdict::Verdict;
