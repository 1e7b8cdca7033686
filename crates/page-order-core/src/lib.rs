pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod model;
pub mod ordering;
pub mod progress;
pub mod rename;

pub use analysis::sequence::{SequenceReport, SequenceValidator};
pub use config::EngineConfig;
pub use engine::{OrderingEngine, PipelineResult};
pub use error::{Error, OracleError};
pub use model::FileItem;
pub use ordering::{
    oracle_fn, ComparisonCache, ContentOrderSorter, FilenameOracle, FnOracle, Oracle,
    SortOutcome, Verdict,
};
pub use progress::{ProgressReporter, SilentReporter};
pub use rename::{
    list_backups, BackupSnapshot, RenameLog, RenameOperation, RenameOptions, RenameResult,
    RenameTransaction,
};
