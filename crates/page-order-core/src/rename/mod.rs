pub mod backup;
pub mod plan;
pub mod transaction;

pub use backup::{list_backups, restore_snapshot, BackupFailure, BackupSnapshot, RestoreSummary};
pub use plan::{planned_file_name, RenameOperation, RenameOptions};
pub use transaction::{RenameLog, RenameResult, RenameTransaction};
