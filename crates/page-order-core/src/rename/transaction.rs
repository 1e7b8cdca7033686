use super::backup::{restore_snapshot, BackupSnapshot};
use super::plan::{RenameOperation, RenameOptions};
use crate::error::Error;
use crate::model::FileItem;
use crate::progress::{ProgressReporter, SilentReporter};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of one planned rename. `error` is present only on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameResult {
    pub original: String,
    pub new: String,
    pub number: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenameResult {
    fn ok(op: &RenameOperation) -> Self {
        Self {
            original: op.original_path.to_string_lossy().into_owned(),
            new: op.planned_path.to_string_lossy().into_owned(),
            number: op.assigned_index,
            success: true,
            error: None,
        }
    }

    fn failed(op: &RenameOperation, error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::ok(op)
        }
    }
}

/// Per-item results in planning order, plus the snapshot taken first.
#[derive(Debug, Clone)]
pub struct RenameLog {
    pub results: Vec<RenameResult>,
    pub backup: Option<BackupSnapshot>,
}

impl RenameLog {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RenameResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Every rename succeeded and the backup, if any, is complete.
    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0 && self.backup.as_ref().map_or(true, |b| b.is_complete())
    }

    pub fn write_json(&self, path: &Path) -> Result<(), Error> {
        let content = serde_json::to_string_pretty(&self.results)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Commits an order to disk as a zero-padded renumbering.
///
/// Each file is an independent operation: one failure is recorded and the
/// rest of the batch still runs. Renames whose destination is occupied go
/// through a hidden temporary name and are finalized after every other move,
/// so any permutation of an existing name set (cycles included) completes
/// without overwriting.
#[derive(Debug, Clone, Default)]
pub struct RenameTransaction {
    options: RenameOptions,
}

impl RenameTransaction {
    pub fn new(options: RenameOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenameOptions {
        &self.options
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.options.dry_run = dry_run;
        info!("Dry run mode set to: {}", dry_run);
    }

    /// The renames `execute` would perform, without touching the filesystem.
    pub fn plan(&self, files: &[FileItem]) -> Result<Vec<RenameOperation>, Error> {
        self.options.plan(files)
    }

    pub fn execute(&self, files: &[FileItem]) -> Result<RenameLog, Error> {
        self.execute_with_progress(files, &SilentReporter)
    }

    /// Resolve string paths to file items and execute.
    pub fn execute_ordered_by_path<S: AsRef<str>>(&self, paths: &[S]) -> Result<RenameLog, Error> {
        let files = FileItem::from_paths(paths.iter().map(|p| PathBuf::from(p.as_ref())));
        self.execute(&files)
    }

    pub fn execute_with_progress(
        &self,
        files: &[FileItem],
        reporter: &dyn ProgressReporter,
    ) -> Result<RenameLog, Error> {
        let plan = self.plan(files)?;
        let target_dir = self.options.resolve_target_dir(files)?;
        if !target_dir.as_os_str().is_empty() {
            Error::check_directory(&target_dir)?;
        }

        let start = Instant::now();
        let dry_run = self.options.dry_run;
        info!(
            "Renaming {} files in {}{}",
            plan.len(),
            target_dir.display(),
            if dry_run { " (dry run)" } else { "" }
        );

        let backup = if self.options.backup && !dry_run {
            let sources: Vec<&Path> = plan.iter().map(|op| op.original_path.as_path()).collect();
            let snapshot = BackupSnapshot::create(&sources, &target_dir)?;
            info!("Backup created: {}", snapshot.dir.display());
            Some(snapshot)
        } else {
            None
        };

        let total = plan.len();
        reporter.on_rename_start(total);
        let mut done = 0;
        let mut results: Vec<Option<RenameResult>> = vec![None; total];
        let mut staged: Vec<(usize, PathBuf)> = Vec::new();

        // Direct moves and staging of moves whose destination is occupied.
        for (idx, op) in plan.iter().enumerate() {
            let outcome = if dry_run {
                info!(
                    "[DRY RUN] {} -> {}",
                    display_name(&op.original_path),
                    display_name(&op.planned_path)
                );
                Some(RenameResult::ok(op))
            } else if op.original_path == op.planned_path {
                debug!("Skipping (same name): {}", display_name(&op.original_path));
                Some(RenameResult::ok(op))
            } else if op.planned_path.exists() {
                match stage(op) {
                    Ok(temp) => {
                        staged.push((idx, temp));
                        None
                    }
                    Err(e) => Some(fail(op, e.to_string())),
                }
            } else {
                match fs::rename(&op.original_path, &op.planned_path) {
                    Ok(()) => {
                        log_renamed(op);
                        Some(RenameResult::ok(op))
                    }
                    Err(e) => Some(fail(op, e.to_string())),
                }
            };

            if let Some(result) = outcome {
                results[idx] = Some(result);
                done += 1;
                reporter.on_rename_progress(done, total);
            }
        }

        // Every batch member has left its old name by now, so a destination
        // that is still occupied belongs to something outside the batch.
        for (idx, temp) in staged {
            let op = &plan[idx];
            results[idx] = Some(finalize(op, &temp));
            done += 1;
            reporter.on_rename_progress(done, total);
        }

        let results: Vec<RenameResult> = results.into_iter().flatten().collect();
        let log = RenameLog { results, backup };

        let duration = start.elapsed();
        reporter.on_rename_complete(log.succeeded(), log.failed(), duration.as_secs_f64());
        info!(
            "Rename complete: {}/{} files in {:.2}s",
            log.succeeded(),
            log.results.len(),
            duration.as_secs_f64()
        );
        Ok(log)
    }

    /// Restore a snapshot into its parent directory. Returns false if the
    /// snapshot is missing or any file could not be copied back.
    pub fn restore(&self, backup_dir: &Path) -> bool {
        match restore_snapshot(backup_dir, self.options.dry_run) {
            Ok(summary) => summary.failed == 0,
            Err(e) => {
                error!("Restoration failed: {}", e);
                false
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn log_renamed(op: &RenameOperation) {
    info!(
        "Renamed: {} -> {}",
        display_name(&op.original_path),
        display_name(&op.planned_path)
    );
}

fn fail(op: &RenameOperation, error: String) -> RenameResult {
    error!(
        "Failed to rename {}: {}",
        display_name(&op.original_path),
        error
    );
    RenameResult::failed(op, error)
}

/// Hidden name next to the destination that nothing currently uses.
fn temp_path_for(planned: &Path) -> PathBuf {
    let dir = planned.parent().unwrap_or_else(|| Path::new(""));
    let name = display_name(planned);

    let mut candidate = dir.join(format!(".tmp_{}", name));
    let mut counter = 1;
    while candidate.exists() {
        candidate = dir.join(format!(".tmp_{}_{}", counter, name));
        counter += 1;
    }
    candidate
}

fn stage(op: &RenameOperation) -> io::Result<PathBuf> {
    let temp = temp_path_for(&op.planned_path);
    fs::rename(&op.original_path, &temp)?;
    debug!(
        "Staged {} as {} (destination occupied)",
        display_name(&op.original_path),
        display_name(&temp)
    );
    Ok(temp)
}

fn finalize(op: &RenameOperation, temp: &Path) -> RenameResult {
    let attempt = if op.planned_path.exists() {
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "destination {} is occupied by a file outside the batch",
                op.planned_path.display()
            ),
        ))
    } else {
        fs::rename(temp, &op.planned_path)
    };

    match attempt {
        Ok(()) => {
            log_renamed(op);
            RenameResult::ok(op)
        }
        Err(e) => match fs::rename(temp, &op.original_path) {
            Ok(()) => {
                warn!(
                    "Moved {} back to its original name",
                    display_name(&op.original_path)
                );
                fail(op, e.to_string())
            }
            Err(rollback) => fail(
                op,
                format!(
                    "{}; file left at {} ({})",
                    e,
                    temp.display(),
                    rollback
                ),
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_temp_path_avoids_existing() {
        let tmp = tempdir().unwrap();
        let planned = tmp.path().join("page_001.jpg");
        assert_eq!(temp_path_for(&planned), tmp.path().join(".tmp_page_001.jpg"));

        fs::write(tmp.path().join(".tmp_page_001.jpg"), b"x").unwrap();
        assert_eq!(
            temp_path_for(&planned),
            tmp.path().join(".tmp_1_page_001.jpg")
        );
    }

    #[test]
    fn test_result_serialization_omits_error_on_success() {
        let op = RenameOperation {
            original_path: PathBuf::from("/b/x.jpg"),
            planned_path: PathBuf::from("/b/page_001.jpg"),
            assigned_index: 1,
        };
        let json = serde_json::to_value(RenameResult::ok(&op)).unwrap();
        assert_eq!(json["new"], "/b/page_001.jpg");
        assert_eq!(json["number"], 1);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(RenameResult::failed(&op, "boom".into())).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
    }
}
