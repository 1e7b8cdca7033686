use crate::error::Error;
use crate::hasher::hash_file;
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const BACKUP_DIR_PREFIX: &str = ".backup_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Timestamped copy of every input of a rename batch, taken before the batch
/// touches anything. Copies keep their original basenames; there is no
/// manifest.
#[derive(Debug, Clone)]
pub struct BackupSnapshot {
    pub dir: PathBuf,
    pub created_at: DateTime<Local>,
    pub copied: usize,
    pub failures: Vec<BackupFailure>,
}

impl BackupSnapshot {
    /// Create a fresh snapshot directory under `target_dir` and copy `sources`
    /// into it. Individual copy failures are logged and recorded; only failing
    /// to create the directory itself is an error.
    pub fn create(sources: &[&Path], target_dir: &Path) -> io::Result<BackupSnapshot> {
        let created_at = Local::now();
        let dir = create_fresh_dir(target_dir, &created_at)?;

        let mut copied = 0;
        let mut failures = Vec::new();
        let mut seen_names = HashSet::new();

        for source in sources {
            let Some(name) = source.file_name() else {
                failures.push(BackupFailure {
                    path: source.to_path_buf(),
                    error: "path has no file name".to_string(),
                });
                continue;
            };
            if !seen_names.insert(name.to_os_string()) {
                warn!(
                    "Backup already holds a file named {}; {} overwrites it",
                    name.to_string_lossy(),
                    source.display()
                );
            }

            let backup_path = dir.join(name);
            match copy_verified(source, &backup_path) {
                Ok(()) => {
                    debug!("Backed up {}", source.display());
                    copied += 1;
                }
                Err(e) => {
                    error!("Failed to backup {}: {}", source.display(), e);
                    failures.push(BackupFailure {
                        path: source.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Backed up {}/{} files to {}",
            copied,
            sources.len(),
            dir.display()
        );
        if !failures.is_empty() {
            warn!(
                "Backup {} is incomplete: {} files could not be copied",
                dir.display(),
                failures.len()
            );
        }

        Ok(BackupSnapshot {
            dir,
            created_at,
            copied,
            failures,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

fn create_fresh_dir(target_dir: &Path, created_at: &DateTime<Local>) -> io::Result<PathBuf> {
    let base = format!(
        "{}{}",
        BACKUP_DIR_PREFIX,
        created_at.format("%Y%m%d_%H%M%S")
    );
    let mut candidate = target_dir.join(&base);
    let mut suffix = 1;
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                candidate = target_dir.join(format!("{}_{}", base, suffix));
                suffix += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn copy_verified(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest)?;
    if hash_file(source)? != hash_file(dest)? {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("checksum mismatch after copying to {}", dest.display()),
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    pub failed: usize,
}

/// Copy every file in `backup_dir` back into its parent directory, replacing
/// files of the same name. Continues past individual failures.
pub fn restore_snapshot(backup_dir: &Path, dry_run: bool) -> Result<RestoreSummary, Error> {
    if !backup_dir.is_dir() {
        return Err(Error::BackupNotFound(backup_dir.to_path_buf()));
    }
    if dry_run {
        info!("[DRY RUN] Would restore from: {}", backup_dir.display());
        return Ok(RestoreSummary::default());
    }

    let target_dir = backup_dir.parent().unwrap_or_else(|| Path::new("."));
    let mut summary = RestoreSummary::default();

    for entry in fs::read_dir(backup_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let restore_path = target_dir.join(name);
        match fs::copy(&path, &restore_path) {
            Ok(_) => {
                debug!("Restored: {}", restore_path.display());
                summary.restored += 1;
            }
            Err(e) => {
                error!("Failed to restore {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Restoration from {} complete: {} restored, {} failed",
        backup_dir.display(),
        summary.restored,
        summary.failed
    );
    Ok(summary)
}

/// Snapshot directories directly under `dir`, oldest first.
pub fn list_backups(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    Error::check_directory(dir)?;

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_backup = entry.file_name().to_string_lossy().starts_with(BACKUP_DIR_PREFIX);
        if is_backup && entry.path().is_dir() {
            backups.push(entry.path());
        }
    }
    backups.sort_by_key(|path| backup_sort_key(path));
    Ok(backups)
}

/// (timestamp part, collision suffix) so `_10` sorts after `_2` within one
/// second.
fn backup_sort_key(path: &Path) -> (String, u64) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = name.trim_start_matches(BACKUP_DIR_PREFIX);
    // %Y%m%d_%H%M%S is 15 characters.
    match stamp.get(15..).and_then(|rest| rest.strip_prefix('_')) {
        Some(suffix) => match suffix.parse() {
            Ok(n) => (stamp[..15].to_string(), n),
            Err(_) => (stamp.to_string(), 0),
        },
        None => (stamp.to_string(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fresh_dir_gets_suffix_when_taken() {
        let tmp = tempdir().unwrap();
        let now = Local::now();
        let first = create_fresh_dir(tmp.path(), &now).unwrap();
        let second = create_fresh_dir(tmp.path(), &now).unwrap();
        assert_ne!(first, second);
        assert!(second
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_1"));
        assert_eq!(list_backups(tmp.path()).unwrap(), vec![first, second]);
    }

    #[test]
    fn test_backups_listed_by_numeric_suffix() {
        let tmp = tempdir().unwrap();
        for name in [
            ".backup_20260101_120000_10",
            ".backup_20260101_120000_2",
            ".backup_20260101_120001",
            ".backup_20260101_120000",
        ] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }
        fs::write(tmp.path().join(".backup_file"), b"x").unwrap();

        let names: Vec<String> = list_backups(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                ".backup_20260101_120000",
                ".backup_20260101_120000_2",
                ".backup_20260101_120000_10",
                ".backup_20260101_120001",
            ]
        );
    }

    #[test]
    fn test_missing_source_is_recorded() {
        let tmp = tempdir().unwrap();
        let present = tmp.path().join("a.jpg");
        fs::write(&present, b"aaa").unwrap();
        let absent = tmp.path().join("gone.jpg");

        let snapshot =
            BackupSnapshot::create(&[present.as_path(), absent.as_path()], tmp.path()).unwrap();
        assert_eq!(snapshot.copied, 1);
        assert_eq!(snapshot.failures.len(), 1);
        assert_eq!(snapshot.failures[0].path, absent);
        assert!(!snapshot.is_complete());
        assert_eq!(fs::read(snapshot.dir.join("a.jpg")).unwrap(), b"aaa");
    }

    #[test]
    fn test_restore_missing_dir() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            restore_snapshot(&tmp.path().join(".backup_none"), false),
            Err(Error::BackupNotFound(_))
        ));
    }
}
