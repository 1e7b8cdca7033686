use crate::error::Error;
use crate::model::FileItem;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOptions {
    /// Defaults to the parent directory of the first file.
    pub target_dir: Option<PathBuf>,
    pub prefix: String,
    pub digits: usize,
    pub start_number: u64,
    pub backup: bool,
    pub dry_run: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            target_dir: None,
            prefix: "page_".to_string(),
            digits: 3,
            start_number: 1,
            backup: true,
            dry_run: false,
        }
    }
}

/// One planned move, computed before anything on disk changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOperation {
    pub original_path: PathBuf,
    pub planned_path: PathBuf,
    pub assigned_index: u64,
}

/// `prefix` + `index` zero-padded to `digits` + `extension`. Numbers wider than
/// `digits` are written in full.
pub fn planned_file_name(prefix: &str, index: u64, digits: usize, extension: &str) -> String {
    format!("{}{:0width$}{}", prefix, index, extension, width = digits)
}

impl RenameOptions {
    pub fn resolve_target_dir(&self, files: &[FileItem]) -> Result<PathBuf, Error> {
        if let Some(dir) = &self.target_dir {
            return Ok(dir.clone());
        }
        let first = files.first().ok_or(Error::EmptyInput)?;
        Ok(first.parent().map(Path::to_path_buf).unwrap_or_default())
    }

    pub fn plan(&self, files: &[FileItem]) -> Result<Vec<RenameOperation>, Error> {
        if files.is_empty() {
            return Err(Error::EmptyInput);
        }
        let target_dir = self.resolve_target_dir(files)?;

        let plan: Vec<RenameOperation> = files
            .iter()
            .zip(self.start_number..)
            .map(|(file, index)| RenameOperation {
                original_path: file.path.clone(),
                planned_path: target_dir.join(planned_file_name(
                    &self.prefix,
                    index,
                    self.digits,
                    &file.extension,
                )),
                assigned_index: index,
            })
            .collect();

        debug!(
            "Planned {} renames into {} (prefix '{}', digits {}, start {})",
            plan.len(),
            target_dir.display(),
            self.prefix,
            self.digits,
            self.start_number
        );
        Ok(plan)
    }
}
