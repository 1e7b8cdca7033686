use crate::analysis::sequence::DEFAULT_NUMBER_PATTERN;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A file taking part in one ordering or rename operation.
///
/// The path is the identity; `stem`, `extension` and `number` are derived once
/// at construction and never change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileItem {
    pub path: PathBuf,
    pub stem: String,
    /// Extension including the leading dot, or empty. Case is preserved.
    pub extension: String,
    /// First run of digits in the stem, if any.
    pub number: Option<u64>,
}

impl FileItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let number = DEFAULT_NUMBER_PATTERN
            .find(&stem)
            .and_then(|m| m.as_str().parse().ok());

        Self {
            path,
            stem,
            extension,
            number,
        }
    }

    pub fn from_paths<I, P>(paths: I) -> Vec<FileItem>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths.into_iter().map(FileItem::new).collect()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Stable string key used by the comparison cache.
    pub fn key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl fmt::Display for FileItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}
