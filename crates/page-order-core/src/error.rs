use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid number pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Cache file error: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("No files to process")]
    EmptyInput,

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Backup directory not found: {}", .0.display())]
    BackupNotFound(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Failure of a single oracle comparison. Never aborts a sort.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("oracle IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("comparison cancelled")]
    Cancelled,
}

impl Error {
    /// Require `path` to be an existing directory.
    pub fn check_directory(path: &std::path::Path) -> Result<(), Error> {
        if !path.exists() {
            return Err(Error::DirectoryNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(Error::NotADirectory(path.to_path_buf()));
        }
        Ok(())
    }
}
