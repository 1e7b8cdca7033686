use page_order_core::{Error, FileItem};
use std::path::Path;
use tracing::{debug, error, info};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .map(|e| extensions.iter().any(|allowed| *allowed == e))
        .unwrap_or(false)
}

/// Files under `dir` whose lowercase extension is in `extensions` (each with a
/// leading dot), ordered by lowercase file name. Hidden entries, including
/// backup snapshots and staging files, are skipped.
pub fn scan_folder(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
) -> Result<Vec<FileItem>, Error> {
    Error::check_directory(dir)?;
    info!("Scanning folder: {}", dir.display());
    debug!("Extensions: {:?}, recursive: {}", extensions, recursive);

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<FileItem> = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error reading entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(FileItem::new(entry.into_path()));
        }
    }

    files.sort_by_key(|f| f.file_name().to_lowercase());
    info!("Found {} image files", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts() -> Vec<String> {
        vec![".jpg".to_string(), ".png".to_string()]
    }

    #[test]
    fn test_scan_filters_and_orders() {
        let tmp = tempdir().unwrap();
        for name in ["B.jpg", "a.PNG", "c.txt", ".tmp_page_001.jpg"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        let backup = tmp.path().join(".backup_20260101_000000");
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("old.jpg"), "x").unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("d.jpg"), "x").unwrap();

        let flat = scan_folder(tmp.path(), &exts(), false).unwrap();
        let names: Vec<String> = flat.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, ["a.PNG", "B.jpg"]);

        let deep = scan_folder(tmp.path(), &exts(), true).unwrap();
        let names: Vec<String> = deep.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, ["a.PNG", "B.jpg", "d.jpg"]);
    }

    #[test]
    fn test_scan_missing_or_file() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            scan_folder(&tmp.path().join("absent"), &exts(), false),
            Err(Error::DirectoryNotFound(_))
        ));

        let file = tmp.path().join("a.jpg");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            scan_folder(&file, &exts(), false),
            Err(Error::NotADirectory(_))
        ));
    }
}
