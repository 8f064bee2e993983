//! Source tree discovery

use crate::config::VALID_EXTENSIONS;
use crate::error::{BgBatchError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Check if a path carries one of the qualifying image extensions
/// (case-insensitive)
#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VALID_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Recursively enumerate all qualifying image files under `root`.
///
/// The collection is eager: the batch coordinator reports a total count
/// before any work is scheduled. Results are sorted so that discovery logs
/// are stable across runs; outcome ordering is still completion-order.
///
/// # Errors
/// - `RootNotFound` if `root` does not exist
/// - `Io` if a directory entry cannot be read during the walk
pub fn find_images(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(BgBatchError::RootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let msg = format!("directory walk failed under '{}': {}", root.display(), e);
            match e.into_io_error() {
                Some(io) => BgBatchError::Io(std::io::Error::new(io.kind(), msg)),
                None => BgBatchError::internal(msg),
            }
        })?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    debug!(root = %root.display(), count = files.len(), "source scan complete");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, b"stub").expect("write");
    }

    #[test]
    fn finds_images_recursively_and_case_insensitively() {
        let dir = TempDir::new().expect("temp dir");
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("b.JPG"));
        touch(&dir.path().join("nested/deep/c.WebP"));
        touch(&dir.path().join("nested/d.jpeg"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("video.mp4"));

        let files = find_images(dir.path()).expect("scan");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(files.len(), 4);
        assert!(names.contains(&"a.png".to_string()));
        assert!(names.contains(&"b.JPG".to_string()));
        assert!(names.contains(&"c.WebP".to_string()));
        assert!(names.contains(&"d.jpeg".to_string()));
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("does-not-exist");
        let result = find_images(&missing);
        assert!(matches!(result, Err(BgBatchError::RootNotFound(_))));
    }

    #[test]
    fn empty_root_yields_empty_list() {
        let dir = TempDir::new().expect("temp dir");
        let files = find_images(dir.path()).expect("scan");
        assert!(files.is_empty());
    }

    #[test]
    fn extension_only_names_are_not_matched_as_directories() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("folder.png")).expect("mkdir");
        touch(&dir.path().join("folder.png/real.jpg"));

        let files = find_images(dir.path()).expect("scan");
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("folder.png/real.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_surfaces_as_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("temp dir");
        let locked = dir.path().join("locked");
        touch(&locked.join("hidden.png"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");

        let result = find_images(dir.path());

        // Restore so TempDir cleanup can remove the tree
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod");

        match result {
            // Elevated privileges can read the directory anyway
            Ok(_) => eprintln!("directory readable despite 0o000, skipping permission check"),
            Err(e) => assert!(matches!(e, BgBatchError::Io(_)), "unexpected error: {e}"),
        }
    }

    #[test]
    fn results_are_sorted() {
        let dir = TempDir::new().expect("temp dir");
        touch(&dir.path().join("z_last.jpg"));
        touch(&dir.path().join("a_first.png"));
        touch(&dir.path().join("m_middle.webp"));

        let files = find_images(dir.path()).expect("scan");
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }
}
