// exif-cleaner/src/processors/discovery.rs
use crate::core::{ExifCleanerError, ImageFile, Result};
use crate::utils::is_supported_format;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively finds regular files whose extension is on the allow-list.
pub struct FileDiscovery;

impl FileDiscovery {
    pub fn new() -> Self {
        Self
    }

    pub fn discover(&self, root: &Path) -> Result<Vec<ImageFile>> {
        if !root.exists() {
            return Err(ExifCleanerError::NotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(ExifCleanerError::InvalidParameter(format!(
                "Input path is not a directory: {}",
                root.display()
            )));
        }

        let root = root.canonicalize()?;

        // Symlinks are not followed, so `is_file` also excludes them.
        let mut files: Vec<ImageFile> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_supported_format(entry.path()))
            .filter_map(|entry| ImageFile::from_path(entry.into_path()))
            .collect();

        files.sort_by(|a, b| a.path().cmp(b.path()));

        log::info!(
            "Retrieved {} image(s) from directory: {}",
            files.len(),
            root.display()
        );

        Ok(files)
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_filters_by_extension() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("nested").join("deeper");
        fs::create_dir_all(&nested).unwrap();

        fs::write(temp.path().join("PHOTO.JPG"), b"x").unwrap();
        fs::write(temp.path().join("photo.TXT"), b"x").unwrap();
        fs::write(nested.join("b.png"), b"x").unwrap();
        fs::write(nested.join("c.heic"), b"x").unwrap();
        fs::write(nested.join("d.jpeg"), b"x").unwrap();
        fs::create_dir(temp.path().join("folder.jpg")).unwrap();

        let files = FileDiscovery::new().discover(temp.path()).unwrap();
        let mut names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        names.sort();

        assert_eq!(names, vec!["PHOTO.JPG", "b.png", "c.heic", "d.jpeg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_symlinks() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("real.jpg");
        fs::write(&target, b"x").unwrap();
        std::os::unix::fs::symlink(&target, temp.path().join("link.jpg")).unwrap();

        let files = FileDiscovery::new().discover(temp.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "real.jpg");
    }

    #[test]
    fn test_discover_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("missing");

        let result = FileDiscovery::new().discover(&missing);
        assert!(matches!(result, Err(ExifCleanerError::NotFound(_))));
    }

    #[test]
    fn test_discover_empty_root() {
        let temp = tempfile::tempdir().unwrap();
        let files = FileDiscovery::new().discover(temp.path()).unwrap();
        assert!(files.is_empty());
    }
}
