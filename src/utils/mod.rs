// exif-cleaner/src/utils/mod.rs
use crate::core::{Result, SUPPORTED_EXTENSIONS};
use std::any::Any;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Creates `path` (and parents) unless it already exists as a directory.
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        log::warn!("Folder '{}' already exists", path.display());
    } else {
        std::fs::create_dir_all(path)?;
        log::info!("Folder '{}' created", path.display());
    }

    Ok(path.canonicalize()?)
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

/// Writes `bytes` to a temporary file next to `path`, then renames it into
/// place. The temporary file is removed on any error. On Unix the file gets
/// the same mode `fs::write` would give it (0o666 minus the umask) instead
/// of the private 0o600 temp file default.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut temp = builder.tempfile_in(directory)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

pub fn is_supported_format(path: &Path) -> bool {
    lowercase_extension(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_format() {
        assert!(is_supported_format(Path::new("PHOTO.JPG")));
        assert!(is_supported_format(Path::new("a.jpeg")));
        assert!(is_supported_format(Path::new("b.png")));
        assert!(is_supported_format(Path::new("c.HEIC")));
        assert!(!is_supported_format(Path::new("photo.TXT")));
        assert!(!is_supported_format(Path::new("photo.gif")));
        assert!(!is_supported_format(Path::new("jpg")));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(2048), "2.00 KB");
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("out").join("nested");

        let first = ensure_dir(&target).unwrap();
        let second = ensure_dir(&target).unwrap();

        assert!(target.is_dir());
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("result.json");
        std::fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_uses_regular_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let plain = temp.path().join("plain.png");
        let atomic = temp.path().join("atomic.png");
        std::fs::write(&plain, b"x").unwrap();
        write_atomic(&atomic, b"x").unwrap();

        let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&atomic), mode(&plain));
    }

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("decoder exploded")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "decoder exploded");
    }
}
