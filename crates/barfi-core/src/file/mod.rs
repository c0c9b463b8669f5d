//! File metadata and size formatting.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Metadata of the file being uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path the file was opened from
    pub path: PathBuf,
    /// File name sent to the service
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl FileInfo {
    /// Stat a path and collect the metadata needed for an upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or is not a regular file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;

        if !metadata.is_file() {
            return Err(Error::NotAFile(path.display().to_string()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::NotAFile(path.display().to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }
}

/// Format a byte count for display, e.g. `512B`, `1.5KB`, `4.0GB`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 1024 {
        return format!("{bytes}B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.1}{}", UNITS[unit])
}

/// Integer percentage of `read` over `size`, clamped to 100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent(read: u64, size: u64) -> u8 {
    if size == 0 {
        return 0;
    }
    let pct = (read as f64 * 100.0 / size as f64).floor();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1024), "1.0KB");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0GB");
        assert_eq!(format_size(u64::MAX), "16.0EB");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 100), 0);
        assert_eq!(percent(50, 100), 50);
        assert_eq!(percent(999, 1000), 99);
        assert_eq!(percent(1000, 1000), 100);
        assert_eq!(percent(10, 0), 0);
        assert_eq!(percent(200, 100), 100);
    }

    #[test]
    fn test_file_info_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie.mkv");
        std::fs::write(&path, b"hello").unwrap();

        let info = FileInfo::from_path(&path).unwrap();
        assert_eq!(info.name, "movie.mkv");
        assert_eq!(info.size, 5);
        assert_eq!(info.path, path);
    }

    #[test]
    fn test_file_info_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileInfo::from_path(dir.path().join("nope.bin"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_file_info_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileInfo::from_path(dir.path());
        assert!(matches!(result, Err(Error::NotAFile(_))));
    }
}
