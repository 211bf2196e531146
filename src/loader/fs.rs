//! Filesystem access used by the resolver.

use std::fs;
use std::io;
use std::path::Path;

/// Readability probe and raw read, abstracted so resolution can be tested
/// without touching the disk.
pub trait FileSystem {
    /// Whether `path` is a file that can currently be opened for reading.
    fn is_readable(&self, path: &Path) -> bool;

    /// Read the whole file as UTF-8 text.
    fn read_all(&self, path: &Path) -> io::Result<String>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_readable(&self, path: &Path) -> bool {
        path.is_file() && fs::File::open(path).is_ok()
    }

    fn read_all(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn existing_file_is_readable() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("page.html");
        fs::write(&file, "<p>hi</p>").unwrap();

        assert!(OsFileSystem.is_readable(&file));
        assert_eq!(OsFileSystem.read_all(&file).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn directory_is_not_readable() {
        let temp = TempDir::new().unwrap();
        assert!(!OsFileSystem.is_readable(temp.path()));
    }

    #[test]
    fn missing_file_read_fails_with_not_found() {
        let temp = TempDir::new().unwrap();
        let err = OsFileSystem
            .read_all(&temp.path().join("missing.html"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
