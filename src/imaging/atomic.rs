//! Crash-safe file replacement.
//!
//! New content goes to a named temporary file in the destination directory
//! and is renamed over the destination only after it has been fully written
//! and flushed. Until that rename, the previous file (if any) is untouched;
//! if encoding fails the temporary file is deleted on drop.

use super::backend::BackendError;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Buffered writer handed to encode closures.
pub type AtomicWriter<'a> = BufWriter<&'a mut File>;

/// Write `path` through `encode`, replacing any existing file atomically.
///
/// The replacement keeps the permissions of the file it replaces.
pub fn write_atomically<F>(path: &Path, encode: F) -> Result<(), BackendError>
where
    F: FnOnce(&mut AtomicWriter<'_>) -> Result<(), BackendError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| BackendError::filesystem(path, e))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode(&mut writer)?;
        writer
            .flush()
            .map_err(|e| BackendError::filesystem(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| BackendError::filesystem(path, e))?;

    inherit_permissions(tmp.path(), path).map_err(|e| BackendError::filesystem(path, e))?;
    tmp.persist(path)
        .map_err(|e| BackendError::filesystem(path, e.error))?;
    Ok(())
}

fn inherit_permissions(tmp: &Path, target: &Path) -> std::io::Result<()> {
    match fs::metadata(target) {
        Ok(meta) => fs::set_permissions(tmp, meta.permissions()),
        Err(_) => default_permissions(tmp),
    }
}

#[cfg(unix)]
fn default_permissions(tmp: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(tmp, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(_tmp: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn creates_new_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.bin");

        write_atomically(&path, |w| {
            w.write_all(b"hello").map_err(|e| BackendError::filesystem(&path, e))
        })
        .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert_eq!(dir_entries(tmp.path()), vec!["out.bin"]);
    }

    #[test]
    fn replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        fs::write(&path, b"original").unwrap();

        write_atomically(&path, |w| {
            w.write_all(b"stripped").map_err(|e| BackendError::filesystem(&path, e))
        })
        .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"stripped");
    }

    #[test]
    fn failed_encode_leaves_original_intact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        fs::write(&path, b"original").unwrap();

        // Fail after part of the replacement has already been written
        let result = write_atomically(&path, |w| {
            w.write_all(b"half-written").unwrap();
            Err(BackendError::filesystem(
                &path,
                std::io::Error::new(std::io::ErrorKind::StorageFull, "injected"),
            ))
        });

        assert!(matches!(result, Err(BackendError::Filesystem { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert_eq!(dir_entries(tmp.path()), vec!["photo.jpg"]);
    }

    #[test]
    fn missing_directory_is_filesystem_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no-such-dir/out.bmp");
        let result = write_atomically(&path, |_| Ok(()));
        assert!(matches!(result, Err(BackendError::Filesystem { .. })));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn keeps_permissions_of_replaced_file() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        fs::write(&path, b"original").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomically(&path, |_| Ok(())).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
