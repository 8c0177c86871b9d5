//! Filesystem access for the `benchmerge` binary.
//!
//! `benchmerge-core` never touches the filesystem; every read, listing and
//! write happens here.
//!
//! Key behaviours:
//! - Result files: size checked via `std::fs::metadata` before any read.
//! - UTF-8 validation via `std::str::from_utf8` with byte-offset reporting.
//! - Directory listings keep regular files only.
//! - Writes create the destination directory first.
//! - Stale outputs can be removed; a missing file is not an error.
//! - All I/O errors are converted to [`CliError`] variants with exit code 2.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CliError;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads a result file into a `String`, enforcing the size limit and UTF-8.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) for a missing file, a permission
/// problem, a file larger than `max_size`, invalid UTF-8, or any other I/O
/// error.
pub fn read_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| read_error(&e, path))?
        .len();

    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            path: path.to_path_buf(),
            limit: max_size,
            actual: file_size,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| read_error(&e, path))?;
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => Err(CliError::InvalidUtf8 {
            path: path.to_path_buf(),
            byte_offset: e.utf8_error().valid_up_to(),
        }),
    }
}

/// Lists the regular files directly inside `dir`. Order is unspecified.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) if the directory cannot be read.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let entries = std::fs::read_dir(dir).map_err(|e| read_error(&e, dir))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| read_error(&e, dir))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Maps a `std::io::Error` from a read or listing to a [`CliError`].
fn read_error(e: &std::io::Error, path: &Path) -> CliError {
    let kind = e.kind();
    if kind == ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `bytes` to `path`, creating its parent directory if needed.
///
/// # Errors
///
/// Returns [`CliError::PermissionDenied`] or [`CliError::WriteFailed`].
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_error(&e, parent))?;
    }
    std::fs::write(path, bytes).map_err(|e| write_error(&e, path))
}

/// Removes `path` if it exists. Returns whether a file was removed.
///
/// # Errors
///
/// Returns [`CliError::PermissionDenied`] or [`CliError::WriteFailed`].
pub fn remove_file_if_present(path: &Path) -> Result<bool, CliError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(write_error(&e, path)),
    }
}

fn write_error(e: &std::io::Error, path: &Path) -> CliError {
    if e.kind() == ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::WriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
