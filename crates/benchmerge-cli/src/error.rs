//! CLI error types with associated exit codes.
//!
//! [`CliError`] is the top-level error type for the `benchmerge` binary. Every
//! variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
//!
//! - Exit code **2**: input or output failure. The tool could not read or
//!   parse the inputs, or could not render or write the outputs.
//! - Exit code **1**: logical failure. The inputs were readable but do not
//!   form a valid merge (repeated keys, clashing labels, no common tests).
use std::fmt;
use std::path::PathBuf;

use benchmerge_core::MergeError;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `benchmerge` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file or directory could not be found.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read or write a path.
    PermissionDenied {
        /// The offending path.
        path: PathBuf,
    },

    /// A result file exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// The offending path.
        path: PathBuf,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes.
        actual: u64,
    },

    /// A result file is not valid UTF-8.
    InvalidUtf8 {
        /// The offending path.
        path: PathBuf,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// A generic I/O error while reading or listing.
    IoError {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error message.
        detail: String,
    },

    /// An output file or the run report could not be written.
    WriteFailed {
        /// The destination path.
        path: PathBuf,
        /// The underlying error message.
        detail: String,
    },

    // --- Exit code 1 or 2, depending on the kind ---
    /// The merge pipeline rejected the inputs.
    Merge(MergeError),
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2`: input failure (unreadable file, malformed CSV, too few files).
    /// - `1`: logical failure (duplicate keys, empty intersection).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::IoError { .. }
            | Self::WriteFailed { .. } => 2,

            Self::Merge(e) => merge_exit_code(e),
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                path,
                limit,
                actual,
            } => format!(
                "error: file too large: {} is {actual} bytes, limit is {limit} bytes",
                path.display()
            ),
            Self::InvalidUtf8 { path, byte_offset } => format!(
                "error: invalid UTF-8 in {}: first invalid byte at offset {byte_offset}",
                path.display()
            ),
            Self::IoError { path, detail } => {
                format!("error: I/O error reading {}: {detail}", path.display())
            }
            Self::WriteFailed { path, detail } => {
                format!("error: could not write {}: {detail}", path.display())
            }
            Self::Merge(e) => format!("error: {e}"),
        }
    }
}

fn merge_exit_code(e: &MergeError) -> i32 {
    match e {
        MergeError::NoMatchingFiles { .. }
        | MergeError::SingleFileOnly { .. }
        | MergeError::Csv { .. }
        | MergeError::DuplicateColumn { .. }
        | MergeError::MissingTestColumn { .. }
        | MergeError::MissingTestValue { .. }
        | MergeError::InvalidValue { .. }
        | MergeError::Render { .. } => 2,

        MergeError::DuplicateAlgorithmLabel { .. }
        | MergeError::DuplicateTestKey { .. }
        | MergeError::EmptyIntersection { .. }
        | MergeError::JoinCardinalityViolation { .. } => 1,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<MergeError> for CliError {
    fn from(e: MergeError) -> Self {
        Self::Merge(e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
