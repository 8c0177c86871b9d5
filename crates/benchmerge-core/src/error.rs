//! Fatal errors and non-fatal warnings produced by the merge pipeline.
//!
//! Every fatal condition is a [`MergeError`] variant and aborts the run before
//! any output is rendered. Non-fatal conditions are [`MergeWarning`] values,
//! returned alongside a successful result and never raised as errors.
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// MergeError
// ---------------------------------------------------------------------------

/// All fatal conditions that can occur between file selection and rendering.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// No file in the results directory matched the `result` prefix.
    #[error("no CSV file starting with 'result' in {}", .dir.display())]
    NoMatchingFiles {
        /// The directory that was searched.
        dir: PathBuf,
    },

    /// Exactly one file matched; a merge needs at least two.
    #[error("only one result file ({}); merging needs at least two", .file.display())]
    SingleFileOnly {
        /// The single matching file.
        file: PathBuf,
    },

    /// Two files derived the same algorithm label.
    #[error("files {first} and {second} both map to algorithm label '{label}'")]
    DuplicateAlgorithmLabel {
        /// The clashing label.
        label: String,
        /// File name that claimed the label first.
        first: String,
        /// File name that claimed it again.
        second: String,
    },

    /// The CSV text could not be parsed (ragged rows, bad quoting, bad UTF-8).
    #[error("{file}: malformed CSV: {detail}")]
    Csv {
        /// Source file name.
        file: String,
        /// Parser message.
        detail: String,
    },

    /// Two headers are identical once surrounding whitespace is trimmed.
    #[error("{file}: column '{column}' appears more than once")]
    DuplicateColumn {
        /// Source file name.
        file: String,
        /// The repeated header.
        column: String,
    },

    /// The file has no `test` column.
    #[error("file {file} has no column 'test'")]
    MissingTestColumn {
        /// Source file name.
        file: String,
    },

    /// A row has an empty `test` cell.
    #[error("{file}:{line}: empty 'test' value")]
    MissingTestValue {
        /// Source file name.
        file: String,
        /// 1-based line number in the source file.
        line: u64,
    },

    /// A configuration or metric cell does not hold a number of the right kind.
    #[error("{file}:{line}: column '{column}' expects {expected}, got {value:?}")]
    InvalidValue {
        /// Source file name.
        file: String,
        /// 1-based line number in the source file.
        line: u64,
        /// Header of the offending column, before algorithm qualification.
        column: String,
        /// `"an integer"` or `"a number"`.
        expected: &'static str,
        /// The rejected cell text.
        value: String,
    },

    /// A `test` value repeats inside one file.
    #[error(
        "in file {file} (algo='{algorithm}') 'test' values repeat, e.g. {} ({total} distinct in total)",
        .preview.join(", ")
    )]
    DuplicateTestKey {
        /// Algorithm label of the offending file.
        algorithm: String,
        /// Source file name.
        file: String,
        /// Repeated values, in order of first repetition, truncated.
        preview: Vec<String>,
        /// Number of distinct repeated values.
        total: usize,
    },

    /// No `test` value is present in every file.
    #[error(
        "the intersection of tests is empty: no 'test' is present in all of {}",
        .files.join(", ")
    )]
    EmptyIntersection {
        /// All source file names, in discovery order.
        files: Vec<String>,
    },

    /// A join step matched a key other than exactly once on each side.
    #[error(
        "join with algo='{algorithm}' is not one-to-one for test '{test}' \
         ({left} left match(es), {right} right match(es))"
    )]
    JoinCardinalityViolation {
        /// Algorithm label of the table being joined in.
        algorithm: String,
        /// The offending key.
        test: String,
        /// Occurrences of the key in the accumulated left side.
        left: usize,
        /// Occurrences of the key in the right side.
        right: usize,
    },

    /// Serialising an output table failed.
    #[error("could not render {table}: {detail}")]
    Render {
        /// Which output table was being rendered.
        table: &'static str,
        /// Writer message.
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// MergeWarning
// ---------------------------------------------------------------------------

/// Non-fatal conditions. The run continues and produces valid, reduced output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeWarning {
    /// A file has `test` values outside the cross-file intersection; those rows
    /// are excluded from the merged table.
    DroppedTests {
        /// Algorithm label of the file.
        algorithm: String,
        /// Dropped values in test order, truncated.
        preview: Vec<String>,
        /// Total number of dropped values.
        total: usize,
    },

    /// Canonical `N`, `M` or `C` could not be established, so no grouped
    /// summary was produced.
    MissingGroupingColumns {
        /// The configuration columns no file provided.
        missing: Vec<String>,
    },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DroppedTests {
                algorithm,
                preview,
                total,
            } => {
                write!(
                    f,
                    "algo='{algorithm}': {total} test(s) will be dropped (not present in all CSVs): {}",
                    preview.join(", ")
                )?;
                if *total > preview.len() {
                    write!(f, ", ... (+{})", total - preview.len())?;
                }
                Ok(())
            }
            Self::MissingGroupingColumns { missing } => write!(
                f,
                "cannot create grouped version: missing {} column(s)",
                missing.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_lists_preview_and_total() {
        let e = MergeError::DuplicateTestKey {
            algorithm: "ga".to_owned(),
            file: "results_ga.csv".to_owned(),
            preview: vec!["t1".to_owned(), "t7".to_owned()],
            total: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("results_ga.csv"), "message: {msg}");
        assert!(msg.contains("algo='ga'"), "message: {msg}");
        assert!(msg.contains("t1, t7"), "message: {msg}");
        assert!(msg.contains("2 distinct"), "message: {msg}");
    }

    #[test]
    fn dropped_tests_warning_reports_remainder() {
        let w = MergeWarning::DroppedTests {
            algorithm: "X".to_owned(),
            preview: vec!["1".to_owned(), "2".to_owned()],
            total: 5,
        };
        let msg = w.to_string();
        assert!(msg.contains("5 test(s)"), "message: {msg}");
        assert!(msg.ends_with("1, 2, ... (+3)"), "message: {msg}");
    }

    #[test]
    fn dropped_tests_warning_without_remainder() {
        let w = MergeWarning::DroppedTests {
            algorithm: "X".to_owned(),
            preview: vec!["1".to_owned()],
            total: 1,
        };
        assert!(w.to_string().ends_with(": 1"));
    }

    #[test]
    fn missing_test_column_names_file() {
        let e = MergeError::MissingTestColumn {
            file: "results_b.csv".to_owned(),
        };
        assert_eq!(e.to_string(), "file results_b.csv has no column 'test'");
    }
}
