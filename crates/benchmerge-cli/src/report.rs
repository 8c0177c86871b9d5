//! JSON run report written by `--report`.
use std::path::{Path, PathBuf};

use benchmerge_core::{AlgorithmSummary, MergeOutput, MergeWarning};
use serde::Serialize;

use crate::error::CliError;
use crate::io::write_file;

/// Summary of one successful run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// The results directory that was read.
    pub results_dir: &'a Path,
    /// Inputs in discovery order.
    pub algorithms: &'a [AlgorithmSummary],
    /// Size of the cross-file `test` intersection.
    pub common_tests: usize,
    /// Rows in the merged table.
    pub merged_rows: usize,
    /// Rows in the grouped summary; `null` when it was skipped.
    pub grouped_rows: Option<usize>,
    /// Non-fatal warnings in the order they were raised.
    pub warnings: Vec<ReportWarning<'a>>,
    /// Files written, merged table first.
    pub outputs: &'a [PathBuf],
}

/// A warning with its rendered message alongside the structured fields.
#[derive(Debug, Serialize)]
pub struct ReportWarning<'a> {
    /// Human-readable form, as logged.
    pub message: String,
    #[serde(flatten)]
    detail: &'a MergeWarning,
}

impl<'a> RunReport<'a> {
    /// Builds the report for `output`.
    pub fn new(results_dir: &'a Path, output: &'a MergeOutput, outputs: &'a [PathBuf]) -> Self {
        Self {
            results_dir,
            algorithms: &output.algorithms,
            common_tests: output.common_tests,
            merged_rows: output.combined.rows.len(),
            grouped_rows: output.grouped.as_ref().map(|g| g.rows.len()),
            warnings: output
                .warnings
                .iter()
                .map(|w| ReportWarning {
                    message: w.to_string(),
                    detail: w,
                })
                .collect(),
            outputs,
        }
    }

    /// Writes the report as pretty-printed JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::WriteFailed`] if serialisation or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), CliError> {
        let mut json = serde_json::to_vec_pretty(self).map_err(|e| CliError::WriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        json.push(b'\n');
        write_file(path, &json)
    }
}
