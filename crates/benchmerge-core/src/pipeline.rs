//! Full merge pipeline over the selected result tables.
//!
//! The stages run strictly in sequence, each consuming the previous stage's
//! output:
//!
//! 1. Per-file normalisation into an [`AlgorithmSchema`] and typed rows.
//! 2. Relational merge on `test` with intersection semantics.
//! 3. Collapse of per-algorithm `N`, `M`, `C` into canonical columns.
//! 4. Natural sort by `test`.
//! 5. Group-by `(N, M, C)` summary, skipped with a warning when a dimension
//!    has no source.
//! 6. In-memory CSV rendering of both tables.
//!
//! The primary entry point is [`merge_results`].
use log::{info, warn};
use serde::Serialize;

use crate::aggregate::{GroupedTable, aggregate};
use crate::collapse::{CombinedTable, collapse};
use crate::discovery::ResultFile;
use crate::error::{MergeError, MergeWarning};
use crate::join::join_tables;
use crate::render::{render_combined, render_grouped};
use crate::schema::{AlgorithmSchema, SchemaRegistry, normalize};

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Configuration for the merge pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// Maximum number of repeated `test` values listed in a
    /// [`MergeError::DuplicateTestKey`].
    ///
    /// Default: 10.
    pub duplicate_preview: usize,

    /// Maximum number of dropped `test` values listed in a
    /// [`MergeWarning::DroppedTests`].
    ///
    /// Default: 20.
    pub dropped_preview: usize,

    /// Decimal places kept in grouped averages.
    ///
    /// Default: 4.
    pub round_decimals: u8,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            duplicate_preview: 10,
            dropped_preview: 20,
            round_decimals: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

/// One selected result file together with its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultInput {
    /// The file as selected by [`crate::discovery::select_result_files`].
    pub file: ResultFile,
    /// Full CSV text.
    pub contents: String,
}

/// Per-algorithm summary of one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmSummary {
    /// Algorithm label.
    pub label: String,
    /// Source file name.
    pub file: String,
    /// Data rows read from the file, before the intersection.
    pub rows: usize,
}

/// The result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// One entry per input, in discovery order.
    pub algorithms: Vec<AlgorithmSummary>,
    /// Number of `test` values present in every input.
    pub common_tests: usize,
    /// The merged table, sorted by `test`.
    pub combined: CombinedTable,
    /// The grouped summary, or `None` when grouping was skipped.
    pub grouped: Option<GroupedTable>,
    /// Rendered merged table.
    pub combined_csv: Vec<u8>,
    /// Rendered grouped summary, present exactly when `grouped` is.
    pub grouped_csv: Option<Vec<u8>>,
    /// Non-fatal warnings in the order they were raised.
    pub warnings: Vec<MergeWarning>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Merges the given result files using the default [`MergeConfig`].
///
/// # Errors
///
/// See [`merge_results_with_config`].
pub fn merge_results(inputs: &[ResultInput]) -> Result<MergeOutput, MergeError> {
    merge_results_with_config(inputs, &MergeConfig::default())
}

/// Merges the given result files, in the order given, using `config`.
///
/// `inputs` is expected to come from
/// [`crate::discovery::select_result_files`], which already rejects fewer than
/// two files; the check is repeated here for direct callers.
///
/// # Errors
///
/// Returns the first fatal [`MergeError`] raised by any stage. No output is
/// rendered when an error is returned.
pub fn merge_results_with_config(
    inputs: &[ResultInput],
    config: &MergeConfig,
) -> Result<MergeOutput, MergeError> {
    match inputs {
        [] => {
            return Err(MergeError::NoMatchingFiles {
                dir: std::path::PathBuf::new(),
            });
        }
        [only] => {
            return Err(MergeError::SingleFileOnly {
                file: only.file.path.clone(),
            });
        }
        [_, _, ..] => {}
    }

    // Step 1: normalise every input.
    let mut tables = Vec::with_capacity(inputs.len());
    for input in inputs {
        info!("load {} -> algo='{}'", input.file.name, input.file.label);
        tables.push(normalize(&input.file, &input.contents)?);
    }
    let algorithms = tables
        .iter()
        .map(|t| AlgorithmSummary {
            label: t.schema.label.clone(),
            file: t.schema.file.clone(),
            rows: t.rows.len(),
        })
        .collect();

    // Step 2: relational merge.
    let joined = join_tables(&tables, config)?;
    let mut warnings = joined.warnings;

    // Steps 3 and 4: canonical configuration columns, then test order.
    let registry = SchemaRegistry::new(
        tables
            .into_iter()
            .map(|t| t.schema)
            .collect::<Vec<AlgorithmSchema>>(),
    );
    let mut combined = collapse(joined.rows, registry);
    combined.sort_by_test();

    // Step 5: grouped summary.
    let grouped = aggregate(&combined, config.round_decimals);
    if grouped.is_none() {
        let warning = MergeWarning::MissingGroupingColumns {
            missing: combined
                .missing_config()
                .iter()
                .map(|d| d.name().to_owned())
                .collect(),
        };
        warn!("{warning}");
        warnings.push(warning);
    }

    // Step 6: render both tables before anything is written.
    let combined_csv = render_combined(&combined)?;
    let grouped_csv = grouped.as_ref().map(render_grouped).transpose()?;

    info!("merged rows = {}", combined.rows.len());
    if let Some(g) = &grouped {
        info!("grouped rows = {}", g.rows.len());
    }

    Ok(MergeOutput {
        algorithms,
        common_tests: joined.common_tests,
        combined,
        grouped,
        combined_csv,
        grouped_csv,
        warnings,
    })
}

#[cfg(test)]
mod tests;
