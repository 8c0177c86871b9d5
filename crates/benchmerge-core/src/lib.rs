#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod aggregate;
pub mod collapse;
pub mod discovery;
pub mod error;
pub mod join;
pub mod order;
pub mod pipeline;
pub mod render;
pub mod schema;

pub use aggregate::{GroupRow, GroupedTable, aggregate, round_to};
pub use collapse::{CombinedRow, CombinedTable, collapse};
pub use discovery::{
    RESULT_EXTENSION, RESULT_PREFIX, ResultFile, algorithm_label, is_result_file,
    select_result_files,
};
pub use error::{MergeError, MergeWarning};
pub use join::{JoinOutput, JoinedRow, join_tables};
pub use order::{sort_by_test_key, sort_test_ids};
pub use pipeline::{
    AlgorithmSummary, MergeConfig, MergeOutput, ResultInput, merge_results,
    merge_results_with_config,
};
pub use render::{combined_headers, grouped_headers, render_combined, render_grouped};
pub use schema::{
    AlgorithmSchema, ConfigDim, ConfigKey, Measurements, Metric, NormalizedRow, NormalizedTable,
    SchemaRegistry, TEST_COLUMN, normalize,
};

/// Returns the library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }
}
