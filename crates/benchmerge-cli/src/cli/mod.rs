//! Clap CLI definition.
use std::path::PathBuf;

use clap::Parser;

/// Merge per-algorithm benchmark result CSVs into comparison tables.
///
/// Reads every `result*.csv` file in the results directory, joins them on
/// `test`, and writes a merged table plus a per-configuration summary next to
/// the inputs.
#[derive(Parser, Debug)]
#[command(name = "benchmerge", version, about, long_about = None)]
pub struct Cli {
    /// Candidate root directory, tried in order. The first one holding a
    /// results directory wins; if none does, it is created under the first.
    ///
    /// Default: `.` then `/mnt/data`.
    #[arg(long = "root", value_name = "DIR", default_values = [".", "/mnt/data"])]
    pub roots: Vec<PathBuf>,

    /// Name of the results directory under each root.
    #[arg(long, value_name = "NAME", default_value = "results")]
    pub results_dir_name: String,

    /// File name of the merged table, written inside the results directory.
    #[arg(long, value_name = "NAME", default_value = "combined_results.csv")]
    pub output: String,

    /// File name of the grouped summary, written inside the results directory.
    #[arg(long, value_name = "NAME", default_value = "combined_results_grouped.csv")]
    pub grouped_output: String,

    /// Write a JSON run report to this path after both tables are written.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `BENCHMERGE_MAX_FILE_SIZE` environment
    /// variable. The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(long, env = "BENCHMERGE_MAX_FILE_SIZE", default_value = "268435456")]
    pub max_file_size: u64,

    /// Only log errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug detail such as which file supplied each configuration
    /// column (incompatible with `--quiet`).
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,
}
