//! The single `benchmerge` command.
//!
//! Resolves the results directory, reads every result file, runs the merge
//! pipeline and writes both tables next to the inputs. Nothing is written
//! until the pipeline has rendered both tables, so a fatal error leaves the
//! directory untouched.
use benchmerge_core::{ResultInput, merge_results, select_result_files};
use log::{info, warn};

use crate::cli::Cli;
use crate::error::CliError;
use crate::io::{list_files, read_file, remove_file_if_present, write_file};
use crate::locate::resolve_results_dir;
use crate::report::RunReport;

/// Runs one merge.
///
/// # Errors
///
/// Returns the first [`CliError`] encountered; see [`CliError::exit_code`]
/// for the exit code mapping.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let results_dir = resolve_results_dir(&cli.roots, &cli.results_dir_name)?;
    let files = select_result_files(&results_dir, list_files(&results_dir)?)?;

    let mut inputs = Vec::with_capacity(files.len());
    for file in files {
        let contents = read_file(&file.path, cli.max_file_size)?;
        inputs.push(ResultInput { file, contents });
    }

    let output = merge_results(&inputs)?;

    let merged_path = results_dir.join(&cli.output);
    write_file(&merged_path, &output.combined_csv)?;
    info!("written: {}", merged_path.display());
    let mut outputs = vec![merged_path];

    let grouped_path = results_dir.join(&cli.grouped_output);
    if let Some(grouped_csv) = &output.grouped_csv {
        write_file(&grouped_path, grouped_csv)?;
        info!("written: {}", grouped_path.display());
        outputs.push(grouped_path);
    } else if remove_file_if_present(&grouped_path)? {
        // An earlier run's summary no longer matches the merged table.
        warn!("removed stale {}", grouped_path.display());
    }

    if let Some(report_path) = &cli.report {
        RunReport::new(&results_dir, &output, &outputs).write(report_path)?;
        info!("report written: {}", report_path.display());
    }

    Ok(())
}
