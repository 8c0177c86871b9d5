//! CSV rendering of the two output tables.
//!
//! Rendering happens entirely in memory so that every fatal condition is
//! detected before the caller writes a single byte.
//!
//! Column names follow a fixed contract consumed by downstream plotting:
//! `test`, `N`, `M`, `C`, then `total_cost_<algo>` columns and `millis_<algo>`
//! columns, each group in discovery order. Plotters locate algorithms by the
//! `total_cost_` prefix and strip it to get the display name.
use crate::aggregate::GroupedTable;
use crate::collapse::CombinedTable;
use crate::error::MergeError;
use crate::schema::{ConfigDim, ConfigKey, Metric, TEST_COLUMN};

/// Headers of the merged table.
pub fn combined_headers(table: &CombinedTable) -> Vec<String> {
    let mut headers = vec![TEST_COLUMN.to_owned()];
    headers.extend(ConfigDim::ALL.iter().map(|d| d.name().to_owned()));
    let algorithms = table.registry.algorithms();
    for metric in Metric::ALL {
        for algo in table.registry.with_metric(metric) {
            headers.push(algorithms[algo].qualified(metric.name()));
        }
    }
    headers
}

/// Headers of the grouped summary table.
pub fn grouped_headers(grouped: &GroupedTable) -> Vec<String> {
    let mut headers: Vec<String> = ["group_id", "N", "M", "C", "test_count", "avg_total_cost"]
        .iter()
        .map(|h| (*h).to_owned())
        .collect();
    headers.extend(
        grouped
            .millis_labels
            .iter()
            .map(|label| format!("avg_millis_{label}")),
    );
    headers
}

/// Renders the merged table as CSV, rows in their current order.
///
/// # Errors
///
/// Returns [`MergeError::Render`] if the CSV writer fails.
pub fn render_combined(table: &CombinedTable) -> Result<Vec<u8>, MergeError> {
    let fail = |e: &dyn std::fmt::Display| MergeError::Render {
        table: "merged table",
        detail: e.to_string(),
    };
    let cost_algos = table.registry.with_metric(Metric::TotalCost);
    let time_algos = table.registry.with_metric(Metric::Millis);

    let mut writer = csv_writer();
    writer
        .write_record(combined_headers(table))
        .map_err(|e| fail(&e))?;
    for row in &table.rows {
        let mut record = vec![row.test.clone()];
        record.extend(config_cells(&row.config));
        for &algo in &cost_algos {
            record.push(format_value(row.metric(Metric::TotalCost, algo)));
        }
        for &algo in &time_algos {
            record.push(format_value(row.metric(Metric::Millis, algo)));
        }
        writer.write_record(&record).map_err(|e| fail(&e))?;
    }
    writer.into_inner().map_err(|e| fail(&e))
}

/// Renders the grouped summary as CSV.
///
/// # Errors
///
/// Returns [`MergeError::Render`] if the CSV writer fails.
pub fn render_grouped(grouped: &GroupedTable) -> Result<Vec<u8>, MergeError> {
    let fail = |e: &dyn std::fmt::Display| MergeError::Render {
        table: "grouped table",
        detail: e.to_string(),
    };

    let mut writer = csv_writer();
    writer
        .write_record(grouped_headers(grouped))
        .map_err(|e| fail(&e))?;
    for row in &grouped.rows {
        let mut record = vec![row.group_id.to_string()];
        record.extend(config_cells(&row.config));
        record.push(row.test_count.to_string());
        record.push(format_average(row.avg_total_cost));
        record.extend(row.avg_millis.iter().map(|v| format_average(*v)));
        writer.write_record(&record).map_err(|e| fail(&e))?;
    }
    writer.into_inner().map_err(|e| fail(&e))
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn config_cells(config: &ConfigKey) -> impl Iterator<Item = String> + '_ {
    ConfigDim::ALL
        .into_iter()
        .map(|d| config.get(d).map(|v| v.to_string()).unwrap_or_default())
}

/// Shortest round-trip form: `10`, `10.5`. Null is the empty cell.
fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Like [`format_value`] but always carries a decimal point: `11.0`,
/// `1.3333`, never exponent form. Null is the empty cell.
fn format_average(value: Option<f64>) -> String {
    value
        .map(|v| {
            let text = v.to_string();
            if v.is_finite() && v.fract() == 0.0 {
                format!("{text}.0")
            } else {
                text
            }
        })
        .unwrap_or_default()
}
