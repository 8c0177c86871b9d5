//! Group-by `(N, M, C)` summary of the merged table.
//!
//! Groups are keyed by the exact configuration tuple, with null equal to null,
//! and emitted in order of first appearance in the (already sorted) merged
//! table. Each group is reduced by an explicit fold over its rows.
use std::collections::HashMap;

use crate::collapse::CombinedTable;
use crate::schema::{ConfigKey, Metric};

/// One row of the grouped summary.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// Sequential id starting at 1, in emission order.
    pub group_id: usize,
    /// The group key.
    pub config: ConfigKey,
    /// Number of merged rows in the group.
    pub test_count: usize,
    /// Mean across algorithms of each algorithm's mean `total_cost`.
    pub avg_total_cost: Option<f64>,
    /// Mean `millis` per algorithm, aligned with [`GroupedTable::millis_labels`].
    pub avg_millis: Vec<Option<f64>>,
}

/// The grouped summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedTable {
    /// Algorithms with a `millis` column, sorted alphabetically by label.
    pub millis_labels: Vec<String>,
    /// Groups in emission order.
    pub rows: Vec<GroupRow>,
}

/// Running arithmetic mean that ignores nulls.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Rounds half to even at `decimals` places. Non-finite values pass through.
pub fn round_to(value: f64, decimals: u8) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(i32::from(decimals));
    (value * factor).round_ties_even() / factor
}

/// Summarises `table` by configuration.
///
/// Returns `None` when any of `N`, `M`, `C` had no source column; the caller
/// reports that as a warning.
pub fn aggregate(table: &CombinedTable, decimals: u8) -> Option<GroupedTable> {
    if !table.missing_config().is_empty() {
        return None;
    }

    let mut order: Vec<ConfigKey> = Vec::new();
    let mut members: HashMap<ConfigKey, Vec<usize>> = HashMap::new();
    for (idx, row) in table.rows.iter().enumerate() {
        members
            .entry(row.config)
            .or_insert_with(|| {
                order.push(row.config);
                Vec::new()
            })
            .push(idx);
    }

    let algorithms = table.registry.algorithms();
    let cost_algos = table.registry.with_metric(Metric::TotalCost);
    let mut time_algos = table.registry.with_metric(Metric::Millis);
    time_algos.sort_by(|a, b| algorithms[*a].label.cmp(&algorithms[*b].label));

    let rows = order
        .iter()
        .enumerate()
        .map(|(n, key)| {
            let indices = members.get(key).map_or(&[][..], Vec::as_slice);
            let group_mean = |metric: Metric, algo: usize| {
                let mut mean = Mean::default();
                for &i in indices {
                    mean.push(table.rows[i].metric(metric, algo));
                }
                mean.value()
            };

            let mut cost = Mean::default();
            for &algo in &cost_algos {
                cost.push(group_mean(Metric::TotalCost, algo));
            }

            GroupRow {
                group_id: n + 1,
                config: *key,
                test_count: indices.len(),
                avg_total_cost: cost.value().map(|v| round_to(v, decimals)),
                avg_millis: time_algos
                    .iter()
                    .map(|&algo| group_mean(Metric::Millis, algo).map(|v| round_to(v, decimals)))
                    .collect(),
            }
        })
        .collect();

    Some(GroupedTable {
        millis_labels: time_algos
            .iter()
            .map(|&algo| algorithms[algo].label.clone())
            .collect(),
        rows,
    })
}
