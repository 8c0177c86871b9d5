//! Reconciliation of per-algorithm configuration columns.
//!
//! After the join every algorithm that reported `N`, `M` or `C` contributes its
//! own `N_<algo>`-style column. Each dimension collapses independently to the
//! first such column in discovery order; the other variants are discarded
//! without comparing their values.
use log::debug;

use crate::join::JoinedRow;
use crate::order::sort_by_test_key;
use crate::schema::{ConfigDim, ConfigKey, Metric, SchemaRegistry};

/// One row of the merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRow {
    /// Join key.
    pub test: String,
    /// Canonical configuration.
    pub config: ConfigKey,
    /// `total_cost` per algorithm, indexed by discovery position. Algorithms
    /// without the column hold `None`.
    pub total_cost: Vec<Option<f64>>,
    /// `millis` per algorithm, indexed like `total_cost`.
    pub millis: Vec<Option<f64>>,
}

impl CombinedRow {
    /// The value of `metric` for the algorithm at `algo`.
    pub fn metric(&self, metric: Metric, algo: usize) -> Option<f64> {
        let column = match metric {
            Metric::TotalCost => &self.total_cost,
            Metric::Millis => &self.millis,
        };
        column.get(algo).copied().flatten()
    }
}

/// The merged table with canonical configuration columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedTable {
    /// Schemas of every input, in discovery order.
    pub registry: SchemaRegistry,
    /// Rows, in join order until [`CombinedTable::sort_by_test`] is called.
    pub rows: Vec<CombinedRow>,
    sources: [Option<usize>; 3],
}

impl CombinedTable {
    /// The algorithm whose column became canonical `dim`, or `None` when no
    /// input had that column.
    pub fn config_source(&self, dim: ConfigDim) -> Option<usize> {
        self.sources[dim.index()]
    }

    /// Configuration dimensions that no input provided.
    pub fn missing_config(&self) -> Vec<ConfigDim> {
        ConfigDim::ALL
            .into_iter()
            .filter(|d| self.config_source(*d).is_none())
            .collect()
    }

    /// Sorts rows ascending by `test` in natural test order.
    pub fn sort_by_test(&mut self) {
        sort_by_test_key(&mut self.rows, |r| r.test.as_str());
    }
}

/// Collapses the joined rows into canonical `N`, `M`, `C` columns.
///
/// Dimensions with no source column are null on every row.
pub fn collapse(rows: Vec<JoinedRow>, registry: SchemaRegistry) -> CombinedTable {
    let sources = ConfigDim::ALL.map(|dim| registry.config_source(dim));
    for (dim, source) in ConfigDim::ALL.iter().zip(&sources) {
        match source {
            Some(algo) => debug!(
                "{} taken from {}",
                dim.name(),
                registry.algorithms()[*algo].qualified(dim.name())
            ),
            None => debug!("{} absent from every input", dim.name()),
        }
    }

    let width = registry.len();
    let cost_algos = registry.with_metric(Metric::TotalCost);
    let time_algos = registry.with_metric(Metric::Millis);

    let rows = rows
        .into_iter()
        .map(|row| {
            let mut config = ConfigKey::default();
            for (dim, source) in ConfigDim::ALL.iter().zip(&sources) {
                let value = (*source)
                    .and_then(|algo| row.per_algorithm.get(algo))
                    .and_then(|m| m.config.get(*dim));
                config.set(*dim, value);
            }

            let mut total_cost = vec![None; width];
            for &algo in &cost_algos {
                total_cost[algo] = row.per_algorithm.get(algo).and_then(|m| m.total_cost);
            }
            let mut millis = vec![None; width];
            for &algo in &time_algos {
                millis[algo] = row.per_algorithm.get(algo).and_then(|m| m.millis);
            }

            CombinedRow {
                test: row.test,
                config,
                total_cost,
                millis,
            }
        })
        .collect();

    CombinedTable {
        registry,
        rows,
        sources,
    }
}
