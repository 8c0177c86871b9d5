//! Column registry and per-file normalisation.
//!
//! Each result table is parsed once. Headers are trimmed, the `test` key is
//! located, and the five known metric columns are recorded per algorithm in an
//! [`AlgorithmSchema`]. Later stages consult the schema instead of
//! re-deriving column sets from header strings; the algorithm-qualified names
//! (`total_cost_<algo>`, `N_<algo>`, ...) are produced from it on demand.
use std::collections::HashSet;

use serde::Serialize;

use crate::discovery::ResultFile;
use crate::error::MergeError;

/// Name of the join key column.
pub const TEST_COLUMN: &str = "test";

/// Cell texts read as null, in addition to the empty cell.
const NULL_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
];

// ---------------------------------------------------------------------------
// Column kinds
// ---------------------------------------------------------------------------

/// A configuration dimension of a test instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ConfigDim {
    /// `N`
    N,
    /// `M`
    M,
    /// `C`
    C,
}

impl ConfigDim {
    /// All dimensions in output order.
    pub const ALL: [Self; 3] = [Self::N, Self::M, Self::C];

    /// The column header.
    pub fn name(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::M => "M",
            Self::C => "C",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::N => 0,
            Self::M => 1,
            Self::C => 2,
        }
    }
}

/// A per-algorithm measurement column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    /// `total_cost`
    TotalCost,
    /// `millis`, elapsed time.
    Millis,
}

impl Metric {
    /// All metrics in output order.
    pub const ALL: [Self; 2] = [Self::TotalCost, Self::Millis];

    /// The unqualified column header.
    pub fn name(self) -> &'static str {
        match self {
            Self::TotalCost => "total_cost",
            Self::Millis => "millis",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::TotalCost => 0,
            Self::Millis => 1,
        }
    }
}

/// A header recognised by the normaliser. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KnownColumn {
    Test,
    Config(ConfigDim),
    Metric(Metric),
}

impl KnownColumn {
    fn classify(header: &str) -> Option<Self> {
        match header {
            TEST_COLUMN => Some(Self::Test),
            "N" => Some(Self::Config(ConfigDim::N)),
            "M" => Some(Self::Config(ConfigDim::M)),
            "C" => Some(Self::Config(ConfigDim::C)),
            "total_cost" => Some(Self::Metric(Metric::TotalCost)),
            "millis" => Some(Self::Metric(Metric::Millis)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Which known columns one algorithm's file provided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmSchema {
    /// Algorithm label.
    pub label: String,
    /// Source file name.
    pub file: String,
    config: [bool; 3],
    metrics: [bool; 2],
}

impl AlgorithmSchema {
    /// A schema with no metric columns.
    pub fn new(label: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            file: file.into(),
            config: [false; 3],
            metrics: [false; 2],
        }
    }

    /// Marks a configuration column as present.
    pub fn with_config(mut self, dim: ConfigDim) -> Self {
        self.config[dim.index()] = true;
        self
    }

    /// Marks a metric column as present.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics[metric.index()] = true;
        self
    }

    /// Whether the file had the `dim` column.
    pub fn has_config(&self, dim: ConfigDim) -> bool {
        self.config[dim.index()]
    }

    /// Whether the file had the `metric` column.
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics[metric.index()]
    }

    /// `<column>_<label>`.
    pub fn qualified(&self, column: &str) -> String {
        format!("{column}_{}", self.label)
    }

    /// The normalised headers this file contributes: `test` followed by the
    /// qualified names of every known column present.
    pub fn normalized_headers(&self) -> Vec<String> {
        let mut headers = vec![TEST_COLUMN.to_owned()];
        for metric in Metric::ALL {
            if self.has_metric(metric) {
                headers.push(self.qualified(metric.name()));
            }
        }
        for dim in ConfigDim::ALL {
            if self.has_config(dim) {
                headers.push(self.qualified(dim.name()));
            }
        }
        headers
    }
}

/// The schemas of every input, in discovery order. Positions in this registry
/// are the algorithm indices used by all later stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    algorithms: Vec<AlgorithmSchema>,
}

impl SchemaRegistry {
    /// Builds a registry from schemas already in discovery order.
    pub fn new(algorithms: Vec<AlgorithmSchema>) -> Self {
        Self { algorithms }
    }

    /// All schemas in discovery order.
    pub fn algorithms(&self) -> &[AlgorithmSchema] {
        &self.algorithms
    }

    /// Number of algorithms.
    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Indices of the algorithms that provided `metric`, in discovery order.
    pub fn with_metric(&self, metric: Metric) -> Vec<usize> {
        self.algorithms
            .iter()
            .enumerate()
            .filter(|(_, a)| a.has_metric(metric))
            .map(|(i, _)| i)
            .collect()
    }

    /// The first algorithm, in discovery order, that provided `dim`.
    pub fn config_source(&self, dim: ConfigDim) -> Option<usize> {
        self.algorithms.iter().position(|a| a.has_config(dim))
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// The `(N, M, C)` configuration key. Nulls compare equal to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConfigKey([Option<i64>; 3]);

impl ConfigKey {
    /// Builds a key from its three components.
    pub fn new(n: Option<i64>, m: Option<i64>, c: Option<i64>) -> Self {
        Self([n, m, c])
    }

    /// The value of one dimension.
    pub fn get(&self, dim: ConfigDim) -> Option<i64> {
        self.0[dim.index()]
    }

    /// Sets one dimension.
    pub fn set(&mut self, dim: ConfigDim, value: Option<i64>) {
        self.0[dim.index()] = value;
    }
}

/// The values one file reports for one test.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    /// Configuration as reported by this file.
    pub config: ConfigKey,
    /// `total_cost`, if present and non-null.
    pub total_cost: Option<f64>,
    /// `millis`, if present and non-null.
    pub millis: Option<f64>,
}

impl Measurements {
    /// The value of one metric.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalCost => self.total_cost,
            Metric::Millis => self.millis,
        }
    }
}

/// One row of one result table.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// Join key.
    pub test: String,
    /// 1-based source line, for diagnostics.
    pub line: u64,
    /// Known column values.
    pub values: Measurements,
}

/// One parsed result table together with its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// Which known columns the file carried.
    pub schema: AlgorithmSchema,
    /// Rows in file order.
    pub rows: Vec<NormalizedRow>,
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Parses the CSV text of `file` and normalises it under `file.label`.
///
/// Headers are compared after trimming surrounding whitespace; case is
/// significant. Every cell is trimmed too. Empty cells and common null
/// markers (`NaN`, `NA`, ...) in configuration and metric columns are null.
///
/// # Errors
///
/// - [`MergeError::Csv`]: the text is not well-formed CSV.
/// - [`MergeError::DuplicateColumn`]: a known header appears twice.
/// - [`MergeError::MissingTestColumn`]: no `test` header.
/// - [`MergeError::MissingTestValue`]: a row has an empty `test` cell.
/// - [`MergeError::InvalidValue`]: a configuration cell is not an integer or
///   a metric cell is not a number.
pub fn normalize(file: &ResultFile, contents: &str) -> Result<NormalizedTable, MergeError> {
    let csv_error = |e: csv::Error| MergeError::Csv {
        file: file.name.clone(),
        detail: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut schema = AlgorithmSchema::new(file.label.clone(), file.name.clone());
    let mut seen: HashSet<&str> = HashSet::new();
    let mut test_idx: Option<usize> = None;
    let mut columns: Vec<(usize, KnownColumn)> = Vec::new();

    for (idx, header) in headers.iter().enumerate() {
        let Some(kind) = KnownColumn::classify(header) else {
            continue;
        };
        if !seen.insert(header) {
            return Err(MergeError::DuplicateColumn {
                file: file.name.clone(),
                column: header.to_owned(),
            });
        }
        match kind {
            KnownColumn::Test => test_idx = Some(idx),
            KnownColumn::Config(dim) => {
                schema = schema.with_config(dim);
                columns.push((idx, kind));
            }
            KnownColumn::Metric(metric) => {
                schema = schema.with_metric(metric);
                columns.push((idx, kind));
            }
        }
    }

    let Some(test_idx) = test_idx else {
        return Err(MergeError::MissingTestColumn {
            file: file.name.clone(),
        });
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);

        let test = record.get(test_idx).unwrap_or_default();
        if test.is_empty() {
            return Err(MergeError::MissingTestValue {
                file: file.name.clone(),
                line,
            });
        }

        let mut values = Measurements::default();
        for &(idx, kind) in &columns {
            let cell = record.get(idx).unwrap_or_default();
            let invalid = |column: &str, expected: &'static str| MergeError::InvalidValue {
                file: file.name.clone(),
                line,
                column: column.to_owned(),
                expected,
                value: cell.to_owned(),
            };
            match kind {
                KnownColumn::Config(dim) => {
                    let value = parse_integer(cell).ok_or_else(|| invalid(dim.name(), "an integer"))?;
                    values.config.set(dim, value);
                }
                KnownColumn::Metric(Metric::TotalCost) => {
                    values.total_cost =
                        parse_number(cell).ok_or_else(|| invalid("total_cost", "a number"))?;
                }
                KnownColumn::Metric(Metric::Millis) => {
                    values.millis = parse_number(cell).ok_or_else(|| invalid("millis", "a number"))?;
                }
                KnownColumn::Test => {}
            }
        }

        rows.push(NormalizedRow {
            test: test.to_owned(),
            line,
            values,
        });
    }

    Ok(NormalizedTable { schema, rows })
}

fn is_null(cell: &str) -> bool {
    cell.is_empty() || NULL_MARKERS.contains(&cell)
}

/// `Some(None)` for a null cell, `Some(Some(v))` for an integer (a float with
/// no fractional part is accepted), `None` when the cell is not an integer.
fn parse_integer(cell: &str) -> Option<Option<i64>> {
    if is_null(cell) {
        return Some(None);
    }
    if let Ok(v) = cell.parse::<i64>() {
        return Some(Some(v));
    }
    let v = cell.parse::<f64>().ok()?;
    // Half-open: 2^63 itself would saturate to i64::MAX.
    if !(-I64_BOUND..I64_BOUND).contains(&v) || v.fract() != 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(Some(v as i64))
}

/// 2^63 as an `f64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// `Some(None)` for a null cell, `Some(Some(v))` for a number, `None` otherwise.
fn parse_number(cell: &str) -> Option<Option<f64>> {
    if is_null(cell) {
        return Some(None);
    }
    cell.parse::<f64>().ok().map(Some)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::wildcard_enum_match_arm)]

    use std::path::PathBuf;

    use super::*;

    fn result_file(label: &str) -> ResultFile {
        ResultFile {
            path: PathBuf::from(format!("results/results_{label}.csv")),
            name: format!("results_{label}.csv"),
            label: label.to_owned(),
        }
    }

    #[test]
    fn headers_are_trimmed_and_qualified() {
        let table = normalize(
            &result_file("A"),
            " test , N ,M, C,total_cost ,  millis\n1,5,2,1,10,100\n",
        )
        .expect("normalize");
        assert_eq!(
            table.schema.normalized_headers(),
            [
                "test",
                "total_cost_A",
                "millis_A",
                "N_A",
                "M_A",
                "C_A"
            ]
        );
        let row = &table.rows[0];
        assert_eq!(row.test, "1");
        assert_eq!(row.values.config, ConfigKey::new(Some(5), Some(2), Some(1)));
        assert_eq!(row.values.total_cost, Some(10.0));
        assert_eq!(row.values.millis, Some(100.0));
    }

    #[test]
    fn header_case_is_significant() {
        let err = normalize(&result_file("A"), "Test,total_cost\n1,2\n").expect_err("should fail");
        assert_eq!(
            err,
            MergeError::MissingTestColumn {
                file: "results_A.csv".to_owned()
            }
        );
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let table = normalize(&result_file("A"), "test,seed,total_cost\nx,42,3.5\n")
            .expect("normalize");
        assert_eq!(table.schema.normalized_headers(), ["test", "total_cost_A"]);
        assert!(!table.schema.has_metric(Metric::Millis));
        assert!(!table.schema.has_config(ConfigDim::N));
    }

    #[test]
    fn empty_and_marker_cells_are_null() {
        let table = normalize(
            &result_file("A"),
            "test,N,total_cost,millis\na,,NaN,\nb,3.0,1.5,NA\n",
        )
        .expect("normalize");
        assert_eq!(table.rows[0].values.config.get(ConfigDim::N), None);
        assert_eq!(table.rows[0].values.total_cost, None);
        assert_eq!(table.rows[0].values.millis, None);
        assert_eq!(table.rows[1].values.config.get(ConfigDim::N), Some(3));
        assert_eq!(table.rows[1].values.millis, None);
    }

    #[test]
    fn fractional_configuration_is_rejected() {
        let err = normalize(&result_file("A"), "test,N\na,1\nb,2.5\n").expect_err("should fail");
        match err {
            MergeError::InvalidValue {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "N");
                assert_eq!(value, "2.5");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_configuration_is_rejected() {
        for value in ["9223372036854775808", "9.3e18", "-1e19", "inf"] {
            let csv = format!("test,N\na,{value}\n");
            let err = normalize(&result_file("A"), &csv).expect_err(value);
            match err {
                MergeError::InvalidValue { column, value: v, .. } => {
                    assert_eq!(column, "N");
                    assert_eq!(v, value);
                }
                other => panic!("unexpected error for {value}: {other:?}"),
            }
        }
    }

    #[test]
    fn integral_float_configuration_at_the_range_edge_is_accepted() {
        let table = normalize(
            &result_file("A"),
            "test,N,M\na,-9223372036854775808,3.0\nb,9.2e18,1e3\n",
        )
        .expect("normalize");
        assert_eq!(table.rows[0].values.config.get(ConfigDim::N), Some(i64::MIN));
        assert_eq!(table.rows[0].values.config.get(ConfigDim::M), Some(3));
        assert_eq!(
            table.rows[1].values.config.get(ConfigDim::N),
            Some(9_200_000_000_000_000_000)
        );
        assert_eq!(table.rows[1].values.config.get(ConfigDim::M), Some(1000));
    }

    #[test]
    fn non_numeric_metric_is_rejected() {
        let err = normalize(&result_file("A"), "test,millis\na,fast\n").expect_err("should fail");
        assert!(matches!(err, MergeError::InvalidValue { .. }), "{err:?}");
    }

    #[test]
    fn empty_test_value_is_rejected() {
        let err = normalize(&result_file("A"), "test,millis\n,1\n").expect_err("should fail");
        assert_eq!(
            err,
            MergeError::MissingTestValue {
                file: "results_A.csv".to_owned(),
                line: 2
            }
        );
    }

    #[test]
    fn repeated_known_header_is_rejected() {
        let err = normalize(&result_file("A"), "test, millis,millis\na,1,2\n")
            .expect_err("should fail");
        assert!(matches!(err, MergeError::DuplicateColumn { .. }), "{err:?}");
    }

    #[test]
    fn ragged_rows_are_a_csv_error() {
        let err = normalize(&result_file("A"), "test,millis\na,1,9\n").expect_err("should fail");
        assert!(matches!(err, MergeError::Csv { .. }), "{err:?}");
    }

    #[test]
    fn empty_file_has_no_test_column() {
        let err = normalize(&result_file("A"), "").expect_err("should fail");
        assert!(matches!(err, MergeError::MissingTestColumn { .. }), "{err:?}");
    }

    #[test]
    fn registry_reports_first_config_source() {
        let registry = SchemaRegistry::new(vec![
            AlgorithmSchema::new("a", "results_a.csv").with_metric(Metric::TotalCost),
            AlgorithmSchema::new("b", "results_b.csv")
                .with_config(ConfigDim::N)
                .with_metric(Metric::Millis),
            AlgorithmSchema::new("c", "results_c.csv").with_config(ConfigDim::N),
        ]);
        assert_eq!(registry.config_source(ConfigDim::N), Some(1));
        assert_eq!(registry.config_source(ConfigDim::M), None);
        assert_eq!(registry.with_metric(Metric::TotalCost), [0]);
        assert_eq!(registry.with_metric(Metric::Millis), [1]);
    }
}
