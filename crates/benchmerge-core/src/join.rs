//! Relational merge of all normalised tables on `test`.
//!
//! The merge runs in five steps:
//!
//! 1. Per-file key uniqueness check.
//! 2. Cross-file key intersection, with a warning for every file whose keys
//!    reach outside it.
//! 3. Empty-intersection guard.
//! 4. Restriction of every table to the intersection.
//! 5. Sequential one-to-one inner joins, left to right in discovery order.
//!
//! Step 5 re-checks cardinality on every join even though steps 1-4 already
//! guarantee it; a mismatch there is an internal invariant violation.
use std::collections::{HashMap, HashSet};

use log::{info, warn};

use crate::error::{MergeError, MergeWarning};
use crate::order::sort_test_ids;
use crate::pipeline::MergeConfig;
use crate::schema::{Measurements, NormalizedTable};

/// One test after joining: the values every algorithm reported for it, indexed
/// by algorithm position in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    /// Join key.
    pub test: String,
    /// One entry per algorithm.
    pub per_algorithm: Vec<Measurements>,
}

/// Result of [`join_tables`].
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutput {
    /// Joined rows in the first table's row order.
    pub rows: Vec<JoinedRow>,
    /// Size of the cross-file key intersection.
    pub common_tests: usize,
    /// One [`MergeWarning::DroppedTests`] per file that lost rows.
    pub warnings: Vec<MergeWarning>,
}

/// Joins `tables` (in discovery order) on `test` with intersection semantics.
///
/// # Errors
///
/// - [`MergeError::DuplicateTestKey`]: a table repeats a `test` value.
/// - [`MergeError::EmptyIntersection`]: no `test` value is in every table.
/// - [`MergeError::JoinCardinalityViolation`]: a join step was not one-to-one.
pub fn join_tables(
    tables: &[NormalizedTable],
    config: &MergeConfig,
) -> Result<JoinOutput, MergeError> {
    // Step 1: uniqueness.
    for table in tables {
        check_unique(table, config.duplicate_preview)?;
    }

    // Step 2: intersection.
    let key_sets: Vec<HashSet<&str>> = tables
        .iter()
        .map(|t| t.rows.iter().map(|r| r.test.as_str()).collect())
        .collect();
    let common: HashSet<&str> = match key_sets.split_first() {
        Some((first, rest)) => first
            .iter()
            .copied()
            .filter(|k| rest.iter().all(|s| s.contains(k)))
            .collect(),
        None => HashSet::new(),
    };
    info!("common tests across all files = {}", common.len());

    let mut warnings = Vec::new();
    for (table, keys) in tables.iter().zip(&key_sets) {
        let mut dropped: Vec<&str> = keys.difference(&common).copied().collect();
        if dropped.is_empty() {
            continue;
        }
        sort_test_ids(&mut dropped);
        let warning = MergeWarning::DroppedTests {
            algorithm: table.schema.label.clone(),
            preview: dropped
                .iter()
                .take(config.dropped_preview)
                .map(|s| (*s).to_owned())
                .collect(),
            total: dropped.len(),
        };
        warn!("{warning}");
        warnings.push(warning);
    }

    // Step 3: empty-intersection guard.
    if common.is_empty() {
        return Err(MergeError::EmptyIntersection {
            files: tables.iter().map(|t| t.schema.file.clone()).collect(),
        });
    }

    // Step 4: restrict to the intersection.
    let filtered: Vec<Vec<(&str, &Measurements)>> = tables
        .iter()
        .map(|t| {
            t.rows
                .iter()
                .filter(|r| common.contains(r.test.as_str()))
                .map(|r| (r.test.as_str(), &r.values))
                .collect()
        })
        .collect();

    // Step 5: sequential one-to-one inner joins.
    let Some((first, rest)) = filtered.split_first() else {
        return Err(MergeError::EmptyIntersection { files: Vec::new() });
    };
    let mut rows: Vec<JoinedRow> = first
        .iter()
        .map(|(test, values)| JoinedRow {
            test: (*test).to_owned(),
            per_algorithm: vec![**values],
        })
        .collect();

    for (offset, right) in rest.iter().enumerate() {
        let algorithm = &tables[offset + 1].schema.label;
        rows = join_one_to_one(rows, right, algorithm)?;
    }

    info!("rows after intersecting all tests = {}", rows.len());

    Ok(JoinOutput {
        rows,
        common_tests: common.len(),
        warnings,
    })
}

/// Fails if any `test` value occurs more than once in `table`.
fn check_unique(table: &NormalizedTable, preview_limit: usize) -> Result<(), MergeError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut repeated: Vec<&str> = Vec::new();
    for row in &table.rows {
        let count = counts.entry(row.test.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            repeated.push(row.test.as_str());
        }
    }
    if repeated.is_empty() {
        return Ok(());
    }
    Err(MergeError::DuplicateTestKey {
        algorithm: table.schema.label.clone(),
        file: table.schema.file.clone(),
        preview: repeated
            .iter()
            .take(preview_limit)
            .map(|s| (*s).to_owned())
            .collect(),
        total: repeated.len(),
    })
}

/// Inner-joins `right` onto `left`, requiring every key on either side to
/// appear exactly once on both sides. Left row order is kept.
fn join_one_to_one(
    left: Vec<JoinedRow>,
    right: &[(&str, &Measurements)],
    algorithm: &str,
) -> Result<Vec<JoinedRow>, MergeError> {
    let mut left_counts: HashMap<&str, usize> = HashMap::new();
    for row in &left {
        *left_counts.entry(row.test.as_str()).or_insert(0) += 1;
    }
    let mut right_index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, (test, _)) in right.iter().enumerate() {
        right_index.entry(*test).or_default().push(idx);
    }

    let violation = |test: &str, left: usize, right: usize| MergeError::JoinCardinalityViolation {
        algorithm: algorithm.to_owned(),
        test: test.to_owned(),
        left,
        right,
    };

    for (test, _) in right {
        let left_n = left_counts.get(test).copied().unwrap_or(0);
        let right_n = right_index.get(test).map_or(0, Vec::len);
        if left_n != 1 || right_n != 1 {
            return Err(violation(*test, left_n, right_n));
        }
    }
    for row in &left {
        let left_n = left_counts.get(row.test.as_str()).copied().unwrap_or(0);
        let right_n = right_index.get(row.test.as_str()).map_or(0, Vec::len);
        if left_n != 1 || right_n != 1 {
            return Err(violation(&row.test, left_n, right_n));
        }
    }

    let mut joined = Vec::with_capacity(left.len());
    for mut row in left {
        let Some(&[idx]) = right_index.get(row.test.as_str()).map(Vec::as_slice) else {
            return Err(violation(&row.test, 1, 0));
        };
        row.per_algorithm.push(*right[idx].1);
        joined.push(row);
    }
    Ok(joined)
}
