#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use std::path::PathBuf;

use super::*;

fn input(label: &str, contents: &str) -> ResultInput {
    let name = format!("results_{label}.csv");
    ResultInput {
        file: ResultFile {
            path: PathBuf::from("results").join(&name),
            name,
            label: label.to_owned(),
        },
        contents: contents.to_owned(),
    }
}

fn text(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).expect("utf8")
}

#[test]
fn two_file_example_produces_both_tables() {
    let inputs = [
        input("A", "test,N,M,C,total_cost,millis\n1,5,2,1,10,100\n"),
        input("B", "test,N,M,C,total_cost,millis\n1,5,2,1,12,120\n"),
    ];
    let out = merge_results(&inputs).expect("merge");
    assert_eq!(
        text(&out.combined_csv),
        "test,N,M,C,total_cost_A,total_cost_B,millis_A,millis_B\n1,5,2,1,10,12,100,120\n"
    );
    let grouped = out.grouped_csv.expect("grouped output");
    assert_eq!(
        text(&grouped),
        "group_id,N,M,C,test_count,avg_total_cost,avg_millis_A,avg_millis_B\n\
         1,5,2,1,1,11.0,100.0,120.0\n"
    );
    assert!(out.warnings.is_empty());
    assert_eq!(out.common_tests, 1);
}

#[test]
fn partial_overlap_keeps_intersection_and_warns_per_file() {
    let inputs = [
        input("X", "test,N,M,C,total_cost\n1,1,1,1,1\n2,1,1,1,2\n"),
        input("Y", "test,N,M,C,total_cost\n2,1,1,1,2\n3,1,1,1,3\n"),
    ];
    let out = merge_results(&inputs).expect("merge");
    let tests: Vec<&str> = out.combined.rows.iter().map(|r| r.test.as_str()).collect();
    assert_eq!(tests, ["2"]);
    assert_eq!(out.warnings.len(), 2);
    assert_eq!(
        out.algorithms,
        [
            AlgorithmSummary {
                label: "X".to_owned(),
                file: "results_X.csv".to_owned(),
                rows: 2,
            },
            AlgorithmSummary {
                label: "Y".to_owned(),
                file: "results_Y.csv".to_owned(),
                rows: 2,
            },
        ]
    );
}

#[test]
fn missing_dimension_skips_grouped_output_with_warning() {
    let inputs = [
        input("A", "test,N,M,total_cost\n1,5,2,10\n"),
        input("B", "test,N,M,total_cost\n1,5,2,12\n"),
    ];
    let out = merge_results(&inputs).expect("merge");
    assert!(out.grouped.is_none());
    assert!(out.grouped_csv.is_none());
    assert_eq!(
        out.warnings,
        [MergeWarning::MissingGroupingColumns {
            missing: vec!["C".to_owned()],
        }]
    );
    assert_eq!(
        text(&out.combined_csv),
        "test,N,M,C,total_cost_A,total_cost_B\n1,5,2,,10,12\n"
    );
}

#[test]
fn rows_are_sorted_numerically_when_every_test_is_an_integer() {
    let body = "test,N,M,C,millis\n10,1,1,1,1\n9,1,1,1,1\n100,1,1,1,1\n";
    let out = merge_results(&[input("A", body), input("B", body)]).expect("merge");
    let tests: Vec<&str> = out.combined.rows.iter().map(|r| r.test.as_str()).collect();
    assert_eq!(tests, ["9", "10", "100"]);
}

#[test]
fn metric_columns_follow_discovery_order_not_label_order() {
    let inputs = [
        input("zeta", "test,N,M,C,total_cost,millis\n1,1,1,1,1,9\n"),
        input("alpha", "test,N,M,C,total_cost,millis\n1,1,1,1,2,8\n"),
    ];
    let out = merge_results(&inputs).expect("merge");
    let merged = text(&out.combined_csv);
    assert!(
        merged.starts_with("test,N,M,C,total_cost_zeta,total_cost_alpha,millis_zeta,millis_alpha\n"),
        "{merged}"
    );
    // The grouped table lists millis averages alphabetically.
    let grouped = out.grouped_csv.expect("grouped output");
    assert!(
        text(&grouped).starts_with(
            "group_id,N,M,C,test_count,avg_total_cost,avg_millis_alpha,avg_millis_zeta\n"
        ),
        "{}",
        text(&grouped)
    );
}

#[test]
fn duplicate_key_aborts_before_rendering() {
    let inputs = [
        input("A", "test,total_cost\n1,1\n1,2\n"),
        input("B", "test,total_cost\n1,1\n"),
    ];
    let err = merge_results(&inputs).expect_err("should fail");
    assert!(matches!(err, MergeError::DuplicateTestKey { .. }), "{err:?}");
}

#[test]
fn missing_test_column_names_the_file() {
    let inputs = [
        input("A", "test,total_cost\n1,1\n"),
        input("B", "id,total_cost\n1,1\n"),
    ];
    let err = merge_results(&inputs).expect_err("should fail");
    assert_eq!(
        err,
        MergeError::MissingTestColumn {
            file: "results_B.csv".to_owned(),
        }
    );
}

#[test]
fn fewer_than_two_inputs_is_rejected() {
    let err = merge_results(&[]).expect_err("should fail");
    assert!(matches!(err, MergeError::NoMatchingFiles { .. }), "{err:?}");

    let err = merge_results(&[input("A", "test\n1\n")]).expect_err("should fail");
    assert_eq!(
        err,
        MergeError::SingleFileOnly {
            file: PathBuf::from("results/results_A.csv"),
        }
    );
}

#[test]
fn rounding_precision_is_configurable() {
    let inputs = [
        input("A", "test,N,M,C,total_cost\n1,1,1,1,1\n2,1,1,1,1\n3,1,1,1,2\n"),
        input("B", "test,N,M,C,total_cost\n1,1,1,1,1\n2,1,1,1,1\n3,1,1,1,2\n"),
    ];
    let config = MergeConfig {
        round_decimals: 2,
        ..MergeConfig::default()
    };
    let out = merge_results_with_config(&inputs, &config).expect("merge");
    let grouped = out.grouped.expect("grouped");
    assert_eq!(grouped.rows[0].avg_total_cost, Some(1.33));
}

#[test]
fn rerun_is_byte_identical() {
    let inputs = [
        input("A", "test,N,M,C,total_cost,millis\nb,1,1,1,1,2\na,2,1,1,3,4\n"),
        input("B", "test,N,M,C,total_cost,millis\na,2,1,1,5,6\nb,1,1,1,7,8\n"),
    ];
    let first = merge_results(&inputs).expect("merge");
    let second = merge_results(&inputs).expect("merge");
    assert_eq!(first.combined_csv, second.combined_csv);
    assert_eq!(first.grouped_csv, second.grouped_csv);
}
