//! Integration tests for the flavor data preparation pipeline.
//!
//! These tests verify end-to-end behavior of the pipeline using CSV
//! fixtures shaped like the merged recipe/dessert dataset.

use flavor_prep::{
    FlavorVocabulary, Pipeline, PipelineConfig, PrepError, UnknownTokenPolicy, encode_request,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn in_memory_pipeline() -> Pipeline {
    Pipeline::builder()
        .config(
            PipelineConfig::builder()
                .save_to_disk(false)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn temp_output_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flavor-prep-it-{}-{}", tag, std::process::id()))
}

fn indicator(df: &DataFrame, column: &str, row: usize) -> u8 {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .u8()
        .unwrap()
        .get(row)
        .unwrap()
}

/// The tokens the fixture's six surviving records produce, sorted.
const EXPECTED_VOCABULARY: [&str; 12] = [
    "basil",
    "bay_leaf",
    "butter",
    "chocolate",
    "cream",
    "earl_grey",
    "graham_cracker",
    "lemon",
    "toffee",
    "tomato",
    "vanilla",
    "whiskey",
];

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_merged_subset() {
    let df = load_csv("merged_subset.csv");

    let result = in_memory_pipeline().process(df).unwrap();

    // Two rows hold a missing required value (rating, flavors).
    assert_eq!(result.summary.rows_before, 8);
    assert_eq!(result.summary.rows_after, 6);
    assert_eq!(result.summary.rows_dropped, 2);

    // The extra "calories" column is projected away.
    assert_eq!(result.summary.columns_before, 7);
    assert_eq!(result.summary.vocabulary_size, EXPECTED_VOCABULARY.len());
    assert_eq!(result.vocabulary.tokens(), EXPECTED_VOCABULARY);

    // Retained columns first (in required order, minus flavors), then one
    // indicator per vocabulary token, in vocabulary order.
    let names: Vec<String> = result
        .encoded
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    let mut expected: Vec<String> = ["recipe_name", "aggregateRating", "willMakeAgainPct", "reviewsCount", "url"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    expected.extend(EXPECTED_VOCABULARY.iter().map(|s| s.to_string()));
    assert_eq!(names, expected);

    // Nothing was written.
    assert!(result.summary.artifacts_written.is_empty());
}

#[test]
fn test_encoding_width_invariant() {
    let df = load_csv("merged_subset.csv");
    let result = in_memory_pipeline().process(df).unwrap();

    let retained = result.summary.columns_after - result.vocabulary.len();
    assert_eq!(retained, 5);
    assert_eq!(
        result.summary.columns_after,
        retained + result.vocabulary.len()
    );
    assert_eq!(result.encoded.height(), result.summary.rows_after);
}

#[test]
fn test_cleaned_flavors_are_sorted_deduplicated_tokens() {
    let df = load_csv("merged_subset.csv");
    let result = in_memory_pipeline().process(df).unwrap();

    let flavors = result.cleaned.column("flavors").unwrap();
    let flavors = flavors.as_materialized_series().str().unwrap();

    // "tomatoe basil basil" -> misspelling fixed, duplicate removed, sorted.
    assert_eq!(flavors.get(5), Some("basil tomato"));
    // "bay cream" -> disambiguated.
    assert_eq!(flavors.get(2), Some("bay_leaf cream"));
    // "whisky toffee" -> misspelling fixed, sorted.
    assert_eq!(flavors.get(4), Some("toffee whiskey"));
}

#[test]
fn test_round_trip_decoding_reproduces_token_subset() {
    let df = load_csv("merged_subset.csv");
    let result = in_memory_pipeline().process(df).unwrap();

    // Record 1 is the icebox cake: ["chocolate", "graham_cracker"].
    let decoded: Vec<&str> = result
        .vocabulary
        .tokens()
        .iter()
        .filter(|t| indicator(&result.encoded, t, 1) == 1)
        .map(|t| t.as_str())
        .collect();
    assert_eq!(decoded, vec!["chocolate", "graham_cracker"]);
}

#[test]
fn test_vocabulary_stable_across_runs() {
    let a = in_memory_pipeline()
        .process(load_csv("merged_subset.csv"))
        .unwrap();
    let b = in_memory_pipeline()
        .process(load_csv("merged_subset.csv"))
        .unwrap();

    assert_eq!(a.vocabulary.tokens(), b.vocabulary.tokens());
    assert_eq!(a.vocabulary.fingerprint(), b.vocabulary.fingerprint());
}

// ============================================================================
// Schema Violation Tests
// ============================================================================

#[test]
fn test_missing_required_column_aborts_without_output() {
    let df = load_csv("missing_rating.csv");
    let output_dir = temp_output_dir("schema-violation");

    let pipeline = Pipeline::builder()
        .config(
            PipelineConfig::builder()
                .output_dir(&output_dir)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let err = pipeline.process(df).unwrap_err();
    assert!(err.is_schema_violation());
    match err {
        PrepError::WithContext { source, .. } => match *source {
            PrepError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["aggregateRating".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        },
        other => panic!("expected contextual SchemaMismatch, got {other:?}"),
    }

    // No partial output may exist after the abort.
    assert!(!output_dir.exists());
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_artifacts_written_and_vocabulary_reloadable() {
    let df = load_csv("merged_subset.csv");
    let output_dir = temp_output_dir("persistence");

    let pipeline = Pipeline::builder()
        .config(
            PipelineConfig::builder()
                .output_dir(&output_dir)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let result = pipeline.process(df).unwrap();

    assert_eq!(result.summary.artifacts_written.len(), 3);
    assert!(output_dir.join("clean.csv").exists());
    assert!(output_dir.join("flavors.json").exists());
    assert!(output_dir.join("final.csv").exists());

    // The persisted vocabulary reconstructs the identical schema.
    let reloaded = FlavorVocabulary::load(&output_dir.join("flavors.json")).unwrap();
    assert_eq!(reloaded.tokens(), result.vocabulary.tokens());
    assert_eq!(reloaded.fingerprint(), result.vocabulary.fingerprint());

    // The encoded table persists with the full schema.
    let final_df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(output_dir.join("final.csv")))
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(final_df.width(), result.summary.columns_after);
    assert_eq!(final_df.height(), result.summary.rows_after);

    std::fs::remove_dir_all(&output_dir).ok();
}

// ============================================================================
// Live Prediction Path Tests
// ============================================================================

#[test]
fn test_live_request_matches_batch_encoding() {
    let df = load_csv("merged_subset.csv");
    let result = in_memory_pipeline().process(df).unwrap();

    // A user typing the raw flavors of the icebox cake gets the same row
    // the training path produced for it.
    let request = encode_request(
        &["graham", "chocolate"],
        &result.vocabulary,
        UnknownTokenPolicy::Drop,
    );

    let batch_row: Vec<u8> = result
        .vocabulary
        .tokens()
        .iter()
        .map(|t| indicator(&result.encoded, t, 1))
        .collect();
    assert_eq!(request.values(), batch_row.as_slice());
}

#[test]
fn test_live_request_unknown_flavor_reported_not_fatal() {
    let vocabulary = FlavorVocabulary::from_tokens(["basil", "bay_leaf", "chocolate"]).unwrap();

    let request = encode_request(
        &["basil", "mint"],
        &vocabulary,
        UnknownTokenPolicy::Report,
    );

    assert_eq!(request.values(), [1u8, 0, 0]);
    assert_eq!(request.unknown_tokens(), ["mint"]);

    let row = request.into_row(&vocabulary).unwrap();
    assert_eq!(row.width(), vocabulary.len());
    assert_eq!(row.height(), 1);
}

#[test]
fn test_live_request_rejects_stale_vocabulary() {
    let trained = FlavorVocabulary::from_tokens(["basil", "chocolate"]).unwrap();
    let retrained = FlavorVocabulary::from_tokens(["basil", "chocolate", "mint"]).unwrap();

    let request = encode_request(&["basil"], &trained, UnknownTokenPolicy::Drop);
    let err = request.into_row(&retrained).unwrap_err();
    assert!(err.is_schema_violation());
}
