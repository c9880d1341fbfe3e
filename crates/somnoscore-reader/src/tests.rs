use std::fs;
use std::path::PathBuf;

use crate::convert::StandardConverter;
use crate::diagnostics::Advisory;
use crate::errors::ReadError;
use crate::filter;
use crate::model::{Cell, RawTable, ScoreMap, Scoring, SourceFormat, Standard};
use crate::options::{ReadOptions, SourceLayout};
use crate::{
    read_scoring_from_path, read_scoring_from_path_with, read_scoring_from_table,
    read_scoring_from_table_with,
};

fn fixture(path: &str) -> PathBuf {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join("tests/data").join(path)
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("somnoscore_{}_{}", std::process::id(), name));
    path
}

fn text_row(cells: &[&str]) -> Vec<Cell> {
    cells.iter().map(|c| Cell::Text(c.to_string())).collect()
}

fn simple_map(old: &[&str], new: &[&str]) -> ScoreMap {
    ScoreMap::from_static(old, new, "?").expect("score map construction failed")
}

#[test]
fn zmax_end_to_end_filters_and_maps() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .standard(Standard::Aasm)
        .build();
    let outcome = read_scoring_from_path(&fixture("zmax.csv"), &options).expect("zmax read failed");

    let scoring = &outcome.scoring;
    assert_eq!(scoring.epochs, ["W", "N1", "N2", "N2", "N3", "R", "W"]);
    assert_eq!(scoring.label_set, ["W", "N1", "N2", "N3", "R", "?"]);
    assert_eq!(scoring.excluded, vec![false; 7]);
    assert_eq!(scoring.provenance.original_labels.len(), scoring.epochs.len());
    assert_eq!(scoring.provenance.source_format, SourceFormat::Zmax);
    assert_eq!(scoring.epoch_length_s, 30.0);
    assert_eq!(scoring.standard, Standard::Aasm);
    assert!(outcome.advisories.is_empty(), "{:?}", outcome.advisories);

    // The LON/LOUT marker rows never reach the raw table kept in provenance.
    assert_eq!(scoring.provenance.raw_table.row_count(), 7);
}

#[test]
fn zmax_rk_request_signals_representation_mismatch() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .standard(Standard::Rk)
        .build();
    let outcome =
        read_scoring_from_path(&fixture("zmax.csv"), &options).expect("zmax rk read failed");

    assert_eq!(outcome.scoring.epochs, ["W", "S1", "S2", "S2", "S3", "R", "W"]);
    match outcome.advisories.as_slice() {
        [Advisory::RepresentationMismatch {
            format,
            native,
            requested,
        }] => {
            assert_eq!(*format, SourceFormat::Zmax);
            assert_eq!(*native, Standard::Aasm);
            assert_eq!(*requested, Standard::Rk);
        }
        other => panic!("expected a representation mismatch advisory, got {other:?}"),
    }
}

#[test]
fn somnomedics_unmapped_label_gets_fallback_and_advisory() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Somnomedics)
        .standard(Standard::Aasm)
        .build();
    let outcome = read_scoring_from_path(&fixture("somnomedics.txt"), &options)
        .expect("somnomedics read failed");

    assert_eq!(outcome.scoring.epochs, ["W", "N1", "N2", "N3", "R", "?"]);
    match outcome.advisories.as_slice() {
        [Advisory::UnmappedLabels { values, fallback }] => {
            assert_eq!(values, &["Artefakt"]);
            assert_eq!(fallback, "?");
        }
        other => panic!("expected an unmapped-labels advisory, got {other:?}"),
    }
}

#[test]
fn spisop_fixed_numeric_rk_with_exclusion() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Spisop)
        .standard(Standard::Rk)
        .build();
    let outcome =
        read_scoring_from_path(&fixture("spisop.txt"), &options).expect("spisop read failed");

    let scoring = &outcome.scoring;
    assert_eq!(scoring.epochs, ["W", "S1", "S2", "S2", "R", "MT"]);
    assert_eq!(
        scoring.excluded,
        [false, false, false, true, false, true]
    );
    assert_eq!(
        scoring.provenance.original_labels,
        ["0", "1", "2", "2", "5", "8"]
    );
    assert_eq!(
        scoring.provenance.original_excluded_raw.as_deref(),
        Some(["0", "0", "0", "1", "0", "2"].map(String::from).as_slice())
    );
    assert!(outcome.advisories.is_empty());
}

#[test]
fn spisop_aasm_maps_movement_time_without_advisory() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Spisop)
        .standard(Standard::Aasm)
        .build();
    let outcome =
        read_scoring_from_path(&fixture("spisop.txt"), &options).expect("spisop aasm read failed");

    // Code 8 maps to the fallback label via the map itself, so no
    // unmapped-labels advisory is raised.
    assert_eq!(outcome.scoring.epochs, ["W", "N1", "N2", "N2", "R", "?"]);
    assert!(outcome.advisories.is_empty(), "{:?}", outcome.advisories);
}

#[test]
fn fasst_numeric_codes_parse_as_delimited_text() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Fasst)
        .standard(Standard::Rk)
        .build();
    let outcome =
        read_scoring_from_path(&fixture("fasst.txt"), &options).expect("fasst read failed");
    assert_eq!(outcome.scoring.epochs, ["W", "W", "S1", "R"]);
}

#[test]
fn usleep_skips_header_row() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::USleep30s)
        .standard(Standard::Aasm)
        .build();
    let outcome =
        read_scoring_from_path(&fixture("usleep.csv"), &options).expect("u-sleep read failed");
    assert_eq!(outcome.scoring.epochs, ["W", "W", "N1", "R"]);
}

#[test]
fn custom_standard_without_map_fails_before_io() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .build();
    // The path does not exist; a Source error here would mean I/O was
    // attempted before configuration validation.
    let err = read_scoring_from_path(&PathBuf::from("does/not/exist.csv"), &options)
        .expect_err("custom standard without a map must fail");
    match err {
        ReadError::Config { message } => assert!(message.contains("score map"), "{message}"),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn custom_format_requires_custom_standard() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Aasm)
        .build();
    let err = read_scoring_from_path(&PathBuf::from("does/not/exist.csv"), &options)
        .expect_err("custom format with aasm standard must fail");
    match err {
        ReadError::Config { .. } => {}
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn structured_layout_is_rejected() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .layout(SourceLayout::Structured)
        .build();
    let err = read_scoring_from_path(&PathBuf::from("does/not/exist.xml"), &options)
        .expect_err("structured layout must be rejected");
    match err {
        ReadError::Config { message } => assert!(message.contains("structured"), "{message}"),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn missing_source_file_is_fatal() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .build();
    let err = read_scoring_from_path(&PathBuf::from("does/not/exist.csv"), &options)
        .expect_err("missing file must be fatal");
    match err {
        ReadError::Source { path, .. } => assert_eq!(path, PathBuf::from("does/not/exist.csv")),
        other => panic!("expected Source error, got {other:?}"),
    }
}

#[test]
fn unmapped_numeric_labels_fall_back_with_advisory() {
    let table = RawTable::new(vec![
        vec![Cell::Number(0.0)],
        vec![Cell::Number(1.0)],
        vec![Cell::Number(9.0)],
    ]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["0", "1"], &["W", "N1"]))
        .build();
    let outcome = read_scoring_from_table(table, &options).expect("table read failed");

    assert_eq!(outcome.scoring.epochs, ["W", "N1", "?"]);
    match outcome.advisories.as_slice() {
        [Advisory::UnmappedLabels { values, fallback }] => {
            assert_eq!(values, &["9"]);
            assert_eq!(fallback, "?");
        }
        other => panic!("expected an unmapped-labels advisory, got {other:?}"),
    }
}

#[test]
fn line_filter_retains_unignored_rows_in_order() {
    let table = RawTable::new(vec![
        text_row(&["LON", "x"]),
        text_row(&["A", "1"]),
        text_row(&["LOUT", "y"]),
        text_row(&["B", "2"]),
    ]);
    let ignore = vec!["LON".to_string(), "LOUT".to_string()];
    let filtered = filter::filter_rows(table, &ignore, &[]).expect("filter failed");

    assert_eq!(filtered.row_count(), 2);
    assert_eq!(filtered.rows()[0][0], Cell::Text("A".to_string()));
    assert_eq!(filtered.rows()[1][0], Cell::Text("B".to_string()));
}

#[test]
fn line_filter_select_set_restricts_rows() {
    let table = RawTable::new(vec![
        text_row(&["A", "1"]),
        text_row(&["B", "2"]),
        text_row(&["A", "3"]),
    ]);
    let select = vec!["A".to_string()];
    let filtered = filter::filter_rows(table, &[], &select).expect("filter failed");
    assert_eq!(filtered.row_count(), 2);
}

#[test]
fn exclusion_disabled_yields_all_false() {
    let table = RawTable::new(vec![
        text_row(&["W", "1"]),
        text_row(&["N2", "2"]),
    ]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["W", "N2"], &["W", "N2"]))
        .exclusion_enabled(false)
        .build();
    let outcome = read_scoring_from_table(table, &options).expect("table read failed");
    assert_eq!(outcome.scoring.excluded, [false, false]);
    assert!(outcome.scoring.provenance.original_excluded_raw.is_none());
}

#[test]
fn exclusion_column_shortfall_degrades_with_advisory() {
    let table = RawTable::new(vec![text_row(&["W"]), text_row(&["N2"])]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["W", "N2"], &["W", "N2"]))
        .exclusion_enabled(true)
        .exclusion_column(5)
        .build();
    let outcome = read_scoring_from_table(table, &options).expect("table read failed");

    assert_eq!(outcome.scoring.excluded, [false, false]);
    match outcome.advisories.as_slice() {
        [Advisory::ExclusionColumnMissing {
            column,
            column_count,
        }] => {
            assert_eq!(*column, 5);
            assert_eq!(*column_count, 1);
        }
        other => panic!("expected an exclusion-column advisory, got {other:?}"),
    }
}

#[test]
fn label_column_shortfall_is_fatal() {
    let table = RawTable::new(vec![text_row(&["W"]), text_row(&["N2"])]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["W", "N2"], &["W", "N2"]))
        .label_column(4)
        .build();
    let err = read_scoring_from_table(table, &options)
        .expect_err("out-of-range label column must be fatal");
    match err {
        ReadError::LabelColumnOutOfRange {
            column,
            column_count,
        } => {
            assert_eq!(column, 4);
            assert_eq!(column_count, 1);
        }
        other => panic!("expected LabelColumnOutOfRange, got {other:?}"),
    }
}

#[test]
fn non_integer_numeric_label_is_fatal() {
    let table = RawTable::new(vec![vec![Cell::Number(2.5)]]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["2"], &["N2"]))
        .build();
    let err = read_scoring_from_table(table, &options)
        .expect_err("non-integer numeric label must be fatal");
    match err {
        ReadError::NonIntegerCell { value, .. } => assert_eq!(value, 2.5),
        other => panic!("expected NonIntegerCell, got {other:?}"),
    }
}

#[test]
fn empty_table_yields_zero_epochs() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["W"], &["W"]))
        .build();
    let outcome = read_scoring_from_table(RawTable::empty(), &options).expect("empty read failed");

    assert!(outcome.scoring.epochs.is_empty());
    assert!(outcome.scoring.excluded.is_empty());
    assert!(outcome.advisories.is_empty());
    // The label set still comes from the map, not from observations.
    assert_eq!(outcome.scoring.label_set, ["W", "?"]);
}

#[test]
fn score_map_length_mismatch_is_config_error() {
    let err = ScoreMap::new(vec!["0".to_string()], Vec::new(), "?")
        .expect_err("mismatched score map lengths must fail");
    match err {
        ReadError::Config { message } => assert!(message.contains("old labels"), "{message}"),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn repeated_reads_are_idempotent_and_round_trip() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .build();
    let first = read_scoring_from_path(&fixture("zmax.csv"), &options).expect("first read failed");
    let second =
        read_scoring_from_path(&fixture("zmax.csv"), &options).expect("second read failed");
    assert_eq!(first.scoring, second.scoring);

    let encoded = serde_json::to_string(&first.scoring).expect("serialization failed");
    let decoded: Scoring = serde_json::from_str(&encoded).expect("deserialization failed");
    assert_eq!(first.scoring, decoded);
}

#[test]
fn sleeptrip_whole_record_passthrough_round_trips() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .build();
    let original =
        read_scoring_from_path(&fixture("zmax.csv"), &options).expect("zmax read failed");

    let path = temp_path("sleeptrip.json");
    let encoded = serde_json::to_string(&original.scoring).expect("serialization failed");
    fs::write(&path, encoded).expect("failed to write whole-record fixture");

    let passthrough_options = ReadOptions::builder()
        .source_format(SourceFormat::Sleeptrip)
        .build();
    let restored =
        read_scoring_from_path(&path, &passthrough_options).expect("whole-record read failed");
    let _ = fs::remove_file(&path);

    assert_eq!(restored.scoring, original.scoring);
    assert!(restored.advisories.is_empty());
}

#[test]
fn unknown_format_falls_back_to_option_driven_ingestion() {
    assert_eq!(
        SourceFormat::from_name("acme-export"),
        SourceFormat::Other("acme-export".to_string())
    );

    let table = RawTable::new(vec![text_row(&["W"]), text_row(&["N2"])]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::from_name("acme-export"))
        .standard(Standard::Aasm)
        .build();
    let outcome = read_scoring_from_table(table, &options).expect("fallback read failed");

    assert_eq!(outcome.scoring.epochs, ["W", "N2"]);
    assert_eq!(outcome.scoring.label_set, ["W", "N1", "N2", "N3", "R", "?"]);
}

#[test]
fn marker_based_header_skipping_drops_preamble() {
    let path = temp_path("marker.csv");
    fs::write(&path, "export header\nmore header\n---\nW\nN1\n")
        .expect("failed to write marker fixture");

    let options = ReadOptions::builder()
        .source_format(SourceFormat::from_name("acme-export"))
        .standard(Standard::Aasm)
        .skip_until_marker("---")
        .build();
    let outcome = read_scoring_from_path(&path, &options).expect("marker read failed");
    let _ = fs::remove_file(&path);

    assert_eq!(outcome.scoring.epochs, ["W", "N1"]);
}

#[test]
fn nin_tab_delimited_numeric_codes() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Nin)
        .standard(Standard::Aasm)
        .build();
    let outcome = read_scoring_from_path(&fixture("nin.tsv"), &options).expect("nin read failed");
    assert_eq!(outcome.scoring.epochs, ["W", "N1", "N2", "N3", "R"]);
    assert_eq!(
        outcome.scoring.provenance.original_labels,
        ["0", "1", "2", "3", "5"]
    );
}

#[test]
fn count_based_skip_applies_before_marker_skip() {
    // The marker also occurs inside the count-skipped prefix; only the
    // count-first ordering leaves exactly the two data rows.
    let path = temp_path("count_then_marker.csv");
    fs::write(&path, "---\njunk\n---\nW\nN1\n").expect("failed to write fixture");

    let options = ReadOptions::builder()
        .source_format(SourceFormat::from_name("acme-export"))
        .standard(Standard::Aasm)
        .header_skip(1)
        .skip_until_marker("---")
        .build();
    let outcome = read_scoring_from_path(&path, &options).expect("combined skip read failed");
    let _ = fs::remove_file(&path);

    assert_eq!(outcome.scoring.epochs, ["W", "N1"]);
    assert!(outcome.advisories.is_empty(), "{:?}", outcome.advisories);
}

#[test]
fn unmatched_marker_treats_whole_file_as_header() {
    let path = temp_path("unmatched_marker.csv");
    fs::write(&path, "W\nN1\nN2\n").expect("failed to write fixture");

    let options = ReadOptions::builder()
        .source_format(SourceFormat::from_name("acme-export"))
        .standard(Standard::Aasm)
        .skip_until_marker("@@@")
        .build();
    let outcome = read_scoring_from_path(&path, &options).expect("unmatched marker read failed");
    let _ = fs::remove_file(&path);

    assert!(outcome.scoring.epochs.is_empty());
    assert!(outcome.scoring.excluded.is_empty());
}

#[test]
fn out_of_i64_range_numeric_label_is_fatal() {
    let table = RawTable::new(vec![vec![Cell::Number(1.0e19)]]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["0"], &["W"]))
        .build();
    let err = read_scoring_from_table(table, &options)
        .expect_err("numeric label beyond i64 range must be fatal");
    match err {
        ReadError::NonIntegerCell { value, .. } => assert_eq!(value, 1.0e19),
        other => panic!("expected NonIntegerCell, got {other:?}"),
    }
}

struct RelabelConverter;

impl StandardConverter for RelabelConverter {
    fn convert(
        &self,
        mut scoring: Scoring,
        target: Standard,
        score_map: Option<&ScoreMap>,
    ) -> Result<Scoring, ReadError> {
        // A custom active standard hands its map through to the converter.
        assert!(score_map.is_some());
        scoring.standard = target;
        for epoch in &mut scoring.epochs {
            *epoch = epoch.to_ascii_lowercase();
        }
        Ok(scoring)
    }
}

#[test]
fn target_standard_invokes_converter_after_assembly() {
    let table = RawTable::new(vec![text_row(&["W"]), text_row(&["N2"])]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["W", "N2"], &["W", "N2"]))
        .target_standard(Standard::Rk)
        .build();
    let outcome = read_scoring_from_table_with(table, &options, &RelabelConverter)
        .expect("converted read failed");

    assert_eq!(outcome.scoring.epochs, ["w", "n2"]);
    assert_eq!(outcome.scoring.standard, Standard::Rk);
}

#[test]
fn target_standard_without_converter_is_config_error() {
    let table = RawTable::new(vec![text_row(&["W"])]);
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Custom)
        .standard(Standard::Custom)
        .score_map(simple_map(&["W"], &["W"]))
        .target_standard(Standard::Rk)
        .build();
    let err = read_scoring_from_table(table, &options)
        .expect_err("target standard without converter must fail");
    match err {
        ReadError::Config { message } => assert!(message.contains("converter"), "{message}"),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn converter_also_applies_to_path_reads() {
    struct PassthroughConverter;
    impl StandardConverter for PassthroughConverter {
        fn convert(
            &self,
            mut scoring: Scoring,
            target: Standard,
            score_map: Option<&ScoreMap>,
        ) -> Result<Scoring, ReadError> {
            // Non-custom active standards keep their map private.
            assert!(score_map.is_none());
            scoring.standard = target;
            Ok(scoring)
        }
    }

    let options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .standard(Standard::Aasm)
        .target_standard(Standard::Rk)
        .build();
    let outcome = read_scoring_from_path_with(&fixture("zmax.csv"), &options, &PassthroughConverter)
        .expect("converted path read failed");
    assert_eq!(outcome.scoring.standard, Standard::Rk);
}

#[test]
fn whole_record_reads_ignore_target_standard() {
    struct PanickingConverter;
    impl StandardConverter for PanickingConverter {
        fn convert(
            &self,
            _scoring: Scoring,
            _target: Standard,
            _score_map: Option<&ScoreMap>,
        ) -> Result<Scoring, ReadError> {
            panic!("whole-record reads must not reach the converter");
        }
    }

    let source_options = ReadOptions::builder()
        .source_format(SourceFormat::Zmax)
        .build();
    let original =
        read_scoring_from_path(&fixture("zmax.csv"), &source_options).expect("zmax read failed");

    let path = temp_path("sleeptrip_target.json");
    let encoded = serde_json::to_string(&original.scoring).expect("serialization failed");
    fs::write(&path, encoded).expect("failed to write whole-record fixture");

    let options = ReadOptions::builder()
        .source_format(SourceFormat::Sleeptrip)
        .target_standard(Standard::Rk)
        .build();
    let outcome = read_scoring_from_path_with(&path, &options, &PanickingConverter)
        .expect("whole-record read failed");
    let _ = fs::remove_file(&path);

    assert_eq!(outcome.scoring, original.scoring);
    assert_eq!(outcome.scoring.standard, Standard::Aasm);
}

#[test]
fn mapped_labels_stay_within_the_map_vocabulary() {
    let options = ReadOptions::builder()
        .source_format(SourceFormat::Somnomedics)
        .standard(Standard::Aasm)
        .build();
    let outcome = read_scoring_from_path(&fixture("somnomedics.txt"), &options)
        .expect("somnomedics read failed");

    let map = &outcome.scoring.provenance.score_map;
    for epoch in &outcome.scoring.epochs {
        assert!(
            map.label_new().contains(epoch) || epoch == map.unknown(),
            "label '{epoch}' escaped the map vocabulary"
        );
    }
}
