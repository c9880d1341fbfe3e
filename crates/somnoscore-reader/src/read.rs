use std::path::Path;

use crate::convert::StandardConverter;
use crate::diagnostics::{Advisory, ReadOutcome};
use crate::errors::ReadError;
use crate::model::{RawTable, Scoring, Standard};
use crate::options::{EffectiveOptions, ReadOptions};
use crate::presets::IngestStrategy;
use crate::{assemble, exclusion, filter, ingest, mapping};

/// Reads one scoring export from a local path and normalizes it into a
/// canonical scoring record.
pub fn read_scoring_from_path(
    path: &Path,
    options: &ReadOptions,
) -> Result<ReadOutcome, ReadError> {
    read_path_inner(path, options, None)
}

/// Like [`read_scoring_from_path`], with a standard converter applied
/// after assembly when the options request a target standard.
///
/// Whole-record sources (`sleeptrip`) are returned unchanged: they bypass
/// every pipeline stage, including conversion, so a requested target
/// standard has no effect on them.
pub fn read_scoring_from_path_with(
    path: &Path,
    options: &ReadOptions,
    converter: &dyn StandardConverter,
) -> Result<ReadOutcome, ReadError> {
    read_path_inner(path, options, Some(converter))
}

/// Runs the pipeline over a caller-supplied table, bypassing file access.
pub fn read_scoring_from_table(
    table: RawTable,
    options: &ReadOptions,
) -> Result<ReadOutcome, ReadError> {
    read_table_inner(table, options, None)
}

/// Like [`read_scoring_from_table`], with a standard converter.
pub fn read_scoring_from_table_with(
    table: RawTable,
    options: &ReadOptions,
    converter: &dyn StandardConverter,
) -> Result<ReadOutcome, ReadError> {
    read_table_inner(table, options, Some(converter))
}

fn read_path_inner(
    path: &Path,
    options: &ReadOptions,
    converter: Option<&dyn StandardConverter>,
) -> Result<ReadOutcome, ReadError> {
    let (effective, advisories) = EffectiveOptions::resolve(options)?;
    ensure_converter(&effective, converter)?;

    let content = ingest::read_source(path)?;

    // Pre-scored records bypass the tabular pipeline entirely.
    if effective.strategy == IngestStrategy::WholeRecord {
        let scoring: Scoring = serde_json::from_str(&content)?;
        return Ok(ReadOutcome {
            scoring,
            advisories,
        });
    }

    let table = ingest::ingest_content(&content, &effective)?;
    finish(
        table,
        effective,
        advisories,
        Some(path.to_path_buf()),
        converter,
    )
}

fn read_table_inner(
    table: RawTable,
    options: &ReadOptions,
    converter: Option<&dyn StandardConverter>,
) -> Result<ReadOutcome, ReadError> {
    let (effective, advisories) = EffectiveOptions::resolve(options)?;
    ensure_converter(&effective, converter)?;
    finish(table, effective, advisories, None, converter)
}

fn ensure_converter(
    effective: &EffectiveOptions,
    converter: Option<&dyn StandardConverter>,
) -> Result<(), ReadError> {
    if effective.target_standard.is_some() && converter.is_none() {
        return Err(ReadError::config(
            "a target standard was requested but no standard converter was supplied",
        ));
    }
    Ok(())
}

fn finish(
    table: RawTable,
    effective: EffectiveOptions,
    mut advisories: Vec<Advisory>,
    source_file: Option<std::path::PathBuf>,
    converter: Option<&dyn StandardConverter>,
) -> Result<ReadOutcome, ReadError> {
    let table = filter::filter_rows(table, &effective.ignore_lines, &effective.select_lines)?;

    let mapped = mapping::map_labels(&table, effective.label_column, &effective.score_map)?;
    let exclusions = exclusion::resolve_exclusions(&table, &effective)?;
    advisories.extend(mapped.advisory);
    advisories.extend(exclusions.advisory);

    let scoring = assemble::assemble(
        mapped.canonical,
        mapped.original,
        exclusions.excluded,
        exclusions.raw,
        table,
        &effective,
        source_file,
    );

    let scoring = match (effective.target_standard, converter) {
        (Some(target), Some(converter)) => {
            let map = (effective.standard == Standard::Custom).then(|| effective.score_map.clone());
            converter.convert(scoring, target, map.as_ref())?
        }
        _ => scoring,
    };

    Ok(ReadOutcome {
        scoring,
        advisories,
    })
}
