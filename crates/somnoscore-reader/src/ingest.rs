use std::fs;
use std::path::Path;

use crate::errors::ReadError;
use crate::model::{Cell, RawTable};
use crate::options::EffectiveOptions;
use crate::presets::IngestStrategy;

pub(crate) fn read_source(path: &Path) -> Result<String, ReadError> {
    fs::read_to_string(path).map_err(|source| ReadError::Source {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn ingest_content(
    content: &str,
    effective: &EffectiveOptions,
) -> Result<RawTable, ReadError> {
    match effective.strategy {
        IngestStrategy::Delimited => delimited(content, effective),
        IngestStrategy::FixedNumeric => fixed_numeric(content),
        IngestStrategy::WholeRecord => Err(ReadError::config(
            "whole-record sources bypass table ingestion",
        )),
    }
}

/// Delimited-text ingestion: no implicit header-name row, ragged rows
/// tolerated (the table pads them), all cells kept as text.
fn delimited(content: &str, effective: &EffectiveOptions) -> Result<RawTable, ReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(effective.delimiter)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| Cell::Text(field.to_string()))
                .collect(),
        );
    }

    let skip = effective.header_skip.min(rows.len());
    let mut rows = rows.split_off(skip);

    if let Some(marker) = &effective.skip_until_marker {
        let matched = rows.iter().position(|row| {
            row.first()
                .is_some_and(|cell| matches!(cell, Cell::Text(text) if text.trim() == marker))
        });
        rows = match matched {
            Some(idx) => rows.split_off(idx + 1),
            // Marker never matched: the whole file is header.
            None => Vec::new(),
        };
    }

    Ok(RawTable::new(rows))
}

/// Fixed-numeric ingestion: whitespace-separated rows of exactly two
/// numeric columns (stage code, exclusion flag).
fn fixed_numeric(content: &str) -> Result<RawTable, ReadError> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(ReadError::FixedNumericRow {
                line: idx + 1,
                message: format!("expected 2 numeric columns, found {}", fields.len()),
            });
        }
        let mut row = Vec::with_capacity(2);
        for field in fields {
            let value: f64 = field.parse().map_err(|err| ReadError::FixedNumericRow {
                line: idx + 1,
                message: format!("failed to parse '{field}' as a number: {err}"),
            })?;
            row.push(Cell::Number(value));
        }
        rows.push(row);
    }
    Ok(RawTable::new(rows))
}
