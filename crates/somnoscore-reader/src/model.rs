use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::errors::ReadError;

/// A sleep-stage labeling vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    Aasm,
    Rk,
    Custom,
}

impl Standard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Standard::Aasm => "aasm",
            Standard::Rk => "rk",
            Standard::Custom => "custom",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Standard {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "aasm" => Ok(Standard::Aasm),
            "rk" => Ok(Standard::Rk),
            "custom" => Ok(Standard::Custom),
            other => Err(format!("unknown standard '{other}'")),
        }
    }
}

/// Identifier of a supported scoring export format.
///
/// Unrecognized identifiers are preserved as `Other` and fall back to
/// option-driven columnar ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Custom,
    Zmax,
    Somnomedics,
    Spisop,
    Fasst,
    USleep30s,
    Nin,
    Sleeptrip,
    Other(String),
}

impl SourceFormat {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "custom" => SourceFormat::Custom,
            "zmax" => SourceFormat::Zmax,
            "somnomedics" => SourceFormat::Somnomedics,
            "spisop" | "schlafaus" | "sleepin" => SourceFormat::Spisop,
            "fasst" => SourceFormat::Fasst,
            "u-sleep-30s" | "usleep-30s" | "u-sleep" => SourceFormat::USleep30s,
            "nin" => SourceFormat::Nin,
            "sleeptrip" => SourceFormat::Sleeptrip,
            _ => SourceFormat::Other(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceFormat::Custom => "custom",
            SourceFormat::Zmax => "zmax",
            SourceFormat::Somnomedics => "somnomedics",
            SourceFormat::Spisop => "spisop",
            SourceFormat::Fasst => "fasst",
            SourceFormat::USleep30s => "u-sleep-30s",
            SourceFormat::Nin => "nin",
            SourceFormat::Sleeptrip => "sleeptrip",
            SourceFormat::Other(name) => name,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(SourceFormat::from_name(value))
    }
}

impl Serialize for SourceFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(SourceFormat::from_name(&name))
    }
}

/// One raw table cell, tagged by origin: delimited sources produce text,
/// fixed-numeric sources produce numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Coerces the cell to its string key form, shared by line filtering,
    /// label mapping, and exclusion resolution. Text cells are trimmed;
    /// numeric cells must be integer-valued and within i64 range so the
    /// coercion is lossless.
    pub fn as_key(&self, row: usize, column: usize) -> Result<String, ReadError> {
        const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
        match self {
            Cell::Text(value) => Ok(value.trim().to_string()),
            Cell::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < I64_LIMIT {
                    Ok(format!("{}", *value as i64))
                } else {
                    Err(ReadError::NonIntegerCell {
                        value: *value,
                        row,
                        column,
                    })
                }
            }
        }
    }
}

/// Rectangular table of raw cells. Column count is uniform; ragged input
/// rows are padded with empty text cells to the widest row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
    column_count: usize,
}

impl RawTable {
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            while row.len() < column_count {
                row.push(Cell::Text(String::new()));
            }
        }
        Self { rows, column_count }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Positional old-label to new-label translation table with an
/// unknown-label fallback. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMap {
    label_old: Vec<String>,
    label_new: Vec<String>,
    unknown: String,
}

impl ScoreMap {
    pub fn new(
        label_old: Vec<String>,
        label_new: Vec<String>,
        unknown: impl Into<String>,
    ) -> Result<Self, ReadError> {
        if label_old.len() != label_new.len() {
            return Err(ReadError::config(format!(
                "score map has {} old labels but {} new labels",
                label_old.len(),
                label_new.len()
            )));
        }
        Ok(Self {
            label_old,
            label_new,
            unknown: unknown.into(),
        })
    }

    pub(crate) fn from_static(
        label_old: &[&str],
        label_new: &[&str],
        unknown: &str,
    ) -> Result<Self, ReadError> {
        Self::new(
            label_old.iter().map(|s| s.to_string()).collect(),
            label_new.iter().map(|s| s.to_string()).collect(),
            unknown,
        )
    }

    pub fn map_label(&self, raw: &str) -> Option<&str> {
        self.label_old
            .iter()
            .position(|old| old == raw)
            .map(|idx| self.label_new[idx].as_str())
    }

    pub fn label_old(&self) -> &[String] {
        &self.label_old
    }

    pub fn label_new(&self) -> &[String] {
        &self.label_new
    }

    pub fn unknown(&self) -> &str {
        &self.unknown
    }

    /// Unique `label_new` values in first-appearance order, with the
    /// unknown fallback appended when it does not already occur. Stable
    /// across inputs sharing the same map.
    pub fn label_set(&self) -> Vec<String> {
        let mut set: Vec<String> = Vec::new();
        for label in &self.label_new {
            if !set.contains(label) {
                set.push(label.clone());
            }
        }
        if !set.contains(&self.unknown) {
            set.push(self.unknown.clone());
        }
        set
    }
}

/// Provenance block of a scoring record: everything needed to trace a
/// canonical epoch back to its raw source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub original_labels: Vec<String>,
    pub original_excluded_raw: Option<Vec<String>>,
    pub score_map: ScoreMap,
    pub source_format: SourceFormat,
    pub source_file: Option<PathBuf>,
    pub raw_table: RawTable,
}

/// Canonical, epoch-indexed scoring record.
///
/// `epochs`, `excluded` and `provenance.original_labels` always have equal
/// length; epoch order is chronological and never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoring {
    pub epochs: Vec<String>,
    pub excluded: Vec<bool>,
    pub label_set: Vec<String>,
    pub epoch_length_s: f64,
    pub data_offset_s: f64,
    pub standard: Standard,
    pub provenance: Provenance,
}

impl Scoring {
    pub fn epoch_count(&self) -> usize {
        self.epochs.len()
    }
}
