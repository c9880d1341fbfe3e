use std::fmt;

use crate::model::{Scoring, SourceFormat, Standard};

/// Non-fatal diagnostic reported alongside a successful read. Advisories
/// never alter control flow; the library collects them in invocation
/// order and leaves reporting to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Raw labels with no score-map entry; the listed values were all
    /// assigned the fallback label and their epochs retained.
    UnmappedLabels {
        values: Vec<String>,
        fallback: String,
    },
    /// A standard was requested that is not the native scale of the
    /// resolved format preset.
    RepresentationMismatch {
        format: SourceFormat,
        native: Standard,
        requested: Standard,
    },
    /// Exclusion was requested but the table has too few columns;
    /// exclusion tracking degraded to an all-false vector.
    ExclusionColumnMissing { column: usize, column_count: usize },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::UnmappedLabels { values, fallback } => write!(
                f,
                "raw labels {values:?} had no score map entry and were assigned '{fallback}'"
            ),
            Advisory::RepresentationMismatch {
                format,
                native,
                requested,
            } => write!(
                f,
                "standard '{requested}' requested for format '{format}' whose native scale is '{native}'"
            ),
            Advisory::ExclusionColumnMissing {
                column,
                column_count,
            } => write!(
                f,
                "exclusion column {column} exceeds the table width of {column_count}; no epochs marked excluded"
            ),
        }
    }
}

/// Result of one read invocation: the scoring record plus the advisories
/// raised while producing it.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub scoring: Scoring,
    pub advisories: Vec<Advisory>,
}
