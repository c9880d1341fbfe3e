use crate::diagnostics::Advisory;
use crate::errors::ReadError;
use crate::model::{RawTable, ScoreMap};

pub(crate) struct MappedLabels {
    pub canonical: Vec<String>,
    pub original: Vec<String>,
    pub advisory: Option<Advisory>,
}

/// Applies the score map to the label column. Values without a map entry
/// receive the fallback label and are reported once, collectively, via a
/// single advisory; their epochs are retained. An out-of-range label
/// column is fatal before any row is processed.
pub(crate) fn map_labels(
    table: &RawTable,
    label_column: usize,
    score_map: &ScoreMap,
) -> Result<MappedLabels, ReadError> {
    if table.is_empty() {
        return Ok(MappedLabels {
            canonical: Vec::new(),
            original: Vec::new(),
            advisory: None,
        });
    }

    if label_column > table.column_count() {
        return Err(ReadError::LabelColumnOutOfRange {
            column: label_column,
            column_count: table.column_count(),
        });
    }

    let mut canonical = Vec::with_capacity(table.row_count());
    let mut original = Vec::with_capacity(table.row_count());
    let mut unmapped: Vec<String> = Vec::new();

    for (row_idx, row) in table.rows().iter().enumerate() {
        let key = row[label_column - 1].as_key(row_idx, label_column)?;
        match score_map.map_label(&key) {
            Some(mapped) => canonical.push(mapped.to_string()),
            None => {
                canonical.push(score_map.unknown().to_string());
                if !unmapped.contains(&key) {
                    unmapped.push(key.clone());
                }
            }
        }
        original.push(key);
    }

    let advisory = (!unmapped.is_empty()).then(|| Advisory::UnmappedLabels {
        values: unmapped,
        fallback: score_map.unknown().to_string(),
    });

    Ok(MappedLabels {
        canonical,
        original,
        advisory,
    })
}
