use crate::diagnostics::Advisory;
use crate::errors::ReadError;
use crate::model::RawTable;
use crate::options::EffectiveOptions;

pub(crate) struct ExclusionOutcome {
    pub excluded: Vec<bool>,
    pub raw: Option<Vec<String>>,
    pub advisory: Option<Advisory>,
}

/// Computes the excluded-epoch vector. Disabled exclusion yields all
/// false. A table too narrow for the exclusion column degrades to all
/// false with an advisory, unlike the label column, which is fatal.
pub(crate) fn resolve_exclusions(
    table: &RawTable,
    effective: &EffectiveOptions,
) -> Result<ExclusionOutcome, ReadError> {
    let row_count = table.row_count();

    if !effective.exclusion_enabled {
        return Ok(ExclusionOutcome {
            excluded: vec![false; row_count],
            raw: None,
            advisory: None,
        });
    }

    if !table.is_empty() && effective.exclusion_column > table.column_count() {
        return Ok(ExclusionOutcome {
            excluded: vec![false; row_count],
            raw: None,
            advisory: Some(Advisory::ExclusionColumnMissing {
                column: effective.exclusion_column,
                column_count: table.column_count(),
            }),
        });
    }

    let mut excluded = Vec::with_capacity(row_count);
    let mut raw = Vec::with_capacity(row_count);
    for (row_idx, row) in table.rows().iter().enumerate() {
        let key = row[effective.exclusion_column - 1].as_key(row_idx, effective.exclusion_column)?;
        excluded.push(effective.exclusion_markers.iter().any(|m| *m == key));
        raw.push(key);
    }

    Ok(ExclusionOutcome {
        excluded,
        raw: Some(raw),
        advisory: None,
    })
}
