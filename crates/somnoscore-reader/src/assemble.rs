use std::path::PathBuf;

use crate::model::{Provenance, RawTable, Scoring};
use crate::options::EffectiveOptions;

/// Combines the mapped labels and exclusion vector into the final scoring
/// record. The label set comes from the score map, not the observed
/// labels, so it is stable across inputs sharing a map. Length equality is
/// a contract of the upstream stages; a violation here is a programming
/// error, not bad input.
pub(crate) fn assemble(
    canonical: Vec<String>,
    original: Vec<String>,
    excluded: Vec<bool>,
    original_excluded_raw: Option<Vec<String>>,
    raw_table: RawTable,
    effective: &EffectiveOptions,
    source_file: Option<PathBuf>,
) -> Scoring {
    assert_eq!(
        canonical.len(),
        excluded.len(),
        "epoch label and exclusion vectors must have equal length"
    );
    assert_eq!(
        canonical.len(),
        original.len(),
        "canonical and original label vectors must have equal length"
    );

    Scoring {
        label_set: effective.score_map.label_set(),
        epochs: canonical,
        excluded,
        epoch_length_s: effective.epoch_length_s,
        data_offset_s: effective.data_offset_s,
        standard: effective.standard,
        provenance: Provenance {
            original_labels: original,
            original_excluded_raw,
            score_map: effective.score_map.clone(),
            source_format: effective.format.clone(),
            source_file,
            raw_table,
        },
    }
}
