use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::diagnostics::Advisory;
use crate::errors::ReadError;
use crate::model::{ScoreMap, SourceFormat, Standard};

pub(crate) const AASM_LABELS: &[&str] = &["W", "N1", "N2", "N3", "R"];
pub(crate) const RK_LABELS: &[&str] = &["W", "S1", "S2", "S3", "S4", "R", "MT"];
pub(crate) const UNKNOWN_LABEL: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IngestStrategy {
    Delimited,
    FixedNumeric,
    WholeRecord,
}

/// One registry entry: ingestion strategy, default parse options, and the
/// label tables for both supported standards. Adding a format means adding
/// an entry here, never branching in shared pipeline logic.
struct PresetEntry {
    strategy: IngestStrategy,
    delimiter: u8,
    header_skip: usize,
    skip_until_marker: Option<&'static str>,
    ignore_lines: &'static [&'static str],
    label_column: usize,
    exclusion_enabled: bool,
    exclusion_column: usize,
    exclusion_markers: &'static [&'static str],
    native_standard: Standard,
    label_old: &'static [&'static str],
    aasm_new: &'static [&'static str],
    rk_new: &'static [&'static str],
}

const DEFAULT_EXCLUSION_MARKERS: &[&str] = &["1", "2", "3"];

static REGISTRY: Lazy<HashMap<SourceFormat, PresetEntry>> = Lazy::new(|| {
    let mut registry = HashMap::new();

    registry.insert(
        SourceFormat::Zmax,
        PresetEntry {
            strategy: IngestStrategy::Delimited,
            delimiter: b',',
            header_skip: 0,
            skip_until_marker: None,
            ignore_lines: &["LON", "LOUT"],
            label_column: 4,
            exclusion_enabled: false,
            exclusion_column: 2,
            exclusion_markers: DEFAULT_EXCLUSION_MARKERS,
            native_standard: Standard::Aasm,
            label_old: &["W", "N1", "N2", "N3", "R"],
            aasm_new: &["W", "N1", "N2", "N3", "R"],
            rk_new: &["W", "S1", "S2", "S3", "R"],
        },
    );

    registry.insert(
        SourceFormat::Somnomedics,
        PresetEntry {
            strategy: IngestStrategy::Delimited,
            delimiter: b';',
            header_skip: 5,
            skip_until_marker: None,
            ignore_lines: &[],
            label_column: 2,
            exclusion_enabled: false,
            exclusion_column: 2,
            exclusion_markers: DEFAULT_EXCLUSION_MARKERS,
            native_standard: Standard::Aasm,
            label_old: &["Wake", "N1", "N2", "N3", "REM"],
            aasm_new: &["W", "N1", "N2", "N3", "R"],
            rk_new: &["W", "S1", "S2", "S3", "R"],
        },
    );

    // SpisOp/Schlafaus/SleepIn hypnogram dumps: two numeric columns,
    // RK-coded stages plus an exclusion flag column.
    registry.insert(
        SourceFormat::Spisop,
        PresetEntry {
            strategy: IngestStrategy::FixedNumeric,
            delimiter: b' ',
            header_skip: 0,
            skip_until_marker: None,
            ignore_lines: &[],
            label_column: 1,
            exclusion_enabled: true,
            exclusion_column: 2,
            exclusion_markers: DEFAULT_EXCLUSION_MARKERS,
            native_standard: Standard::Rk,
            label_old: &["0", "1", "2", "3", "4", "5", "8"],
            aasm_new: &["W", "N1", "N2", "N3", "N3", "R", "?"],
            rk_new: &["W", "S1", "S2", "S3", "S4", "R", "MT"],
        },
    );

    registry.insert(
        SourceFormat::Fasst,
        PresetEntry {
            strategy: IngestStrategy::Delimited,
            delimiter: b' ',
            header_skip: 0,
            skip_until_marker: None,
            ignore_lines: &[],
            label_column: 1,
            exclusion_enabled: false,
            exclusion_column: 2,
            exclusion_markers: DEFAULT_EXCLUSION_MARKERS,
            native_standard: Standard::Rk,
            label_old: &["0", "1", "2", "3", "4", "5", "8"],
            aasm_new: &["W", "N1", "N2", "N3", "N3", "R", "?"],
            rk_new: &["W", "S1", "S2", "S3", "S4", "R", "MT"],
        },
    );

    registry.insert(
        SourceFormat::USleep30s,
        PresetEntry {
            strategy: IngestStrategy::Delimited,
            delimiter: b',',
            header_skip: 1,
            skip_until_marker: None,
            ignore_lines: &[],
            label_column: 1,
            exclusion_enabled: false,
            exclusion_column: 2,
            exclusion_markers: DEFAULT_EXCLUSION_MARKERS,
            native_standard: Standard::Aasm,
            label_old: &["Wake", "N1", "N2", "N3", "REM"],
            aasm_new: &["W", "N1", "N2", "N3", "R"],
            rk_new: &["W", "S1", "S2", "S3", "R"],
        },
    );

    registry.insert(
        SourceFormat::Nin,
        PresetEntry {
            strategy: IngestStrategy::Delimited,
            delimiter: b'\t',
            header_skip: 0,
            skip_until_marker: None,
            ignore_lines: &[],
            label_column: 1,
            exclusion_enabled: false,
            exclusion_column: 2,
            exclusion_markers: DEFAULT_EXCLUSION_MARKERS,
            native_standard: Standard::Aasm,
            label_old: &["0", "1", "2", "3", "5"],
            aasm_new: &["W", "N1", "N2", "N3", "R"],
            rk_new: &["W", "S1", "S2", "S3", "R"],
        },
    );

    registry.insert(
        SourceFormat::Sleeptrip,
        PresetEntry {
            strategy: IngestStrategy::WholeRecord,
            delimiter: b',',
            header_skip: 0,
            skip_until_marker: None,
            ignore_lines: &[],
            label_column: 1,
            exclusion_enabled: false,
            exclusion_column: 2,
            exclusion_markers: DEFAULT_EXCLUSION_MARKERS,
            native_standard: Standard::Aasm,
            label_old: &[],
            aasm_new: &[],
            rk_new: &[],
        },
    );

    registry
});

/// A resolved format preset: defaults that user options may override.
/// `None` means the preset has no opinion and the global default applies.
#[derive(Debug, Clone)]
pub(crate) struct FormatPreset {
    pub strategy: IngestStrategy,
    pub delimiter: Option<u8>,
    pub header_skip: Option<usize>,
    pub skip_until_marker: Option<String>,
    pub ignore_lines: Vec<String>,
    pub label_column: Option<usize>,
    pub exclusion_enabled: Option<bool>,
    pub exclusion_column: Option<usize>,
    pub exclusion_markers: Option<Vec<String>>,
    pub score_map: Option<ScoreMap>,
}

impl FormatPreset {
    /// The no-op preset: default columnar ingestion driven entirely by
    /// user-supplied options. Used for `custom` and unknown formats.
    fn columnar() -> Self {
        Self {
            strategy: IngestStrategy::Delimited,
            delimiter: None,
            header_skip: None,
            skip_until_marker: None,
            ignore_lines: Vec::new(),
            label_column: None,
            exclusion_enabled: None,
            exclusion_column: None,
            exclusion_markers: None,
            score_map: None,
        }
    }
}

/// Resolves a format identifier and target standard into a preset, plus a
/// representation-mismatch advisory when the requested standard is not the
/// preset's native scale. Pure function of its inputs and the registry.
pub(crate) fn resolve(
    format: &SourceFormat,
    standard: Standard,
) -> Result<(FormatPreset, Option<Advisory>), ReadError> {
    let entry = match REGISTRY.get(format) {
        Some(entry) => entry,
        None => return Ok((FormatPreset::columnar(), None)),
    };

    let score_map = match standard {
        Standard::Aasm => Some(ScoreMap::from_static(
            entry.label_old,
            entry.aasm_new,
            UNKNOWN_LABEL,
        )?),
        Standard::Rk => Some(ScoreMap::from_static(
            entry.label_old,
            entry.rk_new,
            UNKNOWN_LABEL,
        )?),
        // An explicit caller-supplied map is required; enforced during
        // option resolution.
        Standard::Custom => None,
    };

    let advisory = (standard == Standard::Rk && entry.native_standard == Standard::Aasm).then(
        || Advisory::RepresentationMismatch {
            format: format.clone(),
            native: entry.native_standard,
            requested: standard,
        },
    );

    let preset = FormatPreset {
        strategy: entry.strategy,
        delimiter: Some(entry.delimiter),
        header_skip: Some(entry.header_skip),
        skip_until_marker: entry.skip_until_marker.map(str::to_string),
        ignore_lines: entry.ignore_lines.iter().map(|s| s.to_string()).collect(),
        label_column: Some(entry.label_column),
        exclusion_enabled: Some(entry.exclusion_enabled),
        exclusion_column: Some(entry.exclusion_column),
        exclusion_markers: Some(
            entry
                .exclusion_markers
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        score_map,
    };

    Ok((preset, advisory))
}

/// Identity map over a standard's canonical vocabulary. Fallback for
/// unknown formats whose files already carry canonical labels.
pub(crate) fn identity_map(standard: Standard) -> Result<ScoreMap, ReadError> {
    let labels = match standard {
        Standard::Aasm => AASM_LABELS,
        Standard::Rk => RK_LABELS,
        Standard::Custom => &[],
    };
    ScoreMap::from_static(labels, labels, UNKNOWN_LABEL)
}
