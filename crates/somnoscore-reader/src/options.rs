use crate::diagnostics::Advisory;
use crate::errors::ReadError;
use crate::model::{ScoreMap, SourceFormat, Standard};
use crate::presets::{self, IngestStrategy};

/// Shape of the source file. Only flat columnar sources can be ingested;
/// structured sources are rejected before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    Columns,
    Structured,
}

/// User-facing read configuration. Fields left unset fall back to the
/// resolved format preset, then to the global defaults. Built with
/// [`ReadOptions::builder`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub source_format: SourceFormat,
    pub standard: Standard,
    pub score_map: Option<ScoreMap>,
    pub delimiter: Option<u8>,
    pub header_skip: Option<usize>,
    pub skip_until_marker: Option<String>,
    pub ignore_lines: Vec<String>,
    pub select_lines: Vec<String>,
    pub label_column: Option<usize>,
    pub exclusion_enabled: Option<bool>,
    pub exclusion_column: Option<usize>,
    pub exclusion_markers: Option<Vec<String>>,
    pub epoch_length_s: Option<f64>,
    pub data_offset_s: Option<f64>,
    pub target_standard: Option<Standard>,
    pub layout: SourceLayout,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            source_format: SourceFormat::Custom,
            standard: Standard::Aasm,
            score_map: None,
            delimiter: None,
            header_skip: None,
            skip_until_marker: None,
            ignore_lines: Vec::new(),
            select_lines: Vec::new(),
            label_column: None,
            exclusion_enabled: None,
            exclusion_column: None,
            exclusion_markers: None,
            epoch_length_s: None,
            data_offset_s: None,
            target_standard: None,
            layout: SourceLayout::Columns,
        }
    }
}

impl ReadOptions {
    pub fn builder() -> ReadOptionsBuilder {
        ReadOptionsBuilder {
            options: Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadOptionsBuilder {
    options: ReadOptions,
}

impl ReadOptionsBuilder {
    pub fn source_format(mut self, format: SourceFormat) -> Self {
        self.options.source_format = format;
        self
    }

    pub fn standard(mut self, standard: Standard) -> Self {
        self.options.standard = standard;
        self
    }

    pub fn score_map(mut self, map: ScoreMap) -> Self {
        self.options.score_map = Some(map);
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.options.delimiter = Some(delimiter);
        self
    }

    pub fn header_skip(mut self, rows: usize) -> Self {
        self.options.header_skip = Some(rows);
        self
    }

    pub fn skip_until_marker(mut self, marker: impl Into<String>) -> Self {
        self.options.skip_until_marker = Some(marker.into());
        self
    }

    pub fn ignore_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.ignore_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn select_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.select_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// 1-based index of the label column.
    pub fn label_column(mut self, column: usize) -> Self {
        self.options.label_column = Some(column);
        self
    }

    pub fn exclusion_enabled(mut self, enabled: bool) -> Self {
        self.options.exclusion_enabled = Some(enabled);
        self
    }

    /// 1-based index of the exclusion column.
    pub fn exclusion_column(mut self, column: usize) -> Self {
        self.options.exclusion_column = Some(column);
        self
    }

    pub fn exclusion_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.exclusion_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    pub fn epoch_length_s(mut self, seconds: f64) -> Self {
        self.options.epoch_length_s = Some(seconds);
        self
    }

    pub fn data_offset_s(mut self, seconds: f64) -> Self {
        self.options.data_offset_s = Some(seconds);
        self
    }

    pub fn target_standard(mut self, standard: Standard) -> Self {
        self.options.target_standard = Some(standard);
        self
    }

    pub fn layout(mut self, layout: SourceLayout) -> Self {
        self.options.layout = layout;
        self
    }

    pub fn build(self) -> ReadOptions {
        self.options
    }
}

/// Fully-populated per-invocation configuration: user options merged over
/// the resolved preset, with every remaining default filled in.
#[derive(Debug, Clone)]
pub(crate) struct EffectiveOptions {
    pub format: SourceFormat,
    pub standard: Standard,
    pub strategy: IngestStrategy,
    pub score_map: ScoreMap,
    pub delimiter: u8,
    pub header_skip: usize,
    pub skip_until_marker: Option<String>,
    pub ignore_lines: Vec<String>,
    pub select_lines: Vec<String>,
    pub label_column: usize,
    pub exclusion_enabled: bool,
    pub exclusion_column: usize,
    pub exclusion_markers: Vec<String>,
    pub epoch_length_s: f64,
    pub data_offset_s: f64,
    pub target_standard: Option<Standard>,
}

impl EffectiveOptions {
    const DEFAULT_DELIMITER: u8 = b',';
    const DEFAULT_LABEL_COLUMN: usize = 1;
    const DEFAULT_EXCLUSION_COLUMN: usize = 2;
    const DEFAULT_EPOCH_LENGTH_S: f64 = 30.0;

    /// Validates the configuration and produces the effective options plus
    /// any resolver advisories. All configuration errors surface here,
    /// before any file I/O is attempted.
    pub(crate) fn resolve(
        options: &ReadOptions,
    ) -> Result<(EffectiveOptions, Vec<Advisory>), ReadError> {
        if options.layout == SourceLayout::Structured {
            return Err(ReadError::config(
                "structured sources are not supported; only flat columnar exports can be ingested",
            ));
        }

        if options.source_format == SourceFormat::Custom && options.standard != Standard::Custom {
            return Err(ReadError::config(format!(
                "source format 'custom' requires standard 'custom', got '{}'",
                options.standard
            )));
        }

        let (preset, advisory) = presets::resolve(&options.source_format, options.standard)?;
        let mut advisories = Vec::new();
        advisories.extend(advisory);

        let score_map = match (options.score_map.clone(), preset.score_map, options.standard) {
            (Some(map), _, _) => map,
            (None, Some(map), _) => map,
            (None, None, Standard::Custom) => {
                return Err(ReadError::config(
                    "standard 'custom' requires an explicit score map",
                ));
            }
            (None, None, standard) => presets::identity_map(standard)?,
        };

        let label_column = options
            .label_column
            .or(preset.label_column)
            .unwrap_or(Self::DEFAULT_LABEL_COLUMN);
        let exclusion_column = options
            .exclusion_column
            .or(preset.exclusion_column)
            .unwrap_or(Self::DEFAULT_EXCLUSION_COLUMN);
        if label_column == 0 || exclusion_column == 0 {
            return Err(ReadError::config(
                "label and exclusion column indices are 1-based and must be positive",
            ));
        }

        let ignore_lines = if options.ignore_lines.is_empty() {
            preset.ignore_lines
        } else {
            options.ignore_lines.clone()
        };

        let effective = EffectiveOptions {
            format: options.source_format.clone(),
            standard: options.standard,
            strategy: preset.strategy,
            score_map,
            delimiter: options
                .delimiter
                .or(preset.delimiter)
                .unwrap_or(Self::DEFAULT_DELIMITER),
            header_skip: options.header_skip.or(preset.header_skip).unwrap_or(0),
            skip_until_marker: options
                .skip_until_marker
                .clone()
                .or(preset.skip_until_marker),
            ignore_lines,
            select_lines: options.select_lines.clone(),
            label_column,
            exclusion_enabled: options
                .exclusion_enabled
                .or(preset.exclusion_enabled)
                .unwrap_or(false),
            exclusion_column,
            exclusion_markers: options.exclusion_markers.clone().unwrap_or_else(|| {
                preset
                    .exclusion_markers
                    .unwrap_or_else(|| vec!["1".to_string(), "2".to_string(), "3".to_string()])
            }),
            epoch_length_s: options
                .epoch_length_s
                .unwrap_or(Self::DEFAULT_EPOCH_LENGTH_S),
            data_offset_s: options.data_offset_s.unwrap_or(0.0),
            target_standard: options.target_standard,
        };

        Ok((effective, advisories))
    }
}
