use crate::errors::ReadError;
use crate::model::{ScoreMap, Scoring, Standard};

/// Downstream transform that re-maps a canonical scoring between labeling
/// standards. Consumed as a black box: the pipeline invokes it only when a
/// target standard was requested, and forwards the active score map only
/// when the active standard is `custom`. Implementations return a new
/// scoring record; nothing is mutated in place.
pub trait StandardConverter {
    fn convert(
        &self,
        scoring: Scoring,
        target: Standard,
        score_map: Option<&ScoreMap>,
    ) -> Result<Scoring, ReadError>;
}
