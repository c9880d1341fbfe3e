pub mod convert;
pub mod diagnostics;
pub mod errors;
pub mod model;
pub mod options;

mod assemble;
mod exclusion;
mod filter;
mod ingest;
mod mapping;
mod presets;
mod read;

pub use convert::StandardConverter;
pub use diagnostics::{Advisory, ReadOutcome};
pub use errors::ReadError;
pub use model::{Cell, Provenance, RawTable, ScoreMap, Scoring, SourceFormat, Standard};
pub use options::{ReadOptions, ReadOptionsBuilder, SourceLayout};
pub use read::{
    read_scoring_from_path, read_scoring_from_path_with, read_scoring_from_table,
    read_scoring_from_table_with,
};

#[cfg(test)]
mod tests;
