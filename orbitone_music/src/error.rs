// Error type shared by the whole crate.
//
// The sampler and scale code only ever fail on bad caller input, detected
// eagerly (`InvalidConfig`, `EmptyScale`). Numeric blowups coming out of a
// dynamical map are not errors; they flow through and the quantizers map
// them to documented fallback values. The remaining variants belong to the
// outer layer (config loading, MIDI file output).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MusicError {
    /// A sampler or composition parameter is out of its allowed range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Indexing into a scale with no pitches.
    #[error("scale is empty")]
    EmptyScale,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl MusicError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MusicError::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MusicError>;
