use thiserror::Error;

/// Errors raised at the configuration boundary of the water simulation.
///
/// Nothing on the per-tick path returns these: degenerate numbers are
/// clamped or degraded instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaterError {
    #[error("Wave index {index} out of range (field has {len} wave sets)")]
    WaveIndexOutOfRange { index: usize, len: usize },

    #[error("Event slot {index} out of range (ring capacity is {capacity})")]
    EventSlotOutOfRange { index: usize, capacity: usize },

    #[error("Too many wave descriptors: field holds {max}, got {got}")]
    TooManyWaves { max: usize, got: usize },

    #[error("Invalid simulation config: {0}")]
    Config(String),
}

impl From<ron::Error> for WaterError {
    fn from(err: ron::Error) -> Self {
        WaterError::Config(err.to_string())
    }
}
