//! Error type for the validated entry points

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MorphError>;

/// Reasons a resampling call is rejected before any sample is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MorphError {
    #[error("invalid dimension `{name}` = {value}: {reason}")]
    InvalidDimension {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },
    #[error("{buffer} buffer too small: need {required} samples, got {actual}")]
    BufferTooSmall {
        buffer: &'static str,
        required: usize,
        actual: usize,
    },
    #[error("level {0} is too large, 2^level does not fit in usize")]
    LevelTooLarge(u32),
}

impl MorphError {
    pub(crate) fn invalid(name: &'static str, value: usize, reason: &'static str) -> Self {
        MorphError::InvalidDimension { name, value, reason }
    }
}
