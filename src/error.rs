//! Construction-time errors.
//!
//! Only arguments that leave an object unusable are reported here. Parameters
//! that are merely out of range at runtime are clamped and logged instead, so
//! the render path never has to handle a failure.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f64),

    #[error("decay time (T60) must be finite and positive, got {0} s")]
    InvalidDecayTime(f64),

    #[error("{what} must be finite and non-negative, got {value}")]
    InvalidLength { what: &'static str, value: f64 },

    #[error("channel count must be at least 1, got {0}")]
    ChannelCount(usize),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
