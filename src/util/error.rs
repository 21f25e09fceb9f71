//! Error types for markerfill.

use thiserror::Error;

/// Result alias for markerfill operations.
pub type MarkerFillResult<T> = std::result::Result<T, MarkerFillError>;

/// Errors that can occur while composing a template.
///
/// Zero marker regions, degenerate regions, a missing overlay and an
/// unattainable size ceiling are not errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MarkerFillError {
    /// A template, photo or overlay could not be decoded.
    #[error("failed to decode {what}: {reason}")]
    InputDecode { what: String, reason: String },
    /// The output codec failed.
    #[error("failed to encode output: {reason}")]
    Encode { reason: String },
    /// The configuration was rejected before running a job.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Reading an image from disk failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
    /// The batch worker pool could not be created.
    #[error("thread pool: {reason}")]
    ThreadPool { reason: String },
}

impl MarkerFillError {
    pub(crate) fn decode(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::InputDecode {
            what: what.into(),
            reason: err.to_string(),
        }
    }
}
