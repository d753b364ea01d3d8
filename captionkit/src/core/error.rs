//! Captionkit Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

/// Core caption error types
#[derive(Error, Debug)]
pub enum CaptionError {
    // =========================================================================
    // Resolver Errors
    // =========================================================================
    /// No strategy produced a single word (empty or whitespace-only transcript).
    /// Callers treat this as "no transcript available" and continue uncaptioned.
    #[error("No timing data available: transcript produced no words")]
    NoTimingDataAvailable,

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    // =========================================================================
    // Style Errors
    // =========================================================================
    #[error("Unknown caption preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid caption style: {0}")]
    InvalidStyle(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core caption result type
pub type CaptionResult<T> = Result<T, CaptionError>;

impl CaptionError {
    /// True when the error only means "no captions for this job"
    pub fn is_degradable(&self) -> bool {
        matches!(self, CaptionError::NoTimingDataAvailable)
    }
}
