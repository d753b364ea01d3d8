//! Captionkit Core Type Definitions
//!
//! Defines fundamental types shared by the resolver and the compiler.

use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Rounds a time value to millisecond precision.
///
/// Every computed word boundary passes through here so drift from repeated
/// floating-point division never accumulates into visible desync.
pub fn round_millis(value: TimeSec) -> TimeSec {
    (value * 1000.0).round() / 1000.0
}

/// Returns true if the value is a usable timestamp (finite and non-negative)
pub fn is_valid_time_sec(value: TimeSec) -> bool {
    value.is_finite() && value >= 0.0
}

// =============================================================================
// Canvas
// =============================================================================

/// Render canvas the subtitle document is laid out against (`PlayResX`/`PlayResY`).
///
/// A missing dimension takes the vertical default's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Creates a canvas, falling back to the vertical default for zero dimensions
    pub fn new(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            warn!(
                "Canvas {}x{} has a zero dimension, using default",
                width, height
            );
            return Self::default();
        }
        Self { width, height }
    }

    /// 9:16 vertical video (reels, shorts)
    pub fn vertical() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }

    /// 16:9 landscape video
    pub fn landscape() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::vertical()
    }
}
