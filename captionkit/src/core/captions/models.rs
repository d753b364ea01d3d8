//! Caption Data Models
//!
//! Defines the data structures the resolver produces and the compiler consumes.
//!
//! # Overview
//!
//! - `WordTiming` - one spoken word with its bounds in seconds
//! - `TimedSegment` - a coarser transcribed span, used only for estimation
//! - `CaptionStyle` - immutable visual configuration for one compile call
//! - `Color` - RGB color with ASS (`&HAABBGGRR`) conversion

use serde::{Deserialize, Serialize};

use super::position::{percent_to_position, position_to_percent, CaptionPosition};
use crate::core::{CaptionError, TimeSec};

// =============================================================================
// Word Timing
// =============================================================================

/// One spoken word with temporal bounds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// The word, trimmed, without embedded whitespace
    pub word: String,
    /// Start time in seconds
    pub start: TimeSec,
    /// End time in seconds (always greater than `start`)
    pub end: TimeSec,
}

impl WordTiming {
    pub fn new(word: &str, start: TimeSec, end: TimeSec) -> Self {
        Self {
            word: word.to_string(),
            start,
            end,
        }
    }

    /// Returns the duration of this word in seconds
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }
}

// =============================================================================
// Timed Segment
// =============================================================================

/// A span of transcribed text with bounds, used as estimator input
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    /// Start time in seconds
    pub start: TimeSec,
    /// End time in seconds
    pub end: TimeSec,
    /// Transcribed phrase
    pub text: String,
}

impl TimedSegment {
    pub fn new(start: TimeSec, end: TimeSec, text: &str) -> Self {
        Self {
            start,
            end,
            text: text.to_string(),
        }
    }

    /// Returns the duration of this segment in seconds
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }

    /// A segment is usable when its bounds are valid and it carries text
    pub fn is_well_formed(&self) -> bool {
        crate::core::is_valid_time_sec(self.start)
            && self.end.is_finite()
            && self.end > self.start
            && !self.text.trim().is_empty()
    }
}

// =============================================================================
// Color
// =============================================================================

/// RGB color value (0-255 for each component)
///
/// Serialized as a `#RRGGBB` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Creates a color from RGB components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn yellow() -> Self {
        Self::rgb(255, 255, 0)
    }

    /// Parses a hex color string (`#RRGGBB` or `#RGB`, leading `#` optional)
    pub fn try_from_hex(hex: &str) -> Result<Self, CaptionError> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(CaptionError::InvalidColor(hex.to_string()));
        }

        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| CaptionError::InvalidColor(hex.to_string()))
        };

        match digits.len() {
            // Expand "F" to "FF"
            3 => Ok(Self::rgb(
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            )),
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(CaptionError::InvalidColor(hex.to_string())),
        }
    }

    /// Converts to hex string (e.g., "#FFFFFF")
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Converts to an opaque ASS color (`&H00BBGGRR`)
    pub fn to_ass_color(&self) -> String {
        self.to_ass_color_with_opacity(100)
    }

    /// Converts to ASS color format with opacity folded into the alpha byte.
    ///
    /// ASS alpha is inverted: `00` is opaque, `FF` fully transparent.
    pub fn to_ass_color_with_opacity(&self, opacity_percent: u8) -> String {
        let opacity = u32::from(opacity_percent.min(100));
        let alpha = ((100 - opacity) * 255 + 50) / 100;
        format!(
            "&H{:02X}{:02X}{:02X}{:02X}",
            alpha, self.b, self.g, self.r
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

impl TryFrom<String> for Color {
    type Error = CaptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

// =============================================================================
// Caption Styling
// =============================================================================

/// Smallest font size a style may carry
pub const MIN_FONT_SIZE: u32 = 24;

/// Largest font size a style may carry
pub const MAX_FONT_SIZE: u32 = 80;

/// Upper bound for words shown together on one page
pub const MAX_WORDS_PER_PAGE: usize = 12;

/// Caption text style
///
/// Resolved once per compile call from a named preset or custom input and
/// never mutated during compilation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionStyle {
    /// Font family name
    pub font_family: String,
    /// Font size in points
    pub font_size: u32,
    /// Base color for words that are not highlighted
    pub text_color: Color,
    /// Color of the currently spoken word
    pub highlight_color: Color,
    /// Outline color (used when there is no background box)
    pub outline_color: Color,
    /// Background box color (None = transparent, outline mode)
    pub background_color: Option<Color>,
    /// Background opacity in percent (0-100)
    pub background_opacity: u8,
    /// Outline width in pixels
    pub outline_width: u32,
    /// Whether text is bold
    pub bold: bool,
    /// Whether text is italic
    pub italic: bool,
    /// How many words are visible simultaneously
    pub words_per_page: usize,
    /// Vertical position (0 = top of frame, 100 = bottom)
    pub vertical_position_percent: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 48,
            text_color: Color::white(),
            highlight_color: Color::yellow(),
            outline_color: Color::black(),
            background_color: None,
            background_opacity: 80,
            outline_width: 3,
            bold: true,
            italic: false,
            words_per_page: 3,
            vertical_position_percent: position_to_percent(CaptionPosition::Bottom),
        }
    }
}

impl CaptionStyle {
    /// Returns the named position derived from the vertical percent
    pub fn position(&self) -> CaptionPosition {
        percent_to_position(self.vertical_position_percent)
    }

    /// Makes the named position authoritative and recomputes the percent
    pub fn with_position(mut self, position: CaptionPosition) -> Self {
        self.vertical_position_percent = position_to_percent(position);
        self
    }

    /// Makes the percent authoritative; the position label follows from it
    pub fn with_vertical_percent(mut self, percent: f64) -> Self {
        self.vertical_position_percent = clamp_percent(percent);
        self
    }

    pub fn with_words_per_page(mut self, words_per_page: usize) -> Self {
        self.words_per_page = words_per_page.clamp(1, MAX_WORDS_PER_PAGE);
        self
    }

    /// True when the renderer should draw an opaque box instead of an outline
    pub fn has_background(&self) -> bool {
        self.background_color.is_some()
    }

    /// Normalizes and clamps fields so a style is always renderable.
    ///
    /// Tolerant like settings normalization: corrects bad values instead of
    /// failing, so user-supplied styles never abort a compile.
    pub fn normalize(&mut self) {
        // Commas would break the comma-separated style record.
        self.font_family = self.font_family.replace(',', " ").trim().to_string();
        if self.font_family.is_empty() {
            self.font_family = CaptionStyle::default().font_family;
        }
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.background_opacity = self.background_opacity.min(100);
        self.words_per_page = self.words_per_page.clamp(1, MAX_WORDS_PER_PAGE);
        self.vertical_position_percent = clamp_percent(self.vertical_position_percent);
    }

    /// Returns a normalized copy
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Parses a custom style from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, CaptionError> {
        let style: CaptionStyle = serde_json::from_str(json)
            .map_err(|e| CaptionError::InvalidStyle(e.to_string()))?;
        Ok(style.normalized())
    }
}

fn clamp_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return position_to_percent(CaptionPosition::Bottom);
    }
    value.clamp(0.0, 100.0)
}

// =============================================================================
// Tests
// =============================================================================
