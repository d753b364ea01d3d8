//! Caption Positioning
//!
//! Named positions and the vertical percent are kept consistent through two
//! explicit pure functions. Callers choose which one is authoritative per edit.

use serde::{Deserialize, Serialize};

/// Vertical position of caption on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPosition {
    /// Top of screen
    Top,
    /// Center of screen
    Center,
    /// Bottom of screen (default for subtitles)
    #[default]
    Bottom,
}

impl CaptionPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionPosition::Top => "top",
            CaptionPosition::Center => "center",
            CaptionPosition::Bottom => "bottom",
        }
    }

    /// ASS numpad alignment, horizontally centered (8 = top, 5 = middle, 2 = bottom)
    pub fn ass_alignment(&self) -> u8 {
        match self {
            CaptionPosition::Top => 8,
            CaptionPosition::Center => 5,
            CaptionPosition::Bottom => 2,
        }
    }
}

impl std::fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaptionPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(CaptionPosition::Top),
            "center" | "middle" => Ok(CaptionPosition::Center),
            "bottom" => Ok(CaptionPosition::Bottom),
            other => Err(format!("Unknown caption position: {}", other)),
        }
    }
}

/// Derives the named position from a vertical percent (0 = top, 100 = bottom)
pub fn percent_to_position(percent: f64) -> CaptionPosition {
    if percent <= 33.0 {
        CaptionPosition::Top
    } else if percent <= 66.0 {
        CaptionPosition::Center
    } else {
        CaptionPosition::Bottom
    }
}

/// Anchor percent for a named position
pub fn position_to_percent(position: CaptionPosition) -> f64 {
    match position {
        CaptionPosition::Top => 20.0,
        CaptionPosition::Center => 50.0,
        CaptionPosition::Bottom => 70.0,
    }
}

/// Vertical margin in canvas pixels for a resolved percent.
///
/// Top-aligned text hangs `percent` below the top edge, bottom-aligned text
/// sits `100 - percent` above the bottom edge. Middle alignment ignores the
/// margin in ASS renderers, so it is always zero there.
pub fn vertical_margin(percent: f64, canvas_height: u32) -> u32 {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        position_to_percent(CaptionPosition::Bottom)
    };
    let height = f64::from(canvas_height);

    match percent_to_position(percent) {
        CaptionPosition::Top => (height * percent / 100.0).round() as u32,
        CaptionPosition::Center => 0,
        CaptionPosition::Bottom => (height * (100.0 - percent) / 100.0).round() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_position_breakpoints() {
        assert_eq!(percent_to_position(0.0), CaptionPosition::Top);
        assert_eq!(percent_to_position(33.0), CaptionPosition::Top);
        assert_eq!(percent_to_position(33.5), CaptionPosition::Center);
        assert_eq!(percent_to_position(50.0), CaptionPosition::Center);
        assert_eq!(percent_to_position(66.0), CaptionPosition::Center);
        assert_eq!(percent_to_position(66.1), CaptionPosition::Bottom);
        assert_eq!(percent_to_position(100.0), CaptionPosition::Bottom);
    }

    #[test]
    fn test_position_to_percent_anchors() {
        assert_eq!(position_to_percent(CaptionPosition::Top), 20.0);
        assert_eq!(position_to_percent(CaptionPosition::Center), 50.0);
        assert_eq!(position_to_percent(CaptionPosition::Bottom), 70.0);
    }

    #[test]
    fn test_anchor_round_trip() {
        for position in [
            CaptionPosition::Top,
            CaptionPosition::Center,
            CaptionPosition::Bottom,
        ] {
            assert_eq!(percent_to_position(position_to_percent(position)), position);
        }
    }

    #[test]
    fn test_position_parse() {
        assert_eq!("Top".parse::<CaptionPosition>(), Ok(CaptionPosition::Top));
        assert_eq!(
            "middle".parse::<CaptionPosition>(),
            Ok(CaptionPosition::Center)
        );
        assert!("left".parse::<CaptionPosition>().is_err());
    }

    #[test]
    fn test_position_serialization() {
        let json = serde_json::to_string(&CaptionPosition::Center).unwrap();
        assert_eq!(json, "\"center\"");
    }

    #[test]
    fn test_vertical_margin() {
        assert_eq!(vertical_margin(20.0, 1920), 384);
        assert_eq!(vertical_margin(70.0, 1920), 576);
        assert_eq!(vertical_margin(50.0, 1920), 0);
        assert_eq!(vertical_margin(100.0, 1080), 0);
        assert_eq!(vertical_margin(f64::NAN, 1000), 300);
    }
}
