//! Subtitle Format Parsers and Exporters
//!
//! Reads SRT (SubRip) and WebVTT documents into timed segments for the
//! estimating resolver, and writes resolved word timings back out as SRT/VTT
//! for inspection.
//!
//! Parsing is tolerant: a block with a broken timecode line, inverted bounds
//! or no text is skipped and counted, and the remaining blocks still parse.
//!
//! # Example
//!
//! ```rust,ignore
//! use captionkit_lib::core::captions::{parse_subtitles, export_srt};
//!
//! let parsed = parse_subtitles(&std::fs::read_to_string("voiceover.srt")?);
//! println!("{} entries, {} skipped", parsed.segments.len(), parsed.skipped);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::models::{TimedSegment, WordTiming};
use crate::core::{CaptionError, CaptionResult, TimeSec};

/// `[HH:]MM:SS[,.]mmm` - hours are optional for WebVTT short timestamps
static TIMECODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{1,2})(?:[,.](\d{1,3}))?$")
        .expect("timecode pattern is valid")
});

// =============================================================================
// Parsing
// =============================================================================

/// Result of tolerant subtitle parsing
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedSubtitles {
    /// Well-formed entries, in document order
    pub segments: Vec<TimedSegment>,
    /// Number of entries dropped as malformed
    pub skipped: usize,
}

/// Parses an SRT or WebVTT document into timed segments
///
/// # SRT Format
///
/// ```text
/// 1
/// 00:00:01,000 --> 00:00:04,000
/// First caption text
///
/// 2
/// 00:00:05,500 --> 00:00:08,000
/// Second caption text
/// with multiple lines
/// ```
///
/// WebVTT headers, cue identifiers, cue settings and inline tags are accepted.
pub fn parse_subtitles(content: &str) -> ParsedSubtitles {
    let content = content.trim_start_matches('\u{FEFF}');
    let mut parsed = ParsedSubtitles::default();

    for block in split_blocks(content) {
        let Some(arrow_idx) = block.iter().position(|l| l.contains("-->")) else {
            if !is_header_block(&block) {
                debug!("Skipping subtitle block without a timecode line: {:?}", block);
                parsed.skipped += 1;
            }
            continue;
        };

        let (start, end) = match parse_timecode_line(block[arrow_idx]) {
            Ok(bounds) => bounds,
            Err(e) => {
                debug!("Skipping subtitle entry: {}", e);
                parsed.skipped += 1;
                continue;
            }
        };

        let text = block[arrow_idx + 1..]
            .iter()
            .map(|line| strip_markup(line))
            .collect::<Vec<_>>()
            .join(" ");

        let segment = TimedSegment::new(start, end, text.trim());
        if !segment.is_well_formed() {
            debug!(
                "Skipping subtitle entry {:.3}~{:.3}s: empty text or inverted bounds",
                start, end
            );
            parsed.skipped += 1;
            continue;
        }

        parsed.segments.push(segment);
    }

    parsed
}

/// Groups non-empty lines into blank-line separated blocks
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn is_header_block(block: &[&str]) -> bool {
    block.first().is_some_and(|first| {
        let first = first.trim_start();
        first.starts_with("WEBVTT") || first.starts_with("NOTE") || first.starts_with("STYLE")
    })
}

/// Parses a timecode line (e.g., "00:00:01,000 --> 00:00:04,000 align:start")
fn parse_timecode_line(line: &str) -> CaptionResult<(TimeSec, TimeSec)> {
    let parts: Vec<&str> = line.split("-->").collect();
    if parts.len() != 2 {
        return Err(CaptionError::InvalidFormat(format!(
            "Expected 'start --> end' format: {}",
            line
        )));
    }

    let start_str = parts[0].trim();
    let end_part = parts[1].trim();
    // WebVTT cue settings may follow the end timestamp
    let end_str = end_part.split_whitespace().next().unwrap_or(end_part);

    Ok((parse_timecode(start_str)?, parse_timecode(end_str)?))
}

/// Parses a timecode (e.g., "00:01:23,456", "00:01:23.456" or "01:23.456") into seconds
pub fn parse_timecode(ts: &str) -> CaptionResult<TimeSec> {
    let invalid = || CaptionError::InvalidTimestamp(ts.to_string());
    let caps = TIMECODE_RE.captures(ts.trim()).ok_or_else(invalid)?;

    let number = |idx: usize| -> CaptionResult<u64> {
        caps.get(idx)
            .map_or(Ok(0), |m| m.as_str().parse::<u64>().map_err(|_| invalid()))
    };

    let hours = number(1)?;
    let minutes = number(2)?;
    let seconds = number(3)?;
    if minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    // Fractional digits are a decimal fraction: ",5" is 500 ms
    let millis = match caps.get(4) {
        Some(m) => format!("{:0<3}", m.as_str()).parse::<u64>().map_err(|_| invalid())?,
        None => 0,
    };

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0)
}

/// Strips WebVTT `<...>` tags and ASS `{...}` override blocks from text
fn strip_markup(text: &str) -> String {
    let mut result = String::new();
    let mut closing: Option<char> = None;

    for c in text.chars() {
        match (closing, c) {
            (None, '<') => closing = Some('>'),
            (None, '{') => closing = Some('}'),
            (Some(end), c) if c == end => closing = None,
            (None, c) => result.push(c),
            _ => {}
        }
    }

    result.trim().to_string()
}

// =============================================================================
// Export
// =============================================================================

/// Exports word timings to SRT format, one cue per word
pub fn export_srt(words: &[WordTiming]) -> String {
    let mut output = String::new();

    for (index, word) in words.iter().enumerate() {
        output.push_str(&format!("{}\n", index + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(word.start),
            format_srt_timestamp(word.end)
        ));
        output.push_str(&word.word);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

/// Exports word timings to WebVTT format, one cue per word
pub fn export_vtt(words: &[WordTiming]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for word in words {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_timestamp(word.start),
            format_vtt_timestamp(word.end)
        ));
        output.push_str(&word.word);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    (total_mins / 60, total_mins % 60, secs, ms)
}

/// Formats seconds as SRT timestamp (00:00:00,000)
fn format_srt_timestamp(seconds: f64) -> String {
    let (hours, mins, secs, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

/// Formats seconds as VTT timestamp (00:00:00.000)
fn format_vtt_timestamp(seconds: f64) -> String {
    let (hours, mins, secs, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
}

// =============================================================================
// Tests
// =============================================================================
