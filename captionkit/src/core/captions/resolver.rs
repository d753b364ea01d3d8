//! Word-Timing Resolver
//!
//! Turns whatever a transcription step produced into an ordered sequence of
//! word timings. Strategies are attempted in order and the first one that
//! yields at least one word wins:
//!
//! 1. exact provider word timestamps
//! 2. segment-proportional estimation
//! 3. subtitle document parsing + proportional estimation
//! 4. even split of plain text at an assumed speaking rate
//!
//! Malformed records are skipped and counted; the resolver only fails when
//! nothing usable exists at all.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::formats::parse_subtitles;
use super::models::{TimedSegment, WordTiming};
use super::timing::{
    distribute_segment, distribute_span, estimate_duration, split_words,
    DEFAULT_SPEAKING_RATE_WPM,
};
use crate::core::{is_valid_time_sec, round_millis, CaptionError, CaptionResult, TimeSec};

// =============================================================================
// Input
// =============================================================================

/// Canonical transcript input, produced by the provider adapters.
///
/// Any combination of fields may be present; the resolver picks the most
/// precise one that yields words.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptInput {
    /// Word-level timestamps (ground truth when present)
    pub words: Vec<WordTiming>,
    /// Phrase-level spans
    pub segments: Vec<TimedSegment>,
    /// SRT or WebVTT document
    pub subtitles: Option<String>,
    /// Plain transcript without timing
    pub text: Option<String>,
    /// Known audio duration; the last word never ends past it
    pub duration: Option<TimeSec>,
    /// Provider entries the adapter could not map (missing word or bounds)
    #[serde(skip)]
    pub dropped: usize,
}

impl TranscriptInput {
    pub fn from_words(words: Vec<WordTiming>) -> Self {
        Self {
            words,
            ..Default::default()
        }
    }

    pub fn from_segments(segments: Vec<TimedSegment>) -> Self {
        Self {
            segments,
            ..Default::default()
        }
    }

    pub fn from_subtitles(document: &str) -> Self {
        Self {
            subtitles: Some(document.to_string()),
            ..Default::default()
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: TimeSec) -> Self {
        self.duration = Some(duration);
        self
    }

    /// True when no field carries anything to resolve
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
            && self.segments.is_empty()
            && self.subtitles.as_deref().is_none_or(|s| s.trim().is_empty())
            && self.text.as_deref().is_none_or(|s| s.trim().is_empty())
    }
}

// =============================================================================
// Output
// =============================================================================

/// Which strategy produced the word timings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingStrategy {
    /// Provider word timestamps, used as ground truth
    ExactTimestamps,
    /// Proportional estimation inside transcribed segments
    SegmentEstimate,
    /// Proportional estimation inside subtitle entries
    SubtitleEstimate,
    /// Proportional estimation over an assumed speaking duration
    EvenSplit,
}

impl TimingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingStrategy::ExactTimestamps => "exact_timestamps",
            TimingStrategy::SegmentEstimate => "segment_estimate",
            TimingStrategy::SubtitleEstimate => "subtitle_estimate",
            TimingStrategy::EvenSplit => "even_split",
        }
    }

    /// True when the timings are measured rather than estimated
    pub fn is_exact(&self) -> bool {
        matches!(self, TimingStrategy::ExactTimestamps)
    }
}

impl std::fmt::Display for TimingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved word timings plus how they were obtained
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub words: Vec<WordTiming>,
    pub strategy: TimingStrategy,
    /// Records dropped along the way (malformed entries, overlaps)
    pub skipped: usize,
}

impl Resolution {
    /// End of the last word, or 0 when empty
    pub fn duration(&self) -> TimeSec {
        self.words.last().map(|w| w.end).unwrap_or(0.0)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Strategies in the order they are attempted
const STRATEGY_LADDER: [TimingStrategy; 4] = [
    TimingStrategy::ExactTimestamps,
    TimingStrategy::SegmentEstimate,
    TimingStrategy::SubtitleEstimate,
    TimingStrategy::EvenSplit,
];

/// Resolves word timings through the strategy ladder
#[derive(Clone, Debug, PartialEq)]
pub struct WordTimingResolver {
    speaking_rate_wpm: f64,
}

impl Default for WordTimingResolver {
    fn default() -> Self {
        Self {
            speaking_rate_wpm: DEFAULT_SPEAKING_RATE_WPM,
        }
    }
}

impl WordTimingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the even-split speaking rate; invalid rates keep the default
    pub fn with_speaking_rate(mut self, words_per_minute: f64) -> Self {
        if words_per_minute.is_finite() && words_per_minute > 0.0 {
            self.speaking_rate_wpm = words_per_minute;
        } else {
            warn!(
                "Ignoring invalid speaking rate {}, keeping {} wpm",
                words_per_minute, self.speaking_rate_wpm
            );
        }
        self
    }

    pub fn speaking_rate(&self) -> f64 {
        self.speaking_rate_wpm
    }

    /// Resolves the input into ordered, non-overlapping word timings
    pub fn resolve(&self, input: &TranscriptInput) -> CaptionResult<Resolution> {
        let duration = input.duration.filter(|d| d.is_finite() && *d > 0.0);

        for strategy in STRATEGY_LADDER {
            let (raw, skipped) = match strategy {
                TimingStrategy::ExactTimestamps => exact_words(&input.words),
                TimingStrategy::SegmentEstimate => estimate_from_segments(&input.segments),
                TimingStrategy::SubtitleEstimate => {
                    estimate_from_subtitles(input.subtitles.as_deref())
                }
                TimingStrategy::EvenSplit => self.even_split(input.text.as_deref(), duration),
            };
            if raw.is_empty() {
                debug!("Strategy {} produced no words", strategy);
                continue;
            }

            let (words, dropped) = enforce_monotonic(raw, duration);
            if words.is_empty() {
                debug!("Strategy {} produced no usable words", strategy);
                continue;
            }

            info!(
                "Resolved {} words via {} ({} records skipped)",
                words.len(),
                strategy,
                input.dropped + skipped + dropped
            );
            return Ok(Resolution {
                words,
                strategy,
                skipped: input.dropped + skipped + dropped,
            });
        }

        Err(CaptionError::NoTimingDataAvailable)
    }

    /// Even split of plain text over `[0, estimated duration]`.
    ///
    /// A known duration shorter than the estimate compresses the span to fit,
    /// so the duration clamp never cuts words off the end.
    fn even_split(&self, text: Option<&str>, duration: Option<TimeSec>) -> (Vec<WordTiming>, usize) {
        let words = split_words(text.unwrap_or_default());
        let estimated = estimate_duration(words.len(), self.speaking_rate_wpm);
        let span_end = match duration {
            Some(limit) if limit < estimated => {
                debug!(
                    "Estimated {:.3}s exceeds known duration {:.3}s, compressing even split",
                    estimated, limit
                );
                limit
            }
            _ => estimated,
        };
        (distribute_span(&words, 0.0, span_end), 0)
    }
}

/// Resolves with the default speaking rate
pub fn resolve(input: &TranscriptInput) -> CaptionResult<Resolution> {
    WordTimingResolver::default().resolve(input)
}

// =============================================================================
// Strategies
// =============================================================================

/// Validates provider words: trims, drops empty words and invalid bounds.
/// A provider "word" containing whitespace is split across its own bounds.
fn exact_words(words: &[WordTiming]) -> (Vec<WordTiming>, usize) {
    let mut result = Vec::with_capacity(words.len());
    let mut skipped = 0;

    for word in words {
        let valid_bounds =
            is_valid_time_sec(word.start) && word.end.is_finite() && word.end > word.start;
        let parts = split_words(&word.word);

        if !valid_bounds || parts.is_empty() {
            debug!(
                "Skipping provider word {:?} ({:.3}~{:.3}s)",
                word.word, word.start, word.end
            );
            skipped += 1;
            continue;
        }

        if parts.len() == 1 {
            result.push(WordTiming::new(
                parts[0],
                round_millis(word.start),
                round_millis(word.end),
            ));
        } else {
            result.extend(distribute_span(&parts, word.start, word.end));
        }
    }

    (result, skipped)
}

fn estimate_from_segments(segments: &[TimedSegment]) -> (Vec<WordTiming>, usize) {
    let mut result = Vec::new();
    let mut skipped = 0;

    for segment in segments {
        if !segment.is_well_formed() {
            debug!(
                "Skipping malformed segment {:.3}~{:.3}s {:?}",
                segment.start, segment.end, segment.text
            );
            skipped += 1;
            continue;
        }
        result.extend(distribute_segment(segment));
    }

    (result, skipped)
}

fn estimate_from_subtitles(document: Option<&str>) -> (Vec<WordTiming>, usize) {
    let Some(document) = document else {
        return (Vec::new(), 0);
    };

    let parsed = parse_subtitles(document);
    let (words, skipped) = estimate_from_segments(&parsed.segments);
    (words, parsed.skipped + skipped)
}

/// Enforces strict non-overlap after rounding and clamps to the known duration.
///
/// A word starting before the previous word's end is moved to that end; a word
/// left with no positive duration is dropped and flagged.
fn enforce_monotonic(
    words: Vec<WordTiming>,
    duration: Option<TimeSec>,
) -> (Vec<WordTiming>, usize) {
    let mut result: Vec<WordTiming> = Vec::with_capacity(words.len());
    let mut dropped = 0;

    for mut word in words {
        if let Some(prev) = result.last() {
            if word.start < prev.end {
                warn!(
                    "Word {:?} starts at {:.3}s before previous word ends at {:.3}s, clamping",
                    word.word, word.start, prev.end
                );
                word.start = prev.end;
            }
        }
        if let Some(limit) = duration {
            word.end = word.end.min(round_millis(limit));
        }
        word.start = round_millis(word.start);
        word.end = round_millis(word.end);

        if word.end <= word.start {
            warn!(
                "Dropping word {:?}: no duration left after clamping ({:.3}~{:.3}s)",
                word.word, word.start, word.end
            );
            dropped += 1;
            continue;
        }
        result.push(word);
    }

    (result, dropped)
}

// =============================================================================
// Tests
// =============================================================================
