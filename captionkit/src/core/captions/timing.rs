//! Proportional Word Timing
//!
//! Allocates a known time span across the words of a phrase, weighted by
//! `(character count + 1)`. Used by every estimating strategy.

use super::models::{TimedSegment, WordTiming};
use crate::core::{round_millis, TimeSec};

/// Default speaking rate for the even-split fallback, in words per minute
pub const DEFAULT_SPEAKING_RATE_WPM: f64 = 150.0;

/// Splits text into trimmed, non-empty words
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Weight of one word: its character count plus one, so one-character
/// tokens never collapse to a zero-length slot.
fn word_weight(word: &str) -> f64 {
    (word.chars().count() + 1) as f64
}

/// Distributes `[start, end]` across `words` proportionally to their weights.
///
/// Boundaries are computed from cumulative weight and rounded once, so
/// consecutive words share the exact same boundary value. The first word
/// starts at `start` and the last word ends exactly at `end`.
pub fn distribute_span(words: &[&str], start: TimeSec, end: TimeSec) -> Vec<WordTiming> {
    if words.is_empty() || !(end > start) {
        return Vec::new();
    }

    let total_weight: f64 = words.iter().map(|w| word_weight(w)).sum();
    let span = end - start;
    let span_start = round_millis(start);
    let span_end = round_millis(end);

    let mut timings = Vec::with_capacity(words.len());
    let mut cumulative = 0.0;
    let mut word_start = span_start;

    for (idx, word) in words.iter().enumerate() {
        cumulative += word_weight(word);
        let word_end = if idx + 1 == words.len() {
            span_end
        } else {
            round_millis(start + span * cumulative / total_weight)
        };

        timings.push(WordTiming::new(word, word_start, word_end));
        word_start = word_end;
    }

    timings
}

/// Distributes one segment's text across the segment's bounds
pub fn distribute_segment(segment: &TimedSegment) -> Vec<WordTiming> {
    distribute_span(&split_words(&segment.text), segment.start, segment.end)
}

/// Estimated speaking duration of `word_count` words at `words_per_minute`
pub fn estimate_duration(word_count: usize, words_per_minute: f64) -> TimeSec {
    let rate = if words_per_minute.is_finite() && words_per_minute > 0.0 {
        words_per_minute
    } else {
        DEFAULT_SPEAKING_RATE_WPM
    };
    round_millis(word_count as f64 / rate * 60.0)
}
