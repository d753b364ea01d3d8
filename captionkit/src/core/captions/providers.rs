//! Provider Response Normalization
//!
//! Maps the response shapes transcription and text-to-speech providers return
//! into the canonical [`TranscriptInput`] before the resolver runs, so the
//! resolver never branches on provider field names.
//!
//! Recognized shapes:
//! - top-level `words: [{word|text, start|start_time|startTime, end|...}]`
//! - `segments: [{start, end, text, words?}]` with optional nested words
//! - `chunks: [{text, timestamp: [start, end]}]`
//! - `alternatives: [{words, ...}]` (first alternative is used)
//! - character alignment `{characters, character_start_times_seconds, ...}`
//!   under `alignment` or `normalized_alignment`
//! - `text` / `transcript`, `srt` / `vtt` / `subtitles`, `duration`
//! - a bare array of word objects or segment objects

use serde_json::{Map, Value};
use tracing::debug;

use super::models::{TimedSegment, WordTiming};
use super::resolver::TranscriptInput;
use crate::core::{CaptionError, CaptionResult, TimeSec};

const WORD_KEYS: &[&str] = &["word", "text", "punctuated_word"];
const START_KEYS: &[&str] = &["start", "start_time", "startTime", "start_sec"];
const END_KEYS: &[&str] = &["end", "end_time", "endTime", "end_sec"];
const TEXT_KEYS: &[&str] = &["text", "transcript", "full_text", "fullText"];
const SUBTITLE_KEYS: &[&str] = &["subtitles", "srt", "vtt"];
const DURATION_KEYS: &[&str] = &["duration", "audio_duration", "duration_seconds"];
const WORD_ONLY_KEYS: &[&str] = &["word", "punctuated_word", "type"];

/// Parses a provider JSON response into canonical transcript input
pub fn parse_provider_response(json: &str) -> CaptionResult<TranscriptInput> {
    let value: Value = serde_json::from_str(json)?;
    normalize_response(&value)
}

/// Normalizes an already-parsed provider response
pub fn normalize_response(value: &Value) -> CaptionResult<TranscriptInput> {
    match value {
        Value::Object(obj) => Ok(normalize_object(obj)),
        Value::Array(items) => Ok(normalize_array(items)),
        Value::String(text) => Ok(TranscriptInput::from_text(text)),
        other => Err(CaptionError::InvalidFormat(format!(
            "Unsupported provider response: expected object, array or string, got {}",
            type_name(other)
        ))),
    }
}

fn normalize_object(obj: &Map<String, Value>) -> TranscriptInput {
    // Some providers wrap results in ranked alternatives
    if let Some(first) = lookup(obj, &["alternatives"])
        .and_then(Value::as_array)
        .and_then(|alts| alts.first())
        .and_then(Value::as_object)
    {
        let mut input = normalize_object(first);
        if input.duration.is_none() {
            input.duration = lookup_number(obj, DURATION_KEYS);
        }
        return input;
    }

    let mut input = TranscriptInput {
        text: lookup_string(obj, TEXT_KEYS),
        subtitles: lookup_string(obj, SUBTITLE_KEYS),
        duration: lookup_number(obj, DURATION_KEYS),
        ..Default::default()
    };

    if let Some(words) = lookup(obj, &["words"]).and_then(Value::as_array) {
        collect_words(words, &mut input);
    }

    if let Some(segments) = lookup(obj, &["segments", "chunks"]).and_then(Value::as_array) {
        for segment in segments {
            collect_segment(segment, &mut input);
        }
    }

    if input.words.is_empty() {
        let alignment = lookup(obj, &["alignment"])
            .or_else(|| lookup(obj, &["normalized_alignment"]))
            .and_then(Value::as_object);
        if let Some(alignment) = alignment {
            input.words = words_from_characters(alignment);
        }
    }

    input
}

fn normalize_array(items: &[Value]) -> TranscriptInput {
    let mut input = TranscriptInput::default();

    if is_word_array(items) {
        collect_words(items, &mut input);
    } else {
        for item in items {
            collect_segment(item, &mut input);
        }
    }

    input
}

/// True when a bare array holds word entries rather than phrase segments.
///
/// Entries carrying a word-only key (`word`, `punctuated_word`, `type`) decide
/// it; otherwise every entry must be a single timed token without nested words.
fn is_word_array(items: &[Value]) -> bool {
    let objects: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();

    if objects
        .iter()
        .any(|obj| WORD_ONLY_KEYS.iter().any(|key| obj.contains_key(*key)))
    {
        return true;
    }

    !objects.is_empty()
        && objects.iter().all(|obj| {
            !obj.contains_key("words")
                && lookup_number(obj, START_KEYS).is_some()
                && lookup_number(obj, END_KEYS).is_some()
                && lookup_string(obj, TEXT_KEYS).is_some_and(|text| is_single_token(&text))
        })
}

fn is_single_token(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.contains(char::is_whitespace)
}

/// Maps word objects; entries missing a word string or numeric bounds are dropped
fn collect_words(items: &[Value], input: &mut TranscriptInput) {
    for item in items {
        let Some(obj) = item.as_object() else {
            input.dropped += 1;
            continue;
        };

        // Spacing and audio-event entries are not words
        if lookup_string(obj, &["type"]).is_some_and(|kind| kind != "word") {
            continue;
        }

        match (
            lookup_string(obj, WORD_KEYS),
            lookup_number(obj, START_KEYS),
            lookup_number(obj, END_KEYS),
        ) {
            (Some(word), Some(start), Some(end)) => {
                input.words.push(WordTiming { word, start, end })
            }
            _ => {
                debug!("Dropping provider word without word or bounds: {}", item);
                input.dropped += 1;
            }
        }
    }
}

/// Maps a segment object, flattening any nested words into the word list
fn collect_segment(item: &Value, input: &mut TranscriptInput) {
    let Some(obj) = item.as_object() else {
        input.dropped += 1;
        return;
    };

    if let Some(words) = lookup(obj, &["words"]).and_then(Value::as_array) {
        collect_words(words, input);
    }

    let bounds = match lookup(obj, &["timestamp"]).and_then(Value::as_array) {
        Some(pair) => (
            pair.first().and_then(Value::as_f64),
            pair.get(1).and_then(Value::as_f64),
        ),
        None => (lookup_number(obj, START_KEYS), lookup_number(obj, END_KEYS)),
    };

    match (lookup_string(obj, TEXT_KEYS), bounds) {
        (Some(text), (Some(start), Some(end))) => {
            input.segments.push(TimedSegment { start, end, text })
        }
        _ => {
            debug!("Dropping provider segment without text or bounds");
            input.dropped += 1;
        }
    }
}

/// Groups character-level alignment into words split on whitespace
fn words_from_characters(alignment: &Map<String, Value>) -> Vec<WordTiming> {
    let array = |key: &str| lookup(alignment, &[key]).and_then(Value::as_array);
    let (Some(chars), Some(starts), Some(ends)) = (
        array("characters"),
        array("character_start_times_seconds"),
        array("character_end_times_seconds"),
    ) else {
        return Vec::new();
    };

    let mut words = Vec::new();
    let mut current = String::new();
    let mut bounds: Option<(TimeSec, TimeSec)> = None;

    let mut flush = |current: &mut String, bounds: &mut Option<(TimeSec, TimeSec)>| {
        if let Some((start, end)) = bounds.take() {
            if !current.is_empty() {
                words.push(WordTiming::new(current, start, end));
            }
        }
        current.clear();
    };

    for ((ch, start), end) in chars.iter().zip(starts).zip(ends) {
        let (Some(ch), Some(start), Some(end)) = (ch.as_str(), start.as_f64(), end.as_f64())
        else {
            continue;
        };

        if ch.trim().is_empty() {
            flush(&mut current, &mut bounds);
            continue;
        }

        current.push_str(ch);
        bounds = Some(match bounds {
            Some((word_start, _)) => (word_start, end),
            None => (start, end),
        });
    }
    flush(&mut current, &mut bounds);

    words
}

// =============================================================================
// Field Lookup
// =============================================================================

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn lookup_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .next()
        .map(str::to_string)
}

fn lookup_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_f64))
        .find(|n| n.is_finite())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Tests
// =============================================================================
