//! Destructive and Edge Case Tests for Caption Generation
//!
//! These tests feed hostile or degenerate transcripts through the resolver and
//! compiler and check that output stays well-formed instead of panicking.

use crate::core::captions::{
    compile, parse_provider_response, parse_subtitles, resolve, CaptionStyle, Color,
    TimedSegment, TimingStrategy, TranscriptInput, WordTiming,
};
use crate::core::{CanvasSize, CaptionError};

fn assert_ordered(words: &[WordTiming]) {
    for word in words {
        assert!(word.end > word.start, "{word:?}");
        assert!(word.start >= 0.0, "{word:?}");
    }
    for pair in words.windows(2) {
        assert!(pair[1].start >= pair[0].end, "{pair:?}");
    }
}

#[test]
fn test_destructive_nan_and_infinite_timestamps() {
    let input = TranscriptInput::from_words(vec![
        WordTiming::new("nan", f64::NAN, 1.0),
        WordTiming::new("inf", 0.0, f64::INFINITY),
        WordTiming::new("neg", -1.0, 0.5),
        WordTiming::new("ok", 1.0, 1.5),
    ]);
    let resolution = resolve(&input).unwrap();

    assert_eq!(resolution.strategy, TimingStrategy::ExactTimestamps);
    assert_eq!(resolution.words, vec![WordTiming::new("ok", 1.0, 1.5)]);
    assert_eq!(resolution.skipped, 3);
}

#[test]
fn test_destructive_fully_overlapping_words() {
    let input = TranscriptInput::from_words(vec![
        WordTiming::new("a", 0.0, 5.0),
        WordTiming::new("b", 1.0, 2.0),
        WordTiming::new("c", 3.0, 6.0),
    ]);
    let resolution = resolve(&input).unwrap();

    assert_ordered(&resolution.words);
    let kept: Vec<&str> = resolution.words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(kept, vec!["a", "c"]);
}

#[test]
fn test_destructive_unsorted_segments() {
    let input = TranscriptInput::from_segments(vec![
        TimedSegment::new(4.0, 6.0, "second part"),
        TimedSegment::new(0.0, 2.0, "first part"),
    ]);
    let resolution = resolve(&input).unwrap();
    assert_ordered(&resolution.words);
}

#[test]
fn test_destructive_zero_length_segment() {
    let input = TranscriptInput::from_segments(vec![TimedSegment::new(1.0, 1.0, "instant")]);
    assert!(matches!(
        resolve(&input),
        Err(CaptionError::NoTimingDataAvailable)
    ));
}

#[test]
fn test_destructive_many_tiny_words_in_short_span() {
    let text = vec!["x"; 500].join(" ");
    let input = TranscriptInput::from_segments(vec![TimedSegment::new(0.0, 0.1, &text)]);
    let resolution = resolve(&input).unwrap();

    // Millisecond rounding collapses most slots; survivors remain ordered
    assert!(!resolution.words.is_empty());
    assert!(resolution.words.len() < 500);
    assert_ordered(&resolution.words);
}

#[test]
fn test_destructive_subtitle_garbage() {
    let parsed = parse_subtitles("\u{0}\u{1}garbage\n-->\n\n1\n99:99:99,999 --> 00:00:01,000\nx\n");
    assert!(parsed.segments.is_empty());
    assert_eq!(parsed.skipped, 2);
}

#[test]
fn test_destructive_markup_in_words_is_escaped() {
    let words = vec![
        WordTiming::new("{\\b1}", 0.0, 1.0),
        WordTiming::new("back\\slash", 1.0, 2.0),
    ];
    let doc = compile(&words, &CaptionStyle::default());

    assert!(doc.contains("\\{\\\\b1\\}"));
    assert!(doc.contains("back\\\\slash"));
}

#[test]
fn test_destructive_extreme_style_values() {
    let style = CaptionStyle::from_json(
        r#"{"fontSize": 9999, "wordsPerPage": 0, "verticalPositionPercent": -50, "backgroundOpacity": 250, "fontFamily": ",,,"}"#,
    )
    .unwrap();

    assert_eq!(style.words_per_page, 1);
    assert_eq!(style.vertical_position_percent, 0.0);
    assert_eq!(style.background_opacity, 100);
    assert_eq!(style.font_family, "Arial");

    let doc = compile(&[WordTiming::new("hi", 0.0, 1.0)], &style);
    assert_eq!(doc.lines().filter(|l| l.starts_with("Dialogue:")).count(), 1);
}

#[test]
fn test_destructive_invalid_colors() {
    assert!(Color::try_from_hex("#GGGGGG").is_err());
    assert!(Color::try_from_hex("#12345").is_err());
    assert!(Color::try_from_hex("").is_err());
    assert!(CaptionStyle::from_json(r#"{"textColor": "red"}"#).is_err());
}

#[test]
fn test_destructive_zero_canvas() {
    assert_eq!(CanvasSize::new(0, 0), CanvasSize::default());
}

#[test]
fn test_destructive_provider_wrong_types() {
    let input = parse_provider_response(
        r#"{"words": [{"word": 5, "start": "0", "end": null}, {"word": "ok", "start": 0, "end": 1}], "text": 42}"#,
    )
    .unwrap();

    assert_eq!(input.words.len(), 1);
    assert_eq!(input.dropped, 1);
    assert!(input.text.is_none());
}

#[test]
fn test_destructive_provider_not_json() {
    assert!(matches!(
        parse_provider_response("<xml/>"),
        Err(CaptionError::JsonError(_))
    ));
}
