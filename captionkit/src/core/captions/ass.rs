//! ASS (Advanced SubStation Alpha) Caption Compiler
//!
//! Compiles word timings and a [`CaptionStyle`] into an ASS document with
//! karaoke-style highlighting: words are grouped into pages, and every word of
//! every page gets its own dialogue event in which only that word carries the
//! highlight color.
//!
//! For a page "Hi there" the events are:
//!
//! ```text
//! Dialogue: 0,0:00:00.00,0:00:00.50,Default,,0,0,0,,{\1c&H0000FFFF&}Hi{\r} there
//! Dialogue: 0,0:00:00.50,0:00:01.00,Default,,0,0,0,,Hi {\1c&H0000FFFF&}there{\r}
//! ```
//!
//! Compilation is a pure function of its inputs: no clock, no randomness.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::models::{CaptionStyle, WordTiming};
use super::position::vertical_margin;
use crate::core::{CanvasSize, TimeSec};

/// Name of the single style record every event references
pub const STYLE_NAME: &str = "Default";

/// Horizontal margins in canvas pixels
const MARGIN_HORIZONTAL: u32 = 60;

/// ASS `BorderStyle` values
const BORDER_STYLE_OUTLINE: u8 = 1;
const BORDER_STYLE_OPAQUE_BOX: u8 = 3;

/// Drop shadow depth used in outline mode
const OUTLINE_MODE_SHADOW: u32 = 1;

// =============================================================================
// Events
// =============================================================================

/// One compiled dialogue line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEvent {
    pub start: TimeSec,
    pub end: TimeSec,
    /// ASS markup with exactly one highlighted word
    pub text: String,
}

/// A contiguous run of words shown together on screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Page<'a> {
    pub words: &'a [WordTiming],
}

impl Page<'_> {
    /// Displayed span start (first word's start)
    pub fn start(&self) -> TimeSec {
        self.words.first().map(|w| w.start).unwrap_or(0.0)
    }

    /// Displayed span end (last word's end)
    pub fn end(&self) -> TimeSec {
        self.words.last().map(|w| w.end).unwrap_or(0.0)
    }
}

/// Partitions words into consecutive pages of `words_per_page` (last may be shorter)
pub fn paginate(words: &[WordTiming], words_per_page: usize) -> Vec<Page<'_>> {
    words
        .chunks(words_per_page.max(1))
        .map(|words| Page { words })
        .collect()
}

/// Builds the karaoke event stream: one event per word per page.
///
/// Each event runs from its word's start to the next word's start within the
/// page, and the last word of a page runs to the page end, so a page is
/// covered without gaps. Events are never merged.
pub fn build_events(words: &[WordTiming], style: &CaptionStyle) -> Vec<SubtitleEvent> {
    let highlight = format!("{}&", style.highlight_color.to_ass_color());
    let mut events = Vec::with_capacity(words.len());

    for page in paginate(words, style.words_per_page) {
        let page_end = page.end();

        for (idx, word) in page.words.iter().enumerate() {
            let end = page.words.get(idx + 1).map_or(page_end, |next| next.start);

            // Shorter than one centisecond collapses to a zero-length dialogue line
            if centiseconds(end) <= centiseconds(word.start) {
                warn!(
                    "Skipping caption event for {:?}: end {:.3}s is not after start {:.3}s",
                    word.word, end, word.start
                );
                continue;
            }

            events.push(SubtitleEvent {
                start: word.start,
                end,
                text: render_page_text(page.words, idx, &highlight),
            });
        }
    }

    events
}

/// Joins the page's words with single spaces, wrapping `highlighted` in a
/// primary-color override that `\r` resets back to the style's text color.
fn render_page_text(words: &[WordTiming], highlighted: usize, highlight_color: &str) -> String {
    let mut text = String::new();

    for (idx, word) in words.iter().enumerate() {
        if idx > 0 {
            text.push(' ');
        }

        let escaped = escape_ass_text(&word.word);
        if idx == highlighted {
            let _ = write!(text, "{{\\1c{}}}{}{{\\r}}", highlight_color, escaped);
        } else {
            text.push_str(&escaped);
        }
    }

    text
}

// =============================================================================
// Compiler
// =============================================================================

/// Compiles word timings into ASS documents for a fixed canvas
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CaptionCompiler {
    canvas: CanvasSize,
}

impl CaptionCompiler {
    pub fn new(canvas: CanvasSize) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Compiles a full ASS document.
    ///
    /// Empty input yields an empty string rather than an error, so
    /// "transcribe then compile" can run unconditionally and the caller simply
    /// skips burning an empty result.
    pub fn compile(&self, words: &[WordTiming], style: &CaptionStyle) -> String {
        if words.is_empty() {
            return String::new();
        }

        let style = &style.clone().normalized();
        let events = build_events(words, style);
        let mut output = String::new();

        // Script Info section
        output.push_str("[Script Info]\n");
        output.push_str("; Generated by captionkit\n");
        output.push_str("ScriptType: v4.00+\n");
        let _ = writeln!(output, "PlayResX: {}", self.canvas.width);
        let _ = writeln!(output, "PlayResY: {}", self.canvas.height);
        output.push_str("WrapStyle: 0\n");
        output.push_str("ScaledBorderAndShadow: yes\n\n");

        // V4+ Styles section
        output.push_str("[V4+ Styles]\n");
        output.push_str(
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
        );
        output.push_str(&self.style_line(style));
        output.push_str("\n\n");

        // Events section
        output.push_str("[Events]\n");
        output.push_str(
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        );
        for event in &events {
            let _ = writeln!(
                output,
                "Dialogue: 0,{},{},{},,0,0,0,,{}",
                format_ass_timestamp(event.start),
                format_ass_timestamp(event.end),
                STYLE_NAME,
                event.text
            );
        }

        output
    }

    /// Formats the single style record.
    ///
    /// Background set: opaque box (`BorderStyle=3`), box drawn in the outline
    /// and back colors with opacity folded into alpha, no shadow.
    /// Background absent: outline of `outline_width` plus a drop shadow.
    fn style_line(&self, style: &CaptionStyle) -> String {
        let (border_style, outline_color, back_color, shadow) = match style.background_color {
            Some(background) => {
                let boxed = background.to_ass_color_with_opacity(style.background_opacity);
                (BORDER_STYLE_OPAQUE_BOX, boxed.clone(), boxed, 0)
            }
            None => (
                BORDER_STYLE_OUTLINE,
                style.outline_color.to_ass_color(),
                style.outline_color.to_ass_color_with_opacity(50),
                OUTLINE_MODE_SHADOW,
            ),
        };

        let position = style.position();
        format!(
            "Style: {name},{font},{size},{primary},{secondary},{outline},{back},{bold},{italic},0,0,100,100,0,0,{border},{outline_w},{shadow},{align},{ml},{mr},{mv},1",
            name = STYLE_NAME,
            font = style.font_family,
            size = style.font_size,
            primary = style.text_color.to_ass_color(),
            secondary = style.highlight_color.to_ass_color(),
            outline = outline_color,
            back = back_color,
            bold = ass_flag(style.bold),
            italic = ass_flag(style.italic),
            border = border_style,
            outline_w = style.outline_width,
            shadow = shadow,
            align = position.ass_alignment(),
            ml = MARGIN_HORIZONTAL,
            mr = MARGIN_HORIZONTAL,
            mv = vertical_margin(style.vertical_position_percent, self.canvas.height),
        )
    }
}

/// Compiles with the default (vertical 1080x1920) canvas
pub fn compile(words: &[WordTiming], style: &CaptionStyle) -> String {
    CaptionCompiler::default().compile(words, style)
}

/// ASS booleans are -1 (true) / 0 (false)
fn ass_flag(value: bool) -> i8 {
    if value {
        -1
    } else {
        0
    }
}

/// Rounds seconds to the centisecond grid ASS timestamps use
fn centiseconds(seconds: TimeSec) -> u64 {
    (seconds.max(0.0) * 100.0).round() as u64
}

/// Formats seconds as an ASS timestamp (H:MM:SS.cc)
pub fn format_ass_timestamp(seconds: TimeSec) -> String {
    let total_cs = centiseconds(seconds);
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;

    format!("{}:{:02}:{:02}.{:02}", total_mins / 60, total_mins % 60, secs, cs)
}

/// Escape special characters in ASS text
fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('\n', "\\N")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::models::Color;
    use crate::core::captions::position::CaptionPosition;

    const YELLOW: &str = "{\\1c&H0000FFFF&}";

    fn words(items: &[(&str, f64, f64)]) -> Vec<WordTiming> {
        items
            .iter()
            .map(|(w, s, e)| WordTiming::new(w, *s, *e))
            .collect()
    }

    fn style(words_per_page: usize) -> CaptionStyle {
        CaptionStyle {
            words_per_page,
            ..Default::default()
        }
    }

    fn seven_words() -> Vec<WordTiming> {
        (0..7)
            .map(|i| WordTiming::new(&format!("w{i}"), i as f64, i as f64 + 1.0))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Timestamp / Escape Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_ass_timestamp() {
        assert_eq!(format_ass_timestamp(0.0), "0:00:00.00");
        assert_eq!(format_ass_timestamp(1.5), "0:00:01.50");
        assert_eq!(format_ass_timestamp(61.0), "0:01:01.00");
        assert_eq!(format_ass_timestamp(3661.0), "1:01:01.00");
        assert_eq!(format_ass_timestamp(0.125), "0:00:00.13");
        // Rounding up never produces ".100"
        assert_eq!(format_ass_timestamp(59.999), "0:01:00.00");
    }

    #[test]
    fn test_escape_ass_text() {
        assert_eq!(escape_ass_text("Hello"), "Hello");
        assert_eq!(escape_ass_text("{override}"), "\\{override\\}");
        assert_eq!(escape_ass_text("a\\b"), "a\\\\b");
    }

    // -------------------------------------------------------------------------
    // Paging Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_page_partition_sizes() {
        let words = seven_words();
        let pages = paginate(&words, 3);
        let sizes: Vec<usize> = pages.iter().map(|p| p.words.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(pages[1].start(), 3.0);
        assert_eq!(pages[1].end(), 6.0);
    }

    #[test]
    fn test_one_event_per_word() {
        let events = build_events(&seven_words(), &style(3));
        assert_eq!(events.len(), 7);
    }

    #[test]
    fn test_highlight_sweeps_left_to_right() {
        let words = words(&[("a", 0.0, 0.4), ("b", 0.5, 0.9), ("c", 1.0, 1.5)]);
        let events = build_events(&words, &style(3));

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].text, format!("{YELLOW}a{{\\r}} b c"));
        assert_eq!(events[1].text, format!("a {YELLOW}b{{\\r}} c"));
        assert_eq!(events[2].text, format!("a b {YELLOW}c{{\\r}}"));

        // Increasing, non-overlapping, gap-free across the page
        assert_eq!((events[0].start, events[0].end), (0.0, 0.5));
        assert_eq!((events[1].start, events[1].end), (0.5, 1.0));
        assert_eq!((events[2].start, events[2].end), (1.0, 1.5));
    }

    #[test]
    fn test_last_event_of_page_runs_to_page_end() {
        let words = words(&[("a", 0.0, 1.0), ("b", 1.2, 2.0), ("c", 3.0, 3.5)]);
        let events = build_events(&words, &style(2));

        // Page 1: a, b ; page 2: c
        assert_eq!(events[1].end, 2.0);
        assert_eq!(events[2].start, 3.0);
        assert_eq!(events[2].end, 3.5);
        assert_eq!(events[2].text, format!("{YELLOW}c{{\\r}}"));
    }

    #[test]
    fn test_events_never_merged() {
        let words = words(&[("same", 0.0, 1.0), ("same", 1.0, 2.0)]);
        let events = build_events(&words, &style(1));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].text, events[1].text);
    }

    #[test]
    fn test_inverted_event_is_skipped() {
        // Second word starts before the first: the first event would have negative duration
        let words = words(&[("late", 2.0, 3.0), ("early", 1.0, 1.5)]);
        let events = build_events(&words, &style(2));
        assert_eq!(events.len(), 1);
        assert!(events.iter().all(|e| e.end > e.start));
    }

    #[test]
    fn test_sub_centisecond_event_is_skipped() {
        let words = words(&[("blip", 0.0, 0.004), ("word", 0.004, 1.0)]);
        let events = build_events(&words, &style(2));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, 0.004);
        assert!(events
            .iter()
            .all(|e| format_ass_timestamp(e.start) != format_ass_timestamp(e.end)));
    }

    // -------------------------------------------------------------------------
    // Document Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_end_to_end_hello_world() {
        let words = words(&[("hello", 0.0, 1.0), ("world", 1.0, 2.0)]);
        let doc = compile(&words, &style(2));

        let dialogues: Vec<&str> = doc.lines().filter(|l| l.starts_with("Dialogue:")).collect();
        assert_eq!(
            dialogues,
            vec![
                "Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,{\\1c&H0000FFFF&}hello{\\r} world",
                "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,hello {\\1c&H0000FFFF&}world{\\r}",
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_document() {
        assert_eq!(compile(&[], &CaptionStyle::default()), "");
    }

    #[test]
    fn test_compile_is_idempotent() {
        let words = seven_words();
        let style = style(3);
        assert_eq!(compile(&words, &style), compile(&words, &style));
    }

    #[test]
    fn test_document_sections() {
        let compiler = CaptionCompiler::new(CanvasSize::landscape());
        let doc = compiler.compile(&seven_words(), &style(3));

        assert!(doc.starts_with("[Script Info]\n"));
        assert!(doc.contains("PlayResX: 1920\n"));
        assert!(doc.contains("PlayResY: 1080\n"));
        assert!(doc.contains("[V4+ Styles]\n"));
        assert!(doc.contains("[Events]\n"));
        assert_eq!(doc.lines().filter(|l| l.starts_with("Style:")).count(), 1);
        assert_eq!(doc.lines().filter(|l| l.starts_with("Dialogue:")).count(), 7);
    }

    #[test]
    fn test_style_line_outline_mode() {
        let compiler = CaptionCompiler::new(CanvasSize::vertical());
        let style = CaptionStyle {
            font_family: "Inter".to_string(),
            font_size: 52,
            bold: true,
            italic: false,
            outline_width: 4,
            ..Default::default()
        }
        .with_position(CaptionPosition::Bottom);

        assert_eq!(
            compiler.style_line(&style),
            "Style: Default,Inter,52,&H00FFFFFF,&H0000FFFF,&H00000000,&H80000000,-1,0,0,0,100,100,0,0,1,4,1,2,60,60,576,1"
        );
    }

    #[test]
    fn test_style_line_box_mode() {
        let compiler = CaptionCompiler::new(CanvasSize::vertical());
        let style = CaptionStyle {
            background_color: Some(Color::rgb(0x10, 0x20, 0x30)),
            background_opacity: 50,
            italic: true,
            ..Default::default()
        }
        .with_position(CaptionPosition::Top);

        let line = compiler.style_line(&style);
        let fields: Vec<&str> = line.trim_start_matches("Style: ").split(',').collect();
        assert_eq!(fields[5], "&H80302010"); // OutlineColour = box fill
        assert_eq!(fields[6], "&H80302010"); // BackColour
        assert_eq!(fields[8], "-1"); // Italic
        assert_eq!(fields[15], "3"); // BorderStyle = opaque box
        assert_eq!(fields[17], "0"); // no shadow
        assert_eq!(fields[18], "8"); // top alignment
        assert_eq!(fields[21], "384"); // 20% of 1920
    }

    #[test]
    fn test_compile_normalizes_out_of_range_style() {
        let style = CaptionStyle {
            font_family: "Inter, Bold".to_string(),
            font_size: 500,
            words_per_page: 0,
            ..Default::default()
        };
        let doc = compile(&seven_words(), &style);

        let style_line = doc.lines().find(|l| l.starts_with("Style:")).unwrap();
        let fields: Vec<&str> = style_line.trim_start_matches("Style: ").split(',').collect();
        assert_eq!(fields.len(), 23);
        assert_eq!(fields[1], "Inter  Bold");
        assert_eq!(fields[2], "80");
        // One word per page after clamping
        assert!(doc.contains(&format!(",,{YELLOW}w0{{\\r}}\n")));
    }

    #[test]
    fn test_center_position_uses_middle_alignment() {
        let compiler = CaptionCompiler::default();
        let style = CaptionStyle::default().with_vertical_percent(45.0);
        let line = compiler.style_line(&style);
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields[18], "5");
        assert_eq!(fields[21], "0");
    }

    #[test]
    fn test_highlight_override_matches_style_encoding() {
        let style = CaptionStyle {
            highlight_color: Color::rgb(0xCB, 0xA6, 0xF7),
            ..style(2)
        };
        let doc = compile(&words(&[("hi", 0.0, 1.0)]), &style);
        assert!(doc.contains(",&H00F7A6CB,")); // SecondaryColour in header
        assert!(doc.contains("{\\1c&H00F7A6CB&}hi{\\r}"));
    }
}
