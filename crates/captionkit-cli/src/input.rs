//! Transcript and style loading for the CLI

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use captionkit_lib::core::captions::{
    parse_provider_response, CaptionStyle, PresetCatalog, TranscriptInput,
};
use captionkit_lib::core::settings::CaptionSettings;

use crate::cli::StyleArgs;

/// Kind of transcript file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    /// Provider JSON response
    ProviderJson,
    /// SRT or WebVTT document
    Subtitles,
    /// Plain text without timing
    PlainText,
}

impl TranscriptKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => TranscriptKind::ProviderJson,
            Some("srt") | Some("vtt") => TranscriptKind::Subtitles,
            _ => TranscriptKind::PlainText,
        }
    }
}

/// Parses transcript content of the given kind
pub fn parse_transcript(
    content: &str,
    kind: TranscriptKind,
    duration: Option<f64>,
) -> Result<TranscriptInput> {
    let input = match kind {
        TranscriptKind::ProviderJson => {
            parse_provider_response(content).context("Failed to parse provider response")?
        }
        TranscriptKind::Subtitles => TranscriptInput::from_subtitles(content),
        TranscriptKind::PlainText => TranscriptInput::from_text(content),
    };

    Ok(match duration {
        Some(duration) => input.with_duration(duration),
        None => input,
    })
}

/// Reads and parses a transcript file
pub fn load_transcript(path: &Path, duration: Option<f64>) -> Result<TranscriptInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    let kind = TranscriptKind::from_path(path);
    debug!("Loading {} as {:?}", path.display(), kind);

    parse_transcript(&content, kind, duration)
        .with_context(|| format!("Invalid transcript {}", path.display()))
}

/// Resolves the effective style: custom JSON or preset, then overrides.
///
/// An explicit position label wins over the style's percent; an explicit
/// percent re-derives the label.
pub fn resolve_style(args: &StyleArgs, settings: &CaptionSettings) -> Result<CaptionStyle> {
    let mut style = match &args.style {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read style {}", path.display()))?;
            CaptionStyle::from_json(&json)
                .with_context(|| format!("Invalid style {}", path.display()))?
        }
        None => {
            let catalog = PresetCatalog::with_custom(&settings.custom_presets);
            let id = args.preset.as_deref().unwrap_or(&settings.default_preset);
            catalog.get(id)?.clone()
        }
    };

    if let Some(position) = args.position {
        style = style.with_position(position);
    }
    if let Some(percent) = args.percent {
        style = style.with_vertical_percent(percent);
    }
    if let Some(words_per_page) = args.words_per_page {
        style = style.with_words_per_page(words_per_page);
    }

    Ok(style)
}
