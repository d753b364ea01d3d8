//! Caption System Module
//!
//! Word-synchronized ("karaoke") captions for short-form video:
//! - Word-timing resolution from whatever transcript data a job carries
//! - ASS subtitle compilation with per-word highlighting
//! - Style presets and vertical position mapping
//! - SRT/VTT parsing (fallback input) and export (inspection)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption System                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  providers.rs  - Provider JSON → TranscriptInput                │
//! │  resolver.rs   - TranscriptInput → word timings                 │
//! │  timing.rs     - Proportional span distribution                 │
//! │  formats.rs    - SRT/VTT parsing and export                     │
//! │  ass.rs        - Word timings + style → ASS document            │
//! │  presets.rs    - Named styles                                   │
//! │  position.rs   - Position label ↔ percent ↔ renderer anchor     │
//! │  pipeline.rs   - Resolve + compile as one degradable step       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use captionkit_lib::core::captions::{CaptionStep, PresetCatalog, TranscriptInput};
//!
//! let input = TranscriptInput::from_text("hello world").with_duration(2.0);
//! let style = PresetCatalog::builtin().get("classic")?.clone();
//!
//! if let Some(document) = CaptionStep::default().run(&input, &style).document() {
//!     std::fs::write("captions.ass", document)?;
//! }
//! ```

pub mod ass;
pub mod formats;
pub mod models;
pub mod pipeline;
pub mod position;
pub mod presets;
pub mod providers;
pub mod resolver;
pub mod timing;

// Re-export models
pub use models::{CaptionStyle, Color, TimedSegment, WordTiming};
pub use position::{percent_to_position, position_to_percent, vertical_margin, CaptionPosition};
pub use presets::{PresetCatalog, DEFAULT_PRESET_ID};

// Re-export resolver and compiler
pub use ass::{compile, CaptionCompiler, SubtitleEvent};
pub use pipeline::{CaptionOutcome, CaptionStep};
pub use resolver::{resolve, Resolution, TimingStrategy, TranscriptInput, WordTimingResolver};

// Re-export format functions
pub use formats::{export_srt, export_vtt, parse_subtitles, ParsedSubtitles};
pub use providers::parse_provider_response;
