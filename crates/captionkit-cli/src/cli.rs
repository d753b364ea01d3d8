use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

use captionkit_lib::core::captions::CaptionPosition;

/// Word-synchronized karaoke captions for short-form video
#[derive(Parser, Debug)]
#[command(name = "captionkit", author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub log_dir: Option<PathBuf>,

    /// Directory holding captions.json (speaking rate, canvas, custom presets)
    #[arg(long, global = true, default_value = ".captionkit", value_hint = ValueHint::DirPath)]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve word timings from a transcript (.json provider response, .srt, .vtt or plain text)
    Resolve(ResolveArgs),
    /// Compile a transcript into an ASS subtitle document with per-word highlighting
    Compile(CompileArgs),
    /// List the available caption style presets
    Presets(PresetsArgs),
    /// Caption many transcripts concurrently; one failure never stops the others
    Batch(BatchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TranscriptArgs {
    /// Transcript file
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Known audio duration in seconds; no word ends after it
    #[arg(short, long)]
    pub duration: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Named style preset (defaults to the configured default preset)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// JSON file with a custom style; missing fields take their defaults
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "preset")]
    pub style: Option<PathBuf>,

    /// Vertical position label (top, center, bottom)
    #[arg(long, conflicts_with = "percent")]
    pub position: Option<CaptionPosition>,

    /// Vertical position percent (0 = top, 100 = bottom)
    #[arg(long)]
    pub percent: Option<f64>,

    /// Words visible at once
    #[arg(short, long)]
    pub words_per_page: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimingFormat {
    /// Resolution as JSON (words, strategy, skipped)
    #[default]
    Json,
    /// One SRT cue per word
    Srt,
    /// One WebVTT cue per word
    Vtt,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub transcript: TranscriptArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = TimingFormat::Json)]
    pub format: TimingFormat,

    /// Output file; defaults to stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    #[command(flatten)]
    pub transcript: TranscriptArgs,

    #[command(flatten)]
    pub style: StyleArgs,

    /// Output .ass file; defaults to stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PresetsArgs {
    /// Print full styles as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Transcript files
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving one <name>.ass per captioned input
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub style: StyleArgs,
}
