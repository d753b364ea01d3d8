//! Subcommand handlers

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use captionkit_lib::core::captions::{
    export_srt, export_vtt, CaptionOutcome, CaptionStep, CaptionStyle, TimingStrategy,
};
use captionkit_lib::core::settings::CaptionSettings;

use crate::cli::{BatchArgs, CompileArgs, PresetsArgs, ResolveArgs, TimingFormat};
use crate::input::{load_transcript, resolve_style};

/// Writes `content` to `out`, or to stdout when no path is given
fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

// =============================================================================
// resolve
// =============================================================================

pub fn run_resolve(args: &ResolveArgs, settings: &CaptionSettings) -> Result<()> {
    let input = load_transcript(&args.transcript.input, args.transcript.duration)?;
    let step = CaptionStep::from_settings(settings);
    let resolution = step
        .resolver()
        .resolve(&input)
        .with_context(|| format!("No captions for {}", args.transcript.input.display()))?;

    let output = match args.format {
        TimingFormat::Json => serde_json::to_string_pretty(&resolution)?,
        TimingFormat::Srt => export_srt(&resolution.words),
        TimingFormat::Vtt => export_vtt(&resolution.words),
    };
    emit(&output, args.out.as_deref())
}

// =============================================================================
// compile
// =============================================================================

pub fn run_compile(args: &CompileArgs, settings: &CaptionSettings) -> Result<()> {
    let input = load_transcript(&args.transcript.input, args.transcript.duration)?;
    let style = resolve_style(&args.style, settings)?;

    match CaptionStep::from_settings(settings).run(&input, &style) {
        CaptionOutcome::Captioned { document, .. } => emit(&document, args.out.as_deref()),
        CaptionOutcome::Uncaptioned { warning } => {
            bail!(
                "No captions for {}: {}",
                args.transcript.input.display(),
                warning
            )
        }
    }
}

// =============================================================================
// presets
// =============================================================================

pub fn run_presets(args: &PresetsArgs, settings: &CaptionSettings) -> Result<()> {
    let catalog = settings.catalog();

    if args.json {
        let styles: std::collections::BTreeMap<&str, &CaptionStyle> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&styles)?);
        return Ok(());
    }

    for (id, style) in catalog.iter() {
        let marker = if id == settings.default_preset { "*" } else { " " };
        println!(
            "{} {:<12} {:<12} {:>3}pt  {:<6}  {} words  {}",
            marker,
            id,
            style.font_family,
            style.font_size,
            style.position().as_str(),
            style.words_per_page,
            if style.has_background() { "box" } else { "outline" }
        );
    }
    Ok(())
}

// =============================================================================
// batch
// =============================================================================

/// Per-input result of a batch run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BatchItem {
    #[serde(rename_all = "camelCase")]
    Captioned {
        input: PathBuf,
        output: PathBuf,
        strategy: TimingStrategy,
        word_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    Uncaptioned { input: PathBuf, warning: String },
    #[serde(rename_all = "camelCase")]
    Failed { input: PathBuf, error: String },
}

impl BatchItem {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchItem::Failed { .. })
    }
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "captions".to_string())
}

/// Assigns every input a distinct `<out_dir>/<file stem>.ass` before any task runs.
///
/// Inputs sharing a stem (`a/talk.txt`, `b/talk.txt`) get `talk.ass`,
/// `talk-2.ass`, ... in input order.
fn plan_outputs(inputs: &[PathBuf], out_dir: &Path) -> Vec<PathBuf> {
    let mut taken = HashSet::new();

    inputs
        .iter()
        .map(|input| {
            let stem = input_stem(input);
            let mut name = format!("{}.ass", stem);
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}-{}.ass", stem, suffix);
                suffix += 1;
            }
            out_dir.join(name)
        })
        .collect()
}

/// Captions one input into `output`; any error becomes a `Failed` item
fn caption_one(step: &CaptionStep, style: &CaptionStyle, input: &Path, output: &Path) -> BatchItem {
    let result = (|| -> Result<BatchItem> {
        let transcript = load_transcript(input, None)?;
        Ok(match step.run(&transcript, style) {
            CaptionOutcome::Captioned {
                document,
                strategy,
                word_count,
                ..
            } => {
                let output = output.to_path_buf();
                fs::write(&output, document)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                BatchItem::Captioned {
                    input: input.to_path_buf(),
                    output,
                    strategy,
                    word_count,
                }
            }
            CaptionOutcome::Uncaptioned { warning } => BatchItem::Uncaptioned {
                input: input.to_path_buf(),
                warning,
            },
        })
    })();

    result.unwrap_or_else(|e| BatchItem::Failed {
        input: input.to_path_buf(),
        error: format!("{:#}", e),
    })
}

/// Captions every input on the blocking pool and collects results in input order
pub async fn caption_batch(
    inputs: Vec<PathBuf>,
    out_dir: PathBuf,
    step: CaptionStep,
    style: CaptionStyle,
) -> Vec<BatchItem> {
    let outputs = plan_outputs(&inputs, &out_dir);
    let shared = Arc::new((step, style));

    let handles: Vec<_> = inputs
        .into_iter()
        .zip(outputs)
        .map(|(input, output)| {
            let shared = Arc::clone(&shared);
            let task_input = input.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let (step, style) = &*shared;
                caption_one(step, style, &task_input, &output)
            });
            (input, handle)
        })
        .collect();

    let mut items = Vec::with_capacity(handles.len());
    for (input, handle) in handles {
        let item = match handle.await {
            Ok(item) => item,
            Err(e) => BatchItem::Failed {
                input,
                error: format!("Task join error: {}", e),
            },
        };
        items.push(item);
    }
    items
}

pub async fn run_batch(args: BatchArgs, settings: &CaptionSettings) -> Result<()> {
    let style = resolve_style(&args.style, settings)?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let step = CaptionStep::from_settings(settings);
    let items = caption_batch(args.inputs, args.out_dir, step, style).await;

    let mut failed = 0;
    for item in &items {
        match item {
            BatchItem::Captioned {
                input,
                output,
                strategy,
                word_count,
            } => info!(
                "{} -> {} ({} words, {})",
                input.display(),
                output.display(),
                word_count,
                strategy
            ),
            BatchItem::Uncaptioned { input, warning } => {
                warn!("{}: uncaptioned ({})", input.display(), warning)
            }
            BatchItem::Failed { input, error } => {
                failed += 1;
                error!("{}: {}", input.display(), error)
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&items)?);

    if failed > 0 {
        bail!("{} of {} inputs failed", failed, items.len());
    }
    Ok(())
}
