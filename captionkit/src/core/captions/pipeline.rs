//! Caption Step
//!
//! Resolve-then-compile as one job step. A transcript that yields no words
//! downgrades the job to "uncaptioned" with a warning instead of failing it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ass::CaptionCompiler;
use super::models::CaptionStyle;
use super::resolver::{TimingStrategy, TranscriptInput, WordTimingResolver};
use crate::core::settings::CaptionSettings;

/// Result of running the caption step on one job
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CaptionOutcome {
    /// A subtitle document was produced
    #[serde(rename_all = "camelCase")]
    Captioned {
        document: String,
        strategy: TimingStrategy,
        word_count: usize,
        skipped: usize,
    },
    /// The job continues without captions
    Uncaptioned { warning: String },
}

impl CaptionOutcome {
    pub fn is_captioned(&self) -> bool {
        matches!(self, CaptionOutcome::Captioned { .. })
    }

    /// The compiled document, if any
    pub fn document(&self) -> Option<&str> {
        match self {
            CaptionOutcome::Captioned { document, .. } => Some(document),
            CaptionOutcome::Uncaptioned { .. } => None,
        }
    }
}

/// Word-timing resolver and caption compiler wired together
#[derive(Clone, Debug, Default)]
pub struct CaptionStep {
    resolver: WordTimingResolver,
    compiler: CaptionCompiler,
}

impl CaptionStep {
    pub fn new(resolver: WordTimingResolver, compiler: CaptionCompiler) -> Self {
        Self { resolver, compiler }
    }

    /// Builds the step from persisted settings (speaking rate and canvas)
    pub fn from_settings(settings: &CaptionSettings) -> Self {
        Self {
            resolver: WordTimingResolver::new().with_speaking_rate(settings.speaking_rate_wpm),
            compiler: CaptionCompiler::new(settings.canvas),
        }
    }

    pub fn resolver(&self) -> &WordTimingResolver {
        &self.resolver
    }

    pub fn compiler(&self) -> &CaptionCompiler {
        &self.compiler
    }

    /// Resolves and compiles. Never fails: every error becomes a warning.
    pub fn run(&self, input: &TranscriptInput, style: &CaptionStyle) -> CaptionOutcome {
        let resolution = match self.resolver.resolve(input) {
            Ok(resolution) => resolution,
            Err(e) => {
                if e.is_degradable() {
                    warn!("No transcript available, continuing without captions");
                } else {
                    warn!("Caption timing failed, continuing without captions: {}", e);
                }
                return CaptionOutcome::Uncaptioned {
                    warning: e.to_string(),
                };
            }
        };

        let document = self.compiler.compile(&resolution.words, style);
        if document.is_empty() {
            warn!("Caption document is empty, continuing without captions");
            return CaptionOutcome::Uncaptioned {
                warning: "caption document is empty".to_string(),
            };
        }

        info!(
            "Captioned {} words via {} ({} skipped)",
            resolution.words.len(),
            resolution.strategy,
            resolution.skipped
        );

        CaptionOutcome::Captioned {
            document,
            strategy: resolution.strategy,
            word_count: resolution.words.len(),
            skipped: resolution.skipped,
        }
    }
}
