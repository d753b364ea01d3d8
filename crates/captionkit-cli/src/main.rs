//! Captionkit CLI
//!
//! Resolves word timings from transcripts and compiles karaoke-style ASS
//! subtitles, one file or a whole batch at a time.

mod cli;
mod commands;
mod input;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use captionkit_lib::core::settings::{CaptionSettings, SettingsManager};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_dir.as_deref());

    // Loading takes a lock file, so never create the config dir just to read defaults
    let settings = if cli.config_dir.is_dir() {
        let manager = SettingsManager::new(cli.config_dir.clone());
        debug!("Using settings from {}", manager.settings_path().display());
        manager.load()
    } else {
        debug!("No config dir at {}, using defaults", cli.config_dir.display());
        CaptionSettings::default()
    };

    match cli.command {
        Commands::Resolve(args) => commands::run_resolve(&args, &settings),
        Commands::Compile(args) => commands::run_compile(&args, &settings),
        Commands::Presets(args) => commands::run_presets(&args, &settings),
        Commands::Batch(args) => commands::run_batch(args, &settings).await,
    }
}
