//! Caption Settings Persistence
//!
//! Provides persistent caption settings with:
//! - Atomic file writes (temp file + rename)
//! - Advisory locking against concurrent writers
//! - Tolerant loading (missing or corrupt file falls back to defaults)
//!
//! Storage location: {config_dir}/captions.json

use std::collections::BTreeMap;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::captions::models::CaptionStyle;
use crate::core::captions::presets::{PresetCatalog, DEFAULT_PRESET_ID};
use crate::core::captions::timing::DEFAULT_SPEAKING_RATE_WPM;
use crate::core::{CanvasSize, CaptionError, CaptionResult};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "captions.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "captions.json.lock";

/// Accepted speaking rate range in words per minute
const MIN_SPEAKING_RATE_WPM: f64 = 60.0;
const MAX_SPEAKING_RATE_WPM: f64 = 400.0;

// =============================================================================
// Settings
// =============================================================================

/// Caption settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionSettings {
    /// Schema version for migrations
    pub version: u32,

    /// Preset used when a job names none
    pub default_preset: String,

    /// Speaking rate for the even-split fallback
    pub speaking_rate_wpm: f64,

    /// Render canvas (PlayResX / PlayResY)
    pub canvas: CanvasSize,

    /// User presets layered over the built-ins
    pub custom_presets: BTreeMap<String, CaptionStyle>,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            default_preset: DEFAULT_PRESET_ID.to_string(),
            speaking_rate_wpm: DEFAULT_SPEAKING_RATE_WPM,
            canvas: CanvasSize::default(),
            custom_presets: BTreeMap::new(),
        }
    }
}

impl CaptionSettings {
    /// Normalizes and clamps values to keep settings within safe bounds
    pub fn normalize(&mut self) {
        if self.speaking_rate_wpm.is_finite() {
            self.speaking_rate_wpm = self
                .speaking_rate_wpm
                .clamp(MIN_SPEAKING_RATE_WPM, MAX_SPEAKING_RATE_WPM);
        } else {
            self.speaking_rate_wpm = DEFAULT_SPEAKING_RATE_WPM;
        }

        self.canvas = CanvasSize::new(self.canvas.width, self.canvas.height);

        for style in self.custom_presets.values_mut() {
            style.normalize();
        }

        let preset = self.default_preset.trim().to_lowercase();
        self.default_preset = if preset.is_empty() {
            DEFAULT_PRESET_ID.to_string()
        } else {
            preset
        };

        if !self.catalog().contains(&self.default_preset) {
            warn!(
                "Default preset '{}' does not exist, using '{}'",
                self.default_preset, DEFAULT_PRESET_ID
            );
            self.default_preset = DEFAULT_PRESET_ID.to_string();
        }
    }

    /// Built-in presets overlaid with this file's custom presets
    pub fn catalog(&self) -> PresetCatalog {
        PresetCatalog::with_custom(&self.custom_presets)
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Loads and stores [`CaptionSettings`] under a config directory
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager with the given config directory
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            settings_path: config_dir.join(SETTINGS_FILE),
        }
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    fn with_lock<T>(
        &self,
        exclusive: bool,
        op: impl FnOnce() -> CaptionResult<T>,
    ) -> CaptionResult<T> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)?;
        } else {
            fs2::FileExt::lock_shared(&lock_file)?;
        }

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("Failed to unlock settings lock file: {}", e);
        }

        result
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or unreadable
    pub fn load(&self) -> CaptionSettings {
        let result = self.with_lock(false, || {
            if !self.settings_path.exists() {
                info!("Settings file not found, using defaults");
                return Ok(CaptionSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings = serde_json::from_str::<CaptionSettings>(&content)?;

            if settings.version < SETTINGS_VERSION {
                info!(
                    "Migrating settings from version {} to {}",
                    settings.version, SETTINGS_VERSION
                );
                settings.version = SETTINGS_VERSION;
            }

            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                CaptionSettings::default()
            }
        }
    }

    /// Save settings to disk using atomic write (temp file + rename)
    pub fn save(&self, settings: &CaptionSettings) -> CaptionResult<CaptionSettings> {
        self.with_lock(true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            let content = serde_json::to_string_pretty(&normalized)?;

            let temp_path = self.settings_path.with_extension("json.tmp");
            if temp_path.exists() {
                let _ = fs::remove_file(&temp_path);
            }

            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;

            // std::fs::rename does not overwrite on Windows
            if cfg!(windows) && self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
            }
            fs::rename(&temp_path, &self.settings_path).map_err(|e| {
                CaptionError::Internal(format!("Failed to finalize settings file: {}", e))
            })?;

            info!("Settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CaptionResult<CaptionSettings> {
        self.with_lock(true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
                info!("Settings file deleted");
            }
            Ok(CaptionSettings::default())
        })
    }
}
