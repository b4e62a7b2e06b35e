//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME};
use crate::models::{Projection, RgbColor};

/// Export naming and destination settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Appended to the source stem (`roads.kml` -> `roads_newStyle.kml`)
    pub suffix: String,
    /// Stem used when the source file name is unknown
    pub fallback_stem: String,
    /// Directory for exported files; defaults to the source file's directory
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            suffix: "_newStyle".to_string(),
            fallback_stem: "exported".to_string(),
            output_dir: None,
        }
    }
}

/// Label rendering settings shared by every point style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Base font size in pixels, multiplied by the label scale
    pub label_font_size: f64,
    /// CSS font family
    pub label_font_family: String,
    /// Halo color as `#rrggbb`
    pub label_halo_color: String,
    /// Halo width in pixels
    pub label_halo_width: f64,
    /// Vertical label offset in pixels (negative is above the icon)
    pub label_offset_y: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            label_font_size: 12.0,
            label_font_family: "Arial".to_string(),
            label_halo_color: "#ffffff".to_string(),
            label_halo_width: 2.0,
            label_offset_y: -15.0,
        }
    }
}

/// Map view settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MapConfig {
    /// Projection features are read into
    pub projection: Projection,
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/KmlStyler/config.toml`
/// - macOS: `~/Library/Application Support/KmlStyler/config.toml`
/// - Windows: `%APPDATA%\KmlStyler\config.toml`
///
/// `KMLSTYLER_CONFIG_DIR` replaces the directory when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Export settings
    pub export: ExportConfig,
    /// Label rendering settings
    pub render: RenderConfig,
    /// Map settings
    pub map: MapConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit path (temp file + rename).
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - export suffix is non-empty and neither it nor the fallback stem contains path separators
    /// - fallback stem is not blank
    /// - halo color is a `#rrggbb` color
    /// - font size is positive and halo width is not negative
    pub fn validate(&self) -> Result<()> {
        let is_path_like = |value: &str| value.contains(['/', '\\']);

        if self.export.suffix.is_empty() || is_path_like(&self.export.suffix) {
            anyhow::bail!(
                "Export suffix must be non-empty without path separators: '{}'",
                self.export.suffix
            );
        }
        if self.export.fallback_stem.trim().is_empty() || is_path_like(&self.export.fallback_stem)
        {
            anyhow::bail!(
                "Export fallback stem must be a plain file name: '{}'",
                self.export.fallback_stem
            );
        }

        RgbColor::from_hex(&self.render.label_halo_color).context(format!(
            "Invalid label halo color: {}",
            self.render.label_halo_color
        ))?;

        if !(self.render.label_font_size.is_finite() && self.render.label_font_size > 0.0) {
            anyhow::bail!(
                "Label font size must be positive, got {}",
                self.render.label_font_size
            );
        }
        if !(self.render.label_halo_width.is_finite() && self.render.label_halo_width >= 0.0) {
            anyhow::bail!(
                "Label halo width must not be negative, got {}",
                self.render.label_halo_width
            );
        }
        if !self.render.label_offset_y.is_finite() {
            anyhow::bail!("Label offset must be a finite number");
        }

        Ok(())
    }
}
