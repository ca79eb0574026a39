//! Configuration system for the Javaows shell
//!
//! Loads configuration from TOML file at `~/.config/javaows/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub desktop: DesktopConfig,
    pub windows: WindowsConfig,
    pub layout: LayoutConfig,
    pub taskbar: TaskbarConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            // Auto-generate default config file
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config = Self::parse(&content)?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parse configuration text. Missing sections and keys fall back to defaults.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("javaows");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Virtual desktop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Desktop area width in pixels (the space Tile divides)
    pub width: u32,
    /// Desktop area height in pixels
    pub height: u32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

/// Initial placement of newly launched windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsConfig {
    /// Width of a freshly launched window
    pub default_width: u32,
    /// Height of a freshly launched window
    pub default_height: u32,
    /// Diagonal offset between consecutive launches
    pub launch_offset_step: i32,
    /// Number of offset slots before the diagonal wraps back to the origin
    pub launch_offset_slots: u64,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            launch_offset_step: 30,
            launch_offset_slots: 10,
        }
    }
}

/// Cascade layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Diagonal step between cascaded windows
    pub cascade_step: i32,
    /// Width every cascaded window is resized to
    pub cascade_width: u32,
    /// Height every cascaded window is resized to
    pub cascade_height: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cascade_step: 25,
            cascade_width: 600,
            cascade_height: 400,
        }
    }
}

/// Taskbar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskbarConfig {
    /// Button width in pixels
    pub button_width: u32,
    /// Button height in pixels
    pub button_height: u32,
    /// strftime-style format of the taskbar clock
    pub clock_format: String,
}

impl Default for TaskbarConfig {
    fn default() -> Self {
        Self {
            button_width: 150,
            button_height: 32,
            clock_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}
