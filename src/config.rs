//! Configuration for termlife.
//!
//! Everything has a default, and the program runs without any configuration
//! file at all. If `~/.termlife/config.toml` exists it is read on startup:
//!
//! ```toml
//! # Milliseconds between generations while running
//! tick_ms = 100
//!
//! # Longest the loop waits for input before checking the timer again
//! idle_ms = 10
//!
//! # Log filter for ~/.termlife/termlife.log
//! log_level = "info"
//!
//! [style]
//! fg = { r = 135, g = 175, b = 135 }
//! bg = { r = 0, g = 0, b = 0 }
//!
//! [keys]
//! toggle = "enter"
//! quit = "esc"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::CellStyle;

/// Name of the per-user directory holding config and log
pub const APP_DIR: &str = ".termlife";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Milliseconds between generations
    pub tick_ms: u64,
    /// Upper bound on a single wait for input
    pub idle_ms: u64,
    /// tracing filter directive
    pub log_level: String,
    pub style: StyleConfig,
    pub keys: KeyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            idle_ms: 10,
            log_level: "info".to_string(),
            style: StyleConfig::default(),
            keys: KeyConfig::default(),
        }
    }
}

/// Display colors (one pair for the whole board)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub fg: Color,
    pub bg: Color,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            // xterm-256 color 108
            fg: Color::new(135, 175, 135),
            bg: Color::new(0, 0, 0),
        }
    }
}

/// Key bindings, by name (see `keymapper::parse_key`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub toggle: String,
    pub quit: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            toggle: "enter".to_string(),
            quit: "esc".to_string(),
        }
    }
}

impl Config {
    /// Load `~/.termlife/config.toml`, or defaults when it does not exist
    pub fn load() -> Result<Self, ConfigError> {
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML text; missing fields take their defaults
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn get_config_path() -> Option<PathBuf> {
        app_dir().map(|dir| dir.join("config.toml"))
    }

    /// Generation period, never zero
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Idle wait bound, never zero
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_ms.max(1))
    }

    pub fn cell_style(&self) -> CellStyle {
        CellStyle {
            fg: self.style.fg.to_crossterm(),
            bg: self.style.bg.to_crossterm(),
        }
    }
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// `~/.termlife`, if a home directory can be found
pub fn app_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(APP_DIR))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
