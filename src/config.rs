//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/varitree/varitree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `VARITREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Move notation handling of the rules engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RulesConfig {
    /// Accept coordinate/long algebraic notation and annotation glyphs besides SAN
    pub sloppy: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self { sloppy: true }
    }
}

/// Tree rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Print the FEN next to every move
    pub show_fen: bool,
    /// Bracket the move under the cursor
    pub mark_cursor: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_fen: false,
            mark_cursor: true,
        }
    }
}

/// Raw settings for intermediate parsing (None → not specified, inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub start_fen: Option<String>,
    pub rules: RawRulesConfig,
    pub display: RawDisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRulesConfig {
    pub sloppy: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_fen: Option<bool>,
    pub mark_cursor: Option<bool>,
}

/// Unified configuration for varitree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Starting position for new sessions (default: standard initial position)
    pub start_fen: Option<String>,
    /// Rules engine settings
    pub rules: RulesConfig,
    /// Rendering settings
    pub display: DisplayConfig,
}

/// Get the XDG config directory for varitree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "varitree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("varitree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            start_fen: overlay
                .start_fen
                .clone()
                .or_else(|| self.start_fen.clone()),
            rules: RulesConfig {
                sloppy: overlay.rules.sloppy.unwrap_or(self.rules.sloppy),
            },
            display: DisplayConfig {
                show_fen: overlay.display.show_fen.unwrap_or(self.display.show_fen),
                mark_cursor: overlay
                    .display
                    .mark_cursor
                    .unwrap_or(self.display.mark_cursor),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply VARITREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("VARITREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("start_fen") {
            settings.start_fen = Some(val);
        }
        if let Ok(val) = config.get_bool("rules.sloppy") {
            settings.rules.sloppy = val;
        }
        if let Ok(val) = config.get_bool("display.show_fen") {
            settings.display.show_fen = val;
        }
        if let Ok(val) = config.get_bool("display.mark_cursor") {
            settings.display.mark_cursor = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# varitree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/varitree/varitree.toml
#   File:   varitree --config <file>
#   Env:    VARITREE_* environment variables, e.g. VARITREE_RULES__SLOPPY=false

# Starting position for new trees (default: standard initial position)
# start_fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"

[rules]
# Accept e2e4, Ng1-f3, Pe4, 0-0 and trailing !? besides plain SAN
# sloppy = true

[display]
# Print the FEN after every move in tree output
# show_fen = false

# Bracket the move under the cursor
# mark_cursor = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
