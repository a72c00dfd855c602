//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mailcanvas/mailcanvas.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `MAILCANVAS_*` prefix, `__` between nested keys

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::RenderOptions;
use crate::application::{ApplicationError, DEFAULT_HISTORY_CAPACITY};

/// Unified configuration for mailcanvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `<id>.json` templates
    pub templates_dir: PathBuf,
    /// Undo/redo snapshots kept per editing session (minimum 1)
    pub history_capacity: usize,
    /// HTML export settings
    pub render: RenderOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            render: RenderOptions::default(),
        }
    }
}

/// Raw render settings: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderOptions {
    pub title: Option<String>,
    pub content_width: Option<u32>,
    pub background_color: Option<String>,
    pub content_background: Option<String>,
    pub font_family: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub templates_dir: Option<PathBuf>,
    pub history_capacity: Option<usize>,
    pub render: RawRenderOptions,
}

impl RenderOptions {
    fn merge(&self, overlay: &RawRenderOptions) -> Self {
        Self {
            title: overlay.title.clone().unwrap_or_else(|| self.title.clone()),
            content_width: overlay.content_width.unwrap_or(self.content_width),
            background_color: overlay
                .background_color
                .clone()
                .unwrap_or_else(|| self.background_color.clone()),
            content_background: overlay
                .content_background
                .clone()
                .unwrap_or_else(|| self.content_background.clone()),
            font_family: overlay
                .font_family
                .clone()
                .unwrap_or_else(|| self.font_family.clone()),
        }
    }
}

/// Default template directory: platform data dir + `templates`.
fn default_templates_dir() -> PathBuf {
    ProjectDirs::from("", "", "mailcanvas")
        .map(|dirs| dirs.data_dir().join("templates"))
        .unwrap_or_else(|| PathBuf::from("~/.mailcanvas/templates"))
}

/// Get the XDG config directory for mailcanvas.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mailcanvas").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mailcanvas.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
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

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Merge overlay config onto self (base). Overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            templates_dir: overlay
                .templates_dir
                .clone()
                .unwrap_or_else(|| self.templates_dir.clone()),
            history_capacity: overlay.history_capacity.unwrap_or(self.history_capacity),
            render: self.render.merge(&overlay.render),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.templates_dir.to_string_lossy().as_ref());
        self.templates_dir = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            debug!("loading config {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.history_capacity = current.history_capacity.max(1);
        Ok(current)
    }

    /// Apply MAILCANVAS_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MAILCANVAS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("templates_dir") {
            settings.templates_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<usize>("history_capacity") {
            settings.history_capacity = val;
        }
        if let Ok(val) = config.get_string("render.title") {
            settings.render.title = val;
        }
        if let Ok(val) = config.get::<u32>("render.content_width") {
            settings.render.content_width = val;
        }
        if let Ok(val) = config.get_string("render.background_color") {
            settings.render.background_color = val;
        }
        if let Ok(val) = config.get_string("render.content_background") {
            settings.render.content_background = val;
        }
        if let Ok(val) = config.get_string("render.font_family") {
            settings.render.font_family = val;
        }

        Ok(settings)
    }

    /// Effective settings as TOML, for display.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
