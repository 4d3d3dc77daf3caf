//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/syntree/syntree.toml`
//! 3. Local config: `<dir>/.syntree.toml`
//! 4. Environment variables: `SYNTREE_*` prefix
//! 5. Per-call [`DrawOptions`] (CLI flags)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::LayoutConfig;
use crate::infrastructure::svg::SvgStyle;
use crate::infrastructure::traits::Easing;

/// Unified configuration for syntree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Horizontal gap between sibling subtrees (px)
    pub spacing: f64,
    /// Vertical distance between tree levels (px)
    pub vertical_gap: f64,
    /// Duration of each fade phase (ms)
    pub animation_duration: u64,
    /// Surface width (px)
    pub width: f64,
    /// Surface height (px)
    pub height: f64,
    /// Font family of labels
    pub font_family: String,
    /// Font size of labels (px)
    pub font_size: f64,
    /// Average glyph advance as a fraction of the font size
    pub char_width: f64,
    /// Easing of fade phases
    pub easing: Easing,
    /// Force-complete a stalled fade phase after this many ms.
    /// Unset means five times `animation_duration`; 0 disables the timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_timeout: Option<u64>,
    /// Default mount point id
    pub container: String,
    /// Embed the browser toggle script in HTML output
    pub interactive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spacing: 15.0,
            vertical_gap: 40.0,
            animation_duration: 300,
            width: 800.0,
            height: 300.0,
            font_family: "sans-serif".into(),
            font_size: 16.0,
            char_width: 0.6,
            easing: Easing::EaseOutQuad,
            transition_timeout: None,
            container: "tree".into(),
            interactive: true,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub spacing: Option<f64>,
    pub vertical_gap: Option<f64>,
    pub animation_duration: Option<u64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub char_width: Option<f64>,
    pub easing: Option<Easing>,
    pub transition_timeout: Option<u64>,
    pub container: Option<String>,
    pub interactive: Option<bool>,
}

/// Per-call overrides of the drawing geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawOptions {
    pub spacing: Option<f64>,
    pub vertical_gap: Option<f64>,
    pub animation_duration: Option<u64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Resize the surface to the laid-out tree instead of `width`/`height`
    pub fit: bool,
}

/// Get the XDG config directory for syntree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "syntree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("syntree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".syntree.toml")
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
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory searched for `.syntree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Load only a single TOML file on top of the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let settings = Self::default().merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    /// Merge overlay config onto self: overlay wins if Some, otherwise keep base.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            spacing: overlay.spacing.unwrap_or(self.spacing),
            vertical_gap: overlay.vertical_gap.unwrap_or(self.vertical_gap),
            animation_duration: overlay.animation_duration.unwrap_or(self.animation_duration),
            width: overlay.width.unwrap_or(self.width),
            height: overlay.height.unwrap_or(self.height),
            font_family: overlay
                .font_family
                .clone()
                .unwrap_or_else(|| self.font_family.clone()),
            font_size: overlay.font_size.unwrap_or(self.font_size),
            char_width: overlay.char_width.unwrap_or(self.char_width),
            easing: overlay.easing.unwrap_or(self.easing),
            transition_timeout: overlay.transition_timeout.or(self.transition_timeout),
            container: overlay
                .container
                .clone()
                .unwrap_or_else(|| self.container.clone()),
            interactive: overlay.interactive.unwrap_or(self.interactive),
        }
    }

    /// Apply per-call draw options.
    pub fn with_options(&self, options: &DrawOptions) -> Self {
        let mut settings = self.clone();
        if let Some(v) = options.spacing {
            settings.spacing = v;
        }
        if let Some(v) = options.vertical_gap {
            settings.vertical_gap = v;
        }
        if let Some(v) = options.animation_duration {
            settings.animation_duration = v;
        }
        if let Some(v) = options.width {
            settings.width = v;
        }
        if let Some(v) = options.height {
            settings.height = v;
        }
        settings
    }

    /// Apply SYNTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("SYNTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_float("spacing") {
            settings.spacing = val;
        }
        if let Ok(val) = config.get_float("vertical_gap") {
            settings.vertical_gap = val;
        }
        if let Ok(val) = config.get::<u64>("animation_duration") {
            settings.animation_duration = val;
        }
        if let Ok(val) = config.get_float("width") {
            settings.width = val;
        }
        if let Ok(val) = config.get_float("height") {
            settings.height = val;
        }
        if let Ok(val) = config.get_string("font_family") {
            settings.font_family = val;
        }
        if let Ok(val) = config.get_float("font_size") {
            settings.font_size = val;
        }
        if let Ok(val) = config.get_float("char_width") {
            settings.char_width = val;
        }
        if let Ok(val) = config.get_string("easing") {
            settings.easing = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get::<u64>("transition_timeout") {
            settings.transition_timeout = Some(val);
        }
        if let Ok(val) = config.get_string("container") {
            settings.container = val;
        }
        if let Ok(val) = config.get_bool("interactive") {
            settings.interactive = val;
        }

        Ok(settings)
    }

    /// Reject geometry that cannot produce a drawing.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let checks = [
            ("spacing", self.spacing, false),
            ("vertical_gap", self.vertical_gap, false),
            ("width", self.width, true),
            ("height", self.height, true),
            ("font_size", self.font_size, true),
            ("char_width", self.char_width, true),
        ];
        for (name, value, strictly_positive) in checks {
            let (valid, expected) = if strictly_positive {
                (value > 0.0, "positive")
            } else {
                (value >= 0.0, "non-negative")
            };
            if !valid || !value.is_finite() {
                return Err(ApplicationError::Config {
                    message: format!("{} must be {}, got {}", name, expected, value),
                });
            }
        }
        Ok(())
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            spacing: self.spacing,
            vertical_gap: self.vertical_gap,
        }
    }

    pub fn svg_style(&self) -> SvgStyle {
        SvgStyle {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            char_width: self.char_width,
        }
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration)
    }

    /// Effective stall timeout; None when disabled.
    pub fn transition_timeout(&self) -> Option<Duration> {
        match self.transition_timeout {
            None => Some(self.animation_duration() * 5),
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
        }
    }

    /// Serialize as TOML for display.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
