//! Configuration file support for the annotation editor.
//!
//! Editor tuning (debounce, hit tolerances, minimum shape sizes, default style)
//! and the log level are stored as versioned JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::model::ShapeStyle;

/// Verbosity handed to `env_logger` by the CLI. `RUST_LOG` still wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    /// Opened editors, saves and rendered files
    #[default]
    Info,
    /// Tool changes, history steps, save dispatch
    Debug,
    /// Debounce resets and skipped autosaves
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Format version written to new config files. Files with a higher version
/// are rejected.
pub const CONFIG_VERSION: u32 = 1;

/// Editor behaviour settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Whether background saves run at all
    #[serde(default = "default_true")]
    pub autosave_enabled: bool,

    /// Quiet period after the last change before autosaving (ms)
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,

    /// How long the "saved" indicator stays up (ms)
    #[serde(default = "default_saved_status_ms")]
    pub saved_status_ms: u64,

    /// Extra hit radius for mouse input (screen pixels)
    #[serde(default = "default_mouse_tolerance")]
    pub mouse_hit_tolerance: f32,

    /// Extra hit radius for touch input (screen pixels)
    #[serde(default = "default_touch_tolerance")]
    pub touch_hit_tolerance: f32,

    #[serde(default = "default_min_rect_size")]
    pub min_rect_size: f32,

    #[serde(default = "default_min_circle_radius")]
    pub min_circle_radius: f32,

    #[serde(default = "default_min_text_width")]
    pub min_text_width: f32,

    #[serde(default = "default_min_arrow_length")]
    pub min_arrow_length: f32,

    /// Maximum undo snapshots kept
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Font size for text annotations (screen pixels)
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Text given to newly drawn text annotations
    #[serde(default = "default_text")]
    pub default_text: String,

    /// Style applied to new annotations
    #[serde(default)]
    pub default_style: ShapeStyle,
}

fn default_true() -> bool {
    true
}

fn default_autosave_debounce_ms() -> u64 {
    constants::AUTOSAVE_DEBOUNCE.as_millis() as u64
}

fn default_saved_status_ms() -> u64 {
    constants::SAVED_STATUS_DISPLAY.as_millis() as u64
}

fn default_mouse_tolerance() -> f32 {
    constants::MOUSE_HIT_TOLERANCE
}

fn default_touch_tolerance() -> f32 {
    constants::TOUCH_HIT_TOLERANCE
}

fn default_min_rect_size() -> f32 {
    constants::MIN_RECT_SIZE
}

fn default_min_circle_radius() -> f32 {
    constants::MIN_CIRCLE_RADIUS
}

fn default_min_text_width() -> f32 {
    constants::MIN_TEXT_WIDTH
}

fn default_min_arrow_length() -> f32 {
    constants::MIN_ARROW_LENGTH
}

fn default_history_limit() -> usize {
    constants::HISTORY_LIMIT
}

fn default_font_size() -> f32 {
    constants::TEXT_FONT_SIZE
}

fn default_text() -> String {
    constants::DEFAULT_TEXT.to_string()
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_debounce_ms: default_autosave_debounce_ms(),
            saved_status_ms: default_saved_status_ms(),
            mouse_hit_tolerance: default_mouse_tolerance(),
            touch_hit_tolerance: default_touch_tolerance(),
            min_rect_size: default_min_rect_size(),
            min_circle_radius: default_min_circle_radius(),
            min_text_width: default_min_text_width(),
            min_arrow_length: default_min_arrow_length(),
            history_limit: default_history_limit(),
            font_size: default_font_size(),
            default_text: default_text(),
            default_style: ShapeStyle::default(),
        }
    }
}

impl EditorSettings {
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn saved_status_display(&self) -> Duration {
        Duration::from_millis(self.saved_status_ms)
    }
}

/// Contents of `filla-annotate.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub version: u32,

    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub editor: EditorSettings,
}

impl EditorConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            editor: EditorSettings::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a config file, refusing versions this build does not know.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    pub fn default_filename() -> &'static str {
        "filla-annotate.json"
    }

    /// `<config dir>/filla/filla-annotate.json`, or `~/.config/filla/...`
    /// when the platform has no config dir.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
        Some(base.join("filla").join(Self::default_filename()))
    }

    /// Load the user's config. None means "use defaults"; the reason is logged.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No editor config at {:?}, using defaults", path);
            return None;
        }
        let loaded = std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|json| Self::from_json(&json));
        match loaded {
            Ok(config) => {
                log::info!("Loaded editor config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("⚠️ Ignoring editor config {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the given path, creating parent directories.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("editor config version {file_version} is newer than {supported_version}")]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("editor config I/O: {0}")]
    Io(#[from] std::io::Error),
}
