//! Shell configuration.
//!
//! Settings are plain serde structs. Every field has a default, so an empty
//! file is valid:
//!
//! ```toml
//! key_convention = "auto"     # auto | command | control
//! enforce_context = false
//!
//! [diagnostics]
//! capture = true
//! capacity = 256
//! ```
//!
//! Files are read as TOML or JSON according to their extension.

use std::fs;
use std::path::{Path, PathBuf};

use clinic_shell_core::diagnostics::DEFAULT_MEMORY_CAPACITY;
use serde::{Deserialize, Serialize};

use crate::shortcut::KeyConvention;

/// Result type alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors that can occur while loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File I/O error.
    #[error("failed to access settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML.
    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// Settings could not be written as TOML.
    #[error("failed to serialize settings as TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Malformed JSON.
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is neither `.toml` nor `.json`.
    #[error("unknown settings format for '{path}' (expected .toml or .json)")]
    UnknownFormat { path: PathBuf },
}

impl SettingsError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// On-disk format of a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
}

impl SettingsFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// How the primary shortcut modifier is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConventionSetting {
    /// Follow the platform the binary was built for.
    #[default]
    Auto,
    /// Command is primary.
    Command,
    /// Control is primary.
    Control,
}

impl ConventionSetting {
    /// The convention to use.
    pub fn resolve(self) -> KeyConvention {
        match self {
            Self::Auto => KeyConvention::current(),
            Self::Command => KeyConvention::Command,
            Self::Control => KeyConvention::Control,
        }
    }
}

/// Developer-facing failure capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Keep caught failures in memory in addition to logging them.
    pub capture: bool,
    /// Maximum number of failures kept in memory.
    pub capacity: usize,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            capture: true,
            capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Primary modifier convention.
    pub key_convention: ConventionSetting,
    /// Only fire bindings whose context is global or currently active.
    pub enforce_context: bool,
    /// Failure capture.
    pub diagnostics: DiagnosticsSettings,
}

impl ShellSettings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parse settings from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load settings from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SettingsFormat::from_path(path).ok_or_else(|| SettingsError::UnknownFormat {
            path: path.to_path_buf(),
        })?;
        let content = fs::read_to_string(path).map_err(|e| SettingsError::io(path, e))?;
        let settings = match format {
            SettingsFormat::Toml => Self::from_toml_str(&content)?,
            SettingsFormat::Json => Self::from_json_str(&content)?,
        };
        tracing::debug!(
            target: "clinic_shell::settings",
            path = %path.display(),
            ?settings,
            "loaded shell settings"
        );
        Ok(settings)
    }

    /// Load settings from `path`, falling back to defaults if it is missing.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(
                target: "clinic_shell::settings",
                path = %path.display(),
                "settings file not found, using defaults"
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to a `.toml` or `.json` file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = match SettingsFormat::from_path(path) {
            Some(SettingsFormat::Toml) => self.to_toml_string()?,
            Some(SettingsFormat::Json) => self.to_json_string()?,
            None => {
                return Err(SettingsError::UnknownFormat {
                    path: path.to_path_buf(),
                });
            }
        };
        fs::write(path, content).map_err(|e| SettingsError::io(path, e))
    }

    /// The key convention these settings select.
    pub fn convention(&self) -> KeyConvention {
        self.key_convention.resolve()
    }
}
