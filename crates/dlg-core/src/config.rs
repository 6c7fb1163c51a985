//! Editor configuration read when a document is opened.

use crate::error::{ConfigError, ConfigLoadError};
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Settings that govern how graph edits are written back to a document.
///
/// Field names follow the host's settings keys, so a settings object can be
/// deserialized directly; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// How long a minor edit waits for follow-up edits before being written.
    /// `0` writes every edit immediately. Default: **5000**.
    #[serde(rename = "editDelay")]
    pub edit_delay_ms: u64,

    /// Indentation width of the emitted JSON. Default: **4**.
    #[serde(rename = "tabSize")]
    pub tab_size: usize,

    /// `format_version` stamped into emitted files. Default: **"1.14.0"**.
    #[serde(rename = "fileFormatVersion")]
    pub format_version: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            edit_delay_ms: 5000,
            tab_size: 4,
            format_version: "1.14.0".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse settings JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigLoadError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::ZeroTabSize);
        }
        if self.format_version.trim().is_empty() {
            return Err(ConfigError::EmptyFormatVersion);
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
