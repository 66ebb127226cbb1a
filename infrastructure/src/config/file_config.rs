//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! are deserialized directly. `FileConfig::behavior_config` maps the file
//! shape onto the application-level [`BehaviorConfig`].

use advisor_application::BehaviorConfig;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Orchestration behavior settings
    pub behavior: FileBehaviorConfig,
    /// Generative-language model settings
    pub model: FileModelConfig,
    /// Weather realtime feed settings
    pub weather: FileWeatherConfig,
}

impl FileConfig {
    pub fn behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig {
            session_timeout_hours: self.behavior.session_timeout_hours,
            realtime_fetch_timeout_secs: self.behavior.realtime_fetch_timeout_secs,
            enable_validation: self.behavior.enable_validation,
        }
    }
}

/// `[behavior]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    pub session_timeout_hours: i64,
    pub realtime_fetch_timeout_secs: u64,
    pub enable_validation: bool,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        let defaults = BehaviorConfig::default();
        Self {
            session_timeout_hours: defaults.session_timeout_hours,
            realtime_fetch_timeout_secs: defaults.realtime_fetch_timeout_secs,
            enable_validation: defaults.enable_validation,
        }
    }
}

/// `[model]` section
///
/// The API key may also come from the `GEMINI_API_KEY` environment variable;
/// the file value wins when both are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.3,
            max_output_tokens: 1200,
        }
    }
}

/// `[weather]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWeatherConfig {
    /// Optional realtime forecast endpoint; static guidance only when unset
    pub feed_url: Option<String>,
}
