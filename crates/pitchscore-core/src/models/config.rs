//! Configuration structures for the scoring pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the pitchscore pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Scoring strategy configuration.
    pub scoring: ScoringConfig,

    /// Remote model configuration.
    pub remote: RemoteConfig,

    /// Input limits.
    pub limits: LimitsConfig,
}

/// Which scorer the analyzer should try first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Keyword heuristic only.
    #[default]
    Heuristic,
    /// Remote language model, falling back to the heuristic.
    Remote,
}

impl ScoringMode {
    /// Parse a mode name. `openai` is accepted as an alias for `remote`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "local" => Some(ScoringMode::Heuristic),
            "remote" | "openai" | "llm" => Some(ScoringMode::Remote),
            _ => None,
        }
    }
}

/// Scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Scoring strategy.
    pub mode: ScoringMode,

    /// A pattern earns a frequency bonus when it matches more than this many times.
    pub bonus_threshold: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Heuristic,
            bonus_threshold: 2,
        }
    }
}

/// Remote chat-completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Bearer token for the endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Extracted text is cut to this many characters before sending.
    pub max_input_chars: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            timeout_secs: 60,
            max_input_chars: 60_000,
        }
    }
}

impl RemoteConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key, if present and non-blank.
    pub fn credentials(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Input limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted input file, in megabytes.
    pub max_file_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_file_mb: 16 }
    }
}

impl LimitsConfig {
    /// Largest accepted input file, in bytes.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_mb * 1024 * 1024
    }
}

impl PitchConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Overlay `AI_MODE`, `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`
    /// from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay settings from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(mode) = lookup("AI_MODE") {
            match ScoringMode::parse(&mode) {
                Some(mode) => self.scoring.mode = mode,
                None => tracing::warn!("Ignoring unknown AI_MODE value: {}", mode),
            }
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.remote.api_key = Some(key);
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            self.remote.model = model;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.remote.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Remote scoring is enabled only in remote mode with a usable API key.
    pub fn remote_enabled(&self) -> bool {
        self.scoring.mode == ScoringMode::Remote && self.remote.credentials().is_some()
    }
}
