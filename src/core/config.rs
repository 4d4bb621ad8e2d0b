//! Configuration management for Scribe
//!
//! Supports environment variables, config files, and runtime overrides.
//! Agents are declared in the same TOML file as the runtime settings.
//!
//! Lookup order: explicit path, ./agents.toml, ~/.config/scribe/agents.toml,
//! then the bundled defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::agent::AgentDefinition;
use crate::core::error::{Result, ScribeError};
use crate::llm::RetryPolicy;

/// Agent file bundled with the binary
const BUNDLED_AGENTS: &str = include_str!("../../agents.toml");

/// Main configuration for Scribe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the root agent
    pub main: String,
    /// Reasoning backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Turn loop configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Background transcription configuration
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    /// Filler-word cleaner configuration
    #[serde(default)]
    pub cleaner: CleanerConfig,
    /// Agent definitions
    #[serde(default)]
    pub agents: Vec<AgentDefinition>,
}

/// Reasoning backend (OpenAI Responses API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API base URL, without the trailing `/responses`
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// First retry delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Retry delay ceiling in milliseconds
    pub max_backoff_ms: u64,
}

/// Turn loop behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum backend requests per agent run
    /// Default: 32
    pub max_turns: usize,
    /// Whether to log full requests and tool payloads
    pub debug: bool,
}

/// External transcription command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Program to run
    pub command: String,
    /// Arguments; `{input}` is replaced with the audio path
    pub args: Vec<String>,
    /// Accepted audio file extensions (lowercase, no dot)
    pub allowed_extensions: Vec<String>,
}

/// Transcript cleaner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Model used for cleaning
    pub model: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: 32,
            debug: false,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            command: "transcribe".to_string(),
            args: vec!["{input}".to_string()],
            allowed_extensions: ["mp3", "wav", "m4a", "flac"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-5-mini".to_string(),
        }
    }
}

impl BackendConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy for backend requests
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            ..RetryPolicy::default()
        }
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        env::var(&self.api_key_env)
            .map_err(|_| ScribeError::config(format!("{} is not set", self.api_key_env)))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scribe")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("agents.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: explicit path > ./agents.toml > config dir > bundled defaults,
    /// then env vars on top
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let local = PathBuf::from("agents.toml");
                if local.exists() {
                    Self::load_from_file(&local)?
                } else if Self::config_file().exists() {
                    Self::load_from_file(&Self::config_file())?
                } else {
                    Self::bundled()?
                }
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from one file only
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScribeError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ScribeError::config(format!("Failed to parse config: {}", e)))
    }

    /// Configuration shipped with the binary
    pub fn bundled() -> Result<Self> {
        Self::from_toml(BUNDLED_AGENTS)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("SCRIBE_BACKEND_URL") {
            self.backend.base_url = url;
        }

        if let Some(turns) = env::var("SCRIBE_MAX_TURNS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.engine.max_turns = turns;
        }

        if env::var("SCRIBE_DEBUG")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
        {
            self.engine.debug = true;
        }

        if let Ok(model) = env::var("CLEANER_MODEL") {
            self.cleaner.model = model;
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.backend.base_url).map_err(|e| {
            ScribeError::config(format!(
                "Invalid backend url '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        self.backend.retry_policy().validate()?;

        if self.engine.max_turns == 0 {
            return Err(ScribeError::config("engine.max_turns must be at least 1"));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if !seen.insert(agent.name.as_str()) {
                return Err(ScribeError::config(format!(
                    "Agent '{}' is defined more than once",
                    agent.name
                )));
            }
        }

        if self.agent(&self.main).is_none() {
            return Err(ScribeError::config(format!(
                "Root agent '{}' is not defined",
                self.main
            )));
        }

        Ok(())
    }

    /// Look up an agent definition by name
    pub fn agent(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Set the root agent
    pub fn set_main(&mut self, name: impl Into<String>) {
        self.main = name.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
main = "solo"

[[agents]]
name = "solo"
prompt = "You are alone."
"#;

    #[test]
    fn test_bundled_config_is_valid() {
        let config = Config::bundled().unwrap();
        config.validate().unwrap();
        assert!(config.agent(&config.main).is_some());
        assert!(config.agents.len() > 1);
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.engine.max_turns, 32);
        assert_eq!(config.backend.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.backend.max_attempts, 3);
        assert_eq!(config.transcription.args, vec!["{input}".to_string()]);
        assert!(config.agents[0].tool_names.is_empty());
    }

    #[test]
    fn test_missing_root_agent() {
        let mut config = Config::from_toml(MINIMAL).unwrap();
        config.set_main("ghost");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_duplicate_agents_rejected() {
        let text = format!("{MINIMAL}\n[[agents]]\nname = \"solo\"\nprompt = \"again\"\n");
        let config = Config::from_toml(&text).unwrap();
        assert!(matches!(config.validate(), Err(ScribeError::Config(_))));
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut config = Config::from_toml(MINIMAL).unwrap();
        config.backend.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.toml");
        fs::write(&path, MINIMAL).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.main, "solo");
    }

    #[test]
    fn test_retry_policy_from_backend() {
        let backend = BackendConfig {
            max_attempts: 4,
            initial_backoff_ms: 10,
            ..BackendConfig::default()
        };
        let policy = backend.retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.initial_backoff, Duration::from_millis(10));
    }

    #[test]
    fn test_zero_backend_attempts_rejected() {
        let mut config = Config::bundled().unwrap();
        config.backend.max_attempts = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"), "{}", err);
    }
}
