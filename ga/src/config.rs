//! greenalt configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::conversation::ConversationConfig;
use crate::governor::GovernorConfig;
use crate::search::SearchConfig;

/// Main greenalt configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion service configuration
    pub llm: LlmConfig,

    /// Request pacing and retry policy
    pub governor: GovernorConfig,

    /// Product data service configuration
    pub search: SearchConfig,

    /// Conversation loop limits and prompts
    pub conversation: ConversationConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required environment variables are set and numeric
    /// settings are in range. Call this early in startup to fail fast with
    /// clear error messages.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key()?;
        self.search.get_api_key()?;

        if self.governor.max_attempts == 0 {
            return Err(eyre::eyre!("governor.max-attempts must be at least 1"));
        }
        if !(self.governor.backoff_factor > 1.0) {
            return Err(eyre::eyre!(
                "governor.backoff-factor must be greater than 1 (got {})",
                self.governor.backoff_factor
            ));
        }
        if !(self.conversation.price_ceiling_factor > 0.0) {
            return Err(eyre::eyre!(
                "conversation.price-ceiling-factor must be positive (got {})",
                self.conversation.price_ceiling_factor
            ));
        }
        if self.search.max_results == 0 {
            return Err(eyre::eyre!("search.max-results must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only `log-level`, before logging is set up
    ///
    /// Any failure yields `None`; the full load reports problems later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(path) => path.clone(),
            None => Self::default_paths().into_iter().find(|p| p.exists())?,
        };
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    /// Project-local `.greenalt.yml`, then the user config directory
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".greenalt.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("greenalt").join("greenalt.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("azure" or "openai")
    pub provider: String,

    /// Model identifier; the deployment name for Azure
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Azure API version query parameter
    #[serde(rename = "api-version")]
    pub api_version: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "azure".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "AZURE_OAI_KEY".to_string(),
            base_url: "https://greenalt.openai.azure.com".to_string(),
            api_version: "2024-06-01".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .map_err(|_| eyre::eyre!("LLM API key not found. Set the {} environment variable.", self.api_key_env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "azure");
        assert_eq!(config.governor.min_interval_ms, 2000);
        assert_eq!(config.governor.max_attempts, 5);
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.conversation.max_iterations, 3);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o-mini
  api-key-env: MY_OPENAI_KEY
  base-url: https://api.example.com
  timeout-ms: 60000

governor:
  min-interval-ms: 500
  max-attempts: 3
  backoff-base-ms: 1000
  backoff-factor: 2.0

search:
  country: GB
  max-results: 5

conversation:
  max-iterations: 4
  price-ceiling-factor: 2.0
  prompts-dir: /etc/greenalt/prompts

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "MY_OPENAI_KEY");
        assert_eq!(config.llm.timeout_ms, 60000);
        assert_eq!(config.governor.max_attempts, 3);
        assert_eq!(config.governor.backoff_factor, 2.0);
        assert_eq!(config.search.country, "GB");
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.sort_by, "RELEVANCE");
        assert_eq!(config.conversation.max_iterations, 4);
        assert_eq!(
            config.conversation.prompts_dir.as_deref(),
            Some(Path::new("/etc/greenalt/prompts"))
        );
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: my-deployment
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "my-deployment");
        assert_eq!(config.llm.provider, "azure");
        assert_eq!(config.llm.api_key_env, "AZURE_OAI_KEY");
        assert_eq!(config.governor.backoff_base_ms, 5000);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("greenalt.yml");
        fs::write(&path, "log-level: warn\nconversation:\n  max-iterations: 1\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.conversation.max_iterations, 1);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let path = PathBuf::from("/nonexistent/greenalt.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    #[serial]
    fn test_validate_checks_api_keys() {
        let mut config = Config::default();
        config.llm.api_key_env = "GREENALT_TEST_LLM_KEY".to_string();
        config.search.api_key_env = "GREENALT_TEST_SEARCH_KEY".to_string();

        // SAFETY: serialized with every other env-mutating test
        unsafe {
            std::env::remove_var("GREENALT_TEST_LLM_KEY");
            std::env::remove_var("GREENALT_TEST_SEARCH_KEY");
        }
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("GREENALT_TEST_LLM_KEY"));

        unsafe {
            std::env::set_var("GREENALT_TEST_LLM_KEY", "llm-key");
        }
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("GREENALT_TEST_SEARCH_KEY"));

        unsafe {
            std::env::set_var("GREENALT_TEST_SEARCH_KEY", "search-key");
        }
        assert!(config.validate().is_ok());

        unsafe {
            std::env::remove_var("GREENALT_TEST_LLM_KEY");
            std::env::remove_var("GREENALT_TEST_SEARCH_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_validate_checks_ranges() {
        let mut config = Config::default();
        config.llm.api_key_env = "GREENALT_TEST_RANGE_LLM_KEY".to_string();
        config.search.api_key_env = "GREENALT_TEST_RANGE_SEARCH_KEY".to_string();
        unsafe {
            std::env::set_var("GREENALT_TEST_RANGE_LLM_KEY", "x");
            std::env::set_var("GREENALT_TEST_RANGE_SEARCH_KEY", "y");
        }

        config.governor.backoff_factor = 1.0;
        assert!(config.validate().unwrap_err().to_string().contains("backoff-factor"));

        config.governor.backoff_factor = 1.7;
        config.governor.max_attempts = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max-attempts"));

        config.governor.max_attempts = 5;
        config.conversation.price_ceiling_factor = 0.0;
        assert!(config.validate().unwrap_err().to_string().contains("price-ceiling-factor"));

        config.conversation.price_ceiling_factor = 1.5;
        assert!(config.validate().is_ok());

        unsafe {
            std::env::remove_var("GREENALT_TEST_RANGE_LLM_KEY");
            std::env::remove_var("GREENALT_TEST_RANGE_SEARCH_KEY");
        }
    }
}
