// Layered configuration: embedded defaults, then an optional local file, then environment
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File, FileFormat};

use crate::models::CUSTOM_ENTRY_LABEL;

/// Built-in defaults, shipped inside the binary so the tool runs from any directory
const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Configuration for talking to the model hub
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    /// Base URL of the hub
    pub endpoint: String,
    /// Git revision tokenizer files are fetched from
    pub revision: String,
    /// Name of the environment variable holding the access token
    pub token_env: String,
    /// Overrides the standard Hugging Face cache location
    pub cache_dir: Option<PathBuf>,
}

/// Candidate models offered in the selection menu
#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    pub candidates: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenizeConfig {
    /// Whether encoding adds the model's special tokens (BOS, CLS, ...)
    pub add_special_tokens: bool,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Directory for rolling log files; logs go to stderr when unset
    pub directory: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub hub: HubConfig,
    pub models: ModelsConfig,
    pub tokenize: TokenizeConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Loads settings relative to the current directory.
    ///
    /// Sources, in order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with `HFTOK__` (e.g. `HFTOK__HUB__ENDPOINT`)
    /// 2. `config/local.toml`, if present
    /// 3. The embedded defaults
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        Self::load(&config_dir)
    }

    /// Loads settings using `config_dir/local.toml` as the local override file
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let local_config = config_dir.join("local.toml");
        let local_config_path = local_config.to_string_lossy();

        let settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(
                Environment::with_prefix("HFTOK")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("models.candidates"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hub.endpoint.starts_with("http://") || self.hub.endpoint.starts_with("https://")) {
            return Err(ConfigError::Message(
                format!("hub.endpoint must be an http(s) URL, got: {}", self.hub.endpoint)
            ));
        }

        if self.hub.revision.trim().is_empty() {
            return Err(ConfigError::Message("hub.revision must not be empty".to_string()));
        }

        if self.hub.token_env.trim().is_empty() {
            return Err(ConfigError::Message("hub.token_env must not be empty".to_string()));
        }

        if self.models.candidates.is_empty() {
            return Err(ConfigError::Message(
                "models.candidates must list at least one model".to_string()
            ));
        }

        if let Some(bad) = self.models.candidates.iter()
            .find(|name| name.trim().is_empty() || name.as_str() == CUSTOM_ENTRY_LABEL)
        {
            return Err(ConfigError::Message(
                format!("Invalid entry in models.candidates: '{}'", bad)
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create the log directory up front so the appender can open its file
        if let Some(dir) = &self.logging.directory {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        dir.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}
