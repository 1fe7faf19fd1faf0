//! Configuration file loading and parsing.

use crate::env::Environment;
use crate::types::MedboardConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory, relative to the project root, holding `config.yaml`.
pub const CONFIG_DIR: &str = ".medboard";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("invalid substitution pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the config file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join("config.yaml")
    }

    /// Load configuration from `.medboard/config.yaml`, or defaults when the
    /// file does not exist.
    pub fn load(&self) -> Result<MedboardConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(MedboardConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let expanded = self.expand_env_vars(&contents)?;

        let config: MedboardConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Load the file, then apply `MEDBOARD_*` environment overrides.
    pub fn load_with_env(&self) -> Result<MedboardConfig, ConfigError> {
        let mut config = self.load()?;
        Environment::apply_overrides(&mut config);
        self.validate(&config)?;
        tracing::info!(mode = ?config.backend.mode(), "configuration loaded");
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")?;

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match (std::env::var(var_name), default) {
                (Ok(v), _) => v,
                (Err(_), Some(d)) => d.to_string(),
                (Err(_), None) => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &MedboardConfig) -> Result<(), ConfigError> {
        let url = config.backend.url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("backend.url must be an http(s) URL, got '{}'", url),
            });
        }

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &MedboardConfig) -> Result<(), ConfigError> {
        std::fs::create_dir_all(self.base_path.join(CONFIG_DIR))?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        match std::env::var(crate::env::vars::MEDBOARD_CONFIG_DIR) {
            Ok(dir) => Self::new(dir),
            Err(_) => Self::new(std::env::current_dir().unwrap_or_default()),
        }
    }
}
