//! Environment variable handling.

use crate::types::MedboardConfig;
use std::env;
use std::path::Path;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Backend
    pub const MEDBOARD_BACKEND_URL: &str = "MEDBOARD_BACKEND_URL";
    pub const MEDBOARD_BACKEND_ANON_KEY: &str = "MEDBOARD_BACKEND_ANON_KEY";
    pub const MEDBOARD_FORCE_MOCK: &str = "MEDBOARD_FORCE_MOCK";

    // Seeding
    pub const MEDBOARD_SEED_ON_EMPTY: &str = "MEDBOARD_SEED_ON_EMPTY";

    // Configuration
    pub const MEDBOARD_CONFIG_DIR: &str = "MEDBOARD_CONFIG_DIR";
    pub const MEDBOARD_ENV: &str = "MEDBOARD_ENV";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    ///
    /// Loads `.env`, then `.env.local`, then `.env.{MEDBOARD_ENV}`. Variables
    /// already present in the process environment are never overwritten.
    pub fn init() -> Result<Self, EnvError> {
        Self::init_in(".")
    }

    /// Same as [`Environment::init`], reading the files from `dir`.
    pub fn init_in(dir: impl AsRef<Path>) -> Result<Self, EnvError> {
        let dir = dir.as_ref();
        for file in [".env", ".env.local"] {
            Self::load_optional(&dir.join(file))?;
        }

        if let Ok(name) = env::var(vars::MEDBOARD_ENV) {
            Self::load_optional(&dir.join(format!(".env.{}", name)))?;
        }

        Ok(Self { _guard: () })
    }

    // A missing file is fine, a malformed one is not.
    fn load_optional(file: &Path) -> Result<(), EnvError> {
        match dotenvy::from_path(file) {
            Ok(()) => {
                tracing::debug!(path = %file.display(), "loaded env file");
                Ok(())
            }
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        env::var(var).unwrap_or_else(|_| default.to_string())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Apply `MEDBOARD_*` overrides on top of a loaded configuration.
    pub fn apply_overrides(config: &mut MedboardConfig) {
        if let Some(url) = Self::get(vars::MEDBOARD_BACKEND_URL) {
            config.backend.url = url;
        }
        if let Some(key) = Self::get(vars::MEDBOARD_BACKEND_ANON_KEY) {
            config.backend.anon_key = key;
        }
        if let Some(force) = Self::get_bool(vars::MEDBOARD_FORCE_MOCK) {
            config.backend.force_mock = force;
        }
        if let Some(seed) = Self::get_bool(vars::MEDBOARD_SEED_ON_EMPTY) {
            config.seed.on_empty = seed;
        }
    }
}
