//! Configuration types.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedboardConfig {
    /// Backend connection settings.
    pub backend: BackendConfig,
    /// Demo-data seeding behaviour.
    pub seed: SeedConfig,
}

/// Hosted backend credentials.
///
/// Both `url` and `anon_key` must be non-empty for the remote backend to be
/// selected; anything less falls back to the in-memory mock.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend project URL.
    pub url: String,
    /// Anonymous (public) API key.
    pub anon_key: String,
    /// Use the mock store even when credentials are present.
    pub force_mock: bool,
}

// Keeps the key out of logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key_len", &self.anon_key.len())
            .field("force_mock", &self.force_mock)
            .finish()
    }
}

/// Which data backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Hosted backend reached over the network.
    Remote,
    /// In-process mock store.
    Mock,
}

impl BackendConfig {
    /// Resolve the active backend mode.
    pub fn mode(&self) -> BackendMode {
        if self.force_mock || self.url.trim().is_empty() || self.anon_key.trim().is_empty() {
            BackendMode::Mock
        } else {
            BackendMode::Remote
        }
    }
}

/// Seeding configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed sample records at startup when the patients table is empty.
    pub on_empty: bool,
}
