//! Configuration types for Medboard.
//!
//! Configuration comes from `.medboard/config.yaml` (all sections optional),
//! `.env` files, and `MEDBOARD_*` environment variables, in that order of
//! increasing precedence. The backend section decides whether the data
//! layer talks to a hosted backend or to the in-memory mock store.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = MedboardConfig::default();

        assert!(config.backend.url.is_empty());
        assert!(config.backend.anon_key.is_empty());
        assert!(!config.backend.force_mock);
        assert_eq!(config.backend.mode(), BackendMode::Mock);

        assert!(!config.seed.on_empty);
    }

    #[test]
    fn test_config_serializes_to_yaml() {
        let config = MedboardConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        assert!(yaml.contains("backend:"));
        assert!(yaml.contains("seed:"));
        assert!(yaml.contains("force_mock: false"));
    }

    #[test]
    fn test_partial_configs_merge_with_defaults() {
        let partial_yaml = r#"
backend:
  url: https://db.example.org
"#;

        let config: MedboardConfig = serde_yaml::from_str(partial_yaml).unwrap();

        assert_eq!(config.backend.url, "https://db.example.org");
        assert!(config.backend.anon_key.is_empty());
        assert!(!config.seed.on_empty);
        // a url without a key is still mock mode
        assert_eq!(config.backend.mode(), BackendMode::Mock);
    }
}
