//! Startup wiring: config to backend to service.

use crate::backend::connect;
use crate::models::PatientSeed;
use crate::service::PatientService;
use medboard_common_config::{ConfigLoader, Environment, MedboardConfig};
use medboard_common_core::Error;
use std::path::Path;
use tracing::info;

/// Connect the configured backend and, when `seed.on_empty` is set, seed
/// `samples` into an empty patients table.
pub async fn bootstrap(
    config: &MedboardConfig,
    samples: &[PatientSeed],
) -> medboard_common_core::Result<PatientService> {
    let service = PatientService::new(connect(&config.backend)?);

    if config.seed.on_empty {
        let seeded = service.seed_if_empty(samples).await?;
        info!(seeded, "startup seeding finished");
    }

    Ok(service)
}

/// Full startup from a project directory.
///
/// Loads the `.env` files in `project_dir`, reads `.medboard/config.yaml`
/// with `MEDBOARD_*` overrides applied, then runs [`bootstrap`]. Logging is
/// left to the caller (`medboard_common_log::init`).
pub async fn bootstrap_from_env(
    project_dir: impl AsRef<Path>,
    samples: &[PatientSeed],
) -> medboard_common_core::Result<PatientService> {
    let project_dir = project_dir.as_ref();
    Environment::init_in(project_dir).map_err(|e| Error::config(e.to_string()))?;
    let config = ConfigLoader::new(project_dir)
        .load_with_env()
        .map_err(|e| Error::config(e.to_string()))?;

    bootstrap(&config, samples).await
}
