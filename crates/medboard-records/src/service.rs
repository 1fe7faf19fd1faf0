//! Typed patient and vitals operations.

use crate::backend::Backend;
use crate::error::RecordsError;
use crate::models::{NewPatient, Patient, PatientSeed, PatientUpdate, VitalsDataPoint};
use medboard_mockstore::{Filter, OrderBy, Record, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const PATIENTS_TABLE: &str = "patients";
pub const VITALS_TABLE: &str = "vitals_data";

/// Patient data access over any [`Backend`].
pub struct PatientService<B: ?Sized = dyn Backend> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for PatientService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

/// Unwrap an envelope, logging and converting a populated `error`.
fn envelope<T>(
    res: Response<T>,
    context: impl FnOnce() -> String,
) -> Result<Option<T>, RecordsError> {
    res.into_result().map_err(|source| {
        let context = context();
        error!(%context, error = %source, "backend returned an error");
        RecordsError::Backend { context, source }
    })
}

fn decode<T: DeserializeOwned>(record: Record) -> Result<T, RecordsError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

fn encode<T: Serialize>(value: &T) -> Result<Record, RecordsError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RecordsError::Encode(format!("expected an object, got {}", other))),
        Err(e) => Err(RecordsError::Encode(e.to_string())),
    }
}

impl<B: Backend + ?Sized> PatientService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All patients, newest first.
    #[instrument(skip(self))]
    pub async fn fetch_patients(&self) -> Result<Vec<Patient>, RecordsError> {
        let order = OrderBy {
            field: "created_at".into(),
            ascending: false,
        };
        let res = self.backend.fetch_all(PATIENTS_TABLE, Some(order)).await;
        envelope(res, || "fetching patients".to_string())?
            .unwrap_or_default()
            .into_iter()
            .map(decode)
            .collect()
    }

    /// One patient, or `None` when no record has this id.
    #[instrument(skip(self))]
    pub async fn fetch_patient_by_id(&self, id: i64) -> Result<Option<Patient>, RecordsError> {
        let res = self
            .backend
            .fetch_one(PATIENTS_TABLE, Filter::new("id", id))
            .await;
        envelope(res, || format!("fetching patient with id {}", id))?
            .map(decode)
            .transpose()
    }

    /// Vitals series for one patient, oldest first.
    #[instrument(skip(self))]
    pub async fn fetch_vitals_data(
        &self,
        patient_id: i64,
    ) -> Result<Vec<VitalsDataPoint>, RecordsError> {
        let order = OrderBy {
            field: "time".into(),
            ascending: true,
        };
        let res = self
            .backend
            .fetch_where(VITALS_TABLE, Filter::new("patient_id", patient_id), Some(order))
            .await;
        envelope(res, || format!("fetching vitals data for patient {}", patient_id))?
            .unwrap_or_default()
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Store a new patient and return it with its generated id.
    #[instrument(skip(self, patient), fields(name = %patient.name))]
    pub async fn add_patient(&self, patient: &NewPatient) -> Result<Patient, RecordsError> {
        let res = self.backend.insert_one(PATIENTS_TABLE, encode(patient)?).await;
        let stored = envelope(res, || "adding patient".to_string())?.ok_or_else(|| {
            RecordsError::MissingData {
                context: "adding patient".into(),
            }
        })?;
        decode(stored)
    }

    /// Apply a partial update and return the merged patient.
    #[instrument(skip(self, updates))]
    pub async fn update_patient(
        &self,
        id: i64,
        updates: &PatientUpdate,
    ) -> Result<Patient, RecordsError> {
        let res = self
            .backend
            .update_where(PATIENTS_TABLE, Filter::new("id", id), encode(updates)?)
            .await;
        let context = || format!("updating patient with id {}", id);
        let stored = envelope(res, context)?
            .ok_or_else(|| RecordsError::MissingData { context: context() })?;
        decode(stored)
    }

    /// Number of stored patients.
    pub async fn count_patients(&self) -> Result<usize, RecordsError> {
        let res = self.backend.count(PATIENTS_TABLE).await;
        match res.error {
            Some(source) => Err(RecordsError::Backend {
                context: "counting patients".into(),
                source,
            }),
            None => Ok(res.count),
        }
    }

    /// Insert `samples` only when the patients table is empty.
    ///
    /// Returns whether anything was written. Each sample's vitals are stored
    /// with `patient_id` set to the id its patient received.
    #[instrument(skip(self, samples), fields(samples = samples.len()))]
    pub async fn seed_if_empty(&self, samples: &[PatientSeed]) -> Result<bool, RecordsError> {
        let existing = self.count_patients().await?;
        if existing > 0 {
            info!(existing, "patients already present, skipping seed");
            return Ok(false);
        }

        let timer = medboard_common_log::spans::Timer::start("seed");
        for sample in samples {
            let patient = self.add_patient(&sample.patient).await?;

            if sample.vitals.is_empty() {
                continue;
            }
            let rows = sample
                .vitals
                .iter()
                .map(|point| {
                    encode(&VitalsDataPoint {
                        patient_id: Some(patient.id),
                        ..point.clone()
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let res = self.backend.insert_many(VITALS_TABLE, rows).await;
            envelope(res, || format!("seeding vitals for patient {}", patient.id))?;
        }
        timer.finish();

        info!(patients = samples.len(), "seeded sample data");
        Ok(!samples.is_empty())
    }
}
