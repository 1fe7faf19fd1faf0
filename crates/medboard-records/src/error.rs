//! Data-access errors.

use medboard_mockstore::StoreError;
use thiserror::Error;

/// Errors surfaced by [`PatientService`](crate::PatientService).
#[derive(Debug, Error)]
pub enum RecordsError {
    /// The backend answered with a populated `error`.
    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: StoreError,
    },

    /// The backend succeeded but returned nothing where a row was required.
    #[error("{context}: backend returned no data")]
    MissingData { context: String },

    /// A stored record did not match the expected shape.
    #[error("failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),

    /// A value to be stored did not serialize to a JSON object.
    #[error("failed to encode record: {0}")]
    Encode(String),

    /// Credentials point at a hosted backend this build cannot reach.
    #[error("remote backend at {url} is not available in this build")]
    RemoteUnavailable { url: String },
}

impl RecordsError {
    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { source, .. } => source.message(),
            other => other.to_string(),
        }
    }
}

impl From<RecordsError> for medboard_common_core::Error {
    fn from(err: RecordsError) -> Self {
        match err {
            RecordsError::RemoteUnavailable { .. } => Self::config(err.to_string()),
            RecordsError::Decode(e) => Self::Serialization(e),
            other => Self::store(other.to_string()),
        }
    }
}
