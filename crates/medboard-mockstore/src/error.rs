//! Envelope error type.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Error carried in the `error` half of a [`Response`](crate::Response).
///
/// A lookup that simply matches nothing is not an error; these variants
/// only cover writes that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Update or delete against a table that has never been written.
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    /// Update whose filters matched no record.
    #[error("record not found in {table}")]
    RecordNotFound { table: String },

    /// Insert that needed a generated id after `i64::MAX` was taken.
    #[error("no ids left in {table}")]
    IdsExhausted { table: String },
}

impl StoreError {
    /// Human-readable message, as exposed on the envelope.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TableNotFound { .. } => "table_not_found",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::IdsExhausted { .. } => "ids_exhausted",
        }
    }
}

impl Serialize for StoreError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("StoreError", 2)?;
        s.serialize_field("message", &self.message())?;
        s.serialize_field("code", self.code())?;
        s.end()
    }
}

impl From<StoreError> for medboard_common_core::Error {
    fn from(err: StoreError) -> Self {
        medboard_common_core::Error::store(err.message())
    }
}
