//! The `{ data, error }` result envelope.

use crate::error::StoreError;
use serde::Serialize;

/// Envelope returned by every terminal query.
///
/// On success `error` is `None`. `data` is `None` for a single-record query
/// with no match and `Some(vec![])` for a list query with no match; neither
/// case is an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    /// Matched or affected data.
    pub data: Option<T>,
    /// Populated only on failure.
    pub error: Option<StoreError>,
}

impl<T> Response<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Successful response with no data.
    pub fn empty() -> Self {
        Self {
            data: None,
            error: None,
        }
    }

    /// Failed response.
    pub fn err(error: StoreError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// Whether `error` is unset.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, keeping "no data" as `Ok(None)`.
    pub fn into_result(self) -> Result<Option<T>, StoreError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data),
        }
    }

    /// Map the data half, leaving the error untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// Map the data half through a function that may produce nothing.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Option<U>) -> Response<U> {
        Response {
            data: self.data.and_then(f),
            error: self.error,
        }
    }
}

impl<T> From<Result<T, StoreError>> for Response<T> {
    fn from(result: Result<T, StoreError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e),
        }
    }
}

/// Envelope returned by a count query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountResponse {
    /// Number of matching records.
    pub count: usize,
    /// Always `None` for the mock; kept for envelope parity.
    pub error: Option<StoreError>,
}
