//! The swappable backend seam.

use crate::error::RecordsError;
use async_trait::async_trait;
use medboard_common_config::{BackendConfig, BackendMode};
use medboard_mockstore::{CountResponse, Filter, MockStore, OrderBy, Record, Response};
use std::sync::Arc;
use tracing::{debug, info};

/// Record-level operations every backend provides.
///
/// Methods mirror the query chains the dashboard issues and return the
/// backend's `{ data, error }` envelope untouched; interpretation is left to
/// [`PatientService`](crate::PatientService).
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which backend this is.
    fn mode(&self) -> BackendMode;

    /// Every record of `table`, optionally sorted.
    async fn fetch_all(&self, table: &str, order: Option<OrderBy>) -> Response<Vec<Record>>;

    /// Records of `table` matching `filter`, optionally sorted.
    async fn fetch_where(
        &self,
        table: &str,
        filter: Filter,
        order: Option<OrderBy>,
    ) -> Response<Vec<Record>>;

    /// First record matching `filter`, or `data: None`.
    async fn fetch_one(&self, table: &str, filter: Filter) -> Response<Record>;

    /// Insert records and return them as stored.
    async fn insert_many(&self, table: &str, rows: Vec<Record>) -> Response<Vec<Record>>;

    /// Insert one record and return it as stored.
    async fn insert_one(&self, table: &str, row: Record) -> Response<Record> {
        self.insert_many(table, vec![row])
            .await
            .and_then(|rows| rows.into_iter().next())
    }

    /// Merge `patch` into the first record matching `filter`.
    async fn update_where(&self, table: &str, filter: Filter, patch: Record) -> Response<Record>;

    /// Number of records in `table`.
    async fn count(&self, table: &str) -> CountResponse;
}

/// [`Backend`] over an in-memory [`MockStore`].
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    store: MockStore,
}

impl MockBackend {
    pub fn new(store: MockStore) -> Self {
        Self { store }
    }

    /// The underlying store, for inspection.
    pub fn store(&self) -> &MockStore {
        &self.store
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Mock
    }

    async fn fetch_all(&self, table: &str, order: Option<OrderBy>) -> Response<Vec<Record>> {
        let mut query = self.store.from(table).select("*");
        if let Some(o) = order {
            query = query.order(o.field, o.ascending);
        }
        query.await
    }

    async fn fetch_where(
        &self,
        table: &str,
        filter: Filter,
        order: Option<OrderBy>,
    ) -> Response<Vec<Record>> {
        let mut query = self.store.from(table).select("*").eq(filter.field, filter.value);
        if let Some(o) = order {
            query = query.order(o.field, o.ascending);
        }
        query.await
    }

    async fn fetch_one(&self, table: &str, filter: Filter) -> Response<Record> {
        self.store
            .from(table)
            .select("*")
            .eq(filter.field, filter.value)
            .single()
            .await
    }

    async fn insert_many(&self, table: &str, rows: Vec<Record>) -> Response<Vec<Record>> {
        self.store.from(table).insert(rows).select("*").await
    }

    async fn update_where(&self, table: &str, filter: Filter, patch: Record) -> Response<Record> {
        self.store
            .from(table)
            .update(patch)
            .eq(filter.field, filter.value)
            .single()
            .await
    }

    async fn count(&self, table: &str) -> CountResponse {
        self.store.from(table).count().await
    }
}

/// Pick the backend for `config`.
///
/// Without both credentials this is a [`MockBackend`] over a fresh store.
/// The hosted backend's client is not part of this workspace, so remote mode
/// reports [`RecordsError::RemoteUnavailable`].
pub fn connect(config: &BackendConfig) -> Result<Arc<dyn Backend>, RecordsError> {
    debug!(url = %config.url, anon_key_len = config.anon_key.len(), "resolving backend");

    match config.mode() {
        BackendMode::Mock => {
            info!("using mock backend - local development mode");
            Ok(Arc::new(MockBackend::new(MockStore::new())))
        }
        BackendMode::Remote => Err(RecordsError::RemoteUnavailable {
            url: config.url.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medboard_test_utils::record;
    use serde_json::json;

    fn order(field: &str, ascending: bool) -> Option<OrderBy> {
        Some(OrderBy {
            field: field.into(),
            ascending,
        })
    }

    #[tokio::test]
    async fn test_mock_backend_round_trip() {
        let backend = MockBackend::default();
        let stored = backend
            .insert_one("patients", record(json!({"name": "Ada"})))
            .await
            .data
            .unwrap();
        assert_eq!(stored["id"], json!(1));

        let fetched = backend.fetch_one("patients", Filter::new("id", 1)).await;
        assert_eq!(fetched.data, Some(stored));
        assert_eq!(backend.count("patients").await.count, 1);
    }

    #[tokio::test]
    async fn test_fetch_where_orders() {
        let backend = MockBackend::default();
        backend
            .insert_many(
                "vitals_data",
                vec![
                    record(json!({"patient_id": 1, "time": "09:00"})),
                    record(json!({"patient_id": 2, "time": "08:00"})),
                    record(json!({"patient_id": 1, "time": "07:00"})),
                ],
            )
            .await;

        let rows = backend
            .fetch_where("vitals_data", Filter::new("patient_id", 1), order("time", true))
            .await
            .data
            .unwrap();
        let times: Vec<_> = rows.iter().map(|r| r["time"].clone()).collect();
        assert_eq!(times, vec![json!("07:00"), json!("09:00")]);

        let all = backend.fetch_all("vitals_data", order("time", false)).await.data.unwrap();
        assert_eq!(all[0]["time"], json!("09:00"));
    }

    #[tokio::test]
    async fn test_update_where_reports_errors() {
        let backend = MockBackend::default();
        let res = backend
            .update_where("patients", Filter::new("id", 1), record(json!({"age": 5})))
            .await;
        assert!(res.error.is_some());
    }

    #[test]
    fn test_connect_selects_mock_without_credentials() {
        let backend = connect(&BackendConfig::default()).unwrap();
        assert_eq!(backend.mode(), BackendMode::Mock);
    }

    #[test]
    fn test_connect_remote_unavailable() {
        let config = BackendConfig {
            url: "https://db.example.org".into(),
            anon_key: "anon".into(),
            force_mock: false,
        };
        match connect(&config) {
            Err(RecordsError::RemoteUnavailable { url }) => {
                assert_eq!(url, "https://db.example.org")
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected remote mode to be unavailable"),
        }
    }
}
