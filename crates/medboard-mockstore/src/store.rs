//! The shared in-memory table map.

use crate::query::{CountQuery, SelectQuery};
use crate::value::{Record, Rows};
use crate::write::{DeleteQuery, InsertQuery, UpdateQuery};
use medboard_common_core::Timestamp;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Field holding the generated identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the insertion timestamp.
pub const CREATED_AT_FIELD: &str = "created_at";

/// One named table.
#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) rows: Vec<Record>,
    /// `None` once an id of `i64::MAX` has been used.
    next_id: Option<i64>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: Some(1),
        }
    }
}

/// Integer value of an id, when it has one.
///
/// Integral floats count (`2.0` matches `2` under `eq`); integers past
/// `i64::MAX` saturate.
fn integral_id(id: &Value) -> Option<i64> {
    if let Some(n) = id.as_i64() {
        return Some(n);
    }
    if id.as_u64().is_some() {
        return Some(i64::MAX);
    }
    let f = id.as_f64()?;
    if f.fract() != 0.0 {
        return None;
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f >= i64::MAX as f64 {
        Some(i64::MAX)
    } else {
        Some(f as i64)
    }
}

impl Table {
    /// Note an id that entered the table so it is never handed out again.
    pub(crate) fn observe_id(&mut self, id: &Value) {
        if let (Some(id), Some(next)) = (integral_id(id), self.next_id) {
            if id >= next {
                self.next_id = id.checked_add(1);
            }
        }
    }

    /// Append `record`, filling in `id` and `created_at` when absent, and
    /// return the stored copy.
    ///
    /// Returns `None` without touching the table when an id is needed but
    /// the id space is used up.
    pub(crate) fn insert(&mut self, mut record: Record, created_at: &str) -> Option<Record> {
        match record.get(ID_FIELD) {
            Some(id) => self.observe_id(id),
            None => {
                let id = self.next_id?;
                self.next_id = id.checked_add(1);
                record.insert(ID_FIELD.to_string(), Value::from(id));
            }
        }

        record
            .entry(CREATED_AT_FIELD)
            .or_insert_with(|| Value::from(created_at));

        self.rows.push(record.clone());
        Some(record)
    }

    /// Undo appends past `len`, restoring the id counter to `next_id`.
    pub(crate) fn rollback(&mut self, len: usize, next_id: Option<i64>) {
        self.rows.truncate(len);
        self.next_id = next_id;
    }

    pub(crate) fn next_id(&self) -> Option<i64> {
        self.next_id
    }
}

pub(crate) type Tables = HashMap<String, Table>;

/// Process-wide mock database.
///
/// Cloning is cheap and every clone sees the same tables; construct a new
/// store for isolation. Tables spring into existence on first insert.
#[derive(Clone, Default)]
pub struct MockStore {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl MockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        debug!("creating empty mock store");
        Self::default()
    }

    /// Start a query against `table`.
    pub fn from(&self, table: impl Into<String>) -> TableHandle {
        TableHandle {
            store: self.clone(),
            table: table.into(),
        }
    }

    /// Names of every table that has been written, sorted.
    pub async fn tables(&self) -> Vec<String> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every table.
    pub async fn clear(&self) {
        self.tables.write().await.clear();
        debug!("mock store cleared");
    }

    pub(crate) fn now() -> String {
        Timestamp::now().to_iso8601()
    }
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore").finish_non_exhaustive()
    }
}

/// A table name bound to a store; the root of every query chain.
#[derive(Debug, Clone)]
pub struct TableHandle {
    store: MockStore,
    table: String,
}

impl TableHandle {
    /// Table this handle targets.
    pub fn name(&self) -> &str {
        &self.table
    }

    /// Read `columns` (comma separated, `"*"` for all).
    pub fn select(&self, columns: &str) -> SelectQuery {
        SelectQuery::new(self.store.clone(), self.table.clone(), columns)
    }

    /// Insert one record or a batch.
    pub fn insert(&self, rows: impl Into<Rows>) -> InsertQuery {
        InsertQuery::new(self.store.clone(), self.table.clone(), rows.into())
    }

    /// Merge `patch` into the first record matched by the chained filters.
    pub fn update(&self, patch: Record) -> UpdateQuery {
        UpdateQuery::new(self.store.clone(), self.table.clone(), patch)
    }

    /// Remove every record matched by the chained filters.
    pub fn delete(&self) -> DeleteQuery {
        DeleteQuery::new(self.store.clone(), self.table.clone())
    }

    /// Count records without returning them.
    pub fn count(&self) -> CountQuery {
        CountQuery::new(self.store.clone(), self.table.clone())
    }
}
