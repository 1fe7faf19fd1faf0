//! Write-side query builders.
//!
//! Each resolves under one write-lock acquisition, so the read of current
//! state and the mutation happen with no suspension point in between.

use crate::error::StoreError;
use crate::query::{impl_into_future, matches_all, Execute, Filter, Single};
use crate::response::Response;
use crate::store::{MockStore, Tables, ID_FIELD};
use crate::value::{Columns, Record, Rows};
use futures::future::BoxFuture;
use medboard_common_log::spans::store_span;
use serde_json::Value;
use tracing::{debug, warn, Instrument};

/// `insert` chain. Resolves to the stored records, generated fields included.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    store: MockStore,
    table: String,
    rows: Vec<Record>,
    columns: Columns,
}

impl InsertQuery {
    pub(crate) fn new(store: MockStore, table: String, rows: Rows) -> Self {
        Self {
            store,
            table,
            rows: rows.0,
            columns: Columns::All,
        }
    }

    /// Project the returned records.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Columns::parse(columns);
        self
    }

    /// Applies the whole batch or, when ids run out part way, none of it.
    pub(crate) fn apply(
        self,
        tables: &mut Tables,
        created_at: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let existed = tables.contains_key(&self.table);
        let table = tables.entry(self.table.clone()).or_default();
        let (len, next_id) = (table.rows.len(), table.next_id());

        let mut stored = Vec::with_capacity(self.rows.len());
        for row in self.rows {
            match table.insert(row, created_at) {
                Some(row) => stored.push(self.columns.apply(&row)),
                None => {
                    table.rollback(len, next_id);
                    if !existed {
                        tables.remove(&self.table);
                    }
                    return Err(StoreError::IdsExhausted { table: self.table });
                }
            }
        }
        Ok(stored)
    }
}

impl Execute for InsertQuery {
    fn execute(self) -> BoxFuture<'static, Response<Vec<Record>>> {
        let span = store_span(&self.table, "insert");
        Box::pin(
            async move {
                let store = self.store.clone();
                let mut tables = store.tables.write().await;
                match self.apply(&mut tables, &MockStore::now()) {
                    Ok(stored) => {
                        debug!(rows = stored.len(), "insert resolved");
                        Response::ok(stored)
                    }
                    Err(err) => {
                        warn!(error = %err, "insert failed");
                        Response::err(err)
                    }
                }
            }
            .instrument(span),
        )
    }
}

/// `update` chain. Merges the patch into the first matching record.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    store: MockStore,
    table: String,
    patch: Record,
    filters: Vec<Filter>,
    columns: Columns,
}

impl UpdateQuery {
    pub(crate) fn new(store: MockStore, table: String, patch: Record) -> Self {
        Self {
            store,
            table,
            patch,
            filters: Vec::new(),
            columns: Columns::All,
        }
    }

    /// Target records whose `field` equals `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(field, value));
        self
    }

    /// Project the returned record.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Columns::parse(columns);
        self
    }

    /// Resolve to the updated record itself instead of a one-element list.
    pub fn single(self) -> Single<Self> {
        Single::new(self)
    }

    pub(crate) fn apply(self, tables: &mut Tables) -> Result<Vec<Record>, StoreError> {
        let table = tables
            .get_mut(&self.table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: self.table.clone(),
            })?;

        let index = table
            .rows
            .iter()
            .position(|r| matches_all(&self.filters, r))
            .ok_or_else(|| StoreError::RecordNotFound {
                table: self.table.clone(),
            })?;

        if let Some(id) = self.patch.get(ID_FIELD) {
            table.observe_id(id);
        }

        let row = &mut table.rows[index];
        for (field, value) in self.patch {
            row.insert(field, value);
        }

        Ok(vec![self.columns.apply(row)])
    }
}

impl Execute for UpdateQuery {
    fn execute(self) -> BoxFuture<'static, Response<Vec<Record>>> {
        let span = store_span(&self.table, "update");
        Box::pin(
            async move {
                let store = self.store.clone();
                let mut tables = store.tables.write().await;
                let result = self.apply(&mut tables);
                if let Err(e) = &result {
                    debug!(error = %e, "update failed");
                }
                Response::from(result)
            }
            .instrument(span),
        )
    }
}

/// `delete` chain. Removes every matching record; with no filters the table
/// is emptied but kept.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    store: MockStore,
    table: String,
    filters: Vec<Filter>,
    columns: Columns,
}

impl DeleteQuery {
    pub(crate) fn new(store: MockStore, table: String) -> Self {
        Self {
            store,
            table,
            filters: Vec::new(),
            columns: Columns::All,
        }
    }

    /// Target records whose `field` equals `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(field, value));
        self
    }

    /// Project the returned records.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Columns::parse(columns);
        self
    }

    pub(crate) fn apply(self, tables: &mut Tables) -> Result<Vec<Record>, StoreError> {
        let table = tables
            .get_mut(&self.table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: self.table.clone(),
            })?;

        let (removed, kept): (Vec<Record>, Vec<Record>) = std::mem::take(&mut table.rows)
            .into_iter()
            .partition(|r| matches_all(&self.filters, r));
        table.rows = kept;

        Ok(removed.iter().map(|r| self.columns.apply(r)).collect())
    }
}

impl Execute for DeleteQuery {
    fn execute(self) -> BoxFuture<'static, Response<Vec<Record>>> {
        let span = store_span(&self.table, "delete");
        Box::pin(
            async move {
                let store = self.store.clone();
                let mut tables = store.tables.write().await;
                let result = self.apply(&mut tables);
                match &result {
                    Ok(removed) => debug!(rows = removed.len(), "delete resolved"),
                    Err(e) => debug!(error = %e, "delete failed"),
                }
                Response::from(result)
            }
            .instrument(span),
        )
    }
}

impl_into_future!(InsertQuery, UpdateQuery, DeleteQuery);
