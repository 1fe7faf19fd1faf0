//! Read-side query builders.

use crate::response::{CountResponse, Response};
use crate::store::{MockStore, Tables};
use crate::value::{compare_values, values_equal, Columns, Record};
use futures::future::BoxFuture;
use medboard_common_log::spans::store_span;
use serde_json::Value;
use std::cmp::Ordering;
use std::future::IntoFuture;
use tracing::{debug, Instrument};

/// Equality predicate `field == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// A record lacking `field` never matches, not even a `null` value.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .is_some_and(|v| values_equal(v, &self.value))
    }
}

pub(crate) fn matches_all(filters: &[Filter], record: &Record) -> bool {
    filters.iter().all(|f| f.matches(record))
}

/// Sort direction for `order`. Defaults to descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderOptions {
    pub ascending: bool,
}

impl From<bool> for OrderOptions {
    fn from(ascending: bool) -> Self {
        Self { ascending }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

impl OrderBy {
    /// Compare two records on this key; a missing field sorts as `null`.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = compare_values(
            a.get(&self.field).unwrap_or(&Value::Null),
            b.get(&self.field).unwrap_or(&Value::Null),
        );
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// A query that resolves to a list of records.
pub trait Execute: Sized + Send + 'static {
    /// Run against the store.
    fn execute(self) -> BoxFuture<'static, Response<Vec<Record>>>;
}

/// Implements `IntoFuture` by delegating to [`Execute::execute`], so a query
/// can be awaited directly.
macro_rules! impl_into_future {
    ($($ty:ty),+ $(,)?) => {$(
        impl ::std::future::IntoFuture for $ty {
            type Output = $crate::response::Response<Vec<$crate::value::Record>>;
            type IntoFuture = ::futures::future::BoxFuture<'static, Self::Output>;

            fn into_future(self) -> Self::IntoFuture {
                $crate::query::Execute::execute(self)
            }
        }
    )+};
}
pub(crate) use impl_into_future;

/// Wraps a list query so it resolves to its first record, or `data: None`
/// when nothing matched.
#[derive(Debug, Clone)]
pub struct Single<Q> {
    query: Q,
}

impl<Q: Execute> Single<Q> {
    pub(crate) fn new(query: Q) -> Self {
        Self { query }
    }
}

impl<Q: Execute> IntoFuture for Single<Q> {
    type Output = Response<Record>;
    type IntoFuture = BoxFuture<'static, Response<Record>>;

    fn into_future(self) -> Self::IntoFuture {
        let fut = self.query.execute();
        Box::pin(async move { fut.await.and_then(|rows| rows.into_iter().next()) })
    }
}

/// `select` chain: filters, ordering and projection over one table.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    store: MockStore,
    table: String,
    columns: Columns,
    filters: Vec<Filter>,
    order: Vec<OrderBy>,
}

impl SelectQuery {
    pub(crate) fn new(store: MockStore, table: String, columns: &str) -> Self {
        Self {
            store,
            table,
            columns: Columns::parse(columns),
            filters: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Keep records whose `field` equals `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(field, value));
        self
    }

    /// Sort by `field`. Later calls break ties left by earlier ones.
    pub fn order(mut self, field: impl Into<String>, options: impl Into<OrderOptions>) -> Self {
        self.order.push(OrderBy {
            field: field.into(),
            ascending: options.into().ascending,
        });
        self
    }

    /// Resolve to the first match instead of a list.
    pub fn single(self) -> Single<Self> {
        Single::new(self)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order
    }

    /// Evaluate against a snapshot of the tables. Filtering and sorting see
    /// every field; projection is applied last.
    pub(crate) fn resolve(&self, tables: &Tables) -> Vec<Record> {
        let Some(table) = tables.get(&self.table) else {
            return Vec::new();
        };

        let mut rows: Vec<&Record> = table
            .rows
            .iter()
            .filter(|r| matches_all(&self.filters, r))
            .collect();

        if !self.order.is_empty() {
            rows.sort_by(|a, b| {
                self.order
                    .iter()
                    .map(|o| o.compare(a, b))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        rows.into_iter().map(|r| self.columns.apply(r)).collect()
    }
}

impl Execute for SelectQuery {
    fn execute(self) -> BoxFuture<'static, Response<Vec<Record>>> {
        let span = store_span(&self.table, "select");
        Box::pin(
            async move {
                let tables = self.store.tables.read().await;
                let rows = self.resolve(&tables);
                debug!(rows = rows.len(), "select resolved");
                Response::ok(rows)
            }
            .instrument(span),
        )
    }
}

impl_into_future!(SelectQuery);

/// Count chain; never transfers record contents.
#[derive(Debug, Clone)]
pub struct CountQuery {
    store: MockStore,
    table: String,
    filters: Vec<Filter>,
}

impl CountQuery {
    pub(crate) fn new(store: MockStore, table: String) -> Self {
        Self {
            store,
            table,
            filters: Vec::new(),
        }
    }

    /// Count only records whose `field` equals `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(field, value));
        self
    }

    pub(crate) fn resolve(&self, tables: &Tables) -> usize {
        tables.get(&self.table).map_or(0, |t| {
            t.rows.iter().filter(|r| matches_all(&self.filters, r)).count()
        })
    }
}

impl IntoFuture for CountQuery {
    type Output = CountResponse;
    type IntoFuture = BoxFuture<'static, CountResponse>;

    fn into_future(self) -> Self::IntoFuture {
        let span = store_span(&self.table, "count");
        Box::pin(
            async move {
                let tables = self.store.tables.read().await;
                let count = self.resolve(&tables);
                debug!(count, "count resolved");
                CountResponse { count, error: None }
            }
            .instrument(span),
        )
    }
}
