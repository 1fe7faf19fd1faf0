//! In-memory mock of a hosted backend's query client.
//!
//! Application code written against the remote client's fluent API
//! (`from(table).select(..).eq(..).order(..)`) runs unmodified against a
//! [`MockStore`] when no backend credentials are configured. Every chained
//! call returns a new immutable query value; awaiting it (directly, or
//! through [`SelectQuery::single`]) resolves against the in-memory tables
//! and yields the same `{ data, error }` envelope the remote client does.
//!
//! ```no_run
//! # async fn demo() {
//! use medboard_mockstore::{MockStore, Record};
//! use serde_json::json;
//!
//! let store = MockStore::new();
//! let mut row = Record::new();
//! row.insert("name".into(), json!("A"));
//! store.from("items").insert(row).await;
//!
//! let res = store.from("items").select("*").order("id", true).await;
//! assert_eq!(res.data.map(|rows| rows.len()), Some(1));
//! # }
//! ```

pub mod error;
pub mod query;
pub mod response;
pub mod store;
pub mod value;
pub mod write;

pub use error::StoreError;
pub use query::{CountQuery, Execute, Filter, OrderBy, OrderOptions, SelectQuery, Single};
pub use response::{CountResponse, Response};
pub use store::{MockStore, TableHandle};
pub use value::{compare_numbers, compare_values, values_equal, Columns, Record, Rows};
pub use write::{DeleteQuery, InsertQuery, UpdateQuery};
