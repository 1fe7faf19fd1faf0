//! Typed data access for the Medboard dashboard.
//!
//! The rest of the application calls [`PatientService`] and never sees which
//! [`Backend`] is active. Without backend credentials [`connect`] hands back
//! a [`MockBackend`] over an in-memory store.

pub mod backend;
pub mod bootstrap;
pub mod error;
pub mod models;
pub mod service;

pub use backend::{connect, Backend, MockBackend};
pub use bootstrap::{bootstrap, bootstrap_from_env};
pub use error::RecordsError;
pub use models::*;
pub use service::{PatientService, PATIENTS_TABLE, VITALS_TABLE};
