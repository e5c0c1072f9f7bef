//! Clients for the hosted backend: row store, object storage and the
//! realtime change feed.
//!
//! Every remote surface sits behind a trait ([`DataStore`],
//! [`ObjectStorage`]) with a REST implementation for production and an
//! in-memory implementation ([`memory`]) for tests and local development.

pub mod config;
pub mod data;
pub mod error;
pub mod memory;
pub mod query;
pub mod realtime;
pub mod rest;
pub mod storage;

pub use config::StoreConfig;
pub use data::{ContentFetcher, DataStore};
pub use error::StoreError;
pub use query::{Cardinality, Query, SortOrder};
pub use storage::{ListOptions, ObjectStorage, StoredObject, UploadOptions};
