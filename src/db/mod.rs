//! Database module: SQLite access for the credential store and tenant files.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for the credential store
//! - `sqlite.rs`: per-operation connections and the `UsersStorage`
//! - `values.rs`: JSON <-> SQLite value conversion for arbitrary tables

pub mod models;
pub mod schema;
pub mod sqlite;
pub mod values;

pub use sqlite::UsersStorage;
