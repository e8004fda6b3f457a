//! # Questlog Shared
//!
//! Data model and relational store access for the Questlog backend.
//!
//! ## Modules
//!
//! - `db`: connection pool and migration runner for the SQLite store
//! - `models`: the three entity models (`Attribute`, `Task`, `User`), their
//!   CRUD operations, and the `IdList` delimited-text value type

pub mod db;
pub mod models;
