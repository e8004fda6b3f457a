/// Store access for Questlog
///
/// The relational store is a single SQLite file. This module owns its
/// lifecycle: `pool` creates and closes the connection pool, `migrations`
/// applies the schema.

pub mod migrations;
pub mod pool;
