#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `DuckDB` session layer for parquet-atlas.
//!
//! Owns everything that touches the embedded database: opening session
//! connections, loading remote Parquet datasets as views, executing
//! ad-hoc SQL, and persisting fetched statistics into the `poly_stats`
//! table. Connections are constructed explicitly and passed in by the
//! caller; there is no shared global handle.

pub mod db;
pub mod parquet;
pub mod queries;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The embedded database reported an error.
    #[error("database error: {0}")]
    Duck(#[from] duckdb::Error),

    /// I/O error (creating the database directory, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset URL was rejected before reaching the engine.
    #[error("invalid dataset URL `{url}`: {reason}")]
    InvalidDatasetUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Escapes a string for embedding in a single-quoted SQL literal.
///
/// `DuckDB` cannot bind parameters inside DDL such as `CREATE VIEW`, so
/// the few places that interpolate user input go through this.
pub(crate) fn sql_quote(s: &str) -> String {
    s.replace('\'', "''")
}
