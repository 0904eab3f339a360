//! Session connection utilities.
//!
//! A session owns exactly one [`duckdb::Connection`]. The workbench
//! binaries open a file-backed database so `poly_stats` survives between
//! runs; tests and throwaway sessions use [`open_in_memory`].

use std::path::Path;

use crate::DatabaseError;

/// Environment variable overriding the database file path.
pub const DB_PATH_ENV: &str = "ATLAS_DB_PATH";

/// Default database file used when [`DB_PATH_ENV`] is unset.
pub const DEFAULT_DB_PATH: &str = "data/atlas.duckdb";

/// Opens a file-backed session database, creating parent directories as
/// needed.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the directory cannot be created or the
/// database cannot be opened.
pub fn open_file(path: &Path) -> Result<duckdb::Connection, DatabaseError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    Ok(duckdb::Connection::open(path)?)
}

/// Opens the session database at the path from [`DB_PATH_ENV`], falling
/// back to [`DEFAULT_DB_PATH`].
///
/// # Errors
///
/// Returns [`DatabaseError`] if the database cannot be opened.
pub fn open_from_env() -> Result<duckdb::Connection, DatabaseError> {
    let path = std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    open_file(Path::new(&path))
}

/// Opens an in-memory session database.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the database cannot be opened.
pub fn open_in_memory() -> Result<duckdb::Connection, DatabaseError> {
    Ok(duckdb::Connection::open_in_memory()?)
}

/// Enables scanning of remote Parquet URLs (`s3://`, `https://`).
///
/// Installs and loads the `httpfs` extension and, when
/// `AWS_DEFAULT_REGION` is set, points the S3 reader at that region.
/// Installing the extension needs network access, so callers treat a
/// failure here as degraded (local paths still work) rather than fatal.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the extension cannot be installed or
/// loaded.
pub fn enable_remote_io(conn: &duckdb::Connection) -> Result<(), DatabaseError> {
    conn.execute_batch("INSTALL httpfs; LOAD httpfs;")?;

    if let Ok(region) = std::env::var("AWS_DEFAULT_REGION") {
        conn.execute_batch(&format!("SET s3_region = '{}'", crate::sql_quote(&region)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_memory_session() {
        let conn = open_in_memory().unwrap();
        let answer: i32 = conn
            .query_row("SELECT 6 * 7", [], |row| row.get(0))
            .unwrap();
        assert_eq!(answer, 42);
    }

    #[test]
    fn opens_file_backed_session_and_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("atlas_db_test_{}", std::process::id()));
        let path = dir.join("nested").join("session.duckdb");

        let conn = open_file(&path).unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER)").unwrap();
        drop(conn);

        assert!(path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
