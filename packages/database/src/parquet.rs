//! Remote Parquet dataset loading.
//!
//! A session has at most one loaded dataset, exposed as the
//! [`DATASET_VIEW`] view. Loading replaces the previous view; the
//! underlying Parquet files are scanned lazily by the engine, so loading
//! is cheap and queries pull only the columns they touch.

use parquet_atlas_database_models::ColumnInfo;

use crate::DatabaseError;

/// Name of the view the loaded dataset is exposed under.
pub const DATASET_VIEW: &str = "parquet_data";

/// URL schemes the engine can scan once remote I/O is enabled.
const ALLOWED_SCHEMES: &[&str] = &["s3://", "http://", "https://", "gs://", "az://"];

/// Loads `url` as the session's dataset view.
///
/// The URL is validated and quoted before being interpolated into the
/// view DDL; `DuckDB` cannot bind parameters inside `CREATE VIEW`.
///
/// # Errors
///
/// Returns [`DatabaseError::InvalidDatasetUrl`] for URLs that are empty
/// or have no recognizable scheme, or [`DatabaseError::Duck`] if the
/// engine rejects the scan.
pub fn load_dataset(conn: &duckdb::Connection, url: &str) -> Result<(), DatabaseError> {
    let url = url.trim();
    validate_dataset_url(url)?;

    conn.execute_batch(&format!(
        "CREATE OR REPLACE VIEW {DATASET_VIEW} AS SELECT * FROM parquet_scan('{}')",
        crate::sql_quote(url)
    ))?;

    log::info!("Loaded dataset into view `{DATASET_VIEW}`: {url}");
    Ok(())
}

/// Returns the schema of the currently loaded dataset view.
///
/// # Errors
///
/// Returns [`DatabaseError`] if no dataset is loaded or the query fails.
pub fn describe_dataset(conn: &duckdb::Connection) -> Result<Vec<ColumnInfo>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("DESCRIBE {DATASET_VIEW}"))?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(ColumnInfo {
            name: row.get(0)?,
            column_type: row.get(1)?,
        });
    }

    Ok(columns)
}

/// Rejects dataset URLs the engine has no chance of scanning.
fn validate_dataset_url(url: &str) -> Result<(), DatabaseError> {
    if url.is_empty() {
        return Err(DatabaseError::InvalidDatasetUrl {
            url: url.to_string(),
            reason: "URL is empty".to_string(),
        });
    }

    let has_scheme = ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme));
    if !has_scheme && !url.ends_with(".parquet") {
        return Err(DatabaseError::InvalidDatasetUrl {
            url: url.to_string(),
            reason: "expected an s3://, http(s)://, gs://, or az:// URL, \
                     or a local .parquet path"
                .to_string(),
        });
    }

    Ok(())
}
