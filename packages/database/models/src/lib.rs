#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Row and result shapes for the `DuckDB` session layer.
//!
//! These types represent data as it comes back from the embedded
//! database: the schema of a loaded dataset view and the generic result
//! of an ad-hoc query. They are distinct from the API response types in
//! `parquet_atlas_server_models`.

use serde::{Deserialize, Serialize};

/// One column of a dataset view's schema, as reported by `DESCRIBE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// `DuckDB` type name (e.g. `VARCHAR`, `DOUBLE`, `STRUCT(...)`).
    pub column_type: String,
}

/// Result of an ad-hoc SQL query, with every cell converted to JSON.
///
/// Rows are in result order; each row has one value per entry in
/// `columns`. An empty result has no rows and, when the statement
/// produced no output at all, no columns either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Row values, one `serde_json::Value` per cell.
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    /// Number of rows in the result.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_result_serializes_camel_case() {
        let result = QueryResult {
            columns: vec!["dataset".to_string(), "count".to_string()],
            rows: vec![vec![
                serde_json::json!("OpenStreetMap"),
                serde_json::json!(12),
            ]],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["columns"][0], "dataset");
        assert_eq!(json["rows"][0][1], 12);
    }

    #[test]
    fn column_info_serializes_type_name() {
        let column = ColumnInfo {
            name: "geometry".to_string(),
            column_type: "BLOB".to_string(),
        };
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["name"], "geometry");
        assert_eq!(json["columnType"], "BLOB");
    }
}
