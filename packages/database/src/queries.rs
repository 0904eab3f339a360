//! Ad-hoc query execution and `poly_stats` persistence.
//!
//! Query results come back with every cell converted to
//! [`serde_json::Value`] so the API and the terminal renderer can share
//! one shape. The `poly_stats` table is append-only: rows are inserted
//! once per successful statistics fetch and never updated.

use parquet_atlas_database_models::QueryResult;
use parquet_atlas_stats_models::StatsRecord;

use crate::DatabaseError;

/// Name of the persisted statistics table.
pub const POLY_STATS_TABLE: &str = "poly_stats";

/// Executes arbitrary SQL and converts the result to JSON rows.
///
/// Failures (syntax errors, missing views, type errors) are returned for
/// the caller to surface as user-facing text; nothing here panics.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the engine rejects the statement.
pub fn run_query(conn: &duckdb::Connection, sql: &str) -> Result<QueryResult, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;

    let mut columns: Vec<String> = Vec::new();
    let mut data: Vec<Vec<serde_json::Value>> = Vec::new();

    while let Some(row) = rows.next()? {
        let statement = row.as_ref();
        if columns.is_empty() {
            columns = statement
                .column_names()
                .iter()
                .map(ToString::to_string)
                .collect();
        }

        let mut record = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            let value: duckdb::types::Value = row.get(idx)?;
            record.push(json_value(value));
        }
        data.push(record);
    }

    Ok(QueryResult {
        columns,
        rows: data,
    })
}

/// Creates the `poly_stats` table if it does not exist.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the DDL fails.
pub fn ensure_poly_stats(conn: &duckdb::Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS poly_stats (
            population BIGINT NOT NULL,
            populated_area_km2 DOUBLE NOT NULL,
            osm_buildings_count BIGINT NOT NULL,
            osm_highway_length_km DOUBLE NOT NULL,
            building_count_6_months BIGINT NOT NULL,
            highway_length_6_months_km DOUBLE NOT NULL
        )",
    )?;
    Ok(())
}

/// Appends one fetched statistics record to `poly_stats`.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the insert fails.
pub fn insert_poly_stats(
    conn: &duckdb::Connection,
    record: &StatsRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO poly_stats (population, populated_area_km2, osm_buildings_count,
             osm_highway_length_km, building_count_6_months, highway_length_6_months_km)
         VALUES (?, ?, ?, ?, ?, ?)",
        duckdb::params![
            record.population,
            record.populated_area_km2,
            record.osm_buildings_count,
            record.osm_highway_length_km,
            record.building_count_6_months,
            record.highway_length_6_months_km,
        ],
    )?;
    Ok(())
}

/// Returns all persisted statistics records in table order.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails.
pub fn list_poly_stats(conn: &duckdb::Connection) -> Result<Vec<StatsRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT population, populated_area_km2, osm_buildings_count,
                osm_highway_length_km, building_count_6_months, highway_length_6_months_km
         FROM poly_stats",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(StatsRecord {
                population: row.get(0)?,
                populated_area_km2: row.get(1)?,
                osm_buildings_count: row.get(2)?,
                osm_highway_length_km: row.get(3)?,
                building_count_6_months: row.get(4)?,
                highway_length_6_months_km: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Converts one `DuckDB` cell value to JSON.
///
/// Scalars map directly; blobs are hex-encoded; lists recurse. Types
/// without a natural JSON shape (timestamps, intervals, structs) fall
/// back to their debug form.
fn json_value(value: duckdb::types::Value) -> serde_json::Value {
    use duckdb::types::Value;

    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::TinyInt(v) => serde_json::Value::from(v),
        Value::SmallInt(v) => serde_json::Value::from(v),
        Value::Int(v) => serde_json::Value::from(v),
        Value::BigInt(v) => serde_json::Value::from(v),
        Value::HugeInt(v) => i64::try_from(v)
            .map_or_else(|_| serde_json::Value::String(v.to_string()), serde_json::Value::from),
        Value::UTinyInt(v) => serde_json::Value::from(v),
        Value::USmallInt(v) => serde_json::Value::from(v),
        Value::UInt(v) => serde_json::Value::from(v),
        Value::UBigInt(v) => serde_json::Value::from(v),
        Value::Float(v) => float_value(f64::from(v)),
        Value::Double(v) => float_value(v),
        Value::Decimal(v) => serde_json::Value::String(v.to_string()),
        Value::Text(s) | Value::Enum(s) => serde_json::Value::String(s),
        Value::Blob(bytes) => serde_json::Value::String(hex::encode(bytes)),
        Value::List(items) => {
            serde_json::Value::Array(items.into_iter().map(json_value).collect())
        }
        other => serde_json::Value::String(format!("{other:?}")),
    }
}

/// NaN and infinities have no JSON representation; they become null.
fn float_value(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn record(population: i64) -> StatsRecord {
        StatsRecord {
            population,
            populated_area_km2: 12.5,
            osm_buildings_count: 300,
            osm_highway_length_km: 45.75,
            building_count_6_months: 18,
            highway_length_6_months_km: 2.25,
        }
    }

    #[test]
    fn ensure_poly_stats_is_idempotent() {
        let conn = db::open_in_memory().unwrap();
        ensure_poly_stats(&conn).unwrap();
        ensure_poly_stats(&conn).unwrap();
        assert!(list_poly_stats(&conn).unwrap().is_empty());
    }

    #[test]
    fn inserted_records_round_trip() {
        let conn = db::open_in_memory().unwrap();
        ensure_poly_stats(&conn).unwrap();

        insert_poly_stats(&conn, &record(100)).unwrap();
        insert_poly_stats(&conn, &record(200)).unwrap();

        let records = list_poly_stats(&conn).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record(100));
        assert_eq!(records[1].population, 200);
    }

    #[test]
    fn run_query_converts_scalar_types() {
        let conn = db::open_in_memory().unwrap();
        let result = run_query(
            &conn,
            "SELECT 1 AS one, 'x' AS s, NULL AS n, CAST(2.5 AS DOUBLE) AS d, TRUE AS b",
        )
        .unwrap();

        assert_eq!(result.columns, vec!["one", "s", "n", "d", "b"]);
        assert_eq!(result.row_count(), 1);
        assert_eq!(
            result.rows[0],
            vec![
                serde_json::json!(1),
                serde_json::json!("x"),
                serde_json::Value::Null,
                serde_json::json!(2.5),
                serde_json::json!(true),
            ]
        );
    }

    #[test]
    fn run_query_converts_lists() {
        let conn = db::open_in_memory().unwrap();
        let result = run_query(&conn, "SELECT [1, 2, 3] AS xs").unwrap();
        assert_eq!(result.rows[0][0], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn run_query_aggregates_over_poly_stats() {
        let conn = db::open_in_memory().unwrap();
        ensure_poly_stats(&conn).unwrap();
        insert_poly_stats(&conn, &record(100)).unwrap();
        insert_poly_stats(&conn, &record(300)).unwrap();

        let result = run_query(
            &conn,
            "SELECT COUNT(*) AS cnt, SUM(population) AS total FROM poly_stats",
        )
        .unwrap();

        assert_eq!(result.rows[0][0], serde_json::json!(2));
        assert_eq!(result.rows[0][1], serde_json::json!(400));
    }

    #[test]
    fn run_query_surfaces_engine_errors() {
        let conn = db::open_in_memory().unwrap();
        assert!(run_query(&conn, "SELECT FROM WHERE").is_err());
        assert!(run_query(&conn, "SELECT * FROM no_such_table").is_err());
    }

    #[test]
    fn run_query_handles_empty_results() {
        let conn = db::open_in_memory().unwrap();
        let result = run_query(&conn, "SELECT 42 AS x WHERE 1 = 0").unwrap();
        assert_eq!(result.row_count(), 0);
    }
}
