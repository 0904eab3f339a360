#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API request and response types for the parquet-atlas server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database result types to allow independent evolution of the
//! API contract.

use parquet_atlas_database_models::QueryResult;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Body of `POST /api/datasets/load`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadDatasetRequest {
    /// Object-store URL of the Parquet dataset to load.
    pub url: String,
}

/// Body of `POST /api/query`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlQueryRequest {
    /// The SQL to execute against the session.
    pub sql: String,
}

/// Body of `POST /api/stats`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BboxStatsRequest {
    /// Bounding box as `"minx,miny,maxx,maxy"`.
    pub bbox: String,
}

/// Query result as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQueryResult {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Row values, one JSON value per cell.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    pub row_count: usize,
}

impl From<QueryResult> for ApiQueryResult {
    fn from(result: QueryResult) -> Self {
        Self {
            row_count: result.row_count(),
            columns: result.columns,
            rows: result.rows,
        }
    }
}
