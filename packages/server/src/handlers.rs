//! HTTP handler functions for the parquet-atlas API.

use actix_web::{HttpResponse, web};
use parquet_atlas_database::{parquet, queries};
use parquet_atlas_server_models::{
    ApiHealth, ApiQueryResult, BboxStatsRequest, LoadDatasetRequest, SqlQueryRequest,
};
use parquet_atlas_stats::StatsError;
use parquet_atlas_stats_models::BoundingBox;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/datasets`
///
/// Lists the known cloud-hosted datasets.
pub async fn datasets() -> HttpResponse {
    HttpResponse::Ok().json(parquet_atlas_catalog::DATASETS)
}

/// `GET /api/queries`
///
/// Lists the canned query templates.
pub async fn canned_queries() -> HttpResponse {
    HttpResponse::Ok().json(parquet_atlas_catalog::CANNED_QUERIES)
}

/// `POST /api/datasets/load`
///
/// Loads a Parquet URL as the session's dataset view and returns the
/// resulting schema. Rejected URLs and scan failures come back as 400
/// with the reason as text.
#[allow(clippy::future_not_send)]
pub async fn load_dataset(
    state: web::Data<AppState>,
    body: web::Json<LoadDatasetRequest>,
) -> HttpResponse {
    let conn = state.conn.lock().expect("session mutex poisoned");

    match parquet::load_dataset(&conn, &body.url).and_then(|()| parquet::describe_dataset(&conn)) {
        Ok(schema) => HttpResponse::Ok().json(schema),
        Err(e) => {
            log::warn!("Failed to load dataset {}: {e}", body.url);
            HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// `GET /api/datasets/schema`
///
/// Returns the schema of the currently loaded dataset view.
#[allow(clippy::future_not_send)]
pub async fn schema(state: web::Data<AppState>) -> HttpResponse {
    let conn = state.conn.lock().expect("session mutex poisoned");

    match parquet::describe_dataset(&conn) {
        Ok(schema) => HttpResponse::Ok().json(schema),
        Err(e) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// `POST /api/query`
///
/// Executes ad-hoc SQL against the session. Engine failures are
/// surfaced as error text, never a crash.
#[allow(clippy::future_not_send)]
pub async fn query(state: web::Data<AppState>, body: web::Json<SqlQueryRequest>) -> HttpResponse {
    let sql = body.sql.trim();
    if sql.is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Please enter a valid SQL query." }));
    }

    let conn = state.conn.lock().expect("session mutex poisoned");

    match queries::run_query(&conn, sql) {
        Ok(result) => HttpResponse::Ok().json(ApiQueryResult::from(result)),
        Err(e) => {
            log::warn!("Query failed: {e}");
            HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// `POST /api/stats`
///
/// Parses the bounding box, fetches statistics from the remote API with
/// bounded retry, appends the record to `poly_stats`, and returns it.
#[allow(clippy::future_not_send)]
pub async fn fetch_stats(
    state: web::Data<AppState>,
    body: web::Json<BboxStatsRequest>,
) -> HttpResponse {
    let bbox = match BoundingBox::parse(&body.bbox) {
        Ok(bbox) => bbox,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": format!("Invalid bounding box: {e}") }));
        }
    };

    // Fetch before taking the lock; the guard must not be held across an
    // await.
    let record = match state.stats.fetch_bbox_stats(&bbox).await {
        Ok(record) => record,
        Err(e @ StatsError::Contract { .. }) => {
            log::error!("Stats API contract violation for bbox {bbox}: {e}");
            return HttpResponse::BadGateway()
                .json(serde_json::json!({ "error": e.to_string() }));
        }
        Err(e) => {
            log::warn!("Stats fetch failed for bbox {bbox}: {e}");
            return HttpResponse::BadGateway()
                .json(serde_json::json!({ "error": e.to_string() }));
        }
    };

    let inserted = {
        let conn = state.conn.lock().expect("session mutex poisoned");
        queries::insert_poly_stats(&conn, &record)
    };

    match inserted {
        Ok(()) => HttpResponse::Ok().json(record),
        Err(e) => {
            log::error!("Failed to persist stats record: {e}");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Failed to persist stats record" }))
        }
    }
}

/// `GET /api/stats`
///
/// Returns all persisted statistics records.
#[allow(clippy::future_not_send)]
pub async fn stats_history(state: web::Data<AppState>) -> HttpResponse {
    let conn = state.conn.lock().expect("session mutex poisoned");

    match queries::list_poly_stats(&conn) {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => {
            log::error!("Failed to query poly_stats: {e}");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Failed to query stats history" }))
        }
    }
}
