#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the parquet-atlas workbench.
//!
//! Serves the REST API the browser frontend drives: dataset catalog and
//! loading, schema inspection, ad-hoc SQL, and bounding-box statistics
//! fetch/history. The `DuckDB` session lives behind a `Mutex` — a single
//! logical writer per session, handed out per request.

mod handlers;
pub mod interactive;

use std::sync::Mutex;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use parquet_atlas_database::{db, queries};
use parquet_atlas_stats::StatsClient;

/// Shared application state.
pub struct AppState {
    /// `DuckDB` session connection. `duckdb::Connection` is `Send` but
    /// not `Sync`, so a `Mutex` is needed.
    pub conn: Mutex<duckdb::Connection>,
    /// Client for the remote polygon statistics API.
    pub stats: StatsClient,
}

/// Starts the parquet-atlas API server.
///
/// Opens the session database, ensures the `poly_stats` table exists,
/// enables remote Parquet I/O (best effort), builds the statistics
/// client from the environment, and starts the Actix-Web HTTP server.
/// This is a regular async function — the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the session database cannot be opened, the `poly_stats`
/// table cannot be created, or the statistics client cannot be built.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Opening session database...");
    let conn = db::open_from_env().expect("Failed to open session database");

    queries::ensure_poly_stats(&conn).expect("Failed to create poly_stats table");

    if let Err(e) = db::enable_remote_io(&conn) {
        log::warn!("Remote Parquet I/O unavailable, local paths only: {e}");
    }

    let stats = StatsClient::from_env().expect("Failed to build stats client");
    log::info!("Stats endpoint: {}", stats.endpoint());

    let state = web::Data::new(AppState {
        conn: Mutex::new(conn),
        stats,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/datasets", web::get().to(handlers::datasets))
                    .route("/datasets/load", web::post().to(handlers::load_dataset))
                    .route("/datasets/schema", web::get().to(handlers::schema))
                    .route("/queries", web::get().to(handlers::canned_queries))
                    .route("/query", web::post().to(handlers::query))
                    .route("/stats", web::post().to(handlers::fetch_stats))
                    .route("/stats", web::get().to(handlers::stats_history)),
            )
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
