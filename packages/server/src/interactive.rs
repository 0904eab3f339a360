//! Interactive mode for the server.
//!
//! Prompts the user for the session database path, bind address, and
//! port before starting the server.

use dialoguer::{Confirm, Input};
use parquet_atlas_database::db;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Answers are handed to [`super::run_server`] through the environment
/// variables it reads (`ATLAS_DB_PATH`, `BIND_ADDR`, `PORT`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Parquet Atlas Server");
    println!();

    let db_path: String = Input::new()
        .with_prompt("Session database")
        .default(db::DEFAULT_DB_PATH.to_string())
        .interact_text()
        .unwrap_or_else(|_| db::DEFAULT_DB_PATH.to_string());

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    // SAFETY: We are single-threaded at this point (before server starts)
    // and these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var(db::DB_PATH_ENV, &db_path);
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
