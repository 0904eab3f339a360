#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive terminal workbench for parquet-atlas.
//!
//! Guides the user through picking a cloud-hosted Parquet dataset,
//! loading it into the embedded `DuckDB` session, inspecting its schema,
//! running canned or ad-hoc SQL, and fetching bounding-box statistics
//! from the remote API.
//!
//! Uses `indicatif-log-bridge` (via [`parquet_atlas_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod interactive;

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the workbench.
#[derive(Parser)]
#[command(
    name = "parquet-atlas",
    about = "Interactive workbench for cloud-hosted Parquet datasets"
)]
struct Args {
    /// Session database file (defaults to `ATLAS_DB_PATH` or data/atlas.duckdb).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Dataset URL to load immediately instead of prompting.
    #[arg(long)]
    dataset_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let multi = parquet_atlas_cli_utils::init_logger();

    println!("Parquet Atlas Workbench");
    println!();

    interactive::run(&multi, args.db_path, args.dataset_url).await
}
