//! Menu-driven workbench loop.
//!
//! Mirrors the browser flow in the terminal: dataset selection, schema
//! display, query execution, and bounding-box statistics. Every failure
//! prints as a user-facing message and returns to the menu; only I/O
//! errors from the prompts themselves abort the loop.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use parquet_atlas_cli_utils::MultiProgress;
use parquet_atlas_database::{db, parquet, queries};
use parquet_atlas_stats::StatsClient;
use parquet_atlas_stats_models::{BoundingBox, StatsRecord};

/// Rows printed per query result before eliding the rest.
const DISPLAY_ROW_LIMIT: usize = 50;

/// Column order used when rendering stored statistics records.
const STATS_COLUMNS: &[&str] = &[
    "population",
    "populatedAreaKm2",
    "osmBuildingsCount",
    "osmHighwayLengthKm",
    "buildingCount6Months",
    "highwayLength6MonthsKm",
];

/// Top-level workbench actions.
enum Action {
    RunCannedQuery,
    RunSql,
    FetchBboxStats,
    ShowStoredStats,
    SwitchDataset,
    Exit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::RunCannedQuery,
        Self::RunSql,
        Self::FetchBboxStats,
        Self::ShowStoredStats,
        Self::SwitchDataset,
        Self::Exit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::RunCannedQuery => "Run a canned query",
            Self::RunSql => "Enter ad-hoc SQL",
            Self::FetchBboxStats => "Fetch bounding-box stats",
            Self::ShowStoredStats => "Show stored stats",
            Self::SwitchDataset => "Switch dataset",
            Self::Exit => "Exit",
        }
    }
}

/// Runs the interactive workbench loop.
///
/// Opens the session database (from `db_path`, the environment, or the
/// default), ensures the `poly_stats` table, and enters the menu loop.
/// When `dataset_url` is given the first dataset prompt is skipped.
///
/// # Errors
///
/// Returns an error if the session database cannot be opened or an I/O
/// prompt fails.
pub async fn run(
    multi: &MultiProgress,
    db_path: Option<PathBuf>,
    dataset_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let conn = match db_path {
        Some(path) => db::open_file(&path)?,
        None => db::open_from_env()?,
    };
    queries::ensure_poly_stats(&conn)?;

    if let Err(e) = db::enable_remote_io(&conn) {
        log::warn!("Remote Parquet I/O unavailable, local paths only: {e}");
    }

    let stats = StatsClient::from_env()?;

    let mut loaded = match dataset_url {
        Some(url) => load_dataset(multi, &conn, &url),
        None => false,
    };

    loop {
        if !loaded {
            let Some(url) = choose_dataset()? else {
                println!("Goodbye.");
                return Ok(());
            };
            loaded = load_dataset(multi, &conn, &url);
            continue;
        }

        println!();
        let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
        let idx = Select::new()
            .with_prompt("Workbench")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::RunCannedQuery => handle_canned_query(&conn)?,
            Action::RunSql => handle_sql(&conn)?,
            Action::FetchBboxStats => handle_bbox_stats(multi, &conn, &stats).await?,
            Action::ShowStoredStats => handle_stored_stats(&conn),
            Action::SwitchDataset => loaded = false,
            Action::Exit => {
                println!("Goodbye.");
                return Ok(());
            }
        }
    }
}

/// Prompts for a dataset: a catalog entry, a custom URL, or quit.
///
/// Returns `None` when the user chooses to quit.
fn choose_dataset() -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut labels: Vec<&str> = parquet_atlas_catalog::DATASETS
        .iter()
        .map(|dataset| dataset.name)
        .collect();
    labels.push("Custom URL...");
    labels.push("Quit");

    let idx = Select::new()
        .with_prompt("Choose a Parquet dataset")
        .items(&labels)
        .default(0)
        .interact()?;

    if idx == labels.len() - 1 {
        return Ok(None);
    }

    if idx == labels.len() - 2 {
        let url: String = Input::new()
            .with_prompt("Parquet URL")
            .interact_text()?;
        return Ok(Some(url));
    }

    Ok(Some(
        parquet_atlas_catalog::DATASETS[idx].url.to_string(),
    ))
}

/// Loads `url` into the session view and prints the schema.
///
/// Returns whether the load succeeded; failures are printed, not
/// propagated, so the user can pick another dataset.
fn load_dataset(multi: &MultiProgress, conn: &duckdb::Connection, url: &str) -> bool {
    let bar = parquet_atlas_cli_utils::spinner(multi, "Loading Parquet data...");
    let result = parquet::load_dataset(conn, url).and_then(|()| parquet::describe_dataset(conn));
    bar.finish_and_clear();

    match result {
        Ok(schema) => {
            println!("Loaded {url}");
            println!();
            let columns = vec!["column".to_string(), "type".to_string()];
            let rows: Vec<Vec<serde_json::Value>> = schema
                .into_iter()
                .map(|column| {
                    vec![
                        serde_json::Value::String(column.name),
                        serde_json::Value::String(column.column_type),
                    ]
                })
                .collect();
            println!("{}", format_table(&columns, &rows));
            true
        }
        Err(e) => {
            println!("Could not load dataset: {e}");
            false
        }
    }
}

/// Picks a canned query and runs it.
fn handle_canned_query(conn: &duckdb::Connection) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = parquet_atlas_catalog::CANNED_QUERIES
        .iter()
        .map(|query| query.name)
        .collect();

    let idx = Select::new()
        .with_prompt("Canned query")
        .items(&labels)
        .default(0)
        .interact()?;

    run_and_print(conn, parquet_atlas_catalog::CANNED_QUERIES[idx].sql);
    Ok(())
}

/// Prompts for ad-hoc SQL and runs it.
fn handle_sql(conn: &duckdb::Connection) -> Result<(), Box<dyn std::error::Error>> {
    let sql: String = Input::new()
        .with_prompt("SQL")
        .allow_empty(true)
        .interact_text()?;

    if sql.trim().is_empty() {
        println!("Please enter a valid SQL query.");
        return Ok(());
    }

    run_and_print(conn, sql.trim());
    Ok(())
}

/// Runs `sql` and prints the result table or the engine's error text.
fn run_and_print(conn: &duckdb::Connection, sql: &str) {
    match queries::run_query(conn, sql) {
        Ok(result) => {
            let shown = result.rows.len().min(DISPLAY_ROW_LIMIT);
            println!("{}", format_table(&result.columns, &result.rows[..shown]));
            if result.rows.len() > shown {
                println!("... {} more rows", result.rows.len() - shown);
            }
            println!("{} rows", result.rows.len());
        }
        Err(e) => println!("Query failed: {e}"),
    }
}

/// Prompts for a bounding box, fetches statistics, and persists them.
async fn handle_bbox_stats(
    multi: &MultiProgress,
    conn: &duckdb::Connection,
    stats: &StatsClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt("Bounding box (minx,miny,maxx,maxy)")
        .interact_text()?;

    let bbox = match BoundingBox::parse(&input) {
        Ok(bbox) => bbox,
        Err(e) => {
            println!("Invalid bounding box: {e}");
            return Ok(());
        }
    };

    let bar = parquet_atlas_cli_utils::spinner(multi, "Fetching polygon statistics...");
    let fetched = stats.fetch_bbox_stats(&bbox).await;
    bar.finish_and_clear();

    match fetched {
        Ok(record) => {
            if let Err(e) = queries::insert_poly_stats(conn, &record) {
                println!("Fetched, but could not persist the record: {e}");
            }
            print_stats_record(&record);
        }
        Err(e) => println!("Stats fetch failed: {e}"),
    }

    Ok(())
}

/// Prints all persisted statistics records.
fn handle_stored_stats(conn: &duckdb::Connection) {
    match queries::list_poly_stats(conn) {
        Ok(records) if records.is_empty() => println!("No stats recorded yet."),
        Ok(records) => {
            let columns: Vec<String> = STATS_COLUMNS.iter().map(ToString::to_string).collect();
            let rows: Vec<Vec<serde_json::Value>> =
                records.iter().map(stats_record_row).collect();
            println!("{}", format_table(&columns, &rows));
        }
        Err(e) => println!("Could not read stored stats: {e}"),
    }
}

/// Prints one fetched record, field per line.
fn print_stats_record(record: &StatsRecord) {
    println!();
    for (name, value) in STATS_COLUMNS.iter().zip(stats_record_row(record)) {
        println!("  {name}: {}", cell_text(&value));
    }
}

/// Renders a [`StatsRecord`] as one table row in [`STATS_COLUMNS`] order.
fn stats_record_row(record: &StatsRecord) -> Vec<serde_json::Value> {
    vec![
        serde_json::json!(record.population),
        serde_json::json!(record.populated_area_km2),
        serde_json::json!(record.osm_buildings_count),
        serde_json::json!(record.osm_highway_length_km),
        serde_json::json!(record.building_count_6_months),
        serde_json::json!(record.highway_length_6_months_km),
    ]
}

/// Maximum rendered width of a single cell.
const CELL_WIDTH_LIMIT: usize = 60;

/// Renders one JSON cell as display text.
fn cell_text(value: &serde_json::Value) -> String {
    let text = match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if text.chars().count() > CELL_WIDTH_LIMIT {
        let mut truncated: String = text.chars().take(CELL_WIDTH_LIMIT - 3).collect();
        truncated.push_str("...");
        truncated
    } else {
        text
    }
}

/// Formats columns and rows as an aligned text table.
fn format_table(columns: &[String], rows: &[Vec<serde_json::Value>]) -> String {
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rendered {
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    for (idx, column) in columns.iter().enumerate() {
        out.push_str(&format!("{column:<width$}  ", width = widths[idx]));
    }
    out.push('\n');
    for (idx, _) in columns.iter().enumerate() {
        out.push_str(&"-".repeat(widths[idx]));
        out.push_str("  ");
    }
    for row in &rendered {
        out.push('\n');
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() {
                out.push_str(&format!("{cell:<width$}  ", width = widths[idx]));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_aligned_table() {
        let columns = vec!["dataset".to_string(), "count".to_string()];
        let rows = vec![
            vec![serde_json::json!("OpenStreetMap"), serde_json::json!(12)],
            vec![serde_json::json!("msft"), serde_json::json!(4)],
        ];

        let table = format_table(&columns, &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("dataset"));
        assert!(lines[1].starts_with("-------------"));
        assert!(lines[2].contains("OpenStreetMap"));
        assert!(lines[3].starts_with("msft"));
    }

    #[test]
    fn renders_null_and_truncates_long_cells() {
        assert_eq!(cell_text(&serde_json::Value::Null), "NULL");

        let long = "x".repeat(100);
        let rendered = cell_text(&serde_json::json!(long));
        assert_eq!(rendered.chars().count(), CELL_WIDTH_LIMIT);
        assert!(rendered.ends_with("..."));
    }

    #[test]
    fn stats_record_row_matches_column_order() {
        let record = StatsRecord {
            population: 7,
            populated_area_km2: 1.0,
            osm_buildings_count: 2,
            osm_highway_length_km: 3.0,
            building_count_6_months: 4,
            highway_length_6_months_km: 5.0,
        };
        let row = stats_record_row(&record);
        assert_eq!(row.len(), STATS_COLUMNS.len());
        assert_eq!(row[0], serde_json::json!(7));
        assert_eq!(row[5], serde_json::json!(5.0));
    }
}
