#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dataset registry and canned query templates.
//!
//! The registry lists known cloud-hosted `GeoParquet` exports so users can
//! pick a dataset by name instead of pasting object-store URLs. Canned
//! queries are starting points against the loaded `parquet_data` view;
//! users are free to edit them before running.

use serde::Serialize;

/// A named cloud-hosted Parquet dataset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Dataset {
    /// Human-readable name shown in pickers.
    pub name: &'static str,
    /// Object-store URL scanned by the engine.
    pub url: &'static str,
}

/// Known building-footprint exports, by country.
pub const DATASETS: &[Dataset] = &[
    Dataset {
        name: "Argentina Buildings",
        url: "s3://staging-raw-data-api/default/overture/2024-05-16-beta.0/argentina/parquet/buildings.geo.parquet",
    },
    Dataset {
        name: "Indonesia Buildings",
        url: "s3://staging-raw-data-api/default/overture/2024-05-16-beta.0/indonesia/parquet/buildings.geo.parquet",
    },
    Dataset {
        name: "Liberia Buildings",
        url: "s3://staging-raw-data-api/default/overture/2024-05-16-beta.0/liberia/parquet/buildings.geo.parquet",
    },
    Dataset {
        name: "Nigeria Buildings",
        url: "s3://staging-raw-data-api/default/overture/2024-05-16-beta.0/nigeria/parquet/buildings.geo.parquet",
    },
    Dataset {
        name: "Kenya Buildings",
        url: "s3://staging-raw-data-api/default/overture/2024-05-16-beta.0/kenya/parquet/buildings.geo.parquet",
    },
    Dataset {
        name: "Malawi Buildings",
        url: "s3://staging-raw-data-api/default/overture/2024-05-16-beta.0/malawi/parquet/buildings.geo.parquet",
    },
    Dataset {
        name: "Nepal Buildings",
        url: "s3://staging-raw-data-api/default/overture/2024-05-16-beta.0/nepal/parquet/buildings.geo.parquet",
    },
];

/// A named SQL starting point against the loaded dataset view.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CannedQuery {
    /// Name shown in pickers.
    pub name: &'static str,
    /// The SQL template.
    pub sql: &'static str,
}

/// Canned queries offered by the workbench.
pub const CANNED_QUERIES: &[CannedQuery] = &[
    CannedQuery {
        name: "Preview",
        sql: "SELECT * FROM parquet_data LIMIT 10",
    },
    CannedQuery {
        name: "Stats by source dataset",
        sql: "WITH unnested_data AS (
    SELECT
        unnest(sources).dataset AS dataset,
        unnest(sources).confidence AS confidence
    FROM
        parquet_data
),
aggregated_data AS (
    SELECT
        dataset,
        COUNT(*) AS count
    FROM
        unnested_data
    GROUP BY
        dataset
),
total_count AS (
    SELECT
        COUNT(*) AS total
    FROM
        unnested_data
)
SELECT
    ad.dataset,
    ad.count,
    (ad.count * 100.0 / tc.total) AS percentage
FROM
    aggregated_data ad,
    total_count tc",
    },
];

/// Looks up a dataset by its display name.
#[must_use]
pub fn find_dataset(name: &str) -> Option<&'static Dataset> {
    DATASETS.iter().find(|dataset| dataset.name == name)
}

/// Looks up a canned query by its display name.
#[must_use]
pub fn find_canned_query(name: &str) -> Option<&'static CannedQuery> {
    CANNED_QUERIES.iter().find(|query| query.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_datasets_by_name() {
        let dataset = find_dataset("Kenya Buildings").unwrap();
        assert!(dataset.url.contains("/kenya/"));
        assert!(find_dataset("Atlantis Buildings").is_none());
    }

    #[test]
    fn every_dataset_is_an_s3_parquet_export() {
        for dataset in DATASETS {
            assert!(dataset.url.starts_with("s3://"), "{}", dataset.name);
            assert!(dataset.url.ends_with(".parquet"), "{}", dataset.name);
        }
    }

    #[test]
    fn canned_queries_target_the_dataset_view() {
        for query in CANNED_QUERIES {
            assert!(query.sql.contains("parquet_data"), "{}", query.name);
        }
        assert!(find_canned_query("Preview").is_some());
    }
}
