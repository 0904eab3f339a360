#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Client for the remote polygon statistics API.
//!
//! Given a [`BoundingBox`], the [`StatsClient`] builds a `GeoJSON`
//! polygon, POSTs it to the statistics endpoint with bounded retry, and
//! extracts the normalized [`StatsRecord`] from the response. The client
//! has no side effects; persisting the record is the caller's job.

pub mod retry;

use parquet_atlas_stats_models::{BoundingBox, StatsRecord};

/// Environment variable overriding the statistics endpoint URL.
pub const ENDPOINT_ENV: &str = "STATS_ENDPOINT";

/// Environment variable holding the optional `access-token` header value.
pub const ACCESS_TOKEN_ENV: &str = "STATS_ACCESS_TOKEN";

/// Production statistics endpoint used when [`ENDPOINT_ENV`] is unset.
pub const DEFAULT_ENDPOINT: &str = "https://api-prod.raw-data.hotosm.org/v1/stats/polygon/";

/// Per-request timeout. A hung upstream counts as a failed attempt.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Errors that can occur while fetching polygon statistics.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// HTTP request failed at the network layer.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("stats API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The response body was missing a required field, or the field had
    /// the wrong type. Never retried and never defaulted.
    #[error("stats response missing required field `{field}`")]
    Contract {
        /// Name of the missing or mistyped field.
        field: String,
    },

    /// Every attempt failed; the retry bound is exhausted.
    #[error("stats request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Description of the last failure.
        last: String,
    },
}

impl StatsError {
    /// Whether this failure is network-layer and worth another attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status(_))
    }
}

/// Client for the remote polygon statistics API.
pub struct StatsClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl StatsClient {
    /// Creates a client for the given endpoint, optionally sending an
    /// `access-token` header with every request.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, StatsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token,
        })
    }

    /// Creates a client from process configuration: [`ENDPOINT_ENV`]
    /// (falling back to [`DEFAULT_ENDPOINT`]) and [`ACCESS_TOKEN_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn from_env() -> Result<Self, StatsError> {
        let endpoint =
            std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let access_token = std::env::var(ACCESS_TOKEN_ENV).ok();

        Self::new(endpoint, access_token)
    }

    /// Returns the endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches statistics for the region covered by `bbox`.
    ///
    /// POSTs `{"geometry": <GeoJSON Polygon>}` to the endpoint with
    /// bounded retry, then extracts the six statistics fields from the
    /// `raw` object of the response.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::RetriesExhausted`] once the attempt bound is
    /// spent, or [`StatsError::Contract`] if a successful response is
    /// missing a required field.
    pub async fn fetch_bbox_stats(&self, bbox: &BoundingBox) -> Result<StatsRecord, StatsError> {
        let body = serde_json::json!({ "geometry": bbox.to_polygon() });

        let response = retry::post_json("polygon stats", || {
            let mut request = self.client.post(&self.endpoint).json(&body);
            if let Some(token) = &self.access_token {
                request = request.header("access-token", token.as_str());
            }
            request
        })
        .await?;

        parse_stats_record(&response)
    }
}

/// Extracts a [`StatsRecord`] from a statistics API response body.
///
/// The six fields live under the top-level `raw` key. A missing or
/// mistyped field is a data-contract failure; no defaults are substituted.
///
/// # Errors
///
/// Returns [`StatsError::Contract`] naming the offending field.
pub fn parse_stats_record(body: &serde_json::Value) -> Result<StatsRecord, StatsError> {
    let raw = body.get("raw").ok_or_else(|| StatsError::Contract {
        field: "raw".to_string(),
    })?;

    Ok(StatsRecord {
        population: require_i64(raw, "population")?,
        populated_area_km2: require_f64(raw, "populatedAreaKm2")?,
        osm_buildings_count: require_i64(raw, "osmBuildingsCount")?,
        osm_highway_length_km: require_f64(raw, "osmHighwayLengthKm")?,
        building_count_6_months: require_i64(raw, "buildingCount6Months")?,
        highway_length_6_months_km: require_f64(raw, "highwayLength6MonthsKm")?,
    })
}

fn require_i64(raw: &serde_json::Value, field: &str) -> Result<i64, StatsError> {
    raw.get(field)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| StatsError::Contract {
            field: field.to_string(),
        })
}

fn require_f64(raw: &serde_json::Value, field: &str) -> Result<f64, StatsError> {
    raw.get(field)
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| StatsError::Contract {
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_body() -> serde_json::Value {
        serde_json::json!({
            "raw": {
                "population": 1_202_420,
                "populatedAreaKm2": 142.5,
                "osmBuildingsCount": 498_123,
                "osmHighwayLengthKm": 3_214.75,
                "buildingCount6Months": 12_040,
                "highwayLength6MonthsKm": 88.25,
            },
            "meta": { "indicators": "..." },
        })
    }

    #[test]
    fn parses_complete_response() {
        let record = parse_stats_record(&response_body()).unwrap();
        assert_eq!(record.population, 1_202_420);
        assert!((record.populated_area_km2 - 142.5).abs() < 1e-9);
        assert_eq!(record.osm_buildings_count, 498_123);
        assert!((record.osm_highway_length_km - 3_214.75).abs() < 1e-9);
        assert_eq!(record.building_count_6_months, 12_040);
        assert!((record.highway_length_6_months_km - 88.25).abs() < 1e-9);
    }

    #[test]
    fn accepts_integral_floats_for_float_fields() {
        let mut body = response_body();
        body["raw"]["populatedAreaKm2"] = serde_json::json!(142);
        let record = parse_stats_record(&body).unwrap();
        assert!((record.populated_area_km2 - 142.0).abs() < 1e-9);
    }

    #[test]
    fn missing_raw_key_is_contract_failure() {
        let err = parse_stats_record(&serde_json::json!({ "meta": {} })).unwrap_err();
        assert!(matches!(err, StatsError::Contract { ref field } if field == "raw"));
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_field_is_contract_failure() {
        let mut body = response_body();
        body["raw"]
            .as_object_mut()
            .unwrap()
            .remove("osmHighwayLengthKm");
        let err = parse_stats_record(&body).unwrap_err();
        assert!(matches!(err, StatsError::Contract { ref field } if field == "osmHighwayLengthKm"));
    }

    #[test]
    fn mistyped_field_is_contract_failure() {
        let mut body = response_body();
        body["raw"]["population"] = serde_json::json!("lots");
        let err = parse_stats_record(&body).unwrap_err();
        assert!(matches!(err, StatsError::Contract { ref field } if field == "population"));
    }
}
