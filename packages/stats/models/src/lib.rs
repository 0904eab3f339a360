#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bounding box and statistics record types.
//!
//! These are the shapes shared between the statistics fetcher, the
//! database layer, and the API surface: a geographic [`BoundingBox`]
//! parsed from user input, and the normalized [`StatsRecord`] returned
//! by the remote statistics service.

use serde::{Deserialize, Serialize};

/// Errors from parsing a `"minx,miny,maxx,maxy"` bounding box string.
#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    /// The input did not contain exactly four comma-separated values.
    #[error("expected 4 comma-separated values, found {0}")]
    FieldCount(usize),

    /// One of the values was not a valid floating-point number.
    #[error("invalid coordinate `{0}`")]
    Coordinate(String),
}

/// An axis-aligned geographic bounding box in WGS84 coordinates.
///
/// `min_x <= max_x` and `min_y <= max_y` hold by convention only; the
/// remote statistics service is the arbiter of what regions it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub min_x: f64,
    /// Southern latitude boundary.
    pub min_y: f64,
    /// Eastern longitude boundary.
    pub max_x: f64,
    /// Northern latitude boundary.
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parses a `"minx,miny,maxx,maxy"` string. Surrounding whitespace
    /// around each value is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`BboxParseError`] if the input does not have exactly four
    /// fields or any field is not a valid float.
    pub fn parse(s: &str) -> Result<Self, BboxParseError> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 4 {
            return Err(BboxParseError::FieldCount(fields.len()));
        }

        let mut values = [0.0_f64; 4];
        for (i, field) in fields.iter().enumerate() {
            values[i] = field
                .trim()
                .parse()
                .map_err(|_| BboxParseError::Coordinate((*field).trim().to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Returns the closed polygon ring for this box.
    ///
    /// Corner order: `(min_x,min_y), (min_x,max_y), (max_x,max_y),
    /// (max_x,min_y), (min_x,min_y)` — five positions, the last repeating
    /// the first.
    #[must_use]
    pub fn ring(&self) -> Vec<Vec<f64>> {
        vec![
            vec![self.min_x, self.min_y],
            vec![self.min_x, self.max_y],
            vec![self.max_x, self.max_y],
            vec![self.max_x, self.min_y],
            vec![self.min_x, self.min_y],
        ]
    }

    /// Converts the box into a `GeoJSON` polygon geometry.
    #[must_use]
    pub fn to_polygon(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Polygon(vec![self.ring()]))
    }
}

impl std::str::FromStr for BoundingBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Normalized statistics for one polygon region, as produced by the
/// remote statistics API.
///
/// Field names serialize in camelCase to match the service's wire
/// contract. Records are append-only: once persisted they are never
/// updated or deleted in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    /// Estimated population inside the region.
    pub population: i64,
    /// Populated area in square kilometres.
    pub populated_area_km2: f64,
    /// Total OSM building count.
    pub osm_buildings_count: i64,
    /// Total OSM highway length in kilometres.
    pub osm_highway_length_km: f64,
    /// Buildings added or edited in the last six months.
    pub building_count_6_months: i64,
    /// Highway length added or edited in the last six months, km.
    pub highway_length_6_months_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_bbox() {
        let bbox = BoundingBox::parse("0,0,1,1").unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn parses_bbox_with_whitespace_and_negatives() {
        let bbox = BoundingBox::parse(" -77.12 , 38.79, -76.90 , 39.00 ").unwrap();
        assert!((bbox.min_x - -77.12).abs() < 1e-9);
        assert!((bbox.min_y - 38.79).abs() < 1e-9);
        assert!((bbox.max_x - -76.90).abs() < 1e-9);
        assert!((bbox.max_y - 39.00).abs() < 1e-9);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(matches!(
            BoundingBox::parse("1,2,3"),
            Err(BboxParseError::FieldCount(3))
        ));
        assert!(matches!(
            BoundingBox::parse("1,2,3,4,5"),
            Err(BboxParseError::FieldCount(5))
        ));
        assert!(matches!(
            BoundingBox::parse(""),
            Err(BboxParseError::FieldCount(1))
        ));
    }

    #[test]
    fn rejects_non_numeric_coordinate() {
        let err = BoundingBox::parse("0,zero,1,1").unwrap_err();
        assert!(matches!(err, BboxParseError::Coordinate(ref v) if v == "zero"));
    }

    #[test]
    fn ring_is_closed_with_five_points() {
        let ring = BoundingBox::parse("0,0,1,1").unwrap().ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(
            ring,
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 1.0],
                vec![1.0, 0.0],
                vec![0.0, 0.0],
            ]
        );
    }

    #[test]
    fn ring_closure_holds_for_arbitrary_boxes() {
        for input in ["-10.5,2.25,3.75,8.5", "100,-45,101,-44", "0,0,0,0"] {
            let ring = BoundingBox::parse(input).unwrap().ring();
            assert_eq!(ring.len(), 5);
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn polygon_serializes_as_geojson() {
        let geometry = BoundingBox::new(0.0, 0.0, 1.0, 1.0).to_polygon();
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["type"], "Polygon");
        assert_eq!(json["coordinates"][0].as_array().unwrap().len(), 5);
    }

    #[test]
    fn stats_record_uses_camel_case_keys() {
        let record = StatsRecord {
            population: 42,
            populated_area_km2: 1.5,
            osm_buildings_count: 10,
            osm_highway_length_km: 2.25,
            building_count_6_months: 3,
            highway_length_6_months_km: 0.5,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["population"], 42);
        assert_eq!(json["populatedAreaKm2"], 1.5);
        assert_eq!(json["osmBuildingsCount"], 10);
        assert_eq!(json["osmHighwayLengthKm"], 2.25);
        assert_eq!(json["buildingCount6Months"], 3);
        assert_eq!(json["highwayLength6MonthsKm"], 0.5);
    }
}
