//! Point records shown on the map and their validation.

use std::fmt::{Display, Formatter};

use galileo_types::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PointMapError;

/// Point data shipped with the crate, as JSON.
pub const BUNDLED_POINTS: &str = include_str!("../data/points.json");

/// Identifier of a point record. The data file uses both numbers and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    /// Numeric id.
    Number(i64),
    /// Textual id.
    Text(String),
}

impl Display for PointId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PointId::Number(v) => write!(f, "{v}"),
            PointId::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for PointId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PointId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A single row of the point data file.
///
/// `coordinates` is kept as raw JSON, so a malformed row is still loaded and only rejected when
/// its position is requested with [`PointRecord::position`]. Rows without a usable `id` or `name`
/// are dropped by [`load_points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Record id.
    pub id: PointId,
    /// Display name.
    pub name: String,
    /// Expected to be `[longitude, latitude]`.
    #[serde(default)]
    pub coordinates: Value,
    /// Any other attributes of the record.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl PointRecord {
    /// Creates a record with the given raw coordinates value.
    pub fn new(id: impl Into<PointId>, name: impl Into<String>, coordinates: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinates,
            attributes: Map::new(),
        }
    }

    /// Validated position of the record.
    pub fn position(&self) -> Result<LonLat, PointMapError> {
        let Some(pair) = self.coordinates.as_array() else {
            return Err(PointMapError::InvalidCoordinates(format!(
                "point {} has no coordinate array",
                self.id
            )));
        };

        let [lon, lat] = pair.as_slice() else {
            return Err(PointMapError::InvalidCoordinates(format!(
                "point {} has {} coordinates instead of 2",
                self.id,
                pair.len()
            )));
        };

        let (Some(lon), Some(lat)) = (lon.as_f64(), lat.as_f64()) else {
            return Err(PointMapError::InvalidCoordinates(format!(
                "point {} has non-numeric coordinates {}",
                self.id, self.coordinates
            )));
        };

        LonLat::new(lon, lat)
    }
}

/// A validated `[longitude, latitude]` pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    lon: f64,
    lat: f64,
}

impl LonLat {
    /// Creates a new pair. Both values must be finite.
    pub fn new(lon: f64, lat: f64) -> Result<Self, PointMapError> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(PointMapError::InvalidCoordinates(format!(
                "[{lon}, {lat}] is not a pair of finite numbers"
            )));
        }

        Ok(Self { lon, lat })
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }
}

impl GeoPoint for LonLat {
    type Num = f64;

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Decodes a JSON array of point records.
///
/// Only the array itself is required. A row that does not decode into a [`PointRecord`], for
/// example one with a fractional or missing id, is skipped with a warning.
pub fn load_points(json: &str) -> Result<Vec<PointRecord>, PointMapError> {
    let rows: Vec<Value> = serde_json::from_str(json)?;
    let total = rows.len();

    let points: Vec<PointRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(point) => Some(point),
            Err(err) => {
                log::warn!("Skipping point record #{index}: {err}");
                None
            }
        })
        .collect();

    if points.len() < total {
        log::info!("Loaded {} of {total} point records", points.len());
    }

    Ok(points)
}

/// Points shipped with the crate.
pub fn bundled_points() -> Result<Vec<PointRecord>, PointMapError> {
    load_points(BUNDLED_POINTS)
}

/// Validated positions of `points`, skipping (and logging) the records that are not usable.
pub fn valid_positions<'a>(
    points: impl IntoIterator<Item = &'a PointRecord>,
) -> impl Iterator<Item = (&'a PointRecord, LonLat)> {
    points
        .into_iter()
        .filter_map(|point| match point.position() {
            Ok(position) => Some((point, position)),
            Err(err) => {
                log::warn!("Skipping point '{}': {err}", point.name);
                None
            }
        })
}
