//! Extent of a point set and the view that shows it.

use galileo_types::cartesian::{CartesianPoint2d, Point2};
use galileo_types::geo::impls::projection::WebMercator;
use galileo_types::geo::impls::GeoPoint2d;
use galileo_types::geo::{Datum, GeoPoint, NewGeoPoint, Projection};

use crate::data::{valid_positions, LonLat, PointRecord};
use crate::error::PointMapError;

/// Latitude at which Web Mercator y coordinate reaches the projection bounds.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

const METERS_PER_INCH: f64 = 0.0254;
const SCREEN_DPI: f64 = 96.0;

/// Axis-aligned rectangle in longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: LonLat,
    max: LonLat,
}

impl BoundingBox {
    /// South-west corner.
    pub fn min(&self) -> LonLat {
        self.min
    }

    /// North-east corner.
    pub fn max(&self) -> LonLat {
        self.max
    }

    /// `[[minLon, minLat], [maxLon, maxLat]]`.
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [
            [self.min.lon(), self.min.lat()],
            [self.max.lon(), self.max.lat()],
        ]
    }

    /// Returns true if the position is inside the box or on its border.
    pub fn contains(&self, position: &LonLat) -> bool {
        position.lon() >= self.min.lon()
            && position.lon() <= self.max.lon()
            && position.lat() >= self.min.lat()
            && position.lat() <= self.max.lat()
    }

    /// Smallest box containing all `positions`.
    pub fn from_positions(positions: impl IntoIterator<Item = LonLat>) -> Option<Self> {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let (mut min_lon, mut min_lat) = (first.lon(), first.lat());
        let (mut max_lon, mut max_lat) = (min_lon, min_lat);

        for position in iter {
            min_lon = min_lon.min(position.lon());
            min_lat = min_lat.min(position.lat());
            max_lon = max_lon.max(position.lon());
            max_lat = max_lat.max(position.lat());
        }

        Some(Self {
            min: LonLat::new(min_lon, min_lat).ok()?,
            max: LonLat::new(max_lon, max_lat).ok()?,
        })
    }
}

/// Computes the extent of all structurally valid records.
///
/// Records with malformed coordinates are skipped with a warning. Fails with
/// [`PointMapError::NoUsablePoints`] when nothing is left.
pub fn compute_bounds<'a>(
    points: impl IntoIterator<Item = &'a PointRecord>,
) -> Result<BoundingBox, PointMapError> {
    BoundingBox::from_positions(valid_positions(points).map(|(_, position)| position))
        .ok_or(PointMapError::NoUsablePoints)
}

/// Projection of the map: WGS84 positions to EPSG:3857 meters.
pub fn map_projection() -> WebMercator<GeoPoint2d, Point2> {
    WebMercator::new(Datum::WGS84)
}

/// Projects a geographic position into Web Mercator meters. Latitudes beyond the projection
/// bounds are clamped to [`MAX_MERCATOR_LAT`].
pub fn project(position: &LonLat) -> Result<Point2, PointMapError> {
    let lat = position.lat().clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    map_projection()
        .project(&GeoPoint2d::latlon(lat, position.lon()))
        .ok_or_else(|| {
            PointMapError::InvalidCoordinates(format!(
                "[{}, {}] cannot be projected",
                position.lon(),
                position.lat()
            ))
        })
}

/// Inverse of [`project`].
pub fn unproject(point: &Point2) -> Result<LonLat, PointMapError> {
    let position = map_projection().unproject(point).ok_or_else(|| {
        PointMapError::InvalidCoordinates(format!(
            "({}, {}) is outside of the projection",
            point.x(),
            point.y()
        ))
    })?;
    LonLat::new(position.lon(), position.lat())
}

/// Map resolution (projected meters per pixel) that displays the map at `1:scale` at the given
/// latitude on a 96 DPI screen.
pub fn scale_to_resolution(scale: f64, lat: f64) -> f64 {
    let ground_resolution = scale * METERS_PER_INCH / SCREEN_DPI;
    ground_resolution / lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians().cos()
}

/// Ground distance in meters covered by one pixel at the given latitude.
pub fn ground_resolution(resolution: f64, lat: f64) -> f64 {
    resolution * lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians().cos()
}

/// Center and resolution of a view showing a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFit {
    /// Center of the view.
    pub center: LonLat,
    /// Projected meters per pixel.
    pub resolution: f64,
}

/// Computes the view that shows `bbox` inside a `width`×`height` pixel viewport, keeping
/// `padding` pixels free on every side.
///
/// `min_resolution` limits how far the view zooms in, which matters for a box collapsed to a single
/// point. Returns `None` for an empty viewport.
pub fn fit_bounds(
    bbox: &BoundingBox,
    width: f64,
    height: f64,
    padding: f64,
    min_resolution: f64,
) -> Option<ViewFit> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }

    let min = project(&bbox.min()).ok()?;
    let max = project(&bbox.max()).ok()?;
    let center = Point2::new((min.x() + max.x()) / 2.0, (min.y() + max.y()) / 2.0);

    let available_width = (width - 2.0 * padding).max(1.0);
    let available_height = (height - 2.0 * padding).max(1.0);

    let resolution = ((max.x() - min.x()) / available_width)
        .max((max.y() - min.y()) / available_height)
        .max(min_resolution);

    Some(ViewFit {
        center: unproject(&center).ok()?,
        resolution,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn point(id: i64, coordinates: serde_json::Value) -> PointRecord {
        PointRecord::new(id, format!("P{id}"), coordinates)
    }

    #[test]
    fn two_points() {
        let points = [point(1, json!([30, 30])), point(2, json!([32, 28]))];
        let bbox = compute_bounds(&points).expect("valid points");
        assert_eq!(bbox.to_array(), [[30.0, 28.0], [32.0, 30.0]]);
    }

    #[test]
    fn non_numeric_point_is_skipped() {
        let points = [point(1, json!([30, 30])), point(2, json!(["x", 28]))];
        let bbox = compute_bounds(&points).expect("one valid point");
        assert_eq!(bbox.to_array(), [[30.0, 30.0], [30.0, 30.0]]);
    }

    #[test]
    fn only_malformed_points_are_excluded() {
        let points = [
            point(1, json!([10, -5])),
            point(2, json!([100])),
            point(3, json!(null)),
            point(4, json!(["a", "b"])),
            point(5, json!([-20, 40])),
            point(6, json!([500, 500, 500])),
        ];
        let bbox = compute_bounds(&points).expect("valid points");
        assert_eq!(bbox.to_array(), [[-20.0, -5.0], [10.0, 40.0]]);
    }

    #[test]
    fn nan_positions_never_reach_the_box() {
        let positions = [(1.0, 2.0), (f64::NAN, 50.0), (3.0, f64::NAN), (-1.0, 0.5)]
            .into_iter()
            .filter_map(|(lon, lat)| LonLat::new(lon, lat).ok());
        let bbox = BoundingBox::from_positions(positions).expect("valid positions");
        assert_eq!(bbox.to_array(), [[-1.0, 0.5], [1.0, 2.0]]);
    }

    #[test]
    fn empty_or_invalid_set_fails() {
        let empty: [PointRecord; 0] = [];
        assert_matches!(compute_bounds(&empty), Err(PointMapError::NoUsablePoints));

        let invalid = [point(1, json!("here")), point(2, json!([1]))];
        assert_matches!(compute_bounds(&invalid), Err(PointMapError::NoUsablePoints));
    }

    #[test]
    fn box_is_tight() {
        // Deterministic pseudo-random sample.
        let mut seed = 42u64;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 11) as f64 / (1u64 << 53) as f64
        };

        for _ in 0..20 {
            let positions: Vec<LonLat> = (0..25)
                .map(|_| {
                    LonLat::new(next() * 360.0 - 180.0, next() * 180.0 - 90.0).expect("finite")
                })
                .collect();
            let bbox = BoundingBox::from_positions(positions.iter().copied()).expect("non-empty");

            assert!(positions.iter().all(|p| bbox.contains(p)));
            assert!(positions.iter().any(|p| p.lon() == bbox.min().lon()));
            assert!(positions.iter().any(|p| p.lon() == bbox.max().lon()));
            assert!(positions.iter().any(|p| p.lat() == bbox.min().lat()));
            assert!(positions.iter().any(|p| p.lat() == bbox.max().lat()));
        }
    }

    #[test]
    fn projection_round_trip() {
        let position = LonLat::new(31.2243, 30.0459).expect("finite");
        let projected = project(&position).expect("projectable");
        assert_relative_eq!(projected.x(), 3_475_873.18, epsilon = 0.01);

        let back = unproject(&projected).expect("finite");
        assert_relative_eq!(back.lon(), position.lon(), epsilon = 1e-9);
        assert_relative_eq!(back.lat(), position.lat(), epsilon = 1e-9);
    }

    #[test]
    fn polar_positions_are_clamped() {
        let pole = LonLat::new(0.0, 90.0).expect("finite");
        let edge = LonLat::new(0.0, MAX_MERCATOR_LAT).expect("finite");
        let projected = project(&pole).expect("clamped");
        assert_relative_eq!(
            projected.y(),
            project(&edge).expect("projectable").y(),
            epsilon = 1e-6
        );
        assert_relative_eq!(projected.y(), 20_037_508.34, epsilon = 0.01);
    }

    #[test]
    fn fit_uses_limiting_dimension() {
        let bbox = BoundingBox::from_positions([
            LonLat::new(0.0, 0.0).expect("finite"),
            LonLat::new(1.0, 0.0).expect("finite"),
        ])
        .expect("non-empty");

        let fit = fit_bounds(&bbox, 1000.0, 500.0, 0.0, 0.1).expect("non-empty viewport");
        let width_m = Datum::WGS84.semimajor() * 1f64.to_radians();
        assert_relative_eq!(fit.resolution, width_m / 1000.0, epsilon = 1e-6);
        assert_relative_eq!(fit.center.lon(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(fit.center.lat(), 0.0, epsilon = 1e-9);

        let padded = fit_bounds(&bbox, 1000.0, 500.0, 50.0, 0.1).expect("non-empty viewport");
        assert_relative_eq!(padded.resolution, width_m / 900.0, epsilon = 1e-6);
    }

    #[test]
    fn fit_single_point_uses_min_resolution() {
        let bbox = BoundingBox::from_positions([LonLat::new(30.0, 30.0).expect("finite")])
            .expect("non-empty");
        let fit = fit_bounds(&bbox, 800.0, 600.0, 20.0, 2.5).expect("non-empty viewport");
        assert_eq!(fit.resolution, 2.5);
        assert_relative_eq!(fit.center.lat(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn fit_requires_viewport() {
        let bbox = BoundingBox::from_positions([LonLat::new(0.0, 0.0).expect("finite")])
            .expect("non-empty");
        assert!(fit_bounds(&bbox, 0.0, 600.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn locate_scale() {
        assert_relative_eq!(scale_to_resolution(1500.0, 0.0), 0.396875, epsilon = 1e-9);
        assert_relative_eq!(
            ground_resolution(scale_to_resolution(1500.0, 60.0), 60.0),
            0.396875,
            epsilon = 1e-9
        );
    }
}
