//! Core value types: validated points, bounding boxes, and compass directions.
//!
//! All types here are immutable value objects. A [`Point`] or [`BoundingBox`]
//! is validated on construction and never mutated in place.

use crate::error::{GeocellError, Result};
use serde::{Deserialize, Serialize};

/// A geographic point in degrees.
///
/// Construction fails when latitude is outside `[-90, 90]` or longitude is
/// outside `[-180, 180]`; coordinates are never silently clamped.
///
/// Note the argument order: `Point::new(lat, lon)`. The `geo` crate uses the
/// opposite (x = longitude, y = latitude) order; use [`Point::to_geo`] and
/// [`Point::try_from`] for conversions.
///
/// # Examples
///
/// ```rust
/// use geocell::Point;
///
/// let flatiron = Point::new(40.7407092, -73.9894039)?;
/// assert_eq!(flatiron.lat(), 40.7407092);
/// assert!(Point::new(91.0, 0.0).is_err());
/// # Ok::<(), geocell::GeocellError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawPoint> for Point {
    type Error = GeocellError;

    fn try_from(raw: RawPoint) -> Result<Self> {
        Point::new(raw.lat, raw.lon)
    }
}

impl Point {
    /// Create a new point from latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GeocellError::InvalidLatitude`] or
    /// [`GeocellError::InvalidLongitude`] when a coordinate is out of range.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeocellError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeocellError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude).
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

impl TryFrom<geo::Point<f64>> for Point {
    type Error = GeocellError;

    fn try_from(point: geo::Point<f64>) -> Result<Self> {
        Point::new(point.y(), point.x())
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        point.to_geo()
    }
}

/// A rectangular latitude/longitude region.
///
/// Constructed from two corner latitudes and longitudes. Latitudes are
/// auto-ordered (the greater becomes north), but longitudes are kept exactly
/// as given: a box with `east < west` encodes a region crossing the
/// antimeridian and is deliberately not reordered.
///
/// # Examples
///
/// ```rust
/// use geocell::BoundingBox;
///
/// let bbox = BoundingBox::new(40.8, -73.9, 40.7, -74.0)?;
/// assert_eq!(bbox.north(), 40.8);
/// assert_eq!(bbox.west(), -74.0);
///
/// // Latitudes given in the wrong order are swapped.
/// let swapped = BoundingBox::new(40.7, -73.9, 40.8, -74.0)?;
/// assert_eq!(swapped.north(), 40.8);
/// # Ok::<(), geocell::GeocellError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox", into = "RawBoundingBox")]
pub struct BoundingBox {
    north_east: Point,
    south_west: Point,
}

#[derive(Serialize, Deserialize)]
struct RawBoundingBox {
    north: f64,
    east: f64,
    south: f64,
    west: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = GeocellError;

    fn try_from(raw: RawBoundingBox) -> Result<Self> {
        BoundingBox::new(raw.north, raw.east, raw.south, raw.west)
    }
}

impl From<BoundingBox> for RawBoundingBox {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            north: bbox.north(),
            east: bbox.east(),
            south: bbox.south(),
            west: bbox.west(),
        }
    }
}

impl BoundingBox {
    /// Create a bounding box from corner coordinates in degrees.
    ///
    /// # Errors
    ///
    /// Returns an error when any coordinate is out of range.
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> Result<Self> {
        let (north, south) = if south > north {
            (south, north)
        } else {
            (north, south)
        };

        Ok(Self {
            north_east: Point::new(north, east)?,
            south_west: Point::new(south, west)?,
        })
    }

    /// The full latitude/longitude extent, the ancestor region of every
    /// geocell.
    pub fn full() -> Self {
        Self {
            north_east: Point {
                lat: 90.0,
                lon: 180.0,
            },
            south_west: Point {
                lat: -90.0,
                lon: -180.0,
            },
        }
    }

    /// Northern latitude in degrees.
    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    /// Southern latitude in degrees.
    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    /// Eastern longitude in degrees.
    pub fn east(&self) -> f64 {
        self.north_east.lon
    }

    /// Western longitude in degrees.
    pub fn west(&self) -> f64 {
        self.south_west.lon
    }

    /// The north-east corner point.
    pub fn north_east(&self) -> Point {
        self.north_east
    }

    /// The south-west corner point.
    pub fn south_west(&self) -> Point {
        self.south_west
    }

    /// Whether the point lies inside the box (edges inclusive).
    ///
    /// Uses plain coordinate comparison; an antimeridian-crossing box
    /// (`east < west`) contains nothing under this test.
    pub fn contains(&self, point: &Point) -> bool {
        point.lat >= self.south()
            && point.lat <= self.north()
            && point.lon >= self.west()
            && point.lon <= self.east()
    }

    /// Convert to a `geo::Rect`, or `None` when the box crosses the
    /// antimeridian (`east < west`) and cannot be represented as a planar
    /// rectangle.
    pub fn to_rect(&self) -> Option<geo::Rect<f64>> {
        if self.east() < self.west() {
            return None;
        }
        Some(geo::Rect::new(
            geo::coord! { x: self.west(), y: self.south() },
            geo::coord! { x: self.east(), y: self.north() },
        ))
    }
}

/// One of the 8 compass directions, expressed as a unit offset on the
/// geocell grid: x grows east, y grows north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Direction {
    /// All 8 directions, in NW, N, NE, E, SE, S, SW, W order.
    pub const ALL: [Direction; 8] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
    ];

    /// Horizontal component: -1 west, 0 neutral, 1 east.
    pub fn dx(self) -> i32 {
        match self {
            Direction::NorthWest | Direction::SouthWest | Direction::West => -1,
            Direction::North | Direction::South => 0,
            Direction::NorthEast | Direction::SouthEast | Direction::East => 1,
        }
    }

    /// Vertical component: -1 south, 0 neutral, 1 north.
    pub fn dy(self) -> i32 {
        match self {
            Direction::NorthWest | Direction::North | Direction::NorthEast => 1,
            Direction::West | Direction::East => 0,
            Direction::SouthWest | Direction::South | Direction::SouthEast => -1,
        }
    }

    /// Whether this direction moves only along the north/south axis.
    pub fn is_vertical(self) -> bool {
        self.dx() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_validation() {
        assert!(Point::new(40.7, -74.0).is_ok());
        assert!(Point::new(90.0, 180.0).is_ok());
        assert!(Point::new(-90.0, -180.0).is_ok());

        assert!(matches!(
            Point::new(90.5, 0.0),
            Err(GeocellError::InvalidLatitude(_))
        ));
        assert!(matches!(
            Point::new(0.0, -180.5),
            Err(GeocellError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_point_geo_conversion() {
        let point = Point::new(40.7128, -74.0060).unwrap();
        let geo_point = point.to_geo();
        assert_eq!(geo_point.x(), -74.0060);
        assert_eq!(geo_point.y(), 40.7128);

        let back = Point::try_from(geo_point).unwrap();
        assert_eq!(back, point);

        // Out-of-range geo points are rejected.
        assert!(Point::try_from(geo::Point::new(0.0, 123.0)).is_err());
    }

    #[test]
    fn test_point_deserialization_validates() {
        let ok: Point = serde_json::from_str(r#"{"lat": 40.7, "lon": -74.0}"#).unwrap();
        assert_eq!(ok.lat(), 40.7);

        let bad: std::result::Result<Point, _> =
            serde_json::from_str(r#"{"lat": 95.0, "lon": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_bounding_box_orders_latitudes() {
        let bbox = BoundingBox::new(40.7, -73.9, 40.8, -74.0).unwrap();
        assert_eq!(bbox.north(), 40.8);
        assert_eq!(bbox.south(), 40.7);
    }

    #[test]
    fn test_bounding_box_preserves_longitudes() {
        // Antimeridian-crossing box: east < west stays as given.
        let bbox = BoundingBox::new(10.0, -170.0, -10.0, 170.0).unwrap();
        assert_eq!(bbox.east(), -170.0);
        assert_eq!(bbox.west(), 170.0);
        assert!(bbox.to_rect().is_none());
    }

    #[test]
    fn test_bounding_box_contains() {
        let bbox = BoundingBox::new(40.8, -73.9, 40.7, -74.0).unwrap();
        assert!(bbox.contains(&Point::new(40.75, -73.95).unwrap()));
        assert!(!bbox.contains(&Point::new(40.75, -73.85).unwrap()));
        assert!(!bbox.contains(&Point::new(40.65, -73.95).unwrap()));
    }

    #[test]
    fn test_bounding_box_full() {
        let full = BoundingBox::full();
        assert_eq!(full.north(), 90.0);
        assert_eq!(full.south(), -90.0);
        assert_eq!(full.east(), 180.0);
        assert_eq!(full.west(), -180.0);
    }

    #[test]
    fn test_bounding_box_serde_round_trip() {
        let bbox = BoundingBox::new(40.8, -73.9, 40.7, -74.0).unwrap();
        let json = serde_json::to_string(&bbox).unwrap();
        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn test_direction_components() {
        assert_eq!(Direction::North.dx(), 0);
        assert_eq!(Direction::North.dy(), 1);
        assert_eq!(Direction::SouthWest.dx(), -1);
        assert_eq!(Direction::SouthWest.dy(), -1);
        assert!(Direction::South.is_vertical());
        assert!(!Direction::East.is_vertical());

        for dir in Direction::ALL {
            assert!(dir.dx() != 0 || dir.dy() != 0);
        }
    }
}
