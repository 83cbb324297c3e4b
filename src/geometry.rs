//! Spherical distance math used by the cell selector and the proximity
//! engine's termination bounds.

use crate::cell::Geocell;
use crate::types::{BoundingBox, Direction, Point};

/// Earth radius in meters, as used by the great-circle distance.
pub const RADIUS: f64 = 6_378_135.0;

/// Earth radius in miles, as used by [`bounding_box_from_distance`].
pub const RADIUS_MI: f64 = 3963.2;

/// Calculates the great-circle distance between two points in meters, using
/// the spherical law of cosines.
///
/// # Examples
///
/// ```rust
/// use geocell::{Point, geometry::distance};
///
/// let flatiron = Point::new(40.7407092, -73.9894039)?;
/// let outback = Point::new(40.7425610, -73.9922670)?;
/// let d = distance(&flatiron, &outback);
/// assert!(d > 300.0 && d < 350.0);
/// # Ok::<(), geocell::GeocellError>(())
/// ```
pub fn distance(p1: &Point, p2: &Point) -> f64 {
    let p1lat = p1.lat().to_radians();
    let p1lon = p1.lon().to_radians();
    let p2lat = p2.lat().to_radians();
    let p2lon = p2.lon().to_radians();

    // Clamp against rounding so identical points yield 0 instead of NaN.
    let cosine = (p1lat.sin() * p2lat.sin()
        + p1lat.cos() * p2lat.cos() * (p2lon - p1lon).cos())
    .clamp(-1.0, 1.0);
    RADIUS * cosine.acos()
}

/// Returns the shortest distance between a point and a geocell's rectangle,
/// in meters.
///
/// When the point lies within both coordinate spans the nearest edge wins;
/// within one span, the nearest of the two parallel edges; within neither,
/// the nearest of the four corners. The corner branch is a nearest-corner
/// approximation rather than a true nearest-point-on-rectangle distance and
/// is preserved as such: downstream search bounds were tuned against it.
pub fn point_distance(cell: &Geocell, point: &Point) -> f64 {
    let bbox = cell.bounding_box();

    let between_w_e = bbox.west() <= point.lon() && point.lon() <= bbox.east();
    let between_n_s = bbox.south() <= point.lat() && point.lat() <= bbox.north();

    let to = |lat: f64, lon: f64| distance(point, &point_on_extent(lat, lon));

    match (between_w_e, between_n_s) {
        (true, true) => {
            // Inside the geocell: nearest of the four edges.
            to(bbox.south(), point.lon())
                .min(to(bbox.north(), point.lon()))
                .min(to(point.lat(), bbox.east()).min(to(point.lat(), bbox.west())))
        }
        (true, false) => to(bbox.south(), point.lon()).min(to(bbox.north(), point.lon())),
        (false, true) => to(point.lat(), bbox.east()).min(to(point.lat(), bbox.west())),
        (false, false) => to(bbox.south(), bbox.east())
            .min(to(bbox.north(), bbox.east()))
            .min(to(bbox.south(), bbox.west()).min(to(bbox.north(), bbox.west()))),
    }
}

/// Returns the four edges of the rectangular region containing all of the
/// given geocells, paired with their distances from the given point and
/// sorted ascending by distance.
///
/// Each edge is measured as an infinite line through its coordinate. The
/// containing region is built from per-side maxima of the individual cell
/// boxes; callers must pass same-resolution cells forming a rectangle, or
/// the region is not a true union box.
pub fn distance_sorted_edges(cells: &[Geocell], point: &Point) -> Vec<(Direction, f64)> {
    debug_assert!(!cells.is_empty());
    let boxes: Vec<BoundingBox> = cells.iter().map(Geocell::bounding_box).collect();

    let max_north = fold_max(boxes.iter().map(BoundingBox::north));
    let max_east = fold_max(boxes.iter().map(BoundingBox::east));
    let max_south = fold_max(boxes.iter().map(BoundingBox::south));
    let max_west = fold_max(boxes.iter().map(BoundingBox::west));

    let mut edges = vec![
        (
            Direction::South,
            distance(&point_on_extent(max_south, point.lon()), point),
        ),
        (
            Direction::North,
            distance(&point_on_extent(max_north, point.lon()), point),
        ),
        (
            Direction::West,
            distance(&point_on_extent(point.lat(), max_west), point),
        ),
        (
            Direction::East,
            distance(&point_on_extent(point.lat(), max_east), point),
        ),
    ];
    edges.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    edges
}

/// Given a point and a distance in miles, creates a bounding box that
/// encompasses the spherical cap of that radius.
///
/// When the cap would contain a pole, the longitude span becomes the full
/// [-180, 180] range and latitude is clamped at the pole.
pub fn bounding_box_from_distance(point: &Point, distance_mi: f64) -> BoundingBox {
    const MIN_LAT: f64 = -std::f64::consts::FRAC_PI_2;
    const MAX_LAT: f64 = std::f64::consts::FRAC_PI_2;
    const MIN_LON: f64 = -std::f64::consts::PI;
    const MAX_LON: f64 = std::f64::consts::PI;
    const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

    let rad_dist = distance_mi / RADIUS_MI;
    let rad_lat = point.lat().to_radians();
    let rad_lon = point.lon().to_radians();

    let mut min_lat = rad_lat - rad_dist;
    let mut max_lat = rad_lat + rad_dist;

    let min_lon;
    let max_lon;
    if min_lat > MIN_LAT && max_lat < MAX_LAT {
        let delta_lon = (rad_dist.sin() / rad_lat.cos()).asin();
        let mut lon_lo = rad_lon - delta_lon;
        if lon_lo < MIN_LON {
            lon_lo += TWO_PI;
        }
        let mut lon_hi = rad_lon + delta_lon;
        if lon_hi > MAX_LON {
            lon_hi -= TWO_PI;
        }
        min_lon = lon_lo;
        max_lon = lon_hi;
    } else {
        // A pole is within the distance.
        min_lat = min_lat.max(MIN_LAT);
        max_lat = max_lat.min(MAX_LAT);
        min_lon = MIN_LON;
        max_lon = MAX_LON;
    }

    // to_degrees can overshoot the extremes by an ulp.
    BoundingBox::new(
        max_lat.to_degrees().clamp(-90.0, 90.0),
        max_lon.to_degrees().clamp(-180.0, 180.0),
        min_lat.to_degrees().clamp(-90.0, 90.0),
        min_lon.to_degrees().clamp(-180.0, 180.0),
    )
    .unwrap_or_else(|_| unreachable!("spherical cap box out of coordinate range"))
}

// Coordinates here come from geocell boxes or validated points, always in
// range.
fn point_on_extent(lat: f64, lon: f64) -> Point {
    Point::new(lat, lon).unwrap_or_else(|_| unreachable!("coordinate out of range"))
}

fn fold_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}
