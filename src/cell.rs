//! The [`Geocell`] value type: encoding points to cells and decoding cells
//! back to rectangles.
//!
//! A geocell is a string over the alphabet `0123456789abcdef` naming a
//! rectangular region of latitude/longitude space by repeated 4x4 quadrant
//! subdivision, most significant character first. Its resolution is its
//! length, and any prefix of a geocell is an ancestor region: truncating one
//! character yields the exact parent rectangle.

use crate::error::{GeocellError, Result};
use crate::grid::{GEOCELL_ALPHABET, GRID_SIZE, subdiv_char, subdiv_xy};
use crate::types::{BoundingBox, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The maximum practical geocell resolution.
///
/// Finer resolutions lose exactness at double precision and are not
/// guaranteed to round-trip.
pub const MAX_GEOCELL_RESOLUTION: usize = 13;

/// A validated geocell string.
///
/// Stored lowercase-canonical, so equality, ordering, and hashing are
/// case-insensitive with respect to the input.
///
/// # Examples
///
/// ```rust
/// use geocell::{Geocell, Point};
///
/// let point = Point::new(40.7407092, -73.9894039)?;
/// let cell = Geocell::compute(&point, 8);
/// assert_eq!(cell.resolution(), 8);
/// assert!(cell.contains(&point));
///
/// // Truncating one character yields the exact parent region.
/// let parent = cell.parent().unwrap();
/// assert!(cell.as_str().starts_with(parent.as_str()));
/// # Ok::<(), geocell::GeocellError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Geocell(String);

impl Geocell {
    /// Create a geocell from a string, validating every character against the
    /// alphabet. Uppercase input is canonicalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`GeocellError::InvalidGeocell`] for an empty string or any
    /// character outside the alphabet.
    pub fn new(cell: impl Into<String>) -> Result<Self> {
        let cell: String = cell.into();
        let lowered = cell.to_ascii_lowercase();
        if !Self::is_valid(&lowered) {
            return Err(GeocellError::InvalidGeocell(cell));
        }
        Ok(Self(lowered))
    }

    /// Whether the given string defines a valid geocell: non-empty and made
    /// only of alphabet characters. Pure predicate, never fails.
    pub fn is_valid(cell: &str) -> bool {
        !cell.is_empty() && cell.chars().all(|c| GEOCELL_ALPHABET.contains(c))
    }

    /// Computes the geocell containing the given point at the given
    /// resolution.
    ///
    /// This is a simple 16-tree lookup: at each level the working rectangle
    /// is divided into a 4x4 grid and narrowed to the quadrant containing the
    /// point.
    ///
    /// # Panics
    ///
    /// Panics if `resolution` is not in `1..=13`.
    pub fn compute(point: &Point, resolution: usize) -> Self {
        assert!(
            (1..=MAX_GEOCELL_RESOLUTION).contains(&resolution),
            "Geocell resolution must be between 1 and {MAX_GEOCELL_RESOLUTION}"
        );

        let mut north = 90.0_f64;
        let mut south = -90.0_f64;
        let mut east = 180.0_f64;
        let mut west = -180.0_f64;

        let mut cell = String::with_capacity(resolution);
        while cell.len() < resolution {
            let subcell_lon_span = (east - west) / GRID_SIZE as f64;
            let subcell_lat_span = (north - south) / GRID_SIZE as f64;

            // Points on the north/east boundary clamp into the last quadrant.
            let x = (GRID_SIZE as f64 * (point.lon() - west) / (east - west))
                .floor()
                .clamp(0.0, (GRID_SIZE - 1) as f64) as u32;
            let y = (GRID_SIZE as f64 * (point.lat() - south) / (north - south))
                .floor()
                .clamp(0.0, (GRID_SIZE - 1) as f64) as u32;

            cell.push(subdiv_char(x, y));

            south += subcell_lat_span * y as f64;
            north = south + subcell_lat_span;
            west += subcell_lon_span * x as f64;
            east = west + subcell_lon_span;
        }
        Self(cell)
    }

    /// Computes the geocell containing the point at every resolution from 1
    /// to [`MAX_GEOCELL_RESOLUTION`], coarsest first.
    ///
    /// This is the full set of index keys a stored entity is tagged with.
    pub fn generate_geocells(point: &Point) -> Vec<Self> {
        let max = Self::compute(point, MAX_GEOCELL_RESOLUTION);
        (1..=MAX_GEOCELL_RESOLUTION)
            .map(|resolution| Self(max.0[..resolution].to_string()))
            .collect()
    }

    /// The cell string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The cell's resolution (string length).
    pub fn resolution(&self) -> usize {
        self.0.len()
    }

    /// The immediate parent cell, or `None` at resolution 1.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_string()))
        }
    }

    /// The cell truncated to the given resolution.
    ///
    /// # Panics
    ///
    /// Panics if `resolution` is 0 or greater than this cell's resolution.
    pub fn truncate(&self, resolution: usize) -> Self {
        assert!(
            resolution >= 1 && resolution <= self.resolution(),
            "truncation resolution must be between 1 and the cell resolution"
        );
        Self(self.0[..resolution].to_string())
    }

    /// Computes the rectangular boundaries of this geocell.
    ///
    /// The inverse of [`Geocell::compute`]: starting from the full extent
    /// ([`BoundingBox::full`], the ancestor of everything), each character
    /// narrows the rectangle to one quadrant of a 4x4 grid.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut north = 90.0_f64;
        let mut south = -90.0_f64;
        let mut east = 180.0_f64;
        let mut west = -180.0_f64;

        for c in self.0.chars() {
            let subcell_lon_span = (east - west) / GRID_SIZE as f64;
            let subcell_lat_span = (north - south) / GRID_SIZE as f64;

            let (x, y) = subdiv_xy(c);

            north = south + subcell_lat_span * (y + 1) as f64;
            south += subcell_lat_span * y as f64;
            east = west + subcell_lon_span * (x + 1) as f64;
            west += subcell_lon_span * x as f64;
        }

        // Sub-rectangles of the full extent are always in range.
        BoundingBox::new(north, east, south, west)
            .unwrap_or_else(|_| unreachable!("geocell sub-rectangle out of range"))
    }

    /// Whether this cell contains the given point: encoding the point at this
    /// cell's resolution must reproduce the cell exactly.
    pub fn contains(&self, point: &Point) -> bool {
        Self::compute(point, self.resolution()) == *self
    }

    pub(crate) fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }

    pub(crate) fn from_chars(chars: Vec<char>) -> Self {
        debug_assert!(!chars.is_empty());
        Self(chars.into_iter().collect())
    }
}

impl fmt::Display for Geocell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Geocell {
    type Err = GeocellError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Geocell {
    type Error = GeocellError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<Geocell> for String {
    fn from(cell: Geocell) -> Self {
        cell.0
    }
}

impl AsRef<str> for Geocell {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
