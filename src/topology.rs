//! Adjacency and grid interpolation over geocells.
//!
//! Neighbor computation walks a cell's characters from finest to coarsest,
//! carrying the shift one level up whenever it would cross a parent boundary.
//! Interpolation enumerates the exact rectangle of same-resolution cells
//! spanned by a north-east / south-west corner pair.

use crate::cell::Geocell;
use crate::grid::{GRID_SIZE, subdiv_char, subdiv_xy};
use crate::types::Direction;
use smallvec::SmallVec;

impl Geocell {
    /// Calculates the geocell adjacent to this cell in the given direction.
    ///
    /// The shift is absorbed at the finest level where it does not cross the
    /// parent boundary; otherwise the local coordinate wraps to the opposite
    /// edge and the shift carries one level coarser. Horizontal wraparound at
    /// the top level succeeds silently (longitude wraps); vertical wraparound
    /// returns `None` since no cell exists beyond the poles. Diagonal
    /// directions resolve both axes independently, possibly at different
    /// carry depths.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geocell::{Direction, Geocell};
    ///
    /// let cell = Geocell::new("70")?;
    /// let east = cell.adjacent(Direction::East).unwrap();
    /// assert_eq!(east.adjacent(Direction::West).unwrap(), cell);
    ///
    /// // North of the north pole does not exist.
    /// assert!(Geocell::new("f")?.adjacent(Direction::North).is_none());
    /// # Ok::<(), geocell::GeocellError>(())
    /// ```
    pub fn adjacent(&self, direction: Direction) -> Option<Geocell> {
        let mut dx = direction.dx();
        let mut dy = direction.dy();
        let mut chars: Vec<char> = self.chars().collect();

        let mut i = chars.len();
        while i > 0 && (dx != 0 || dy != 0) {
            i -= 1;
            let (mut x, mut y) = subdiv_xy(chars[i]);

            // Horizontal adjacency.
            if dx == -1 {
                if x == 0 {
                    x = GRID_SIZE - 1; // Becomes the right edge of the adjacent parent.
                } else {
                    x -= 1;
                    dx = 0;
                }
            } else if dx == 1 {
                if x == GRID_SIZE - 1 {
                    x = 0; // Becomes the left edge of the adjacent parent.
                } else {
                    x += 1;
                    dx = 0;
                }
            }

            // Vertical adjacency.
            if dy == 1 {
                if y == GRID_SIZE - 1 {
                    y = 0;
                } else {
                    y += 1;
                    dy = 0;
                }
            } else if dy == -1 {
                if y == 0 {
                    y = GRID_SIZE - 1;
                } else {
                    y -= 1;
                    dy = 0;
                }
            }

            chars[i] = subdiv_char(x, y);
        }

        // An unabsorbed vertical shift tried to wrap past a pole.
        if dy != 0 {
            return None;
        }

        // Horizontal wrapping at the top level is legitimate.
        Some(Geocell::from_chars(chars))
    }

    /// All 8 adjacent geocells in NW, N, NE, E, SE, S, SW, W order.
    ///
    /// Entries are `None` where no neighbor exists (polar overflow).
    pub fn all_adjacents(&self) -> SmallVec<[Option<Geocell>; 8]> {
        Direction::ALL
            .iter()
            .map(|&direction| self.adjacent(direction))
            .collect()
    }
}

/// Whether two cells are collinear along one grid dimension.
///
/// Returns true when the cells are in the same row (`column_test = false`,
/// equal y at every shared position) or the same column (`column_test =
/// true`, equal x at every shared position), compared over the shorter of
/// the two lengths.
pub fn collinear(cell1: &Geocell, cell2: &Geocell, column_test: bool) -> bool {
    for (c1, c2) in cell1.chars().zip(cell2.chars()) {
        let (x1, y1) = subdiv_xy(c1);
        let (x2, y2) = subdiv_xy(c2);
        if !column_test && y1 != y2 {
            return false;
        }
        if column_test && x1 != x2 {
            return false;
        }
    }
    true
}

/// Calculates the grid of cells formed between the two given cells.
///
/// Generates the rectangle of cells spanned by interpolating from the given
/// north-east geocell to the given south-west geocell, row-major from the
/// southmost row upward. Assumes `cell_ne` is actually north-east of
/// `cell_sw` and that both share one resolution.
///
/// # Examples
///
/// ```rust
/// use geocell::{Geocell, topology::interpolate};
///
/// let sw = Geocell::new("70")?;
/// let ne = Geocell::new("73")?;
/// let grid = interpolate(&ne, &sw);
/// assert_eq!(grid.len(), 4); // 2x2 block
/// # Ok::<(), geocell::GeocellError>(())
/// ```
pub fn interpolate(cell_ne: &Geocell, cell_sw: &Geocell) -> Vec<Geocell> {
    // Walk east from the south-west corner until column-collinear with the
    // north-east corner; that is the southmost row.
    let mut first_row = vec![cell_sw.clone()];
    while !collinear(first_row.last().unwrap(), cell_ne, true) {
        match first_row.last().unwrap().adjacent(Direction::East) {
            Some(cell) => first_row.push(cell),
            None => break,
        }
    }

    // Then stack rows of north neighbors until the far corner is reached.
    let mut rows = vec![first_row];
    while rows.last().unwrap().last().unwrap() != cell_ne {
        let next_row: Option<Vec<Geocell>> = rows
            .last()
            .unwrap()
            .iter()
            .map(|cell| cell.adjacent(Direction::North))
            .collect();
        match next_row {
            Some(row) => rows.push(row),
            None => break,
        }
    }

    rows.into_iter().flatten().collect()
}

/// Computes the number of cells in the grid formed between two given cells
/// without materializing it.
///
/// Derived analytically from the two cells' bounding boxes: span difference
/// divided by one cell's span, floored, per axis. Used to reject oversized
/// candidate resolutions before calling the expensive [`interpolate`].
pub fn interpolation_count(cell_ne: &Geocell, cell_sw: &Geocell) -> usize {
    let bbox_ne = cell_ne.bounding_box();
    let bbox_sw = cell_sw.bounding_box();

    let cell_lat_span = bbox_sw.north() - bbox_sw.south();
    let cell_lon_span = bbox_sw.east() - bbox_sw.west();

    let num_cols = ((bbox_ne.east() - bbox_sw.west()) / cell_lon_span).floor();
    let num_rows = ((bbox_ne.north() - bbox_sw.south()) / cell_lat_span).floor();

    (num_cols.max(0.0) as usize) * (num_rows.max(0.0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::MAX_GEOCELL_RESOLUTION;
    use crate::types::Point;

    fn cell(s: &str) -> Geocell {
        Geocell::new(s).unwrap()
    }

    #[test]
    fn test_adjacent_within_parent() {
        // Inside one parent cell, moves stay local.
        assert_eq!(cell("70").adjacent(Direction::East).unwrap(), cell("71"));
        assert_eq!(cell("70").adjacent(Direction::North).unwrap(), cell("72"));
        assert_eq!(cell("73").adjacent(Direction::West).unwrap(), cell("72"));
    }

    #[test]
    fn test_adjacent_carries_into_sibling_parent() {
        // 15 is the east edge of parent 1; its east neighbor is the west
        // edge of parent 4.
        let east = cell("15").adjacent(Direction::East).unwrap();
        assert_eq!(east, cell("40"));
    }

    #[test]
    fn test_adjacent_wraps_around_antimeridian() {
        // 75 is on the world's east edge; stepping east wraps the longitude.
        let east = cell("75").adjacent(Direction::East).unwrap();
        assert_eq!(east, cell("20"));
        assert_eq!(east.adjacent(Direction::West).unwrap(), cell("75"));
    }

    #[test]
    fn test_adjacent_symmetry() {
        let p = Point::new(40.7407092, -73.9894039).unwrap();
        for resolution in 1..=MAX_GEOCELL_RESOLUTION {
            let c = Geocell::compute(&p, resolution);
            assert_eq!(
                c.adjacent(Direction::East)
                    .unwrap()
                    .adjacent(Direction::West)
                    .unwrap(),
                c
            );
            assert_eq!(
                c.adjacent(Direction::North)
                    .unwrap()
                    .adjacent(Direction::South)
                    .unwrap(),
                c
            );
        }
    }

    #[test]
    fn test_adjacent_polar_overflow() {
        // f is the top-level north-east cell; no cell exists north of it.
        assert!(cell("f").adjacent(Direction::North).is_none());
        assert!(cell("0").adjacent(Direction::South).is_none());
        assert!(cell("fa").adjacent(Direction::NorthEast).is_none());

        // But longitude wraps.
        assert!(cell("f").adjacent(Direction::East).is_some());
        assert_eq!(cell("f").adjacent(Direction::East).unwrap(), cell("a"));
    }

    #[test]
    fn test_adjacent_diagonal_resolves_both_axes() {
        let ne = cell("70").adjacent(Direction::NorthEast).unwrap();
        assert_eq!(ne, cell("73"));

        // Axes may carry at different depths.
        let c = cell("71").adjacent(Direction::NorthEast).unwrap();
        assert_eq!(
            c,
            cell("71")
                .adjacent(Direction::North)
                .unwrap()
                .adjacent(Direction::East)
                .unwrap()
        );
    }

    #[test]
    fn test_all_adjacents_order() {
        let adjacents = cell("70").all_adjacents();
        assert_eq!(adjacents.len(), 8);
        // Entry 3 is EAST per the fixed NW, N, NE, E, SE, S, SW, W order.
        assert_eq!(
            adjacents[3].as_ref().unwrap(),
            &cell("70").adjacent(Direction::East).unwrap()
        );
        // A top-row cell has no northern neighbors.
        let polar = cell("f").all_adjacents();
        assert!(polar[0].is_none() && polar[1].is_none() && polar[2].is_none());
        assert!(polar[3].is_some());
    }

    #[test]
    fn test_collinear() {
        // 70 and 71 share a row; 70 and 72 share a column.
        assert!(collinear(&cell("70"), &cell("71"), false));
        assert!(!collinear(&cell("70"), &cell("71"), true));
        assert!(collinear(&cell("70"), &cell("72"), true));
        assert!(!collinear(&cell("70"), &cell("72"), false));
        // Compared over the shorter length.
        assert!(collinear(&cell("7"), &cell("70"), true));
    }

    #[test]
    fn test_interpolate_rectangle() {
        let sw = cell("70");
        let ne = cell("73");
        let grid = interpolate(&ne, &sw);
        assert_eq!(grid, vec![cell("70"), cell("71"), cell("72"), cell("73")]);
    }

    #[test]
    fn test_interpolate_single_cell() {
        let c = cell("78a");
        assert_eq!(interpolate(&c, &c), vec![c.clone()]);
        assert_eq!(interpolation_count(&c, &c), 1);
    }

    #[test]
    fn test_interpolation_count_matches_list_length() {
        let pairs = [
            ("70", "70"),
            ("73", "70"),
            ("7f", "70"),
            ("9c", "30"),
            ("788", "702"),
        ];
        for (ne, sw) in pairs {
            let (ne, sw) = (cell(ne), cell(sw));
            assert_eq!(
                interpolation_count(&ne, &sw),
                interpolate(&ne, &sw).len(),
                "count mismatch for ne={ne} sw={sw}"
            );
        }
    }

    #[test]
    fn test_interpolate_spans_parent_boundaries() {
        // 2x2 block around the junction of parents 3, 6, 9, c.
        let sw = cell("3f");
        let ne = cell("c0");
        let grid = interpolate(&ne, &sw);
        assert_eq!(grid, vec![cell("3f"), cell("6a"), cell("95"), cell("c0")]);
        assert_eq!(interpolation_count(&ne, &sw), 4);
    }
}
