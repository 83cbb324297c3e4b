//! The 4x4 grid codec at the bottom of the geocell hierarchy.
//!
//! Each geocell character names one cell of a 4x4 grid laid over its parent
//! rectangle:
//!
//! ```text
//!              +---+---+---+---+ (north, east)
//!              | a | b | e | f |
//!              +---+---+---+---+
//!              | 8 | 9 | c | d |
//!              +---+---+---+---+
//!              | 2 | 3 | 6 | 7 |
//!              +---+---+---+---+
//!              | 0 | 1 | 4 | 5 |
//! (south, west)+---+---+---+---+
//! ```
//!
//! The character-to-(x, y) packing below is specific to grid size 4 and must
//! not be generalized.

/// The 16-symbol geocell alphabet.
pub const GEOCELL_ALPHABET: &str = "0123456789abcdef";

/// Cells per axis at each subdivision level.
pub(crate) const GRID_SIZE: u32 = 4;

/// Returns the (x, y) position of a geocell character in the 4x4 grid,
/// with x growing east and y growing north.
///
/// The character must be a member of [`GEOCELL_ALPHABET`].
pub(crate) fn subdiv_xy(c: char) -> (u32, u32) {
    let i = GEOCELL_ALPHABET
        .find(c)
        .unwrap_or_else(|| panic!("character {c:?} is not in the geocell alphabet")) as u32;
    let x = (i & 4) >> 1 | (i & 1);
    let y = (i & 8) >> 2 | (i & 2) >> 1;
    (x, y)
}

/// Returns the geocell character at grid position (x, y). Exact inverse of
/// [`subdiv_xy`].
///
/// Both coordinates must be in `0..4`.
pub(crate) fn subdiv_char(x: u32, y: u32) -> char {
    debug_assert!(x < GRID_SIZE && y < GRID_SIZE);
    let i = (y & 2) << 2 | (x & 2) << 1 | (y & 1) << 1 | (x & 1);
    GEOCELL_ALPHABET.as_bytes()[i as usize] as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_round_trip() {
        for c in GEOCELL_ALPHABET.chars() {
            let (x, y) = subdiv_xy(c);
            assert!(x < 4 && y < 4);
            assert_eq!(subdiv_char(x, y), c);
        }
    }

    #[test]
    fn test_grid_layout_corners() {
        // Corners of the documented grid layout.
        assert_eq!(subdiv_xy('0'), (0, 0));
        assert_eq!(subdiv_xy('5'), (3, 0));
        assert_eq!(subdiv_xy('a'), (0, 3));
        assert_eq!(subdiv_xy('f'), (3, 3));
    }

    #[test]
    fn test_grid_layout_interior() {
        // (0, 0) degrees sits at the junction of cells 3, 6, 9, c.
        assert_eq!(subdiv_xy('3'), (1, 1));
        assert_eq!(subdiv_xy('6'), (2, 1));
        assert_eq!(subdiv_xy('9'), (1, 2));
        assert_eq!(subdiv_xy('c'), (2, 2));
    }

    #[test]
    fn test_every_position_distinct() {
        let mut seen = [[false; 4]; 4];
        for c in GEOCELL_ALPHABET.chars() {
            let (x, y) = subdiv_xy(c);
            assert!(!seen[x as usize][y as usize]);
            seen[x as usize][y as usize] = true;
        }
    }
}
