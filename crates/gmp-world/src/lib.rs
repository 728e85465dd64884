//! Dimensions, positions, and the Overworld/Nether coordinate mapper.

pub mod dimension;
pub mod mapping;

use std::fmt;

pub use dimension::{Dimension, DimensionError};
pub use mapping::{map_xz, nether_to_overworld, overworld_to_nether, END_FALLBACK, NETHER_SCALE};

/// A player position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Each axis truncated toward zero, space separated. Used in chat replies.
    pub fn block_string(&self) -> String {
        format!(
            "{} {} {}",
            self.x.trunc() as i64,
            self.y.trunc() as i64,
            self.z.trunc() as i64
        )
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Position {
    fn from(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl From<Position> for [f64; 3] {
    fn from(p: Position) -> Self {
        p.to_array()
    }
}

/// Command form: `x y z`, as accepted by `tp`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_form_keeps_fractions() {
        let p = Position::new(10.5, 64.0, -3.25);
        assert_eq!(p.to_string(), "10.5 64 -3.25");
    }

    #[test]
    fn block_string_truncates_toward_zero() {
        let p = Position::new(10.9, 64.2, -3.7);
        assert_eq!(p.block_string(), "10 64 -3");
    }

    #[test]
    fn array_conversion() {
        let p: Position = [1.0, 2.0, 3.0].into();
        assert_eq!(p, Position::new(1.0, 2.0, 3.0));
        let a: [f64; 3] = p.into();
        assert_eq!(a, [1.0, 2.0, 3.0]);
    }
}
