//! Overworld/Nether coordinate conversion.
//!
//! Results are whole-block values kept in `f64`, so coordinates far beyond
//! the `i64` range still convert without overflowing.

use crate::{Dimension, Position};

/// One Nether block spans this many Overworld blocks on the x/z plane.
pub const NETHER_SCALE: f64 = 8.0;

/// Destination for a dimension-only teleport the mapper cannot convert
/// (anything involving the End).
pub const END_FALLBACK: Position = Position::new(0.0, 80.0, 0.0);

/// Nether x/z to Overworld x/z. Truncates toward zero before scaling.
pub fn nether_to_overworld(x: f64, z: f64) -> (f64, f64) {
    (x.trunc() * NETHER_SCALE, z.trunc() * NETHER_SCALE)
}

/// Overworld x/z to Nether x/z, rounding half up.
pub fn overworld_to_nether(x: f64, z: f64) -> (f64, f64) {
    (
        (x / NETHER_SCALE + 0.5).floor(),
        (z / NETHER_SCALE + 0.5).floor(),
    )
}

/// Convert x/z between two dimensions. `None` unless the pair is
/// Overworld/Nether in either direction.
pub fn map_xz(from: Dimension, to: Dimension, x: f64, z: f64) -> Option<(f64, f64)> {
    match (from, to) {
        (Dimension::Overworld, Dimension::Nether) => Some(overworld_to_nether(x, z)),
        (Dimension::Nether, Dimension::Overworld) => Some(nether_to_overworld(x, z)),
        _ => None,
    }
}
