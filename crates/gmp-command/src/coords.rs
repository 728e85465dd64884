//! Coordinate argument validation.
//!
//! A coordinate is a plain decimal: an optional leading `-`, ASCII digits,
//! and at most one `.` that is neither the first nor the last character.
//! No exponents, no `+`, no relative (`~`) or local (`^`) notation.

use gmp_world::Position;

pub fn is_valid_coordinate(s: &str) -> bool {
    if s.starts_with('.') || s.ends_with('.') {
        return false;
    }
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() || body.contains('-') {
        return false;
    }
    let mut dots = 0;
    for c in body.chars() {
        match c {
            '.' => dots += 1,
            '0'..='9' => {}
            _ => return false,
        }
    }
    dots <= 1 && body.chars().any(|c| c.is_ascii_digit())
}

/// Validate and parse three coordinate arguments.
pub fn parse_coordinates(xs: &str, ys: &str, zs: &str) -> Option<Position> {
    if ![xs, ys, zs].iter().all(|s| is_valid_coordinate(s)) {
        return None;
    }
    let x = xs.parse::<f64>().ok()?;
    let y = ys.parse::<f64>().ok()?;
    let z = zs.parse::<f64>().ok()?;
    Some(Position::new(x, y, z))
}
