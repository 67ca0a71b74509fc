//! Discretized push directions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cosine/sine cutoff above which an axis contributes to the direction
const AXIS_THRESHOLD: f64 = 0.5;

/// An 8-way compass direction with components in {-1, 0, 1}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const NONE: Direction = Direction::new(0, 0);
    pub const LEFT: Direction = Direction::new(-1, 0);
    pub const RIGHT: Direction = Direction::new(1, 0);
    pub const UP: Direction = Direction::new(0, -1);
    pub const DOWN: Direction = Direction::new(0, 1);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_none(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Exactly one component is nonzero
    pub fn is_axis_aligned(&self) -> bool {
        (self.dx != 0) != (self.dy != 0)
    }

    /// Both components are nonzero
    pub fn is_diagonal(&self) -> bool {
        self.dx != 0 && self.dy != 0
    }

    pub fn reversed(&self) -> Self {
        Self::new(-self.dx, -self.dy)
    }

    /// Components exchanged, turning a horizontal push into a vertical one
    pub fn swapped(&self) -> Self {
        Self::new(self.dy, self.dx)
    }

    pub fn horizontal(&self) -> Self {
        Self::new(self.dx, 0)
    }

    pub fn vertical(&self) -> Self {
        Self::new(0, self.dy)
    }

    pub fn dot(&self, other: &Direction) -> i32 {
        self.dx * other.dx + self.dy * other.dy
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dx, self.dy)
    }
}

/// Sign as -1, 0 or 1. Unlike `f64::signum`, zero maps to zero.
fn sign(value: f64) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Snap a continuous delta to an 8-way direction.
///
/// An axis contributes its sign when the cosine (x) or sine (y) of the
/// delta's angle exceeds 0.5, which locks near-axis deltas to that axis.
/// A zero delta yields `Direction::NONE`.
pub fn compute_direction_vector(delta_x: f32, delta_y: f32) -> Direction {
    let delta_x = delta_x as f64;
    let delta_y = delta_y as f64;
    let angle = (delta_y / delta_x).atan();

    let mut result = Direction::NONE;
    if angle.cos().abs() > AXIS_THRESHOLD {
        result.dx = sign(delta_x);
    }
    if angle.sin().abs() > AXIS_THRESHOLD {
        result.dy = sign(delta_y);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_deltas() {
        assert_eq!(compute_direction_vector(5.0, 0.0), Direction::RIGHT);
        assert_eq!(compute_direction_vector(-3.0, 0.0), Direction::LEFT);
        assert_eq!(compute_direction_vector(0.0, -7.0), Direction::UP);
        assert_eq!(compute_direction_vector(0.0, 2.0), Direction::DOWN);
    }

    #[test]
    fn test_diagonal_deltas() {
        assert_eq!(compute_direction_vector(4.0, 4.0), Direction::new(1, 1));
        assert_eq!(compute_direction_vector(-4.0, 4.0), Direction::new(-1, 1));
        assert_eq!(compute_direction_vector(-4.0, -4.0), Direction::new(-1, -1));
    }

    #[test]
    fn test_dominant_axis_wins() {
        // atan(1/3) ~ 18 degrees: sin ~ 0.32
        assert_eq!(compute_direction_vector(3.0, 1.0), Direction::RIGHT);
        // atan(3) ~ 72 degrees: cos ~ 0.32
        assert_eq!(compute_direction_vector(1.0, -3.0), Direction::UP);
    }

    #[test]
    fn test_zero_delta() {
        assert_eq!(compute_direction_vector(0.0, 0.0), Direction::NONE);
    }

    #[test]
    fn test_deterministic() {
        for (dx, dy) in [(1.5, -2.5), (-9.0, 0.1), (0.0, 3.0)] {
            assert_eq!(
                compute_direction_vector(dx, dy),
                compute_direction_vector(dx, dy)
            );
        }
    }

    #[test]
    fn test_transforms() {
        let d = Direction::new(1, -1);
        assert_eq!(d.reversed(), Direction::new(-1, 1));
        assert_eq!(Direction::RIGHT.swapped(), Direction::DOWN);
        assert_eq!(d.horizontal(), Direction::RIGHT);
        assert_eq!(d.vertical(), Direction::UP);
        assert!(d.is_diagonal());
        assert!(Direction::UP.is_axis_aligned());
        assert!(!Direction::NONE.is_axis_aligned());
    }
}
