use serde_derive::{Deserialize, Serialize};

/// A real-valued position in the plane.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    #[must_use]
    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Folds an unbounded position onto `[0, side_length)` per axis as `|v mod side_length|`.
    ///
    /// Negative coordinates are reflected rather than wrapped: `-1.0` maps to `1.0`, not to
    /// `side_length - 1.0`.
    #[must_use]
    pub fn fold(self, side_length: f64) -> Point {
        Point {
            x: (self.x % side_length).abs(),
            y: (self.y % side_length).abs(),
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(point: Point) -> Self {
        (point.x, point.y)
    }
}
