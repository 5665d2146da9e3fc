//! Plane geometry over board coordinates.

use serde::{Deserialize, Serialize};

/// A position on the puzzle board.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Total length of a polyline visiting `points` in order.
///
/// Fewer than two points is a degenerate polyline of length zero.
pub fn path_length(points: impl IntoIterator<Item = Point>) -> f64 {
    let mut total = 0.0;
    let mut prev: Option<Point> = None;
    for point in points {
        if let Some(last) = prev {
            total += distance(last, point);
        }
        prev = Some(point);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-9);
        assert!((distance(b, b)).abs() < 1e-9);
    }

    #[test]
    fn path_length_sums_consecutive_edges() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        assert!((path_length(points) - 20.0).abs() < 1e-9);
        assert!((path_length([Point::new(1.0, 1.0)])).abs() < 1e-9);
        assert!((path_length([])).abs() < 1e-9);
    }
}
