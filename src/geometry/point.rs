use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Signed per-axis offset `a - b`.
#[inline]
pub fn xy_distance(a: Point, b: Point) -> (f32, f32) {
    (a.x - b.x, a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(distance(a, b), 5.0);
        assert_eq!(distance(b, a), 5.0);
    }

    #[test]
    fn test_xy_distance_is_signed() {
        let a = Point::new(10.0, 2.0);
        let b = Point::new(4.0, 7.0);
        assert_eq!(xy_distance(a, b), (6.0, -5.0));
        assert_eq!(xy_distance(b, a), (-6.0, 5.0));
    }
}
