//! Line segment type.

use super::{Point, PointF};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line segment defined by two endpoints.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    /// Create a new line segment from two points.
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Get the direction vector (b - a).
    #[inline]
    pub fn direction(&self) -> Point {
        self.b - self.a
    }

    /// Get the direction vector as floating-point.
    #[inline]
    pub fn direction_f(&self) -> PointF {
        self.b.to_f64() - self.a.to_f64()
    }

    /// Get the direction angle in radians, normalized to [0, PI).
    #[inline]
    pub fn direction_angle(&self) -> CoordF {
        let dir = self.direction();
        let mut angle = (dir.y as CoordF).atan2(dir.x as CoordF);
        if angle < 0.0 {
            angle += std::f64::consts::PI;
        }
        if angle >= std::f64::consts::PI {
            angle -= std::f64::consts::PI;
        }
        angle
    }

    /// Get the midpoint of the line segment.
    #[inline]
    pub fn midpoint(&self) -> Point {
        Point::new((self.a.x + self.b.x) / 2, (self.a.y + self.b.y) / 2)
    }

    /// Get the squared length of the line segment.
    #[inline]
    pub fn length_squared(&self) -> i128 {
        self.a.distance_squared(&self.b)
    }

    /// Get the length of the line segment.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Check if this line segment is a point (zero length).
    #[inline]
    pub fn is_point(&self) -> bool {
        self.a == self.b
    }

    /// Calculate the distance from a point to this line segment.
    pub fn distance_to_point(&self, p: &Point) -> CoordF {
        let proj = p.project_onto_segment(self.a, self.b);
        p.distance(&proj)
    }

    /// Project a point onto this line segment, clamping to the segment bounds.
    #[inline]
    pub fn project_point(&self, p: &Point) -> Point {
        p.project_onto_segment(self.a, self.b)
    }

    /// Check if a point lies on this line segment (within tolerance).
    pub fn contains_point(&self, p: &Point, tolerance: Coord) -> bool {
        let proj = self.project_point(p);
        p.coincides_with(&proj, tolerance)
    }

    /// Calculate the intersection point of two line segments.
    /// Returns None if the segments don't intersect.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let d1 = self.direction();
        let d2 = other.direction();

        let cross = d1.cross(&d2);
        if cross == 0 {
            // Parallel
            return None;
        }

        let diff = other.a - self.a;
        let t = diff.cross(&d2) as CoordF / cross as CoordF;
        let u = diff.cross(&d1) as CoordF / cross as CoordF;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(Point::new(
                (self.a.x as CoordF + t * d1.x as CoordF).round() as Coord,
                (self.a.y as CoordF + t * d1.y as CoordF).round() as Coord,
            ))
        } else {
            None
        }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}

/// Type alias for a collection of lines.
pub type Lines = Vec<Line>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_length_and_midpoint() {
        let line = Line::new(Point::new(0, 0), Point::new(100, 0));
        assert!((line.length() - 100.0).abs() < 1e-9);
        assert_eq!(line.midpoint(), Point::new(50, 0));
    }

    #[test]
    fn test_direction_angle_normalized() {
        // Pointing in -x direction normalizes into [0, PI)
        let line = Line::new(Point::new(100, 0), Point::new(0, 0));
        assert!(line.direction_angle().abs() < 1e-9);

        let diag = Line::new(Point::new(0, 0), Point::new(100, 100));
        assert!((diag.direction_angle() - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_intersection() {
        let l1 = Line::new(Point::new(0, 0), Point::new(100, 100));
        let l2 = Line::new(Point::new(0, 100), Point::new(100, 0));
        assert_eq!(l1.intersection(&l2), Some(Point::new(50, 50)));

        let l3 = Line::new(Point::new(0, 200), Point::new(100, 200));
        assert_eq!(l1.intersection(&l3), None);
    }

    #[test]
    fn test_contains_point() {
        let line = Line::new(Point::new(0, 0), Point::new(100, 0));
        assert!(line.contains_point(&Point::new(50, 0), 1));
        assert!(!line.contains_point(&Point::new(50, 10), 1));
    }
}
