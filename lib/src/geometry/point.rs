//! Point types for 2D geometry.
//!
//! Points use scaled integer coordinates (1 unit = 1 nanometer) so the
//! polygon Boolean algebra downstream never sees floating-point noise.

use crate::{scale, unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D point with scaled integer coordinates.
///
/// # Example
/// ```
/// use layercore::geometry::Point;
/// use layercore::scale;
///
/// // Create a point at (1mm, 2mm)
/// let p = Point::new(scale(1.0), scale(2.0));
///
/// // Or use new_scale for convenience
/// let p2 = Point::new_scale(1.0, 2.0);
/// assert_eq!(p, p2);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    /// Create a new point with the given coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a new point from floating-point coordinates (in mm), scaling them.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF) -> Self {
        Self {
            x: scale(x),
            y: scale(y),
        }
    }

    /// Create a point at the origin (0, 0).
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Convert to floating-point coordinates (in mm).
    #[inline]
    pub fn to_f64(&self) -> PointF {
        PointF {
            x: unscale(self.x),
            y: unscale(self.y),
        }
    }

    /// Calculate the squared distance to another point.
    /// Returns i128 to avoid overflow with large coordinates.
    #[inline]
    pub fn distance_squared(&self, other: &Point) -> i128 {
        let dx = (other.x - self.x) as i128;
        let dy = (other.y - self.y) as i128;
        dx * dx + dy * dy
    }

    /// Calculate the distance to another point (scaled units).
    #[inline]
    pub fn distance(&self, other: &Point) -> CoordF {
        (self.distance_squared(other) as CoordF).sqrt()
    }

    /// Calculate the squared length (magnitude) of this point as a vector.
    #[inline]
    pub fn length_squared(&self) -> i128 {
        (self.x as i128) * (self.x as i128) + (self.y as i128) * (self.y as i128)
    }

    /// Calculate the length (magnitude) of this point as a vector.
    #[inline]
    pub fn length(&self) -> CoordF {
        (self.length_squared() as CoordF).sqrt()
    }

    /// Rotate this point by the given angle (in radians) around the origin.
    #[inline]
    pub fn rotate(&self, angle: CoordF) -> Self {
        let cos_a = angle.cos();
        let sin_a = angle.sin();
        let x = self.x as CoordF;
        let y = self.y as CoordF;
        Self {
            x: (cos_a * x - sin_a * y).round() as Coord,
            y: (cos_a * y + sin_a * x).round() as Coord,
        }
    }

    /// Calculate the cross product with another point (2D pseudo-cross product).
    /// Positive if `other` is counter-clockwise from self.
    #[inline]
    pub fn cross(&self, other: &Point) -> i128 {
        (self.x as i128) * (other.y as i128) - (self.y as i128) * (other.x as i128)
    }

    /// Calculate the dot product with another point.
    #[inline]
    pub fn dot(&self, other: &Point) -> i128 {
        (self.x as i128) * (other.x as i128) + (self.y as i128) * (other.y as i128)
    }

    /// Find the nearest point in a slice of points, returning its index.
    pub fn nearest_point_index(&self, points: &[Point]) -> Option<usize> {
        if points.is_empty() {
            return None;
        }

        let mut min_dist = i128::MAX;
        let mut min_idx = 0;

        for (i, p) in points.iter().enumerate() {
            let dist = self.distance_squared(p);
            if dist < min_dist {
                min_dist = dist;
                min_idx = i;
            }
        }

        Some(min_idx)
    }

    /// Project this point onto a line segment defined by two points.
    pub fn project_onto_segment(&self, a: Point, b: Point) -> Point {
        let ab = b - a;
        let ap = *self - a;

        let ab_len_sq = ab.length_squared();
        if ab_len_sq == 0 {
            return a;
        }

        let t = (ap.dot(&ab) as CoordF / ab_len_sq as CoordF).clamp(0.0, 1.0);

        Point::new(
            (a.x as CoordF + t * ab.x as CoordF).round() as Coord,
            (a.y as CoordF + t * ab.y as CoordF).round() as Coord,
        )
    }

    /// Check if this point coincides with another within a tolerance.
    #[inline]
    pub fn coincides_with(&self, other: &Point, tolerance: Coord) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", unscale(self.x), unscale(self.y))
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<Coord> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: Coord) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Mul<CoordF> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: CoordF) -> Self {
        Self {
            x: (self.x as CoordF * scalar).round() as Coord,
            y: (self.y as CoordF * scalar).round() as Coord,
        }
    }
}

impl Div<Coord> for Point {
    type Output = Self;

    #[inline]
    fn div(self, scalar: Coord) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl From<(Coord, Coord)> for Point {
    #[inline]
    fn from((x, y): (Coord, Coord)) -> Self {
        Self { x, y }
    }
}

/// A 2D point with floating-point coordinates (in mm, unscaled).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: CoordF,
    pub y: CoordF,
}

impl PointF {
    /// Create a new floating-point point.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF) -> Self {
        Self { x, y }
    }

    /// Create a point at the origin.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Convert to scaled integer coordinates.
    #[inline]
    pub fn to_scaled(&self) -> Point {
        Point::new_scale(self.x, self.y)
    }

    /// Calculate the squared length of this point as a vector.
    #[inline]
    pub fn length_squared(&self) -> CoordF {
        self.x * self.x + self.y * self.y
    }

    /// Calculate the length of this point as a vector.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.length_squared().sqrt()
    }

    /// Normalize this point to unit length.
    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            *self
        }
    }

    /// Perpendicular vector (90 degrees counter-clockwise).
    #[inline]
    pub fn perp(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Dot product with another point.
    #[inline]
    pub fn dot(&self, other: &PointF) -> CoordF {
        self.x * other.x + self.y * other.y
    }

    /// Cross product (2D pseudo-cross product).
    #[inline]
    pub fn cross(&self, other: &PointF) -> CoordF {
        self.x * other.y - self.y * other.x
    }
}

impl fmt::Debug for PointF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointF({:.6}, {:.6})", self.x, self.y)
    }
}

impl Add for PointF {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for PointF {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<CoordF> for PointF {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: CoordF) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl From<Point> for PointF {
    #[inline]
    fn from(p: Point) -> Self {
        p.to_f64()
    }
}

/// Type alias for a collection of 2D points.
pub type Points = Vec<Point>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SCALING_FACTOR;

    #[test]
    fn test_point_new_scale() {
        let p = Point::new_scale(1.0, 2.0);
        assert_eq!(p.x, SCALING_FACTOR as Coord);
        assert_eq!(p.y, 2 * SCALING_FACTOR as Coord);
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0, 0);
        let p2 = Point::new(3_000_000, 4_000_000); // 3mm, 4mm
        let dist = p1.distance(&p2);
        // Should be 5mm = 5_000_000 units
        assert!((dist - 5_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_point_rotate() {
        let p = Point::new(1_000_000, 0); // 1mm on x-axis
        let rotated = p.rotate(std::f64::consts::FRAC_PI_2); // Rotate 90 degrees
        assert!(rotated.x.abs() < 100); // Should be ~0
        assert!((rotated.y - 1_000_000).abs() < 100); // Should be ~1mm
    }

    #[test]
    fn test_point_arithmetic() {
        let p1 = Point::new(10, 20);
        let p2 = Point::new(3, 4);

        let sum = p1 + p2;
        assert_eq!(sum.x, 13);
        assert_eq!(sum.y, 24);

        let diff = p1 - p2;
        assert_eq!(diff.x, 7);
        assert_eq!(diff.y, 16);
    }

    #[test]
    fn test_point_cross_dot() {
        let v1 = Point::new(1, 0);
        let v2 = Point::new(0, 1);
        assert_eq!(v1.cross(&v2), 1);
        assert_eq!(v2.cross(&v1), -1);

        let v3 = Point::new(3, 4);
        let v4 = Point::new(2, 5);
        assert_eq!(v3.dot(&v4), 3 * 2 + 4 * 5);
    }

    #[test]
    fn test_nearest_point_index() {
        let target = Point::new(0, 0);
        let points = vec![Point::new(100, 100), Point::new(10, 10), Point::new(50, 50)];
        assert_eq!(target.nearest_point_index(&points), Some(1));
    }

    #[test]
    fn test_project_onto_segment() {
        let p = Point::new(5, 5);
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        let proj = p.project_onto_segment(a, b);
        assert_eq!(proj.x, 5);
        assert_eq!(proj.y, 0);
    }

    #[test]
    fn test_pointf_normalize() {
        let p = PointF::new(3.0, 4.0);
        let n = p.normalize();
        assert!((n.length() - 1.0).abs() < 1e-10);
        assert!((n.x - 0.6).abs() < 1e-10);
        assert!((n.y - 0.8).abs() < 1e-10);
    }
}
