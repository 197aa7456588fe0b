//! Polyline type for open paths.

use super::{BoundingBox, Line, Point, Polygon};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// An open polyline defined by a sequence of points.
///
/// Unlike a Polygon, a Polyline is not implicitly closed - it's a path from
/// the first point to the last point.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Create a new empty polyline.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polyline from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Get the points of this polyline.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get a mutable reference to the points.
    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    /// Consume the polyline and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Get the number of points in the polyline.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polyline is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the polyline.
    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the first point, panicking if empty.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Get the last point, panicking if empty.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Get the line segment at the given index (from point[i] to point[i+1]).
    #[inline]
    pub fn edge(&self, index: usize) -> Line {
        Line::new(self.points[index], self.points[index + 1])
    }

    /// Get all edges of the polyline.
    pub fn edges(&self) -> Vec<Line> {
        if self.points.len() < 2 {
            return Vec::new();
        }

        let mut edges = Vec::with_capacity(self.points.len() - 1);
        for i in 0..(self.points.len() - 1) {
            edges.push(self.edge(i));
        }
        edges
    }

    /// Calculate the total length of the polyline (scaled units).
    pub fn length(&self) -> CoordF {
        if self.points.len() < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        for i in 0..(self.points.len() - 1) {
            total += self.points[i].distance(&self.points[i + 1]);
        }
        total
    }

    /// Check if this polyline is closed (first point equals last point).
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }

    /// Reverse the order of points in the polyline.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Get the bounding box of the polyline.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Translate the polyline by a vector.
    pub fn translate(&mut self, v: Point) {
        for p in &mut self.points {
            *p = *p + v;
        }
    }

    /// Simplify the polyline by removing collinear and duplicate points.
    /// End points are always preserved.
    pub fn simplify(&mut self, tolerance: Coord) {
        if self.points.len() < 3 {
            return;
        }

        let mut new_points = Vec::with_capacity(self.points.len());
        new_points.push(self.points[0]);

        for i in 1..(self.points.len() - 1) {
            if self.points[i].coincides_with(&self.points[i - 1], tolerance) {
                continue;
            }

            let prev = self.points[i - 1];
            let curr = self.points[i];
            let next = self.points[i + 1];

            let line = Line::new(prev, next);
            let dist = line.distance_to_point(&curr);

            if dist > tolerance as CoordF {
                new_points.push(curr);
            }
        }

        if let Some(&last) = self.points.last() {
            if !new_points
                .last()
                .is_some_and(|p| p.coincides_with(&last, tolerance))
            {
                new_points.push(last);
            }
        }

        self.points = new_points;
    }

    /// Convert to a polygon (closing the path). A trailing duplicate of the
    /// first point is dropped.
    pub fn to_polygon(&self) -> Polygon {
        let mut points = self.points.clone();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Polygon::from_points(points)
    }

    /// Check if the polyline is valid (has at least 2 points).
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }
}

impl fmt::Debug for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyline({} points)", self.points.len())
    }
}

impl Deref for Polyline {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polyline {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

impl From<Polygon> for Polyline {
    fn from(polygon: Polygon) -> Self {
        Self::from_points(polygon.into_points())
    }
}

/// Type alias for a collection of polylines.
pub type Polylines = Vec<Polyline>;

#[cfg(test)]
mod tests {
    use super::*;

    fn make_polyline() -> Polyline {
        Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 100),
        ])
    }

    #[test]
    fn test_polyline_length() {
        let pl = make_polyline();
        assert!((pl.length() - 300.0).abs() < 1.0); // 100 + 100 + 100
    }

    #[test]
    fn test_polyline_edges() {
        let pl = make_polyline();
        assert_eq!(pl.edges().len(), 3); // 4 points = 3 edges (open path)
    }

    #[test]
    fn test_polyline_is_closed() {
        let pl = make_polyline();
        assert!(!pl.is_closed());

        let closed = Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 0),
        ]);
        assert!(closed.is_closed());
    }

    #[test]
    fn test_polyline_simplify_collinear() {
        let mut pl = Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(50, 0),
            Point::new(100, 0),
            Point::new(100, 100),
        ]);
        pl.simplify(1);
        assert_eq!(pl.len(), 3);
        assert_eq!(pl.first_point(), Point::new(0, 0));
        assert_eq!(pl.last_point(), Point::new(100, 100));
    }

    #[test]
    fn test_polyline_to_polygon_drops_closing_point() {
        let closed = Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 0),
        ]);
        let poly = closed.to_polygon();
        assert_eq!(poly.len(), 3);
    }
}
