//! Polygon type for closed contours.

use super::{BoundingBox, Line, Point, Polyline};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// A closed polygon defined by a sequence of points.
///
/// The polygon is implicitly closed - the last point connects back to the first.
/// Points are ordered counter-clockwise for outer contours (positive area)
/// and clockwise for holes (negative area).
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Create a new empty polygon.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polygon from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Get the points of this polygon.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get a mutable reference to the points.
    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    /// Consume the polygon and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Get the number of points in the polygon.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polygon is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the polygon.
    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the first point.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Get the line segment at the given index (from point[i] to point[i+1], wrapping).
    #[inline]
    pub fn edge(&self, index: usize) -> Line {
        let len = self.points.len();
        Line::new(self.points[index % len], self.points[(index + 1) % len])
    }

    /// Get all edges of the polygon.
    pub fn edges(&self) -> Vec<Line> {
        if self.points.len() < 2 {
            return Vec::new();
        }

        let mut edges = Vec::with_capacity(self.points.len());
        for i in 0..self.points.len() {
            edges.push(self.edge(i));
        }
        edges
    }

    /// Calculate the signed area of the polygon.
    /// Positive for counter-clockwise (exterior), negative for clockwise (hole).
    /// Uses the shoelace formula.
    pub fn signed_area(&self) -> CoordF {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut sum: i128 = 0;
        for i in 0..self.points.len() {
            let j = (i + 1) % self.points.len();
            sum += self.points[i].x as i128 * self.points[j].y as i128;
            sum -= self.points[j].x as i128 * self.points[i].y as i128;
        }

        sum as CoordF / 2.0
    }

    /// Calculate the unsigned area of the polygon (scaled units squared).
    #[inline]
    pub fn area(&self) -> CoordF {
        self.signed_area().abs()
    }

    /// Check if the polygon is counter-clockwise (positive area).
    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Check if the polygon is clockwise (negative area).
    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Ensure the polygon is counter-clockwise by reversing if necessary.
    pub fn make_counter_clockwise(&mut self) {
        if self.is_clockwise() {
            self.reverse();
        }
    }

    /// Ensure the polygon is clockwise by reversing if necessary.
    pub fn make_clockwise(&mut self) {
        if self.is_counter_clockwise() {
            self.reverse();
        }
    }

    /// Reverse the order of points in the polygon.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Calculate the perimeter (total edge length) of the polygon.
    pub fn length(&self) -> CoordF {
        if self.points.len() < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        for i in 0..self.points.len() {
            total += self.edge(i).length();
        }
        total
    }

    /// Calculate the centroid (center of mass) of the polygon.
    pub fn centroid(&self) -> Point {
        if self.points.is_empty() {
            return Point::zero();
        }

        if self.points.len() < 3 {
            let sum_x: i128 = self.points.iter().map(|p| p.x as i128).sum();
            let sum_y: i128 = self.points.iter().map(|p| p.y as i128).sum();
            return Point::new(
                (sum_x / self.points.len() as i128) as Coord,
                (sum_y / self.points.len() as i128) as Coord,
            );
        }

        let mut cx: i128 = 0;
        let mut cy: i128 = 0;
        let mut area: i128 = 0;

        for i in 0..self.points.len() {
            let j = (i + 1) % self.points.len();
            let cross = self.points[i].x as i128 * self.points[j].y as i128
                - self.points[j].x as i128 * self.points[i].y as i128;
            cx += (self.points[i].x as i128 + self.points[j].x as i128) * cross;
            cy += (self.points[i].y as i128 + self.points[j].y as i128) * cross;
            area += cross;
        }

        if area == 0 {
            // Degenerate polygon, fall back to the vertex average
            let sum_x: i128 = self.points.iter().map(|p| p.x as i128).sum();
            let sum_y: i128 = self.points.iter().map(|p| p.y as i128).sum();
            return Point::new(
                (sum_x / self.points.len() as i128) as Coord,
                (sum_y / self.points.len() as i128) as Coord,
            );
        }

        Point::new((cx / (3 * area)) as Coord, (cy / (3 * area)) as Coord)
    }

    /// Get the bounding box of the polygon.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Check if a point is strictly inside the polygon, using ray casting.
    /// Winding does not matter.
    pub fn encloses_point(&self, p: &Point) -> bool {
        if self.points.len() < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = self.points.len() - 1;

        for i in 0..self.points.len() {
            let pi = &self.points[i];
            let pj = &self.points[j];

            if ((pi.y > p.y) != (pj.y > p.y))
                && (p.x as i128)
                    < (pj.x as i128 - pi.x as i128) * (p.y as i128 - pi.y as i128)
                        / (pj.y as i128 - pi.y as i128)
                        + pi.x as i128
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Translate the polygon by a vector.
    pub fn translate(&mut self, v: Point) {
        for p in &mut self.points {
            *p = *p + v;
        }
    }

    /// Simplify the polygon by removing collinear and duplicate points.
    pub fn simplify(&mut self, tolerance: Coord) {
        if self.points.len() < 3 {
            return;
        }

        let mut new_points = Vec::with_capacity(self.points.len());
        let mut prev_idx = self.points.len() - 1;

        for i in 0..self.points.len() {
            let next_idx = (i + 1) % self.points.len();

            if self.points[i].coincides_with(&self.points[next_idx], tolerance) {
                continue;
            }

            let prev = self.points[prev_idx];
            let curr = self.points[i];
            let next = self.points[next_idx];

            let line = Line::new(prev, next);
            let dist = line.distance_to_point(&curr);

            if dist > tolerance as CoordF {
                new_points.push(curr);
            }

            prev_idx = i;
        }

        self.points = new_points;
    }

    /// Check if this polygon is valid (at least 3 points, non-zero area).
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3 && self.signed_area().abs() > 0.0
    }

    /// Convert to a polyline (open path).
    pub fn to_polyline(&self) -> Polyline {
        Polyline::from_points(self.points.clone())
    }

    /// Open the loop at its first point: the resulting polyline visits every
    /// vertex and returns to the start.
    pub fn split_at_first_point(&self) -> Polyline {
        let mut points = self.points.clone();
        if !points.is_empty() {
            points.push(points[0]);
        }
        Polyline::from_points(points)
    }

    /// Create a rectangular polygon.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::from_points(vec![
            min,
            Point::new(max.x, min.y),
            max,
            Point::new(min.x, max.y),
        ])
    }

    /// Create a circle approximation with n segments, centered at a point.
    pub fn circle(center: Point, radius: Coord, segments: usize) -> Self {
        let mut points = Vec::with_capacity(segments);
        for i in 0..segments {
            let angle = 2.0 * std::f64::consts::PI * i as CoordF / segments as CoordF;
            points.push(Point::new(
                center.x + (radius as CoordF * angle.cos()).round() as Coord,
                center.y + (radius as CoordF * angle.sin()).round() as Coord,
            ));
        }
        Self::from_points(points)
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({} points)", self.points.len())
    }
}

impl Deref for Polygon {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polygon {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

/// Type alias for a collection of polygons.
pub type Polygons = Vec<Polygon>;
