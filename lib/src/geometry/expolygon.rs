//! ExPolygon type for polygons with holes.

use super::{BoundingBox, Point, Polygon, Polyline};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A polygon with holes (exterior contour + interior hole contours).
///
/// The contour is the outer boundary (counter-clockwise for positive area).
/// The holes are interior boundaries (clockwise), all strictly inside the
/// contour and pairwise disjoint.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExPolygon {
    /// The outer contour of the polygon.
    pub contour: Polygon,
    /// The holes (interior contours) of the polygon.
    pub holes: Vec<Polygon>,
}

impl ExPolygon {
    /// Create a new ExPolygon with only a contour and no holes.
    #[inline]
    pub fn new(contour: Polygon) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    /// Create a new ExPolygon with a contour and holes.
    #[inline]
    pub fn with_holes(contour: Polygon, holes: Vec<Polygon>) -> Self {
        Self { contour, holes }
    }

    /// Check if the ExPolygon is empty (no contour points).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    /// Check if this ExPolygon has any holes.
    #[inline]
    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Calculate the area of the ExPolygon (contour area minus hole areas).
    pub fn area(&self) -> CoordF {
        let contour_area = self.contour.area();
        let holes_area: CoordF = self.holes.iter().map(|h| h.area()).sum();
        contour_area - holes_area
    }

    /// Calculate the total perimeter (contour + all holes).
    pub fn length(&self) -> CoordF {
        let contour_len = self.contour.length();
        let holes_len: CoordF = self.holes.iter().map(|h| h.length()).sum();
        contour_len + holes_len
    }

    /// Get the bounding box of the ExPolygon (same as contour's bounding box).
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.contour.bounding_box()
    }

    /// Check if a point is inside the ExPolygon (inside contour, outside every hole).
    pub fn contains_point(&self, p: &Point) -> bool {
        if !self.contour.encloses_point(p) {
            return false;
        }

        for hole in &self.holes {
            if hole.encloses_point(p) {
                return false;
            }
        }

        true
    }

    /// Ensure the contour is counter-clockwise and holes are clockwise.
    pub fn make_canonical(&mut self) {
        self.contour.make_counter_clockwise();
        for hole in &mut self.holes {
            hole.make_clockwise();
        }
    }

    /// Check if the ExPolygon has canonical orientation (contour CCW, holes CW).
    pub fn is_canonical(&self) -> bool {
        self.contour.is_counter_clockwise() && self.holes.iter().all(|h| h.is_clockwise())
    }

    /// Translate the ExPolygon by a vector.
    pub fn translate(&mut self, v: Point) {
        self.contour.translate(v);
        for hole in &mut self.holes {
            hole.translate(v);
        }
    }

    /// Simplify the ExPolygon by removing collinear and duplicate points.
    pub fn simplify(&mut self, tolerance: Coord) {
        self.contour.simplify(tolerance);
        for hole in &mut self.holes {
            hole.simplify(tolerance);
        }
        self.holes.retain(|h| h.len() >= 3);
    }

    /// Return a simplified copy of the ExPolygon.
    pub fn simplified(&self, tolerance: Coord) -> Self {
        let mut result = self.clone();
        result.simplify(tolerance);
        result
    }

    /// Check if the ExPolygon is valid.
    pub fn is_valid(&self) -> bool {
        self.contour.is_valid() && self.holes.iter().all(|h| h.is_valid())
    }

    /// Convert to a vector of polygons (contour first, then holes).
    pub fn to_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(1 + self.holes.len());
        result.push(self.contour.clone());
        result.extend(self.holes.iter().cloned());
        result
    }

    /// Convert contour and holes to closed polylines.
    pub fn to_polylines(&self) -> Vec<Polyline> {
        let mut result = Vec::with_capacity(1 + self.holes.len());
        result.push(self.contour.split_at_first_point());
        for hole in &self.holes {
            result.push(hole.split_at_first_point());
        }
        result
    }

    /// Create a rectangular ExPolygon.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::new(Polygon::rectangle(min, max))
    }
}

impl fmt::Debug for ExPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExPolygon(contour: {} points, {} holes)",
            self.contour.len(),
            self.holes.len()
        )
    }
}

impl From<Polygon> for ExPolygon {
    fn from(polygon: Polygon) -> Self {
        Self::new(polygon)
    }
}

/// Type alias for a collection of ExPolygons.
pub type ExPolygons = Vec<ExPolygon>;

/// Flatten a set of ExPolygons into their contour and hole polygons.
pub fn to_polygons(expolygons: &[ExPolygon]) -> Vec<Polygon> {
    let mut result = Vec::new();
    for expoly in expolygons {
        result.push(expoly.contour.clone());
        result.extend(expoly.holes.iter().cloned());
    }
    result
}
