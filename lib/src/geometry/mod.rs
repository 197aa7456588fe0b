//! Geometry primitives for the region core.
//!
//! - [`Point`] / [`PointF`] - 2D points, scaled-integer and mm flavors
//! - [`Line`] - line segment between two points
//! - [`Polygon`] - closed contour (CCW outer, CW hole)
//! - [`Polyline`] - open path
//! - [`ExPolygon`] - polygon with holes
//! - [`BoundingBox`] - axis-aligned bounding box
//! - [`medial_axis`] - skeleton of a thin region
//!
//! ## Coordinate System
//!
//! Scaled integer coordinates are used internally to keep the Boolean
//! algebra stable. Coordinates are scaled by `SCALING_FACTOR`
//! (1,000,000), so 1 unit = 1 nanometer.
//!
//! - Use `scale()` to convert from mm to internal units
//! - Use `unscale()` to convert from internal units to mm

mod bounding_box;
mod expolygon;
mod line;
mod medial_axis;
mod point;
mod polygon;
mod polyline;

pub use bounding_box::BoundingBox;
pub use expolygon::{to_polygons, ExPolygon, ExPolygons};
pub use line::{Line, Lines};
pub use medial_axis::{medial_axis, MedialAxisShape};
pub use point::{Point, PointF, Points};
pub use polygon::{Polygon, Polygons};
pub use polyline::{Polyline, Polylines};

/// Order items by a greedy nearest-neighbour walk over representative
/// points, starting from `start`. Returns the visiting order as indices.
///
/// Used to keep travel moves short when ordering islands, holes and
/// thin walls for printing.
pub fn chain_indices(start: Point, points: &[Point]) -> Vec<usize> {
    let mut order = Vec::with_capacity(points.len());
    let mut visited = vec![false; points.len()];
    let mut current = start;

    for _ in 0..points.len() {
        let mut best = None;
        let mut best_dist = i128::MAX;
        for (i, p) in points.iter().enumerate() {
            if visited[i] {
                continue;
            }
            let d = current.distance_squared(p);
            if d < best_dist {
                best_dist = d;
                best = Some(i);
            }
        }
        let Some(i) = best else { break };
        visited[i] = true;
        current = points[i];
        order.push(i);
    }

    order
}
