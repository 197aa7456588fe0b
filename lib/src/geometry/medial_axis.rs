//! Medial-axis approximation for thin regions.
//!
//! Thin walls and gap regions are too narrow to host a perimeter loop;
//! they are printed as a single variable-width pass along the region's
//! skeleton. The skeleton of an open sliver is traced by pairing the two
//! boundary chains between the region's extremal points and emitting
//! chord midpoints; a thin ring (expolygon with a hole) pairs the
//! contour against its largest hole and yields a closed skeleton.
//!
//! Chords wider than the requested width are dropped, which splits a
//! branch where the region widens beyond what one pass can fill.

use super::{ExPolygon, Point, Polygon, Polyline};
use crate::{Coord, CoordF, SCALED_RESOLUTION};
use serde::{Deserialize, Serialize};

/// One branch of a medial axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MedialAxisShape {
    /// An open skeleton branch.
    Open(Polyline),
    /// A fully closed skeleton (thin ring).
    Closed(Polygon),
}

impl MedialAxisShape {
    /// Total length of the branch (scaled units).
    pub fn length(&self) -> CoordF {
        match self {
            MedialAxisShape::Open(pl) => pl.length(),
            MedialAxisShape::Closed(poly) => poly.length(),
        }
    }

    /// The branch points, open or closed.
    pub fn points(&self) -> &[Point] {
        match self {
            MedialAxisShape::Open(pl) => pl.points(),
            MedialAxisShape::Closed(poly) => poly.points(),
        }
    }
}

/// Compute the skeleton of `expolygon`, suitable for tracing the region
/// with a single pass of width up to `max_width` (scaled units).
pub fn medial_axis(expolygon: &ExPolygon, max_width: Coord) -> Vec<MedialAxisShape> {
    if expolygon.contour.len() < 3 || max_width <= 0 {
        return Vec::new();
    }

    if expolygon.has_holes() {
        return ring_skeleton(expolygon, max_width);
    }

    sliver_skeleton(&expolygon.contour, max_width)
}

/// Skeleton of a hole-free sliver: midpoints of chords between the two
/// boundary chains joining the extremal points.
fn sliver_skeleton(contour: &Polygon, max_width: Coord) -> Vec<MedialAxisShape> {
    let points = contour.points();
    let n = points.len();

    // The two ends of the sliver: the vertex farthest from the centroid,
    // then the vertex farthest from that one.
    let centroid = contour.centroid();
    let i0 = farthest_index(points, &centroid);
    let i1 = farthest_index(points, &points[i0]);
    if i0 == i1 {
        return Vec::new();
    }

    // Boundary chains from i0 to i1, walking each way around the loop.
    let mut side_a = Vec::new();
    let mut idx = i0;
    loop {
        side_a.push(points[idx]);
        if idx == i1 {
            break;
        }
        idx = (idx + 1) % n;
    }

    let mut side_b = Vec::new();
    idx = i0;
    loop {
        side_b.push(points[idx]);
        if idx == i1 {
            break;
        }
        idx = (idx + n - 1) % n;
    }

    let branches = paired_midpoints(&side_a, &side_b, max_width);
    branches
        .into_iter()
        .filter(|pl| pl.is_valid() && pl.length() >= max_width as CoordF / 2.0)
        .map(MedialAxisShape::Open)
        .collect()
}

/// Skeleton of a thin ring: chord midpoints between the contour and its
/// largest hole, returned as a closed polygon.
fn ring_skeleton(expolygon: &ExPolygon, max_width: Coord) -> Vec<MedialAxisShape> {
    let Some(hole) = expolygon.holes.iter().max_by(|a, b| {
        a.area()
            .partial_cmp(&b.area())
            .unwrap_or(std::cmp::Ordering::Equal)
    }) else {
        return Vec::new();
    };

    if hole.len() < 3 {
        return Vec::new();
    }

    let step = sample_step(max_width);
    let samples = ((expolygon.contour.length() / step as CoordF).ceil() as usize).clamp(8, 4096);

    let contour_pts = closed_chain(&expolygon.contour);
    let contour_len = chain_length(&contour_pts);

    let mut skeleton = Vec::with_capacity(samples);
    for k in 0..samples {
        let t = k as CoordF / samples as CoordF;
        let on_contour = point_along(&contour_pts, t * contour_len);
        let on_hole = closest_on_polygon(hole, &on_contour);
        let mid = Point::new(
            (on_contour.x + on_hole.x) / 2,
            (on_contour.y + on_hole.y) / 2,
        );
        skeleton.push(mid);
    }

    skeleton.dedup();
    if skeleton.len() < 3 {
        return Vec::new();
    }

    vec![MedialAxisShape::Closed(Polygon::from_points(skeleton))]
}

/// Walk two boundary chains in lockstep (by normalized arc length) and
/// collect chord midpoints. A chord wider than `max_width` ends the
/// current branch.
fn paired_midpoints(side_a: &[Point], side_b: &[Point], max_width: Coord) -> Vec<Polyline> {
    let len_a = chain_length(side_a);
    let len_b = chain_length(side_b);
    if len_a <= 0.0 && len_b <= 0.0 {
        return Vec::new();
    }

    let step = sample_step(max_width);
    let samples = ((len_a.max(len_b) / step as CoordF).ceil() as usize).clamp(2, 4096);

    // A sliver's width can exceed the nominal bead width slightly and
    // still be traceable in one pass.
    let width_limit = (max_width as CoordF * 1.05) as i128;
    let width_limit_sq = width_limit * width_limit;

    let mut branches = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for k in 0..=samples {
        let t = k as CoordF / samples as CoordF;
        let a = point_along(side_a, t * len_a);
        let b = point_along(side_b, t * len_b);

        if a.distance_squared(&b) <= width_limit_sq {
            let mid = Point::new((a.x + b.x) / 2, (a.y + b.y) / 2);
            if current.last() != Some(&mid) {
                current.push(mid);
            }
        } else if current.len() >= 2 {
            branches.push(Polyline::from_points(std::mem::take(&mut current)));
        } else {
            current.clear();
        }
    }

    if current.len() >= 2 {
        branches.push(Polyline::from_points(current));
    }

    branches
}

fn sample_step(max_width: Coord) -> Coord {
    (max_width / 2).max(SCALED_RESOLUTION)
}

fn farthest_index(points: &[Point], from: &Point) -> usize {
    let mut best = 0;
    let mut best_dist = -1i128;
    for (i, p) in points.iter().enumerate() {
        let d = from.distance_squared(p);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn chain_length(points: &[Point]) -> CoordF {
    let mut total = 0.0;
    for w in points.windows(2) {
        total += w[0].distance(&w[1]);
    }
    total
}

fn closed_chain(polygon: &Polygon) -> Vec<Point> {
    let mut pts = polygon.points().to_vec();
    if let Some(&first) = pts.first() {
        pts.push(first);
    }
    pts
}

/// The point at arc-length `dist` along a chain of points.
fn point_along(points: &[Point], dist: CoordF) -> Point {
    if points.is_empty() {
        return Point::zero();
    }
    let mut remaining = dist.max(0.0);
    for w in points.windows(2) {
        let seg = w[0].distance(&w[1]);
        if remaining <= seg && seg > 0.0 {
            let t = remaining / seg;
            return Point::new(
                (w[0].x as CoordF + t * (w[1].x - w[0].x) as CoordF).round() as Coord,
                (w[0].y as CoordF + t * (w[1].y - w[0].y) as CoordF).round() as Coord,
            );
        }
        remaining -= seg;
    }
    *points.last().unwrap()
}

fn closest_on_polygon(polygon: &Polygon, p: &Point) -> Point {
    let mut closest = polygon.first_point();
    let mut min_dist = i128::MAX;
    for edge in polygon.edges() {
        let proj = edge.project_point(p);
        let dist = p.distance_squared(&proj);
        if dist < min_dist {
            min_dist = dist;
            closest = proj;
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale;

    fn thin_rect_mm(length: f64, width: f64) -> ExPolygon {
        ExPolygon::new(Polygon::rectangle(
            Point::new(0, 0),
            Point::new(scale(length), scale(width)),
        ))
    }

    #[test]
    fn test_sliver_centerline() {
        // A 20mm x 0.3mm sliver traced at 0.5mm width
        let sliver = thin_rect_mm(20.0, 0.3);
        let axis = medial_axis(&sliver, scale(0.5));

        assert_eq!(axis.len(), 1);
        let branch = &axis[0];
        assert!(matches!(branch, MedialAxisShape::Open(_)));

        // Centerline runs nearly the full length of the sliver
        assert!(branch.length() > scale(18.0) as f64);

        // Away from the tips, skeleton points sit on the center of the
        // 0.3mm dimension
        let pts = branch.points();
        for p in &pts[2..pts.len() - 2] {
            assert!((p.y - scale(0.15)).abs() < scale(0.05));
        }
    }

    #[test]
    fn test_wide_region_yields_nothing() {
        // A 10mm x 10mm square is far wider than one 0.5mm pass
        let square = thin_rect_mm(10.0, 10.0);
        let axis = medial_axis(&square, scale(0.5));
        assert!(axis.is_empty());
    }

    #[test]
    fn test_thin_ring_closed_skeleton() {
        // 10mm OD ring with 9.4mm ID hole: a 0.3mm wall all around
        let outer = Polygon::circle(Point::zero(), scale(5.0), 64);
        let mut inner = Polygon::circle(Point::zero(), scale(4.7), 64);
        inner.make_clockwise();
        let ring = ExPolygon::with_holes(outer, vec![inner]);

        let axis = medial_axis(&ring, scale(0.5));
        assert_eq!(axis.len(), 1);
        assert!(matches!(axis[0], MedialAxisShape::Closed(_)));

        // Skeleton radius should be close to 4.85mm
        for p in axis[0].points() {
            let r = p.length();
            assert!((r - scale(4.85) as f64).abs() < scale(0.1) as f64);
        }
    }

    #[test]
    fn test_empty_input() {
        let empty = ExPolygon::default();
        assert!(medial_axis(&empty, scale(0.5)).is_empty());
    }
}
