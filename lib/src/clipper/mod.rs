//! Clipper polygon boolean operations module.
//!
//! This module provides polygon boolean operations (union, intersection,
//! difference) and offset operations using the geo-clipper library.
//!
//! These operations carry the whole region pipeline:
//! - nested perimeter offsets
//! - slice / thin-wall separation
//! - gap detection between perimeter depths
//! - bridge region algebra
//!
//! All deltas are in mm; geometry stays in scaled integer coordinates and
//! is converted at the boundary of each call.

use crate::geometry::{ExPolygon, ExPolygons, Line, Point, Polygon, Polygons, Polyline, Polylines};
use crate::{unscale, Coord, CoordF};
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Clipper's internal fixed-point factor for mm coordinates.
const CLIPPER_FACTOR: f64 = 1000.0;

/// Epsilon used by [`safety_offset`]: grow by this much and re-union to
/// absorb near-coincident edges before a Boolean (mm).
pub const SAFETY_OFFSET_MM: CoordF = 0.1;

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    /// Square corners
    Square,
    /// Round corners
    Round,
    /// Mitered corners
    #[default]
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(0.25), // Default arc tolerance
            OffsetJoinType::Miter => JoinType::Miter(2.0),  // Default miter limit
        }
    }
}

// ============================================================================
// Type conversions
// ============================================================================

fn ring_from_points(points: &[Point]) -> LineString<f64> {
    let mut ring: Vec<GeoCoord<f64>> = points
        .iter()
        .map(|p| GeoCoord {
            x: unscale(p.x),
            y: unscale(p.y),
        })
        .collect();

    // geo rings are explicitly closed
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(*first);
        }
    }

    LineString::new(ring)
}

fn polygon_to_geo(poly: &Polygon) -> GeoPolygon<f64> {
    GeoPolygon::new(ring_from_points(poly.points()), vec![])
}

fn expolygon_to_geo(expoly: &ExPolygon) -> GeoPolygon<f64> {
    let holes = expoly
        .holes
        .iter()
        .map(|hole| ring_from_points(hole.points()))
        .collect();

    GeoPolygon::new(ring_from_points(expoly.contour.points()), holes)
}

fn ring_to_polygon(ring: &LineString<f64>) -> Polygon {
    let mut points: Vec<Point> = ring
        .coords()
        .map(|c| Point::new(crate::scale(c.x), crate::scale(c.y)))
        .collect();

    // Drop the closing point (our Polygon doesn't store it)
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    Polygon::from_points(points)
}

fn geo_to_expolygon(geo_poly: &GeoPolygon<f64>) -> ExPolygon {
    let contour = ring_to_polygon(geo_poly.exterior());
    let holes: Vec<Polygon> = geo_poly.interiors().iter().map(ring_to_polygon).collect();
    let mut expoly = ExPolygon::with_holes(contour, holes);
    expoly.make_canonical();
    expoly
}

fn geo_multi_to_expolygons(multi: &MultiPolygon<f64>) -> ExPolygons {
    multi
        .0
        .iter()
        .map(geo_to_expolygon)
        .filter(|ex| ex.contour.len() >= 3)
        .collect()
}

fn expolygons_to_geo_multi(expolys: &[ExPolygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(expolys.iter().map(expolygon_to_geo).collect())
}

fn polygons_to_geo_multi(polys: &[Polygon]) -> MultiPolygon<f64> {
    // Each polygon stands alone as a filled area; holes are handled by
    // whoever assembled the set.
    MultiPolygon::new(polys.iter().map(polygon_to_geo).collect())
}

// ============================================================================
// Boolean Operations
// ============================================================================

/// Re-union a set of (possibly overlapping) ExPolygons into a well-formed set.
pub fn union_ex(expolygons: &[ExPolygon]) -> ExPolygons {
    if expolygons.is_empty() {
        return vec![];
    }
    if expolygons.len() == 1 {
        return expolygons.to_vec();
    }

    let subject = expolygons_to_geo_multi(expolygons);
    let result = subject.union(&MultiPolygon::new(vec![]), CLIPPER_FACTOR);
    geo_multi_to_expolygons(&result)
}

/// Union a set of area polygons (all wound as filled areas) into ExPolygons.
pub fn union_polygons_ex(polygons: &[Polygon]) -> ExPolygons {
    if polygons.is_empty() {
        return vec![];
    }

    let subject = polygons_to_geo_multi(polygons);
    let result = subject.union(&MultiPolygon::new(vec![]), CLIPPER_FACTOR);
    geo_multi_to_expolygons(&result)
}

/// Compute the intersection of two sets of polygons.
pub fn intersection_ex(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    if subject.is_empty() || clip.is_empty() {
        return vec![];
    }

    let subject_geo = expolygons_to_geo_multi(subject);
    let clip_geo = expolygons_to_geo_multi(clip);

    let result = subject_geo.intersection(&clip_geo, CLIPPER_FACTOR);
    geo_multi_to_expolygons(&result)
}

/// Compute the difference of two sets of polygons (subject - clip).
///
/// With `safety` set, the clip is passed through [`safety_offset_ex`]
/// first so coincident edges cannot leave slivers behind.
pub fn diff_ex(subject: &[ExPolygon], clip: &[ExPolygon], safety: bool) -> ExPolygons {
    if subject.is_empty() {
        return vec![];
    }
    if clip.is_empty() {
        return subject.to_vec();
    }

    let clip_set;
    let clip = if safety {
        clip_set = safety_offset_ex(clip);
        &clip_set[..]
    } else {
        clip
    };

    let subject_geo = expolygons_to_geo_multi(subject);
    let clip_geo = expolygons_to_geo_multi(clip);

    let result = subject_geo.difference(&clip_geo, CLIPPER_FACTOR);
    geo_multi_to_expolygons(&result)
}

// ============================================================================
// Offset Operations
// ============================================================================

/// Offset a single polygon by a signed mm delta, returning area polygons.
pub fn offset_polygon(polygon: &Polygon, delta: CoordF, join_type: OffsetJoinType) -> Polygons {
    let geo_poly = polygon_to_geo(polygon);
    let result = geo_poly.offset(delta, join_type.into(), EndType::ClosedPolygon, CLIPPER_FACTOR);
    crate::geometry::to_polygons(&geo_multi_to_expolygons(&result))
}

/// Offset ExPolygons by a signed mm delta, returning flattened polygons.
///
/// Positive deltas grow the filled region (contours outward, holes
/// inward); negative deltas shrink it. An offset that collapses the
/// region returns the empty set.
pub fn offset(expolygons: &[ExPolygon], delta: CoordF, join_type: OffsetJoinType) -> Polygons {
    crate::geometry::to_polygons(&offset_ex(expolygons, delta, join_type))
}

/// Offset ExPolygons by a signed mm delta, re-unioning into ExPolygons.
pub fn offset_ex(expolygons: &[ExPolygon], delta: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    if expolygons.is_empty() {
        return vec![];
    }

    let geo_multi = expolygons_to_geo_multi(expolygons);
    let result = geo_multi.offset(delta, join_type.into(), EndType::ClosedPolygon, CLIPPER_FACTOR);
    geo_multi_to_expolygons(&result)
}

/// Offset each ExPolygon separately, never merging independent islands
/// and never letting one island's collapse disturb another.
pub fn noncollapsing_offset_ex(
    expolygons: &[ExPolygon],
    delta: CoordF,
    join_type: OffsetJoinType,
) -> ExPolygons {
    let mut result = Vec::with_capacity(expolygons.len());
    for expoly in expolygons {
        result.extend(offset_ex(std::slice::from_ref(expoly), delta, join_type));
    }
    result
}

/// Offset by `delta1` then `delta2` (both signed, mm), returning polygons.
///
/// The classic erase-and-regrow: `offset2(ex, -w, +w/2)` nets an inset of
/// w/2 while erasing features narrower than w.
pub fn offset2(
    expolygons: &[ExPolygon],
    delta1: CoordF,
    delta2: CoordF,
    join_type: OffsetJoinType,
) -> Polygons {
    crate::geometry::to_polygons(&offset2_ex(expolygons, delta1, delta2, join_type))
}

/// Offset by `delta1` then `delta2` (both signed, mm), returning ExPolygons.
pub fn offset2_ex(
    expolygons: &[ExPolygon],
    delta1: CoordF,
    delta2: CoordF,
    join_type: OffsetJoinType,
) -> ExPolygons {
    let first = offset_ex(expolygons, delta1, join_type);
    if first.is_empty() {
        return vec![];
    }
    offset_ex(&first, delta2, join_type)
}

/// Shrink (inset) ExPolygons by a given distance (mm).
pub fn shrink(expolygons: &[ExPolygon], distance: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    offset_ex(expolygons, -distance.abs(), join_type)
}

/// Grow (outset) ExPolygons by a given distance (mm).
pub fn grow(expolygons: &[ExPolygon], distance: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    offset_ex(expolygons, distance.abs(), join_type)
}

/// Grow area polygons by [`SAFETY_OFFSET_MM`] and re-union.
///
/// Stabilizes Booleans over inputs with coincident or near-coincident
/// edges. Undo with a matching shrink where exact extents matter.
pub fn safety_offset(polygons: &[Polygon]) -> Polygons {
    if polygons.is_empty() {
        return vec![];
    }
    let geo_multi = polygons_to_geo_multi(polygons);
    let result = geo_multi.offset(
        SAFETY_OFFSET_MM,
        JoinType::Miter(2.0),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    );
    crate::geometry::to_polygons(&geo_multi_to_expolygons(&result))
}

/// Grow ExPolygons by [`SAFETY_OFFSET_MM`] and re-union.
pub fn safety_offset_ex(expolygons: &[ExPolygon]) -> ExPolygons {
    offset_ex(expolygons, SAFETY_OFFSET_MM, OffsetJoinType::Miter)
}

// ============================================================================
// Polyline clipping
// ============================================================================

/// Clip polylines to the area covered by `clip`, keeping the covered
/// portions. Containment over the polygon set is even-odd, so hole rings
/// in the set carve area out.
///
/// The clipping is exact: original vertices survive, and a straight
/// segment that crosses the area comes back as a two-point polyline.
pub fn intersection_pl(polylines: &[Polyline], clip: &[Polygon]) -> Polylines {
    clip_polylines(polylines, clip, true)
}

/// Clip polylines to the area NOT covered by `clip`.
pub fn diff_pl(polylines: &[Polyline], clip: &[Polygon]) -> Polylines {
    clip_polylines(polylines, clip, false)
}

fn clip_polylines(polylines: &[Polyline], clip: &[Polygon], keep_inside: bool) -> Polylines {
    if polylines.is_empty() {
        return vec![];
    }
    if clip.is_empty() {
        return if keep_inside {
            vec![]
        } else {
            polylines.to_vec()
        };
    }

    let mut result = Vec::new();
    for polyline in polylines {
        clip_one_polyline(polyline, clip, keep_inside, &mut result);
    }
    result
}

fn point_covered(clip: &[Polygon], p: &Point) -> bool {
    let mut crossings = 0;
    for poly in clip {
        if poly.encloses_point(p) {
            crossings += 1;
        }
    }
    crossings % 2 == 1
}

/// Parametric intersections of segment `seg` with every clip edge.
fn segment_params(seg: &Line, clip: &[Polygon]) -> Vec<CoordF> {
    let d1 = seg.direction();
    let mut params = vec![0.0, 1.0];

    for poly in clip {
        for edge in poly.edges() {
            let d2 = edge.direction();
            let cross = d1.cross(&d2);
            if cross == 0 {
                continue;
            }
            let diff = edge.a - seg.a;
            let t = diff.cross(&d2) as CoordF / cross as CoordF;
            let u = diff.cross(&d1) as CoordF / cross as CoordF;
            if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
                params.push(t);
            }
        }
    }

    params.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    params.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    params
}

fn lerp_segment(a: Point, b: Point, t: CoordF) -> Point {
    Point::new(
        (a.x as CoordF + t * (b.x - a.x) as CoordF).round() as Coord,
        (a.y as CoordF + t * (b.y - a.y) as CoordF).round() as Coord,
    )
}

fn clip_one_polyline(polyline: &Polyline, clip: &[Polygon], keep_inside: bool, out: &mut Polylines) {
    let points = polyline.points();
    if points.len() < 2 {
        return;
    }

    let mut pieces: Polylines = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut flush = |current: &mut Vec<Point>| {
        if current.len() >= 2 {
            pieces.push(Polyline::from_points(std::mem::take(current)));
        } else {
            current.clear();
        }
    };

    for i in 0..points.len() - 1 {
        let a = points[i];
        let b = points[i + 1];
        if a == b {
            continue;
        }
        let seg = Line::new(a, b);

        let params = segment_params(&seg, clip);
        for w in params.windows(2) {
            let (t0, t1) = (w[0], w[1]);
            if t1 - t0 < 1e-9 {
                continue;
            }
            let mid = lerp_segment(a, b, (t0 + t1) / 2.0);
            let keep = point_covered(clip, &mid) == keep_inside;

            if keep {
                let p0 = lerp_segment(a, b, t0);
                let p1 = lerp_segment(a, b, t1);
                if current.is_empty() {
                    current.push(p0);
                } else if *current.last().unwrap() != p0 {
                    // Interval is disconnected from the run in progress
                    flush(&mut current);
                    current.push(p0);
                }
                if *current.last().unwrap() != p1 {
                    current.push(p1);
                }
            } else {
                flush(&mut current);
            }
        }
    }

    flush(&mut current);
    drop(flush);

    // A closed input whose seam lies in the kept area splits at the
    // seam; stitch the wrap-around pieces back into one.
    if polyline.is_closed() && pieces.len() >= 2 {
        let starts_at_seam = pieces[0].first_point() == polyline.first_point();
        let ends_at_seam = pieces.last().unwrap().last_point() == polyline.last_point();
        if starts_at_seam && ends_at_seam {
            let first = pieces.remove(0);
            let last = pieces.last_mut().unwrap();
            for p in first.points().iter().skip(1) {
                last.push(*p);
            }
        }
    }

    out.extend(pieces);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::{scale, SCALING_FACTOR};

    fn make_square_mm(x: f64, y: f64, size: f64) -> ExPolygon {
        let poly = Polygon::rectangle(
            Point::new_scale(x, y),
            Point::new_scale(x + size, y + size),
        );
        poly.into()
    }

    fn total_area(expolygons: &[ExPolygon]) -> CoordF {
        expolygons.iter().map(|p| p.area()).sum()
    }

    #[test]
    fn test_offset_grow_shrink() {
        let square = make_square_mm(10.0, 10.0, 10.0);
        let original_area = square.area();

        let grown = grow(&[square.clone()], 1.0, OffsetJoinType::Miter);
        assert!(!grown.is_empty());
        assert!(total_area(&grown) > original_area);

        let shrunk = shrink(&[square], 1.0, OffsetJoinType::Miter);
        assert!(!shrunk.is_empty());
        assert!(total_area(&shrunk) < original_area);
    }

    #[test]
    fn test_offset_collapse() {
        // 2mm square shrunk by 2mm collapses to nothing
        let square = make_square_mm(10.0, 10.0, 2.0);
        let shrunk = shrink(&[square], 2.0, OffsetJoinType::Miter);
        assert!(shrunk.is_empty() || shrunk.iter().all(|p| p.area().abs() < 1e-6));
    }

    #[test]
    fn test_offset_inset_distance() {
        // A 20mm square inset by 1mm is an 18mm square
        let square = make_square_mm(0.0, 0.0, 20.0);
        let inset = shrink(&[square], 1.0, OffsetJoinType::Miter);
        assert_eq!(inset.len(), 1);

        let bb = inset[0].bounding_box();
        assert!((bb.min.x - scale(1.0)).abs() < scale(0.01));
        assert!((bb.max.x - scale(19.0)).abs() < scale(0.01));
    }

    #[test]
    fn test_union_of_overlapping_squares() {
        let square1 = make_square_mm(0.0, 0.0, 10.0);
        let square2 = make_square_mm(5.0, 0.0, 10.0);

        let result = union_ex(&[square1.clone(), square2.clone()]);
        assert_eq!(result.len(), 1);

        let union_area = total_area(&result);
        assert!(union_area < square1.area() + square2.area());
        assert!(union_area > square1.area());
    }

    #[test]
    fn test_intersection() {
        let square1 = make_square_mm(0.0, 0.0, 10.0);
        let square2 = make_square_mm(5.0, 0.0, 10.0);

        let result = intersection_ex(&[square1], &[square2]);
        assert_eq!(result.len(), 1);

        // 5mm x 10mm overlap
        let expected = 50.0 * SCALING_FACTOR * SCALING_FACTOR;
        assert!((total_area(&result) - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_intersection_idempotent() {
        let square = make_square_mm(0.0, 0.0, 10.0);
        let result = intersection_ex(&[square.clone()], &[square.clone()]);
        let diff = (total_area(&result) - square.area()).abs();
        assert!(diff / square.area() < 0.001);
    }

    #[test]
    fn test_difference_creates_hole() {
        let large = make_square_mm(0.0, 0.0, 20.0);
        let small = make_square_mm(5.0, 5.0, 10.0);

        let result = diff_ex(&[large.clone()], &[small.clone()], false);
        assert_eq!(result.len(), 1);
        assert!(result[0].has_holes());

        let expected = large.area() - small.area();
        assert!((total_area(&result) - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_diff_ex_roundtrip_subset() {
        // diff(A ∪ B, B) ⊆ A
        let a = make_square_mm(0.0, 0.0, 10.0);
        let b = make_square_mm(8.0, 0.0, 10.0);

        let ab = union_ex(&[a.clone(), b.clone()]);
        let back = diff_ex(&ab, &[b], false);

        // Everything left must lie inside A (tolerance one safety epsilon)
        let outside = diff_ex(&back, &[grow(&[a], 0.01, OffsetJoinType::Miter)[0].clone()], false);
        assert!(total_area(&outside) < 0.05 * SCALING_FACTOR * SCALING_FACTOR);
    }

    #[test]
    fn test_diff_ex_safety_absorbs_coincident_edges() {
        // Subtracting a shape sharing an edge leaves no sliver with safety on
        let a = make_square_mm(0.0, 0.0, 20.0);
        let b = make_square_mm(0.0, 0.0, 10.0);

        let result = diff_ex(&[a], &[b], true);
        for expoly in &result {
            // No fragment should be a hair along the shared edge
            assert!(expoly.area() > 0.5 * SCALING_FACTOR * SCALING_FACTOR);
        }
    }

    #[test]
    fn test_offset2_erases_thin_features() {
        // 10mm body with a 0.5mm wide protrusion
        let body = Polygon::from_points(vec![
            Point::new_scale(0.0, 0.0),
            Point::new_scale(10.0, 0.0),
            Point::new_scale(10.0, 10.0),
            Point::new_scale(5.5, 10.0),
            Point::new_scale(5.5, 11.0),
            Point::new_scale(4.5, 11.0),
            Point::new_scale(4.5, 10.0),
            Point::new_scale(0.0, 10.0),
        ]);
        let expoly: ExPolygon = body.into();

        let result = offset2_ex(&[expoly], -1.0, 1.0, OffsetJoinType::Miter);
        assert!(!result.is_empty());

        // The protrusion is gone; the body survives
        let area_mm2 = total_area(&result) / (SCALING_FACTOR * SCALING_FACTOR);
        assert!(area_mm2 < 101.0);
        assert!(area_mm2 > 95.0);
        assert!(!result[0].contains_point(&Point::new_scale(5.0, 10.5)));
    }

    #[test]
    fn test_noncollapsing_offset_keeps_islands_separate() {
        let a = make_square_mm(0.0, 0.0, 5.0);
        let b = make_square_mm(5.5, 0.0, 5.0);

        // A plain grow by 1mm would merge the islands; the noncollapsing
        // variant keeps one result per input
        let result = noncollapsing_offset_ex(&[a, b], 1.0, OffsetJoinType::Miter);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_safety_offset_roundtrip() {
        let square = make_square_mm(0.0, 0.0, 10.0);
        let grown = safety_offset_ex(&[square.clone()]);
        let restored = shrink(&grown, SAFETY_OFFSET_MM, OffsetJoinType::Miter);

        assert_eq!(restored.len(), 1);
        let diff = (restored[0].area() - square.area()).abs();
        assert!(diff / square.area() < 0.01);
    }

    #[test]
    fn test_intersection_pl_straight_segment() {
        let clip = vec![Polygon::rectangle(
            Point::new_scale(0.0, 0.0),
            Point::new_scale(10.0, 10.0),
        )];
        // Horizontal line crossing the square
        let pl = Polyline::from_points(vec![Point::new_scale(-5.0, 5.0), Point::new_scale(15.0, 5.0)]);

        let clipped = intersection_pl(&[pl], &clip);
        assert_eq!(clipped.len(), 1);
        // A straight crossing stays a two-point polyline
        assert_eq!(clipped[0].len(), 2);
        assert!((clipped[0].first_point().x - 0).abs() < scale(0.01));
        assert!((clipped[0].last_point().x - scale(10.0)).abs() < scale(0.01));
    }

    #[test]
    fn test_intersection_pl_inside_and_outside() {
        let clip = vec![Polygon::rectangle(
            Point::new_scale(0.0, 0.0),
            Point::new_scale(10.0, 10.0),
        )];
        let inside = Polyline::from_points(vec![Point::new_scale(2.0, 2.0), Point::new_scale(8.0, 2.0)]);
        let outside =
            Polyline::from_points(vec![Point::new_scale(20.0, 2.0), Point::new_scale(30.0, 2.0)]);

        assert_eq!(intersection_pl(&[inside.clone()], &clip).len(), 1);
        assert!(intersection_pl(&[outside.clone()], &clip).is_empty());

        assert!(diff_pl(&[inside], &clip).is_empty());
        assert_eq!(diff_pl(&[outside], &clip).len(), 1);
    }

    #[test]
    fn test_intersection_pl_hole_carves_area() {
        // Square with a CW hole ring in the clip set: even-odd removes it
        let outer = Polygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(10.0, 10.0));
        let mut hole = Polygon::rectangle(Point::new_scale(4.0, 4.0), Point::new_scale(6.0, 6.0));
        hole.make_clockwise();
        let clip = vec![outer, hole];

        let pl = Polyline::from_points(vec![Point::new_scale(1.0, 5.0), Point::new_scale(9.0, 5.0)]);
        let clipped = intersection_pl(&[pl], &clip);

        // The hole splits the polyline in two
        assert_eq!(clipped.len(), 2);
    }
}
