//! Merging sliced loops into expolygons.
//!
//! The loops a planar slice produces are not suitable for an even-odd or
//! non-zero fill rule: consecutive concentric loops can share a winding
//! direction and must still alternate between contour and hole. Instead
//! the loops are folded one by one, outermost first, unioning solids and
//! subtracting holes.

use crate::clipper::{diff_ex, offset_polygon, shrink, union_ex, union_polygons_ex, OffsetJoinType, SAFETY_OFFSET_MM};
use crate::geometry::{ExPolygons, Polygon};
use crate::surface::{Surface, Surfaces};
use log::debug;

/// Merge oriented slice loops into well-formed internal surfaces.
///
/// Loops with fewer than three distinct points are dropped. The loops
/// are sorted so that any loop precedes every loop it encloses (a
/// topological order of the containment relation; order among
/// non-nested siblings is unspecified), then folded in that order:
/// counter-clockwise loops add area, clockwise loops remove it.
///
/// Every loop is safety-grown on its filled side before the fold and
/// the result is shrunk back, so coincident edges between a contour and
/// the hole it touches cannot destabilize the Booleans.
pub fn merge_loops(loops: &[Polygon]) -> Surfaces {
    let loops: Vec<&Polygon> = loops.iter().filter(|l| l.is_valid()).collect();
    if loops.is_empty() {
        return Vec::new();
    }

    // Containment depth of each loop: how many other loops enclose it.
    // Sorting by depth puts outer loops first.
    let mut order: Vec<(usize, usize)> = loops
        .iter()
        .enumerate()
        .map(|(i, lp)| {
            let depth = loops
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && other.encloses_point(&lp.first_point()))
                .count();
            (depth, i)
        })
        .collect();
    order.sort_by_key(|&(depth, _)| depth);

    let mut result: ExPolygons = Vec::new();
    for &(_, idx) in &order {
        let lp = loops[idx];
        let is_solid = lp.is_counter_clockwise();

        // Safety-grow the filled side: solids outward, holes make the
        // subtracted area slightly larger.
        let mut area = lp.clone();
        area.make_counter_clockwise();
        let grown = union_polygons_ex(&offset_polygon(
            &area,
            if is_solid {
                SAFETY_OFFSET_MM
            } else {
                -SAFETY_OFFSET_MM
            },
            OffsetJoinType::Miter,
        ));

        if is_solid {
            let mut merged = result;
            merged.extend(grown);
            result = union_ex(&merged);
        } else {
            result = diff_ex(&result, &grown, false);
        }
    }

    // Undo the safety growth.
    let result = shrink(&result, SAFETY_OFFSET_MM, OffsetJoinType::Miter);

    debug!("merge_loops: {} loops -> {} expolygons", loops.len(), result.len());

    result.into_iter().map(Surface::internal).collect()
}
