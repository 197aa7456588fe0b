//! The `make_surfaces` stage: printable slices and thin walls.

use crate::clipper::{diff_ex, offset2_ex, offset_ex, union_ex, OffsetJoinType};
use crate::flow::RegionFlows;
use crate::geometry::{medial_axis, ExPolygons, MedialAxisShape, Polygon};
use crate::layer::loop_merger::merge_loops;
use crate::surface::{Surface, Surfaces};
use crate::CoordF;
use log::debug;

/// Output of [`make_surfaces`].
#[derive(Debug, Default)]
pub struct SurfaceBuildResult {
    /// Printable solid, inset by half a perimeter width so the slice
    /// boundary is the external perimeter's centerline.
    pub slices: Surfaces,
    /// Skeletons of features too narrow to host even one perimeter loop.
    pub thin_walls: Vec<MedialAxisShape>,
}

/// Build the region's surfaces from its slice loops.
///
/// With `d` = half the perimeter width, the double offset `(-2d, +d)`
/// nets an inset of `d` and erases everything narrower than a full bead.
/// Growing the result back by `d` and subtracting it from the original
/// recovers exactly the erased narrow features, which are then traced by
/// their medial axis instead of loops.
pub fn make_surfaces(loops: &[Polygon], flows: &RegionFlows) -> SurfaceBuildResult {
    let merged = merge_loops(loops);
    if merged.is_empty() {
        return SurfaceBuildResult::default();
    }

    let d = flows.perimeter.width() / 2.0;

    let mut inset: ExPolygons = Vec::new();
    for surface in &merged {
        inset.extend(offset2_ex(
            std::slice::from_ref(&surface.expolygon),
            -2.0 * d,
            d,
            OffsetJoinType::Miter,
        ));
    }
    let slices = union_ex(&inset);

    // Narrow features: whatever the regrown slices do not cover.
    let original: ExPolygons = merged.iter().map(|s| s.expolygon.clone()).collect();
    let outgrown = offset_ex(&slices, d, OffsetJoinType::Miter);
    let leftover = diff_ex(&original, &outgrown, true);

    let min_area = (flows.perimeter.scaled_spacing() as CoordF).powi(2);
    let mut thin_walls = Vec::new();
    for expoly in leftover {
        if expoly.area() <= min_area {
            continue;
        }
        thin_walls.extend(medial_axis(&expoly, flows.perimeter.scaled_width()));
    }

    debug!(
        "make_surfaces: {} loops -> {} slices, {} thin walls",
        loops.len(),
        slices.len(),
        thin_walls.len()
    );

    SurfaceBuildResult {
        slices: slices.into_iter().map(Surface::internal).collect(),
        thin_walls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::geometry::Point;
    use crate::layer::Layer;
    use crate::scale;

    fn flows() -> RegionFlows {
        let config = RegionConfig {
            perimeter_extrusion_width: 0.5,
            infill_extrusion_width: 0.5,
            nozzle_diameter: 0.4,
            ..Default::default()
        };
        let layer = Layer::new_f(5, 1.0, 1.2, 1.1);
        RegionFlows::for_layer(&config, &layer).unwrap()
    }

    fn square_mm(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::rectangle(Point::new_scale(x, y), Point::new_scale(x + size, y + size))
    }

    #[test]
    fn test_square_slices_inset_half_width() {
        let result = make_surfaces(&[square_mm(0.0, 0.0, 20.0)], &flows());

        assert_eq!(result.slices.len(), 1);
        assert!(result.thin_walls.is_empty());

        // Slice boundary sits 0.25mm (half the bead) inside the model edge
        let bb = result.slices[0].expolygon.bounding_box();
        assert!((bb.min.x - scale(0.25)).abs() < scale(0.02));
        assert!((bb.max.x - scale(19.75)).abs() < scale(0.02));
    }

    #[test]
    fn test_sliver_becomes_thin_wall() {
        // 20mm x 0.3mm sliver: narrower than one 0.5mm bead
        let result = make_surfaces(
            &[Polygon::rectangle(
                Point::zero(),
                Point::new_scale(20.0, 0.3),
            )],
            &flows(),
        );

        assert!(result.slices.is_empty());
        assert_eq!(result.thin_walls.len(), 1);
        // The skeleton runs down the sliver
        assert!(result.thin_walls[0].length() > scale(15.0) as f64);
    }

    #[test]
    fn test_body_with_thin_fin() {
        // A solid body with a 0.3mm fin sticking out of its right side:
        // the body slices, the fin becomes a thin wall.
        let outline = Polygon::from_points(vec![
            Point::new_scale(0.0, 0.0),
            Point::new_scale(10.0, 0.0),
            Point::new_scale(10.0, 4.8),
            Point::new_scale(16.0, 4.8),
            Point::new_scale(16.0, 5.1),
            Point::new_scale(10.0, 5.1),
            Point::new_scale(10.0, 10.0),
            Point::new_scale(0.0, 10.0),
        ]);

        let result = make_surfaces(&[outline], &flows());

        assert_eq!(result.slices.len(), 1);
        assert!(!result.thin_walls.is_empty());

        // Thin wall lives in the fin's x range
        let skeleton = &result.thin_walls[0];
        let max_x = skeleton.points().iter().map(|p| p.x).max().unwrap();
        assert!(max_x > scale(12.0));
    }

    #[test]
    fn test_empty_input() {
        let result = make_surfaces(&[], &flows());
        assert!(result.slices.is_empty());
        assert!(result.thin_walls.is_empty());
    }
}
