//! Perimeter generation.
//!
//! Perimeters are generated from the slice surfaces by repeated inward
//! offsetting. Each pass insets by one extrusion spacing via the
//! erase-and-regrow offset (`-1.5s` then `+0.5s`) so features narrower
//! than a spacing collapse instead of producing self-intersecting loops.
//! The area such a collapse leaves behind is detected per depth and
//! later covered by gap fill; the area left inside the innermost loop
//! becomes the region's fill surface.
//!
//! The emitted loop order is chosen for printing: holes innermost-first
//! (climbing out of nested hole stacks), then contours from the inside
//! out, island by island along a shortest-path route.

use crate::clipper::{
    diff_ex, noncollapsing_offset_ex, offset2_ex, offset_ex, shrink, union_ex, OffsetJoinType,
};
use crate::config::RegionConfig;
use crate::extrusion::{ExtrusionEntity, ExtrusionLoop, ExtrusionPath, ExtrusionRole};
use crate::flow::RegionFlows;
use crate::geometry::{
    chain_indices, ExPolygon, ExPolygons, MedialAxisShape, Point, Polygon, Polygons,
};
use crate::infill::{FillParams, FillPattern, RectilinearFill};
use crate::layer::Layer;
use crate::surface::{Surface, SurfaceCollection, Surfaces};
use crate::{CoordF, SCALED_RESOLUTION};
use log::debug;

/// Result of perimeter generation for a region.
#[derive(Debug, Default)]
pub struct PerimeterResult {
    /// Perimeter loops and thin-wall paths, in print order.
    pub perimeters: Vec<ExtrusionEntity>,

    /// The fill surfaces left inside the innermost loops.
    pub fill_surfaces: Surfaces,

    /// Gap fill paths covering what the loops could not.
    pub thin_fills: Vec<ExtrusionPath>,
}

/// Generates perimeters, gap fill and the fill boundary for one region
/// of one layer.
pub struct PerimeterGenerator<'a> {
    config: &'a RegionConfig,
    layer: &'a Layer,
    flows: &'a RegionFlows,
}

impl<'a> PerimeterGenerator<'a> {
    /// Create a generator bound to a layer and its region settings.
    pub fn new(config: &'a RegionConfig, layer: &'a Layer, flows: &'a RegionFlows) -> Self {
        Self {
            config,
            layer,
            flows,
        }
    }

    /// Generate perimeters for the given slices and thin walls.
    pub fn process(
        &self,
        slices: &SurfaceCollection,
        thin_walls: &[MedialAxisShape],
    ) -> PerimeterResult {
        let mut result = PerimeterResult::default();

        // Islands are visited along a greedy shortest path from the origin.
        let firsts: Vec<Point> = slices
            .iter()
            .filter(|s| !s.expolygon.is_empty())
            .map(|s| s.expolygon.contour.first_point())
            .collect();
        let islands: Vec<&Surface> = slices.iter().filter(|s| !s.expolygon.is_empty()).collect();

        for idx in chain_indices(Point::zero(), &firsts) {
            self.process_island(islands[idx], &mut result);
        }

        // With a brim on the first layer, printing starts on the brim's
        // outer edge and continues inward.
        if self.layer.id() == 0 && self.config.brim_width > 0.0 {
            result.perimeters.reverse();
        }

        self.append_thin_walls(thin_walls, &mut result);

        debug!(
            "layer {}: {} perimeter entities, {} fill surfaces, {} thin fills",
            self.layer.id(),
            result.perimeters.len(),
            result.fill_surfaces.len(),
            result.thin_fills.len()
        );

        result
    }

    fn process_island(&self, island: &Surface, result: &mut PerimeterResult) {
        let s = self.flows.perimeter.spacing();
        let loop_count = self.config.perimeters + island.extra_perimeters;
        let min_gap_area = (self.flows.perimeter.scaled_width() as CoordF).powi(2);

        let mut contours_by_depth: Vec<Polygons> = Vec::new();
        let mut holes_by_depth: Vec<Polygons> = Vec::new();
        let mut gaps: ExPolygons = Vec::new();

        let mut last: ExPolygons = vec![island.expolygon.clone()];
        append_depth(&mut contours_by_depth, &mut holes_by_depth, &last);

        let mut fill_boundary: ExPolygons = Vec::new();
        let mut depth = 1u32;
        loop {
            // One inward pass per source expolygon; the half-spacing
            // collapse-and-regrow erases sub-spacing bridges.
            let mut next: ExPolygons = Vec::new();
            for expoly in &last {
                let inset = offset2_ex(
                    std::slice::from_ref(expoly),
                    -1.5 * s,
                    0.5 * s,
                    OffsetJoinType::Miter,
                );

                if depth <= loop_count {
                    // What this pass could not reach is a gap candidate.
                    let shrunk_half =
                        offset_ex(std::slice::from_ref(expoly), -0.5 * s, OffsetJoinType::Miter);
                    let grown_next = offset_ex(&inset, 0.5 * s, OffsetJoinType::Miter);
                    gaps.extend(
                        diff_ex(&shrunk_half, &grown_next, false)
                            .into_iter()
                            .filter(|g| g.area() >= min_gap_area),
                    );
                }

                next.extend(inset);
            }

            let next = union_ex(&next);
            if next.is_empty() {
                // The island collapsed; nothing left to fill.
                break;
            }
            if depth >= loop_count {
                // One pass beyond the last emitted loop bounds the fill.
                fill_boundary = next;
                break;
            }

            append_depth(&mut contours_by_depth, &mut holes_by_depth, &next);
            last = next;
            depth += 1;
        }

        self.emit_island_loops(&contours_by_depth, holes_by_depth, result);

        for expoly in &fill_boundary {
            result
                .fill_surfaces
                .push(Surface::internal(expoly.simplified(SCALED_RESOLUTION)));
        }

        self.fill_gaps(&mut gaps, &mut result.thin_fills);
    }

    /// Order and emit one island's loops.
    fn emit_island_loops(
        &self,
        contours_by_depth: &[Polygons],
        mut holes_by_depth: Vec<Polygons>,
        result: &mut PerimeterResult,
    ) {
        let spacing = self.flows.perimeter.spacing();
        let height = self.layer.height_mm();

        // The outermost hole level is visited along a shortest path.
        if let Some(level0) = holes_by_depth.first_mut() {
            let firsts: Vec<Point> = level0.iter().map(|h| h.first_point()).collect();
            let order = chain_indices(Point::zero(), &firsts);
            *level0 = order.iter().map(|&i| level0[i].clone()).collect();
        }

        // Pop a surface-level hole, then climb through enclosing holes of
        // deeper levels as long as the parent holds no other sibling.
        // The climb prints a nested hole stack in one go.
        let mut ordered_holes: Vec<(Polygon, bool)> = Vec::new();
        while holes_by_depth.first().is_some_and(|l| !l.is_empty()) {
            let hole = holes_by_depth[0].remove(0);
            let mut current_first = hole.first_point();
            ordered_holes.push((hole, true));

            let mut d = 0;
            while d + 1 < holes_by_depth.len() {
                let Some(parent_idx) = holes_by_depth[d + 1]
                    .iter()
                    .position(|p| p.encloses_point(&current_first))
                else {
                    break;
                };

                let parent = holes_by_depth[d + 1][parent_idx].clone();
                let sibling_conflict = holes_by_depth[d]
                    .iter()
                    .any(|sib| parent.encloses_point(&sib.first_point()));
                if sibling_conflict {
                    break;
                }

                holes_by_depth[d + 1].remove(parent_idx);
                current_first = parent.first_point();
                ordered_holes.push((parent, false));
                d += 1;
            }
        }

        // Orphaned deep holes (their whole chain ended on conflicts) are
        // still printed rather than dropped.
        for level in holes_by_depth.iter().skip(1) {
            for hole in level {
                ordered_holes.push((hole.clone(), false));
            }
        }

        // Holes print innermost first.
        for (polygon, external) in ordered_holes.iter().rev() {
            if !self.is_printable(polygon) {
                continue;
            }
            let role = if *external {
                ExtrusionRole::ExternalPerimeter
            } else {
                ExtrusionRole::Perimeter
            };
            result.perimeters.push(ExtrusionEntity::Loop(ExtrusionLoop::new(
                polygon.clone(),
                role,
                spacing,
                height,
            )));
        }

        // Contours print from the innermost depth out.
        let max_depth = contours_by_depth.len().saturating_sub(1);
        for depth in (0..contours_by_depth.len()).rev() {
            for polygon in &contours_by_depth[depth] {
                if !self.is_printable(polygon) {
                    continue;
                }
                let role = if depth == 0 {
                    ExtrusionRole::ExternalPerimeter
                } else if depth == max_depth {
                    ExtrusionRole::ContourInternalPerimeter
                } else {
                    ExtrusionRole::Perimeter
                };
                result.perimeters.push(ExtrusionEntity::Loop(ExtrusionLoop::new(
                    polygon.clone(),
                    role,
                    spacing,
                    height,
                )));
            }
        }
    }

    /// Cover accumulated gaps with single-pass fill at stepped widths.
    fn fill_gaps(&self, gaps: &mut ExPolygons, out: &mut Vec<ExtrusionPath>) {
        if !self.config.gap_fill_enabled() || gaps.is_empty() {
            return;
        }

        let w = self.flows.perimeter.width();
        let filler = RectilinearFill;

        // Widest first: anything the wide pass covers is removed before
        // the narrower passes run.
        for trial_width in [1.5 * w, w, 0.5 * w] {
            if gaps.is_empty() {
                break;
            }
            let Ok(flow) = self.flows.perimeter.with_width(trial_width) else {
                continue;
            };
            let half = 0.5 * flow.width();

            // Components that are about this wide: shrinking by a half
            // width collapses the narrower ones, regrowing restores the
            // survivors to full size.
            let this_width = offset_ex(
                &noncollapsing_offset_ex(gaps, -half, OffsetJoinType::Miter),
                half,
                OffsetJoinType::Miter,
            );
            if this_width.is_empty() {
                continue;
            }

            let params = FillParams {
                density: 1.0,
                flow_spacing: flow.spacing(),
                angle: 0.0,
            };

            for piece in &this_width {
                for centered in
                    offset_ex(std::slice::from_ref(piece), -half, OffsetJoinType::Miter)
                {
                    let (used, polylines) =
                        filler.fill_surface(&Surface::internal(centered), &params);
                    for mut polyline in polylines {
                        polyline.simplify(flow.scaled_width() / 3);
                        if polyline.is_valid() {
                            out.push(ExtrusionPath::new(
                                polyline,
                                ExtrusionRole::GapFill,
                                used.flow_spacing,
                                self.layer.height_mm(),
                            ));
                        }
                    }
                }
            }

            *gaps = diff_ex(gaps, &this_width, false);
        }
    }

    /// Append thin walls as open external-perimeter paths, routed by a
    /// shortest path.
    fn append_thin_walls(&self, thin_walls: &[MedialAxisShape], result: &mut PerimeterResult) {
        let usable: Vec<&MedialAxisShape> = thin_walls
            .iter()
            .filter(|s| !s.points().is_empty())
            .collect();
        if usable.is_empty() {
            return;
        }

        let firsts: Vec<Point> = usable.iter().map(|s| s.points()[0]).collect();
        let spacing = self.flows.perimeter.spacing();
        let height = self.layer.height_mm();

        for idx in chain_indices(Point::zero(), &firsts) {
            let polyline = match usable[idx] {
                MedialAxisShape::Open(pl) => pl.clone(),
                MedialAxisShape::Closed(poly) => poly.split_at_first_point(),
            };
            if polyline.is_valid() {
                result.perimeters.push(ExtrusionEntity::Path(ExtrusionPath::new(
                    polyline,
                    ExtrusionRole::ExternalPerimeter,
                    spacing,
                    height,
                )));
            }
        }
    }

    /// A loop is printable if it survives a half-width inset.
    fn is_printable(&self, polygon: &Polygon) -> bool {
        if polygon.len() < 3 {
            return false;
        }
        let mut area = polygon.clone();
        area.make_counter_clockwise();
        !shrink(
            &[ExPolygon::new(area)],
            self.flows.perimeter.width() / 2.0,
            OffsetJoinType::Miter,
        )
        .is_empty()
    }
}

fn append_depth(
    contours_by_depth: &mut Vec<Polygons>,
    holes_by_depth: &mut Vec<Polygons>,
    expolygons: &ExPolygons,
) {
    let mut contours = Vec::new();
    let mut holes = Vec::new();
    for expoly in expolygons {
        contours.push(expoly.contour.clone());
        holes.extend(expoly.holes.iter().cloned());
    }
    contours_by_depth.push(contours);
    holes_by_depth.push(holes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::scale;

    fn setup(perimeters: u32, layer_id: usize) -> (RegionConfig, Layer) {
        let config = RegionConfig {
            perimeters,
            perimeter_extrusion_width: 0.5,
            infill_extrusion_width: 0.5,
            nozzle_diameter: 0.4,
            ..Default::default()
        };
        let z = layer_id as f64 * 0.2;
        let layer = Layer::new_f(layer_id, z, z + 0.2, z + 0.1);
        (config, layer)
    }

    fn square_slices_mm(size: f64) -> SurfaceCollection {
        SurfaceCollection::from_surfaces(vec![Surface::internal(ExPolygon::new(
            Polygon::rectangle(Point::zero(), Point::new_scale(size, size)),
        ))])
    }

    fn loop_entities(result: &PerimeterResult) -> Vec<&ExtrusionLoop> {
        result
            .perimeters
            .iter()
            .filter_map(|e| match e {
                ExtrusionEntity::Loop(l) => Some(l),
                ExtrusionEntity::Path(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_square_loop_count_and_roles() {
        let (config, layer) = setup(3, 5);
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let result = generator.process(&square_slices_mm(20.0), &[]);
        let loops = loop_entities(&result);
        assert_eq!(loops.len(), 3);

        // Inside out: innermost contour first, external last
        assert_eq!(loops[0].role, ExtrusionRole::ContourInternalPerimeter);
        assert_eq!(loops[1].role, ExtrusionRole::Perimeter);
        assert_eq!(loops[2].role, ExtrusionRole::ExternalPerimeter);

        // One fill surface remains
        assert_eq!(result.fill_surfaces.len(), 1);
    }

    #[test]
    fn test_square_loop_spacing() {
        let (config, layer) = setup(3, 5);
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let result = generator.process(&square_slices_mm(20.0), &[]);
        let loops = loop_entities(&result);

        // The outermost loop follows the slice boundary; each deeper
        // loop is inset by one spacing.
        let s = flows.perimeter.spacing();
        let bb_outer = loops[2].polygon.bounding_box();
        let bb_mid = loops[1].polygon.bounding_box();
        let bb_inner = loops[0].polygon.bounding_box();

        assert!((bb_outer.min.x - 0).abs() < scale(0.02));
        assert!((bb_mid.min.x - scale(s)).abs() < scale(0.02));
        assert!((bb_inner.min.x - scale(2.0 * s)).abs() < scale(0.02));

        // Fill boundary is one more spacing inside the innermost loop
        let bb_fill = result.fill_surfaces[0].expolygon.bounding_box();
        assert!((bb_fill.min.x - scale(3.0 * s)).abs() < scale(0.02));
    }

    #[test]
    fn test_square_with_hole_roles() {
        let (config, layer) = setup(2, 5);
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let outer = Polygon::rectangle(Point::zero(), Point::new_scale(20.0, 20.0));
        let mut hole = Polygon::rectangle(Point::new_scale(7.0, 7.0), Point::new_scale(13.0, 13.0));
        hole.make_clockwise();
        let slices = SurfaceCollection::from_surfaces(vec![Surface::internal(
            ExPolygon::with_holes(outer, vec![hole]),
        )]);

        let result = generator.process(&slices, &[]);
        let loops = loop_entities(&result);

        // 2 contour loops + 2 hole loops
        assert_eq!(loops.len(), 4);

        // Holes come first, innermost hole loop leading; the hole loop at
        // the surface boundary carries the external role.
        assert!(loops[0].polygon.is_clockwise());
        assert_eq!(loops[0].role, ExtrusionRole::Perimeter);
        assert!(loops[1].polygon.is_clockwise());
        assert_eq!(loops[1].role, ExtrusionRole::ExternalPerimeter);

        // Then contours, inside out
        assert!(loops[2].polygon.is_counter_clockwise());
        assert_eq!(loops[2].role, ExtrusionRole::ContourInternalPerimeter);
        assert_eq!(loops[3].role, ExtrusionRole::ExternalPerimeter);

        // The fill surface keeps a hole
        assert_eq!(result.fill_surfaces.len(), 1);
        assert!(result.fill_surfaces[0].expolygon.has_holes());
    }

    #[test]
    fn test_collapsed_island_has_no_fill() {
        // 1.2mm square cannot host 3 perimeters at 0.5mm width
        let (config, layer) = setup(3, 5);
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let result = generator.process(&square_slices_mm(1.2), &[]);
        assert!(result.fill_surfaces.is_empty());
    }

    #[test]
    fn test_brim_reverses_order() {
        let (mut config, layer) = setup(3, 0);
        config.brim_width = 4.0;
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let result = generator.process(&square_slices_mm(20.0), &[]);
        let loops = loop_entities(&result);

        // Reversed: external first, innermost last
        assert_eq!(loops[0].role, ExtrusionRole::ExternalPerimeter);
        assert_eq!(
            loops.last().unwrap().role,
            ExtrusionRole::ContourInternalPerimeter
        );
    }

    #[test]
    fn test_islands_ordered_by_travel() {
        let (config, layer) = setup(1, 5);
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        // The far island is listed first; the generator should visit the
        // near one first anyway.
        let far = Surface::internal(ExPolygon::new(Polygon::rectangle(
            Point::new_scale(100.0, 0.0),
            Point::new_scale(110.0, 10.0),
        )));
        let near = Surface::internal(ExPolygon::new(Polygon::rectangle(
            Point::zero(),
            Point::new_scale(10.0, 10.0),
        )));
        let slices = SurfaceCollection::from_surfaces(vec![far, near]);

        let result = generator.process(&slices, &[]);
        let loops = loop_entities(&result);
        assert_eq!(loops.len(), 2);
        assert!(loops[0].polygon.bounding_box().min.x < scale(50.0));
        assert!(loops[1].polygon.bounding_box().min.x > scale(50.0));
    }

    #[test]
    fn test_gap_fill_covers_leftover_strip() {
        // A 20mm x 1.7mm ribbon at 0.5mm width / ~0.457mm spacing hosts
        // one loop; the interior strip is too narrow for a second loop
        // and must come back as gap fill.
        let (mut config, layer) = setup(2, 5);
        config.gap_fill_speed = 20.0;
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let slices = SurfaceCollection::from_surfaces(vec![Surface::internal(ExPolygon::new(
            Polygon::rectangle(Point::zero(), Point::new_scale(20.0, 1.7)),
        ))]);

        let result = generator.process(&slices, &[]);
        assert!(
            !result.thin_fills.is_empty(),
            "expected gap fill paths in the leftover strip"
        );
        for path in &result.thin_fills {
            assert_eq!(path.role, ExtrusionRole::GapFill);
        }
    }

    #[test]
    fn test_gap_fill_disabled() {
        let (mut config, layer) = setup(2, 5);
        config.gap_fill_speed = 0.0;
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let slices = SurfaceCollection::from_surfaces(vec![Surface::internal(ExPolygon::new(
            Polygon::rectangle(Point::zero(), Point::new_scale(20.0, 1.7)),
        ))]);

        let result = generator.process(&slices, &[]);
        assert!(result.thin_fills.is_empty());
    }

    #[test]
    fn test_thin_walls_appended_last() {
        let (config, layer) = setup(1, 5);
        let flows = RegionFlows::for_layer(&config, &layer).unwrap();
        let generator = PerimeterGenerator::new(&config, &layer, &flows);

        let thin = vec![MedialAxisShape::Open(crate::geometry::Polyline::from_points(
            vec![Point::new_scale(30.0, 0.0), Point::new_scale(40.0, 0.0)],
        ))];

        let result = generator.process(&square_slices_mm(10.0), &thin);

        let last = result.perimeters.last().unwrap();
        match last {
            ExtrusionEntity::Path(p) => {
                assert_eq!(p.role, ExtrusionRole::ExternalPerimeter);
            }
            ExtrusionEntity::Loop(_) => panic!("thin wall should be an open path"),
        }
    }
}
