//! Bridge detection and fill-surface repartitioning.
//!
//! A bottom surface above the first layer is a bridge: it spans between
//! internal surfaces of the same layer and must be printed as straight
//! extrusions along the span, anchored on both sides. Top surfaces get
//! the same treatment in reverse for surface quality.
//!
//! The extrusion direction comes from the supporting edges: the pieces
//! of the supports' boundaries that fall inside the candidate's grown
//! contour. Two edges span a gap, one curved edge wraps a corner, three
//! or more vote by a length-weighted direction sum. A lone straight
//! edge is a plain overhang and gets no angle.

use crate::clipper::{
    diff_ex, intersection_ex, intersection_pl, offset_polygon, safety_offset_ex, union_ex,
    union_polygons_ex, OffsetJoinType,
};
use crate::config::RegionConfig;
use crate::flow::RegionFlows;
use crate::geometry::{ExPolygons, Line, Point, Polygons, Polylines};
use crate::layer::Layer;
use crate::surface::{Surface, SurfaceCollection, SurfaceType, Surfaces};
use crate::CoordF;
use log::debug;

/// How far a bridge reaches into its supports (mm).
const BRIDGE_ANCHOR_DEPTH: CoordF = 3.0;

/// Per-candidate bridge analysis.
pub struct BridgeDetector {
    /// Safety-grown candidate geometry.
    expolygons: ExPolygons,
    /// The candidate's grown contour, the area support edges are
    /// collected in.
    contour_offset: Polygons,
    /// The supporting surfaces touching the candidate.
    supports: ExPolygons,
    /// Detected bridge direction (degrees in [0, 360)), if any.
    pub angle: Option<CoordF>,
}

impl BridgeDetector {
    /// Analyze one candidate against the layer's internal surfaces.
    ///
    /// Returns None when no internal surface touches the candidate's
    /// grown contour: a floating region is not a bridge.
    pub fn new(candidate: &Surface, internal: &[&Surface], spacing: CoordF) -> Option<Self> {
        let expolygons = safety_offset_ex(std::slice::from_ref(&candidate.expolygon));
        if expolygons.is_empty() {
            return None;
        }

        // One diagonal extrusion width past the candidate reaches
        // whatever the bridge would anchor on.
        let reach = spacing * std::f64::consts::SQRT_2;
        let mut contour_offset: Polygons = Vec::new();
        for expoly in &expolygons {
            contour_offset.extend(offset_polygon(
                &expoly.contour,
                reach,
                OffsetJoinType::Square,
            ));
        }
        let contour_offset_ex = union_polygons_ex(&contour_offset);

        let supports: ExPolygons = internal
            .iter()
            .filter(|s| {
                !intersection_ex(std::slice::from_ref(&s.expolygon), &contour_offset_ex).is_empty()
            })
            .map(|s| s.expolygon.clone())
            .collect();

        if supports.is_empty() {
            return None;
        }

        Some(Self {
            expolygons,
            contour_offset,
            supports,
            angle: None,
        })
    }

    /// The support boundary pieces inside the candidate's grown contour.
    fn support_edges(&self) -> Polylines {
        let mut edges = Vec::new();
        for support in &self.supports {
            edges.extend(
                intersection_pl(&support.to_polylines(), &self.contour_offset)
                    .into_iter()
                    .filter(|pl| pl.is_valid()),
            );
        }
        edges
    }

    /// Derive the bridge direction from the supporting edges.
    pub fn detect_angle(&mut self) {
        let edges = self.support_edges();

        self.angle = match edges.len() {
            0 => None,
            1 => {
                let edge = &edges[0];
                if edge.len() > 2 {
                    // A curved edge wraps the support; span its endpoints.
                    Some(direction_degrees(Line::new(
                        edge.first_point(),
                        edge.last_point(),
                    )))
                } else {
                    // A lone straight edge: plain overhang, no direction.
                    None
                }
            }
            2 => {
                // Span between the two chords.
                let m0 = Line::new(edges[0].first_point(), edges[0].last_point()).midpoint();
                let m1 = Line::new(edges[1].first_point(), edges[1].last_point()).midpoint();
                Some(direction_degrees(Line::new(m0, m1)))
            }
            _ => weighted_edge_direction(&edges),
        };
    }

    /// The bridge geometry: candidate plus supports, clipped to the
    /// candidate's contour grown by the anchor depth.
    pub fn coverage(&self) -> ExPolygons {
        let mut anchor_region: Polygons = Vec::new();
        for expoly in &self.expolygons {
            anchor_region.extend(offset_polygon(
                &expoly.contour,
                BRIDGE_ANCHOR_DEPTH,
                OffsetJoinType::Square,
            ));
        }
        let anchor_region = union_polygons_ex(&anchor_region);

        let mut patch = self.expolygons.clone();
        patch.extend(self.supports.iter().cloned());
        intersection_ex(&union_ex(&patch), &anchor_region)
    }
}

/// Length-weighted sum of centroid-to-vertex directions over all edge
/// points. Directions live in [0, π) so opposite vertices reinforce the
/// same axis instead of cancelling.
fn weighted_edge_direction(edges: &Polylines) -> Option<CoordF> {
    let points: Vec<Point> = edges.iter().flat_map(|e| e.points().to_vec()).collect();
    if points.is_empty() {
        return None;
    }

    let n = points.len() as CoordF;
    let cx = points.iter().map(|p| p.x as CoordF).sum::<CoordF>() / n;
    let cy = points.iter().map(|p| p.y as CoordF).sum::<CoordF>() / n;

    let mut x = 0.0;
    let mut y = 0.0;
    for p in &points {
        let dx = p.x as CoordF - cx;
        let dy = p.y as CoordF - cy;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= 0.0 {
            continue;
        }
        let mut theta = dy.atan2(dx);
        if theta < 0.0 {
            theta += std::f64::consts::PI;
        }
        x += theta.cos() * len;
        y += theta.sin() * len;
    }

    if x == 0.0 && y == 0.0 {
        return None;
    }
    Some(normalize_degrees(y.atan2(x).to_degrees()))
}

fn direction_degrees(line: Line) -> CoordF {
    normalize_degrees(line.direction_angle().to_degrees())
}

fn normalize_degrees(angle: CoordF) -> CoordF {
    let mut a = angle % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    a
}

/// Detect bridges among the fill surfaces and repartition them.
///
/// Candidates are bottom surfaces above the first layer (true bridges)
/// and top surfaces (reverse bridges). Supports come from the internal
/// surfaces of `slices`. Overlapping bridges merge by (type, angle)
/// priority; afterwards every fill surface is either bridge-typed with
/// an angle or disjoint from all bridges.
///
/// A region with zero fill density prints nothing inside, so the pass
/// is skipped entirely.
pub fn process_bridges(
    fill_surfaces: &mut SurfaceCollection,
    slices: &SurfaceCollection,
    layer: &Layer,
    config: &RegionConfig,
    flows: &RegionFlows,
) {
    if config.is_hollow() {
        return;
    }

    let internal: Vec<&Surface> = slices
        .iter()
        .filter(|s| {
            matches!(
                s.surface_type,
                SurfaceType::Internal | SurfaceType::InternalSolid
            )
        })
        .collect();
    if internal.is_empty() {
        return;
    }

    let spacing = flows.infill.spacing();

    // Gather raw bridges per candidate.
    let mut raw: Surfaces = Vec::new();
    for surface in fill_surfaces.iter() {
        let is_candidate = match surface.surface_type {
            SurfaceType::Bottom => layer.id() > 0,
            SurfaceType::Top => true,
            _ => false,
        };
        if !is_candidate {
            continue;
        }

        let Some(mut detector) = BridgeDetector::new(surface, &internal, spacing) else {
            continue;
        };
        if surface.surface_type == SurfaceType::Bottom {
            detector.detect_angle();
        }

        for expolygon in detector.coverage() {
            raw.push(Surface {
                expolygon,
                surface_type: surface.surface_type,
                bridge_angle: detector.angle,
                extra_perimeters: 0,
            });
        }
    }

    if raw.is_empty() {
        return;
    }

    // Merge pass: bridges of one (type, angle) union together; earlier
    // groups win the overlap.
    let mut groups: Vec<((SurfaceType, Option<i64>), ExPolygons)> = Vec::new();
    for bridge in raw {
        let key = (
            bridge.surface_type,
            bridge.bridge_angle.map(|a| (a * 1000.0).round() as i64),
        );
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, exs)) => exs.push(bridge.expolygon),
            None => groups.push((key, vec![bridge.expolygon])),
        }
    }

    let mut bridges: Surfaces = Vec::new();
    let mut bridge_areas: ExPolygons = Vec::new();
    for ((surface_type, angle_key), expolygons) in groups {
        let angle = angle_key.map(|k| k as CoordF / 1000.0);
        let merged = diff_ex(&union_ex(&expolygons), &bridge_areas, false);
        for expolygon in merged {
            bridge_areas.push(expolygon.clone());
            bridges.push(Surface {
                expolygon,
                surface_type,
                bridge_angle: angle,
                extra_perimeters: 0,
            });
        }
    }

    debug!(
        "process_bridges: layer {}: {} bridges",
        layer.id(),
        bridges.len()
    );

    // Apply pass: bridge areas take the bridge classification, the rest
    // of every fill surface survives with its own type.
    let fill_areas: ExPolygons = fill_surfaces.iter().map(|s| s.expolygon.clone()).collect();
    let mut replacement: Surfaces = Vec::new();

    for bridge in &bridges {
        for expolygon in intersection_ex(&fill_areas, std::slice::from_ref(&bridge.expolygon)) {
            replacement.push(Surface {
                expolygon,
                surface_type: bridge.surface_type,
                bridge_angle: bridge.bridge_angle,
                extra_perimeters: 0,
            });
        }
    }

    for surface in fill_surfaces.iter() {
        for expolygon in diff_ex(
            std::slice::from_ref(&surface.expolygon),
            &bridge_areas,
            false,
        ) {
            replacement.push(Surface {
                expolygon,
                surface_type: surface.surface_type,
                bridge_angle: surface.bridge_angle,
                extra_perimeters: surface.extra_perimeters,
            });
        }
    }

    *fill_surfaces = SurfaceCollection::from_surfaces(replacement);
}
