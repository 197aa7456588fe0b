//! Fill pattern interface and the rectilinear generator.
//!
//! The region core does not decide how fill surfaces are ultimately
//! textured; that belongs to the downstream fill stage. It does however
//! consume one pattern itself: gap fill runs the rectilinear pattern at
//! density 1 over the narrow regions perimeters cannot reach.

mod classifier;

pub use classifier::prepare_fill_surfaces;

use crate::clipper::intersection_pl;
use crate::geometry::{BoundingBox, Point, Polyline, Polylines};
use crate::surface::Surface;
use crate::{scale, Coord, CoordF};

/// Parameters a fill pattern is invoked with. The pattern returns the
/// bundle it actually used (it may adjust the spacing to fit the region).
#[derive(Debug, Clone, Copy)]
pub struct FillParams {
    /// Fill density in (0, 1]; 1 means solid.
    pub density: CoordF,
    /// Centerline spacing of the extrusions (mm).
    pub flow_spacing: CoordF,
    /// Direction of the fill lines (radians).
    pub angle: CoordF,
}

impl FillParams {
    /// Solid fill at the given spacing, axis-aligned.
    pub fn solid(flow_spacing: CoordF) -> Self {
        Self {
            density: 1.0,
            flow_spacing,
            angle: 0.0,
        }
    }
}

/// A generator producing fill paths for one surface.
pub trait FillPattern {
    /// Fill `surface`, returning the parameter bundle actually used and
    /// the resulting paths.
    fn fill_surface(&self, surface: &Surface, params: &FillParams) -> (FillParams, Polylines);
}

/// Rectilinear fill: parallel lines at a fixed angle, clipped to the
/// surface.
#[derive(Debug, Clone, Default)]
pub struct RectilinearFill;

impl FillPattern for RectilinearFill {
    fn fill_surface(&self, surface: &Surface, params: &FillParams) -> (FillParams, Polylines) {
        let mut polylines = Vec::new();
        if params.density <= 0.0 || params.flow_spacing <= 0.0 {
            return (*params, polylines);
        }

        let line_spacing = scale(params.flow_spacing / params.density);
        if line_spacing <= 0 {
            return (*params, polylines);
        }

        let mut bbox = BoundingBox::new();
        bbox.merge(&surface.expolygon.bounding_box());
        if bbox.is_empty() {
            return (*params, polylines);
        }

        let cos_a = params.angle.cos();
        let sin_a = params.angle.sin();

        let center = bbox.center();
        let w = bbox.width() as CoordF;
        let h = bbox.height() as CoordF;
        let half_diag = ((w * w + h * h).sqrt() / 2.0) as Coord + line_spacing;

        // Parallel lines perpendicular to the offset direction, long
        // enough to cross the whole region
        let num_lines = (2 * half_diag / line_spacing + 1) as i64;
        let mut raw_lines = Vec::new();
        for i in -(num_lines / 2)..=(num_lines / 2) {
            let offset = (i * line_spacing) as CoordF;

            let px = center.x as CoordF - offset * sin_a;
            let py = center.y as CoordF + offset * cos_a;

            let dx = cos_a * half_diag as CoordF;
            let dy = sin_a * half_diag as CoordF;

            raw_lines.push(Polyline::from_points(vec![
                Point::new((px - dx).round() as Coord, (py - dy).round() as Coord),
                Point::new((px + dx).round() as Coord, (py + dy).round() as Coord),
            ]));
        }

        let clip = surface.expolygon.to_polygons();
        polylines = intersection_pl(&raw_lines, &clip);

        (*params, polylines)
    }
}
