//! Fill surface classification.

use crate::config::RegionConfig;
use crate::surface::{SurfaceCollection, SurfaceType};
use crate::{CoordF, SCALING_FACTOR};
use log::debug;

/// Reconcile the fill surface classification with the region settings.
///
/// - With `top_solid_layers == 0`, top surfaces print as plain infill.
/// - With `bottom_solid_layers == 0`, bottom surfaces print as plain infill.
/// - Small internal regions are promoted to solid: sparse infill in a
///   pocket below `solid_infill_below_area` is worse than just filling it.
///
/// Running this twice yields identical results.
pub fn prepare_fill_surfaces(fill_surfaces: &mut SurfaceCollection, config: &RegionConfig) {
    // Areas carry squared units, so the mm² threshold scales twice.
    let solid_below = config.solid_infill_below_area * SCALING_FACTOR * SCALING_FACTOR;

    let mut demoted = 0usize;
    let mut promoted = 0usize;

    for surface in fill_surfaces.iter_mut() {
        match surface.surface_type {
            SurfaceType::Top if config.top_solid_layers == 0 => {
                surface.surface_type = SurfaceType::Internal;
                demoted += 1;
            }
            SurfaceType::Bottom if config.bottom_solid_layers == 0 => {
                surface.surface_type = SurfaceType::Internal;
                demoted += 1;
            }
            SurfaceType::Internal => {
                let contour_area: CoordF = surface.expolygon.contour.area();
                if contour_area <= solid_below {
                    surface.surface_type = SurfaceType::InternalSolid;
                    promoted += 1;
                }
            }
            _ => {}
        }
    }

    if demoted + promoted > 0 {
        debug!(
            "prepare_fill_surfaces: demoted {demoted} external, promoted {promoted} small internal"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ExPolygon, Point, Polygon};
    use crate::surface::Surface;

    fn surface_mm(size: f64, surface_type: SurfaceType) -> Surface {
        Surface::new(
            ExPolygon::new(Polygon::rectangle(Point::zero(), Point::new_scale(size, size))),
            surface_type,
        )
    }

    #[test]
    fn test_demote_top_and_bottom() {
        let config = RegionConfig::new().top_solid_layers(0).bottom_solid_layers(0);

        let mut surfaces = SurfaceCollection::from_surfaces(vec![
            surface_mm(20.0, SurfaceType::Top),
            surface_mm(20.0, SurfaceType::Bottom),
        ]);

        prepare_fill_surfaces(&mut surfaces, &config);

        for s in &surfaces {
            assert_eq!(s.surface_type, SurfaceType::Internal);
        }
    }

    #[test]
    fn test_keep_top_when_solid_layers_requested() {
        let config = RegionConfig::default();
        let mut surfaces = SurfaceCollection::from_surfaces(vec![surface_mm(20.0, SurfaceType::Top)]);

        prepare_fill_surfaces(&mut surfaces, &config);
        assert_eq!(surfaces.surfaces[0].surface_type, SurfaceType::Top);
    }

    #[test]
    fn test_promote_small_internal() {
        let mut config = RegionConfig::default();
        config.solid_infill_below_area = 70.0; // mm²

        let mut surfaces = SurfaceCollection::from_surfaces(vec![
            surface_mm(5.0, SurfaceType::Internal),  // 25 mm² -> solid
            surface_mm(20.0, SurfaceType::Internal), // 400 mm² -> stays sparse
        ]);

        prepare_fill_surfaces(&mut surfaces, &config);

        assert_eq!(surfaces.surfaces[0].surface_type, SurfaceType::InternalSolid);
        assert_eq!(surfaces.surfaces[1].surface_type, SurfaceType::Internal);
    }

    #[test]
    fn test_idempotent() {
        let config = RegionConfig::new().top_solid_layers(0);

        let mut once = SurfaceCollection::from_surfaces(vec![
            surface_mm(20.0, SurfaceType::Top),
            surface_mm(5.0, SurfaceType::Internal),
            surface_mm(20.0, SurfaceType::Internal),
        ]);
        prepare_fill_surfaces(&mut once, &config);

        let mut twice = once.clone();
        prepare_fill_surfaces(&mut twice, &config);

        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.surface_type, b.surface_type);
        }
    }
}
