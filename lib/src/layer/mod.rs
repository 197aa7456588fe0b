//! Layer and layer-region data structures, and the region pipeline.

mod loop_merger;
mod surface_builder;

pub use loop_merger::merge_loops;
pub use surface_builder::{make_surfaces, SurfaceBuildResult};

use crate::bridge::process_bridges;
use crate::config::RegionConfig;
use crate::extrusion::{ExtrusionEntity, ExtrusionPath};
use crate::flow::RegionFlows;
use crate::geometry::{Lines, MedialAxisShape, Polygon};
use crate::infill::prepare_fill_surfaces;
use crate::perimeter::PerimeterGenerator;
use crate::surface::SurfaceCollection;
use crate::{Coord, CoordF};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One horizontal slice of the print.
///
/// The layer is owned by the caller's multi-layer schedule; regions only
/// borrow it for the duration of a pipeline call and read its id and
/// heights. The caller guarantees a layer outlives its regions.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    /// Layer index (0-based).
    id: usize,

    /// Z coordinate of the bottom of this layer (scaled).
    bottom_z: Coord,

    /// Z coordinate of the top of this layer (print_z, scaled).
    print_z: Coord,

    /// The Z the slicing plane passed through (scaled).
    slice_z: Coord,

    /// Height/thickness of this layer (scaled).
    height: Coord,
}

impl Layer {
    /// Create a new layer from scaled coordinates.
    pub fn new(id: usize, bottom_z: Coord, print_z: Coord, slice_z: Coord) -> Self {
        Self {
            id,
            bottom_z,
            print_z,
            slice_z,
            height: print_z - bottom_z,
        }
    }

    /// Create a new layer from mm coordinates.
    pub fn new_f(id: usize, bottom_z: CoordF, print_z: CoordF, slice_z: CoordF) -> Self {
        use crate::scale;
        Self::new(id, scale(bottom_z), scale(print_z), scale(slice_z))
    }

    /// Get the layer ID.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get the bottom Z coordinate (scaled).
    #[inline]
    pub fn bottom_z(&self) -> Coord {
        self.bottom_z
    }

    /// Get the print Z coordinate (scaled).
    #[inline]
    pub fn print_z(&self) -> Coord {
        self.print_z
    }

    /// Get the slice Z coordinate (scaled).
    #[inline]
    pub fn slice_z(&self) -> Coord {
        self.slice_z
    }

    /// Get the layer height/thickness (scaled).
    #[inline]
    pub fn height(&self) -> Coord {
        self.height
    }

    /// Get the layer height in mm.
    #[inline]
    pub fn height_mm(&self) -> CoordF {
        crate::unscale(self.height)
    }

    /// Get the print Z in mm.
    #[inline]
    pub fn print_z_mm(&self) -> CoordF {
        crate::unscale(self.print_z)
    }

    /// Check if this is the first layer.
    #[inline]
    pub fn is_first_layer(&self) -> bool {
        self.id == 0
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layer(id={}, z={:.3}mm, height={:.3}mm)",
            self.id,
            self.print_z_mm(),
            self.height_mm()
        )
    }
}

/// One material region of one layer, and everything the pipeline
/// produced for it.
///
/// The region owns its geometry exclusively; it holds no reference to
/// the layer it belongs to.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LayerRegion {
    /// Region index (multi-material prints slice one region per material).
    pub region_id: usize,

    /// Raw slice segments, kept for diagnostics.
    pub lines: Lines,

    /// Printable solid, classified by the multi-layer scheduler.
    pub slices: SurfaceCollection,

    /// Skeletons of features too narrow for perimeter loops.
    pub thin_walls: Vec<MedialAxisShape>,

    /// Fill regions, classified; final after the bridge pass.
    pub fill_surfaces: SurfaceCollection,

    /// Gap fill paths.
    pub thin_fills: Vec<ExtrusionPath>,

    /// Perimeter loops and thin-wall paths, in print order.
    pub perimeters: Vec<ExtrusionEntity>,
}

impl LayerRegion {
    /// Create a new empty layer region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer region with a region ID.
    pub fn with_region_id(region_id: usize) -> Self {
        Self {
            region_id,
            ..Default::default()
        }
    }

    /// Check if this region has no printable geometry.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty() && self.thin_walls.is_empty()
    }

    /// Clear all derived geometry.
    pub fn clear(&mut self) {
        self.slices = SurfaceCollection::new();
        self.thin_walls.clear();
        self.fill_surfaces = SurfaceCollection::new();
        self.thin_fills.clear();
        self.perimeters.clear();
    }
}

impl fmt::Debug for LayerRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LayerRegion(region_id={}, {} slices, {} fill surfaces, {} perimeter entities)",
            self.region_id,
            self.slices.len(),
            self.fill_surfaces.len(),
            self.perimeters.len()
        )
    }
}

/// Run the whole pipeline for one region of one layer.
///
/// Stages run in fixed order: loop merging and surface building,
/// perimeter generation with gap fill, fill classification, bridge
/// detection. The call is a pure function of its inputs; regions of the
/// same layer may be processed in parallel by the caller.
///
/// The surface classification consumed by the bridge pass (top/bottom
/// assignments) comes from the caller's multi-layer context: callers
/// that have it reclassify `region.fill_surfaces` between
/// [`PerimeterGenerator::process`] and the later stages, or simply
/// mutate the collection this function leaves behind and re-run
/// [`prepare_fill_surfaces`] and [`process_bridges`], both of which are
/// idempotent over their own output.
pub fn process_region(
    region: &mut LayerRegion,
    loops: &[Polygon],
    layer: &Layer,
    config: &RegionConfig,
    flows: &RegionFlows,
) {
    debug!(
        "process_region: layer {} region {} ({} loops)",
        layer.id(),
        region.region_id,
        loops.len()
    );

    let built = make_surfaces(loops, flows);
    region.slices = SurfaceCollection::from_surfaces(built.slices);
    region.thin_walls = built.thin_walls;

    let generator = PerimeterGenerator::new(config, layer, flows);
    let result = generator.process(&region.slices, &region.thin_walls);
    region.perimeters = result.perimeters;
    region.thin_fills = result.thin_fills;
    region.fill_surfaces = SurfaceCollection::from_surfaces(result.fill_surfaces);

    prepare_fill_surfaces(&mut region.fill_surfaces, config);
    process_bridges(
        &mut region.fill_surfaces,
        &region.slices,
        layer,
        config,
        flows,
    );
}
