//! # layercore
//!
//! The per-layer, per-region geometry core of an FFF slicer.
//!
//! Given the closed loops produced by intersecting a mesh with one
//! horizontal plane, this library produces everything the rest of a
//! slicer needs for that (layer, region) pair:
//! - classified fill surfaces,
//! - concentric perimeter extrusion loops,
//! - medial-axis paths for thin walls and gap fill,
//! - bridge regions with their extrusion angle.
//!
//! ## Example
//!
//! ```rust,ignore
//! use layercore::{process_region, Layer, LayerRegion, RegionConfig, RegionFlows};
//!
//! let layer = Layer::new_f(3, 0.6, 0.8, 0.7);
//! let config = RegionConfig::default();
//! let flows = RegionFlows::for_layer(&config, &layer)?;
//! let mut region = LayerRegion::new();
//! process_region(&mut region, &loops, &layer, &config, &flows, &[]);
//! ```

// Core modules
pub mod bridge;
pub mod clipper;
pub mod config;
pub mod extrusion;
pub mod flow;
pub mod geometry;
pub mod infill;
pub mod layer;
pub mod perimeter;
pub mod surface;

// Re-export commonly used types
pub use bridge::{process_bridges, BridgeDetector};
pub use clipper::{
    diff_ex, diff_pl, grow, intersection_ex, intersection_pl, noncollapsing_offset_ex, offset,
    offset2, offset2_ex, offset_ex, safety_offset, safety_offset_ex, shrink, union_ex,
    union_polygons_ex, SAFETY_OFFSET_MM,
};
pub use config::RegionConfig;
pub use extrusion::{ExtrusionEntity, ExtrusionLoop, ExtrusionPath, ExtrusionRole};
pub use flow::{Flow, FlowError, FlowResult, FlowRole, RegionFlows, BRIDGE_EXTRA_SPACING};
pub use geometry::{
    medial_axis, BoundingBox, ExPolygon, ExPolygons, Line, MedialAxisShape, Point, PointF, Polygon,
    Polygons, Polyline, Polylines,
};
pub use infill::{prepare_fill_surfaces, FillParams, FillPattern, RectilinearFill};
pub use layer::{
    make_surfaces, merge_loops, process_region, Layer, LayerRegion, SurfaceBuildResult,
};
pub use perimeter::{PerimeterGenerator, PerimeterResult};
pub use surface::{Surface, SurfaceCollection, SurfaceType, Surfaces};

/// Coordinate type used throughout the core.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Geometric resolution used when simplifying derived contours (mm).
pub const RESOLUTION: CoordF = 0.0125;

/// `RESOLUTION` in scaled units.
pub const SCALED_RESOLUTION: Coord = (RESOLUTION * SCALING_FACTOR) as Coord;

/// Loops shorter than this (scaled units) count as small perimeters and
/// are typically printed at reduced speed by the G-code stage.
pub const SMALL_PERIMETER_LENGTH: Coord = (6.5 * SCALING_FACTOR) as Coord;

/// Scale a floating-point coordinate (mm) to integer units.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point mm.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Result type used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for region-processing operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Flow error: {0}")]
    Flow(#[from] flow::FlowError),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
