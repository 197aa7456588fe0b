//! Extrusion entities produced by the region pipeline.
//!
//! The pipeline emits closed loops (perimeters) and open paths (thin
//! walls, gap fill). Each carries the role the G-code stage keys speeds
//! and fans on, plus the flow spacing and layer height it was planned
//! with.

use crate::geometry::{Polygon, Polyline};
use crate::{CoordF, SMALL_PERIMETER_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of an extrusion within a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtrusionRole {
    /// Outermost perimeter, visible on the printed part.
    ExternalPerimeter,
    /// Inner perimeter.
    Perimeter,
    /// Innermost contour loop, bordering the infill.
    ContourInternalPerimeter,
    /// Solid fill.
    SolidFill,
    /// Gap fill between perimeters.
    GapFill,
}

impl ExtrusionRole {
    /// Get a human-readable name for this role.
    pub fn name(&self) -> &'static str {
        match self {
            ExtrusionRole::ExternalPerimeter => "external perimeter",
            ExtrusionRole::Perimeter => "perimeter",
            ExtrusionRole::ContourInternalPerimeter => "contour internal perimeter",
            ExtrusionRole::SolidFill => "solid fill",
            ExtrusionRole::GapFill => "gap fill",
        }
    }
}

impl fmt::Display for ExtrusionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An open extrusion path.
#[derive(Clone, Serialize, Deserialize)]
pub struct ExtrusionPath {
    /// The path centerline.
    pub polyline: Polyline,
    /// The role of this extrusion.
    pub role: ExtrusionRole,
    /// Centerline spacing of the flow this path was planned with (mm).
    pub flow_spacing: CoordF,
    /// Layer height of this path (mm).
    pub height: CoordF,
}

impl ExtrusionPath {
    /// Create a new extrusion path.
    pub fn new(polyline: Polyline, role: ExtrusionRole, flow_spacing: CoordF, height: CoordF) -> Self {
        Self {
            polyline,
            role,
            flow_spacing,
            height,
        }
    }

    /// Path length in scaled units.
    pub fn length(&self) -> CoordF {
        self.polyline.length()
    }

    /// Check if the path has at least one segment.
    pub fn is_valid(&self) -> bool {
        self.polyline.is_valid()
    }
}

impl fmt::Debug for ExtrusionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExtrusionPath({}, {} points)",
            self.role,
            self.polyline.len()
        )
    }
}

/// A closed extrusion loop.
#[derive(Clone, Serialize, Deserialize)]
pub struct ExtrusionLoop {
    /// The loop centerline.
    pub polygon: Polygon,
    /// The role of this extrusion.
    pub role: ExtrusionRole,
    /// Centerline spacing of the flow this loop was planned with (mm).
    pub flow_spacing: CoordF,
    /// Layer height of this loop (mm).
    pub height: CoordF,
}

impl ExtrusionLoop {
    /// Create a new extrusion loop.
    pub fn new(polygon: Polygon, role: ExtrusionRole, flow_spacing: CoordF, height: CoordF) -> Self {
        Self {
            polygon,
            role,
            flow_spacing,
            height,
        }
    }

    /// Loop length in scaled units.
    pub fn length(&self) -> CoordF {
        self.polygon.length()
    }

    /// Check whether this loop is short enough to count as a small
    /// perimeter (printed slower by the G-code stage).
    pub fn is_small_perimeter(&self) -> bool {
        self.length() < SMALL_PERIMETER_LENGTH as CoordF
    }

    /// Convert to an open path by splitting the loop at its first point.
    pub fn split_at_first_point(&self) -> ExtrusionPath {
        ExtrusionPath::new(
            self.polygon.split_at_first_point(),
            self.role,
            self.flow_spacing,
            self.height,
        )
    }
}

impl fmt::Debug for ExtrusionLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExtrusionLoop({}, {} points)",
            self.role,
            self.polygon.len()
        )
    }
}

/// Either kind of extrusion, in print order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExtrusionEntity {
    /// An open path.
    Path(ExtrusionPath),
    /// A closed loop.
    Loop(ExtrusionLoop),
}

impl ExtrusionEntity {
    /// The role of this extrusion.
    pub fn role(&self) -> ExtrusionRole {
        match self {
            ExtrusionEntity::Path(p) => p.role,
            ExtrusionEntity::Loop(l) => l.role,
        }
    }

    /// Length in scaled units.
    pub fn length(&self) -> CoordF {
        match self {
            ExtrusionEntity::Path(p) => p.length(),
            ExtrusionEntity::Loop(l) => l.length(),
        }
    }

    /// The first point of this extrusion.
    pub fn first_point(&self) -> crate::geometry::Point {
        match self {
            ExtrusionEntity::Path(p) => p.polyline.first_point(),
            ExtrusionEntity::Loop(l) => l.polygon.first_point(),
        }
    }
}
