//! Surface types for layer regions.
//!
//! A surface is a classified region within a layer. The classification
//! decides how the area is filled downstream: top/bottom surfaces get
//! solid infill, internal surfaces get sparse infill. A surface carrying
//! a `bridge_angle` is printed as a bridge along that direction.

use crate::geometry::ExPolygon;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a surface within a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Top surface (visible from above).
    Top,
    /// Bottom surface (visible from below, or resting on air).
    Bottom,
    /// Internal surface that will receive sparse infill.
    #[default]
    Internal,
    /// Internal surface filled solid.
    InternalSolid,
}

impl SurfaceType {
    /// Check if this surface type requires solid infill.
    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(
            self,
            SurfaceType::Top | SurfaceType::Bottom | SurfaceType::InternalSolid
        )
    }

    /// Check if this surface type is internal (not top or bottom).
    #[inline]
    pub fn is_internal(&self) -> bool {
        matches!(self, SurfaceType::Internal | SurfaceType::InternalSolid)
    }

    /// Check if this surface type is external (top or bottom).
    #[inline]
    pub fn is_external(&self) -> bool {
        !self.is_internal()
    }

    /// Get a human-readable name for this surface type.
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceType::Top => "top",
            SurfaceType::Bottom => "bottom",
            SurfaceType::Internal => "internal",
            SurfaceType::InternalSolid => "internal solid",
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A classified region within a layer.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Surface {
    /// The geometry of this surface.
    pub expolygon: ExPolygon,

    /// The type/classification of this surface.
    pub surface_type: SurfaceType,

    /// Bridge extrusion direction in degrees, normalized to [0, 360).
    /// None if this surface is not bridged (or the bridge direction
    /// could not be determined, a plain overhang).
    pub bridge_angle: Option<CoordF>,

    /// Extra inner perimeters requested for this surface.
    pub extra_perimeters: u32,
}

impl Surface {
    /// Create a new surface with the given geometry and type.
    pub fn new(expolygon: ExPolygon, surface_type: SurfaceType) -> Self {
        Self {
            expolygon,
            surface_type,
            bridge_angle: None,
            extra_perimeters: 0,
        }
    }

    /// Create a new internal surface.
    pub fn internal(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::Internal)
    }

    /// Check if this surface is empty (no geometry).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.expolygon.is_empty()
    }

    /// Get the area of this surface (scaled units squared).
    #[inline]
    pub fn area(&self) -> CoordF {
        self.expolygon.area()
    }

    /// Check if this surface is bridged.
    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.bridge_angle.is_some()
    }

    /// Check if this is a solid surface.
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.surface_type.is_solid()
    }

    /// Check if this is an internal surface.
    #[inline]
    pub fn is_internal(&self) -> bool {
        self.surface_type.is_internal()
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Surface({:?}", self.surface_type)?;
        if let Some(angle) = self.bridge_angle {
            write!(f, ", bridge {angle:.1}°")?;
        }
        write!(f, ", area={:.0})", self.area())
    }
}

impl From<ExPolygon> for Surface {
    fn from(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::default())
    }
}

/// Type alias for a collection of surfaces.
pub type Surfaces = Vec<Surface>;

/// Collection of surfaces with utility methods.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SurfaceCollection {
    /// The surfaces in this collection.
    pub surfaces: Vec<Surface>,
}

impl SurfaceCollection {
    /// Create a new empty surface collection.
    pub fn new() -> Self {
        Self {
            surfaces: Vec::new(),
        }
    }

    /// Create a surface collection from a vector of surfaces.
    pub fn from_surfaces(surfaces: Vec<Surface>) -> Self {
        Self { surfaces }
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Get the number of surfaces.
    #[inline]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Add a surface to the collection.
    pub fn push(&mut self, surface: Surface) {
        self.surfaces.push(surface);
    }

    /// Iterate over the surfaces.
    pub fn iter(&self) -> std::slice::Iter<'_, Surface> {
        self.surfaces.iter()
    }

    /// Iterate mutably over the surfaces.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Surface> {
        self.surfaces.iter_mut()
    }

    /// Get all surfaces of a specific type.
    pub fn filter_by_type(&self, surface_type: SurfaceType) -> Vec<&Surface> {
        self.surfaces
            .iter()
            .filter(|s| s.surface_type == surface_type)
            .collect()
    }

    /// Get the geometry of all surfaces of a specific type.
    pub fn expolygons_by_type(&self, surface_type: SurfaceType) -> Vec<crate::geometry::ExPolygon> {
        self.surfaces
            .iter()
            .filter(|s| s.surface_type == surface_type)
            .map(|s| s.expolygon.clone())
            .collect()
    }

    /// Get the total area of all surfaces.
    pub fn total_area(&self) -> CoordF {
        self.surfaces.iter().map(|s| s.area()).sum()
    }

    /// Check if any surface has the given type.
    pub fn has_type(&self, surface_type: SurfaceType) -> bool {
        self.surfaces.iter().any(|s| s.surface_type == surface_type)
    }
}

impl fmt::Debug for SurfaceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceCollection({} surfaces)", self.surfaces.len())
    }
}

impl IntoIterator for SurfaceCollection {
    type Item = Surface;
    type IntoIter = std::vec::IntoIter<Surface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.into_iter()
    }
}

impl<'a> IntoIterator for &'a SurfaceCollection {
    type Item = &'a Surface;
    type IntoIter = std::slice::Iter<'a, Surface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.iter()
    }
}
