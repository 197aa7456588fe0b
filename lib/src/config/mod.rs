//! Region configuration.
//!
//! A region is a section of a print object sharing one material and one
//! set of print settings. The core consumes the configuration explicitly
//! so a region pipeline stays a pure function of its inputs and regions
//! can be processed in parallel by the caller.

use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a single print region.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionConfig {
    // === Perimeters ===
    /// Number of perimeters/shells.
    pub perimeters: u32,

    /// Perimeter extrusion width (mm, 0 = auto from nozzle).
    pub perimeter_extrusion_width: CoordF,

    /// Infill extrusion width (mm, 0 = auto from nozzle).
    pub infill_extrusion_width: CoordF,

    /// First layer extrusion width (mm, 0 = use the regular widths).
    pub first_layer_extrusion_width: CoordF,

    /// Nozzle diameter (mm).
    pub nozzle_diameter: CoordF,

    // === Solid layers ===
    /// Number of solid top layers.
    pub top_solid_layers: u32,

    /// Number of solid bottom layers.
    pub bottom_solid_layers: u32,

    /// Internal regions with an outer contour smaller than this (mm²)
    /// are filled solid.
    pub solid_infill_below_area: CoordF,

    // === Infill ===
    /// Infill density (0.0 - 1.0). Zero disables bridge processing.
    pub fill_density: CoordF,

    // === Gap fill ===
    /// Gap fill speed (mm/s). Zero disables gap fill.
    pub gap_fill_speed: CoordF,

    // === Adhesion ===
    /// Brim width (mm). On the first layer a positive brim reverses the
    /// perimeter print order so printing continues inward from the brim.
    pub brim_width: CoordF,
}

impl RegionConfig {
    /// Create a new RegionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set number of perimeters.
    pub fn perimeters(mut self, count: u32) -> Self {
        self.perimeters = count;
        self
    }

    /// Builder method: set perimeter extrusion width.
    pub fn perimeter_extrusion_width(mut self, width: CoordF) -> Self {
        self.perimeter_extrusion_width = width;
        self
    }

    /// Builder method: set infill density.
    pub fn fill_density(mut self, density: CoordF) -> Self {
        self.fill_density = density;
        self
    }

    /// Builder method: set top solid layers.
    pub fn top_solid_layers(mut self, layers: u32) -> Self {
        self.top_solid_layers = layers;
        self
    }

    /// Builder method: set bottom solid layers.
    pub fn bottom_solid_layers(mut self, layers: u32) -> Self {
        self.bottom_solid_layers = layers;
        self
    }

    /// Builder method: set gap fill speed.
    pub fn gap_fill_speed(mut self, speed: CoordF) -> Self {
        self.gap_fill_speed = speed;
        self
    }

    /// Builder method: set brim width.
    pub fn brim_width(mut self, width: CoordF) -> Self {
        self.brim_width = width;
        self
    }

    /// Check if gap fill is enabled.
    pub fn gap_fill_enabled(&self) -> bool {
        self.gap_fill_speed > 0.0
    }

    /// Check if this region has no infill at all.
    pub fn is_hollow(&self) -> bool {
        self.fill_density == 0.0
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            perimeters: 3,
            perimeter_extrusion_width: 0.0,
            infill_extrusion_width: 0.0,
            first_layer_extrusion_width: 0.0,
            nozzle_diameter: 0.4,

            top_solid_layers: 4,
            bottom_solid_layers: 3,
            solid_infill_below_area: 70.0,

            fill_density: 0.2,

            gap_fill_speed: 20.0,

            brim_width: 0.0,
        }
    }
}

impl fmt::Display for RegionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegionConfig(perimeters={}, infill={:.0}%)",
            self.perimeters,
            self.fill_density * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_config_default() {
        let config = RegionConfig::default();
        assert_eq!(config.perimeters, 3);
        assert!((config.fill_density - 0.2).abs() < 1e-6);
        assert_eq!(config.top_solid_layers, 4);
        assert_eq!(config.bottom_solid_layers, 3);
        assert!(config.gap_fill_enabled());
        assert!(!config.is_hollow());
    }

    #[test]
    fn test_region_config_builder() {
        let config = RegionConfig::new()
            .perimeters(5)
            .fill_density(0.0)
            .top_solid_layers(0)
            .gap_fill_speed(0.0)
            .brim_width(4.0);

        assert_eq!(config.perimeters, 5);
        assert!(config.is_hollow());
        assert_eq!(config.top_solid_layers, 0);
        assert!(!config.gap_fill_enabled());
        assert!((config.brim_width - 4.0).abs() < 1e-6);
    }
}
