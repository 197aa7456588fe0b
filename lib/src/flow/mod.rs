//! # Flow Calculation Module
//!
//! Converts desired extrusion dimensions (width, height) into the
//! geometry the path planners consume: bead width, centerline spacing,
//! and volumetric flow per mm of travel.
//!
//! ## Key Concept: Rounded Rectangle Cross-Section
//!
//! Extruded plastic forms a shape that is approximately a rectangle with
//! semicircular ends (a stadium). The cross-sectional area is:
//!
//! ```text
//! area = height × (width - height × (1 - π/4))
//!      ≈ height × (width - 0.2146 × height)
//! ```
//!
//! Adjacent beads overlap at their rounded ends, which is why
//! `spacing < width`.

use std::f64::consts::PI;
use thiserror::Error;

use crate::config::RegionConfig;
use crate::layer::Layer;
use crate::{scale, Coord};

/// Extra spacing between bridge threads (mm).
pub const BRIDGE_EXTRA_SPACING: f64 = 0.05;

/// Flow calculation errors.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Spacing calculation produced a negative value.
    /// This typically means extrusion width is too small relative to height.
    #[error("Flow spacing calculation produced negative spacing. Is extrusion width too small?")]
    NegativeSpacing,

    /// Flow calculation produced a negative value.
    #[error("Flow mm3_per_mm() produced negative flow. Is extrusion width too small?")]
    NegativeFlow,

    /// Invalid argument provided.
    #[error("Invalid flow argument: {0}")]
    InvalidArgument(String),
}

/// Result type for flow calculations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Extrusion role - determines default width calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowRole {
    /// External (outer) perimeter - visible surface
    ExternalPerimeter,
    /// Internal perimeters
    Perimeter,
    /// Sparse infill
    Infill,
    /// Solid infill (top/bottom surfaces)
    SolidInfill,
}

/// Flow parameters for extrusion.
///
/// # Invariants
///
/// - For non-bridge flow: `width >= height` (enforced by constructors)
/// - For bridge flow: `width == height` (circular cross-section)
/// - All dimensions are in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flow {
    /// Extrusion width (mm).
    width: f64,

    /// Extrusion height (mm). For non-bridge extrusions this is the
    /// layer height; for bridges it equals the width.
    height: f64,

    /// Spacing between extrusion centerlines (mm).
    spacing: f64,

    /// Nozzle diameter used (mm).
    nozzle_diameter: f64,

    /// Whether this is a bridging flow.
    bridge: bool,
}

impl Flow {
    /// Create a new Flow for non-bridge extrusion.
    ///
    /// Spacing is calculated from the rounded rectangle formula.
    pub fn new(width: f64, height: f64, nozzle_diameter: f64) -> FlowResult<Self> {
        let spacing = Self::rounded_rectangle_extrusion_spacing(width, height)?;
        Ok(Self {
            width,
            height,
            spacing,
            nozzle_diameter,
            bridge: false,
        })
    }

    fn new_with_spacing(
        width: f64,
        height: f64,
        spacing: f64,
        nozzle_diameter: f64,
        bridge: bool,
    ) -> Self {
        // Gap fill flows can legitimately end up with width < height, so
        // the invariant is not asserted here.
        Self {
            width,
            height,
            spacing,
            nozzle_diameter,
            bridge,
        }
    }

    /// Create a bridging flow.
    ///
    /// Bridge extrusions have circular cross-section because unsupported
    /// filament naturally forms a round thread.
    pub fn bridging_flow(diameter: f64, nozzle_diameter: f64) -> Self {
        Self::new_with_spacing(
            diameter,
            diameter,
            diameter + BRIDGE_EXTRA_SPACING,
            nozzle_diameter,
            true,
        )
    }

    /// Create a Flow from a configured width, handling auto-width (0 = auto).
    pub fn new_from_config_width(
        role: FlowRole,
        width: f64,
        nozzle_diameter: f64,
        height: f64,
    ) -> FlowResult<Self> {
        if height <= 0.0 {
            return Err(FlowError::InvalidArgument(
                "Invalid flow height (must be positive)".to_string(),
            ));
        }

        let w = if width == 0.0 {
            Self::auto_extrusion_width(role, nozzle_diameter)
        } else {
            width
        };

        Self::new(w, height, nozzle_diameter)
    }

    // === Getters ===

    /// Get the extrusion width (mm).
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Get the extrusion width as scaled coordinate.
    #[inline]
    pub fn scaled_width(&self) -> Coord {
        scale(self.width)
    }

    /// Get the extrusion height / layer height (mm).
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Get the spacing between extrusion centerlines (mm).
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Get the spacing as scaled coordinate.
    #[inline]
    pub fn scaled_spacing(&self) -> Coord {
        scale(self.spacing)
    }

    /// Get the nozzle diameter (mm).
    #[inline]
    pub fn nozzle_diameter(&self) -> f64 {
        self.nozzle_diameter
    }

    /// Check if this is a bridging flow.
    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.bridge
    }

    /// Calculate the cross-sectional area of the extrusion (mm² = mm³/mm).
    pub fn mm3_per_mm(&self) -> FlowResult<f64> {
        let res = if self.bridge {
            // Circle with diameter = width
            (self.width * self.width) * 0.25 * PI
        } else {
            // Rectangle with semicircles at the ends
            self.height * (self.width - self.height * (1.0 - 0.25 * PI))
        };

        if res <= 0.0 {
            Err(FlowError::NegativeFlow)
        } else {
            Ok(res)
        }
    }

    /// Create a new Flow with a different width, keeping the height and
    /// nozzle and recomputing the spacing.
    ///
    /// # Panics
    ///
    /// Panics if this is a bridge flow (bridges have fixed width = height).
    pub fn with_width(&self, width: f64) -> FlowResult<Self> {
        assert!(!self.bridge, "Cannot modify width of bridge flow");
        let spacing = Self::rounded_rectangle_extrusion_spacing(width, self.height)?;
        Ok(Self::new_with_spacing(
            width,
            self.height,
            spacing,
            self.nozzle_diameter,
            false,
        ))
    }

    // === Static Helper Functions ===

    /// Spacing between extrusion centerlines for the rounded rectangle
    /// profile: `spacing = width - height × (1 - π/4)`.
    pub fn rounded_rectangle_extrusion_spacing(width: f64, height: f64) -> FlowResult<f64> {
        let spacing = width - height * (1.0 - 0.25 * PI);
        if spacing <= 0.0 {
            Err(FlowError::NegativeSpacing)
        } else {
            Ok(spacing)
        }
    }

    /// Extrusion width from desired spacing, the inverse of
    /// [`Flow::rounded_rectangle_extrusion_spacing`].
    #[inline]
    pub fn rounded_rectangle_extrusion_width_from_spacing(spacing: f64, height: f64) -> f64 {
        spacing + height * (1.0 - 0.25 * PI)
    }

    /// Sensible default extrusion width based on nozzle diameter and role.
    pub fn auto_extrusion_width(role: FlowRole, nozzle_diameter: f64) -> f64 {
        match role {
            FlowRole::ExternalPerimeter
            | FlowRole::Perimeter
            | FlowRole::SolidInfill
            | FlowRole::Infill => 1.125 * nozzle_diameter,
        }
    }
}

/// The two flows a region prints with, selected for a specific layer.
#[derive(Debug, Clone, Copy)]
pub struct RegionFlows {
    /// Flow for perimeter loops and thin walls.
    pub perimeter: Flow,
    /// Flow for fill surfaces handed downstream.
    pub infill: Flow,
}

impl RegionFlows {
    /// Select the flows for one layer: the first layer may print wider.
    pub fn for_layer(config: &RegionConfig, layer: &Layer) -> FlowResult<Self> {
        let height = layer.height_mm();

        let (perimeter_width, infill_width) =
            if layer.id() == 0 && config.first_layer_extrusion_width > 0.0 {
                (
                    config.first_layer_extrusion_width,
                    config.first_layer_extrusion_width,
                )
            } else {
                (
                    config.perimeter_extrusion_width,
                    config.infill_extrusion_width,
                )
            };

        Ok(Self {
            perimeter: Flow::new_from_config_width(
                FlowRole::Perimeter,
                perimeter_width,
                config.nozzle_diameter,
                height,
            )?,
            infill: Flow::new_from_config_width(
                FlowRole::Infill,
                infill_width,
                config.nozzle_diameter,
                height,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_flow_new() {
        let flow = Flow::new(0.45, 0.2, 0.4).unwrap();
        assert!(approx_eq(flow.width(), 0.45));
        assert!(approx_eq(flow.height(), 0.2));
        assert!(!flow.is_bridge());
        // Spacing is below the width by the semicircular overlap
        assert!(flow.spacing() < flow.width());
    }

    #[test]
    fn test_rounded_rectangle_spacing() {
        let spacing = Flow::rounded_rectangle_extrusion_spacing(0.45, 0.2).unwrap();
        let expected = 0.45 - 0.2 * (1.0 - 0.25 * PI);
        assert!(approx_eq(spacing, expected));
    }

    #[test]
    fn test_width_from_spacing_roundtrip() {
        let spacing = Flow::rounded_rectangle_extrusion_spacing(0.45, 0.2).unwrap();
        let width = Flow::rounded_rectangle_extrusion_width_from_spacing(spacing, 0.2);
        assert!(approx_eq(width, 0.45));
    }

    #[test]
    fn test_mm3_per_mm() {
        let flow = Flow::new(0.45, 0.2, 0.4).unwrap();
        let expected = 0.2 * (0.45 - 0.2 * (1.0 - 0.25 * PI));
        assert!(approx_eq(flow.mm3_per_mm().unwrap(), expected));

        let bridge = Flow::bridging_flow(0.4, 0.4);
        assert!(approx_eq(bridge.mm3_per_mm().unwrap(), PI * 0.04));
    }

    #[test]
    fn test_bridging_flow() {
        let flow = Flow::bridging_flow(0.4, 0.4);
        assert!(flow.is_bridge());
        assert!(approx_eq(flow.width(), flow.height()));
        assert!(approx_eq(flow.spacing(), 0.4 + BRIDGE_EXTRA_SPACING));
    }

    #[test]
    fn test_with_width() {
        let flow = Flow::new(0.45, 0.2, 0.4).unwrap();
        let wider = flow.with_width(0.675).unwrap();

        assert!(approx_eq(wider.width(), 0.675));
        assert!(approx_eq(wider.height(), 0.2));

        let expected_spacing = Flow::rounded_rectangle_extrusion_spacing(0.675, 0.2).unwrap();
        assert!(approx_eq(wider.spacing(), expected_spacing));
    }

    #[test]
    fn test_negative_spacing_error() {
        let result = Flow::rounded_rectangle_extrusion_spacing(0.1, 0.5);
        assert!(matches!(result, Err(FlowError::NegativeSpacing)));
    }

    #[test]
    fn test_auto_extrusion_width() {
        assert!(approx_eq(
            Flow::auto_extrusion_width(FlowRole::Perimeter, 0.4),
            0.45
        ));
    }

    #[test]
    fn test_scaled_values() {
        let flow = Flow::new(0.45, 0.2, 0.4).unwrap();
        assert_eq!(flow.scaled_width(), 450_000);
        assert_eq!(flow.scaled_spacing(), scale(flow.spacing()));
    }

    #[test]
    fn test_region_flows_first_layer() {
        let config = RegionConfig {
            perimeter_extrusion_width: 0.45,
            infill_extrusion_width: 0.45,
            first_layer_extrusion_width: 0.6,
            nozzle_diameter: 0.4,
            ..Default::default()
        };

        let first = crate::layer::Layer::new_f(0, 0.0, 0.2, 0.1);
        let flows = RegionFlows::for_layer(&config, &first).unwrap();
        assert!(approx_eq(flows.perimeter.width(), 0.6));

        let later = crate::layer::Layer::new_f(5, 1.0, 1.2, 1.1);
        let flows = RegionFlows::for_layer(&config, &later).unwrap();
        assert!(approx_eq(flows.perimeter.width(), 0.45));
    }
}
