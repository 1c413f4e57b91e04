//! Print region configuration: extruder and extrusion width per flow role.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{ObjectConfig, PrintConfig};
use u_arrange_core::{Error, Result};

/// Kind of extrusion a flow is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlowRole {
    /// Inner perimeters.
    Perimeter,
    /// Outermost perimeter.
    ExternalPerimeter,
    /// Sparse infill.
    Infill,
    /// Solid infill.
    SolidInfill,
    /// Top solid infill.
    TopSolidInfill,
    /// Support material.
    SupportMaterial,
    /// Support material interface.
    SupportMaterialInterface,
}

impl FlowRole {
    /// All roles in declaration order.
    pub const ALL: [FlowRole; 7] = [
        FlowRole::Perimeter,
        FlowRole::ExternalPerimeter,
        FlowRole::Infill,
        FlowRole::SolidInfill,
        FlowRole::TopSolidInfill,
        FlowRole::SupportMaterial,
        FlowRole::SupportMaterialInterface,
    ];

    /// Configuration name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perimeter => "perimeter",
            Self::ExternalPerimeter => "external_perimeter",
            Self::Infill => "infill",
            Self::SolidInfill => "solid_infill",
            Self::TopSolidInfill => "top_solid_infill",
            Self::SupportMaterial => "support_material",
            Self::SupportMaterialInterface => "support_material_interface",
        }
    }

    /// Returns true for support roles.
    pub fn is_support(&self) -> bool {
        matches!(self, Self::SupportMaterial | Self::SupportMaterialInterface)
    }
}

impl fmt::Display for FlowRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::UnknownRole(s.to_string()))
    }
}

/// Region-level extruder assignment and extrusion widths.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegionConfig {
    /// 1-based extruder for perimeters.
    pub perimeter_extruder: u16,
    /// 1-based extruder for sparse infill.
    pub infill_extruder: u16,
    /// 1-based extruder for solid infill.
    pub solid_infill_extruder: u16,

    /// Perimeter width (0 = object default).
    pub perimeter_extrusion_width: f64,
    /// External perimeter width (0 = object default).
    pub external_perimeter_extrusion_width: f64,
    /// Infill width (0 = object default).
    pub infill_extrusion_width: f64,
    /// Solid infill width (0 = object default).
    pub solid_infill_extrusion_width: f64,
    /// Top infill width (0 = object default).
    pub top_infill_extrusion_width: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            perimeter_extruder: 1,
            infill_extruder: 1,
            solid_infill_extruder: 1,
            perimeter_extrusion_width: 0.0,
            external_perimeter_extrusion_width: 0.0,
            infill_extrusion_width: 0.0,
            solid_infill_extrusion_width: 0.0,
            top_infill_extrusion_width: 0.0,
        }
    }
}

/// A region of a print object sharing one [`RegionConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrintRegion {
    config: RegionConfig,
}

impl PrintRegion {
    /// Creates a region.
    pub fn new(config: RegionConfig) -> Self {
        Self { config }
    }

    /// Region configuration.
    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// 1-based extruder printing `role` for this region.
    pub fn extruder(&self, role: FlowRole, object: &ObjectConfig) -> u16 {
        match role {
            FlowRole::Perimeter | FlowRole::ExternalPerimeter => self.config.perimeter_extruder,
            FlowRole::Infill => self.config.infill_extruder,
            FlowRole::SolidInfill | FlowRole::TopSolidInfill => self.config.solid_infill_extruder,
            FlowRole::SupportMaterial => object.support_material_extruder,
            FlowRole::SupportMaterialInterface => object.support_material_interface_extruder,
        }
    }

    /// Configured extrusion width for `role`.
    ///
    /// A positive first layer width on the object wins on the first layer.
    /// A zero role width falls back to the object default. Support roles are
    /// not region flows and are rejected.
    pub fn extrusion_width(
        &self,
        role: FlowRole,
        first_layer: bool,
        object: &ObjectConfig,
    ) -> Result<f64> {
        let width = if first_layer && object.first_layer_extrusion_width > 0.0 {
            object.first_layer_extrusion_width
        } else {
            match role {
                FlowRole::ExternalPerimeter => self.config.external_perimeter_extrusion_width,
                FlowRole::Perimeter => self.config.perimeter_extrusion_width,
                FlowRole::Infill => self.config.infill_extrusion_width,
                FlowRole::SolidInfill => self.config.solid_infill_extrusion_width,
                FlowRole::TopSolidInfill => self.config.top_infill_extrusion_width,
                FlowRole::SupportMaterial | FlowRole::SupportMaterialInterface => {
                    return Err(Error::UnknownRole(role.to_string()))
                }
            }
        };

        if width == 0.0 {
            Ok(object.extrusion_width)
        } else {
            Ok(width)
        }
    }

    /// Nozzle diameter of the extruder printing `role`.
    pub fn nozzle_diameter(
        &self,
        role: FlowRole,
        object: &ObjectConfig,
        print: &PrintConfig,
    ) -> Result<f64> {
        print.nozzle_diameter(self.extruder(role, object))
    }

    /// Average nozzle diameter over the perimeter, infill and solid infill extruders.
    pub fn nozzle_diameter_avg(&self, print: &PrintConfig) -> Result<f64> {
        let sum = print.nozzle_diameter(self.config.perimeter_extruder)?
            + print.nozzle_diameter(self.config.infill_extruder)?
            + print.nozzle_diameter(self.config.solid_infill_extruder)?;
        Ok(sum / 3.0)
    }
}
