//! Print and arrange configuration.
//!
//! All lengths are in millimetres. Scaled values are derived on demand.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use u_arrange_core::{Error, Point, Polygon, Result};

/// Gap between consecutive virtual beds, as a fraction of the bed width.
pub const LOGICAL_BED_GAP: f64 = 0.1;

/// Printer and print settings relevant to arrangement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrintConfig {
    /// Bed outline vertices in millimetres.
    pub bed_shape: Vec<(f64, f64)>,

    /// Default brim width around each object.
    pub brim_width: f64,

    /// Radius of the extruder assembly, used for sequential printing clearance.
    pub extruder_clearance_radius: f64,

    /// Print objects one after another (sequential printing).
    pub complete_objects: bool,

    /// Print a single brim around all objects instead of one per object.
    pub complete_objects_one_brim: bool,

    /// Print a single skirt around all objects instead of one per object.
    pub complete_objects_one_skirt: bool,

    /// Number of skirt loops.
    pub skirts: u32,

    /// Skirt height in layers.
    pub skirt_height: u32,

    /// Distance between the skirt and the object.
    pub skirt_distance: f64,

    /// First layer extrusion width (0 = use the nozzle diameter).
    pub first_layer_extrusion_width: f64,

    /// Nozzle diameter per extruder (index 0 is extruder 1).
    pub nozzle_diameter: Vec<f64>,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            bed_shape: vec![(0.0, 0.0), (250.0, 0.0), (250.0, 210.0), (0.0, 210.0)],
            brim_width: 0.0,
            extruder_clearance_radius: 20.0,
            complete_objects: false,
            complete_objects_one_brim: false,
            complete_objects_one_skirt: false,
            skirts: 0,
            skirt_height: 1,
            skirt_distance: 6.0,
            first_layer_extrusion_width: 0.0,
            nozzle_diameter: vec![0.4],
        }
    }
}

impl PrintConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bed outline.
    pub fn with_bed_shape(mut self, shape: Vec<(f64, f64)>) -> Self {
        self.bed_shape = shape;
        self
    }

    /// Sets a rectangular bed with its origin at (0, 0).
    pub fn with_rectangular_bed(self, width: f64, depth: f64) -> Self {
        self.with_bed_shape(vec![(0.0, 0.0), (width, 0.0), (width, depth), (0.0, depth)])
    }

    /// Sets the default brim width.
    pub fn with_brim_width(mut self, width: f64) -> Self {
        self.brim_width = width;
        self
    }

    /// Sets the extruder clearance radius.
    pub fn with_extruder_clearance_radius(mut self, radius: f64) -> Self {
        self.extruder_clearance_radius = radius;
        self
    }

    /// Enables or disables sequential printing.
    pub fn with_complete_objects(mut self, enabled: bool) -> Self {
        self.complete_objects = enabled;
        self
    }

    /// Enables or disables the unified brim.
    pub fn with_one_brim(mut self, enabled: bool) -> Self {
        self.complete_objects_one_brim = enabled;
        self
    }

    /// Enables or disables the unified skirt.
    pub fn with_one_skirt(mut self, enabled: bool) -> Self {
        self.complete_objects_one_skirt = enabled;
        self
    }

    /// Configures the skirt.
    pub fn with_skirt(mut self, loops: u32, height: u32, distance: f64) -> Self {
        self.skirts = loops;
        self.skirt_height = height;
        self.skirt_distance = distance;
        self
    }

    /// Sets the first layer extrusion width.
    pub fn with_first_layer_extrusion_width(mut self, width: f64) -> Self {
        self.first_layer_extrusion_width = width;
        self
    }

    /// Sets the nozzle diameters, one per extruder.
    pub fn with_nozzle_diameters(mut self, diameters: Vec<f64>) -> Self {
        self.nozzle_diameter = diameters;
        self
    }

    /// Returns the bed outline in scaled coordinates.
    pub fn bed_polygon(&self) -> Polygon {
        let mut poly = Polygon::new(
            self.bed_shape
                .iter()
                .map(|&(x, y)| Point::from_mm(x, y))
                .collect(),
        );
        poly.make_ccw();
        poly
    }

    /// Nozzle diameter of a 1-based extruder.
    pub fn nozzle_diameter(&self, extruder: u16) -> Result<f64> {
        usize::from(extruder)
            .checked_sub(1)
            .and_then(|i| self.nozzle_diameter.get(i))
            .copied()
            .ok_or(Error::UnknownExtruder {
                extruder,
                available: self.nozzle_diameter.len(),
            })
    }

    /// Minimum distance between objects implied by the print settings.
    ///
    /// Sequential printing needs the extruder clearance radius. Otherwise a
    /// per-object skirt needs room for its loops. Anything else needs nothing.
    pub fn min_object_distance(&self) -> Result<f64> {
        if self.complete_objects {
            return Ok(self.extruder_clearance_radius);
        }

        if self.skirts > 0 && self.skirt_height >= 1 && !self.complete_objects_one_skirt {
            let width = if self.first_layer_extrusion_width > 0.0 {
                self.first_layer_extrusion_width
            } else {
                self.nozzle_diameter(1)?
            };
            return Ok(self.skirt_distance + f64::from(self.skirts) * width);
        }

        Ok(0.0)
    }
}

/// Per-object overrides.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObjectConfig {
    /// Brim width override for this object.
    pub brim_width: Option<f64>,

    /// Default extrusion width (0 = automatic).
    pub extrusion_width: f64,

    /// First layer extrusion width (0 = not overridden).
    pub first_layer_extrusion_width: f64,

    /// Support material extrusion width (0 = default).
    pub support_material_extrusion_width: f64,

    /// 1-based extruder for support material.
    pub support_material_extruder: u16,

    /// 1-based extruder for support material interface.
    pub support_material_interface_extruder: u16,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            brim_width: None,
            extrusion_width: 0.0,
            first_layer_extrusion_width: 0.0,
            support_material_extrusion_width: 0.0,
            support_material_extruder: 1,
            support_material_interface_extruder: 1,
        }
    }
}

impl ObjectConfig {
    /// Creates a configuration with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the brim width.
    pub fn with_brim_width(mut self, width: f64) -> Self {
        self.brim_width = Some(width);
        self
    }

    /// Sets the default extrusion width.
    pub fn with_extrusion_width(mut self, width: f64) -> Self {
        self.extrusion_width = width;
        self
    }

    /// Sets the first layer extrusion width.
    pub fn with_first_layer_extrusion_width(mut self, width: f64) -> Self {
        self.first_layer_extrusion_width = width;
        self
    }

    /// Sets the support extruders.
    pub fn with_support_extruders(mut self, material: u16, interface: u16) -> Self {
        self.support_material_extruder = material;
        self.support_material_interface_extruder = interface;
        self
    }
}

/// User arrange settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArrangeSettings {
    /// Requested distance between objects.
    pub distance: f64,

    /// Allow the engine to rotate objects.
    pub enable_rotation: bool,
}

impl Default for ArrangeSettings {
    fn default() -> Self {
        Self {
            distance: 6.0,
            enable_rotation: false,
        }
    }
}

impl ArrangeSettings {
    /// Creates default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested distance.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance.max(0.0);
        self
    }

    /// Enables or disables rotations.
    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.enable_rotation = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PrintConfig::default();
        assert_eq!(config.bed_shape.len(), 4);
        assert!(config.bed_polygon().is_ccw());
        assert_eq!(config.min_object_distance().unwrap(), 0.0);
    }

    #[test]
    fn test_sequential_uses_clearance_radius() {
        let config = PrintConfig::new()
            .with_complete_objects(true)
            .with_extruder_clearance_radius(35.0)
            .with_skirt(2, 1, 4.0);
        assert_eq!(config.min_object_distance().unwrap(), 35.0);
    }

    #[test]
    fn test_skirt_distance() {
        let config = PrintConfig::new().with_skirt(2, 1, 4.0);
        // 4 + 2 * 0.4 (nozzle of extruder 1)
        assert!((config.min_object_distance().unwrap() - 4.8).abs() < 1e-9);

        let config = config.with_first_layer_extrusion_width(0.5);
        assert!((config.min_object_distance().unwrap() - 5.0).abs() < 1e-9);

        let config = config.with_one_skirt(true);
        assert_eq!(config.min_object_distance().unwrap(), 0.0);
    }

    #[test]
    fn test_skirt_without_nozzle_fails() {
        let config = PrintConfig::new()
            .with_skirt(1, 1, 3.0)
            .with_nozzle_diameters(Vec::new());
        assert!(matches!(
            config.min_object_distance(),
            Err(Error::UnknownExtruder {
                extruder: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn test_nozzle_diameter_lookup() {
        let config = PrintConfig::new().with_nozzle_diameters(vec![0.4, 0.6]);
        assert_eq!(config.nozzle_diameter(2).unwrap(), 0.6);
        assert!(config.nozzle_diameter(0).is_err());
        assert!(config.nozzle_diameter(3).is_err());
    }

    #[test]
    fn test_arrange_settings_builder() {
        let settings = ArrangeSettings::new().with_distance(-1.0).with_rotation(true);
        assert_eq!(settings.distance, 0.0);
        assert!(settings.enable_rotation);
    }
}
