//! Brim clearance: growing item footprints by the space their brim needs.

use crate::config::PrintConfig;
use u_arrange_core::{scaled, ArrangeItem, Coord, Error, Polygon, Result};

/// Grows item footprints by the brim width minus half the extruder clearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceInflator {
    brim_width: f64,
    extruder_clearance_radius: f64,
    one_brim: bool,
}

impl ClearanceInflator {
    /// Creates an inflator for a per-object brim.
    pub fn new(brim_width: f64, extruder_clearance_radius: f64) -> Self {
        Self {
            brim_width,
            extruder_clearance_radius,
            one_brim: false,
        }
    }

    /// Creates an inflator from the print configuration.
    pub fn from_config(config: &PrintConfig) -> Self {
        Self::new(config.brim_width, config.extruder_clearance_radius)
            .with_one_brim(config.complete_objects_one_brim)
    }

    /// Sets the unified brim flag. A unified brim disables inflation.
    pub fn with_one_brim(mut self, enabled: bool) -> Self {
        self.one_brim = enabled;
        self
    }

    /// Scaled margin for an object with an optional brim override.
    ///
    /// `None` when the brim is unified.
    pub fn margin(&self, brim_override: Option<f64>) -> Option<Coord> {
        if self.one_brim {
            return None;
        }
        let brim = brim_override.unwrap_or(self.brim_width);
        Some(scaled(brim - self.extruder_clearance_radius / 2.0))
    }

    /// Inflates `item` in place.
    ///
    /// Items with an invalid contour are left for the engine to reject.
    pub fn inflate(&self, item: &mut ArrangeItem, brim_override: Option<f64>) {
        let Some(margin) = self.margin(brim_override) else {
            return;
        };
        if margin <= 0 || item.poly.validate().is_err() {
            return;
        }

        match single_contour(item.poly.offset(margin)) {
            Ok(poly) => item.poly = poly,
            Err(err) => {
                log::warn!("brim inflation skipped for {}: {}", item.source, err);
                debug_assert!(false, "brim offset of {} failed: {}", item.source, err);
            }
        }
    }
}

/// Accepts an offset result only if it is exactly one contour.
pub fn single_contour(mut contours: Vec<Polygon>) -> Result<Polygon> {
    if contours.len() == 1 {
        if let Some(poly) = contours.pop() {
            return Ok(poly);
        }
    }
    Err(Error::OffsetContours(contours.len()))
}
