//! Virtual bed geometry and bed-relative coordinate normalization.
//!
//! Virtual beds are laid out in a row along X. Bed `i` starts at
//! `i * stride`, where the stride is the bed width plus a
//! [`LOGICAL_BED_GAP`] fraction of it. Scene positions are absolute along
//! this row; the engine works in bed-local coordinates.

use crate::config::{PrintConfig, LOGICAL_BED_GAP};
use u_arrange_core::{scaled, unscaled, ArrangeItem, BoundingBox, Coord, Error, Polygon, Result};

/// The bed outline and the virtual bed row derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct BedGeometry {
    outline: Polygon,
    bbox: BoundingBox,
    stride: Coord,
}

impl BedGeometry {
    /// Creates the geometry from a scaled bed outline.
    pub fn new(outline: Polygon) -> Result<Self> {
        outline
            .validate()
            .map_err(|err| Error::InvalidBed(err.to_string()))?;
        let bbox = outline.bounding_box();
        let stride = scaled((1.0 + LOGICAL_BED_GAP) * unscaled(bbox.width()));
        Ok(Self {
            outline,
            bbox,
            stride,
        })
    }

    /// Creates the geometry from the configured bed shape.
    pub fn from_config(config: &PrintConfig) -> Result<Self> {
        Self::new(config.bed_polygon())
    }

    /// Bed outline.
    pub fn outline(&self) -> &Polygon {
        &self.outline
    }

    /// Bounding box of the bed outline.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Bed width (X extent of the outline).
    pub fn width(&self) -> Coord {
        self.bbox.width()
    }

    /// Distance between the origins of consecutive virtual beds.
    pub fn stride(&self) -> Coord {
        self.stride
    }

    /// Virtual bed an absolute X coordinate falls on.
    ///
    /// Measured from the left edge of the outline, so beds whose outline
    /// does not start at X = 0 resolve the same way as origin beds.
    pub fn bed_index_of(&self, x: Coord) -> usize {
        (x - self.bbox.min.x).div_euclid(self.stride).max(0) as usize
    }

    /// Absolute X of the origin of bed `bed_idx`.
    pub fn bed_origin_x(&self, bed_idx: usize) -> Coord {
        bed_idx as Coord * self.stride
    }
}

/// Moves fixed items from absolute row positions into bed-local coordinates.
///
/// Each item's X translation loses `bed_idx * stride`; Y is unchanged.
pub fn normalize_fixed_items(items: &mut [ArrangeItem], bed: &BedGeometry) {
    for item in items.iter_mut() {
        item.translation.x -= bed.bed_origin_x(item.bed_idx);
    }
}
