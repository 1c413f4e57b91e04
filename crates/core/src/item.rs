//! Arrange items: the unit of placement handed to an [`Arranger`](crate::Arranger).

use crate::geometry::{BoundingBox, Point, Polygon};
use crate::transform::Transform2D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Priority every item starts with.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Index of an object instance in the scene's object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstanceKey {
    /// Object index.
    pub object: usize,
    /// Instance index within the object.
    pub instance: usize,
}

impl InstanceKey {
    /// Creates a new key.
    pub fn new(object: usize, instance: usize) -> Self {
        Self { object, instance }
    }
}

impl std::fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object {} instance {}", self.object, self.instance)
    }
}

/// What an item stands for in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ItemSource {
    /// An object instance.
    Instance(InstanceKey),
    /// The wipe tower of the current print.
    WipeTower,
}

impl std::fmt::Display for ItemSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(key) => write!(f, "{}", key),
            Self::WipeTower => f.write_str("wipe tower"),
        }
    }
}

/// A footprint to be placed on a virtual bed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrangeItem {
    /// Outer contour in item-local scaled coordinates.
    pub poly: Polygon,

    /// Placement translation.
    pub translation: Point,

    /// Placement rotation in radians.
    pub rotation: f64,

    /// Virtual bed index (0-based).
    pub bed_idx: usize,

    /// Packing priority (higher = placed first).
    pub priority: i32,

    /// Back-reference to the scene entity this item was built from.
    pub source: ItemSource,
}

impl ArrangeItem {
    /// Creates an item at the origin of bed 0.
    pub fn new(poly: Polygon, source: ItemSource) -> Self {
        Self {
            poly,
            translation: Point::default(),
            rotation: 0.0,
            bed_idx: 0,
            priority: DEFAULT_PRIORITY,
            source,
        }
    }

    /// Sets the translation.
    pub fn with_translation(mut self, translation: Point) -> Self {
        self.translation = translation;
        self
    }

    /// Sets the rotation in radians.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the bed index.
    pub fn with_bed(mut self, bed_idx: usize) -> Self {
        self.bed_idx = bed_idx;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the placement transform.
    pub fn transform(&self) -> Transform2D {
        Transform2D::new(self.translation, self.rotation)
    }

    /// Returns the contour in bed-local coordinates.
    pub fn transformed_polygon(&self) -> Polygon {
        self.transform().transform_polygon(&self.poly)
    }

    /// Bounding box of the placed contour.
    pub fn bounding_box(&self) -> BoundingBox {
        self.poly
            .bounding_box_at(self.rotation)
            .translated(self.translation)
    }

    /// Returns the contour area.
    pub fn area(&self) -> f64 {
        self.poly.area()
    }

    /// Returns the instance key when this item stands for an object instance.
    pub fn instance_key(&self) -> Option<InstanceKey> {
        match self.source {
            ItemSource::Instance(key) => Some(key),
            ItemSource::WipeTower => None,
        }
    }
}
