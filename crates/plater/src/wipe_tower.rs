//! Wipe tower state and its arrange adapter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bed::BedGeometry;
use u_arrange_core::{ArrangeItem, ItemSource, Point, Polygon, DEFAULT_PRIORITY};

/// Live wipe tower state of the current print.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WipeTowerInfo {
    /// Whether the print has a wipe tower.
    pub enabled: bool,

    /// Absolute position in millimetres.
    pub position: (f64, f64),

    /// Rotation around Z in radians.
    pub rotation: f64,

    /// Local bounding box minimum corner in millimetres.
    pub bb_min: (f64, f64),

    /// Local bounding box maximum corner in millimetres.
    pub bb_max: (f64, f64),
}

impl WipeTowerInfo {
    /// Creates an enabled tower of `width` x `depth` at `position`.
    pub fn new(position: (f64, f64), width: f64, depth: f64) -> Self {
        Self {
            enabled: true,
            position,
            rotation: 0.0,
            bb_min: (0.0, 0.0),
            bb_max: (width, depth),
        }
    }

    /// Sets the rotation.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns true if the tower takes part in arrangement.
    pub fn is_arrangeable(&self) -> bool {
        self.enabled && self.bb_max.0 > self.bb_min.0 && self.bb_max.1 > self.bb_min.1
    }
}

/// Shared handle to the live wipe tower state.
#[derive(Debug, Clone, Default)]
pub struct WipeTowerHandle {
    inner: Arc<Mutex<WipeTowerInfo>>,
}

impl WipeTowerHandle {
    /// Wraps tower state in a new handle.
    pub fn new(info: WipeTowerInfo) -> Self {
        Self {
            inner: Arc::new(Mutex::new(info)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WipeTowerInfo> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> WipeTowerInfo {
        self.lock().clone()
    }

    /// Replaces the current state.
    pub fn set(&self, info: WipeTowerInfo) {
        *self.lock() = info;
    }

    /// Updates the tower placement.
    pub fn set_placement(&self, position: (f64, f64), rotation: f64) {
        let mut info = self.lock();
        info.position = position;
        info.rotation = rotation;
    }
}

/// Arrange adapter for the wipe tower.
///
/// Caches the tower state at construction and writes placement changes back
/// through the shared handle.
#[derive(Debug, Clone)]
pub struct WipeTower {
    info: WipeTowerInfo,
    handle: WipeTowerHandle,
}

impl WipeTower {
    /// Creates an adapter if the tower is arrangeable.
    pub fn from_handle(handle: &WipeTowerHandle) -> Option<Self> {
        let info = handle.snapshot();
        info.is_arrangeable().then(|| Self {
            info,
            handle: handle.clone(),
        })
    }

    /// Cached tower state.
    pub fn info(&self) -> &WipeTowerInfo {
        &self.info
    }

    /// Builds the arrange item: the bounding rectangle, one priority step above default.
    pub fn arrange_item(&self, bed: &BedGeometry) -> ArrangeItem {
        let poly = Polygon::rectangle(
            Point::from_mm(self.info.bb_min.0, self.info.bb_min.1),
            Point::from_mm(self.info.bb_max.0, self.info.bb_max.1),
        );
        let translation = Point::from_mm(self.info.position.0, self.info.position.1);
        ArrangeItem::new(poly, ItemSource::WipeTower)
            .with_translation(translation)
            .with_rotation(self.info.rotation)
            .with_bed(bed.bed_index_of(translation.x))
            .with_priority(DEFAULT_PRIORITY + 1)
    }

    /// Applies an arrange result to the adapter and the live tower state.
    pub fn apply_arrange_result(&mut self, translation: Point, rotation: f64) {
        self.info.position = translation.to_mm();
        self.info.rotation = rotation;
        self.handle.set_placement(self.info.position, rotation);
        log::debug!(
            "wipe tower moved to ({:.2}, {:.2}) rotation {:.3}",
            self.info.position.0,
            self.info.position.1,
            rotation
        );
    }
}
