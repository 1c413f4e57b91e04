//! Placement engine contract and its parameters.

use std::fmt;
use std::sync::Arc;

use crate::geometry::{Coord, Polygon};
use crate::item::ArrangeItem;
use crate::Result;

/// Predicate polled by an engine between items; `true` requests a stop.
pub type StopCondition = Arc<dyn Fn() -> bool + Send + Sync>;

/// Progress callback receiving the number of items still to be placed.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Parameters for a single [`Arranger::arrange`] call.
#[derive(Clone, Default)]
pub struct ArrangeParams {
    /// Whether items may be rotated.
    pub allow_rotations: bool,

    /// Minimum distance between placed items, in scaled units.
    pub min_obj_distance: Coord,

    /// Cooperative cancellation predicate.
    pub stop_condition: Option<StopCondition>,

    /// Progress callback.
    pub progress: Option<ProgressCallback>,
}

impl ArrangeParams {
    /// Creates parameters with rotations disabled and no spacing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables rotations.
    pub fn with_rotations(mut self, allow: bool) -> Self {
        self.allow_rotations = allow;
        self
    }

    /// Sets the minimum item distance in scaled units.
    pub fn with_min_distance(mut self, distance: Coord) -> Self {
        self.min_obj_distance = distance.max(0);
        self
    }

    /// Sets the stop condition.
    pub fn with_stop_condition(mut self, stop: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.stop_condition = Some(Arc::new(stop));
        self
    }

    /// Sets the progress callback.
    pub fn with_progress(mut self, progress: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Polls the stop condition.
    pub fn should_stop(&self) -> bool {
        self.stop_condition.as_ref().is_some_and(|stop| stop())
    }

    /// Reports the number of items still to be placed.
    pub fn report_progress(&self, remaining: usize) {
        if let Some(progress) = &self.progress {
            progress(remaining);
        }
    }
}

impl fmt::Debug for ArrangeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrangeParams")
            .field("allow_rotations", &self.allow_rotations)
            .field("min_obj_distance", &self.min_obj_distance)
            .field("stop_condition", &self.stop_condition.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// A packing engine.
///
/// Implementations must:
/// - write translation, rotation and bed index into `items` in place;
/// - treat `fixed` as immovable obstacles on their own `bed_idx`, in
///   bed-local coordinates;
/// - poll [`ArrangeParams::should_stop`] before each item and, once it returns
///   true, stop with the already settled items valid and non-overlapping and
///   every other item untouched;
/// - call [`ArrangeParams::report_progress`] at least once per settled item
///   with a non-increasing remaining count;
/// - on invalid input or an item that fits no empty bed, return an error
///   without modifying any item.
pub trait Arranger: Send + Sync {
    /// Arranges `items` on copies of `bed` around the `fixed` obstacles.
    fn arrange(
        &self,
        items: &mut [ArrangeItem],
        fixed: &[ArrangeItem],
        bed: &Polygon,
        params: &ArrangeParams,
    ) -> Result<()>;

    /// Short engine name for logs.
    fn name(&self) -> &str {
        "arranger"
    }
}
