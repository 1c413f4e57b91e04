//! Engine invocation: parameters, the two arrange passes and progress mapping.

use std::sync::Arc;

use crate::classify::ItemSets;
use crate::config::ArrangeSettings;
use crate::job::JobContext;
use u_arrange_core::{scaled, ArrangeParams, Arranger, Coord, Polygon, Result};

/// Status text while the engine runs.
pub const STATUS_ARRANGING: &str = "Arranging";

/// Drives an [`Arranger`] over an [`ItemSets`].
#[derive(Clone)]
pub struct ArrangementEngineClient {
    arranger: Arc<dyn Arranger>,
}

impl ArrangementEngineClient {
    /// Creates a client for `arranger`.
    pub fn new(arranger: Arc<dyn Arranger>) -> Self {
        Self { arranger }
    }

    /// Engine name.
    pub fn name(&self) -> &str {
        self.arranger.name()
    }

    /// Scaled minimum item distance: the user distance, or twice the distance
    /// the print settings need, whichever is larger.
    pub fn min_obj_distance(settings: &ArrangeSettings, model_min_distance: f64) -> Coord {
        scaled(settings.distance.max(2.0 * model_min_distance))
    }

    /// Base parameters from the user settings.
    pub fn params(settings: &ArrangeSettings, model_min_distance: f64) -> ArrangeParams {
        ArrangeParams::new()
            .with_rotations(settings.enable_rotation)
            .with_min_distance(Self::min_obj_distance(settings, model_min_distance))
    }

    /// Arranges printable items around the fixed ones, then unprintable items alone.
    ///
    /// Progress is reported through `ctx` over
    /// `selected + unprintable` items; `ctx` cancellation stops both passes.
    pub fn run(
        &self,
        sets: &mut ItemSets,
        bed: &Polygon,
        base: &ArrangeParams,
        ctx: &JobContext,
    ) -> Result<()> {
        let unprintable = sets.unprintable.len();
        let count = sets.selected.len() + unprintable;

        let stop_ctx = ctx.clone();
        let progress_ctx = ctx.clone();
        let params = base
            .clone()
            .with_stop_condition(move || stop_ctx.was_canceled())
            .with_progress(move |remaining| {
                let st = remaining + unprintable;
                if st > 0 {
                    progress_ctx.update_status(count.saturating_sub(st), count, STATUS_ARRANGING);
                }
            });

        log::debug!(
            "{}: {} movable items around {} fixed",
            self.name(),
            sets.selected.len(),
            sets.unselected.len()
        );
        self.arranger
            .arrange(&mut sets.selected, &sets.unselected, bed, &params)?;

        let progress_ctx = ctx.clone();
        let params = params.with_progress(move |remaining| {
            if remaining > 0 {
                progress_ctx.update_status(
                    count.saturating_sub(remaining),
                    count,
                    STATUS_ARRANGING,
                );
            }
        });

        log::debug!("{}: {} unprintable items", self.name(), unprintable);
        self.arranger.arrange(&mut sets.unprintable, &[], bed, &params)
    }
}

impl std::fmt::Debug for ArrangementEngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrangementEngineClient")
            .field("arranger", &self.arranger.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Mutex};
    use u_arrange_core::{ArrangeItem, Error, InstanceKey, ItemSource, Point};

    /// Settles items in order and records what it was given.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(usize, usize, Coord, bool)>>,
    }

    impl Arranger for Recorder {
        fn arrange(
            &self,
            items: &mut [ArrangeItem],
            fixed: &[ArrangeItem],
            _bed: &Polygon,
            params: &ArrangeParams,
        ) -> Result<()> {
            self.calls.lock().unwrap().push((
                items.len(),
                fixed.len(),
                params.min_obj_distance,
                params.allow_rotations,
            ));
            let total = items.len();
            for (i, item) in items.iter_mut().enumerate() {
                if params.should_stop() {
                    break;
                }
                item.bed_idx = i;
                params.report_progress(total - i - 1);
            }
            Ok(())
        }
    }

    struct Failing;

    impl Arranger for Failing {
        fn arrange(
            &self,
            _: &mut [ArrangeItem],
            _: &[ArrangeItem],
            _: &Polygon,
            _: &ArrangeParams,
        ) -> Result<()> {
            Err(Error::InvalidGeometry("broken".into()))
        }
    }

    fn items(n: usize) -> Vec<ArrangeItem> {
        (0..n)
            .map(|i| {
                ArrangeItem::new(
                    Polygon::rectangle(Point::new(0, 0), Point::new(10, 10)),
                    ItemSource::Instance(InstanceKey::new(i, 0)),
                )
            })
            .collect()
    }

    fn bed() -> Polygon {
        Polygon::rectangle(Point::new(0, 0), Point::new(1000, 1000))
    }

    fn context() -> (JobContext, mpsc::Receiver<JobStatus>, Arc<AtomicBool>) {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        (JobContext::new(cancel.clone(), tx), rx, cancel)
    }

    #[test]
    fn test_min_obj_distance() {
        let settings = ArrangeSettings::new().with_distance(6.0);
        assert_eq!(ArrangementEngineClient::min_obj_distance(&settings, 0.0), scaled(6.0));
        assert_eq!(ArrangementEngineClient::min_obj_distance(&settings, 5.0), scaled(10.0));
    }

    #[test]
    fn test_two_passes_and_progress() {
        let recorder = Arc::new(Recorder::default());
        let client = ArrangementEngineClient::new(recorder.clone());
        let mut sets = ItemSets {
            selected: items(3),
            unselected: items(2),
            unprintable: items(2),
        };
        let (ctx, rx, _) = context();
        let settings = ArrangeSettings::new().with_rotation(true);
        let params = ArrangementEngineClient::params(&settings, 0.0);

        client.run(&mut sets, &bed(), &params, &ctx).unwrap();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(*calls, vec![(3, 2, scaled(6.0), true), (2, 0, scaled(6.0), true)]);

        let done: Vec<usize> = rx.try_iter().map(|s| s.done).collect();
        // count = 5; first pass: 5 - (remaining + 2); second: 5 - remaining, skipping 0
        assert_eq!(done, vec![1, 2, 3, 4]);
        assert!(sets.unprintable.iter().map(|it| it.bed_idx).eq([0, 1]));
    }

    #[test]
    fn test_cancel_stops_both_passes() {
        let client = ArrangementEngineClient::new(Arc::new(Recorder::default()));
        let mut sets = ItemSets {
            selected: items(3),
            unselected: Vec::new(),
            unprintable: items(2),
        };
        let before = sets.clone();
        let (ctx, rx, cancel) = context();
        cancel.store(true, Ordering::Release);

        client.run(&mut sets, &bed(), &ArrangeParams::new(), &ctx).unwrap();
        assert_eq!(sets, before);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_engine_error_propagates() {
        let client = ArrangementEngineClient::new(Arc::new(Failing));
        let mut sets = ItemSets {
            selected: items(1),
            ..ItemSets::default()
        };
        let (ctx, _rx, _) = context();
        let err = client.run(&mut sets, &bed(), &ArrangeParams::new(), &ctx).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry(_)));
    }
}
