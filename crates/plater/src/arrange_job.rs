//! The arrange job: classify, arrange on a worker, commit.

use crate::bed::{normalize_fixed_items, BedGeometry};
use crate::brim::ClearanceInflator;
use crate::classify::{ItemClassifier, ItemSets};
use crate::commit::ResultCommitter;
use crate::engine::ArrangementEngineClient;
use crate::job::{Job, JobContext};
use crate::plater::Plater;
use crate::wipe_tower::WipeTower;
use u_arrange_core::{ArrangeParams, Error, Result};

/// Final status of a completed run.
pub const STATUS_DONE: &str = "Arranging done.";

/// Final status of a cancelled run.
pub const STATUS_CANCELED: &str = "Arranging canceled.";

/// Notification text of a failed run.
pub const ARRANGE_FAILED: &str = "Could not arrange model objects! Some geometries may be invalid.";

/// Which items move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrangeMode {
    /// Every printable instance and the wipe tower.
    All,
    /// Only the selection; everything else stays put.
    Selected,
}

impl ArrangeMode {
    /// Selection mode while the modifier key is held.
    pub fn from_modifier(held: bool) -> Self {
        if held {
            Self::Selected
        } else {
            Self::All
        }
    }
}

/// Prepared state, present between `prepare` and `finalize`.
#[derive(Debug)]
struct Prepared {
    bed: BedGeometry,
    engine: ArrangementEngineClient,
    params: ArrangeParams,
    tower: Option<WipeTower>,
}

/// Single-use arrange job.
#[derive(Debug)]
pub struct ArrangeJob {
    mode: ArrangeMode,
    sets: ItemSets,
    prepared: Option<Prepared>,
    used: bool,
}

impl ArrangeJob {
    /// Creates a job in the given mode.
    pub fn new(mode: ArrangeMode) -> Self {
        Self {
            mode,
            sets: ItemSets::default(),
            prepared: None,
            used: false,
        }
    }

    /// Arrange mode.
    pub fn mode(&self) -> ArrangeMode {
        self.mode
    }

    /// Item sets built by `prepare`.
    pub fn item_sets(&self) -> &ItemSets {
        &self.sets
    }
}

fn not_prepared() -> Error {
    Error::Internal("arrange job was not prepared".into())
}

impl Job for ArrangeJob {
    fn prepare(&mut self, plater: &mut Plater) -> Result<()> {
        if self.used {
            return Err(Error::Internal("arrange job is single-use".into()));
        }
        self.used = true;

        let config = plater.config();
        let bed = BedGeometry::from_config(config)?;
        let params =
            ArrangementEngineClient::params(plater.settings(), config.min_object_distance()?);
        let tower = WipeTower::from_handle(plater.wipe_tower());

        let inflator = ClearanceInflator::from_config(config);
        let classifier =
            ItemClassifier::new(plater.model(), &bed, inflator).with_wipe_tower(tower.as_ref());
        self.sets = match self.mode {
            ArrangeMode::All => classifier.prepare_all(),
            ArrangeMode::Selected => classifier.prepare_selected(plater.selection()),
        };

        log::info!(
            "arrange ({:?}): {} selected, {} fixed, {} unprintable, min distance {:.2} mm",
            self.mode,
            self.sets.selected.len(),
            self.sets.unselected.len(),
            self.sets.unprintable.len(),
            u_arrange_core::unscaled(params.min_obj_distance)
        );

        self.prepared = Some(Prepared {
            bed,
            engine: ArrangementEngineClient::new(plater.arranger()),
            params,
            tower,
        });
        Ok(())
    }

    fn process(&mut self, ctx: &JobContext) -> Result<()> {
        let prepared = self.prepared.as_ref().ok_or_else(not_prepared)?;

        if self.mode == ArrangeMode::Selected {
            normalize_fixed_items(&mut self.sets.unselected, &prepared.bed);
        }

        let count = self.sets.selected.len() + self.sets.unprintable.len();
        prepared
            .engine
            .run(&mut self.sets, prepared.bed.outline(), &prepared.params, ctx)?;

        let message = if ctx.was_canceled() {
            STATUS_CANCELED
        } else {
            STATUS_DONE
        };
        ctx.update_status(count, count, message);
        Ok(())
    }

    fn finalize(&mut self, plater: &mut Plater, canceled: bool) -> Result<()> {
        if canceled {
            log::info!("arrange canceled, scene left unchanged");
            return Ok(());
        }
        let prepared = self.prepared.as_mut().ok_or_else(not_prepared)?;
        ResultCommitter::new(&prepared.bed).commit(
            &mut self.sets,
            plater.model_mut(),
            prepared.tower.as_mut(),
        );
        plater.update();
        Ok(())
    }

    fn name(&self) -> &str {
        "arrange"
    }

    fn failure_message(&self) -> String {
        ARRANGE_FAILED.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_modifier() {
        assert_eq!(ArrangeMode::from_modifier(false), ArrangeMode::All);
        assert_eq!(ArrangeMode::from_modifier(true), ArrangeMode::Selected);
    }

    #[test]
    fn test_unprepared_job_refuses_to_process() {
        let mut job = ArrangeJob::new(ArrangeMode::All);
        let (tx, _rx) = std::sync::mpsc::channel();
        let ctx = JobContext::new(Default::default(), tx);
        assert!(matches!(job.process(&ctx), Err(Error::Internal(_))));
        assert!(job.item_sets().is_empty());
    }
}
