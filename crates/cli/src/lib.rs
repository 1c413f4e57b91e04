//! # U-Arrange CLI
//!
//! JSON scene files and a blocking arrange run for the `arrange` binary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use u_arrange_plater::{
    ArrangeSettings, Error, JobOutcome, Model, Notification, Plater, PrintConfig, Result, Selection,
    WipeTowerInfo,
};

/// How often the waiting thread polls for status updates.
const STATUS_POLL: Duration = Duration::from_millis(100);

/// A complete plater scene as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    /// Print configuration.
    pub config: PrintConfig,
    /// Arrange settings.
    pub settings: ArrangeSettings,
    /// Objects and instances.
    pub model: Model,
    /// User selection.
    pub selection: Selection,
    /// Wipe tower, if the print has one.
    pub wipe_tower: Option<WipeTowerInfo>,
}

impl SceneFile {
    /// Parses a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Serializes the scene to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Builds a plater with `options` applied on top of the stored settings.
    pub fn into_plater(self, options: &RunOptions) -> Plater {
        let mut settings = self.settings;
        if let Some(distance) = options.distance {
            settings = settings.with_distance(distance);
        }
        if options.rotate {
            settings = settings.with_rotation(true);
        }

        let plater = Plater::new(self.model, self.config)
            .with_selection(self.selection)
            .with_settings(settings);
        match self.wipe_tower {
            Some(tower) => plater.with_wipe_tower(tower),
            None => plater,
        }
    }

    /// Captures the current plater state.
    pub fn from_plater(plater: &Plater, had_tower: bool) -> Self {
        Self {
            config: plater.config().clone(),
            settings: *plater.settings(),
            model: plater.model().clone(),
            selection: plater.selection().clone(),
            wipe_tower: had_tower.then(|| plater.wipe_tower().snapshot()),
        }
    }
}

/// Command-line overrides for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Arrange only the selection.
    pub selected: bool,
    /// Allow rotations.
    pub rotate: bool,
    /// Override the arrange distance (mm).
    pub distance: Option<f64>,
}

/// Arranges `scene` and waits for the result, logging progress.
///
/// Returns the updated scene and how the run ended. A failed run returns the
/// scene unchanged.
pub fn run(scene: SceneFile, options: &RunOptions) -> Result<(SceneFile, JobOutcome)> {
    let had_tower = scene.wipe_tower.is_some();
    let mut plater = scene.into_plater(options);

    let mut running = plater.start_arrange(options.selected)?;
    let mut last_done = None;
    while !running.is_finished() {
        if let Some(status) = running.wait_status(STATUS_POLL) {
            if last_done != Some(status.done) {
                log::info!("{} {}/{}", status.message, status.done, status.total);
                last_done = Some(status.done);
            }
        }
    }
    if let Some(status) = running.latest_status() {
        log::info!("{}", status.message);
    }

    let outcome = running.join(&mut plater);
    for notification in plater.take_notifications() {
        match notification {
            Notification::Info(message) => log::info!("{}", message),
            Notification::Error(message) => log::error!("{}", message),
        }
    }

    Ok((SceneFile::from_plater(&plater, had_tower), outcome))
}
