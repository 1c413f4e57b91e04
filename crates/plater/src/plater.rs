//! The plater: scene state, configuration and the arrange entry point.

use std::sync::Arc;

use crate::arrange_job::{ArrangeJob, ArrangeMode};
use crate::config::{ArrangeSettings, PrintConfig};
use crate::model::{Model, Selection};
use crate::wipe_tower::{WipeTowerHandle, WipeTowerInfo};
use crate::worker::{JobOutcome, RunningJob, Worker};
use u_arrange_core::{Arranger, Result};
use u_arrange_d2::Arranger2D;

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Informational message.
    Info(String),
    /// Non-fatal error.
    Error(String),
}

/// Scene state the arrange job reads from and writes to.
pub struct Plater {
    model: Model,
    selection: Selection,
    config: PrintConfig,
    settings: ArrangeSettings,
    wipe_tower: WipeTowerHandle,
    arranger: Arc<dyn Arranger>,
    worker: Worker,
    notifications: Vec<Notification>,
    revision: u64,
}

impl Plater {
    /// Creates a plater with the default engine.
    pub fn new(model: Model, config: PrintConfig) -> Self {
        Self {
            model,
            selection: Selection::default(),
            config,
            settings: ArrangeSettings::default(),
            wipe_tower: WipeTowerHandle::default(),
            arranger: Arc::new(Arranger2D::new()),
            worker: Worker::new(),
            notifications: Vec::new(),
            revision: 0,
        }
    }

    /// Sets the selection.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the arrange settings.
    pub fn with_settings(mut self, settings: ArrangeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the wipe tower state.
    pub fn with_wipe_tower(mut self, info: WipeTowerInfo) -> Self {
        self.wipe_tower = WipeTowerHandle::new(info);
        self
    }

    /// Replaces the packing engine.
    pub fn with_arranger(mut self, arranger: Arc<dyn Arranger>) -> Self {
        self.arranger = arranger;
        self
    }

    /// Scene model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Scene model, mutable.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replaces the selection.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Print configuration.
    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    /// Arrange settings.
    pub fn settings(&self) -> &ArrangeSettings {
        &self.settings
    }

    /// Shared wipe tower state.
    pub fn wipe_tower(&self) -> &WipeTowerHandle {
        &self.wipe_tower
    }

    /// Packing engine.
    pub fn arranger(&self) -> Arc<dyn Arranger> {
        self.arranger.clone()
    }

    /// Background worker.
    pub fn worker(&self) -> &Worker {
        &self.worker
    }

    /// Pending notifications.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Removes and returns pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Pushes an informational notification.
    pub fn notify_info(&mut self, message: impl Into<String>) {
        self.notifications.push(Notification::Info(message.into()));
    }

    /// Pushes a non-fatal error notification.
    pub fn notify_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.notifications.push(Notification::Error(message));
    }

    /// Number of scene refreshes so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Signals that the scene changed.
    pub fn update(&mut self) {
        self.revision += 1;
        log::debug!("scene refreshed (revision {})", self.revision);
    }

    /// Starts an arrange job in the background.
    ///
    /// `modifier` held selects selection mode; otherwise everything is arranged.
    pub fn start_arrange(&mut self, modifier: bool) -> Result<RunningJob> {
        let worker = self.worker.clone();
        let job = ArrangeJob::new(ArrangeMode::from_modifier(modifier));
        worker.start(Box::new(job), self)
    }

    /// Arranges and waits for the result.
    pub fn arrange(&mut self, modifier: bool) -> Result<JobOutcome> {
        let running = self.start_arrange(modifier)?;
        Ok(running.join(self))
    }
}

impl std::fmt::Debug for Plater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plater")
            .field("objects", &self.model.objects.len())
            .field("selection", &self.selection)
            .field("arranger", &self.arranger.name())
            .field("notifications", &self.notifications.len())
            .field("revision", &self.revision)
            .finish()
    }
}
