//! # U-Arrange Plater
//!
//! Arrangement orchestration for a 3D-printing plater.
//!
//! An arrange run classifies scene instances (and the wipe tower) into
//! movable, fixed and unprintable items, grows each footprint by its brim
//! clearance, runs the packing engine on a background thread and commits the
//! result with multi-bed bookkeeping.
//!
//! ## Components
//!
//! - [`ItemClassifier`]: builds [`ItemSets`] for "arrange all" or "arrange selection"
//! - [`ClearanceInflator`]: brim clearance around footprints
//! - [`WipeTower`]: the wipe tower as an arrange item, written back through a [`WipeTowerHandle`]
//! - [`normalize_fixed_items`]: bed-relative coordinates for fixed items
//! - [`ArrangementEngineClient`]: engine parameters, passes and progress
//! - [`ResultCommitter`]: writes results back, unprintable items after the last bed
//! - [`ArrangeJob`], [`Worker`]: prepare, process on a worker thread, finalize
//!
//! ## Quick Start
//!
//! ```rust
//! use u_arrange_plater::{Model, ModelInstance, ModelObject, Plater, PrintConfig};
//!
//! let mut model = Model::new();
//! model.add_object(
//!     ModelObject::rectangle("cube", 20.0, 20.0)
//!         .with_instance(ModelInstance::new(0.0, 0.0))
//!         .with_instance(ModelInstance::new(0.0, 0.0)),
//! );
//!
//! let mut plater = Plater::new(model, PrintConfig::default());
//! let outcome = plater.arrange(false).unwrap();
//! assert!(outcome.is_finished());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization of the scene and configuration

pub mod arrange_job;
pub mod bed;
pub mod brim;
pub mod classify;
pub mod commit;
pub mod config;
pub mod engine;
pub mod job;
pub mod model;
pub mod plater;
pub mod region;
pub mod wipe_tower;
pub mod worker;

// Re-exports
pub use arrange_job::{ArrangeJob, ArrangeMode, ARRANGE_FAILED, STATUS_CANCELED, STATUS_DONE};
pub use bed::{normalize_fixed_items, BedGeometry};
pub use brim::{single_contour, ClearanceInflator};
pub use classify::{ItemClassifier, ItemSets};
pub use commit::ResultCommitter;
pub use config::{ArrangeSettings, ObjectConfig, PrintConfig, LOGICAL_BED_GAP};
pub use engine::{ArrangementEngineClient, STATUS_ARRANGING};
pub use job::{Job, JobContext, JobStatus};
pub use model::{Model, ModelInstance, ModelObject, Selection};
pub use plater::{Notification, Plater};
pub use region::{FlowRole, PrintRegion, RegionConfig};
pub use wipe_tower::{WipeTower, WipeTowerHandle, WipeTowerInfo};
pub use worker::{JobOutcome, RunningJob, Worker};
pub use u_arrange_core::{
    scaled, unscaled, ArrangeItem, ArrangeParams, Arranger, Error, InstanceKey, ItemSource, Result,
};
pub use u_arrange_d2::Arranger2D;
