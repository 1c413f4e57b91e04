//! Error types for U-Arrange.

use thiserror::Error;

/// Result type alias for U-Arrange operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing, arranging or committing items.
#[derive(Debug, Error)]
pub enum Error {
    /// An item boundary is degenerate or otherwise unusable.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The bed outline is degenerate.
    #[error("Invalid bed shape: {0}")]
    InvalidBed(String),

    /// An item does not fit on an empty bed with any allowed rotation.
    #[error("No valid placement found for item: {0}")]
    NoPlacement(String),

    /// A brim offset produced a contour count other than one.
    #[error("Offset produced {0} contours, expected exactly one")]
    OffsetContours(usize),

    /// A flow role name could not be resolved.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// An extruder index has no matching nozzle configuration.
    #[error("Unknown extruder {extruder} (configured extruders: {available})")]
    UnknownExtruder {
        /// The 1-based extruder index that was requested.
        extruder: u16,
        /// Number of extruders with a nozzle diameter configured.
        available: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A job is already running on the worker.
    #[error("Another job is already running")]
    JobBusy,

    /// Serialization error.
    #[cfg(feature = "serde")]
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
