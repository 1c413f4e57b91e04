//! # U-Arrange Core
//!
//! Core types and abstractions for the U-Arrange build-plate arrangement layer.
//!
//! This crate provides the types shared between the placement engines and the
//! plater-side orchestration (classification, brim inflation, multi-bed
//! bookkeeping).
//!
//! ## Core Components
//!
//! - **Scaled geometry**: [`Point`], [`Polygon`], [`BoundingBox`], [`scaled`], [`unscaled`]
//! - **Items**: [`ArrangeItem`], [`ItemSource`], [`InstanceKey`]
//! - **Engine contract**: [`Arranger`], [`ArrangeParams`]
//! - **Transforms**: [`Transform2D`]
//!
//! ## Engine parameters
//!
//! ```rust
//! use u_arrange_core::{scaled, ArrangeParams};
//!
//! let params = ArrangeParams::new()
//!     .with_rotations(true)
//!     .with_min_distance(scaled(6.0))
//!     .with_progress(|remaining| println!("{} left", remaining));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod arranger;
pub mod error;
pub mod geometry;
pub mod item;
pub mod transform;

// Re-exports
pub use arranger::{ArrangeParams, Arranger, ProgressCallback, StopCondition};
pub use error::{Error, Result};
pub use geometry::{scaled, unscaled, BoundingBox, Coord, Point, Polygon, SCALING_FACTOR};
pub use item::{ArrangeItem, InstanceKey, ItemSource, DEFAULT_PRIORITY};
pub use transform::Transform2D;
