//! # U-Arrange 2D
//!
//! Default placement engine for the U-Arrange build-plate arrangement layer.
//!
//! [`Arranger2D`] packs footprints onto an unbounded row of identical virtual
//! beds. Items go bottom-left first, ordered by priority and then by area;
//! when a bed is full the next one is opened.
//!
//! ## Features
//!
//! - Bottom-left first-fit placement over virtual beds
//! - Minimum item distance honoured between every pair of items
//! - Optional quarter-turn rotations
//! - Fixed obstacles per bed (already printed or unselected items)
//! - Cooperative cancellation and progress reporting
//! - R*-tree spatial index for collision queries
//!
//! ## Quick Start
//!
//! ```rust
//! use u_arrange_d2::{
//!     scaled, ArrangeItem, ArrangeParams, Arranger, Arranger2D, InstanceKey, ItemSource,
//!     Point, Polygon,
//! };
//!
//! let bed = Polygon::rectangle(Point::new(0, 0), Point::from_mm(250.0, 210.0));
//! let mut items: Vec<ArrangeItem> = (0..4)
//!     .map(|i| {
//!         ArrangeItem::new(
//!             Polygon::rectangle(Point::new(0, 0), Point::from_mm(40.0, 30.0)),
//!             ItemSource::Instance(InstanceKey::new(i, 0)),
//!         )
//!     })
//!     .collect();
//!
//! let params = ArrangeParams::new().with_min_distance(scaled(6.0));
//! Arranger2D::new().arrange(&mut items, &[], &bed, &params).unwrap();
//!
//! assert!(items.iter().all(|item| item.bed_idx == 0));
//! ```

pub mod arranger;
pub mod spatial_index;

// Re-exports
pub use arranger::{Arranger2D, DEFAULT_MAX_BEDS};
pub use spatial_index::{SpatialEntry2D, SpatialIndex2D};
pub use u_arrange_core::{
    scaled, unscaled, ArrangeItem, ArrangeParams, Arranger, BoundingBox, Coord, Error,
    InstanceKey, ItemSource, Point, Polygon, Result,
};
