//! Placement transform of an arrange item.

use nalgebra::{Isometry2, Point2, Vector2};

use crate::geometry::{Coord, Point, Polygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D rigid transformation (rotation about the origin, then translation)
/// in scaled coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform2D {
    /// Translation.
    pub translation: Point,
    /// Rotation angle in radians.
    pub angle: f64,
}

impl Transform2D {
    /// Creates a new identity transform.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Creates a new transform with both translation and rotation.
    pub fn new(translation: Point, angle: f64) -> Self {
        Self { translation, angle }
    }

    /// Converts to a nalgebra Isometry2.
    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(
            Vector2::new(self.translation.x as f64, self.translation.y as f64),
            self.angle,
        )
    }

    /// Transforms a single point.
    pub fn transform_point(&self, p: Point) -> Point {
        let q = self
            .to_isometry()
            .transform_point(&Point2::new(p.x as f64, p.y as f64));
        Point::new(q.x.round() as Coord, q.y.round() as Coord)
    }

    /// Transforms every vertex of a polygon.
    pub fn transform_polygon(&self, polygon: &Polygon) -> Polygon {
        let iso = self.to_isometry();
        Polygon::new(
            polygon
                .points()
                .iter()
                .map(|p| {
                    let q = iso.transform_point(&Point2::new(p.x as f64, p.y as f64));
                    Point::new(q.x.round() as Coord, q.y.round() as Coord)
                })
                .collect(),
        )
    }

    /// Checks if this is an identity transform.
    pub fn is_identity(&self) -> bool {
        self.translation == Point::default() && self.angle.abs() < 1e-12
    }
}
