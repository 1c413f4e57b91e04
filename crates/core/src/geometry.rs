//! Scaled integer geometry used by arrange items.
//!
//! All item and bed coordinates are stored as integers in units of
//! [`SCALING_FACTOR`] millimetres. Floating point math is only used for
//! rotation and for operations delegated to the `geo` crate (area, offset).

use geo::{Area, Buffer, Coord as GeoCoord, Intersects, Line, LineString, Polygon as GeoPolygon};
use nalgebra::{Point2, Rotation2};
use std::ops::{Add, Neg, Sub};

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scaled integer coordinate.
pub type Coord = i64;

/// Millimetres per scaled unit.
pub const SCALING_FACTOR: f64 = 1e-6;

/// Converts millimetres to scaled units.
#[inline]
pub fn scaled(mm: f64) -> Coord {
    (mm / SCALING_FACTOR).round() as Coord
}

/// Converts scaled units to millimetres.
#[inline]
pub fn unscaled(v: Coord) -> f64 {
    v as f64 * SCALING_FACTOR
}

/// A point in scaled coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate.
    pub x: Coord,
    /// Y coordinate.
    pub y: Coord,
}

impl Point {
    /// Creates a point from scaled coordinates.
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Creates a point from millimetre coordinates.
    pub fn from_mm(x: f64, y: f64) -> Self {
        Self::new(scaled(x), scaled(y))
    }

    /// Returns the point in millimetres.
    pub fn to_mm(self) -> (f64, f64) {
        (unscaled(self.x), unscaled(self.y))
    }

    /// Rotates the point around the origin by `angle` radians.
    pub fn rotated(self, angle: f64) -> Self {
        if angle.abs() < 1e-12 {
            return self;
        }
        let p = Rotation2::new(angle) * Point2::new(self.x as f64, self.y as f64);
        Self::new(p.x.round() as Coord, p.y.round() as Coord)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned bounding box in scaled coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point,
    /// Maximum corner.
    pub max: Point,
}

impl BoundingBox {
    /// Creates a bounding box from its corners.
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Computes the bounding box of a point set. Empty input yields a zero box.
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let mut bb = Self::new(*first, *first);
        for p in &points[1..] {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        bb
    }

    /// Width along X.
    pub fn width(&self) -> Coord {
        self.max.x - self.min.x
    }

    /// Height along Y.
    pub fn height(&self) -> Coord {
        self.max.y - self.min.y
    }

    /// Returns (width, height).
    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    /// Returns true if the box has no area.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Returns the box translated by `d`.
    pub fn translated(&self, d: Point) -> Self {
        Self::new(self.min + d, self.max + d)
    }
}

/// A simple polygon with a single outer contour.
///
/// The contour is stored open (the last point is not repeated).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from scaled vertices.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates a polygon from millimetre vertices.
    pub fn from_mm(vertices: &[(f64, f64)]) -> Self {
        Self::new(vertices.iter().map(|&(x, y)| Point::from_mm(x, y)).collect())
    }

    /// Creates a counter-clockwise rectangle from its corners.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::new(vec![
            min,
            Point::new(max.x, min.y),
            max,
            Point::new(min.x, max.y),
        ])
    }

    /// Returns the contour vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the vertex count.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the contour has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed area in scaled units squared (positive for counter-clockwise).
    pub fn signed_area(&self) -> f64 {
        self.to_geo().signed_area()
    }

    /// Unsigned area in scaled units squared.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Returns true if the contour is counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reorders the contour counter-clockwise.
    pub fn make_ccw(&mut self) {
        if self.signed_area() < 0.0 {
            self.points.reverse();
        }
    }

    /// Returns the bounding box of the contour.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Checks that the contour is usable as an arrange boundary.
    pub fn validate(&self) -> Result<()> {
        if self.points.len() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "contour needs at least 3 vertices, got {}",
                self.points.len()
            )));
        }
        if self.bounding_box().is_degenerate() || self.area() <= 0.0 {
            return Err(Error::InvalidGeometry("contour has zero area".into()));
        }
        if let Some((a, b)) = self.self_intersection() {
            return Err(Error::InvalidGeometry(format!(
                "contour is not simple: edges {} and {} intersect",
                a, b
            )));
        }
        Ok(())
    }

    /// First pair of non-adjacent edges that touch or cross.
    ///
    /// Repeated consecutive vertices are ignored.
    fn self_intersection(&self) -> Option<(usize, usize)> {
        let mut contour = self.points.clone();
        contour.dedup();
        if contour.len() > 1 && contour.first() == contour.last() {
            contour.pop();
        }

        let n = contour.len();
        let to_geo = |p: Point| GeoCoord {
            x: p.x as f64,
            y: p.y as f64,
        };
        let edges: Vec<Line<f64>> = (0..n)
            .map(|i| Line::new(to_geo(contour[i]), to_geo(contour[(i + 1) % n])))
            .collect();

        for i in 0..n {
            for j in (i + 2)..n {
                // first and last edge share the closing vertex
                if i == 0 && j == n - 1 {
                    continue;
                }
                if edges[i].intersects(&edges[j]) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Translates every vertex by `d`.
    pub fn translate(&mut self, d: Point) {
        for p in &mut self.points {
            *p = *p + d;
        }
    }

    /// Returns a copy translated by `d`.
    pub fn translated(&self, d: Point) -> Self {
        let mut out = self.clone();
        out.translate(d);
        out
    }

    /// Returns a copy rotated around the origin.
    pub fn rotated(&self, angle: f64) -> Self {
        if angle.abs() < 1e-12 {
            return self.clone();
        }
        Self::new(self.points.iter().map(|p| p.rotated(angle)).collect())
    }

    /// Bounding box of the contour rotated around the origin.
    pub fn bounding_box_at(&self, angle: f64) -> BoundingBox {
        if angle.abs() < 1e-12 || self.points.is_empty() {
            return self.bounding_box();
        }
        let rot = Rotation2::new(angle);
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.points {
            let r = rot * Point2::new(p.x as f64, p.y as f64);
            min = (min.0.min(r.x), min.1.min(r.y));
            max = (max.0.max(r.x), max.1.max(r.y));
        }
        BoundingBox::new(
            Point::new(min.0.round() as Coord, min.1.round() as Coord),
            Point::new(max.0.round() as Coord, max.1.round() as Coord),
        )
    }

    /// Outward offset by `delta` scaled units.
    ///
    /// Returns every resulting outer contour; callers decide how to treat a
    /// result that is not exactly one contour.
    pub fn offset(&self, delta: Coord) -> Vec<Polygon> {
        let buffered = self.to_geo().buffer(delta as f64);
        buffered
            .0
            .iter()
            .map(|poly| {
                let mut out = Polygon::from_geo_ring(poly.exterior());
                out.make_ccw();
                out
            })
            .filter(|poly| poly.len() >= 3)
            .collect()
    }

    /// Converts to a `geo` polygon in scaled units.
    pub fn to_geo(&self) -> GeoPolygon<f64> {
        let ring = LineString::from(
            self.points
                .iter()
                .map(|p| GeoCoord {
                    x: p.x as f64,
                    y: p.y as f64,
                })
                .collect::<Vec<_>>(),
        );
        GeoPolygon::new(ring, Vec::new())
    }

    /// Builds a contour from a closed `geo` ring, dropping the closing vertex.
    pub fn from_geo_ring(ring: &LineString<f64>) -> Self {
        let mut points: Vec<Point> = ring
            .coords()
            .map(|c| Point::new(c.x.round() as Coord, c.y.round() as Coord))
            .collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points.dedup();
        Self::new(points)
    }
}
