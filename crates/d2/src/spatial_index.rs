//! Spatial indexing of occupied bed regions using an R*-tree.
//!
//! Each virtual bed keeps one index holding the (spacing-inflated) bounding
//! boxes of its fixed obstacles and of the items settled so far, so candidate
//! positions can be rejected without scanning every occupant.

use rstar::{RTree, RTreeObject, AABB};
use u_arrange_core::BoundingBox;

/// Overlaps smaller than this (in scaled units) are treated as touching.
pub const OVERLAP_TOLERANCE: f64 = 1.0;

/// An occupied region on a bed.
#[derive(Debug, Clone)]
pub struct SpatialEntry2D {
    /// Index of the occupant in the caller's item list.
    pub index: usize,
    /// Axis-aligned bounding box (min_x, min_y, max_x, max_y).
    pub aabb: [f64; 4],
}

impl SpatialEntry2D {
    /// Creates a new spatial entry.
    pub fn new(index: usize, aabb: [f64; 4]) -> Self {
        Self { index, aabb }
    }

    /// Creates an entry from a scaled bounding box grown by `margin` on every side.
    pub fn from_bounding_box(index: usize, bb: &BoundingBox, margin: f64) -> Self {
        Self::new(index, inflate(to_aabb(bb), margin))
    }
}

impl RTreeObject for SpatialEntry2D {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.aabb[0], self.aabb[1]], [self.aabb[2], self.aabb[3]])
    }
}

/// 2D spatial index using R*-tree for collision queries on one bed.
#[derive(Debug)]
pub struct SpatialIndex2D {
    tree: RTree<SpatialEntry2D>,
}

impl SpatialIndex2D {
    /// Creates a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Creates a spatial index with the given entries.
    pub fn with_entries(entries: Vec<SpatialEntry2D>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Inserts a new entry into the spatial index.
    pub fn insert(&mut self, entry: SpatialEntry2D) {
        self.tree.insert(entry);
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds all entries whose bounding boxes intersect or touch the given AABB.
    pub fn query_aabb(&self, min: [f64; 2], max: [f64; 2]) -> Vec<&SpatialEntry2D> {
        let envelope = AABB::from_corners(min, max);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Returns true if `aabb` overlaps any entry by more than [`OVERLAP_TOLERANCE`].
    ///
    /// Boxes that merely share an edge do not collide.
    pub fn collides(&self, aabb: [f64; 4]) -> bool {
        self.query_aabb([aabb[0], aabb[1]], [aabb[2], aabb[3]])
            .iter()
            .any(|entry| overlaps(&entry.aabb, &aabb))
    }

    /// Returns an iterator over all entries in the index.
    pub fn iter(&self) -> impl Iterator<Item = &SpatialEntry2D> {
        self.tree.iter()
    }
}

impl Default for SpatialIndex2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a scaled bounding box to `[min_x, min_y, max_x, max_y]`.
pub fn to_aabb(bb: &BoundingBox) -> [f64; 4] {
    [
        bb.min.x as f64,
        bb.min.y as f64,
        bb.max.x as f64,
        bb.max.y as f64,
    ]
}

/// Grows an AABB by `margin` on every side.
pub fn inflate(aabb: [f64; 4], margin: f64) -> [f64; 4] {
    [
        aabb[0] - margin,
        aabb[1] - margin,
        aabb[2] + margin,
        aabb[3] + margin,
    ]
}

/// Strict overlap test with [`OVERLAP_TOLERANCE`].
fn overlaps(a: &[f64; 4], b: &[f64; 4]) -> bool {
    a[0] < b[2] - OVERLAP_TOLERANCE
        && b[0] < a[2] - OVERLAP_TOLERANCE
        && a[1] < b[3] - OVERLAP_TOLERANCE
        && b[1] < a[3] - OVERLAP_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_arrange_core::Point;

    #[test]
    fn test_spatial_index_new() {
        let index = SpatialIndex2D::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_spatial_index_query_aabb() {
        let mut index = SpatialIndex2D::new();

        // Insert three non-overlapping rectangles
        index.insert(SpatialEntry2D::new(0, [0.0, 0.0, 10.0, 10.0]));
        index.insert(SpatialEntry2D::new(1, [20.0, 0.0, 30.0, 10.0]));
        index.insert(SpatialEntry2D::new(2, [0.0, 20.0, 10.0, 30.0]));

        // Query overlapping with r1 only
        let results = index.query_aabb([5.0, 5.0], [15.0, 15.0]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);

        // Query overlapping with nothing
        let results = index.query_aabb([50.0, 50.0], [60.0, 60.0]);
        assert!(results.is_empty());

        // Query overlapping with all
        let results = index.query_aabb([-10.0, -10.0], [40.0, 40.0]);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_touching_boxes_do_not_collide() {
        let mut index = SpatialIndex2D::new();
        index.insert(SpatialEntry2D::new(0, [0.0, 0.0, 100.0, 100.0]));

        assert!(!index.collides([100.0, 0.0, 200.0, 100.0]));
        assert!(!index.collides([0.0, 100.0, 100.0, 200.0]));
        assert!(index.collides([50.0, 50.0, 150.0, 150.0]));
    }

    #[test]
    fn test_entry_from_bounding_box_with_margin() {
        let bb = BoundingBox::new(Point::new(10, 10), Point::new(20, 20));
        let entry = SpatialEntry2D::from_bounding_box(3, &bb, 5.0);
        assert_eq!(entry.index, 3);
        assert_eq!(entry.aabb, [5.0, 5.0, 25.0, 25.0]);
    }

    #[test]
    fn test_bulk_load() {
        let entries = vec![
            SpatialEntry2D::new(0, [0.0, 0.0, 10.0, 10.0]),
            SpatialEntry2D::new(1, [20.0, 0.0, 30.0, 10.0]),
            SpatialEntry2D::new(2, [0.0, 20.0, 10.0, 30.0]),
        ];

        let index = SpatialIndex2D::with_entries(entries);
        assert_eq!(index.len(), 3);
        assert_eq!(index.iter().count(), 3);

        let results = index.query_aabb([0.0, 0.0], [15.0, 15.0]);
        assert_eq!(results.len(), 1);
    }
}
