//! Bottom-left first-fit arranger over virtual beds.

use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_2;

use crate::spatial_index::{inflate, to_aabb, SpatialEntry2D, SpatialIndex2D};
use u_arrange_core::{
    ArrangeItem, ArrangeParams, Arranger, BoundingBox, Coord, Error, Point, Polygon, Result,
};

/// Upper bound on the number of virtual beds a single call may open.
pub const DEFAULT_MAX_BEDS: usize = 256;

/// Slack (in scaled units) allowed when testing bed containment.
const BED_TOLERANCE: f64 = 1.0;

/// Default packing engine.
///
/// Items are taken by priority, then by area, and each one is put at the
/// lowest, then leftmost, free position of the first bed that can hold it.
/// Occupied regions are tracked as bounding boxes grown by half the minimum
/// item distance, so any two settled items keep at least that distance.
#[derive(Debug, Clone)]
pub struct Arranger2D {
    max_beds: usize,
}

/// Where an item ended up.
#[derive(Debug, Clone, Copy)]
struct Settled {
    index: usize,
    translation: Point,
    rotation: f64,
    bed_idx: usize,
}

impl Arranger2D {
    /// Creates an arranger with default limits.
    pub fn new() -> Self {
        Self {
            max_beds: DEFAULT_MAX_BEDS,
        }
    }

    /// Sets the maximum number of beds a call may use.
    pub fn with_max_beds(mut self, max_beds: usize) -> Self {
        self.max_beds = max_beds.max(1);
        self
    }

    /// Returns the maximum number of beds.
    pub fn max_beds(&self) -> usize {
        self.max_beds
    }

    /// Packing order: priority descending, then area descending. Stable.
    fn placement_order(items: &[ArrangeItem]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| {
            items[b].priority.cmp(&items[a].priority).then_with(|| {
                items[b]
                    .area()
                    .partial_cmp(&items[a].area())
                    .unwrap_or(Ordering::Equal)
            })
        });
        order
    }

    /// Rotations tried for an item, paired with the rotated local bounding box.
    fn rotation_candidates(item: &ArrangeItem, allow_rotations: bool) -> Vec<(f64, BoundingBox)> {
        let mut angles = vec![item.rotation];
        if allow_rotations {
            angles.push(item.rotation + FRAC_PI_2);
        }
        angles
            .into_iter()
            .map(|angle| (angle, item.poly.bounding_box_at(angle)))
            .collect()
    }

    /// Finds the lowest-then-leftmost free position on one bed.
    ///
    /// Returns the translation and rotation of the first fitting candidate.
    fn find_position(
        index: &SpatialIndex2D,
        bed: &BoundingBox,
        shapes: &[(f64, BoundingBox)],
        half_gap: f64,
    ) -> Option<(Point, f64)> {
        let bed_aabb = to_aabb(bed);

        // Candidate positions for the minimum corner of the placed (uninflated) box
        let mut candidates = vec![[bed_aabb[0], bed_aabb[1]]];
        for entry in index.iter() {
            let right = entry.aabb[2] + half_gap;
            let top = entry.aabb[3] + half_gap;
            candidates.push([right, bed_aabb[1]]);
            candidates.push([right, entry.aabb[1] + half_gap]);
            candidates.push([bed_aabb[0], top]);
            candidates.push([entry.aabb[0] + half_gap, top]);
        }
        candidates.sort_by(|a, b| a[1].total_cmp(&b[1]).then(a[0].total_cmp(&b[0])));
        candidates.dedup();

        for [cx, cy] in candidates {
            for &(angle, local) in shapes {
                let w = local.width() as f64;
                let h = local.height() as f64;

                let inside = cx >= bed_aabb[0] - BED_TOLERANCE
                    && cy >= bed_aabb[1] - BED_TOLERANCE
                    && cx + w <= bed_aabb[2] + BED_TOLERANCE
                    && cy + h <= bed_aabb[3] + BED_TOLERANCE;
                if !inside {
                    continue;
                }

                if index.collides(inflate([cx, cy, cx + w, cy + h], half_gap)) {
                    continue;
                }

                let translation = Point::new(
                    cx.round() as Coord - local.min.x,
                    cy.round() as Coord - local.min.y,
                );
                return Some((translation, angle));
            }
        }

        None
    }
}

impl Default for Arranger2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates an item contour, naming the item in the error.
fn validate_item(item: &ArrangeItem) -> Result<()> {
    item.poly.validate().map_err(|err| match err {
        Error::InvalidGeometry(msg) => Error::InvalidGeometry(format!("{}: {}", item.source, msg)),
        other => other,
    })
}

/// Makes sure `beds[bed_idx]` exists.
fn ensure_bed(beds: &mut Vec<SpatialIndex2D>, bed_idx: usize) {
    while beds.len() <= bed_idx {
        beds.push(SpatialIndex2D::new());
    }
}

impl Arranger for Arranger2D {
    fn arrange(
        &self,
        items: &mut [ArrangeItem],
        fixed: &[ArrangeItem],
        bed: &Polygon,
        params: &ArrangeParams,
    ) -> Result<()> {
        bed.validate()
            .map_err(|err| Error::InvalidBed(err.to_string()))?;
        for item in items.iter().chain(fixed.iter()) {
            validate_item(item)?;
        }

        let bed_box = bed.bounding_box();
        let half_gap = params.min_obj_distance as f64 / 2.0;

        // Reject items that cannot fit even an empty bed before placing anything
        for item in items.iter() {
            let fits = Self::rotation_candidates(item, params.allow_rotations)
                .iter()
                .any(|(_, bb)| bb.width() <= bed_box.width() && bb.height() <= bed_box.height());
            if !fits {
                return Err(Error::NoPlacement(format!(
                    "{} is larger than the bed",
                    item.source
                )));
            }
        }

        // Bulk-load fixed obstacles per bed
        let mut obstacles: Vec<Vec<SpatialEntry2D>> = Vec::new();
        for (i, obstacle) in fixed.iter().enumerate() {
            if obstacles.len() <= obstacle.bed_idx {
                obstacles.resize_with(obstacle.bed_idx + 1, Vec::new);
            }
            obstacles[obstacle.bed_idx].push(SpatialEntry2D::from_bounding_box(
                i,
                &obstacle.bounding_box(),
                half_gap,
            ));
        }
        let mut beds: Vec<SpatialIndex2D> = obstacles
            .into_iter()
            .map(SpatialIndex2D::with_entries)
            .collect();

        let total = items.len();
        let order = Self::placement_order(items);
        let mut settled: Vec<Settled> = Vec::with_capacity(total);

        for (placed, &idx) in order.iter().enumerate() {
            if params.should_stop() {
                log::debug!(
                    "{}: stop requested after {}/{} items",
                    self.name(),
                    placed,
                    total
                );
                break;
            }

            let item = &items[idx];
            let shapes = Self::rotation_candidates(item, params.allow_rotations);

            let mut bed_idx = 0;
            let (translation, rotation) = loop {
                if bed_idx >= self.max_beds {
                    return Err(Error::NoPlacement(format!(
                        "{} does not fit within {} beds",
                        item.source, self.max_beds
                    )));
                }
                ensure_bed(&mut beds, bed_idx);
                if let Some(found) =
                    Self::find_position(&beds[bed_idx], &bed_box, &shapes, half_gap)
                {
                    break found;
                }
                bed_idx += 1;
            };

            let placed_box = item.poly.bounding_box_at(rotation).translated(translation);
            beds[bed_idx].insert(SpatialEntry2D::from_bounding_box(
                fixed.len() + idx,
                &placed_box,
                half_gap,
            ));
            settled.push(Settled {
                index: idx,
                translation,
                rotation,
                bed_idx,
            });

            params.report_progress(total - placed - 1);
        }

        let beds_used = settled.iter().map(|s| s.bed_idx + 1).max().unwrap_or(0);
        log::debug!(
            "{}: settled {}/{} items on {} beds",
            self.name(),
            settled.len(),
            total,
            beds_used
        );

        for s in settled {
            let item = &mut items[s.index];
            item.translation = s.translation;
            item.rotation = s.rotation;
            item.bed_idx = s.bed_idx;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "Arranger2D"
    }
}
