//! Partitioning of scene instances into arrange item sets.

use crate::bed::BedGeometry;
use crate::brim::ClearanceInflator;
use crate::model::{Model, ModelInstance, ModelObject, Selection};
use crate::wipe_tower::WipeTower;
use u_arrange_core::{ArrangeItem, InstanceKey, ItemSource, Point};

/// Items of one arrange run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSets {
    /// Movable items.
    pub selected: Vec<ArrangeItem>,
    /// Fixed obstacles.
    pub unselected: Vec<ArrangeItem>,
    /// Non-printable items, arranged on their own trailing beds.
    pub unprintable: Vec<ArrangeItem>,
}

impl ItemSets {
    /// Creates empty sets sized for `model`.
    fn with_capacity(model: &Model) -> Self {
        let (printable, unprintable) = model.instance_counts();
        Self {
            // one extra slot for the wipe tower
            selected: Vec::with_capacity(printable + 1),
            unselected: Vec::with_capacity(printable + 1),
            unprintable: Vec::with_capacity(unprintable),
        }
    }

    /// Total number of items.
    pub fn len(&self) -> usize {
        self.selected.len() + self.unselected.len() + self.unprintable.len()
    }

    /// Returns true if all sets are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds [`ItemSets`] from the scene.
pub struct ItemClassifier<'a> {
    model: &'a Model,
    bed: &'a BedGeometry,
    inflator: ClearanceInflator,
    tower: Option<&'a WipeTower>,
}

impl<'a> ItemClassifier<'a> {
    /// Creates a classifier over `model`.
    pub fn new(model: &'a Model, bed: &'a BedGeometry, inflator: ClearanceInflator) -> Self {
        Self {
            model,
            bed,
            inflator,
            tower: None,
        }
    }

    /// Includes the wipe tower, if any.
    pub fn with_wipe_tower(mut self, tower: Option<&'a WipeTower>) -> Self {
        self.tower = tower;
        self
    }

    /// Scene instances in order, with their keys.
    fn instances(&self) -> impl Iterator<Item = (InstanceKey, &'a ModelObject, &'a ModelInstance)> {
        let model: &'a Model = self.model;
        model.objects.iter().enumerate().flat_map(|(o, object)| {
            object
                .instances
                .iter()
                .enumerate()
                .map(move |(i, instance)| (InstanceKey::new(o, i), object, instance))
        })
    }

    /// Builds the inflated item of one instance.
    fn instance_item(
        &self,
        key: InstanceKey,
        object: &ModelObject,
        instance: &ModelInstance,
    ) -> ArrangeItem {
        let translation = Point::from_mm(instance.offset.0, instance.offset.1);
        let mut item = ArrangeItem::new(object.footprint_polygon(), ItemSource::Instance(key))
            .with_translation(translation)
            .with_rotation(instance.rotation)
            .with_bed(self.bed.bed_index_of(translation.x));
        self.inflator.inflate(&mut item, object.config.brim_width);
        item
    }

    /// Every printable instance is movable; the tower joins them.
    pub fn prepare_all(&self) -> ItemSets {
        let mut sets = ItemSets::with_capacity(self.model);

        for (key, object, instance) in self.instances() {
            let item = self.instance_item(key, object, instance);
            if instance.printable {
                sets.selected.push(item);
            } else {
                sets.unprintable.push(item);
            }
        }

        if let Some(tower) = self.tower {
            sets.selected.push(tower.arrange_item(self.bed));
        }

        sets
    }

    /// Selected printable instances are movable, the rest are obstacles.
    ///
    /// When nothing printable is selected everything is arranged instead.
    pub fn prepare_selected(&self, selection: &Selection) -> ItemSets {
        let mut sets = ItemSets::with_capacity(self.model);

        let dangling = selection.dangling(self.model);
        if !dangling.is_empty() {
            log::debug!("ignoring {} selection entries not in the model", dangling.len());
        }

        for (key, object, instance) in self.instances() {
            let item = self.instance_item(key, object, instance);
            if !instance.printable {
                sets.unprintable.push(item);
            } else if selection.contains(key) {
                sets.selected.push(item);
            } else {
                sets.unselected.push(item);
            }
        }

        if let Some(tower) = self.tower {
            let item = tower.arrange_item(self.bed);
            if selection.is_wipe_tower() {
                sets.selected.push(item);
            } else {
                sets.unselected.push(item);
            }
        }

        if sets.selected.is_empty() {
            std::mem::swap(&mut sets.selected, &mut sets.unselected);
        }

        sets
    }
}
