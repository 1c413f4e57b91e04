//! Writing arrange results back to the scene.

use crate::bed::BedGeometry;
use crate::classify::ItemSets;
use crate::model::Model;
use crate::wipe_tower::WipeTower;
use u_arrange_core::{ArrangeItem, ItemSource, Point};

/// Applies engine output to the model and the wipe tower.
#[derive(Debug, Clone, Copy)]
pub struct ResultCommitter<'a> {
    bed: &'a BedGeometry,
}

impl<'a> ResultCommitter<'a> {
    /// Creates a committer for the given bed row.
    pub fn new(bed: &'a BedGeometry) -> Self {
        Self { bed }
    }

    /// Last bed used by printable items (selected or fixed), 0 when there are none.
    pub fn last_bed(sets: &ItemSets) -> usize {
        sets.selected
            .iter()
            .chain(sets.unselected.iter())
            .map(|item| item.bed_idx)
            .max()
            .unwrap_or(0)
    }

    /// Absolute row position of a bed-local translation.
    pub fn absolute_translation(&self, item: &ArrangeItem) -> Point {
        Point::new(
            item.translation.x + self.bed.bed_origin_x(item.bed_idx),
            item.translation.y,
        )
    }

    /// Commits selected and unprintable items; unselected items are only read.
    ///
    /// Unprintable items are moved past the last printable bed. Returns that bed.
    pub fn commit(
        &self,
        sets: &mut ItemSets,
        model: &mut Model,
        mut tower: Option<&mut WipeTower>,
    ) -> usize {
        let beds = Self::last_bed(sets);

        for item in &sets.selected {
            self.apply(item, model, tower.as_deref_mut());
        }

        for item in sets.unprintable.iter_mut() {
            item.bed_idx += beds + 1;
            self.apply(item, model, tower.as_deref_mut());
        }

        log::debug!(
            "committed {} items, {} unprintable after bed {}",
            sets.selected.len() + sets.unprintable.len(),
            sets.unprintable.len(),
            beds
        );
        beds
    }

    fn apply(&self, item: &ArrangeItem, model: &mut Model, tower: Option<&mut WipeTower>) {
        let translation = self.absolute_translation(item);
        match item.source {
            ItemSource::Instance(key) => match model.instance_mut(key) {
                Some(instance) => {
                    instance.offset = translation.to_mm();
                    instance.rotation = item.rotation;
                }
                None => log::warn!("{} no longer exists, result dropped", key),
            },
            ItemSource::WipeTower => match tower {
                Some(tower) => tower.apply_arrange_result(translation, item.rotation),
                None => log::warn!("wipe tower result without a tower, dropped"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelInstance, ModelObject};
    use crate::wipe_tower::{WipeTowerHandle, WipeTowerInfo};
    use u_arrange_core::{scaled, InstanceKey, Polygon};

    fn bed() -> BedGeometry {
        let outline = Polygon::rectangle(Point::new(0, 0), Point::from_mm(200.0, 200.0));
        BedGeometry::new(outline).unwrap()
    }

    fn item(object: usize, instance: usize) -> ArrangeItem {
        ArrangeItem::new(
            Polygon::rectangle(Point::new(0, 0), Point::from_mm(10.0, 10.0)),
            ItemSource::Instance(InstanceKey::new(object, instance)),
        )
    }

    fn model() -> Model {
        let mut model = Model::new();
        model.add_object(
            ModelObject::rectangle("a", 10.0, 10.0)
                .with_instance(ModelInstance::new(0.0, 0.0))
                .with_instance(ModelInstance::new(0.0, 0.0))
                .with_instance(ModelInstance::new(0.0, 0.0).with_printable(false))
                .with_instance(ModelInstance::new(0.0, 0.0).with_printable(false)),
        );
        model
    }

    #[test]
    fn test_unprintable_go_after_last_bed() {
        let bed = bed();
        let mut model = model();
        let mut sets = ItemSets {
            selected: vec![
                item(0, 0).with_bed(1).with_translation(Point::from_mm(5.0, 5.0)),
                item(0, 1).with_bed(2).with_translation(Point::from_mm(7.0, 9.0)),
            ],
            unselected: Vec::new(),
            unprintable: vec![
                item(0, 2).with_bed(0).with_translation(Point::from_mm(1.0, 1.0)),
                item(0, 3).with_bed(1).with_translation(Point::from_mm(2.0, 2.0)),
            ],
        };

        let beds = ResultCommitter::new(&bed).commit(&mut sets, &mut model, None);
        assert_eq!(beds, 2);
        assert_eq!(sets.unprintable[0].bed_idx, 3);
        assert_eq!(sets.unprintable[1].bed_idx, 4);

        // x = translation + bed * 220 mm
        let pos = |i: usize| model.instance(InstanceKey::new(0, i)).unwrap().offset;
        assert!((pos(0).0 - 225.0).abs() < 1e-6);
        assert!((pos(1).0 - 447.0).abs() < 1e-6);
        assert!((pos(1).1 - 9.0).abs() < 1e-6);
        assert!((pos(2).0 - 661.0).abs() < 1e-6);
        assert!((pos(3).0 - 882.0).abs() < 1e-6);
    }

    #[test]
    fn test_unselected_count_but_are_not_written() {
        let bed = bed();
        let mut model = model();
        let before = model.clone();
        let mut sets = ItemSets {
            selected: Vec::new(),
            unselected: vec![item(0, 0).with_bed(4).with_translation(Point::from_mm(50.0, 0.0))],
            unprintable: vec![item(0, 2)],
        };

        let beds = ResultCommitter::new(&bed).commit(&mut sets, &mut model, None);
        assert_eq!(beds, 4);
        assert_eq!(model.objects[0].instances[0], before.objects[0].instances[0]);
        assert_eq!(sets.unprintable[0].bed_idx, 5);
    }

    #[test]
    fn test_empty_sets_start_unprintable_on_bed_one() {
        let bed = bed();
        let mut model = model();
        let mut sets = ItemSets {
            unprintable: vec![item(0, 2)],
            ..ItemSets::default()
        };
        assert_eq!(ResultCommitter::new(&bed).commit(&mut sets, &mut model, None), 0);
        assert_eq!(sets.unprintable[0].bed_idx, 1);
    }

    #[test]
    fn test_tower_written_through_adapter() {
        let bed = bed();
        let mut model = model();
        let handle = WipeTowerHandle::new(WipeTowerInfo::new((0.0, 0.0), 40.0, 10.0));
        let mut tower = WipeTower::from_handle(&handle).unwrap();
        let tower_item = tower
            .arrange_item(&bed)
            .with_bed(1)
            .with_translation(Point::from_mm(30.0, 40.0))
            .with_rotation(0.25);
        let mut sets = ItemSets {
            selected: vec![tower_item],
            ..ItemSets::default()
        };

        ResultCommitter::new(&bed).commit(&mut sets, &mut model, Some(&mut tower));
        let live = handle.snapshot();
        assert!((live.position.0 - 250.0).abs() < 1e-6);
        assert!((live.position.1 - 40.0).abs() < 1e-6);
        assert!((live.rotation - 0.25).abs() < 1e-12);
        assert_eq!(tower.info().position, live.position);
        assert_eq!(scaled(live.position.0), scaled(30.0) + bed.stride());
    }

    #[test]
    fn test_missing_instance_skipped() {
        let bed = bed();
        let mut model = model();
        let before = model.clone();
        let mut sets = ItemSets {
            selected: vec![item(3, 0)],
            ..ItemSets::default()
        };
        ResultCommitter::new(&bed).commit(&mut sets, &mut model, None);
        assert_eq!(model, before);
    }
}
