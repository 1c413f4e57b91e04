//! Integration tests for u-arrange-plater.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use u_arrange_core::{BoundingBox, Coord, Point, Polygon};
use u_arrange_plater::{
    scaled, ArrangeItem, ArrangeParams, ArrangeSettings, Arranger, Error, InstanceKey, ItemSource,
    Model, ModelInstance, ModelObject, Notification, Plater, PrintConfig, Result, Selection,
    WipeTowerInfo, ARRANGE_FAILED, STATUS_CANCELED, STATUS_DONE,
};

/// 200 x 200 mm bed: stride 220 mm.
fn config() -> PrintConfig {
    PrintConfig::new().with_rectangular_bed(200.0, 200.0)
}

fn cubes(n: usize, size: f64) -> ModelObject {
    (0..n).fold(ModelObject::rectangle("cube", size, size), |obj, _| {
        obj.with_instance(ModelInstance::new(0.0, 0.0))
    })
}

/// Footprint bounds of an instance at its committed absolute position.
fn placed_box(model: &Model, key: InstanceKey) -> BoundingBox {
    let object = &model.objects[key.object];
    let instance = &model.objects[key.object].instances[key.instance];
    object
        .footprint_polygon()
        .bounding_box_at(instance.rotation)
        .translated(Point::from_mm(instance.offset.0, instance.offset.1))
}

fn assert_disjoint(model: &Model) {
    let keys: Vec<InstanceKey> = model.instance_keys().collect();
    for (i, &a) in keys.iter().enumerate() {
        for &b in &keys[i + 1..] {
            let (ba, bb) = (placed_box(model, a), placed_box(model, b));
            let apart = ba.max.x <= bb.min.x + 1
                || bb.max.x <= ba.min.x + 1
                || ba.max.y <= bb.min.y + 1
                || bb.max.y <= ba.min.y + 1;
            assert!(apart, "{} overlaps {}", a, b);
        }
    }
}

/// Records the fixed items it is given and places movable items in a row.
#[derive(Default)]
struct Recorder {
    fixed: Mutex<Vec<Vec<ArrangeItem>>>,
}

impl Arranger for Recorder {
    fn arrange(
        &self,
        items: &mut [ArrangeItem],
        fixed: &[ArrangeItem],
        _bed: &Polygon,
        params: &ArrangeParams,
    ) -> Result<()> {
        self.fixed.lock().unwrap().push(fixed.to_vec());
        let total = items.len();
        for (i, item) in items.iter_mut().enumerate() {
            if params.should_stop() {
                break;
            }
            item.translation = Point::from_mm(10.0 + 30.0 * i as f64, 10.0);
            item.bed_idx = 0;
            params.report_progress(total - i - 1);
        }
        Ok(())
    }
}

/// Settles `settle` items, then waits for a stop request.
struct Stalling {
    settle: usize,
}

impl Arranger for Stalling {
    fn arrange(
        &self,
        items: &mut [ArrangeItem],
        _fixed: &[ArrangeItem],
        _bed: &Polygon,
        params: &ArrangeParams,
    ) -> Result<()> {
        let total = items.len();
        for (i, item) in items.iter_mut().enumerate() {
            if i == self.settle {
                for _ in 0..5000 {
                    if params.should_stop() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(1));
                }
            }
            if params.should_stop() {
                break;
            }
            item.translation = Point::new(i as Coord * scaled(30.0), 0);
            params.report_progress(total - i - 1);
        }
        Ok(())
    }
}

mod arrange_all {
    use super::*;

    #[test]
    fn test_overlapping_cubes_are_separated() {
        let mut model = Model::new();
        model.add_object(cubes(6, 30.0));
        let mut plater = Plater::new(model, config());

        let outcome = plater.arrange(false).unwrap();
        assert!(outcome.is_finished());
        assert_eq!(plater.revision(), 1);
        assert_disjoint(plater.model());

        // Everything fits the first bed
        for key in plater.model().instance_keys() {
            assert!(placed_box(plater.model(), key).max.x <= scaled(200.0) + 2);
        }
    }

    #[test]
    fn test_spacing_honours_settings() {
        let mut model = Model::new();
        model.add_object(cubes(2, 40.0));
        let settings = ArrangeSettings::new().with_distance(10.0);
        let mut plater = Plater::new(model, config()).with_settings(settings);
        plater.arrange(false).unwrap();

        let a = placed_box(plater.model(), InstanceKey::new(0, 0));
        let b = placed_box(plater.model(), InstanceKey::new(0, 1));
        let gap = (b.min.x - a.max.x)
            .max(a.min.x - b.max.x)
            .max(b.min.y - a.max.y)
            .max(a.min.y - b.max.y);
        assert!(gap >= scaled(10.0) - 2, "gap {}", gap);
    }

    #[test]
    fn test_unprintable_after_last_bed() {
        // Three 150 mm cubes need three beds; the unprintable one goes to bed 3
        let mut model = Model::new();
        model.add_object(
            cubes(3, 150.0).with_instance(ModelInstance::new(0.0, 0.0).with_printable(false)),
        );
        let mut plater = Plater::new(model, config());
        assert!(plater.arrange(false).unwrap().is_finished());

        let stride = scaled(220.0);
        let bed_of = |key| placed_box(plater.model(), key).min.x.div_euclid(stride);
        let mut printable_beds: Vec<Coord> =
            (0..3).map(|i| bed_of(InstanceKey::new(0, i))).collect();
        printable_beds.sort_unstable();
        assert_eq!(printable_beds, vec![0, 1, 2]);
        assert_eq!(bed_of(InstanceKey::new(0, 3)), 3);
    }

    #[test]
    fn test_wipe_tower_moves_with_items() {
        let mut model = Model::new();
        model.add_object(cubes(2, 30.0));
        let tower = WipeTowerInfo::new((500.0, 500.0), 60.0, 20.0);
        let mut plater = Plater::new(model, config()).with_wipe_tower(tower);
        assert!(plater.arrange(false).unwrap().is_finished());

        let tower = plater.wipe_tower().snapshot();
        assert!(tower.position.0 < 200.0 && tower.position.1 < 200.0);
    }

    #[test]
    fn test_brim_widens_spacing() {
        let run = |brim: f64| {
            let mut model = Model::new();
            model.add_object(cubes(2, 40.0));
            let config = config().with_brim_width(brim).with_extruder_clearance_radius(4.0);
            let mut plater =
                Plater::new(model, config).with_settings(ArrangeSettings::new().with_distance(0.0));
            plater.arrange(false).unwrap();
            let a = placed_box(plater.model(), InstanceKey::new(0, 0));
            let b = placed_box(plater.model(), InstanceKey::new(0, 1));
            (b.min.x - a.max.x).max(a.min.x - b.max.x).max(b.min.y - a.max.y).max(a.min.y - b.max.y)
        };
        // brim 5, clearance 4: each footprint grows by 3 mm
        assert!((run(5.0) - scaled(6.0)).abs() <= scaled(0.01));
        assert!(run(0.0).abs() <= scaled(0.01));
    }
}

mod arrange_selected {
    use super::*;

    #[test]
    fn test_nothing_selected_arranges_everything() {
        let mut model = Model::new();
        model.add_object(cubes(3, 30.0));
        let mut plater = Plater::new(model, config());

        assert!(plater.arrange(true).unwrap().is_finished());
        assert_disjoint(plater.model());
    }

    #[test]
    fn test_fixed_items_seen_bed_local() {
        let mut model = Model::new();
        model.add_object(
            ModelObject::rectangle("cube", 20.0, 20.0)
                .with_instance(ModelInstance::new(0.0, 0.0))
                .with_instance(ModelInstance::new(470.0, 30.0)),
        );
        let recorder = Arc::new(Recorder::default());
        let mut plater = Plater::new(model, config())
            .with_selection(Selection::new().with_instance(0, 0))
            .with_arranger(recorder.clone());

        assert!(plater.arrange(true).unwrap().is_finished());

        let calls = recorder.fixed.lock().unwrap();
        let fixed = &calls[0];
        assert_eq!(fixed.len(), 1);
        // 470 mm lies on bed 2; 2 * 220 mm is removed
        assert_eq!(fixed[0].bed_idx, 2);
        assert_eq!(fixed[0].translation, Point::from_mm(30.0, 30.0));

        // The fixed instance is not written back
        let inst = plater.model().instance(InstanceKey::new(0, 1)).unwrap();
        assert_eq!(inst.offset, (470.0, 30.0));
        assert!(calls[1].is_empty());
    }

    #[test]
    fn test_unselected_tower_is_an_obstacle() {
        let mut model = Model::new();
        model.add_object(cubes(1, 20.0));
        let recorder = Arc::new(Recorder::default());
        let mut plater = Plater::new(model, config())
            .with_selection(Selection::new().with_instance(0, 0))
            .with_wipe_tower(WipeTowerInfo::new((100.0, 100.0), 60.0, 20.0))
            .with_arranger(recorder.clone());

        plater.arrange(true).unwrap();

        let calls = recorder.fixed.lock().unwrap();
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].source, ItemSource::WipeTower);
        assert_eq!(plater.wipe_tower().snapshot().position, (100.0, 100.0));
    }
}

mod job_control {
    use super::*;

    #[test]
    fn test_cancel_after_some_items_leaves_scene_unchanged() {
        let mut model = Model::new();
        let unprintable = ModelInstance::new(0.0, 0.0).with_printable(false);
        model.add_object(cubes(5, 20.0).with_instance(unprintable));
        let mut plater =
            Plater::new(model, config()).with_arranger(Arc::new(Stalling { settle: 2 }));
        let before = plater.model().clone();

        let mut running = plater.start_arrange(false).unwrap();
        // count = 5 selected + 1 unprintable; after 2 settled the done count is 2
        let mut seen = 0;
        for _ in 0..500 {
            if let Some(status) = running.wait_status(Duration::from_millis(10)) {
                seen = status.done;
                if seen >= 2 {
                    break;
                }
            }
        }
        assert_eq!(seen, 2);
        running.cancel();
        let outcome = running.join(&mut plater);

        assert!(outcome.is_cancelled());
        assert_eq!(plater.model(), &before);
        assert_eq!(plater.revision(), 0);
        assert!(plater.notifications().is_empty());
    }

    #[test]
    fn test_final_status_messages() {
        let mut model = Model::new();
        model.add_object(cubes(2, 20.0));
        let mut plater = Plater::new(model, config());
        let mut running = plater.start_arrange(false).unwrap();
        while !running.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        let status = running.latest_status().cloned().unwrap();
        assert_eq!(status.message, STATUS_DONE);
        assert_eq!((status.done, status.total), (2, 2));
        assert!(running.join(&mut plater).is_finished());

        let mut plater =
            Plater::new(Model::new(), config()).with_arranger(Arc::new(Stalling { settle: 0 }));
        plater.model_mut().add_object(cubes(2, 20.0));
        let mut running = plater.start_arrange(false).unwrap();
        running.cancel();
        while !running.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(running.latest_status().map(|s| s.message.as_str()), Some(STATUS_CANCELED));
        assert!(running.join(&mut plater).is_cancelled());
    }

    #[test]
    fn test_degenerate_geometry_fails_without_commit() {
        let mut model = Model::new();
        model.add_object(cubes(2, 20.0));
        model.add_object(
            ModelObject::new("sliver", vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)])
                .with_instance(ModelInstance::new(5.0, 5.0)),
        );
        let mut plater = Plater::new(model, config());
        let before = plater.model().clone();

        let outcome = plater.arrange(false).unwrap();
        assert!(matches!(outcome.error(), Some(Error::InvalidGeometry(_))));
        assert_eq!(plater.model(), &before);
        // finalize refreshes the scene; it never ran
        assert_eq!(plater.revision(), 0);
        assert_eq!(
            plater.notifications(),
            &[Notification::Error(ARRANGE_FAILED.to_string())]
        );
    }

    #[test]
    fn test_self_intersecting_footprint_fails_without_commit() {
        let mut model = Model::new();
        model.add_object(cubes(2, 20.0));
        model.add_object(
            ModelObject::new("bowtie", vec![(0.0, 0.0), (40.0, 30.0), (40.0, 0.0), (0.0, 10.0)])
                .with_instance(ModelInstance::new(5.0, 5.0)),
        );
        // A brim must not hide the crossing contour
        let mut plater = Plater::new(model, config().with_brim_width(15.0));
        let before = plater.model().clone();

        let outcome = plater.arrange(false).unwrap();
        assert!(matches!(outcome.error(), Some(Error::InvalidGeometry(_))));
        assert_eq!(plater.model(), &before);
        assert_eq!(plater.revision(), 0);
        assert_eq!(
            plater.notifications(),
            &[Notification::Error(ARRANGE_FAILED.to_string())]
        );
    }

    #[test]
    fn test_worker_refuses_second_job() {
        let mut model = Model::new();
        model.add_object(cubes(3, 20.0));
        let mut plater =
            Plater::new(model, config()).with_arranger(Arc::new(Stalling { settle: 1 }));

        let running = plater.start_arrange(false).unwrap();
        assert!(plater.worker().is_busy());
        assert!(matches!(plater.start_arrange(false), Err(Error::JobBusy)));

        running.cancel();
        assert!(running.join(&mut plater).is_cancelled());
        assert!(!plater.worker().is_busy());
        // Free again: a new job starts
        let again = plater.start_arrange(false).unwrap();
        again.cancel();
        assert!(again.join(&mut plater).is_cancelled());
    }

    #[test]
    fn test_dropping_running_job_cancels_it() {
        let mut model = Model::new();
        model.add_object(cubes(3, 20.0));
        let mut plater =
            Plater::new(model, config()).with_arranger(Arc::new(Stalling { settle: 1 }));
        let before = plater.model().clone();

        let running = plater.start_arrange(false).unwrap();
        drop(running);

        assert!(!plater.worker().is_busy());
        assert_eq!(plater.model(), &before);
    }

    #[test]
    fn test_invalid_bed_fails_to_start() {
        let mut model = Model::new();
        model.add_object(cubes(1, 20.0));
        let config = PrintConfig::new().with_bed_shape(vec![(0.0, 0.0), (200.0, 0.0)]);
        let mut plater = Plater::new(model, config);

        assert!(matches!(plater.arrange(false), Err(Error::InvalidBed(_))));
        assert!(!plater.worker().is_busy());
    }
}
