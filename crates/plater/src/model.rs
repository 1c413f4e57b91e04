//! Scene model: objects, their instances, and the user selection.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ObjectConfig;
use u_arrange_core::{InstanceKey, Polygon};

/// One placed copy of an object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelInstance {
    /// Absolute position on the virtual bed row, in millimetres.
    pub offset: (f64, f64),

    /// Rotation around Z in radians.
    pub rotation: f64,

    /// Whether the instance is printed.
    pub printable: bool,
}

impl Default for ModelInstance {
    fn default() -> Self {
        Self {
            offset: (0.0, 0.0),
            rotation: 0.0,
            printable: true,
        }
    }
}

impl ModelInstance {
    /// Creates a printable instance at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            offset: (x, y),
            ..Self::default()
        }
    }

    /// Sets the rotation.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the printable flag.
    pub fn with_printable(mut self, printable: bool) -> Self {
        self.printable = printable;
        self
    }
}

/// An object: a footprint shared by all of its instances.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelObject {
    /// Display name.
    pub name: String,

    /// Per-object configuration overrides.
    pub config: ObjectConfig,

    /// Footprint contour in object-local millimetres.
    pub footprint: Vec<(f64, f64)>,

    /// Instances of this object.
    pub instances: Vec<ModelInstance>,
}

impl ModelObject {
    /// Creates an object with the given footprint and no instances.
    pub fn new(name: &str, footprint: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.to_string(),
            footprint,
            ..Self::default()
        }
    }

    /// Creates an object with a rectangular footprint centred on its origin.
    pub fn rectangle(name: &str, width: f64, depth: f64) -> Self {
        let (hw, hd) = (width / 2.0, depth / 2.0);
        Self::new(name, vec![(-hw, -hd), (hw, -hd), (hw, hd), (-hw, hd)])
    }

    /// Sets the object configuration.
    pub fn with_config(mut self, config: ObjectConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an instance.
    pub fn with_instance(mut self, instance: ModelInstance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Footprint as a counter-clockwise scaled polygon.
    pub fn footprint_polygon(&self) -> Polygon {
        let mut poly = Polygon::from_mm(&self.footprint);
        poly.make_ccw();
        poly
    }
}

/// The set of objects on the plater.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Model {
    /// Objects in scene order.
    pub objects: Vec<ModelObject>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its index.
    pub fn add_object(&mut self, object: ModelObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Looks up an instance.
    pub fn instance(&self, key: InstanceKey) -> Option<&ModelInstance> {
        self.objects.get(key.object)?.instances.get(key.instance)
    }

    /// Looks up an instance for modification.
    pub fn instance_mut(&mut self, key: InstanceKey) -> Option<&mut ModelInstance> {
        self.objects.get_mut(key.object)?.instances.get_mut(key.instance)
    }

    /// Iterates over every instance key in scene order.
    pub fn instance_keys(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.objects.iter().enumerate().flat_map(|(o, obj)| {
            (0..obj.instances.len()).map(move |i| InstanceKey::new(o, i))
        })
    }

    /// Counts (printable, unprintable) instances.
    pub fn instance_counts(&self) -> (usize, usize) {
        self.objects
            .iter()
            .flat_map(|obj| obj.instances.iter())
            .fold((0, 0), |(p, u), inst| {
                if inst.printable {
                    (p + 1, u)
                } else {
                    (p, u + 1)
                }
            })
    }
}

/// Objects, instances and the wipe tower currently selected by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Selection {
    /// Selected instance indices per object index.
    pub instances: BTreeMap<usize, BTreeSet<usize>>,

    /// Whether the wipe tower is selected.
    pub wipe_tower: bool,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one instance.
    pub fn with_instance(mut self, object: usize, instance: usize) -> Self {
        self.instances.entry(object).or_default().insert(instance);
        self
    }

    /// Adds the first `count` instances of an object.
    pub fn with_object(mut self, object: usize, count: usize) -> Self {
        self.instances.entry(object).or_default().extend(0..count);
        self
    }

    /// Selects or deselects the wipe tower.
    pub fn with_wipe_tower(mut self, selected: bool) -> Self {
        self.wipe_tower = selected;
        self
    }

    /// Returns true if the instance is selected.
    pub fn contains(&self, key: InstanceKey) -> bool {
        self.instances
            .get(&key.object)
            .is_some_and(|set| set.contains(&key.instance))
    }

    /// Returns true if the wipe tower is selected.
    pub fn is_wipe_tower(&self) -> bool {
        self.wipe_tower
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        !self.wipe_tower && self.instances.values().all(|set| set.is_empty())
    }

    /// Selected keys that do not exist in `model`.
    pub fn dangling(&self, model: &Model) -> Vec<InstanceKey> {
        self.instances
            .iter()
            .flat_map(|(&o, set)| set.iter().map(move |&i| InstanceKey::new(o, i)))
            .filter(|&key| model.instance(key).is_none())
            .collect()
    }
}
