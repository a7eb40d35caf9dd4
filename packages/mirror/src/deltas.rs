//! Per-change delta bundle.
//!
//! The engine does not emit events; it returns these values and the caller
//! owns outward notification. This replaces the event-emitter inheritance of
//! the upstream design with an explicit return value.

use std::collections::{HashMap, HashSet};

use darkroom_scene::{Bounds, LayerId, LayerNode};
use serde_json::Value;

use crate::protocol::{CompId, GlobalLight};

/// Previous value of one field, captured before the overwrite.
///
/// `previous` is `None` when the field had never been set.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDelta<T> {
    pub previous: Option<T>,
}

impl<T> FieldDelta<T> {
    pub fn new(previous: Option<T>) -> Self {
        Self { previous }
    }
}

/// Partition of one accepted layers change, keyed by layer id.
///
/// Removed entries own their pruned subtree root; added and moved entries
/// are snapshots of nodes still living in the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerDelta {
    pub added: HashMap<LayerId, LayerNode>,
    pub removed: HashMap<LayerId, LayerNode>,
    pub moved: HashMap<LayerId, LayerNode>,
}

impl LayerDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }
}

/// Everything one accepted change record touched.
///
/// A `None` field was absent from the record. Transient notification fields
/// (`closed`, `active`, `merged`, `flattened`) are included so the caller
/// can forward them without re-reading the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentChanges {
    pub file: Option<FieldDelta<String>>,
    pub global_light: Option<FieldDelta<GlobalLight>>,
    pub bounds: Option<FieldDelta<Bounds>>,
    pub resolution: Option<FieldDelta<f64>>,
    pub selection: Option<FieldDelta<HashSet<LayerId>>>,
    pub generator_settings: Option<FieldDelta<Value>>,
    pub layers: Option<LayerDelta>,
    pub comps: Option<FieldDelta<HashMap<CompId, Value>>>,
    pub placed: Option<FieldDelta<HashMap<String, Value>>>,
    pub closed: Option<FieldDelta<bool>>,
    pub active: Option<FieldDelta<bool>>,
    pub merged: Option<FieldDelta<bool>>,
    pub flattened: Option<FieldDelta<bool>>,
}
