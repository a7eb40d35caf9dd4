//! # Document Mirror
//!
//! The top-level entry point of the engine: a local mirror of one remote
//! document, constructed from a full snapshot and kept consistent by
//! applying incremental change records.
//!
//! ## Lifecycle
//!
//! ```text
//! Snapshot → from_snapshot → Document
//!                               ↓ apply_change (repeated)
//!                        DocumentChanges (per-field deltas)
//! ```
//!
//! The mirror is a strict follower of the remote source: it never resolves
//! conflicts and never re-fetches. Every change record passes the
//! identity/version/ordering checks before any field handler runs.

use std::collections::{HashMap, HashSet};
use std::fmt;

use darkroom_scene::{Bounds, LayerChange, LayerDescription, LayerId, LayerTree};
use serde_json::Value;

use crate::classifier;
use crate::deltas::{DocumentChanges, FieldDelta, LayerDelta};
use crate::errors::DocumentError;
use crate::protocol::{ChangeRecord, CompId, DocumentId, DocumentSnapshot, GlobalLight};
use crate::reconciler;

/// Local mirror of one remote document.
///
/// Attributes are mutated only through [`Document::apply_change`]; the
/// engine owns the document/tree pair exclusively and nothing else may
/// mutate it (enforced by `&mut self`).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    version: String,
    count: u64,
    time_stamp: f64,

    file: Option<String>,
    bounds: Option<Bounds>,
    selection: Option<HashSet<LayerId>>,
    resolution: Option<f64>,
    global_light: Option<GlobalLight>,
    generator_settings: Option<Value>,
    layers: Option<LayerTree>,
    comps: Option<HashMap<CompId, Value>>,
    placed: Option<HashMap<String, Value>>,

    closed: Option<bool>,
    active: Option<bool>,
    merged: Option<bool>,
    flattened: Option<bool>,
}

impl Document {
    /// Builds the mirror from a full snapshot description.
    ///
    /// Layer indices declared by the snapshot are validated against the
    /// built tree; a disagreement means the snapshot is internally
    /// inconsistent and is rejected.
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self, DocumentError> {
        let mut document = Self {
            id: snapshot.id,
            version: snapshot.version,
            count: snapshot.count,
            time_stamp: snapshot.time_stamp,
            file: None,
            bounds: None,
            selection: None,
            resolution: None,
            global_light: None,
            generator_settings: None,
            layers: None,
            comps: None,
            placed: None,
            closed: None,
            active: None,
            merged: None,
            flattened: None,
        };

        if let Some(file) = snapshot.file {
            document.set_file(file);
        }
        if let Some(bounds) = snapshot.bounds {
            document.set_bounds(bounds);
        }
        if let Some(selection) = snapshot.selection {
            document.set_selection(&selection);
        }
        if let Some(resolution) = snapshot.resolution {
            document.set_resolution(resolution);
        }
        if let Some(global_light) = snapshot.global_light {
            document.set_global_light(global_light);
        }
        if let Some(settings) = snapshot.generator_settings {
            document.set_generator_settings(settings);
        }
        if let Some(layers) = &snapshot.layers {
            document.set_layers(layers)?;
        }
        if let Some(comps) = snapshot.comps {
            document.set_comps(comps);
        }
        if let Some(placed) = snapshot.placed {
            document.set_placed(placed);
        }

        Ok(document)
    }

    /// Applies one incremental change record.
    ///
    /// Returns `Ok(None)` for a stale or duplicate record (`count` at or
    /// below the document's) without touching the document; upstream
    /// buffering can deliver the same record more than once. Identity,
    /// version, and timestamp violations are protocol errors and fatal.
    ///
    /// On success the returned [`DocumentChanges`] carries one delta per
    /// field the record touched, in place of any outward notification.
    pub fn apply_change(
        &mut self,
        change: &ChangeRecord,
    ) -> Result<Option<DocumentChanges>, DocumentError> {
        if change.id != self.id {
            return Err(DocumentError::IdMismatch {
                document: self.id,
                change: change.id,
            });
        }
        if change.version != self.version {
            return Err(DocumentError::VersionMismatch {
                document: self.version.clone(),
                change: change.version.clone(),
            });
        }

        if change.count <= self.count {
            tracing::info!(
                "skipping out of order change {} (document at {})",
                change.count,
                self.count
            );
            return Ok(None);
        }

        if change.time_stamp < self.time_stamp {
            return Err(DocumentError::TimestampRegression {
                document: self.time_stamp,
                change: change.time_stamp,
            });
        }

        self.count = change.count;
        self.time_stamp = change.time_stamp;

        let mut changes = DocumentChanges::default();

        // updated properties
        if let Some(file) = &change.file {
            changes.file = Some(self.update_file(file.clone()));
        }
        if let Some(global_light) = change.global_light {
            changes.global_light = Some(self.update_global_light(global_light));
        }
        if let Some(bounds) = change.bounds {
            changes.bounds = Some(self.update_bounds(bounds));
        }
        if let Some(resolution) = change.resolution {
            changes.resolution = Some(self.update_resolution(resolution));
        }
        if let Some(selection) = &change.selection {
            changes.selection = Some(self.update_selection(selection));
        }
        if let Some(settings) = &change.generator_settings {
            changes.generator_settings = Some(self.update_generator_settings(settings.clone()));
        }
        if let Some(directives) = &change.layers {
            changes.layers = Some(self.update_layers(directives)?);
        }
        if let Some(comps) = &change.comps {
            changes.comps = Some(self.update_comps(comps.clone()));
        }
        if let Some(placed) = &change.placed {
            changes.placed = Some(self.update_placed(placed.clone()));
        }

        // change notifications
        if let Some(closed) = change.closed {
            changes.closed = Some(self.update_closed(closed));
        }
        if let Some(active) = change.active {
            changes.active = Some(self.update_active(active));
        }
        if let Some(merged) = change.merged {
            changes.merged = Some(self.update_merged(merged));
        }
        if let Some(flattened) = change.flattened {
            changes.flattened = Some(self.update_flattened(flattened));
        }

        Ok(Some(changes))
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Selected layer ids as a membership set; insertion order is not
    /// preserved because only membership matters.
    pub fn selection(&self) -> Option<&HashSet<LayerId>> {
        self.selection.as_ref()
    }

    pub fn resolution(&self) -> Option<f64> {
        self.resolution
    }

    pub fn global_light(&self) -> Option<GlobalLight> {
        self.global_light
    }

    pub fn generator_settings(&self) -> Option<&Value> {
        self.generator_settings.as_ref()
    }

    pub fn layers(&self) -> Option<&LayerTree> {
        self.layers.as_ref()
    }

    pub fn comps(&self) -> Option<&HashMap<CompId, Value>> {
        self.comps.as_ref()
    }

    pub fn placed(&self) -> Option<&HashMap<String, Value>> {
        self.placed.as_ref()
    }

    pub fn closed(&self) -> Option<bool> {
        self.closed
    }

    pub fn active(&self) -> Option<bool> {
        self.active
    }

    pub fn merged(&self) -> Option<bool> {
        self.merged
    }

    pub fn flattened(&self) -> Option<bool> {
        self.flattened
    }

    fn set_file(&mut self, file: String) {
        self.file = Some(file);
    }

    fn update_file(&mut self, file: String) -> FieldDelta<String> {
        let previous = self.file.take();
        self.set_file(file);
        FieldDelta::new(previous)
    }

    fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    fn update_bounds(&mut self, bounds: Bounds) -> FieldDelta<Bounds> {
        let previous = self.bounds.take();
        self.set_bounds(bounds);
        FieldDelta::new(previous)
    }

    fn set_selection(&mut self, selection: &[LayerId]) {
        self.selection = Some(selection.iter().copied().collect());
    }

    fn update_selection(&mut self, selection: &[LayerId]) -> FieldDelta<HashSet<LayerId>> {
        let previous = self.selection.take();
        self.set_selection(selection);
        FieldDelta::new(previous)
    }

    fn set_resolution(&mut self, resolution: f64) {
        self.resolution = Some(resolution);
    }

    fn update_resolution(&mut self, resolution: f64) -> FieldDelta<f64> {
        let previous = self.resolution.take();
        self.set_resolution(resolution);
        FieldDelta::new(previous)
    }

    fn set_global_light(&mut self, global_light: GlobalLight) {
        self.global_light = Some(global_light);
    }

    fn update_global_light(&mut self, global_light: GlobalLight) -> FieldDelta<GlobalLight> {
        let previous = self.global_light.take();
        self.set_global_light(global_light);
        FieldDelta::new(previous)
    }

    fn set_generator_settings(&mut self, settings: Value) {
        self.generator_settings = Some(settings);
    }

    fn update_generator_settings(&mut self, settings: Value) -> FieldDelta<Value> {
        let previous = self.generator_settings.take();
        self.set_generator_settings(settings);
        FieldDelta::new(previous)
    }

    fn set_layers(&mut self, layers: &[LayerDescription]) -> Result<(), DocumentError> {
        let tree = LayerTree::from_descriptions(layers)?;
        validate_snapshot_indices(&tree, layers)?;
        self.layers = Some(tree);
        Ok(())
    }

    fn update_layers(&mut self, directives: &[LayerChange]) -> Result<LayerDelta, DocumentError> {
        // A first-ever layers change starts from an empty tree.
        let tree = self.layers.get_or_insert_with(LayerTree::new);
        let changed = classifier::classify(tree, directives)?;
        reconciler::reconcile(tree, &changed, directives)
    }

    fn set_comps(&mut self, comps: HashMap<CompId, Value>) {
        self.comps = Some(comps);
    }

    fn update_comps(&mut self, comps: HashMap<CompId, Value>) -> FieldDelta<HashMap<CompId, Value>> {
        let previous = self.comps.take();
        self.set_comps(comps);
        FieldDelta::new(previous)
    }

    fn set_placed(&mut self, placed: HashMap<String, Value>) {
        self.placed = Some(placed);
    }

    fn update_placed(
        &mut self,
        placed: HashMap<String, Value>,
    ) -> FieldDelta<HashMap<String, Value>> {
        let previous = self.placed.take();
        self.set_placed(placed);
        FieldDelta::new(previous)
    }

    fn update_closed(&mut self, closed: bool) -> FieldDelta<bool> {
        let previous = self.closed.replace(closed);
        FieldDelta::new(previous)
    }

    fn update_active(&mut self, active: bool) -> FieldDelta<bool> {
        let previous = self.active.replace(active);
        FieldDelta::new(previous)
    }

    fn update_merged(&mut self, merged: bool) -> FieldDelta<bool> {
        let previous = self.merged.replace(merged);
        FieldDelta::new(previous)
    }

    fn update_flattened(&mut self, flattened: bool) -> FieldDelta<bool> {
        let previous = self.flattened.replace(flattened);
        FieldDelta::new(previous)
    }
}

/// Checks each declared snapshot index against the freshly built tree.
fn validate_snapshot_indices(
    tree: &LayerTree,
    layers: &[LayerDescription],
) -> Result<(), DocumentError> {
    for desc in layers {
        if let Some(expected) = desc.index {
            match tree.position(desc.id) {
                Some(actual) if actual == expected => {}
                Some(actual) => {
                    return Err(DocumentError::LayerIndexMismatch {
                        id: desc.id,
                        expected,
                        actual,
                    });
                }
                None => {
                    return Err(DocumentError::ChangedLayerMissing {
                        id: desc.id,
                        expected,
                    });
                }
            }
        }
        validate_snapshot_indices(tree, &desc.layers)?;
    }
    Ok(())
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layers {
            Some(tree) => write!(f, "Document {} {}", self.id, tree),
            None => write!(f, "Document {} []", self.id),
        }
    }
}
