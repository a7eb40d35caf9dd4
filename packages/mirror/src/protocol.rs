//! Wire-adjacent records: the full snapshot a mirror is built from and the
//! incremental change records it applies.
//!
//! Field names follow the upstream protocol (camelCase on the wire). The
//! engine assumes records already passed wire decoding; the serde derives
//! exist so callers and tests can decode JSON payloads directly into them.

use std::collections::HashMap;

use darkroom_scene::{Bounds, LayerChange, LayerDescription, LayerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream-assigned document identifier.
pub type DocumentId = u64;

/// Upstream-assigned layer-comp identifier.
pub type CompId = u64;

/// Global light source shared by layer effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalLight {
    pub altitude: f64,
    pub angle: f64,
}

/// Full document description, delivered once when the mirror is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub id: DocumentId,

    /// Format tag; every change record must carry the same value.
    pub version: String,

    pub count: u64,
    pub time_stamp: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,

    /// Selected layer ids, ordered as the remote reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Vec<LayerId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_light: Option<GlobalLight>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_settings: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerDescription>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comps: Option<HashMap<CompId, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed: Option<HashMap<String, Value>>,
}

impl DocumentSnapshot {
    pub fn new(
        id: DocumentId,
        version: impl Into<String>,
        count: u64,
        time_stamp: f64,
    ) -> Self {
        Self {
            id,
            version: version.into(),
            count,
            time_stamp,
            file: None,
            bounds: None,
            selection: None,
            resolution: None,
            global_light: None,
            generator_settings: None,
            layers: None,
            comps: None,
            placed: None,
        }
    }
}

/// One incremental update: a single, ordered step in the document's history.
///
/// Presence of an optional field means "this attribute changed". The four
/// trailing booleans are transient notifications rather than persistent
/// attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: DocumentId,
    pub version: String,
    pub count: u64,
    pub time_stamp: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_light: Option<GlobalLight>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Vec<LayerId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_settings: Option<Value>,

    /// Nested layer-change directives, not a flat list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerChange>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comps: Option<HashMap<CompId, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed: Option<HashMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flattened: Option<bool>,
}

impl ChangeRecord {
    pub fn new(
        id: DocumentId,
        version: impl Into<String>,
        count: u64,
        time_stamp: f64,
    ) -> Self {
        Self {
            id,
            version: version.into(),
            count,
            time_stamp,
            file: None,
            global_light: None,
            bounds: None,
            resolution: None,
            selection: None,
            generator_settings: None,
            layers: None,
            comps: None,
            placed: None,
            closed: None,
            active: None,
            merged: None,
            flattened: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_record_decodes_camel_case() {
        let json = r#"{
            "id": 42,
            "version": "1.4.0",
            "count": 7,
            "timeStamp": 1000.5,
            "globalLight": {"altitude": 30.0, "angle": 120.0},
            "generatorSettings": {"plugin": {"enabled": true}}
        }"#;

        let change: ChangeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(change.time_stamp, 1000.5);
        assert_eq!(change.global_light.unwrap().angle, 120.0);
        assert!(change.generator_settings.is_some());
        assert!(change.layers.is_none());
    }

    #[test]
    fn test_snapshot_decodes_nested_layers() {
        let json = r#"{
            "id": 1,
            "version": "1.4.0",
            "count": 0,
            "timeStamp": 0.0,
            "layers": [
                {"id": 2, "index": 0, "type": "layerSection", "layers": [
                    {"id": 3, "index": 0, "name": "Title"}
                ]}
            ],
            "comps": {"9": {"name": "Comp 1"}}
        }"#;

        let snapshot: DocumentSnapshot = serde_json::from_str(json).unwrap();
        let layers = snapshot.layers.unwrap();
        assert_eq!(layers[0].layers[0].name.as_deref(), Some("Title"));
        assert!(snapshot.comps.unwrap().contains_key(&9));
    }
}
