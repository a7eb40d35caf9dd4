use serde::{Deserialize, Serialize};

/// Upstream-assigned layer identifier.
pub type LayerId = u64;

/// Pixel rectangle, as reported by the remote application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Bounds {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Layer kind, named as the upstream protocol names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    #[default]
    Layer,
    LayerSection,
    TextLayer,
    AdjustmentLayer,
    SmartObjectLayer,
    BackgroundLayer,
}

impl LayerKind {
    /// Whether layers of this kind can contain children.
    pub fn is_group(&self) -> bool {
        matches!(self, LayerKind::LayerSection)
    }
}

/// One layer in a full document snapshot, children outermost-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescription {
    pub id: LayerId,

    /// Declared position within the parent's ordered children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: LayerKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<LayerDescription>,
}

/// One layer-change directive inside a change record's `layers` field.
///
/// Presence of `index` declares the layer's new position within its parent.
/// `added` layers carry their description inline (`name`, `kind`, `bounds`).
/// A directive with neither an `index` nor `removed` is an inert marker: it
/// carries no positional information and exists only because some descendant
/// changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerChange {
    pub id: LayerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(default)]
    pub added: bool,

    #[serde(default)]
    pub removed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LayerKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<LayerChange>,
}

impl LayerChange {
    /// True when the directive carries no positional information of its own.
    pub fn is_inert(&self) -> bool {
        self.index.is_none() && !self.removed
    }
}
