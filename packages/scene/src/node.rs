use crate::raw::{Bounds, LayerChange, LayerDescription, LayerId, LayerKind};

/// Where a node is linked within the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Direct child of the document root.
    Root,
    /// Child of a group layer.
    Layer(LayerId),
}

/// One layer in the arena.
///
/// Linkage (`parent`, `children`) is managed by [`LayerTree`]; a node whose
/// `parent` is `None` is detached and unreachable from the root.
///
/// [`LayerTree`]: crate::tree::LayerTree
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub id: LayerId,
    pub name: Option<String>,
    pub kind: LayerKind,
    pub bounds: Option<Bounds>,
    pub(crate) parent: Option<Parent>,
    pub(crate) children: Vec<LayerId>,
}

impl LayerNode {
    pub fn new(id: LayerId, kind: LayerKind) -> Self {
        Self {
            id,
            name: None,
            kind,
            bounds: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn from_description(desc: &LayerDescription) -> Self {
        Self {
            id: desc.id,
            name: desc.name.clone(),
            kind: desc.kind,
            bounds: desc.bounds,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Builds the node an `added` directive describes.
    pub fn from_change(change: &LayerChange) -> Self {
        Self {
            id: change.id,
            name: change.name.clone(),
            kind: change.kind.unwrap_or_default(),
            bounds: change.bounds,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    /// Ordered child ids. Empty for non-group layers.
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }

    /// Display label: the layer name, falling back to the id.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}
