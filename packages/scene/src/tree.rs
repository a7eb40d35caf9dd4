//! Ordered, id-addressed layer tree.
//!
//! Nodes live in an id-keyed arena; each parent holds an ordered list of
//! child ids. Detaching a layer unlinks it from its parent's list but keeps
//! its subtree in the arena, so a reconciler can pull several layers out and
//! re-insert them at new positions without ever holding dangling references.

use std::collections::HashMap;
use std::fmt;

use crate::error::SceneError;
use crate::node::{LayerNode, Parent};
use crate::patch::{ChangeKind, ClassifiedChanges};
use crate::raw::{LayerChange, LayerDescription, LayerId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerTree {
    nodes: HashMap<LayerId, LayerNode>,
    root: Vec<LayerId>,
}

impl LayerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from snapshot descriptions, outermost first.
    pub fn from_descriptions(layers: &[LayerDescription]) -> Result<Self, SceneError> {
        let mut tree = Self::new();
        for desc in layers {
            tree.build_node(Parent::Root, desc)?;
        }
        Ok(tree)
    }

    fn build_node(&mut self, parent: Parent, desc: &LayerDescription) -> Result<(), SceneError> {
        if self.nodes.contains_key(&desc.id) {
            return Err(SceneError::DuplicateLayer(desc.id));
        }

        let mut node = LayerNode::from_description(desc);
        node.parent = Some(parent);
        self.child_list_mut(parent)?.push(desc.id);
        self.nodes.insert(desc.id, node);

        for child in &desc.layers {
            self.build_node(Parent::Layer(desc.id), child)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn find(&self, id: LayerId) -> Option<&LayerNode> {
        self.nodes.get(&id)
    }

    /// Ids of the top-level layers, in order.
    pub fn top_level(&self) -> &[LayerId] {
        &self.root
    }

    /// Ordered child ids of `parent`. Empty when the parent is unknown.
    pub fn children_of(&self, parent: Parent) -> &[LayerId] {
        match parent {
            Parent::Root => &self.root,
            Parent::Layer(id) => self
                .nodes
                .get(&id)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Index of `id` within its parent's ordered children.
    ///
    /// `None` when the layer is absent from the arena or currently detached.
    pub fn position(&self, id: LayerId) -> Option<usize> {
        let node = self.nodes.get(&id)?;
        let parent = node.parent?;
        self.children_of(parent).iter().position(|child| *child == id)
    }

    pub fn is_attached(&self, id: LayerId) -> bool {
        self.position(id).is_some()
    }

    /// Unlinks a layer from its parent, keeping its subtree in the arena.
    ///
    /// Detaching an already-detached layer is a no-op; an unknown id is an
    /// internal-consistency error.
    pub fn detach(&mut self, id: LayerId) -> Result<(), SceneError> {
        let parent = self
            .nodes
            .get(&id)
            .ok_or(SceneError::UnknownLayer(id))?
            .parent;

        if let Some(parent) = parent {
            self.child_list_mut(parent)?.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Ok(())
    }

    /// Re-links a detached layer at `index` within `parent`'s children.
    ///
    /// An `index` past the end appends; the caller's validate pass is
    /// responsible for rejecting declared indices the tree cannot honor.
    pub fn attach(&mut self, parent: Parent, index: usize, id: LayerId) -> Result<(), SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::UnknownLayer(id))?;
        if node.parent.is_some() {
            return Err(SceneError::NotDetached(id));
        }

        let list = self.child_list_mut(parent)?;
        let at = index.min(list.len());
        list.insert(at, id);

        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Adds a brand-new layer to the arena, linked at `index`.
    pub fn attach_new(
        &mut self,
        parent: Parent,
        index: usize,
        mut node: LayerNode,
    ) -> Result<(), SceneError> {
        if self.nodes.contains_key(&node.id) {
            return Err(SceneError::DuplicateLayer(node.id));
        }

        let id = node.id;
        node.parent = None;
        self.nodes.insert(id, node);

        if let Err(err) = self.attach(parent, index, id) {
            self.nodes.remove(&id);
            return Err(err);
        }
        Ok(())
    }

    /// Prunes a detached subtree from the arena, returning its root node.
    pub fn remove(&mut self, id: LayerId) -> Result<LayerNode, SceneError> {
        match self.nodes.get(&id) {
            None => return Err(SceneError::UnknownLayer(id)),
            Some(node) if node.parent.is_some() => return Err(SceneError::NotDetached(id)),
            Some(_) => {}
        }

        let node = match self.nodes.remove(&id) {
            Some(node) => node,
            None => return Err(SceneError::UnknownLayer(id)),
        };

        let mut pending: Vec<LayerId> = node.children.clone();
        while let Some(child_id) = pending.pop() {
            if let Some(child) = self.nodes.remove(&child_id) {
                pending.extend(child.children);
            }
        }
        Ok(node)
    }

    /// Applies a classified change set at the indices the original nested
    /// directives declare.
    ///
    /// Added layers are built from the directive payload; moved layers must
    /// already be detached. Insertions at one nesting level run in ascending
    /// index order so an earlier insertion cannot displace a later declared
    /// position. Nested directive lists are applied inside their container
    /// layer when that container is attached; lists under removed or phantom
    /// containers are skipped.
    pub fn apply_changes(
        &mut self,
        changes: &ClassifiedChanges,
        directives: &[LayerChange],
    ) -> Result<(), SceneError> {
        self.apply_level(Parent::Root, changes, directives)
    }

    fn apply_level(
        &mut self,
        parent: Parent,
        changes: &ClassifiedChanges,
        directives: &[LayerChange],
    ) -> Result<(), SceneError> {
        let mut positional: Vec<&LayerChange> = directives
            .iter()
            .filter(|directive| directive.index.is_some())
            .filter(|directive| {
                matches!(
                    changes.get(directive.id).map(|change| change.kind),
                    Some(ChangeKind::Added) | Some(ChangeKind::Moved)
                )
            })
            .collect();
        positional.sort_by_key(|directive| directive.index);

        for directive in positional {
            let index = match directive.index {
                Some(index) => index,
                None => continue,
            };
            match changes.get(directive.id).map(|change| change.kind) {
                Some(ChangeKind::Added) => {
                    self.attach_new(parent, index, LayerNode::from_change(directive))?;
                }
                Some(ChangeKind::Moved) => {
                    self.attach(parent, index, directive.id)?;
                }
                _ => {}
            }
        }

        for directive in directives {
            if directive.layers.is_empty() {
                continue;
            }
            if self.is_attached(directive.id) {
                self.apply_level(Parent::Layer(directive.id), changes, &directive.layers)?;
            }
        }
        Ok(())
    }

    fn child_list_mut(&mut self, parent: Parent) -> Result<&mut Vec<LayerId>, SceneError> {
        match parent {
            Parent::Root => Ok(&mut self.root),
            Parent::Layer(id) => self
                .nodes
                .get_mut(&id)
                .map(|node| &mut node.children)
                .ok_or(SceneError::UnknownParent(id)),
        }
    }

    fn render_list(&self, ids: &[LayerId]) -> String {
        ids.iter()
            .map(|id| self.render_node(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_node(&self, id: LayerId) -> String {
        match self.nodes.get(&id) {
            Some(node) if node.children.is_empty() => node.label(),
            Some(node) => format!("{} [{}]", node.label(), self.render_list(&node.children)),
            None => id.to_string(),
        }
    }
}

impl fmt::Display for LayerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.render_list(&self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ClassifiedChange;
    use crate::raw::LayerKind;

    fn leaf(id: LayerId, name: &str) -> LayerDescription {
        LayerDescription {
            id,
            index: None,
            name: Some(name.to_string()),
            kind: LayerKind::Layer,
            bounds: None,
            layers: Vec::new(),
        }
    }

    fn group(id: LayerId, name: &str, layers: Vec<LayerDescription>) -> LayerDescription {
        LayerDescription {
            id,
            index: None,
            name: Some(name.to_string()),
            kind: LayerKind::LayerSection,
            bounds: None,
            layers,
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let tree = LayerTree::from_descriptions(&[
            group(1, "Group 1", vec![leaf(2, "Title"), leaf(3, "Body")]),
            leaf(4, "Background"),
        ])
        .unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.top_level(), &[1, 4]);
        assert_eq!(tree.find(2).unwrap().name.as_deref(), Some("Title"));
        assert_eq!(tree.position(3), Some(1));
        assert_eq!(tree.position(4), Some(1));
        assert_eq!(tree.position(99), None);
    }

    #[test]
    fn test_build_rejects_duplicate_ids() {
        let result = LayerTree::from_descriptions(&[leaf(1, "a"), leaf(1, "b")]);
        assert_eq!(result.unwrap_err(), SceneError::DuplicateLayer(1));
    }

    #[test]
    fn test_detach_then_attach_elsewhere() {
        let mut tree = LayerTree::from_descriptions(&[
            group(1, "g", vec![leaf(2, "a")]),
            leaf(3, "b"),
        ])
        .unwrap();

        tree.detach(3).unwrap();
        assert!(!tree.is_attached(3));
        assert!(tree.contains(3));
        assert_eq!(tree.top_level(), &[1]);

        tree.attach(Parent::Layer(1), 0, 3).unwrap();
        assert_eq!(tree.children_of(Parent::Layer(1)), &[3, 2]);
        assert_eq!(tree.position(3), Some(0));
    }

    #[test]
    fn test_attach_rejects_attached_layer() {
        let mut tree = LayerTree::from_descriptions(&[leaf(1, "a")]).unwrap();
        assert_eq!(
            tree.attach(Parent::Root, 0, 1),
            Err(SceneError::NotDetached(1))
        );
    }

    #[test]
    fn test_remove_prunes_subtree() {
        let mut tree = LayerTree::from_descriptions(&[group(
            1,
            "g",
            vec![leaf(2, "a"), group(3, "inner", vec![leaf(4, "b")])],
        )])
        .unwrap();

        tree.detach(1).unwrap();
        let removed = tree.remove(1).unwrap();

        assert_eq!(removed.id, 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_apply_changes_adds_at_declared_indices() {
        let mut tree = LayerTree::from_descriptions(&[leaf(1, "a"), leaf(2, "b")]).unwrap();

        let mut changes = ClassifiedChanges::new();
        changes.insert(10, ClassifiedChange::new(ChangeKind::Added, Some(1)));
        changes.insert(11, ClassifiedChange::new(ChangeKind::Added, Some(3)));

        let directives = vec![
            LayerChange {
                id: 11,
                index: Some(3),
                added: true,
                ..Default::default()
            },
            LayerChange {
                id: 10,
                index: Some(1),
                added: true,
                ..Default::default()
            },
        ];

        tree.apply_changes(&changes, &directives).unwrap();
        assert_eq!(tree.top_level(), &[1, 10, 2, 11]);
    }

    #[test]
    fn test_display_renders_nested_labels() {
        let tree = LayerTree::from_descriptions(&[
            group(1, "Group 1", vec![leaf(2, "Title")]),
            leaf(3, "Background"),
        ])
        .unwrap();

        assert_eq!(tree.to_string(), "[Group 1 [Title], Background]");
    }
}
