//! Change reconciliation: the detach → apply → validate cycle.

use darkroom_scene::{
    ChangeKind, ClassifiedChange, ClassifiedChanges, LayerChange, LayerId, LayerTree, SceneError,
};

use crate::deltas::LayerDelta;
use crate::errors::DocumentError;

/// Turns a classified change set into a mutated tree plus the
/// added/removed/moved partition.
///
/// The phases run in a fixed order so that several layers reordered in one
/// change never observe a half-updated tree:
///
/// 1. Detach every non-added entry, ascending declared index.
/// 2. Re-insert moved layers and build added layers at their declared
///    indices, driven by the original nested directive structure.
/// 3. Validate every index-carrying directive against the result.
///
/// A validation failure means the classifier and the tree primitive
/// disagree; it is a bug, not a data condition, and is returned as an error
/// rather than tolerated.
pub fn reconcile(
    tree: &mut LayerTree,
    changes: &ClassifiedChanges,
    directives: &[LayerChange],
) -> Result<LayerDelta, DocumentError> {
    detach_changed(tree, changes)?;
    tracing::debug!("detached {} changed layers", changes.len());

    tree.apply_changes(changes, directives)?;
    validate(tree, directives)?;

    partition(tree, changes)
}

/// Detaches each non-added entry in ascending declared-index order, so an
/// earlier detach cannot invalidate an index a later one declared. Entries
/// without an index detach last; they have no position to preserve.
fn detach_changed(
    tree: &mut LayerTree,
    changes: &ClassifiedChanges,
) -> Result<(), DocumentError> {
    let mut entries: Vec<(LayerId, &ClassifiedChange)> = changes
        .iter()
        .filter(|(_, change)| change.kind != ChangeKind::Added)
        .collect();
    entries.sort_by_key(|(_, change)| change.index.unwrap_or(usize::MAX));

    for (id, _) in entries {
        tree.detach(id)?;
    }
    Ok(())
}

/// Walks the original nested directives and checks each declared index
/// against the tree: removed ids must be absent, everything else must sit at
/// exactly the declared position within its parent.
fn validate(tree: &LayerTree, directives: &[LayerChange]) -> Result<(), DocumentError> {
    for directive in directives {
        let expected = match directive.index {
            Some(index) => index,
            None => continue,
        };

        match (tree.position(directive.id), directive.removed) {
            (Some(actual), true) => {
                return Err(DocumentError::RemovedLayerStillPresent {
                    id: directive.id,
                    index: actual,
                });
            }
            (None, true) => {}
            (Some(actual), false) if actual != expected => {
                return Err(DocumentError::LayerIndexMismatch {
                    id: directive.id,
                    expected,
                    actual,
                });
            }
            (Some(_), false) => {}
            (None, false) => {
                return Err(DocumentError::ChangedLayerMissing {
                    id: directive.id,
                    expected,
                });
            }
        }

        if !directive.layers.is_empty() {
            validate(tree, &directive.layers)?;
        }
    }
    Ok(())
}

/// Sorts the classified entries into added/removed/moved maps. Removed
/// subtrees are pruned from the arena here, after validation confirmed they
/// are unreachable.
fn partition(
    tree: &mut LayerTree,
    changes: &ClassifiedChanges,
) -> Result<LayerDelta, DocumentError> {
    let mut delta = LayerDelta::default();

    for (id, change) in changes.iter() {
        match change.kind {
            ChangeKind::Added => {
                let node = tree
                    .find(id)
                    .ok_or(SceneError::UnknownLayer(id))?
                    .clone();
                delta.added.insert(id, node);
            }
            ChangeKind::Moved => {
                let node = tree
                    .find(id)
                    .ok_or(SceneError::UnknownLayer(id))?
                    .clone();
                delta.moved.insert(id, node);
            }
            ChangeKind::Removed => {
                let node = tree.remove(id)?;
                delta.removed.insert(id, node);
            }
        }
    }

    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use darkroom_scene::{LayerDescription, LayerKind};

    fn named(id: u64, name: &str) -> LayerDescription {
        LayerDescription {
            id,
            index: None,
            name: Some(name.to_string()),
            kind: LayerKind::Layer,
            bounds: None,
            layers: Vec::new(),
        }
    }

    fn moved(id: u64, index: usize) -> LayerChange {
        LayerChange {
            id,
            index: Some(index),
            ..Default::default()
        }
    }

    #[test]
    fn test_reorder_three_layers() {
        // [A@0, B@1, C@2] -> [C, A, B]
        let mut tree = LayerTree::from_descriptions(&[
            named(1, "A"),
            named(2, "B"),
            named(3, "C"),
        ])
        .unwrap();

        let directives = vec![moved(3, 0), moved(1, 1), moved(2, 2)];
        let changed = classify(&tree, &directives).unwrap();
        let delta = reconcile(&mut tree, &changed, &directives).unwrap();

        assert_eq!(tree.top_level(), &[3, 1, 2]);
        assert_eq!(delta.moved.len(), 3);
        assert!(delta.added.is_empty());
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn test_add_and_remove_in_one_change() {
        let mut tree = LayerTree::from_descriptions(&[named(7, "Y")]).unwrap();

        let directives = vec![
            LayerChange {
                id: 8,
                index: Some(0),
                added: true,
                name: Some("X".to_string()),
                ..Default::default()
            },
            LayerChange {
                id: 7,
                removed: true,
                ..Default::default()
            },
        ];

        let changed = classify(&tree, &directives).unwrap();
        let delta = reconcile(&mut tree, &changed, &directives).unwrap();

        assert_eq!(tree.top_level(), &[8]);
        assert!(!tree.contains(7));
        assert!(delta.added.contains_key(&8));
        assert!(delta.removed.contains_key(&7));
        assert!(delta.moved.is_empty());
    }

    #[test]
    fn test_removed_group_subtree_is_pruned() {
        let group = LayerDescription {
            id: 1,
            index: None,
            name: Some("g".to_string()),
            kind: LayerKind::LayerSection,
            bounds: None,
            layers: vec![named(2, "inner")],
        };
        let mut tree = LayerTree::from_descriptions(&[group, named(3, "keep")]).unwrap();

        let directives = vec![LayerChange {
            id: 1,
            removed: true,
            ..Default::default()
        }];
        let changed = classify(&tree, &directives).unwrap();
        let delta = reconcile(&mut tree, &changed, &directives).unwrap();

        assert_eq!(tree.top_level(), &[3]);
        assert!(!tree.contains(2));
        assert_eq!(delta.removed[&1].children(), &[2]);
    }

    #[test]
    fn test_validation_catches_index_disagreement() {
        let mut tree = LayerTree::from_descriptions(&[named(1, "A"), named(2, "B")]).unwrap();

        // Declared index 5 cannot be honored in a two-layer list; the tree
        // clamps the insert, validation must reject the result.
        let directives = vec![moved(1, 5)];
        let changed = classify(&tree, &directives).unwrap();
        let err = reconcile(&mut tree, &changed, &directives).unwrap_err();

        assert!(matches!(err, DocumentError::LayerIndexMismatch { id: 1, .. }));
    }
}
