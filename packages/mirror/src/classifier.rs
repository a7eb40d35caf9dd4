//! Directive classification.
//!
//! Flattens the nested layer-change directive list of one change record into
//! a typed, id-keyed change set, resolving every non-added id against the
//! current tree.

use darkroom_scene::{ChangeKind, ClassifiedChange, ClassifiedChanges, LayerChange, LayerTree};

use crate::errors::DocumentError;

/// Classifies `directives` against the current tree.
///
/// Depth-first, children before self, so when the same id appears more than
/// once the last occurrence in traversal order wins. Each recursion level
/// returns its own set and the caller merges; the walk itself never mutates
/// shared state.
///
/// Inert markers (no `index`, not `removed`) classify nothing but their
/// nested directives are still walked. A `removed` directive whose id is
/// absent from the tree is a phantom group-boundary marker and is silently
/// skipped; any other absent id is fatal.
pub fn classify(
    tree: &LayerTree,
    directives: &[LayerChange],
) -> Result<ClassifiedChanges, DocumentError> {
    let mut changed = ClassifiedChanges::new();

    for directive in directives {
        if !directive.layers.is_empty() {
            for (id, change) in classify(tree, &directive.layers)? {
                if changed.insert(id, change).is_some() {
                    tracing::debug!("duplicate directive for layer {}, keeping the later one", id);
                }
            }
        }

        if directive.is_inert() {
            continue;
        }

        let change = if directive.added {
            // The layer does not exist yet; no tree lookup.
            ClassifiedChange::new(ChangeKind::Added, directive.index)
        } else if !tree.contains(directive.id) {
            if directive.removed {
                // Phantom section-end marker, not a real layer.
                continue;
            }
            return Err(DocumentError::ChangedLayerNotFound(directive.id));
        } else if directive.removed {
            ClassifiedChange::new(ChangeKind::Removed, directive.index)
        } else {
            ClassifiedChange::new(ChangeKind::Moved, directive.index)
        };

        if changed.insert(directive.id, change).is_some() {
            tracing::debug!(
                "duplicate directive for layer {}, keeping the later one",
                directive.id
            );
        }
    }

    Ok(changed)
}
