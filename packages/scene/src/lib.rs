//! Layer-tree primitives for the darkroom document mirror.
//!
//! This crate owns the wire-adjacent layer types (snapshot descriptions and
//! change directives) and the [`LayerTree`] arena the mirror engine patches.
//! It knows nothing about document-level versioning; ordering and
//! classification live in `darkroom-mirror`.

pub mod error;
pub mod node;
pub mod patch;
pub mod raw;
pub mod tree;

pub use error::SceneError;
pub use node::{LayerNode, Parent};
pub use patch::{ChangeKind, ClassifiedChange, ClassifiedChanges};
pub use raw::{Bounds, LayerChange, LayerDescription, LayerId, LayerKind};
pub use tree::LayerTree;
