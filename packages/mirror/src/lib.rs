//! # Darkroom Mirror
//!
//! Change-application engine for a local mirror of a remote raster document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ transport (external): snapshot + change     │
//! │ records, already wire-decoded               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mirror: Document state machine              │
//! │  - identity/version/ordering checks         │
//! │  - per-field handlers in fixed order        │
//! │  - layers: classify → detach → apply →      │
//! │    validate against darkroom-scene          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ caller: DocumentChanges delta bundle,       │
//! │ translated into outward events              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The remote is the source of truth**: the mirror follows, it never
//!    merges or resolves conflicts.
//! 2. **Ordering is the contract**: counts strictly increase, timestamps
//!    never regress; stale records are skipped, regressions are fatal.
//! 3. **No partial tree states escape**: one change record is one
//!    synchronous classify → detach → apply → validate cycle.
//! 4. **Deltas over events**: the engine returns per-field previous values
//!    and the layer partition; notification delivery belongs to the caller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use darkroom_mirror::{ChangeRecord, Document, DocumentSnapshot};
//!
//! let mut doc = Document::from_snapshot(snapshot)?;
//!
//! // Apply a change streamed from the remote
//! if let Some(changes) = doc.apply_change(&record)? {
//!     if let Some(delta) = changes.bounds {
//!         println!("bounds changed, previously {:?}", delta.previous);
//!     }
//! }
//! ```

mod classifier;
mod deltas;
mod document;
mod errors;
mod protocol;
mod reconciler;

pub use classifier::classify;
pub use deltas::{DocumentChanges, FieldDelta, LayerDelta};
pub use document::Document;
pub use errors::DocumentError;
pub use protocol::{ChangeRecord, CompId, DocumentId, DocumentSnapshot, GlobalLight};
pub use reconciler::reconcile;

// Re-export the tree vocabulary for convenience
pub use darkroom_scene::{
    Bounds, ChangeKind, ClassifiedChange, ClassifiedChanges, LayerChange, LayerDescription,
    LayerId, LayerKind, LayerNode, LayerTree, Parent, SceneError,
};
