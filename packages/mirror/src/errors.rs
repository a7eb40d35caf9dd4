//! Error types for the mirror engine.
//!
//! Everything here is fatal in the sense of the protocol contract: a
//! returned error means the change could not be applied and the upstream
//! source or the tree primitive violated an invariant. The two expected
//! non-error conditions (a stale change count and a phantom removal) never
//! surface as errors.

use darkroom_scene::{LayerId, SceneError};
use thiserror::Error;

use crate::protocol::DocumentId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("document id mismatch: change targets {change}, document is {document}")]
    IdMismatch {
        document: DocumentId,
        change: DocumentId,
    },

    #[error("document version mismatch: change carries {change:?}, document is {document:?}")]
    VersionMismatch { document: String, change: String },

    #[error("out of order timestamp: {change} is earlier than {document}")]
    TimestampRegression { document: f64, change: f64 },

    #[error("can't find changed layer: {0}")]
    ChangedLayerNotFound(LayerId),

    #[error("removed layer {id} still exists at index {index}")]
    RemovedLayerStillPresent { id: LayerId, index: usize },

    #[error("layer {id} has index {actual} instead of {expected}")]
    LayerIndexMismatch {
        id: LayerId,
        expected: usize,
        actual: usize,
    },

    #[error("changed layer {id} missing after apply, expected index {expected}")]
    ChangedLayerMissing { id: LayerId, expected: usize },

    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}
