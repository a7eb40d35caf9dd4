use crate::raw::LayerId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown layer: {0}")]
    UnknownLayer(LayerId),

    #[error("unknown parent layer: {0}")]
    UnknownParent(LayerId),

    #[error("duplicate layer id: {0}")]
    DuplicateLayer(LayerId),

    #[error("layer {0} is still attached")]
    NotDetached(LayerId),
}
