//! Engine error types.
//!
//! Registration conflicts and orphans are reportable, not errors: they are
//! logged and the operation proceeds. These types cover the conditions that
//! actually reject an operation or abort a drag.

use dragline_core::{DraggableId, DroppableId};
use thiserror::Error;

/// A measurement callback could not produce geometry. Fatal for the current
/// drag: the engine cannot safely proceed without it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("measurement failed: {message}")]
pub struct MeasureError {
    pub message: String,
}

impl MeasureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("draggable '{0}' is not registered")]
    UnknownDraggable(DraggableId),
    #[error("droppable '{0}' is not registered")]
    UnknownDroppable(DroppableId),
    #[error("cannot lift '{0}': a drag is already in progress")]
    DragInProgress(DraggableId),
    #[error("no drag in progress")]
    NotDragging,
    #[error(transparent)]
    Measure(#[from] MeasureError),
}

pub type EngineResult<T> = Result<T, EngineError>;
