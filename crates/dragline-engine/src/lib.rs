//! Dragline Engine
//!
//! The stateful half of the dragline drag-and-drop engine: the registration
//! marshal with its two-frame measurement protocol, the drag phase state
//! machine, consumer hooks and screen-reader announcements. The engine is
//! host-driven; the embedder wires pointer input, the lift timeout and
//! animation frames to [`DragEngine`].

pub mod drop;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod marshal;
pub mod registry;
pub mod scheduler;
pub mod state;

pub use engine::DragEngine;
pub use error::{EngineError, EngineResult, MeasureError};
pub use hooks::{Announcer, Hooks, NoopHooks};
pub use marshal::{BatchPublish, DimensionMarshal, LiftPublish};
pub use registry::{DroppableCallbacks, GetDraggableDimension, GetDroppableDimension, ScrollWatcher};
pub use state::{
    DragPositions, DragStart, DragState, DragUpdate, DropReason, DropResult, ItemPositions,
    PendingDrop, Phase,
};
