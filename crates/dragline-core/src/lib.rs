//! Dragline Core Library
//!
//! Pure value types and math for the dragline drag-and-drop engine:
//! positions, axes, box models, measured dimensions, the dimension snapshot,
//! and the impact calculator that turns a drag position into displacement
//! results. Everything here is compute-new-from-old; nothing is mutated
//! after capture.

pub mod axis;
pub mod box_model;
pub mod dimension;
pub mod dimension_map;
pub mod get_impact;
pub mod impact;
pub mod position;

pub use axis::Axis;
pub use box_model::{BoxModel, Spacing};
pub use dimension::{
    Critical, DraggableDescriptor, DraggableDimension, DraggableId, DraggableLocation,
    DroppableDescriptor, DroppableDimension, DroppableId, DroppableSubject, Placeholder,
    ScrollDetails, Scrollable, TypeId,
};
pub use dimension_map::DimensionMap;
pub use get_impact::{ImpactArgs, get_impact};
pub use impact::{
    DisplacedBy, Displacement, DragImpact, DragMovement, GroupingImpact, GroupingLocation,
    UserDirection,
};
