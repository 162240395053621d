//! Drag impact results: who moves, in which direction, and the prospective
//! destination. Recomputed on every position update, never persisted across
//! drags.

use crate::axis::Axis;
use crate::dimension::{DraggableId, DraggableLocation, DroppableId};
use crate::position::origin;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The shift applied to one non-dragging item to make room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Displacement {
    pub draggable_id: DraggableId,
    /// Whether the displaced position is inside the droppable's visible
    /// subject.
    pub is_visible: bool,
    /// False when the item enters or leaves visibility abruptly and must
    /// snap rather than animate.
    pub should_animate: bool,
}

/// Magnitude and direction of the shove the dragging item applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplacedBy {
    /// Signed size along the droppable's main axis.
    pub value: f64,
    /// The same value as a point on the main axis.
    pub point: Point,
}

impl DisplacedBy {
    pub fn new(axis: Axis, value: f64) -> Self {
        Self {
            value,
            point: axis.patch(value),
        }
    }

    pub fn none() -> Self {
        Self {
            value: 0.0,
            point: origin(),
        }
    }
}

/// The set of items that must visually move in response to the drag.
///
/// `displaced` is ordered by proximity: the item visually closest to where
/// the dragging item currently sits is first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragMovement {
    pub displaced: Vec<Displacement>,
    pub map: HashMap<DraggableId, Displacement>,
    /// Whether the dragging item's current index is past its home index.
    /// Decides the displacement sign without recomputing from scratch.
    pub is_in_front_of_start: bool,
    pub displaced_by: DisplacedBy,
}

impl DragMovement {
    pub fn none() -> Self {
        Self {
            displaced: Vec::new(),
            map: HashMap::new(),
            is_in_front_of_start: false,
            displaced_by: DisplacedBy::none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalUserDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalUserDirection {
    Left,
    Right,
}

/// The direction the user is currently moving in, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDirection {
    pub vertical: VerticalUserDirection,
    pub horizontal: HorizontalUserDirection,
}

impl UserDirection {
    /// Direction of travel from `previous` to `current`, keeping the
    /// previous direction on axes that did not move.
    pub fn from_movement(previous: Point, current: Point, carried: UserDirection) -> Self {
        let vertical = if current.y > previous.y {
            VerticalUserDirection::Down
        } else if current.y < previous.y {
            VerticalUserDirection::Up
        } else {
            carried.vertical
        };
        let horizontal = if current.x > previous.x {
            HorizontalUserDirection::Right
        } else if current.x < previous.x {
            HorizontalUserDirection::Left
        } else {
            carried.horizontal
        };
        Self { vertical, horizontal }
    }
}

impl Default for UserDirection {
    fn default() -> Self {
        Self {
            vertical: VerticalUserDirection::Down,
            horizontal: HorizontalUserDirection::Right,
        }
    }
}

/// The item another item is being grouped with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingLocation {
    pub droppable_id: DroppableId,
    pub draggable_id: DraggableId,
}

/// A combine/nest target: the pointer has settled inside another draggable
/// rather than between two items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingImpact {
    /// The directional edge the pointer entered from.
    pub when_entered: UserDirection,
    pub grouping_with: GroupingLocation,
}

/// The full computed effect of the current drag position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragImpact {
    pub movement: DragMovement,
    /// Main axis of the droppable currently dragged over.
    pub direction: Option<Axis>,
    pub destination: Option<DraggableLocation>,
    pub group: Option<GroupingImpact>,
}

impl DragImpact {
    /// The impact of dragging over nothing.
    pub fn none() -> Self {
        Self {
            movement: DragMovement::none(),
            direction: None,
            destination: None,
            group: None,
        }
    }
}
