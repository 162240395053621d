//! Drag lifecycle state. The engine is a state machine over [`Phase`]; every
//! transition replaces the phase value wholesale rather than mutating in
//! place.

use dragline_core::{
    Critical, DimensionMap, DragImpact, DraggableId, DraggableLocation, TypeId, UserDirection,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Selection point, border-box center and accumulated offset of the dragging
/// item within one coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemPositions {
    pub selection: Point,
    pub border_box_center: Point,
    pub offset: Vec2,
}

/// The dragging item's positions in both the client (viewport) and page
/// coordinate frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragPositions {
    pub client: ItemPositions,
    pub page: ItemPositions,
}

/// Everything known about an in-flight drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub critical: Critical,
    pub dimensions: DimensionMap,
    pub initial: DragPositions,
    pub current: DragPositions,
    pub user_direction: UserDirection,
    pub impact: DragImpact,
    /// Whether the current movement should animate. Pointer-driven moves set
    /// this to false; programmatic moves set it to true.
    pub should_animate: bool,
    /// True once a mid-drag publish has landed, so later impact calculations
    /// snap freshly added items into place instead of animating them.
    pub has_republished: bool,
}

impl DragState {
    /// Where the drag started.
    pub fn source(&self) -> DraggableLocation {
        DraggableLocation {
            droppable_id: self.critical.droppable.id.clone(),
            index: self.critical.draggable.index,
        }
    }

    pub fn drag_start(&self) -> DragStart {
        DragStart {
            draggable_id: self.critical.draggable.id.clone(),
            type_id: self.critical.draggable.type_id.clone(),
            source: self.source(),
        }
    }

    pub fn drag_update(&self) -> DragUpdate {
        DragUpdate {
            draggable_id: self.critical.draggable.id.clone(),
            type_id: self.critical.draggable.type_id.clone(),
            source: self.source(),
            destination: self.impact.destination.clone(),
            group_with: self
                .impact
                .group
                .as_ref()
                .map(|group| group.grouping_with.draggable_id.clone()),
        }
    }
}

/// Why a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    Drop,
    Cancel,
}

/// Fired after the lift, once the drag is established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragStart {
    pub draggable_id: DraggableId,
    pub type_id: TypeId,
    pub source: DraggableLocation,
}

/// Fired when the destination or grouping target changes mid-drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragUpdate {
    pub draggable_id: DraggableId,
    pub type_id: TypeId,
    pub source: DraggableLocation,
    pub destination: Option<DraggableLocation>,
    pub group_with: Option<DraggableId>,
}

/// The final outcome handed to consumers when the drag completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropResult {
    pub draggable_id: DraggableId,
    pub type_id: TypeId,
    pub source: DraggableLocation,
    pub destination: Option<DraggableLocation>,
    pub group_with: Option<DraggableId>,
    pub reason: DropReason,
}

impl DropResult {
    pub fn from_update(update: DragUpdate, reason: DropReason) -> Self {
        Self {
            draggable_id: update.draggable_id,
            type_id: update.type_id,
            source: update.source,
            destination: update.destination,
            group_with: update.group_with,
            reason,
        }
    }
}

/// A drop whose animation is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDrop {
    /// Where the dragging item must travel to settle into its new home,
    /// relative to where it currently sits.
    pub new_home_offset: Vec2,
    /// Seconds; scaled with the remaining travel distance.
    pub drop_duration: f64,
    pub impact: DragImpact,
    pub result: DropResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    /// The critical pair is published and the bulk collection is in flight.
    Collecting(DragState),
    /// All dimensions of the drag's type are published.
    Dragging(DragState),
    /// The user dropped while collection was still in flight; the drop
    /// resolves once the publish lands (or immediately if `is_waiting` is
    /// already false).
    DropPending {
        drag: DragState,
        reason: DropReason,
        is_waiting: bool,
    },
    /// The drag is over; the item is animating into its final position.
    DropAnimating {
        pending: PendingDrop,
        dimensions: DimensionMap,
    },
}

impl Phase {
    pub fn drag_state(&self) -> Option<&DragState> {
        match self {
            Phase::Collecting(drag) | Phase::Dragging(drag) => Some(drag),
            Phase::DropPending { drag, .. } => Some(drag),
            Phase::Idle | Phase::DropAnimating { .. } => None,
        }
    }

    pub fn drag_state_mut(&mut self) -> Option<&mut DragState> {
        match self {
            Phase::Collecting(drag) | Phase::Dragging(drag) => Some(drag),
            Phase::DropPending { drag, .. } => Some(drag),
            Phase::Idle | Phase::DropAnimating { .. } => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragline_core::{DraggableDescriptor, DroppableDescriptor};
    use kurbo::Point;

    fn drag_state() -> DragState {
        let positions = DragPositions {
            client: ItemPositions {
                selection: Point::new(10.0, 10.0),
                border_box_center: Point::new(50.0, 25.0),
                offset: Vec2::ZERO,
            },
            page: ItemPositions {
                selection: Point::new(10.0, 10.0),
                border_box_center: Point::new(50.0, 25.0),
                offset: Vec2::ZERO,
            },
        };
        DragState {
            critical: Critical {
                draggable: DraggableDescriptor {
                    id: "a1".to_string(),
                    index: 1,
                    droppable_id: "home".to_string(),
                    type_id: "item".to_string(),
                },
                droppable: DroppableDescriptor {
                    id: "home".to_string(),
                    type_id: "item".to_string(),
                },
            },
            dimensions: DimensionMap::new(),
            initial: positions,
            current: positions,
            user_direction: UserDirection::default(),
            impact: DragImpact::none(),
            should_animate: false,
            has_republished: false,
        }
    }

    #[test]
    fn test_drag_start_reflects_source() {
        let start = drag_state().drag_start();
        assert_eq!(start.draggable_id, "a1");
        assert_eq!(start.source.droppable_id, "home");
        assert_eq!(start.source.index, 1);
    }

    #[test]
    fn test_drag_update_with_no_impact_has_no_destination() {
        let update = drag_state().drag_update();
        assert_eq!(update.destination, None);
        assert_eq!(update.group_with, None);
    }

    #[test]
    fn test_drag_update_reports_destination() {
        let mut state = drag_state();
        state.impact.destination = Some(DraggableLocation {
            droppable_id: "foreign".to_string(),
            index: 0,
        });
        let update = state.drag_update();
        assert_eq!(
            update.destination,
            Some(DraggableLocation {
                droppable_id: "foreign".to_string(),
                index: 0,
            })
        );
    }

    #[test]
    fn test_drop_result_carries_reason() {
        let result = DropResult::from_update(drag_state().drag_update(), DropReason::Cancel);
        assert_eq!(result.reason, DropReason::Cancel);
        assert_eq!(result.source.index, 1);
    }

    #[test]
    fn test_drop_result_serde_round_trip() {
        let result = DropResult::from_update(drag_state().drag_update(), DropReason::Drop);
        let json = serde_json::to_string(&result).unwrap();
        let back: DropResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_phase_drag_state_access() {
        assert!(Phase::Idle.drag_state().is_none());
        let phase = Phase::Collecting(drag_state());
        assert_eq!(phase.drag_state().map(|d| d.critical.draggable.id.as_str()), Some("a1"));
    }
}
