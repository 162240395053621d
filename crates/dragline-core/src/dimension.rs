//! Measured dimensions of draggables and droppables.

use crate::axis::Axis;
use crate::box_model::{BoxModel, clip};
use crate::position::{negate, origin, subtract};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

pub type Id = String;
pub type DraggableId = Id;
pub type DroppableId = Id;
pub type TypeId = Id;

/// Stable identity of a droppable list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DroppableDescriptor {
    pub id: DroppableId,
    pub type_id: TypeId,
}

/// Stable identity of a draggable item.
///
/// The `index` may be superseded by a later registration of the same id;
/// the rest of the descriptor is fixed while registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraggableDescriptor {
    pub id: DraggableId,
    pub index: usize,
    pub droppable_id: DroppableId,
    pub type_id: TypeId,
}

/// The (draggable, droppable) pair identifying the item being dragged and
/// its origin list. Fixed for the duration of one drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critical {
    pub draggable: DraggableDescriptor,
    pub droppable: DroppableDescriptor,
}

/// A location inside a droppable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraggableLocation {
    pub droppable_id: DroppableId,
    pub index: usize,
}

/// Geometry reserved in place of the dragging item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub client: BoxModel,
}

/// Scroll position difference since the start of a drag.
///
/// `displacement` is the negated `value`: scrolling down displaces items
/// upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollDiff {
    pub value: Point,
    pub displacement: Point,
}

/// Scroll state of a scroll container, captured at collection time and
/// superseded by scroll updates during the drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollDetails {
    pub initial: Point,
    pub current: Point,
    pub max: Point,
    pub diff: ScrollDiff,
}

impl ScrollDetails {
    /// Scroll details for a container that has not moved since capture.
    pub fn at_rest(initial: Point, max: Point) -> Self {
        Self {
            initial,
            current: initial,
            max,
            diff: ScrollDiff {
                value: origin(),
                displacement: origin(),
            },
        }
    }

    /// Derive details for a new scroll position.
    pub fn scrolled_to(&self, current: Point) -> Self {
        let value = subtract(current, self.initial);
        Self {
            initial: self.initial,
            current,
            max: self.max,
            diff: ScrollDiff {
                value,
                displacement: negate(value),
            },
        }
    }
}

/// Measured geometry of one draggable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraggableDimension {
    pub descriptor: DraggableDescriptor,
    pub placeholder: Placeholder,
    /// Relative to the viewport when measured.
    pub client: BoxModel,
    /// Relative to the whole page.
    pub page: BoxModel,
    /// How much this item shoves others by: its margin box size on each axis.
    pub displace_by: Point,
}

impl DraggableDimension {
    pub fn new(descriptor: DraggableDescriptor, client: BoxModel, page: BoxModel) -> Self {
        let displace_by = Point::new(page.margin_box.width(), page.margin_box.height());
        Self {
            descriptor,
            placeholder: Placeholder { client },
            client,
            page,
            displace_by,
        }
    }
}

/// The scroll container of a droppable, present only when the droppable
/// scrolls internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scrollable {
    /// The window through which the droppable is observed. Does not change
    /// during a drag.
    pub page_margin_box: Rect,
    pub frame_client: BoxModel,
    /// Whether the subject is clipped by the frame.
    pub should_clip_subject: bool,
    pub scroll: ScrollDetails,
}

/// The currently visible, hit-testable area of a droppable.
///
/// `active` is the raw page margin box shifted by scroll displacement, grown
/// by any placeholder reservation, and clipped by the frame. It is `None`
/// when clipping leaves nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroppableSubject {
    pub page_margin_box: Rect,
    pub with_placeholder: Option<Point>,
    pub active: Option<Rect>,
}

impl DroppableSubject {
    fn compute(
        page_margin_box: Rect,
        axis: Axis,
        with_placeholder: Option<Point>,
        frame: Option<&Scrollable>,
    ) -> Self {
        let mut shifted = page_margin_box;
        if let Some(scrollable) = frame {
            let displacement = scrollable.scroll.diff.displacement;
            shifted = shifted + Vec2::new(displacement.x, displacement.y);
        }
        if let Some(size) = with_placeholder {
            shifted = axis.grow_end(shifted, axis.line(size));
        }
        let active = match frame {
            Some(scrollable) if scrollable.should_clip_subject => {
                clip(scrollable.page_margin_box, shifted)
            }
            _ => Some(shifted),
        };
        Self {
            page_margin_box,
            with_placeholder,
            active,
        }
    }
}

/// Measured geometry of one droppable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppableDimension {
    pub descriptor: DroppableDescriptor,
    pub axis: Axis,
    pub is_enabled: bool,
    pub is_grouping_enabled: bool,
    /// Relative to the viewport when measured.
    pub client: BoxModel,
    /// Relative to the whole page.
    pub page: BoxModel,
    /// Present only when the droppable scrolls internally.
    pub frame: Option<Scrollable>,
    pub subject: DroppableSubject,
}

impl DroppableDimension {
    pub fn new(
        descriptor: DroppableDescriptor,
        axis: Axis,
        is_enabled: bool,
        is_grouping_enabled: bool,
        client: BoxModel,
        page: BoxModel,
        frame: Option<Scrollable>,
    ) -> Self {
        let subject = DroppableSubject::compute(page.margin_box, axis, None, frame.as_ref());
        Self {
            descriptor,
            axis,
            is_enabled,
            is_grouping_enabled,
            client,
            page,
            frame,
            subject,
        }
    }

    /// Derived copy with the frame scrolled to `current`. Returns an
    /// unchanged copy when the droppable has no frame.
    pub fn with_scroll(&self, current: Point) -> Self {
        let Some(frame) = &self.frame else {
            return self.clone();
        };
        let scrolled = Scrollable {
            scroll: frame.scroll.scrolled_to(current),
            ..frame.clone()
        };
        let subject = DroppableSubject::compute(
            self.subject.page_margin_box,
            self.axis,
            self.subject.with_placeholder,
            Some(&scrolled),
        );
        Self {
            frame: Some(scrolled),
            subject,
            ..self.clone()
        }
    }

    /// Derived copy whose subject reserves placeholder space at the end of
    /// the list. The original is untouched.
    pub fn with_placeholder(&self, size: Point) -> Self {
        let subject = DroppableSubject::compute(
            self.subject.page_margin_box,
            self.axis,
            Some(size),
            self.frame.as_ref(),
        );
        Self {
            subject,
            ..self.clone()
        }
    }

    /// Derived copy with any placeholder reservation released.
    pub fn without_placeholder(&self) -> Self {
        let subject = DroppableSubject::compute(
            self.subject.page_margin_box,
            self.axis,
            None,
            self.frame.as_ref(),
        );
        Self {
            subject,
            ..self.clone()
        }
    }
}
