//! Drop resolution: where the dragging item travels to settle, and how long
//! the settle animation runs.

use crate::state::DropReason;
use dragline_core::position::distance;
use dragline_core::{Axis, DimensionMap, DragImpact, DraggableDimension, DroppableDimension};
use kurbo::{Point, Vec2};

const MIN_DROP_TIME: f64 = 0.33;
const MAX_DROP_TIME: f64 = 0.55;
/// Travel distance at which the drop animation reaches its maximum duration.
const MAX_DROP_TIME_AT_DISTANCE: f64 = 1500.0;
/// Cancelled drags snap home faster than completed drops settle.
const CANCEL_DURATION_FACTOR: f64 = 0.6;

/// Seconds for the settle animation, scaled with the remaining travel
/// distance and rounded to two decimal places.
pub fn drop_duration(current: Point, destination: Point, reason: DropReason) -> f64 {
    let travel = distance(current, destination);
    let duration = if travel <= 0.0 {
        MIN_DROP_TIME
    } else if travel >= MAX_DROP_TIME_AT_DISTANCE {
        MAX_DROP_TIME
    } else {
        let percentage = travel / MAX_DROP_TIME_AT_DISTANCE;
        MIN_DROP_TIME + (MAX_DROP_TIME - MIN_DROP_TIME) * percentage
    };
    let scaled = match reason {
        DropReason::Cancel => duration * CANCEL_DURATION_FACTOR,
        DropReason::Drop => duration,
    };
    (scaled * 100.0).round() / 100.0
}

/// How far the dragging item must move from its at-rest page position to
/// settle into the position the impact describes. Zero means it returns
/// home.
pub fn new_home_offset(
    impact: &DragImpact,
    draggable: &DraggableDimension,
    dimensions: &DimensionMap,
    reason: DropReason,
) -> Vec2 {
    if reason == DropReason::Cancel {
        return Vec2::ZERO;
    }
    if let Some(group) = &impact.group {
        return grouping_offset(impact, draggable, dimensions, &group.grouping_with.draggable_id);
    }
    let Some(destination) = &impact.destination else {
        return Vec2::ZERO;
    };
    let Some(droppable) = dimensions.droppable(&destination.droppable_id) else {
        return Vec2::ZERO;
    };

    if destination.droppable_id == draggable.descriptor.droppable_id {
        in_home_offset(impact, dimensions, droppable)
    } else {
        in_foreign_offset(impact, draggable, dimensions, droppable)
    }
}

/// Reordering within the home list: the item travels past every displaced
/// sibling, so the offset is the signed sum of their main-axis sizes.
fn in_home_offset(
    impact: &DragImpact,
    dimensions: &DimensionMap,
    droppable: &DroppableDimension,
) -> Vec2 {
    let axis = droppable.axis;
    let amount: f64 = impact
        .movement
        .displaced
        .iter()
        .filter_map(|displacement| dimensions.draggable(&displacement.draggable_id))
        .map(|sibling| axis.size(sibling.page.margin_box))
        .sum();
    let signed = if impact.movement.is_in_front_of_start {
        amount
    } else {
        -amount
    };
    main_axis_offset(axis, signed)
}

/// Moving into a foreign list: align with the start of the closest displaced
/// sibling, or go after the last item (or to the content start of an empty
/// list).
fn in_foreign_offset(
    impact: &DragImpact,
    draggable: &DraggableDimension,
    dimensions: &DimensionMap,
    droppable: &DroppableDimension,
) -> Vec2 {
    let axis = droppable.axis;
    let own = draggable.page.margin_box;
    let lead = axis.center(own) - axis.start(own);

    let main_center = if let Some(first) = impact.movement.displaced.first() {
        match dimensions.draggable(&first.draggable_id) {
            Some(sibling) => axis.start(sibling.page.margin_box) + lead,
            None => axis.center(own),
        }
    } else {
        let siblings = dimensions.in_droppable(&droppable.descriptor.id);
        let last = siblings
            .iter()
            .filter(|sibling| sibling.descriptor.id != draggable.descriptor.id)
            .last();
        match last {
            Some(last) => axis.end(last.page.margin_box) + lead,
            None => axis.start(droppable.page.content_box) + lead,
        }
    };

    let cross_lead = axis.cross_line(own.center()) - axis.cross_axis_start(own);
    let cross_center = axis.cross_axis_start(droppable.page.content_box) + cross_lead;

    let target = axis.patch_with(main_center, cross_center);
    target - draggable.page.border_box.center()
}

/// Grouping: land on the center of the target, accounting for any
/// displacement the target itself is under.
fn grouping_offset(
    impact: &DragImpact,
    draggable: &DraggableDimension,
    dimensions: &DimensionMap,
    group_with: &str,
) -> Vec2 {
    let Some(target) = dimensions.draggable(group_with) else {
        return Vec2::ZERO;
    };
    let mut center = target.page.border_box.center();
    if impact.movement.map.contains_key(group_with) {
        center += impact.movement.displaced_by.point.to_vec2();
    }
    center - draggable.page.border_box.center()
}

fn main_axis_offset(axis: Axis, value: f64) -> Vec2 {
    axis.patch(value).to_vec2()
}
