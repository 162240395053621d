//! Turns a drag position and a dimension snapshot into a [`DragImpact`].
//!
//! The computation is pure and idempotent: identical inputs always produce
//! an identical impact, which keeps repeated scheduling from causing
//! animation jitter.

use crate::axis::Axis;
use crate::box_model::rect_contains;
use crate::dimension::{DraggableDimension, DraggableLocation, DroppableDimension};
use crate::dimension_map::DimensionMap;
use crate::impact::{
    DisplacedBy, Displacement, DragImpact, DragMovement, GroupingImpact, GroupingLocation,
    UserDirection,
};
use crate::position::distance;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Inputs to one impact computation.
#[derive(Clone, Copy)]
pub struct ImpactArgs<'a> {
    /// Current page center of the dragging item.
    pub page_center: Point,
    /// The dragging item's dimension as captured at lift.
    pub draggable: &'a DraggableDimension,
    pub dimensions: &'a DimensionMap,
    /// The previous impact, carried for animation continuity.
    pub previous: &'a DragImpact,
    pub user_direction: UserDirection,
    /// Overrides `should_animate` on every displacement. Set to `false`
    /// right after a mid-drag publish so freshly collected items snap into
    /// their displaced position instead of animating.
    pub force_should_animate: Option<bool>,
}

/// Compute the impact of the dragging item at its current position.
pub fn get_impact(args: &ImpactArgs<'_>) -> DragImpact {
    let type_id = &args.draggable.descriptor.type_id;
    let Some(over) = droppable_over(args.page_center, type_id, args.dimensions) else {
        return DragImpact::none();
    };

    if over.descriptor.id == args.draggable.descriptor.droppable_id {
        in_home_list(args, over)
    } else {
        in_foreign_list(args, over)
    }
}

/// The enabled, same-type droppable whose active subject contains the
/// center. Overlapping candidates resolve to the nearest center, then by id
/// so the choice is deterministic.
fn droppable_over<'a>(
    center: Point,
    type_id: &str,
    dimensions: &'a DimensionMap,
) -> Option<&'a DroppableDimension> {
    let mut candidates: Vec<&DroppableDimension> = dimensions
        .droppables
        .values()
        .filter(|droppable| droppable.is_enabled && droppable.descriptor.type_id == type_id)
        .filter(|droppable| {
            droppable
                .subject
                .active
                .is_some_and(|active| rect_contains(active, center))
        })
        .collect();
    candidates.sort_by(|a, b| {
        distance(a.page.border_box.center(), center)
            .total_cmp(&distance(b.page.border_box.center(), center))
            .then_with(|| a.descriptor.id.cmp(&b.descriptor.id))
    });
    candidates.into_iter().next()
}

fn in_home_list(args: &ImpactArgs<'_>, home: &DroppableDimension) -> DragImpact {
    let axis = home.axis;
    let center_line = axis.line(args.page_center);
    let start_line = axis.line(args.draggable.page.border_box.center());
    let is_in_front_of_start = center_line > start_line;
    let home_index = args.draggable.descriptor.index;
    let amount = axis.line(args.draggable.displace_by);
    // items in front of the start are shoved backward to fill the hole;
    // items behind it are shoved forward
    let displaced_by = DisplacedBy::new(axis, if is_in_front_of_start { -amount } else { amount });

    let mut displaced_dimensions: Vec<&DraggableDimension> = args
        .dimensions
        .in_droppable(&home.descriptor.id)
        .into_iter()
        .filter(|sibling| sibling.descriptor.id != args.draggable.descriptor.id)
        .filter(|sibling| {
            let sibling_center = axis.center(sibling.page.border_box);
            if is_in_front_of_start {
                // strict: a center exactly on a midpoint resolves to the
                // lower destination index
                sibling.descriptor.index > home_index && sibling_center < center_line
            } else {
                sibling.descriptor.index < home_index && sibling_center >= center_line
            }
        })
        .collect();

    // order closest to the current location first
    if is_in_front_of_start {
        displaced_dimensions.reverse();
    }

    let count = displaced_dimensions.len();
    let index = if is_in_front_of_start {
        home_index + count
    } else {
        home_index - count
    };

    let movement = build_movement(args, home, &displaced_dimensions, displaced_by, is_in_front_of_start);
    let group = get_grouping(args, home, &movement);

    DragImpact {
        movement,
        direction: Some(axis),
        destination: Some(DraggableLocation {
            droppable_id: home.descriptor.id.clone(),
            index,
        }),
        group,
    }
}

fn in_foreign_list(args: &ImpactArgs<'_>, foreign: &DroppableDimension) -> DragImpact {
    let axis = foreign.axis;
    let center_line = axis.line(args.page_center);
    let amount = axis.line(args.draggable.displace_by);
    // a foreign list has no hole to fill: everything at or past the center
    // is shoved forward
    let displaced_by = DisplacedBy::new(axis, amount);

    let siblings = args.dimensions.in_droppable(&foreign.descriptor.id);
    let displaced_dimensions: Vec<&DraggableDimension> = siblings
        .iter()
        .copied()
        .filter(|sibling| axis.center(sibling.page.border_box) >= center_line)
        .collect();

    let index = displaced_dimensions
        .first()
        .map(|sibling| sibling.descriptor.index)
        .unwrap_or_else(|| {
            siblings
                .last()
                .map(|sibling| sibling.descriptor.index + 1)
                .unwrap_or(0)
        });

    let movement = build_movement(args, foreign, &displaced_dimensions, displaced_by, false);
    let group = get_grouping(args, foreign, &movement);

    DragImpact {
        movement,
        direction: Some(axis),
        destination: Some(DraggableLocation {
            droppable_id: foreign.descriptor.id.clone(),
            index,
        }),
        group,
    }
}

fn build_movement(
    args: &ImpactArgs<'_>,
    over: &DroppableDimension,
    displaced_dimensions: &[&DraggableDimension],
    displaced_by: DisplacedBy,
    is_in_front_of_start: bool,
) -> DragMovement {
    let shift = Vec2::new(displaced_by.point.x, displaced_by.point.y);
    let mut displaced = Vec::with_capacity(displaced_dimensions.len());
    let mut map = HashMap::with_capacity(displaced_dimensions.len());

    for dimension in displaced_dimensions {
        let id = &dimension.descriptor.id;
        let displaced_box = dimension.page.margin_box + shift;
        let is_visible = over
            .subject
            .active
            .is_some_and(|active| active.intersect(displaced_box).area() > 0.0);
        let should_animate = match args.force_should_animate {
            Some(forced) => forced && is_visible,
            None if !is_visible => false,
            None => args
                .previous
                .movement
                .map
                .get(id)
                .map(|previous| previous.should_animate)
                .unwrap_or(true),
        };
        let displacement = Displacement {
            draggable_id: id.clone(),
            is_visible,
            should_animate,
        };
        map.insert(id.clone(), displacement.clone());
        displaced.push(displacement);
    }

    DragMovement {
        displaced,
        map,
        is_in_front_of_start,
        displaced_by,
    }
}

/// A grouping target exists when grouping is enabled on the droppable and
/// the center rests strictly inside a sibling's (displaced) margin box, not
/// merely past its midpoint.
fn get_grouping(
    args: &ImpactArgs<'_>,
    over: &DroppableDimension,
    movement: &DragMovement,
) -> Option<GroupingImpact> {
    if !over.is_grouping_enabled {
        return None;
    }
    let axis = over.axis;
    let shift = Vec2::new(movement.displaced_by.point.x, movement.displaced_by.point.y);
    let line = axis.line(args.page_center);
    let cross = axis.cross_line(args.page_center);

    for sibling in args.dimensions.in_droppable(&over.descriptor.id) {
        if sibling.descriptor.id == args.draggable.descriptor.id {
            continue;
        }
        let target_box = if movement.map.contains_key(&sibling.descriptor.id) {
            sibling.page.margin_box + shift
        } else {
            sibling.page.margin_box
        };
        let inside_main = line > axis.start(target_box) && line < axis.end(target_box);
        let inside_cross =
            cross >= axis.cross_axis_start(target_box) && cross <= axis.cross_axis_end(target_box);
        if !(inside_main && inside_cross) {
            continue;
        }

        let grouping_with = GroupingLocation {
            droppable_id: over.descriptor.id.clone(),
            draggable_id: sibling.descriptor.id.clone(),
        };
        // keep the entry direction stable while hovering the same target
        let when_entered = match &args.previous.group {
            Some(previous) if previous.grouping_with == grouping_with => previous.when_entered,
            _ => args.user_direction,
        };
        return Some(GroupingImpact {
            when_entered,
            grouping_with,
        });
    }
    None
}
