//! The authoritative geometry snapshot consumed by impact calculation.
//!
//! A [`DimensionMap`] is replaced wholesale on every publish; readers never
//! observe a partially updated map, so no locking is needed.

use crate::dimension::{DraggableDimension, DraggableId, DroppableDimension, DroppableId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionMap {
    pub draggables: HashMap<DraggableId, DraggableDimension>,
    pub droppables: HashMap<DroppableId, DroppableDimension>,
}

impl DimensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draggable(&self, id: &str) -> Option<&DraggableDimension> {
        self.draggables.get(id)
    }

    pub fn droppable(&self, id: &str) -> Option<&DroppableDimension> {
        self.droppables.get(id)
    }

    /// Draggables inside a droppable, ordered by index.
    pub fn in_droppable(&self, droppable_id: &str) -> Vec<&DraggableDimension> {
        let mut inside: Vec<&DraggableDimension> = self
            .draggables
            .values()
            .filter(|draggable| draggable.descriptor.droppable_id == droppable_id)
            .collect();
        inside.sort_by_key(|draggable| draggable.descriptor.index);
        inside
    }

    /// A new map containing this map plus a published batch. Later entries
    /// supersede earlier ones with the same id.
    pub fn with_published(
        &self,
        draggables: Vec<DraggableDimension>,
        droppables: Vec<DroppableDimension>,
    ) -> Self {
        let mut next = self.clone();
        for draggable in draggables {
            next.draggables.insert(draggable.descriptor.id.clone(), draggable);
        }
        for droppable in droppables {
            next.droppables.insert(droppable.descriptor.id.clone(), droppable);
        }
        next
    }

    /// A new map with a single droppable replaced (scroll and placeholder
    /// derivations).
    pub fn with_droppable(&self, droppable: DroppableDimension) -> Self {
        let mut next = self.clone();
        next.droppables.insert(droppable.descriptor.id.clone(), droppable);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.draggables.is_empty() && self.droppables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::box_model::BoxModel;
    use crate::dimension::{DraggableDescriptor, DroppableDescriptor};
    use kurbo::Rect;

    fn draggable(id: &str, index: usize) -> DraggableDimension {
        let top = index as f64 * 50.0;
        let boxes = BoxModel::tight(Rect::new(0.0, top, 100.0, top + 50.0));
        DraggableDimension::new(
            DraggableDescriptor {
                id: id.to_string(),
                index,
                droppable_id: "home".to_string(),
                type_id: "item".to_string(),
            },
            boxes,
            boxes,
        )
    }

    fn droppable(id: &str) -> DroppableDimension {
        let boxes = BoxModel::tight(Rect::new(0.0, 0.0, 100.0, 400.0));
        DroppableDimension::new(
            DroppableDescriptor {
                id: id.to_string(),
                type_id: "item".to_string(),
            },
            Axis::Vertical,
            true,
            false,
            boxes,
            boxes,
            None,
        )
    }

    #[test]
    fn test_in_droppable_orders_by_index() {
        let map = DimensionMap::new().with_published(
            vec![draggable("c", 2), draggable("a", 0), draggable("b", 1)],
            vec![droppable("home")],
        );
        let ordered: Vec<&str> = map
            .in_droppable("home")
            .iter()
            .map(|d| d.descriptor.id.as_str())
            .collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_with_published_leaves_original_untouched() {
        let map = DimensionMap::new();
        let published = map.with_published(vec![draggable("a", 0)], vec![droppable("home")]);
        assert!(map.is_empty());
        assert!(published.draggable("a").is_some());
        assert!(published.droppable("home").is_some());
    }

    #[test]
    fn test_later_registration_wins() {
        let original = draggable("a", 0);
        let superseded = draggable("a", 3);
        let map = DimensionMap::new()
            .with_published(vec![original], vec![])
            .with_published(vec![superseded], vec![]);
        assert_eq!(map.draggable("a").unwrap().descriptor.index, 3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let map = DimensionMap::new().with_published(vec![draggable("a", 0)], vec![droppable("home")]);
        let json = serde_json::to_string(&map).unwrap();
        let back: DimensionMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}
