//! Registration tables mapping ids to measurement capabilities.
//!
//! One registry lives inside one marshal instance. Conflicts are reportable
//! and non-fatal: they are logged, and the operation takes effect with
//! last-write-wins or no-op semantics.

use crate::error::MeasureError;
use dragline_core::{
    DraggableDescriptor, DraggableDimension, DraggableId, DroppableDescriptor, DroppableDimension,
    DroppableId,
};
use std::collections::HashMap;

/// Measures one draggable on demand.
pub type GetDraggableDimension = Box<dyn Fn() -> Result<DraggableDimension, MeasureError>>;

/// Measures one droppable on demand.
pub type GetDroppableDimension = Box<dyn Fn() -> Result<DroppableDimension, MeasureError>>;

/// Starts or stops scroll listening on one droppable.
pub type ScrollWatcher = Box<dyn FnMut()>;

/// The capabilities a droppable supplies at registration time. The engine
/// never touches layout directly; these callbacks are its only access.
pub struct DroppableCallbacks {
    pub get_dimension: GetDroppableDimension,
    pub watch_scroll: ScrollWatcher,
    pub unwatch_scroll: ScrollWatcher,
}

pub(crate) struct DraggableEntry {
    pub descriptor: DraggableDescriptor,
    pub get_dimension: GetDraggableDimension,
}

pub(crate) struct DroppableEntry {
    pub descriptor: DroppableDescriptor,
    pub callbacks: DroppableCallbacks,
}

#[derive(Default)]
pub(crate) struct Registry {
    draggables: HashMap<DraggableId, DraggableEntry>,
    droppables: HashMap<DroppableId, DroppableEntry>,
}

impl Registry {
    pub fn register_draggable(
        &mut self,
        descriptor: DraggableDescriptor,
        get_dimension: GetDraggableDimension,
    ) {
        if self.draggables.contains_key(&descriptor.id) {
            log::error!(
                "draggable '{}' is already registered; the later registration wins",
                descriptor.id
            );
        }
        if !self.droppables.contains_key(&descriptor.droppable_id) {
            log::error!(
                "draggable '{}' references unregistered droppable '{}'; it will be \
                 excluded from collection until that droppable appears",
                descriptor.id,
                descriptor.droppable_id
            );
        }
        self.draggables.insert(
            descriptor.id.clone(),
            DraggableEntry {
                descriptor,
                get_dimension,
            },
        );
    }

    pub fn register_droppable(
        &mut self,
        descriptor: DroppableDescriptor,
        callbacks: DroppableCallbacks,
    ) {
        if self.droppables.contains_key(&descriptor.id) {
            log::error!(
                "droppable '{}' is already registered; the later registration wins",
                descriptor.id
            );
        }
        self.droppables.insert(
            descriptor.id.clone(),
            DroppableEntry {
                descriptor,
                callbacks,
            },
        );
    }

    pub fn unregister_draggable(&mut self, id: &str) {
        if self.draggables.remove(id).is_none() {
            log::error!("cannot unregister draggable '{id}': no such entry");
        }
    }

    /// Unregistering a droppable does not unregister its children: during
    /// unmount the parent legitimately goes first. Remaining children are
    /// reported as orphans at the next collection.
    pub fn unregister_droppable(&mut self, id: &str) {
        if self.droppables.remove(id).is_none() {
            log::error!("cannot unregister droppable '{id}': no such entry");
        }
    }

    pub fn draggable(&self, id: &str) -> Option<&DraggableEntry> {
        self.draggables.get(id)
    }

    pub fn droppable(&self, id: &str) -> Option<&DroppableEntry> {
        self.droppables.get(id)
    }

    pub fn droppable_mut(&mut self, id: &str) -> Option<&mut DroppableEntry> {
        self.droppables.get_mut(id)
    }

    pub fn has_droppable(&self, id: &str) -> bool {
        self.droppables.contains_key(id)
    }

    pub fn draggables(&self) -> impl Iterator<Item = &DraggableEntry> {
        self.draggables.values()
    }

    pub fn droppables(&self) -> impl Iterator<Item = &DroppableEntry> {
        self.droppables.values()
    }
}
