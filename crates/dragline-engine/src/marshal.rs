//! The dimension marshal: owns the registration lifecycle and drives the
//! two-frame measurement protocol for each drag.
//!
//! Protocol per lift:
//! 1. Immediate step (same tick): measure the dragging item and its home
//!    droppable, publish both, watch the home droppable's scroll.
//! 2. After the lift timeout and one frame tick: measure every other
//!    registered entry of the dragging item's type.
//! 3. One frame later: publish the whole batch at once and start scroll
//!    watches on the newly published droppables.
//!
//! A phase transition away from the drag bumps the scheduler ticket, which
//! suppresses any step that has not run yet.

use crate::error::{EngineError, EngineResult};
use crate::registry::{DroppableCallbacks, GetDraggableDimension, Registry};
use crate::scheduler::{Scheduler, TaskKind};
use dragline_core::{
    Critical, DraggableDescriptor, DraggableDimension, DroppableDescriptor, DroppableDimension,
    DroppableId,
};

/// A batched publish: downstream consumers see one atomic update, never one
/// call per item.
#[derive(Debug, Default)]
pub struct BatchPublish {
    pub draggables: Vec<DraggableDimension>,
    pub droppables: Vec<DroppableDimension>,
}

impl BatchPublish {
    pub fn is_empty(&self) -> bool {
        self.draggables.is_empty() && self.droppables.is_empty()
    }
}

/// The immediate-step result of a lift: the critical pair, published
/// synchronously so the drag can render instantly.
#[derive(Debug)]
pub struct LiftPublish {
    pub critical: Critical,
    pub draggable: DraggableDimension,
    pub droppable: DroppableDimension,
}

struct ActiveCollection {
    critical: Critical,
    /// Droppables whose scroll is being watched for this drag.
    watched: Vec<DroppableId>,
    /// Entries published immediately because they registered mid-collection.
    /// The collection frame skips them so nothing is measured twice.
    published_midway: Vec<String>,
    /// Filled by the collection frame, drained by the publish frame.
    collected: Option<BatchPublish>,
}

pub struct DimensionMarshal {
    registry: Registry,
    scheduler: Scheduler,
    active: Option<ActiveCollection>,
}

impl Default for DimensionMarshal {
    fn default() -> Self {
        Self::new()
    }
}

impl DimensionMarshal {
    pub fn new() -> Self {
        Self {
            registry: Registry::default(),
            scheduler: Scheduler::new(),
            active: None,
        }
    }

    /// Register a draggable. While a collection is in flight a matching-type
    /// addition is measured and published immediately and individually so it
    /// is visible to impact calculation without waiting for the next cycle.
    pub fn register_draggable(
        &mut self,
        descriptor: DraggableDescriptor,
        get_dimension: GetDraggableDimension,
        while_collecting: bool,
    ) -> EngineResult<Option<BatchPublish>> {
        self.registry
            .register_draggable(descriptor.clone(), get_dimension);

        if !while_collecting {
            return Ok(None);
        }
        let Some(active) = &self.active else {
            return Ok(None);
        };
        if descriptor.type_id != active.critical.draggable.type_id {
            return Ok(None);
        }
        if !self.registry.has_droppable(&descriptor.droppable_id) {
            // orphan; reported at the next collection
            return Ok(None);
        }
        let Some(entry) = self.registry.draggable(&descriptor.id) else {
            return Ok(None);
        };
        let dimension = (entry.get_dimension)()?;
        if let Some(active) = self.active.as_mut() {
            active.published_midway.push(descriptor.id.clone());
        }
        Ok(Some(BatchPublish {
            draggables: vec![dimension],
            droppables: Vec::new(),
        }))
    }

    /// Register a droppable. A matching-type addition mid-collection is
    /// measured and published immediately, and its scroll watch starts at
    /// once.
    pub fn register_droppable(
        &mut self,
        descriptor: DroppableDescriptor,
        callbacks: DroppableCallbacks,
        while_collecting: bool,
    ) -> EngineResult<Option<BatchPublish>> {
        self.registry
            .register_droppable(descriptor.clone(), callbacks);

        if !while_collecting {
            return Ok(None);
        }
        let matches_type = self
            .active
            .as_ref()
            .is_some_and(|active| descriptor.type_id == active.critical.droppable.type_id);
        if !matches_type {
            return Ok(None);
        }
        let Some(entry) = self.registry.droppable_mut(&descriptor.id) else {
            return Ok(None);
        };
        let dimension = (entry.callbacks.get_dimension)()?;
        (entry.callbacks.watch_scroll)();
        if let Some(active) = self.active.as_mut() {
            active.watched.push(descriptor.id.clone());
            active.published_midway.push(descriptor.id.clone());
        }
        Ok(Some(BatchPublish {
            draggables: Vec::new(),
            droppables: vec![dimension],
        }))
    }

    pub fn unregister_draggable(&mut self, id: &str) {
        self.registry.unregister_draggable(id);
    }

    pub fn unregister_droppable(&mut self, id: &str) {
        // stop a live watch before the entry disappears
        if let Some(active) = self.active.as_mut() {
            if let Some(position) = active.watched.iter().position(|watched| watched == id) {
                active.watched.remove(position);
                if let Some(entry) = self.registry.droppable_mut(id) {
                    (entry.callbacks.unwatch_scroll)();
                }
            }
        }
        self.registry.unregister_droppable(id);
    }

    /// The immediate step of the lift protocol. Collection of everything
    /// else is deferred behind the lift timeout and two frame ticks.
    pub fn start_collection(&mut self, draggable_id: &str) -> EngineResult<LiftPublish> {
        if self.active.is_some() {
            return Err(EngineError::DragInProgress(draggable_id.to_string()));
        }
        let draggable_descriptor = self
            .registry
            .draggable(draggable_id)
            .ok_or_else(|| EngineError::UnknownDraggable(draggable_id.to_string()))?
            .descriptor
            .clone();
        let droppable_descriptor = self
            .registry
            .droppable(&draggable_descriptor.droppable_id)
            .ok_or_else(|| {
                EngineError::UnknownDroppable(draggable_descriptor.droppable_id.clone())
            })?
            .descriptor
            .clone();

        let draggable = self
            .registry
            .draggable(draggable_id)
            .map(|entry| (entry.get_dimension)())
            .transpose()?
            .ok_or_else(|| EngineError::UnknownDraggable(draggable_id.to_string()))?;
        let droppable = {
            let entry = self
                .registry
                .droppable_mut(&droppable_descriptor.id)
                .ok_or_else(|| EngineError::UnknownDroppable(droppable_descriptor.id.clone()))?;
            let dimension = (entry.callbacks.get_dimension)()?;
            // watch the home droppable now; everything else waits for publish
            (entry.callbacks.watch_scroll)();
            dimension
        };

        let critical = Critical {
            draggable: draggable_descriptor,
            droppable: droppable_descriptor.clone(),
        };
        self.active = Some(ActiveCollection {
            critical: critical.clone(),
            watched: vec![droppable_descriptor.id],
            published_midway: Vec::new(),
            collected: None,
        });
        self.scheduler.schedule_timer(TaskKind::Collect);

        Ok(LiftPublish {
            critical,
            draggable,
            droppable,
        })
    }

    /// Begin a bulk re-collection mid-drag. Runs the collect and publish
    /// frames without the lift timeout.
    pub fn start_recollection(&mut self) -> EngineResult<()> {
        if self.active.is_none() {
            return Err(EngineError::NotDragging);
        }
        self.scheduler.schedule_frame(TaskKind::Collect);
        Ok(())
    }

    /// Fire the lift-confirmation timeout: elapsing with no cancellation
    /// moves collection onto the frame queue.
    pub fn run_timers(&mut self) {
        for kind in self.scheduler.take_timers() {
            self.scheduler.schedule_frame(kind);
        }
    }

    /// Execute one animation-frame tick. Returns a batch only on a publish
    /// frame.
    pub fn step_frame(&mut self) -> EngineResult<Option<BatchPublish>> {
        match self.scheduler.pop_frame() {
            Some(TaskKind::Collect) => {
                self.collect()?;
                Ok(None)
            }
            Some(TaskKind::Publish) => Ok(self.publish()),
            None => Ok(None),
        }
    }

    fn collect(&mut self) -> EngineResult<()> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        let critical = active.critical.clone();
        let published_midway = active.published_midway.clone();
        let mut batch = BatchPublish::default();

        for entry in self.registry.droppables() {
            if entry.descriptor.id == critical.droppable.id {
                continue;
            }
            if entry.descriptor.type_id != critical.droppable.type_id {
                continue;
            }
            if published_midway.contains(&entry.descriptor.id) {
                continue;
            }
            batch.droppables.push((entry.callbacks.get_dimension)()?);
        }

        for entry in self.registry.draggables() {
            let descriptor = &entry.descriptor;
            if descriptor.id == critical.draggable.id {
                continue;
            }
            if descriptor.type_id != critical.draggable.type_id {
                continue;
            }
            if published_midway.contains(&descriptor.id) {
                continue;
            }
            if !self.registry.has_droppable(&descriptor.droppable_id) {
                log::error!(
                    "draggable '{}' is orphaned: droppable '{}' is not registered; \
                     excluding it from this collection",
                    descriptor.id,
                    descriptor.droppable_id
                );
                continue;
            }
            batch.draggables.push((entry.get_dimension)()?);
        }

        if let Some(active) = self.active.as_mut() {
            active.collected = Some(batch);
        }
        self.scheduler.schedule_frame(TaskKind::Publish);
        Ok(())
    }

    fn publish(&mut self) -> Option<BatchPublish> {
        let batch = self.active.as_mut().and_then(|active| active.collected.take())?;

        let mut newly_watched = Vec::new();
        for dimension in &batch.droppables {
            let id = &dimension.descriptor.id;
            let already_watched = self
                .active
                .as_ref()
                .is_some_and(|active| active.watched.contains(id));
            if already_watched {
                continue;
            }
            if let Some(entry) = self.registry.droppable_mut(id) {
                (entry.callbacks.watch_scroll)();
                newly_watched.push(id.clone());
            }
        }
        if let Some(active) = self.active.as_mut() {
            active.watched.extend(newly_watched);
        }
        Some(batch)
    }

    /// End the drag: suppress any scheduled step and unwatch every droppable
    /// watched during it.
    pub fn stop(&mut self) {
        self.scheduler.bump();
        if let Some(active) = self.active.take() {
            for id in active.watched {
                if let Some(entry) = self.registry.droppable_mut(&id) {
                    (entry.callbacks.unwatch_scroll)();
                }
            }
        }
    }

    pub fn critical(&self) -> Option<&Critical> {
        self.active.as_ref().map(|active| &active.critical)
    }
}
