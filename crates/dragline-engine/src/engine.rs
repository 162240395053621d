//! The drag engine: a state machine over [`Phase`] that ties the dimension
//! marshal, impact calculation and consumer hooks together.
//!
//! Time is driven externally: the host calls [`DragEngine::run_timers`] when
//! the lift timeout elapses and [`DragEngine::step_frame`] once per animation
//! frame. Nothing here spawns threads or sleeps.

use crate::drop::{drop_duration, new_home_offset};
use crate::error::{EngineError, EngineResult};
use crate::hooks::{preset, Announcer, Hooks};
use crate::marshal::{BatchPublish, DimensionMarshal};
use crate::registry::{DroppableCallbacks, GetDraggableDimension};
use crate::state::{
    DragPositions, DragStart, DragState, DragUpdate, DropReason, DropResult, ItemPositions,
    PendingDrop, Phase,
};
use dragline_core::{
    get_impact, DimensionMap, DragImpact, DraggableDescriptor, DroppableDescriptor, ImpactArgs,
    UserDirection,
};
use kurbo::{Point, Vec2};

pub struct DragEngine<H: Hooks> {
    marshal: DimensionMarshal,
    phase: Phase,
    hooks: H,
    announcer: Announcer,
    /// Last update handed to `on_drag_update`, kept to fire the hook only on
    /// real changes.
    last_update: Option<DragUpdate>,
    /// Whether `on_drag_start` has fired for the current drag. It fires once
    /// the full dimensions publish, so a drag cancelled during collection
    /// ends without it.
    drag_started: bool,
    initial_window_scroll: Vec2,
    window_scroll: Vec2,
}

impl<H: Hooks> DragEngine<H> {
    pub fn new(hooks: H) -> Self {
        Self {
            marshal: DimensionMarshal::new(),
            phase: Phase::Idle,
            hooks,
            announcer: Announcer::new(),
            last_update: None,
            drag_started: false,
            initial_window_scroll: Vec2::ZERO,
            window_scroll: Vec2::ZERO,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Take all queued screen-reader announcements, oldest first.
    pub fn take_announcements(&mut self) -> Vec<String> {
        self.announcer.drain()
    }

    // ---- registration -----------------------------------------------------

    pub fn register_draggable(
        &mut self,
        descriptor: DraggableDescriptor,
        get_dimension: GetDraggableDimension,
    ) -> EngineResult<()> {
        let while_collecting = matches!(self.phase, Phase::Collecting(_));
        let published =
            self.marshal
                .register_draggable(descriptor, get_dimension, while_collecting)?;
        if let Some(batch) = published {
            self.absorb_individual_publish(batch);
        }
        Ok(())
    }

    pub fn register_droppable(
        &mut self,
        descriptor: DroppableDescriptor,
        callbacks: DroppableCallbacks,
    ) -> EngineResult<()> {
        let while_collecting = matches!(self.phase, Phase::Collecting(_));
        let published = self
            .marshal
            .register_droppable(descriptor, callbacks, while_collecting)?;
        if let Some(batch) = published {
            self.absorb_individual_publish(batch);
        }
        Ok(())
    }

    pub fn unregister_draggable(&mut self, id: &str) {
        self.marshal.unregister_draggable(id);
    }

    pub fn unregister_droppable(&mut self, id: &str) {
        self.marshal.unregister_droppable(id);
    }

    // ---- drag lifecycle ---------------------------------------------------

    /// Start a drag. Publishes the critical pair synchronously and schedules
    /// the bulk collection behind the lift timeout.
    pub fn lift(
        &mut self,
        draggable_id: &str,
        client_selection: Point,
        window_scroll: Vec2,
    ) -> EngineResult<()> {
        if !self.phase.is_idle() {
            return Err(EngineError::DragInProgress(draggable_id.to_string()));
        }
        let publish = self.marshal.start_collection(draggable_id)?;
        self.initial_window_scroll = window_scroll;
        self.window_scroll = window_scroll;

        let mut dimensions = DimensionMap::new();
        dimensions
            .draggables
            .insert(publish.draggable.descriptor.id.clone(), publish.draggable.clone());
        dimensions
            .droppables
            .insert(publish.droppable.descriptor.id.clone(), publish.droppable.clone());

        let client = ItemPositions {
            selection: client_selection,
            border_box_center: publish.draggable.client.border_box.center(),
            offset: Vec2::ZERO,
        };
        let page = ItemPositions {
            selection: client_selection + window_scroll,
            border_box_center: publish.draggable.page.border_box.center(),
            offset: Vec2::ZERO,
        };
        let positions = DragPositions { client, page };

        let mut state = DragState {
            critical: publish.critical,
            dimensions,
            initial: positions,
            current: positions,
            user_direction: UserDirection::default(),
            impact: DragImpact::none(),
            should_animate: false,
            has_republished: false,
        };
        Self::refresh_impact(&mut state, None);

        // `on_drag_start` waits for the full dimensions to publish
        let start = state.drag_start();
        self.hooks.on_before_drag_start(&start);
        self.drag_started = false;

        // the at-rest destination is not an update
        self.last_update = Some(state.drag_update());
        self.phase = Phase::Collecting(state);
        Ok(())
    }

    /// Move the dragging item to a new client selection point. While the
    /// bulk collection is still in flight only the positions update; the
    /// impact is recalculated once everything is published.
    pub fn move_to(&mut self, client_selection: Point, should_animate: bool) -> EngineResult<()> {
        let scroll_shift = self.window_scroll - self.initial_window_scroll;
        let is_dragging = matches!(self.phase, Phase::Dragging(_));
        let state = match &mut self.phase {
            Phase::Collecting(state) | Phase::Dragging(state) => state,
            _ => return Err(EngineError::NotDragging),
        };
        let previous_center = state.current.page.border_box_center;
        state.current = Self::positions_for(&state.initial, client_selection, scroll_shift);
        state.should_animate = should_animate;
        state.user_direction = UserDirection::from_movement(
            previous_center,
            state.current.page.border_box_center,
            state.user_direction,
        );
        if is_dragging {
            Self::refresh_impact(state, None);
            self.emit_update_if_changed();
        }
        Ok(())
    }

    /// The window scrolled mid-drag: page positions shift while client
    /// positions stay put.
    pub fn update_window_scroll(&mut self, window_scroll: Vec2) -> EngineResult<()> {
        self.window_scroll = window_scroll;
        let scroll_shift = self.window_scroll - self.initial_window_scroll;
        let is_dragging = matches!(self.phase, Phase::Dragging(_));
        let state = match &mut self.phase {
            Phase::Collecting(state) | Phase::Dragging(state) => state,
            _ => return Err(EngineError::NotDragging),
        };
        state.current =
            Self::positions_for(&state.initial, state.current.client.selection, scroll_shift);
        if is_dragging {
            Self::refresh_impact(state, None);
            self.emit_update_if_changed();
        }
        Ok(())
    }

    /// A droppable's container scrolled mid-drag.
    pub fn update_droppable_scroll(&mut self, id: &str, scroll: Point) -> EngineResult<()> {
        let is_dragging = matches!(self.phase, Phase::Dragging(_));
        let state = self
            .phase
            .drag_state_mut()
            .ok_or(EngineError::NotDragging)?;
        let scrolled = state
            .dimensions
            .droppable(id)
            .ok_or_else(|| EngineError::UnknownDroppable(id.to_string()))?
            .with_scroll(scroll);
        state.dimensions = state.dimensions.with_droppable(scrolled);
        if is_dragging {
            Self::refresh_impact(state, None);
            self.emit_update_if_changed();
        }
        Ok(())
    }

    /// Enable or disable dropping on a droppable mid-drag.
    pub fn update_droppable_is_enabled(&mut self, id: &str, is_enabled: bool) -> EngineResult<()> {
        let is_dragging = matches!(self.phase, Phase::Dragging(_));
        let state = self
            .phase
            .drag_state_mut()
            .ok_or(EngineError::NotDragging)?;
        let mut droppable = state
            .dimensions
            .droppable(id)
            .ok_or_else(|| EngineError::UnknownDroppable(id.to_string()))?
            .clone();
        droppable.is_enabled = is_enabled;
        state.dimensions = state.dimensions.with_droppable(droppable);
        if is_dragging {
            Self::refresh_impact(state, None);
            self.emit_update_if_changed();
        }
        Ok(())
    }

    /// Request a fresh bulk collection mid-drag, e.g. after a large DOM
    /// change. Runs without the lift timeout.
    pub fn recollect(&mut self) -> EngineResult<()> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging(state) => {
                self.marshal.start_recollection()?;
                self.phase = Phase::Collecting(state);
                Ok(())
            }
            other => {
                self.phase = other;
                Err(EngineError::NotDragging)
            }
        }
    }

    /// The user released. If collection is still in flight the drop waits
    /// for the publish so it resolves against complete dimensions.
    pub fn drop_drag(&mut self) -> EngineResult<()> {
        self.end_drag(DropReason::Drop)
    }

    /// Abandon the drag; the item returns to where it started.
    pub fn cancel(&mut self) -> EngineResult<()> {
        self.end_drag(DropReason::Cancel)
    }

    fn end_drag(&mut self, reason: DropReason) -> EngineResult<()> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging(state) => self.resolve_drop(state, reason),
            // only a drop blocks on the in-flight collection; a cancel
            // aborts it outright and nothing further is measured
            Phase::Collecting(state) => match reason {
                DropReason::Drop => {
                    self.phase = Phase::DropPending {
                        drag: state,
                        reason,
                        is_waiting: true,
                    };
                    Ok(())
                }
                DropReason::Cancel => {
                    self.marshal.stop();
                    let mut update = state.drag_update();
                    update.destination = None;
                    update.group_with = None;
                    self.complete_drop(DropResult::from_update(update, reason));
                    Ok(())
                }
            },
            other => {
                self.phase = other;
                Err(EngineError::NotDragging)
            }
        }
    }

    /// The drop animation completed; finish the drag and fire `on_drag_end`.
    pub fn finish_drop_animation(&mut self) -> EngineResult<DropResult> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::DropAnimating { pending, .. } => {
                let result = pending.result.clone();
                self.complete_drop(pending.result);
                Ok(result)
            }
            other => {
                self.phase = other;
                Err(EngineError::NotDragging)
            }
        }
    }

    // ---- external time ----------------------------------------------------

    /// The lift timeout elapsed.
    pub fn run_timers(&mut self) {
        self.marshal.run_timers();
    }

    /// One animation-frame tick. A fatal measurement failure aborts the drag
    /// (the item snaps home) and is returned to the caller.
    pub fn step_frame(&mut self) -> EngineResult<()> {
        match self.marshal.step_frame() {
            Ok(Some(batch)) => {
                self.apply_publish(batch);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(error) => {
                log::error!("aborting drag: {error}");
                self.abort();
                Err(error)
            }
        }
    }

    // ---- internals --------------------------------------------------------

    fn positions_for(
        initial: &DragPositions,
        client_selection: Point,
        scroll_shift: Vec2,
    ) -> DragPositions {
        let client_offset = client_selection - initial.client.selection;
        let page_offset = client_offset + scroll_shift;
        DragPositions {
            client: ItemPositions {
                selection: client_selection,
                border_box_center: initial.client.border_box_center + client_offset,
                offset: client_offset,
            },
            page: ItemPositions {
                selection: initial.page.selection + page_offset,
                border_box_center: initial.page.border_box_center + page_offset,
                offset: page_offset,
            },
        }
    }

    fn refresh_impact(state: &mut DragState, force_should_animate: Option<bool>) {
        let Some(draggable) = state.dimensions.draggable(&state.critical.draggable.id) else {
            return;
        };
        let next = get_impact(&ImpactArgs {
            page_center: state.current.page.border_box_center,
            draggable,
            dimensions: &state.dimensions,
            previous: &state.impact,
            user_direction: state.user_direction,
            force_should_animate,
        });
        state.impact = next;
        Self::refresh_placeholders(state);
    }

    /// Foreign droppables grow by a placeholder while dragged over so there
    /// is room to drop; everything else releases its placeholder.
    fn refresh_placeholders(state: &mut DragState) {
        let Some(size) = state
            .dimensions
            .draggable(&state.critical.draggable.id)
            .map(|draggable| draggable.displace_by)
        else {
            return;
        };
        let target = state
            .impact
            .destination
            .as_ref()
            .map(|destination| destination.droppable_id.clone())
            .or_else(|| {
                state
                    .impact
                    .group
                    .as_ref()
                    .map(|group| group.grouping_with.droppable_id.clone())
            });

        let mut changed = Vec::new();
        for droppable in state.dimensions.droppables.values() {
            let id = &droppable.descriptor.id;
            let wants = target.as_deref() == Some(id.as_str()) && *id != state.critical.droppable.id;
            let has = droppable.subject.with_placeholder.is_some();
            if wants && !has {
                changed.push(droppable.with_placeholder(size));
            } else if !wants && has {
                changed.push(droppable.without_placeholder());
            }
        }
        for droppable in changed {
            state.dimensions = state.dimensions.with_droppable(droppable);
        }
    }

    /// A batched publish landed: absorb the dimensions, recalculate, and
    /// leave the collecting phase.
    fn apply_publish(&mut self, batch: BatchPublish) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Collecting(mut state) => {
                Self::absorb_batch(&mut state, batch);
                let start = state.drag_start();
                self.phase = Phase::Dragging(state);
                self.fire_drag_start(&start);
                self.emit_update_if_changed();
            }
            Phase::DropPending {
                mut drag,
                reason,
                is_waiting: true,
            } => {
                Self::absorb_batch(&mut drag, batch);
                self.fire_drag_start(&drag.drag_start());
                // the pending drop resolves against the complete dimensions
                if self.resolve_drop(drag, reason).is_err() {
                    self.phase = Phase::Idle;
                }
            }
            other => self.phase = other,
        }
    }

    /// Fires once per drag, as soon as the full dimension map is available.
    fn fire_drag_start(&mut self, start: &DragStart) {
        if self.drag_started {
            return;
        }
        self.drag_started = true;
        self.announcer.begin();
        self.hooks.on_drag_start(start, &mut self.announcer);
        if !self.announcer.was_used() {
            self.announcer.say(preset::on_drag_start(start));
        }
    }

    fn absorb_batch(state: &mut DragState, batch: BatchPublish) {
        // after a republish, freshly measured items snap rather than animate
        let force = if state.has_republished {
            Some(false)
        } else {
            None
        };
        state.dimensions = state
            .dimensions
            .with_published(batch.draggables, batch.droppables);
        state.has_republished = true;
        Self::refresh_impact(state, force);
    }

    /// An individual mid-collection publish from a registration change.
    fn absorb_individual_publish(&mut self, batch: BatchPublish) {
        if let Some(state) = self.phase.drag_state_mut() {
            state.dimensions = state
                .dimensions
                .with_published(batch.draggables, batch.droppables);
            state.has_republished = true;
        }
    }

    fn resolve_drop(&mut self, state: DragState, reason: DropReason) -> EngineResult<()> {
        self.marshal.stop();
        let draggable = state
            .dimensions
            .draggable(&state.critical.draggable.id)
            .ok_or_else(|| EngineError::UnknownDraggable(state.critical.draggable.id.clone()))?
            .clone();

        // a cancelled drag has no impact: the item goes straight home
        let (impact, result) = match reason {
            DropReason::Drop => (
                state.impact.clone(),
                DropResult::from_update(state.drag_update(), reason),
            ),
            DropReason::Cancel => {
                let mut update = state.drag_update();
                update.destination = None;
                update.group_with = None;
                (DragImpact::none(), DropResult::from_update(update, reason))
            }
        };

        let offset = new_home_offset(&impact, &draggable, &state.dimensions, reason);
        let target = draggable.page.border_box.center() + offset;
        let current = state.current.page.border_box_center;

        if current == target {
            self.complete_drop(result);
            return Ok(());
        }

        let pending = PendingDrop {
            new_home_offset: offset,
            drop_duration: drop_duration(current, target, reason),
            impact,
            result,
        };
        self.phase = Phase::DropAnimating {
            pending,
            dimensions: state.dimensions,
        };
        Ok(())
    }

    fn complete_drop(&mut self, result: DropResult) {
        self.phase = Phase::Idle;
        self.last_update = None;
        self.announcer.begin();
        self.hooks.on_drag_end(&result, &mut self.announcer);
        if !self.announcer.was_used() {
            self.announcer.say(preset::on_drag_end(&result));
        }
    }

    /// Tear the drag down after a fatal error.
    fn abort(&mut self) {
        self.marshal.stop();
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Collecting(state) | Phase::Dragging(state) => {
                let mut update = state.drag_update();
                update.destination = None;
                update.group_with = None;
                self.complete_drop(DropResult::from_update(update, DropReason::Cancel));
            }
            Phase::DropPending { drag, .. } => {
                let mut update = drag.drag_update();
                update.destination = None;
                update.group_with = None;
                self.complete_drop(DropResult::from_update(update, DropReason::Cancel));
            }
            other => self.phase = other,
        }
    }

    fn emit_update_if_changed(&mut self) {
        let Some(update) = self.phase.drag_state().map(DragState::drag_update) else {
            return;
        };
        if self.last_update.as_ref() == Some(&update) {
            return;
        }
        self.last_update = Some(update.clone());
        self.announcer.begin();
        self.hooks.on_drag_update(&update, &mut self.announcer);
        if !self.announcer.was_used() {
            self.announcer.say(preset::on_drag_update(&update));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use dragline_core::{Axis, BoxModel, DraggableDimension, DroppableDimension};
    use kurbo::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<String>>>;

    struct RecordingHooks {
        events: Events,
    }

    impl Hooks for RecordingHooks {
        fn on_before_drag_start(&mut self, start: &crate::state::DragStart) {
            self.events
                .borrow_mut()
                .push(format!("before-start {}", start.draggable_id));
        }

        fn on_drag_start(&mut self, start: &crate::state::DragStart, _announcer: &mut Announcer) {
            self.events
                .borrow_mut()
                .push(format!("start {}@{}", start.draggable_id, start.source.index));
        }

        fn on_drag_update(&mut self, update: &DragUpdate, _announcer: &mut Announcer) {
            let destination = match &update.destination {
                Some(location) => format!("{}@{}", location.droppable_id, location.index),
                None => "none".to_string(),
            };
            self.events.borrow_mut().push(format!("update {destination}"));
        }

        fn on_drag_end(&mut self, result: &DropResult, _announcer: &mut Announcer) {
            self.events
                .borrow_mut()
                .push(format!("end {:?}", result.reason));
        }
    }

    fn draggable_dimension(id: &str, index: usize, droppable_id: &str, origin: Point) -> DraggableDimension {
        let rect = Rect::new(origin.x, origin.y, origin.x + 100.0, origin.y + 50.0);
        let boxes = BoxModel::tight(rect);
        DraggableDimension::new(
            DraggableDescriptor {
                id: id.to_string(),
                index,
                droppable_id: droppable_id.to_string(),
                type_id: "item".to_string(),
            },
            boxes,
            boxes,
        )
    }

    fn droppable_dimension(id: &str, rect: Rect) -> DroppableDimension {
        let boxes = BoxModel::tight(rect);
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

    fn register_droppable(engine: &mut DragEngine<RecordingHooks>, id: &str, rect: Rect) {
        let dimension = droppable_dimension(id, rect);
        let descriptor = dimension.descriptor.clone();
        engine
            .register_droppable(
                descriptor,
                DroppableCallbacks {
                    get_dimension: Box::new(move || Ok(dimension.clone())),
                    watch_scroll: Box::new(|| {}),
                    unwatch_scroll: Box::new(|| {}),
                },
            )
            .unwrap();
    }

    fn register_draggable(
        engine: &mut DragEngine<RecordingHooks>,
        id: &str,
        index: usize,
        droppable_id: &str,
        origin: Point,
    ) {
        let dimension = draggable_dimension(id, index, droppable_id, origin);
        let descriptor = dimension.descriptor.clone();
        engine
            .register_draggable(descriptor, Box::new(move || Ok(dimension.clone())))
            .unwrap();
    }

    /// `home` (x 0..100) with a0..a2 and `foreign` (x 200..300) with b0..b1.
    fn engine() -> (DragEngine<RecordingHooks>, Events) {
        let events: Events = Rc::default();
        let mut engine = DragEngine::new(RecordingHooks {
            events: Rc::clone(&events),
        });
        register_droppable(&mut engine, "home", Rect::new(0.0, 0.0, 100.0, 400.0));
        register_droppable(&mut engine, "foreign", Rect::new(200.0, 0.0, 300.0, 400.0));
        register_draggable(&mut engine, "a0", 0, "home", Point::new(0.0, 0.0));
        register_draggable(&mut engine, "a1", 1, "home", Point::new(0.0, 50.0));
        register_draggable(&mut engine, "a2", 2, "home", Point::new(0.0, 100.0));
        register_draggable(&mut engine, "b0", 0, "foreign", Point::new(200.0, 0.0));
        register_draggable(&mut engine, "b1", 1, "foreign", Point::new(200.0, 50.0));
        (engine, events)
    }

    fn complete_collection(engine: &mut DragEngine<RecordingHooks>) {
        engine.run_timers();
        engine.step_frame().unwrap(); // collect
        engine.step_frame().unwrap(); // publish
    }

    #[test]
    fn test_lift_fires_before_start_and_start_waits_for_publish() {
        let (mut engine, events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();

        assert!(matches!(engine.phase(), Phase::Collecting(_)));
        assert_eq!(*events.borrow(), vec!["before-start a0".to_string()]);
        assert!(engine.take_announcements().is_empty());
        // at rest the destination is the source
        let state = engine.phase().drag_state().unwrap();
        assert_eq!(state.impact.destination.as_ref().unwrap().index, 0);

        complete_collection(&mut engine);
        assert_eq!(
            *events.borrow(),
            vec!["before-start a0".to_string(), "start a0@0".to_string()]
        );
        // default announcement is queued since the hook stayed silent
        assert_eq!(
            engine.take_announcements(),
            vec!["You have lifted an item in position 1."]
        );
    }

    #[test]
    fn test_cancel_while_collecting_goes_straight_to_idle() {
        let (mut engine, events) = engine();
        let measured = Rc::new(RefCell::new(0u32));
        let counter = Rc::clone(&measured);
        let late = draggable_dimension("a3", 3, "home", Point::new(0.0, 150.0));
        engine
            .register_draggable(
                late.descriptor.clone(),
                Box::new(move || {
                    *counter.borrow_mut() += 1;
                    Ok(late.clone())
                }),
            )
            .unwrap();

        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        engine.cancel().unwrap();

        assert!(engine.phase().is_idle());
        assert_eq!(
            *events.borrow(),
            vec!["before-start a0".to_string(), "end Cancel".to_string()]
        );

        // the aborted collection never runs: nothing beyond the two
        // immediate measurements
        engine.run_timers();
        engine.step_frame().unwrap();
        engine.step_frame().unwrap();
        assert_eq!(*measured.borrow(), 0);
        assert!(engine.phase().is_idle());
    }

    #[test]
    fn test_lift_while_active_is_rejected() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        assert!(matches!(
            engine.lift("a1", Point::new(50.0, 75.0), Vec2::ZERO),
            Err(EngineError::DragInProgress(_))
        ));
    }

    #[test]
    fn test_publish_transitions_to_dragging() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);

        let Phase::Dragging(state) = engine.phase() else {
            panic!("expected dragging, got {:?}", engine.phase());
        };
        assert_eq!(state.dimensions.draggables.len(), 5);
        assert_eq!(state.dimensions.droppables.len(), 2);
    }

    #[test]
    fn test_moves_while_collecting_defer_impact() {
        let (mut engine, events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        // cross a1's resting center while still collecting
        engine.move_to(Point::new(50.0, 80.0), false).unwrap();

        let state = engine.phase().drag_state().unwrap();
        assert_eq!(state.current.page.offset, Vec2::new(0.0, 55.0));
        // impact not recalculated yet
        assert_eq!(state.impact.destination.as_ref().unwrap().index, 0);
        assert!(!events.borrow().iter().any(|e| e.starts_with("update")));

        complete_collection(&mut engine);
        let state = engine.phase().drag_state().unwrap();
        assert_eq!(state.impact.destination.as_ref().unwrap().index, 1);
        assert!(events.borrow().contains(&"update home@1".to_string()));
    }

    #[test]
    fn test_update_hook_fires_only_on_change() {
        let (mut engine, events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);

        engine.move_to(Point::new(50.0, 80.0), false).unwrap();
        engine.move_to(Point::new(50.0, 82.0), false).unwrap();
        engine.move_to(Point::new(50.0, 84.0), false).unwrap();

        let updates: Vec<String> = events
            .borrow()
            .iter()
            .filter(|e| e.starts_with("update"))
            .cloned()
            .collect();
        assert_eq!(updates, vec!["update home@1"]);
    }

    #[test]
    fn test_drop_at_rest_completes_immediately() {
        let (mut engine, events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);

        engine.drop_drag().unwrap();
        assert!(engine.phase().is_idle());
        assert_eq!(events.borrow().last().unwrap(), "end Drop");
    }

    #[test]
    fn test_drop_after_moving_animates_home() {
        let (mut engine, events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);
        engine.move_to(Point::new(50.0, 80.0), false).unwrap();

        engine.drop_drag().unwrap();
        let Phase::DropAnimating { pending, .. } = engine.phase() else {
            panic!("expected drop animating, got {:?}", engine.phase());
        };
        // settles one displaced sibling further down
        assert_eq!(pending.new_home_offset, Vec2::new(0.0, 50.0));
        assert!(pending.drop_duration > 0.0);
        assert_eq!(pending.result.destination.as_ref().unwrap().index, 1);
        // end hook waits for the animation
        assert_ne!(events.borrow().last().unwrap(), "end Drop");

        let result = engine.finish_drop_animation().unwrap();
        assert_eq!(result.reason, DropReason::Drop);
        assert!(engine.phase().is_idle());
        assert_eq!(events.borrow().last().unwrap(), "end Drop");
    }

    #[test]
    fn test_cancel_returns_home_with_no_destination() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);
        engine.move_to(Point::new(50.0, 80.0), false).unwrap();

        engine.cancel().unwrap();
        let Phase::DropAnimating { pending, .. } = engine.phase() else {
            panic!("expected drop animating, got {:?}", engine.phase());
        };
        assert_eq!(pending.new_home_offset, Vec2::ZERO);
        assert_eq!(pending.result.destination, None);
        assert_eq!(pending.result.reason, DropReason::Cancel);
    }

    #[test]
    fn test_drop_while_collecting_waits_for_publish() {
        let (mut engine, events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        engine.move_to(Point::new(50.0, 80.0), false).unwrap();
        engine.drop_drag().unwrap();

        assert!(matches!(
            engine.phase(),
            Phase::DropPending {
                is_waiting: true,
                ..
            }
        ));
        assert!(!events.borrow().iter().any(|e| e.starts_with("end")));

        complete_collection(&mut engine);
        // resolved against the full dimensions: a1 was crossed
        let Phase::DropAnimating { pending, .. } = engine.phase() else {
            panic!("expected drop animating, got {:?}", engine.phase());
        };
        assert_eq!(pending.result.destination.as_ref().unwrap().index, 1);
        engine.finish_drop_animation().unwrap();
        assert_eq!(events.borrow().last().unwrap(), "end Drop");
    }

    #[test]
    fn test_operations_require_a_drag() {
        let (mut engine, _events) = engine();
        assert!(matches!(
            engine.move_to(Point::new(0.0, 0.0), false),
            Err(EngineError::NotDragging)
        ));
        assert!(matches!(engine.drop_drag(), Err(EngineError::NotDragging)));
        assert!(matches!(engine.cancel(), Err(EngineError::NotDragging)));
        assert!(matches!(engine.recollect(), Err(EngineError::NotDragging)));
        assert!(matches!(
            engine.finish_drop_animation(),
            Err(EngineError::NotDragging)
        ));
    }

    #[test]
    fn test_foreign_list_grows_a_placeholder() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);

        engine.move_to(Point::new(250.0, 150.0), false).unwrap();
        let state = engine.phase().drag_state().unwrap();
        assert_eq!(
            state.impact.destination.as_ref().unwrap().droppable_id,
            "foreign"
        );
        let foreign = state.dimensions.droppable("foreign").unwrap();
        assert!(foreign.subject.with_placeholder.is_some());

        // moving back home releases it
        engine.move_to(Point::new(50.0, 25.0), false).unwrap();
        let state = engine.phase().drag_state().unwrap();
        let foreign = state.dimensions.droppable("foreign").unwrap();
        assert!(foreign.subject.with_placeholder.is_none());
    }

    #[test]
    fn test_disabling_a_droppable_removes_it_as_destination() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);
        engine.move_to(Point::new(250.0, 150.0), false).unwrap();

        engine.update_droppable_is_enabled("foreign", false).unwrap();
        let state = engine.phase().drag_state().unwrap();
        assert_eq!(state.impact.destination, None);
    }

    #[test]
    fn test_window_scroll_shifts_page_positions() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);

        engine.update_window_scroll(Vec2::new(0.0, 30.0)).unwrap();
        let state = engine.phase().drag_state().unwrap();
        assert_eq!(state.current.page.offset, Vec2::new(0.0, 30.0));
        assert_eq!(state.current.client.offset, Vec2::ZERO);
    }

    #[test]
    fn test_measurement_failure_aborts_the_drag() {
        let (mut engine, events) = engine();
        let broken = DraggableDescriptor {
            id: "broken".to_string(),
            index: 3,
            droppable_id: "home".to_string(),
            type_id: "item".to_string(),
        };
        engine
            .register_draggable(
                broken,
                Box::new(|| Err(MeasureError::new("element unmounted"))),
            )
            .unwrap();

        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        engine.run_timers();
        assert!(matches!(
            engine.step_frame(),
            Err(EngineError::Measure(_))
        ));
        assert!(engine.phase().is_idle());
        assert_eq!(events.borrow().last().unwrap(), "end Cancel");
    }

    #[test]
    fn test_recollection_forces_fresh_items_to_snap() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();
        complete_collection(&mut engine);
        engine.move_to(Point::new(50.0, 80.0), false).unwrap();

        engine.recollect().unwrap();
        assert!(matches!(engine.phase(), Phase::Collecting(_)));
        engine.step_frame().unwrap(); // collect (no lift timeout)
        engine.step_frame().unwrap(); // publish

        let Phase::Dragging(state) = engine.phase() else {
            panic!("expected dragging, got {:?}", engine.phase());
        };
        // a1 is still displaced, but now without animation
        let displacement = state.impact.movement.map.get("a1").unwrap();
        assert!(!displacement.should_animate);
    }

    #[test]
    fn test_mid_collection_registration_lands_in_dimensions() {
        let (mut engine, _events) = engine();
        engine.lift("a0", Point::new(50.0, 25.0), Vec2::ZERO).unwrap();

        register_draggable(&mut engine, "a3", 3, "home", Point::new(0.0, 150.0));
        let state = engine.phase().drag_state().unwrap();
        assert!(state.dimensions.draggable("a3").is_some());
    }
}
