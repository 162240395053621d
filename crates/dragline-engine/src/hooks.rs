//! Consumer-facing lifecycle hooks and the screen-reader announcer.
//!
//! Hook ordering per drag: `on_before_drag_start` at lift, `on_drag_start`
//! once the full dimensions publish, zero or more `on_drag_update` calls
//! (only when the destination or grouping target actually changes), then
//! exactly one `on_drag_end`. A drag cancelled before its dimensions publish
//! ends without a start hook.

use crate::state::{DragStart, DragUpdate, DropReason, DropResult};

pub trait Hooks {
    /// Called before any dimension collection begins. Consumers must not
    /// change the dimensions of the dragging item here.
    fn on_before_drag_start(&mut self, _start: &DragStart) {}

    fn on_drag_start(&mut self, _start: &DragStart, _announcer: &mut Announcer) {}

    fn on_drag_update(&mut self, _update: &DragUpdate, _announcer: &mut Announcer) {}

    fn on_drag_end(&mut self, result: &DropResult, announcer: &mut Announcer);
}

/// Hooks that do nothing. Useful for headless use and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl Hooks for NoopHooks {
    fn on_drag_end(&mut self, _result: &DropResult, _announcer: &mut Announcer) {}
}

/// Queues screen-reader announcements. If a hook does not announce, the
/// engine queues a default English message for it.
#[derive(Debug, Default)]
pub struct Announcer {
    queue: Vec<String>,
    used: bool,
}

impl Announcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, message: impl Into<String>) {
        self.queue.push(message.into());
        self.used = true;
    }

    /// Marks the start of a hook call so the engine can tell whether the
    /// hook announced anything.
    pub(crate) fn begin(&mut self) {
        self.used = false;
    }

    pub(crate) fn was_used(&self) -> bool {
        self.used
    }

    /// Take all queued announcements, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.queue)
    }
}

/// Default announcement messages, used when a hook does not announce.
pub mod preset {
    use super::*;

    fn position(index: usize) -> usize {
        index + 1
    }

    pub fn on_drag_start(start: &DragStart) -> String {
        format!(
            "You have lifted an item in position {}.",
            position(start.source.index)
        )
    }

    pub fn on_drag_update(update: &DragUpdate) -> String {
        if let Some(group_with) = &update.group_with {
            return format!("The item has been grouped with {group_with}.");
        }
        match &update.destination {
            Some(destination) => format!(
                "You have moved the item from position {} to position {}.",
                position(update.source.index),
                position(destination.index)
            ),
            None => "You are currently not dragging over a droppable area.".to_string(),
        }
    }

    pub fn on_drag_end(result: &DropResult) -> String {
        match result.reason {
            DropReason::Cancel => format!(
                "Movement cancelled. The item has returned to its starting position of {}.",
                position(result.source.index)
            ),
            DropReason::Drop => {
                if let Some(group_with) = &result.group_with {
                    return format!("The item has been dropped onto {group_with}.");
                }
                match &result.destination {
                    Some(destination) => format!(
                        "You have dropped the item. It has moved from position {} to {}.",
                        position(result.source.index),
                        position(destination.index)
                    ),
                    None => "The item has been dropped while not over a droppable location."
                        .to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragline_core::DraggableLocation;

    fn update() -> DragUpdate {
        DragUpdate {
            draggable_id: "a1".to_string(),
            type_id: "item".to_string(),
            source: DraggableLocation {
                droppable_id: "home".to_string(),
                index: 1,
            },
            destination: Some(DraggableLocation {
                droppable_id: "home".to_string(),
                index: 3,
            }),
            group_with: None,
        }
    }

    #[test]
    fn test_announcer_drains_in_order() {
        let mut announcer = Announcer::new();
        announcer.say("first");
        announcer.say("second");
        assert_eq!(announcer.drain(), vec!["first", "second"]);
        assert!(announcer.drain().is_empty());
    }

    #[test]
    fn test_announcer_tracks_usage_per_hook() {
        let mut announcer = Announcer::new();
        announcer.begin();
        assert!(!announcer.was_used());
        announcer.say("hello");
        assert!(announcer.was_used());
        announcer.begin();
        assert!(!announcer.was_used());
    }

    #[test]
    fn test_preset_positions_are_one_based() {
        let start = DragStart {
            draggable_id: "a1".to_string(),
            type_id: "item".to_string(),
            source: DraggableLocation {
                droppable_id: "home".to_string(),
                index: 0,
            },
        };
        assert_eq!(
            preset::on_drag_start(&start),
            "You have lifted an item in position 1."
        );
    }

    #[test]
    fn test_preset_update_prefers_grouping() {
        let mut grouped = update();
        grouped.group_with = Some("a2".to_string());
        assert_eq!(
            preset::on_drag_update(&grouped),
            "The item has been grouped with a2."
        );
    }

    #[test]
    fn test_preset_update_without_destination() {
        let mut lost = update();
        lost.destination = None;
        assert_eq!(
            preset::on_drag_update(&lost),
            "You are currently not dragging over a droppable area."
        );
    }

    #[test]
    fn test_preset_drop_and_cancel_messages() {
        let dropped = DropResult::from_update(update(), DropReason::Drop);
        assert_eq!(
            preset::on_drag_end(&dropped),
            "You have dropped the item. It has moved from position 2 to 4."
        );
        let cancelled = DropResult::from_update(update(), DropReason::Cancel);
        assert_eq!(
            preset::on_drag_end(&cancelled),
            "Movement cancelled. The item has returned to its starting position of 2."
        );
    }
}
