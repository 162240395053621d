//! Deferred single-shot continuations standing in for animation frames and
//! the lift-confirmation timeout.
//!
//! The host drives ticks explicitly (`run_timers`, `step_frame` on the
//! engine). Each queued task carries the ticket that was active when it was
//! scheduled; a phase transition away from the drag bumps the ticket, and a
//! task whose ticket is stale is discarded immediately before it would run.

use std::collections::VecDeque;

pub type Ticket = u64;

/// What a deferred task should do when its tick arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Invoke the measurement callbacks of every same-type entry.
    Collect,
    /// Hand the collected batch to the state machine.
    Publish,
}

#[derive(Debug, Clone, Copy)]
struct Task {
    ticket: Ticket,
    kind: TaskKind,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    active: Ticket,
    frames: VecDeque<Task>,
    timers: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every outstanding task. Queued entries stay put and are
    /// dropped when their tick arrives.
    pub fn bump(&mut self) {
        self.active += 1;
    }

    /// Queue a task for the next animation-frame tick.
    pub fn schedule_frame(&mut self, kind: TaskKind) {
        self.frames.push_back(Task {
            ticket: self.active,
            kind,
        });
    }

    /// Queue a task behind the lift-confirmation timeout.
    pub fn schedule_timer(&mut self, kind: TaskKind) {
        self.timers.push(Task {
            ticket: self.active,
            kind,
        });
    }

    /// The next still-wanted frame task, discarding stale ones.
    pub fn pop_frame(&mut self) -> Option<TaskKind> {
        while let Some(task) = self.frames.pop_front() {
            if task.ticket == self.active {
                return Some(task.kind);
            }
        }
        None
    }

    /// Every still-wanted timer task, discarding stale ones.
    pub fn take_timers(&mut self) -> Vec<TaskKind> {
        let active = self.active;
        self.timers
            .drain(..)
            .filter(|task| task.ticket == active)
            .map(|task| task.kind)
            .collect()
    }

    pub fn has_pending_frames(&self) -> bool {
        self.frames.iter().any(|task| task.ticket == self.active)
    }
}
