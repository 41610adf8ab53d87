//! Scoped live displays.
//!
//! A guard starts its display when created and stops it exactly once: on
//! [`finish`](StatusGuard::finish) or when dropped, including during a panic
//! unwind or an early `?` return.

use crate::render::{ProgressHandle, SpinnerHandle, TaskId, TaskUpdate};

/// A running status spinner.
#[must_use = "the spinner stops as soon as the guard is dropped"]
pub struct StatusGuard {
    handle: Option<Box<dyn SpinnerHandle>>,
}

impl StatusGuard {
    pub(crate) fn new(handle: Box<dyn SpinnerHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn update(&mut self, message: &str) {
        if let Some(handle) = self.handle.as_mut() {
            handle.set_message(message);
        }
    }

    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.finish();
            log::trace!("status spinner stopped");
        }
    }
}

impl Drop for StatusGuard {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A running progress display and its task registry.
#[must_use = "the progress display stops as soon as the guard is dropped"]
pub struct ProgressGuard {
    handle: Option<Box<dyn ProgressHandle>>,
}

impl ProgressGuard {
    pub(crate) fn new(handle: Box<dyn ProgressHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Register a task with `total` units of work.
    pub fn add_task(&mut self, description: &str, total: u64) -> TaskId {
        match self.handle.as_mut() {
            Some(handle) => handle.add_task(description, total),
            None => TaskId(usize::MAX),
        }
    }

    pub fn advance(&mut self, task: TaskId, delta: u64) {
        if let Some(handle) = self.handle.as_mut() {
            handle.advance(task, delta);
        }
    }

    pub fn update(&mut self, task: TaskId, update: TaskUpdate) {
        if let Some(handle) = self.handle.as_mut() {
            handle.update(task, &update);
        }
    }

    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.finish();
            log::trace!("progress display stopped");
        }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.stop();
    }
}
