//! Notification Context
//!
//! Tracks which `set` calls are currently propagating on this thread. An
//! observer may call `set` again while it is being notified; each nested call
//! pushes another entry. Once the stack reaches the configured depth the next
//! `set` fails instead of recursing further.
//!
//! # Implementation
//!
//! A thread-local stack holds one entry per active `set`. Entering returns a
//! guard that pops the entry on drop, so the stack stays balanced even when an
//! observer returns early with an error or panics.

use std::cell::RefCell;

use super::KeyPath;
use crate::error::ModelError;

thread_local! {
    static NOTIFY_STACK: RefCell<Vec<KeyPath>> = const { RefCell::new(Vec::new()) };
}

/// Guard for one active `set` call.
#[derive(Debug)]
pub struct NotifyScope {
    depth: usize,
}

impl NotifyScope {
    /// Enter a new notification scope for `path`.
    ///
    /// Fails with [`ModelError::ReentrancyOverflow`] when `max_depth` scopes
    /// are already active on this thread.
    pub fn enter(path: &KeyPath, max_depth: usize) -> Result<Self, ModelError> {
        NOTIFY_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() >= max_depth {
                return Err(ModelError::ReentrancyOverflow {
                    path: path.clone(),
                    depth: stack.len(),
                });
            }
            stack.push(path.clone());
            Ok(Self { depth: stack.len() })
        })
    }

    /// Number of `set` calls currently propagating on this thread.
    pub fn current_depth() -> usize {
        NOTIFY_STACK.with(|stack| stack.borrow().len())
    }

    /// The path of the innermost active `set`, if any.
    pub fn current_path() -> Option<KeyPath> {
        NOTIFY_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Depth of this scope (1 for an outermost `set`).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for NotifyScope {
    fn drop(&mut self) {
        NOTIFY_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(
                stack.len(),
                self.depth,
                "NotifyScope mismatch: expected depth {}, got {}",
                self.depth,
                stack.len()
            );
            stack.pop();
        });
    }
}
