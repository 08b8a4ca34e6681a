//! Observer types for the reactive system.
//!
//! An Observer is anything that wants to hear about value changes on a
//! channel. Bindings discovered in a node tree are the main kind, but hosts
//! can subscribe their own.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use super::KeyPath;
use crate::error::ModelError;

/// Diagnostic handle of an observer, shown as `observer#N` in traces.
///
/// A channel never compares these: subscribing the same observer twice
/// delivers every notification twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

static NEXT_OBSERVER: AtomicU64 = AtomicU64::new(1);

impl ObserverId {
    /// Allocate the next process-wide observer number.
    pub fn new() -> Self {
        Self(NEXT_OBSERVER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// Receives new values from the channels it is subscribed to.
pub trait Observer: Send + Sync {
    /// The observer's unique ID.
    fn id(&self) -> ObserverId;

    /// Called synchronously by a channel after `path` was assigned `value`.
    ///
    /// Returning an error aborts the remaining notifications of that channel
    /// and surfaces the error to whoever called `set`.
    fn update(&self, path: &KeyPath, value: &Value) -> Result<(), ModelError>;
}

/// An observer backed by a closure.
///
/// Handy for hosts that want to react to a key without a node binding.
pub struct FnObserver {
    id: ObserverId,
    /// Stored boxed so any closure shape fits the same channel list.
    update: Box<dyn Fn(&KeyPath, &Value) -> Result<(), ModelError> + Send + Sync>,
}

impl FnObserver {
    /// Create a new observer with the given update callback.
    pub fn new<F>(update: F) -> Self
    where
        F: Fn(&KeyPath, &Value) -> Result<(), ModelError> + Send + Sync + 'static,
    {
        Self {
            id: ObserverId::new(),
            update: Box::new(update),
        }
    }
}

impl Observer for FnObserver {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn update(&self, path: &KeyPath, value: &Value) -> Result<(), ModelError> {
        (self.update)(path, value)
    }
}

impl fmt::Debug for FnObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver").field("id", &self.id).finish()
    }
}
