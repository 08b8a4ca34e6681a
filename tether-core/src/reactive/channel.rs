//! Channel Implementation
//!
//! A Channel is the publish/subscribe unit behind one key path of a model.
//!
//! # How Channels Work
//!
//! 1. The model creates exactly one channel per key path when the key is
//!    first registered. The channel lives as long as the model.
//!
//! 2. Observers subscribe by appending themselves to the channel's list.
//!    Nothing is de-duplicated: subscribing twice means being notified twice.
//!
//! 3. When the model assigns the key, the channel calls every observer in
//!    subscription order, synchronously, before `set` returns.
//!
//! # Re-entrancy
//!
//! The subscriber list is cloned before iterating, so an observer may call
//! `set` (or even `subscribe`) while it is being notified without
//! deadlocking. Observers added during a notification are first called on
//! the next one.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::subscriber::Observer;
use super::KeyPath;
use crate::error::ModelError;

/// The publish/subscribe channel for one key path.
///
/// Cloning is cheap and yields a handle to the same channel.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    path: KeyPath,
    /// Ordered; insertion order is notification order.
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl Channel {
    /// Create a channel with no subscribers.
    pub fn new(path: KeyPath) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                path,
                observers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// The key path this channel belongs to.
    pub fn path(&self) -> &KeyPath {
        &self.inner.path
    }

    /// Append an observer to the notification list.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) {
        tracing::debug!(
            path = %self.inner.path,
            observer = %observer.id(),
            "subscribe"
        );
        self.inner.observers.write().push(observer);
    }

    /// Call every observer with the new value, in subscription order.
    ///
    /// Stops at the first observer that fails and returns its error.
    pub fn notify(&self, value: &Value) -> Result<(), ModelError> {
        let observers = self.inner.observers.read().clone();
        for observer in &observers {
            observer.update(&self.inner.path, value)?;
        }
        Ok(())
    }

    /// Get the number of subscriptions, duplicates included.
    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.read().len()
    }

    /// Whether two handles point at the same channel.
    pub fn same_channel(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("path", &self.inner.path)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
