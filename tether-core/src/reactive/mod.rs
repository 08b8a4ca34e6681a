//! Reactive Primitives
//!
//! This module implements the reactive engine: an observable model, one
//! channel per key path, and the observer interface bindings implement.
//!
//! # Concepts
//!
//! ## Observable model
//!
//! An [`ObservableModel`] wraps a plain mapping. Reads and writes are explicit
//! method calls (`get`/`set`), never implicit property traps, so every
//! dependency is visible at the call site.
//!
//! ## Channels
//!
//! Each key path owns exactly one [`Channel`] for the model's lifetime.
//! Assigning a key notifies its channel, which calls every subscribed
//! [`Observer`] in subscription order.
//!
//! ## Key paths
//!
//! Channels are keyed by the full [`KeyPath`] from the root (`user.name`),
//! so same-named fields at different depths never share a channel.
//!
//! # Implementation Notes
//!
//! Propagation is synchronous: `set` returns only after every observer ran.
//! Observers may call `set` again; a thread-local [`NotifyScope`] stack
//! bounds how deep those nested calls may go.

mod channel;
mod context;
mod model;
mod observable;
mod path;
mod subscriber;

pub use channel::Channel;
pub use context::NotifyScope;
pub use model::{ObservableModel, WeakModel};
pub use observable::Observable;
pub use path::KeyPath;
pub use subscriber::{FnObserver, Observer, ObserverId};
