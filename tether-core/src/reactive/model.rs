//! Observable Model
//!
//! The model is the central registry that owns the data and one channel per
//! key path. Every read and write goes through an explicit method call, so
//! the set of tracked keys is fixed, inspectable and testable.
//!
//! # How It Works
//!
//! 1. Construction walks the input mapping depth-first and registers a
//!    channel for every key at every depth, keyed by its full path.
//!
//! 2. `set` stores the new value under a write lock, releases the lock, then
//!    notifies the affected channels in order: the assigned path first, then
//!    its descendants when a mapping was assigned.
//!
//! 3. Notification is synchronous. When `set` returns, every observer has
//!    seen the new value.
//!
//! # Nested mappings
//!
//! Intermediate keys store only the ordered names of their children; leaves
//! store the values. Reading an intermediate key reassembles the mapping.
//! Assigning a mapping to an existing key stores it child by child, so the
//! children keep their channels.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::channel::Channel;
use super::context::NotifyScope;
use super::observable::Observable;
use super::KeyPath;
use crate::config::RuntimeConfig;
use crate::error::{value_kind, ModelError};

/// A data mapping whose every key path owns a [`Channel`].
///
/// Cloning is cheap and yields a handle to the same model.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tether_core::reactive::ObservableModel;
///
/// let model = ObservableModel::new(json!({ "user": { "name": "Saitama" } }))?;
/// model.set("user.name", "Genos")?;
/// assert_eq!(model.get("user.name"), Some(json!("Genos")));
/// # Ok::<(), tether_core::ModelError>(())
/// ```
#[derive(Clone)]
pub struct ObservableModel {
    inner: Arc<ModelInner>,
}

/// A handle that does not keep the model alive.
///
/// Input listeners hold one of these, so a node tree never owns its model.
#[derive(Clone)]
pub struct WeakModel {
    inner: Weak<ModelInner>,
}

struct ModelInner {
    slots: RwLock<IndexMap<KeyPath, Slot>>,
    config: RuntimeConfig,
}

struct Slot {
    value: SlotValue,
    channel: Channel,
}

enum SlotValue {
    Leaf(Value),
    /// Ordered child key names; each child has its own slot.
    Branch(Vec<String>),
}

/// Pending notifications collected under the write lock.
type Pending = Vec<(Channel, Value)>;

impl ObservableModel {
    /// Wrap `data` with the default configuration.
    pub fn new(data: Value) -> Result<Self, ModelError> {
        Self::with_config(data, RuntimeConfig::default())
    }

    /// Wrap `data`, which must be a mapping whose keys at every depth are
    /// identifiers, so that each one is reachable by a dotted path.
    pub fn with_config(data: Value, config: RuntimeConfig) -> Result<Self, ModelError> {
        let map = match data {
            Value::Object(map) => map,
            other => {
                return Err(ModelError::NotAMapping {
                    found: value_kind(&other),
                })
            }
        };

        check_keys(&map)?;

        let mut slots = IndexMap::new();
        for (key, value) in map {
            register(&mut slots, KeyPath::root(&key), value);
        }
        tracing::debug!(channels = slots.len(), "observable model created");

        Ok(Self {
            inner: Arc::new(ModelInner {
                slots: RwLock::new(slots),
                config,
            }),
        })
    }

    /// The configuration this model was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Read the value at a dotted path.
    ///
    /// Returns `None` for unknown keys and for strings that are not key paths.
    pub fn get(&self, path: &str) -> Option<Value> {
        let path = KeyPath::parse(path).ok()?;
        self.get_path(&path)
    }

    /// Read the value at `path`.
    ///
    /// Intermediate keys return their reassembled mapping.
    pub fn get_path(&self, path: &KeyPath) -> Option<Value> {
        let value = assemble(&self.inner.slots.read(), path)?;
        if self.inner.config.trace_access {
            tracing::trace!(path = %path, value = %value, "get value");
        }
        Some(value)
    }

    /// Assign the value at a dotted path and notify its channel.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let path = KeyPath::parse(path).map_err(|_| ModelError::InvalidKeyPath {
            raw: path.to_owned(),
        })?;
        self.set_path(&path, value.into())
    }

    /// Assign `value` at `path` and notify its channel.
    ///
    /// Notification is unconditional: assigning the current value notifies
    /// again. Errors from observers propagate to the caller and stop the
    /// remaining notifications of this call.
    ///
    /// A key whose ancestor currently holds a plain value is detached and
    /// cannot be assigned until a mapping is stored over that ancestor.
    pub fn set_path(&self, path: &KeyPath, value: Value) -> Result<(), ModelError> {
        if let Value::Object(map) = &value {
            check_keys(map)?;
        }
        let _scope = NotifyScope::enter(path, self.inner.config.max_notify_depth)?;

        let pending = {
            let mut slots = self.inner.slots.write();
            if !slots.contains_key(path) || is_detached(&slots, path) {
                return Err(ModelError::UnknownKey { path: path.clone() });
            }

            if self.inner.config.trace_access && tracing::enabled!(tracing::Level::TRACE) {
                let before = assemble(&slots, path).unwrap_or_default();
                tracing::trace!(path = %path, before = %before, after = %value, "value change");
            }

            let mut pending = Pending::new();
            store(&mut slots, path, value, &mut pending);
            pending
        };

        // The lock is released here so observers can read and write freely.
        for (channel, value) in pending {
            channel.notify(&value)?;
        }
        Ok(())
    }

    /// Whether `path` has a channel.
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.inner.slots.read().contains_key(path)
    }

    /// The channel for `path`, if registered.
    pub fn channel(&self, path: &KeyPath) -> Option<Channel> {
        self.inner
            .slots
            .read()
            .get(path)
            .map(|slot| slot.channel.clone())
    }

    /// Every registered key path, in registration order.
    pub fn paths(&self) -> Vec<KeyPath> {
        self.inner.slots.read().keys().cloned().collect()
    }

    /// Get the number of registered channels.
    pub fn channel_count(&self) -> usize {
        self.inner.slots.read().len()
    }

    /// A typed handle to the value at a dotted path.
    pub fn observable<T>(&self, path: &str) -> Result<Observable<T>, ModelError>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = KeyPath::parse(path).map_err(|_| ModelError::InvalidKeyPath {
            raw: path.to_owned(),
        })?;
        if !self.contains(&path) {
            return Err(ModelError::UnknownKey { path });
        }
        Ok(Observable {
            model: self.clone(),
            path,
            _marker: PhantomData,
        })
    }

    /// A handle that does not keep the model alive.
    pub fn downgrade(&self) -> WeakModel {
        WeakModel {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl WeakModel {
    /// Get the model back, if it still exists.
    pub fn upgrade(&self) -> Option<ObservableModel> {
        self.inner.upgrade().map(|inner| ObservableModel { inner })
    }
}

impl Debug for ObservableModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableModel")
            .field("channel_count", &self.channel_count())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl Debug for WeakModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakModel")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

fn register(slots: &mut IndexMap<KeyPath, Slot>, path: KeyPath, value: Value) {
    tracing::debug!(path = %path, "register channel");
    let channel = Channel::new(path.clone());

    match value {
        Value::Object(map) => {
            let keys = map.keys().cloned().collect();
            slots.insert(
                path.clone(),
                Slot {
                    value: SlotValue::Branch(keys),
                    channel,
                },
            );
            for (key, child) in map {
                register(slots, path.child(&key), child);
            }
        }
        leaf => {
            slots.insert(
                path,
                Slot {
                    value: SlotValue::Leaf(leaf),
                    channel,
                },
            );
        }
    }
}

/// Reject mapping keys that a dotted path could not address.
fn check_keys(map: &Map<String, Value>) -> Result<(), ModelError> {
    for (key, value) in map {
        if !KeyPath::is_key(key) {
            return Err(ModelError::InvalidKey { key: key.clone() });
        }
        if let Value::Object(children) = value {
            check_keys(children)?;
        }
    }
    Ok(())
}

/// Whether some ancestor of `path` holds a plain value.
fn is_detached(slots: &IndexMap<KeyPath, Slot>, path: &KeyPath) -> bool {
    let mut ancestor = path.parent();
    while let Some(current) = ancestor {
        if matches!(
            slots.get(&current).map(|slot| &slot.value),
            Some(SlotValue::Leaf(_))
        ) {
            return true;
        }
        ancestor = current.parent();
    }
    false
}

fn assemble(slots: &IndexMap<KeyPath, Slot>, path: &KeyPath) -> Option<Value> {
    match &slots.get(path)?.value {
        SlotValue::Leaf(value) => Some(value.clone()),
        SlotValue::Branch(keys) => {
            let mut map = Map::new();
            for key in keys {
                if let Some(value) = assemble(slots, &path.child(key)) {
                    map.insert(key.clone(), value);
                }
            }
            Some(Value::Object(map))
        }
    }
}

/// Store `value` at an existing `path`, queueing one notification per
/// affected channel.
///
/// Children of an assigned mapping keep their channels; children that are
/// new get one. Children that disappear, or all descendants when a mapping is
/// overwritten by a plain value, are reset to `null`.
fn store(slots: &mut IndexMap<KeyPath, Slot>, path: &KeyPath, value: Value, pending: &mut Pending) {
    let Some(slot) = slots.get_mut(path) else {
        return;
    };
    pending.push((slot.channel.clone(), value.clone()));

    let previous = match &slot.value {
        SlotValue::Branch(keys) => keys.clone(),
        SlotValue::Leaf(_) => Vec::new(),
    };

    match value {
        Value::Object(map) => {
            let keys: Vec<String> = map.keys().cloned().collect();
            slot.value = SlotValue::Branch(keys.clone());

            for (key, child_value) in map {
                let child = path.child(&key);
                if !slots.contains_key(&child) {
                    tracing::debug!(path = %child, "register channel");
                    slots.insert(
                        child.clone(),
                        Slot {
                            value: SlotValue::Leaf(Value::Null),
                            channel: Channel::new(child.clone()),
                        },
                    );
                }
                store(slots, &child, child_value, pending);
            }

            for key in previous.iter().filter(|key| !keys.contains(key)) {
                store(slots, &path.child(key), Value::Null, pending);
            }
        }
        leaf => {
            slot.value = SlotValue::Leaf(leaf);
            for key in &previous {
                store(slots, &path.child(key), Value::Null, pending);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{FnObserver, Observer};
    use parking_lot::Mutex;
    use serde_json::json;

    fn path(raw: &str) -> KeyPath {
        KeyPath::parse(raw).unwrap()
    }

    fn record(model: &ObservableModel, raw: &str, log: &Arc<Mutex<Vec<String>>>) {
        let log = log.clone();
        let observer: Arc<dyn Observer> = Arc::new(FnObserver::new(move |path, value| {
            log.lock().push(format!("{path}={value}"));
            Ok(())
        }));
        model.channel(&path(raw)).unwrap().subscribe(observer);
    }

    #[test]
    fn registers_a_channel_per_key_at_every_depth() {
        let model = ObservableModel::new(json!({
            "title": "Heroes",
            "user": { "name": "A", "rank": { "class": "S" } }
        }))
        .unwrap();

        let paths: Vec<String> = model.paths().iter().map(ToString::to_string).collect();
        assert_eq!(
            paths,
            vec!["title", "user", "user.name", "user.rank", "user.rank.class"]
        );
    }

    #[test]
    fn rejects_non_mapping_roots() {
        let err = ObservableModel::new(json!("plain")).unwrap_err();
        assert!(matches!(err, ModelError::NotAMapping { found: "a string" }));
    }

    #[test]
    fn get_reassembles_nested_mappings() {
        let model = ObservableModel::new(json!({ "user": { "name": "A", "age": 3 } })).unwrap();
        assert_eq!(model.get("user"), Some(json!({ "name": "A", "age": 3 })));
        assert_eq!(model.get("user.age"), Some(json!(3)));
        assert_eq!(model.get("user.missing"), None);
        assert_eq!(model.get("not a path"), None);
    }

    #[test]
    fn set_notifies_only_the_assigned_key() {
        let model = ObservableModel::new(json!({ "a": 1, "b": 2 })).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&model, "a", &log);
        record(&model, "b", &log);

        model.set("a", 10).unwrap();
        assert_eq!(*log.lock(), vec!["a=10"]);
        assert_eq!(model.get("a"), Some(json!(10)));
    }

    #[test]
    fn set_to_same_value_still_notifies() {
        let model = ObservableModel::new(json!({ "a": 1 })).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&model, "a", &log);

        model.set("a", 1).unwrap();
        model.set("a", 1).unwrap();
        assert_eq!(*log.lock(), vec!["a=1", "a=1"]);
    }

    #[test]
    fn set_without_subscribers_succeeds() {
        let model = ObservableModel::new(json!({ "lonely": true })).unwrap();
        model.set("lonely", false).unwrap();
        assert_eq!(model.get("lonely"), Some(json!(false)));
    }

    #[test]
    fn set_unknown_key_fails() {
        let model = ObservableModel::new(json!({ "a": 1 })).unwrap();
        assert!(matches!(
            model.set("b", 1),
            Err(ModelError::UnknownKey { path: p }) if p == path("b")
        ));
        assert!(matches!(
            model.set("1bad", 1),
            Err(ModelError::InvalidKeyPath { .. })
        ));
    }

    #[test]
    fn same_leaf_name_at_different_depths_does_not_collide() {
        let model = ObservableModel::new(json!({
            "name": "top",
            "user": { "name": "nested" }
        }))
        .unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&model, "name", &log);
        record(&model, "user.name", &log);

        model.set("user.name", "B").unwrap();
        assert_eq!(*log.lock(), vec![r#"user.name="B""#]);
        assert_eq!(model.get("name"), Some(json!("top")));
        assert!(!model
            .channel(&path("name"))
            .unwrap()
            .same_channel(&model.channel(&path("user.name")).unwrap()));
    }

    #[test]
    fn assigning_a_mapping_keeps_child_channels() {
        let model = ObservableModel::new(json!({ "user": { "name": "A", "age": 1 } })).unwrap();
        let before = model.channel(&path("user.name")).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&model, "user.name", &log);
        record(&model, "user.age", &log);

        model
            .set("user", json!({ "name": "B", "email": "b@example.com" }))
            .unwrap();

        assert!(before.same_channel(&model.channel(&path("user.name")).unwrap()));
        assert!(model.contains(&path("user.email")));
        assert_eq!(*log.lock(), vec![r#"user.name="B""#, "user.age=null"]);
        assert_eq!(
            model.get("user"),
            Some(json!({ "name": "B", "email": "b@example.com" }))
        );
    }

    #[test]
    fn assigning_a_plain_value_over_a_mapping_resets_descendants() {
        let model = ObservableModel::new(json!({ "user": { "name": "A" } })).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&model, "user", &log);
        record(&model, "user.name", &log);

        model.set("user", "nobody").unwrap();
        assert_eq!(*log.lock(), vec![r#"user="nobody""#, "user.name=null"]);
        assert_eq!(model.get("user"), Some(json!("nobody")));
        assert_eq!(model.get("user.name"), Some(Value::Null));
    }

    #[test]
    fn children_of_a_plain_value_cannot_be_set() {
        let model = ObservableModel::new(json!({ "user": { "name": "A" } })).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&model, "user.name", &log);
        model.set("user", "nobody").unwrap();

        assert!(matches!(
            model.set("user.name", "X"),
            Err(ModelError::UnknownKey { path: p }) if p == path("user.name")
        ));
        assert_eq!(model.get("user"), Some(json!("nobody")));
        assert_eq!(model.get("user.name"), Some(Value::Null));

        // Storing a mapping over the parent attaches the child again
        model.set("user", json!({ "name": "B" })).unwrap();
        model.set("user.name", "C").unwrap();
        assert_eq!(model.get("user"), Some(json!({ "name": "C" })));
        assert_eq!(
            *log.lock(),
            vec!["user.name=null", r#"user.name="B""#, r#"user.name="C""#]
        );
    }

    #[test]
    fn keys_must_be_addressable_by_path() {
        for data in [
            json!({ "first-name": "A" }),
            json!({ "a.b": 1, "a": { "b": 2 } }),
            json!({ "user": { "1st": true } }),
        ] {
            assert!(
                matches!(
                    ObservableModel::new(data.clone()),
                    Err(ModelError::InvalidKey { .. })
                ),
                "{data} should be rejected"
            );
        }

        let model = ObservableModel::new(json!({ "user": { "name": "A" } })).unwrap();
        let err = model
            .set("user", json!({ "name": "B", "last-name": "C" }))
            .unwrap_err();
        assert_eq!(err.to_string(), "`last-name` is not a valid model key");
        // Nothing was stored
        assert_eq!(model.get("user"), Some(json!({ "name": "A" })));
        assert!(!model.paths().iter().any(|p| p.leaf() == "last-name"));
    }

    #[test]
    fn access_tracing_without_a_subscriber_does_not_change_results() {
        for trace_access in [true, false] {
            let config = RuntimeConfig::default().with_trace_access(trace_access);
            let model =
                ObservableModel::with_config(json!({ "user": { "name": "A" } }), config).unwrap();
            model.set("user", json!({ "name": "B", "age": 2 })).unwrap();
            assert_eq!(model.get("user"), Some(json!({ "name": "B", "age": 2 })));
        }
    }

    #[test]
    fn arrays_are_opaque_values() {
        let model = ObservableModel::new(json!({ "tags": [{ "bad-key": 1 }] })).unwrap();
        assert_eq!(model.channel_count(), 1);
        assert_eq!(model.get("tags"), Some(json!([{ "bad-key": 1 }])));
    }

    #[test]
    fn observers_may_set_other_keys() {
        let model = ObservableModel::new(json!({ "celsius": 0, "fahrenheit": 32 })).unwrap();
        let weak = model.downgrade();
        let observer: Arc<dyn Observer> = Arc::new(FnObserver::new(move |_, value| {
            let model = weak.upgrade().expect("model alive");
            let c = value.as_f64().unwrap_or_default();
            model.set("fahrenheit", c * 9.0 / 5.0 + 32.0)
        }));
        model.channel(&path("celsius")).unwrap().subscribe(observer);

        model.set("celsius", 100).unwrap();
        assert_eq!(model.get("fahrenheit"), Some(json!(212.0)));
    }

    #[test]
    fn runaway_reentrant_set_fails_fast() {
        let config = RuntimeConfig::default().with_max_notify_depth(4);
        let model = ObservableModel::with_config(json!({ "n": 0 }), config).unwrap();
        let weak = model.downgrade();
        let observer: Arc<dyn Observer> = Arc::new(FnObserver::new(move |_, value| {
            let model = weak.upgrade().expect("model alive");
            model.set("n", value.as_i64().unwrap_or_default() + 1)
        }));
        model.channel(&path("n")).unwrap().subscribe(observer);

        let err = model.set("n", 1).unwrap_err();
        assert!(matches!(err, ModelError::ReentrancyOverflow { depth: 4, .. }));
        // Every nested set stored its value before the guard tripped
        assert_eq!(model.get("n"), Some(json!(4)));
        assert_eq!(NotifyScope::current_depth(), 0);
    }

    #[test]
    fn weak_model_does_not_keep_model_alive() {
        let model = ObservableModel::new(json!({})).unwrap();
        let weak = model.downgrade();
        assert!(weak.upgrade().is_some());
        drop(model);
        assert!(weak.upgrade().is_none());
    }
}
