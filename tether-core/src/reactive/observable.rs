//! Typed handles to a single model key.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::channel::Channel;
use super::model::ObservableModel;
use super::subscriber::Observer;
use super::KeyPath;
use crate::error::ModelError;

/// A typed view of one key path of an [`ObservableModel`].
///
/// Values are converted through serde on every access; the model itself
/// keeps storing plain values.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tether_core::reactive::ObservableModel;
///
/// let model = ObservableModel::new(json!({ "count": 1 }))?;
/// let count = model.observable::<u32>("count")?;
/// count.set(count.get()? + 1)?;
/// assert_eq!(count.get()?, 2);
/// # Ok::<(), tether_core::ModelError>(())
/// ```
pub struct Observable<T> {
    pub(super) model: ObservableModel,
    pub(super) path: KeyPath,
    pub(super) _marker: PhantomData<fn() -> T>,
}

impl<T> Observable<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Read and decode the current value.
    pub fn get(&self) -> Result<T, ModelError> {
        let value = self
            .model
            .get_path(&self.path)
            .ok_or_else(|| ModelError::UnknownKey {
                path: self.path.clone(),
            })?;
        serde_json::from_value(value).map_err(|source| ModelError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Encode and assign a new value, notifying the key's channel.
    pub fn set(&self, value: T) -> Result<(), ModelError> {
        let value = serde_json::to_value(value).map_err(ModelError::Encode)?;
        self.model.set_path(&self.path, value)
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F) -> Result<(), ModelError>
    where
        F: FnOnce(T) -> T,
    {
        let next = f(self.get()?);
        self.set(next)
    }

    /// The key path this handle points at.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// The channel behind this key.
    pub fn channel(&self) -> Result<Channel, ModelError> {
        self.model
            .channel(&self.path)
            .ok_or_else(|| ModelError::UnknownKey {
                path: self.path.clone(),
            })
    }

    /// Subscribe an observer to this key.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> Result<(), ModelError> {
        self.channel()?.subscribe(observer);
        Ok(())
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("path", &self.path)
            .field("value", &self.model.get_path(&self.path))
            .finish()
    }
}
