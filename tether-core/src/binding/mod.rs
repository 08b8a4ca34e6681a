//! Bindings and Update Strategies
//!
//! A [`Binding`] ties one host node to the model keys it displays. Two
//! strategies exist:
//!
//! - **Text**: the node's original text is kept as a [`Template`]. On every
//!   notification the binding caches the new value, then rebuilds the whole
//!   string from the template and the cache, so keys it was not notified
//!   about keep their last value.
//! - **Directive**: the node's input value mirrors a single key.

#[allow(clippy::module_inception)]
mod binding;
mod template;

pub use binding::{Binding, BindingKind};
pub use template::{Segment, Template};

use serde_json::Value;

/// Text form of a model value.
///
/// Strings render without quotes and `null` renders empty; anything else
/// renders as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
