//! Directive registry.
//!
//! A directive is an attribute such as `v-model="name"` that links an
//! element's input value to a model key in both directions. The scanner
//! handles the model → node direction through a directive [`Binding`]; the
//! directive's handler wires the node → model direction.
//!
//! Attribute names map to handlers through an explicit table. Nothing is
//! looked up by building identifiers out of attribute spellings at runtime.
//!
//! [`Binding`]: crate::binding::Binding

use std::fmt::Debug;

use indexmap::IndexMap;
use serde_json::Value;

use crate::dom::NodeRef;
use crate::reactive::{KeyPath, ObservableModel};

/// Attaches the node → model half of a directive.
pub type DirectiveHandler = fn(&NodeRef, &KeyPath, &ObservableModel);

/// One registry entry.
#[derive(Clone, Copy)]
pub struct Directive {
    /// Attribute spelling as it appears in the tree.
    pub attribute: &'static str,
    /// Stable identifier of the handler, for diagnostics.
    pub handler_name: &'static str,
    pub handler: DirectiveHandler,
}

impl Debug for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directive")
            .field("attribute", &self.attribute)
            .field("handler_name", &self.handler_name)
            .finish()
    }
}

/// Directives every two-way mount understands.
pub const BUILTIN_DIRECTIVES: &[Directive] = &[Directive {
    attribute: "v-model",
    handler_name: "bind_v_model",
    handler: bind_v_model,
}];

/// Maps attribute names to directive handlers.
#[derive(Debug, Clone, Default)]
pub struct DirectiveRegistry {
    directives: IndexMap<&'static str, Directive>,
}

impl DirectiveRegistry {
    /// A registry that recognizes nothing; scanning with it binds text only.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding [`BUILTIN_DIRECTIVES`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for directive in BUILTIN_DIRECTIVES {
            registry.register(*directive);
        }
        registry
    }

    /// Add or replace a directive. Returns the entry it replaced, if any.
    pub fn register(&mut self, directive: Directive) -> Option<Directive> {
        tracing::debug!(
            attribute = directive.attribute,
            handler = directive.handler_name,
            "register directive"
        );
        self.directives.insert(directive.attribute, directive)
    }

    pub fn lookup(&self, attribute: &str) -> Option<&Directive> {
        self.directives.get(attribute)
    }

    pub fn is_directive(&self, attribute: &str) -> bool {
        self.directives.contains_key(attribute)
    }

    /// Handler identifier registered for `attribute`.
    pub fn handler_name(&self, attribute: &str) -> Option<&'static str> {
        self.lookup(attribute).map(|directive| directive.handler_name)
    }

    /// Registered attribute names in registration order.
    pub fn attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.directives.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// `v-model`: every user edit of the node writes the new text into `path`.
///
/// The listener only holds a weak model handle; edits arriving after the
/// model is gone are dropped.
pub fn bind_v_model(node: &NodeRef, path: &KeyPath, model: &ObservableModel) {
    let model = model.downgrade();
    let path = path.clone();

    node.on_input(Box::new(move |input| {
        let Some(model) = model.upgrade() else {
            tracing::debug!(path = %path, "input ignored, model dropped");
            return;
        };
        if let Err(error) = model.set_path(&path, Value::String(input.to_owned())) {
            tracing::error!(path = %path, %error, "failed to write input into model");
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryNode, Node};
    use serde_json::json;

    fn noop(_: &NodeRef, _: &KeyPath, _: &ObservableModel) {}

    #[test]
    fn builtins_hold_exactly_v_model() {
        let registry = DirectiveRegistry::with_builtins();
        assert_eq!(registry.len(), 1);
        assert!(registry.is_directive("v-model"));
        assert!(!registry.is_directive("v-bind"));
        assert_eq!(registry.handler_name("v-model"), Some("bind_v_model"));
    }

    #[test]
    fn empty_registry_recognizes_nothing() {
        let registry = DirectiveRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.lookup("v-model").is_none());
    }

    #[test]
    fn register_replaces_by_attribute() {
        let mut registry = DirectiveRegistry::with_builtins();
        let replaced = registry.register(Directive {
            attribute: "v-model",
            handler_name: "noop",
            handler: noop,
        });
        assert_eq!(replaced.map(|d| d.handler_name), Some("bind_v_model"));

        registry.register(Directive {
            attribute: "x-sync",
            handler_name: "noop",
            handler: noop,
        });
        assert_eq!(registry.attributes().collect::<Vec<_>>(), vec!["v-model", "x-sync"]);
    }

    #[test]
    fn v_model_writes_input_into_model() {
        let model = ObservableModel::new(json!({ "name": "Saitama" })).unwrap();
        let input = MemoryNode::element("input");
        let node: NodeRef = input.clone();

        bind_v_model(&node, &KeyPath::parse("name").unwrap(), &model);
        input.dispatch_input("Genos");
        assert_eq!(model.get("name"), Some(json!("Genos")));
    }

    #[test]
    fn v_model_listener_ignores_dropped_model() {
        let model = ObservableModel::new(json!({ "name": "Saitama" })).unwrap();
        let input = MemoryNode::element("input");
        let node: NodeRef = input.clone();

        bind_v_model(&node, &KeyPath::parse("name").unwrap(), &model);
        drop(model);
        input.dispatch_input("Genos");
        assert_eq!(input.listener_count(), 1);
    }

    #[test]
    fn v_model_listener_survives_a_rejected_write() {
        let model = ObservableModel::new(json!({ "user": { "name": "A" } })).unwrap();
        let input = MemoryNode::element("input");
        let node: NodeRef = input.clone();
        bind_v_model(&node, &KeyPath::parse("user.name").unwrap(), &model);

        // The parent now holds a plain value, so the write is refused and logged
        model.set("user", "nobody").unwrap();
        input.dispatch_input("B");
        assert_eq!(model.get("user"), Some(json!("nobody")));
        assert_eq!(input.value().as_deref(), Some("B"));

        model.set("user", json!({ "name": "A" })).unwrap();
        input.dispatch_input("C");
        assert_eq!(model.get("user.name"), Some(json!("C")));
        assert_eq!(input.listener_count(), 1);
    }
}
