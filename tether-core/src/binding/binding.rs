//! Bindings between model keys and host nodes.

use std::fmt::Debug;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use super::display_value;
use super::template::Template;
use crate::dom::NodeRef;
use crate::error::ModelError;
use crate::reactive::{KeyPath, Observer, ObserverId};

/// Which update strategy a binding uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Re-renders a text template into the node's text.
    Text,
    /// Writes one key into the node's input value.
    Directive,
}

enum UpdateStrategy {
    Text {
        template: Template,
        /// Last known value per key; lets one key change while the others
        /// keep rendering.
        cache: RwLock<IndexMap<KeyPath, Value>>,
    },
    Directive {
        path: KeyPath,
    },
}

/// One discovered binding site.
///
/// A binding references exactly one host node, which it does not own, and
/// knows how to re-render that node when any of its keys change.
pub struct Binding {
    id: ObserverId,
    node: NodeRef,
    strategy: UpdateStrategy,
}

impl Binding {
    /// A binding that renders `template` into `node`'s text.
    pub fn text(node: NodeRef, template: Template) -> Self {
        Self {
            id: ObserverId::new(),
            node,
            strategy: UpdateStrategy::Text {
                template,
                cache: RwLock::new(IndexMap::new()),
            },
        }
    }

    /// A binding that mirrors `path` into `node`'s input value.
    pub fn directive(node: NodeRef, path: KeyPath) -> Self {
        Self {
            id: ObserverId::new(),
            node,
            strategy: UpdateStrategy::Directive { path },
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn kind(&self) -> BindingKind {
        match self.strategy {
            UpdateStrategy::Text { .. } => BindingKind::Text,
            UpdateStrategy::Directive { .. } => BindingKind::Directive,
        }
    }

    /// The text template, for text bindings.
    pub fn template(&self) -> Option<&Template> {
        match &self.strategy {
            UpdateStrategy::Text { template, .. } => Some(template),
            UpdateStrategy::Directive { .. } => None,
        }
    }

    /// Keys this binding depends on, in order of first appearance.
    pub fn dependencies(&self) -> Vec<KeyPath> {
        match &self.strategy {
            UpdateStrategy::Text { template, .. } => template.keys(),
            UpdateStrategy::Directive { path } => vec![path.clone()],
        }
    }

    /// Record a value in the cache without touching the node.
    ///
    /// Used to load the initial values of every key before the first render.
    pub(crate) fn seed(&self, path: &KeyPath, value: Value) {
        if let UpdateStrategy::Text { cache, .. } = &self.strategy {
            cache.write().insert(path.clone(), value);
        }
    }

    /// The text this binding currently renders; `None` for directives.
    ///
    /// Keys without a cached value render as the empty string.
    pub fn render(&self) -> Option<String> {
        match &self.strategy {
            UpdateStrategy::Text { template, cache } => {
                let cache = cache.read();
                Some(template.render(|path| {
                    cache.get(path).map(display_value).unwrap_or_default()
                }))
            }
            UpdateStrategy::Directive { .. } => None,
        }
    }

    /// Run the update strategy for a new value of `path`.
    pub fn apply(&self, path: &KeyPath, value: &Value) {
        match &self.strategy {
            UpdateStrategy::Text { template, cache } => {
                let rendered = {
                    let mut cache = cache.write();
                    cache.insert(path.clone(), value.clone());
                    template.render(|key| cache.get(key).map(display_value).unwrap_or_default())
                };
                tracing::trace!(binding = %self.id, path = %path, text = %rendered, "update text");
                self.node.set_text(&rendered);
            }
            UpdateStrategy::Directive { .. } => {
                let rendered = display_value(value);
                tracing::trace!(binding = %self.id, path = %path, value = %rendered, "update input");
                self.node.set_value(&rendered);
            }
        }
    }
}

impl Observer for Binding {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn update(&self, path: &KeyPath, value: &Value) -> Result<(), ModelError> {
        self.apply(path, value);
        Ok(())
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("dependencies", &self.dependencies())
            .finish()
    }
}
