//! In-memory node tree.
//!
//! A small [`Node`] implementation for tests and headless hosts. Elements
//! carry a tag, ordered attributes, an input value and children; text nodes
//! carry text. [`MemoryNode::dispatch_input`] plays the role of a user typing
//! into an input.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::node::{InputListener, Node, NodeKind, NodeRef};

/// A node stored entirely in memory.
pub struct MemoryNode {
    kind: NodeKind,
    tag: String,
    state: RwLock<NodeState>,
}

#[derive(Default)]
struct NodeState {
    text: String,
    value: String,
    attributes: IndexMap<String, String>,
    children: Vec<NodeRef>,
    listeners: Vec<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl MemoryNode {
    /// Create an element with the given tag name.
    pub fn element(tag: &str) -> Arc<Self> {
        Arc::new(Self {
            kind: NodeKind::Element,
            tag: tag.to_owned(),
            state: RwLock::new(NodeState::default()),
        })
    }

    /// Create a text node.
    pub fn text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            kind: NodeKind::Text,
            tag: "#text".to_owned(),
            state: RwLock::new(NodeState {
                text: text.to_owned(),
                ..NodeState::default()
            }),
        })
    }

    /// Create a comment node. The scanner skips these.
    pub fn comment(text: &str) -> Arc<Self> {
        Arc::new(Self {
            kind: NodeKind::Other,
            tag: "#comment".to_owned(),
            state: RwLock::new(NodeState {
                text: text.to_owned(),
                ..NodeState::default()
            }),
        })
    }

    /// Set an attribute and return the node, for building trees inline.
    pub fn with_attr(self: Arc<Self>, name: &str, value: &str) -> Arc<Self> {
        self.set_attribute(name, value);
        self
    }

    /// Append a child and return the node, for building trees inline.
    pub fn with_child(self: Arc<Self>, child: Arc<MemoryNode>) -> Arc<Self> {
        self.append(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.state
            .write()
            .attributes
            .insert(name.to_owned(), value.to_owned());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state.read().attributes.get(name).cloned()
    }

    pub fn append(&self, child: Arc<MemoryNode>) {
        self.state.write().children.push(child);
    }

    /// Simulate a user edit: store `value`, then run every input listener.
    pub fn dispatch_input(&self, value: &str) {
        let listeners = {
            let mut state = self.state.write();
            state.value = value.to_owned();
            state.listeners.clone()
        };
        for listener in listeners {
            listener(value);
        }
    }

    /// Number of registered input listeners.
    pub fn listener_count(&self) -> usize {
        self.state.read().listeners.len()
    }

    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        match self.kind {
            NodeKind::Text => self.state.read().text.clone(),
            NodeKind::Element => self.children().iter().map(text_of).collect(),
            NodeKind::Other => String::new(),
        }
    }
}

fn text_of(node: &NodeRef) -> String {
    match node.kind() {
        NodeKind::Text => node.text().unwrap_or_default(),
        NodeKind::Element => node.children().iter().map(text_of).collect(),
        NodeKind::Other => String::new(),
    }
}

impl Node for MemoryNode {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn children(&self) -> Vec<NodeRef> {
        self.state.read().children.clone()
    }

    fn text(&self) -> Option<String> {
        match self.kind {
            NodeKind::Text => Some(self.state.read().text.clone()),
            _ => None,
        }
    }

    fn set_text(&self, text: &str) {
        self.state.write().text = text.to_owned();
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.state
            .read()
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn value(&self) -> Option<String> {
        match self.kind {
            NodeKind::Element => Some(self.state.read().value.clone()),
            _ => None,
        }
    }

    fn set_value(&self, value: &str) {
        self.state.write().value = value.to_owned();
    }

    fn on_input(&self, listener: InputListener) {
        self.state.write().listeners.push(Arc::from(listener));
    }
}

impl Debug for MemoryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryNode")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .field("text", &state.text)
            .field("value", &state.value)
            .field("attributes", &state.attributes)
            .field("children", &state.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn builds_trees_inline() {
        let root = MemoryNode::element("div")
            .with_attr("id", "app")
            .with_child(MemoryNode::text("Hello, "))
            .with_child(MemoryNode::element("b").with_child(MemoryNode::text("world")))
            .with_child(MemoryNode::comment("ignored"));

        assert_eq!(root.tag(), "div");
        assert_eq!(root.attribute("id").as_deref(), Some("app"));
        assert_eq!(root.children().len(), 3);
        assert_eq!(root.text_content(), "Hello, world");
    }

    #[test]
    fn set_value_does_not_fire_listeners() {
        let input = MemoryNode::element("input");
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        input.on_input(Box::new(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        input.set_value("programmatic");
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        input.dispatch_input("typed");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(input.value().as_deref(), Some("typed"));
    }

    #[test]
    fn text_accessors_depend_on_kind() {
        let text = MemoryNode::text("abc");
        let element = MemoryNode::element("p");
        assert_eq!(text.text().as_deref(), Some("abc"));
        assert!(element.text().is_none());
        assert!(text.value().is_none());
        assert_eq!(element.value().as_deref(), Some(""));
    }
}
