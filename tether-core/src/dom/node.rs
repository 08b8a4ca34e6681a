//! The node-tree interface the runtime binds against.

use std::sync::Arc;

/// Shared handle to a node of the host tree.
pub type NodeRef = Arc<dyn Node>;

/// Callback invoked with the new value when a user edits an input node.
pub type InputListener = Box<dyn Fn(&str) + Send + Sync>;

/// Broad node categories the scanner distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A leaf holding text; may contain `{{...}}` placeholders.
    Text,
    /// A structural node with attributes and children.
    Element,
    /// Anything else (comments, processing instructions, ...). Ignored.
    Other,
}

/// A node of a host document tree.
///
/// The runtime never creates or removes nodes. It reads the tree once while
/// scanning and afterwards only writes text and input values.
pub trait Node: Send + Sync {
    fn kind(&self) -> NodeKind;

    /// Child nodes in document order.
    fn children(&self) -> Vec<NodeRef>;

    /// Text content of a text node; `None` for other kinds.
    fn text(&self) -> Option<String>;

    fn set_text(&self, text: &str);

    /// Attribute name/value pairs in document order.
    fn attributes(&self) -> Vec<(String, String)>;

    /// Current value of an input-like element.
    fn value(&self) -> Option<String>;

    /// Assign the input value. Must not fire input listeners.
    fn set_value(&self, value: &str);

    /// Register a listener for user edits of this node's value.
    fn on_input(&self, listener: InputListener);
}
