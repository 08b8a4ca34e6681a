//! Host Node Tree
//!
//! The runtime does not own a document. It talks to whatever tree the host
//! provides through the [`Node`] trait: child enumeration, text get/set on
//! text nodes, attribute enumeration on elements, and a reciprocal value with
//! input notifications on input-like elements.
//!
//! [`MemoryNode`] is a complete in-memory implementation, used by the tests
//! and usable by hosts without a real document.

mod memory;
mod node;

pub use memory::MemoryNode;
pub use node::{InputListener, Node, NodeKind, NodeRef};
