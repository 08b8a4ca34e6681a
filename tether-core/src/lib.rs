//! Tether Core
//!
//! This crate provides the core runtime for the Tether reactive data-binding
//! library. It implements:
//!
//! - An observable model with one channel per key path
//! - Text bindings that re-render `{{key}}` templates
//! - Two-way directive bindings (`v-model`) between inputs and the model
//! - A one-time scanner that discovers binding sites in a host node tree
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: observable model, channels and observers
//! - `binding`: templates and the text/directive update strategies
//! - `scan`: tree scanner and directive registry
//! - `dom`: the node-tree interface plus an in-memory implementation
//! - `view`: mounting a model onto a tree
//!
//! Data flows one way at runtime: `set` → channel → bindings → nodes.
//! Directive handlers close the loop for user input by calling `set`.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tether_core::dom::{MemoryNode, Node, NodeRef};
//! use tether_core::ViewModel;
//!
//! let greeting = MemoryNode::text("Hello, {{name}}!");
//! let input = MemoryNode::element("input").with_attr("v-model", "name");
//! let app = MemoryNode::element("div")
//!     .with_child(greeting.clone())
//!     .with_child(input.clone());
//!
//! let root: NodeRef = app;
//! let view = ViewModel::mount(root, json!({ "name": "Saitama" }))?;
//! assert_eq!(greeting.text().as_deref(), Some("Hello, Saitama!"));
//!
//! // User types into the input
//! input.dispatch_input("Genos");
//! assert_eq!(view.get("name"), Some(json!("Genos")));
//! assert_eq!(greeting.text().as_deref(), Some("Hello, Genos!"));
//! # Ok::<(), tether_core::ModelError>(())
//! ```

pub mod binding;
pub mod config;
pub mod dom;
pub mod error;
pub mod reactive;
pub mod scan;
pub mod view;

pub use config::{MissingKeyPolicy, RuntimeConfig};
pub use error::{BindError, BindSite, ConfigError, ModelError};
pub use view::ViewModel;
