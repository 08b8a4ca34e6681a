//! Error types.
//!
//! Errors are split by when they surface:
//!
//! - [`BindError`] is produced while scanning a node tree. Each one belongs to a
//!   single binding site; the scanner records it and moves on.
//! - [`ModelError`] is produced at runtime by [`ObservableModel::set`] and the
//!   typed [`Observable`] handles, and is returned to the caller.
//! - [`ConfigError`] covers loading and validating a [`RuntimeConfig`].
//!
//! [`ObservableModel::set`]: crate::reactive::ObservableModel::set
//! [`Observable`]: crate::reactive::Observable
//! [`RuntimeConfig`]: crate::config::RuntimeConfig

use std::fmt;

use thiserror::Error;

use crate::reactive::KeyPath;

/// Where in the node tree a binding was discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindSite {
    /// A `{{...}}` placeholder inside a text node.
    Text,
    /// A directive attribute on an element, e.g. `v-model`.
    Directive(String),
}

impl fmt::Display for BindSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text template"),
            Self::Directive(attribute) => write!(f, "directive `{attribute}`"),
        }
    }
}

/// A binding site that could not be wired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The site references a key the model does not have.
    #[error("{site} references unknown key `{path}`")]
    MissingKey { path: KeyPath, site: BindSite },

    /// A text node mixes valid tokens with unbalanced `{{` / `}}` delimiters.
    #[error("malformed template {template:?} at byte {offset}: {reason}")]
    MalformedTemplate {
        template: String,
        offset: usize,
        reason: &'static str,
    },

    /// A directive value is not a dotted identifier path.
    #[error("`{raw}` is not a valid key path")]
    InvalidKeyPath { raw: String },
}

/// Failure of a runtime model operation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The root passed to the model was not a mapping.
    #[error("model data must be a mapping, got {found}")]
    NotAMapping { found: &'static str },

    /// A mapping key is not an identifier, so no dotted path could reach it.
    #[error("`{key}` is not a valid model key")]
    InvalidKey { key: String },

    /// The key path has no registered channel, or an ancestor of it holds a
    /// plain value.
    #[error("unknown key `{path}`")]
    UnknownKey { path: KeyPath },

    /// A string passed as a key path is not a dotted identifier path.
    #[error("`{raw}` is not a valid key path")]
    InvalidKeyPath { raw: String },

    /// Too many `set` calls are nested inside each other's notifications.
    #[error("re-entrant update of `{path}` exceeded notification depth {depth}")]
    ReentrancyOverflow { path: KeyPath, depth: usize },

    /// An observer refused an update.
    #[error("observer rejected update of `{path}`: {reason}")]
    Rejected { path: KeyPath, reason: String },

    /// A stored value could not be converted into the requested type.
    #[error("value at `{path}` has an unexpected shape")]
    Decode {
        path: KeyPath,
        #[source]
        source: serde_json::Error,
    },

    /// A typed value could not be converted into a model value.
    #[error("value could not be encoded")]
    Encode(#[source] serde_json::Error),
}

/// Invalid runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a mapping",
    }
}
