//! Mounting a model onto a node tree.

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

use crate::binding::Binding;
use crate::config::RuntimeConfig;
use crate::dom::NodeRef;
use crate::error::{BindError, ModelError};
use crate::reactive::ObservableModel;
use crate::scan::{DirectiveRegistry, TreeScanner};

/// A model bound to the subtree under one mount point.
///
/// Construction wraps the data, scans the tree exactly once and keeps the
/// resulting bindings. Afterwards, [`ViewModel::set`] is all a host needs to
/// keep the tree in sync.
pub struct ViewModel {
    model: ObservableModel,
    root: NodeRef,
    bindings: Vec<Arc<Binding>>,
    errors: Vec<BindError>,
}

impl ViewModel {
    /// Two-way mount: text templates plus the builtin directives.
    pub fn mount(root: NodeRef, data: Value) -> Result<Self, ModelError> {
        Self::mount_with(
            root,
            data,
            RuntimeConfig::default(),
            &DirectiveRegistry::with_builtins(),
        )
    }

    /// One-way mount: text templates only, directive attributes are ignored.
    pub fn mount_one_way(root: NodeRef, data: Value) -> Result<Self, ModelError> {
        Self::mount_with(
            root,
            data,
            RuntimeConfig::default(),
            &DirectiveRegistry::empty(),
        )
    }

    pub fn mount_with(
        root: NodeRef,
        data: Value,
        config: RuntimeConfig,
        directives: &DirectiveRegistry,
    ) -> Result<Self, ModelError> {
        let model = ObservableModel::with_config(data, config)?;
        let report = TreeScanner::new(&model, directives).scan(&root);

        if !report.is_clean() {
            tracing::warn!(skipped = report.errors.len(), "mounted with unbound sites");
        }

        Ok(Self {
            model,
            root,
            bindings: report.bindings,
            errors: report.errors,
        })
    }

    pub fn model(&self) -> &ObservableModel {
        &self.model
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Bindings created by the mount scan, in document order.
    pub fn bindings(&self) -> &[Arc<Binding>] {
        &self.bindings
    }

    /// Binding sites the mount scan skipped.
    pub fn errors(&self) -> &[BindError] {
        &self.errors
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.model.get(path)
    }

    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        self.model.set(path, value)
    }
}

impl Debug for ViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("model", &self.model)
            .field("bindings", &self.bindings.len())
            .field("errors", &self.errors)
            .finish()
    }
}
