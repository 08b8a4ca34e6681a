//! Tree scanner.
//!
//! The scanner is the only part of the runtime that reads the host tree. It
//! walks the tree once, depth-first in document order, and turns every
//! binding site it finds into a [`Binding`] subscribed to the right
//! channels. After the scan, updates flow through channels only.
//!
//! Scanning the same subtree twice creates duplicate bindings, each firing
//! on every update.

use std::sync::Arc;

use super::directive::{Directive, DirectiveRegistry};
use crate::binding::{Binding, Template};
use crate::config::MissingKeyPolicy;
use crate::dom::{NodeKind, NodeRef};
use crate::error::{BindError, BindSite};
use crate::reactive::{KeyPath, ObservableModel};

/// Outcome of a scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Bindings created, in document order.
    pub bindings: Vec<Arc<Binding>>,
    /// Binding sites that were skipped, in document order.
    pub errors: Vec<BindError>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Discovers binding sites in a node tree and wires them to a model.
#[derive(Debug)]
pub struct TreeScanner<'a> {
    model: &'a ObservableModel,
    directives: &'a DirectiveRegistry,
}

impl<'a> TreeScanner<'a> {
    pub fn new(model: &'a ObservableModel, directives: &'a DirectiveRegistry) -> Self {
        Self { model, directives }
    }

    /// Bind every descendant of `root`.
    ///
    /// `root` itself is the mount point: its own text and attributes are not
    /// inspected. A site that fails to bind is recorded in the report and
    /// skipped; the rest of the tree is still bound.
    pub fn scan(&self, root: &NodeRef) -> ScanReport {
        let mut report = ScanReport::default();
        self.visit(root, &mut report);
        tracing::debug!(
            bindings = report.bindings.len(),
            errors = report.errors.len(),
            "scan finished"
        );
        report
    }

    fn visit(&self, node: &NodeRef, report: &mut ScanReport) {
        for child in node.children() {
            match child.kind() {
                NodeKind::Text => {
                    let outcome = self.bind_text(&child);
                    record(report, outcome.transpose());
                }
                NodeKind::Element => {
                    for (name, value) in child.attributes() {
                        if let Some(directive) = self.directives.lookup(&name) {
                            record(report, Some(self.bind_directive(&child, directive, &value)));
                        }
                    }
                    self.visit(&child, report);
                }
                NodeKind::Other => {}
            }
        }
    }

    /// Bind a text node if it contains at least one token.
    fn bind_text(&self, node: &NodeRef) -> Result<Option<Arc<Binding>>, BindError> {
        let Some(text) = node.text() else {
            return Ok(None);
        };
        let template = Template::parse(&text)?;
        if !template.has_tokens() {
            return Ok(None);
        }

        let mut channels = Vec::new();
        for key in template.keys() {
            match self.model.channel(&key) {
                Some(channel) => channels.push((key, channel)),
                None => match self.model.config().missing_keys {
                    MissingKeyPolicy::Skip => {
                        return Err(BindError::MissingKey {
                            path: key,
                            site: BindSite::Text,
                        })
                    }
                    MissingKeyPolicy::Empty => {
                        tracing::warn!(path = %key, template = %text, "unknown key renders empty");
                    }
                },
            }
        }

        let binding = Arc::new(Binding::text(node.clone(), template));
        for (key, _) in &channels {
            if let Some(value) = self.model.get_path(key) {
                binding.seed(key, value);
            }
        }
        if let Some(rendered) = binding.render() {
            node.set_text(&rendered);
        }
        for (_, channel) in &channels {
            channel.subscribe(binding.clone());
        }

        tracing::debug!(binding = %binding.id(), template = %text, "bound text");
        Ok(Some(binding))
    }

    /// Bind one directive attribute of an element.
    fn bind_directive(
        &self,
        node: &NodeRef,
        directive: &Directive,
        raw: &str,
    ) -> Result<Arc<Binding>, BindError> {
        let path = KeyPath::parse(raw)?;
        let Some(channel) = self.model.channel(&path) else {
            return Err(BindError::MissingKey {
                path,
                site: BindSite::Directive(directive.attribute.to_owned()),
            });
        };

        let binding = Arc::new(Binding::directive(node.clone(), path.clone()));
        channel.subscribe(binding.clone());

        // Initial sync, model → node.
        let current = self.model.get_path(&path).unwrap_or_default();
        binding.apply(&path, &current);

        // Reverse direction, node → model.
        (directive.handler)(node, &path, self.model);

        tracing::debug!(
            binding = %binding.id(),
            directive = directive.attribute,
            path = %path,
            "bound directive"
        );
        Ok(binding)
    }
}

fn record(report: &mut ScanReport, outcome: Option<Result<Arc<Binding>, BindError>>) {
    match outcome {
        Some(Ok(binding)) => report.bindings.push(binding),
        Some(Err(error)) => {
            tracing::warn!(%error, "skipping binding site");
            report.errors.push(error);
        }
        None => {}
    }
}
