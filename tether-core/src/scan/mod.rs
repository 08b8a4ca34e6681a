//! Tree Scanning
//!
//! Discovery of binding sites in a host tree:
//!
//! - text nodes containing `{{path}}` tokens become text bindings;
//! - element attributes listed in a [`DirectiveRegistry`] become directive
//!   bindings, with the directive's handler wiring user input back into the
//!   model.

mod directive;
mod scanner;

pub use directive::{bind_v_model, Directive, DirectiveHandler, DirectiveRegistry, BUILTIN_DIRECTIVES};
pub use scanner::{ScanReport, TreeScanner};
