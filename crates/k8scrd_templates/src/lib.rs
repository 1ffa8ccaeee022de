//! # k8scrd_templates
//!
//! Placeholder template rendering for k8scrd resource documents.
//!
//! Resource templates are plain text (usually YAML manifests) with Go
//! `text/template` style placeholders resolved from a flat string map.
//! Compilation and execution are separate steps so that malformed templates
//! and missing attributes are reported as distinct errors.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use k8scrd_templates::TemplateRenderer;
//!
//! let renderer = TemplateRenderer::new();
//! let mut attributes = BTreeMap::new();
//! attributes.insert("name".to_string(), "alpha".to_string());
//!
//! let document = renderer
//!     .render("kind: Widget\nname: {{.name}}\n", Some(&attributes))
//!     .unwrap();
//! assert_eq!(document, "kind: Widget\nname: alpha\n");
//! ```

pub mod error;
pub mod renderer;

pub use error::{TemplateError, TemplateResult};
pub use renderer::{CompiledTemplate, TemplateRenderer, DEFAULT_TEMPLATE_NAME};
