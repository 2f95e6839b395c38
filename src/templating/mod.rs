//! Tera templating for template pack files.
//!
//! Pack files marked `isTemplate` are rendered with [Tera](https://keats.github.io/tera/)
//! against a [`TemplateContext`] built from the project configuration. Descriptor
//! paths are templates too, so a file can land under the project's package
//! directory:
//!
//! ```text
//! src/test/java/{{ packagePath }}/base/BaseTest.java.hbs
//!   -> src/test/java/com/shoptests/base/BaseTest.java
//! ```
//!
//! # Template Context
//!
//! See [`context`] for the full variable table. The configuration fields are
//! available by their camelCase names (`projectName`, `utilities.logger`, ...).
//!
//! # Foreign Syntax
//!
//! CI/CD pipeline files keep their own interpolation (`${{ secrets.TOKEN }}`,
//! `${BUILD_ID}`, `<< parameters.image >>`) and any span wrapped in
//! `{{raw}}...{{/raw}}` or `{{{{raw}}}}...{{{{/raw}}}}` is emitted byte for byte. See
//! [`masking`].
//!
//! # Examples
//!
//! ```markdown
//! # {{ projectName }}
//!
//! {% if utilities.logger %}Logging is configured in `src/test/resources/log4j2.xml`.{% endif %}
//!
//! | Tool | Version |
//! |------|---------|
//! {% for tool, version in toolVersions %}| {{ tool }} | {{ version }} |
//! {% endfor %}
//! ```
//!
//! Autoescaping is disabled: templates produce source code, not HTML.

pub mod context;
pub mod error;
pub mod masking;
pub mod renderer;

pub use context::{TemplateContext, namespace, sanitize_path};
pub use error::TemplateError;
pub use masking::{MaskedTemplate, PipelineKind, classify_pipeline, mask};
pub use renderer::TemplateRenderer;
