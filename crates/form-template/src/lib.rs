//! Form Template - fill PDF forms from templates stored in field tooltips
//!
//! This crate provides:
//! - Field discovery: widget annotations become a registry of named fields
//! - Template compilation of each field's tooltip (`TU`) text
//! - Rendering against a JSON data context, with form-oriented filters
//!   (`date`, `check`, `X`, `Y`, `paste`)
//! - Filling through an external engine (pdftk) and composing overlays and
//!   attachment pages onto the result
//!
//! # Example
//!
//! ```ignore
//! use form_template::{FormTemplate, Pdftk};
//!
//! let form = FormTemplate::open("form.pdf")?;
//! let data: serde_json::Map<_, _> = serde_json::from_str(r#"{"name": "Jane"}"#)?;
//! let mut output = form.render(&data, &[], None, &Pdftk::default())?;
//! output.save("filled.pdf")?;
//! ```

mod compose;
mod environment;
pub mod fdf;
mod fill;
pub mod filters;
mod form;
mod registry;
mod renderer;
mod schema;
mod session;

pub use compose::compose;
pub use environment::{CompiledTemplate, TemplateEnv};
pub use fill::{FormFiller, Pdftk};
pub use form::FormTemplate;
pub use registry::{Field, FieldRegistry};
pub use renderer::{render, RenderOutput, RenderedValues};
pub use schema::AttachmentSpec;
pub use session::{Overlay, RenderSession};

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to decode template of field '{field}': {reason}")]
    DecodeError { field: String, reason: String },

    #[error("Failed to compile template of field '{field}': {source}")]
    CompileError {
        field: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Render error: {0}")]
    RenderError(#[from] minijinja::Error),

    #[error("Fill engine error: {0}")]
    FillError(String),

    #[error("Attachment error: {0}")]
    AttachmentError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
