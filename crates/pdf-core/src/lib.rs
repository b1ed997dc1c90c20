//! PDF Core - PDF structure access for form filling
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Discovering widget annotations (form fields) per page
//! - Building single-page image fragments (overlays, attachments)
//! - Merging fragments onto pages, selecting pages, appending pages
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Attachment, PdfDocument};
//!
//! let mut doc = PdfDocument::open("filled.pdf")?;
//! let stamp = Attachment::new(&std::fs::read("stamp.png")?, Some([50.0, 50.0, 120.0, 40.0]))?;
//! doc.merge_fragment(0, &stamp.to_fragment())?;
//! doc.save("stamped.pdf")?;
//! ```

mod annotation;
mod attachment;
mod document;
mod fragment;
mod image;
mod label;

pub use annotation::{decode_text_string, scan_widgets, FieldType, WidgetAnnotation};
pub use attachment::{Attachment, LABEL_FONT_SIZE, LABEL_X, LABEL_Y};
pub use document::{PageSize, PdfDocument};
pub use fragment::{ImagePlacement, PageFragment};
pub use image::ImageXObject;
pub use label::LabelFont;

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page index: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("Widget on page {0} has no name and no named parent")]
    MissingFieldName(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Numeric value of an integer or real object
pub(crate) fn number(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Annotation rectangle `(x0, y0, x1, y1)` in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Placement box as `[x, y, width, height]`
    pub fn to_dimensions(&self) -> [f64; 4] {
        [self.x0, self.y0, self.width(), self.height()]
    }
}
