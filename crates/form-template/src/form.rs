//! A PDF form whose fields carry their own templates

use crate::renderer::{self, RenderOutput};
use crate::{compose, FieldRegistry, FormFiller, Result, TemplateEnv};
use pdf_core::{scan_widgets, Attachment, PdfDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A form loaded and ready to be filled any number of times
///
/// The source file is scanned once; every call to [`render`](Self::render)
/// starts a fresh render pass and never modifies the source.
pub struct FormTemplate {
    source: PathBuf,
    env: TemplateEnv,
    fields: FieldRegistry,
}

impl FormTemplate {
    /// Load `path` and compile the tooltip template of every field
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let bytes = fs::read(&source)?;
        let doc = PdfDocument::open_from_bytes(&bytes)?;

        let mut env = TemplateEnv::new();
        let fields = FieldRegistry::scan(scan_widgets(doc.inner())?, &mut env);
        debug!(source = %source.display(), fields = fields.len(), "form loaded");

        Ok(Self {
            source,
            env,
            fields,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Render field values and `paste` overlays without filling
    pub fn render_fields(&self, data: &serde_json::Map<String, serde_json::Value>) -> RenderOutput {
        renderer::render(&self.fields, &self.env, data)
    }

    /// Fill the form with `data` and compose the output document
    ///
    /// `pages` selects (and orders) the output pages; attachments are
    /// appended after them, one page each.
    pub fn render(
        &self,
        data: &serde_json::Map<String, serde_json::Value>,
        attachments: &[Attachment],
        pages: Option<&[usize]>,
        filler: &dyn FormFiller,
    ) -> Result<PdfDocument> {
        let RenderOutput { values, overlays } = self.render_fields(data);
        let filled = filler.fill(&self.source, &values)?;
        compose(&filled, &overlays, attachments, pages)
    }
}
