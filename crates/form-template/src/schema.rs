//! JSON description of attachment pages

use crate::{Result, TemplateError};
use pdf_core::{Attachment, LabelFont};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of the `attachments` list
///
/// ```json
/// { "data": "scan.png", "dimensions": [0, 0, 595, 842], "text": "Exhibit A", "font": "DejaVuSans.ttf" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSpec {
    /// Path of the image file
    pub data: PathBuf,
    /// `[x, y, width, height]` in points; the image's pixel extent when absent
    #[serde(default)]
    pub dimensions: Option<[f64; 4]>,
    /// Caption drawn in the lower-left corner
    #[serde(default)]
    pub text: Option<String>,
    /// TrueType font for the caption
    #[serde(default)]
    pub font: Option<PathBuf>,
}

impl AttachmentSpec {
    /// Parse the value of an `attachments` key
    pub fn parse_list(value: serde_json::Value) -> Result<Vec<Self>> {
        Ok(serde_json::from_value(value)?)
    }

    /// Read the image and rasterize the caption
    ///
    /// The caption uses this entry's font, falling back to `default_font`.
    pub fn load(&self, default_font: Option<&Path>) -> Result<Attachment> {
        let data = fs::read(&self.data).map_err(|e| {
            TemplateError::AttachmentError(format!("cannot read {}: {e}", self.data.display()))
        })?;
        let attachment = Attachment::new(&data, self.dimensions)?;

        let Some(text) = &self.text else {
            return Ok(attachment);
        };

        let font_path = self.font.as_deref().or(default_font).ok_or_else(|| {
            TemplateError::AttachmentError(format!(
                "caption of {} needs a font",
                self.data.display()
            ))
        })?;
        let font = LabelFont::from_file(font_path)?;

        Ok(attachment.with_caption(text, &font)?)
    }
}
