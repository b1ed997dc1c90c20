//! Images placed on a page, optionally with a caption label

use crate::image::ImageXObject;
use crate::label::LabelFont;
use crate::{PageFragment, Result};
use std::sync::Arc;

/// Caption origin from the page's lower-left corner, in points
pub const LABEL_X: f64 = 8.0;
pub const LABEL_Y: f64 = 8.0;

/// Caption em size in pixels
pub const LABEL_FONT_SIZE: f32 = 12.0;

/// An image bound to a target box, with an optional rasterized caption
///
/// Used both for `paste` overlays (box = field rectangle) and for pages
/// appended after the form.
#[derive(Debug, Clone)]
pub struct Attachment {
    image: Arc<ImageXObject>,
    /// `[x, y, width, height]` in points
    dimensions: [f64; 4],
    label: Option<Arc<ImageXObject>>,
}

impl Attachment {
    /// Decode `data`; the box defaults to the image's pixel extent at the origin
    pub fn new(data: &[u8], dimensions: Option<[f64; 4]>) -> Result<Self> {
        let image = ImageXObject::from_encoded(data)?;
        let dimensions =
            dimensions.unwrap_or([0.0, 0.0, image.width as f64, image.height as f64]);

        Ok(Self {
            image: Arc::new(image),
            dimensions,
            label: None,
        })
    }

    /// Add a caption rendered with `font`
    pub fn with_caption(mut self, text: &str, font: &LabelFont) -> Result<Self> {
        self.label = match font.render_label(text, LABEL_FONT_SIZE) {
            Some(raster) => Some(Arc::new(ImageXObject::from_rgb(&raster)?)),
            None => None,
        };
        Ok(self)
    }

    pub fn dimensions(&self) -> [f64; 4] {
        self.dimensions
    }

    pub fn has_label(&self) -> bool {
        self.label.is_some()
    }

    /// Build the page drawing: image first, caption on top
    pub fn to_fragment(&self) -> PageFragment {
        let [x, y, width, height] = self.dimensions;
        let mut fragment = PageFragment::new();
        fragment.draw_image(Arc::clone(&self.image), x, y, width, height);

        if let Some(label) = &self.label {
            fragment.draw_image(
                Arc::clone(label),
                LABEL_X,
                LABEL_Y,
                label.width as f64,
                label.height as f64,
            );
        }

        fragment
    }
}
