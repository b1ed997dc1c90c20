//! Single-page fragments merged on top of existing pages

use crate::image::ImageXObject;
use std::sync::Arc;

/// One image drawn at a box in PDF user space (bottom-left origin)
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub image: Arc<ImageXObject>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A drawing in page coordinates that is not yet part of any document
///
/// Placements are drawn in order, so later ones end up on top. The target
/// page's own size governs; a fragment carries none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFragment {
    pub placements: Vec<ImagePlacement>,
}

impl PageFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stretch `image` into the box `(x, y, width, height)`
    pub fn draw_image(&mut self, image: Arc<ImageXObject>, x: f64, y: f64, width: f64, height: f64) {
        self.placements.push(ImagePlacement {
            image,
            x,
            y,
            width,
            height,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}
