//! Per-render state shared with filters

use crate::registry::Field;
use minijinja::value::Object;
use minijinja::Value;
use pdf_core::{Attachment, PageFragment, Rect};
use std::sync::{Arc, Mutex, PoisonError};

/// Context key under which the current field is handed to filters
pub(crate) const SESSION_KEY: &str = "__current_field__";

/// A fragment to draw over page `page` (0-based) after filling
#[derive(Debug, Clone)]
pub struct Overlay {
    pub page: usize,
    pub fragment: PageFragment,
}

type OverlaySink = Arc<Mutex<Vec<Overlay>>>;

/// State of one render pass
///
/// Each pass owns its own session, so overlays from concurrent or
/// consecutive renders never mix.
#[derive(Debug, Default)]
pub struct RenderSession {
    overlays: OverlaySink,
}

impl RenderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `field` the current field; the returned value goes into the
    /// template context under [`SESSION_KEY`]
    pub(crate) fn enter(&self, field: &Field) -> Value {
        Value::from_object(CurrentField {
            name: field.name.clone(),
            page: field.page,
            rect: field.rect,
            overlays: Arc::clone(&self.overlays),
        })
    }

    /// Overlays recorded so far, in paste order
    pub fn into_overlays(self) -> Vec<Overlay> {
        let mut overlays = self.overlays.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *overlays)
    }
}

/// The field being rendered, as seen by filters
#[derive(Debug)]
pub(crate) struct CurrentField {
    pub(crate) name: String,
    pub(crate) page: usize,
    pub(crate) rect: Option<Rect>,
    overlays: OverlaySink,
}

impl Object for CurrentField {}

impl CurrentField {
    /// Record `data` as an image stretched over `rect` on this field's page
    pub(crate) fn place_image(&self, data: &[u8], rect: Rect) -> pdf_core::Result<()> {
        let attachment = Attachment::new(data, Some(rect.to_dimensions()))?;
        let overlay = Overlay {
            page: self.page,
            fragment: attachment.to_fragment(),
        };

        self.overlays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(overlay);
        Ok(())
    }
}
