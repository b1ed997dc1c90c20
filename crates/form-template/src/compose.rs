//! Final assembly of a filled form with overlays and attachment pages

use crate::session::Overlay;
use crate::Result;
use pdf_core::{Attachment, PageSize, PdfDocument};
use tracing::debug;

/// Build the output document from the fill engine's bytes
///
/// Overlays are merged in order onto their pages, then the page set is
/// narrowed to `pages` (all pages when `None` or empty), then each
/// attachment gets a page of its own at the end.
pub fn compose(
    filled: &[u8],
    overlays: &[Overlay],
    attachments: &[Attachment],
    pages: Option<&[usize]>,
) -> Result<PdfDocument> {
    let mut doc = PdfDocument::open_from_bytes(filled)?;

    for overlay in overlays {
        doc.merge_fragment(overlay.page, &overlay.fragment)?;
    }

    if let Some(pages) = pages.filter(|pages| !pages.is_empty()) {
        doc.select_pages(pages)?;
    }

    let size = match doc.page_count() {
        0 => PageSize::A4,
        count => doc.page_size(count - 1)?,
    };
    for attachment in attachments {
        let index = doc.add_blank_page(size)?;
        doc.merge_fragment(index, &attachment.to_fragment())?;
    }

    debug!(
        overlays = overlays.len(),
        attachments = attachments.len(),
        pages = doc.page_count(),
        "composed output"
    );
    Ok(doc)
}
