//! Widget annotation discovery

use crate::{number, PdfError, Rect, Result};
use lopdf::{Dictionary, Document, Object};
use tracing::debug;

/// AcroForm field types that anchor a field rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `Btn` - push button, checkbox, radio
    Button,
    /// `Tx` - text
    Text,
    /// `Ch` - list/combo box
    Choice,
    /// `Sig` - signature
    Signature,
}

impl FieldType {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Btn" => Some(Self::Button),
            b"Tx" => Some(Self::Text),
            b"Ch" => Some(Self::Choice),
            b"Sig" => Some(Self::Signature),
            _ => None,
        }
    }
}

/// A widget annotation as found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAnnotation {
    /// Page index (0-based)
    pub page: usize,
    /// Field name, from the widget or its parent
    pub name: String,
    /// Field type read from the widget itself
    pub field_type: Option<FieldType>,
    /// Widget rectangle
    pub rect: Option<Rect>,
    /// Raw `TU` bytes of whichever dictionary supplied the name
    pub tooltip: Option<Vec<u8>>,
}

impl WidgetAnnotation {
    /// Whether this widget's rectangle should anchor the field
    pub fn anchors_rect(&self) -> bool {
        self.field_type.is_some() && self.rect.is_some()
    }
}

/// Follow an indirect reference, if any
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

fn read_rect(doc: &Document, dict: &Dictionary) -> Option<Rect> {
    let rect = resolve(doc, dict.get(b"Rect").ok()?).ok()?.as_array().ok()?;
    if rect.len() < 4 {
        return None;
    }
    let coords: Vec<f64> = rect
        .iter()
        .take(4)
        .map(|o| resolve(doc, o).ok().and_then(number))
        .collect::<Option<_>>()?;
    Some(Rect::new(coords[0], coords[1], coords[2], coords[3]))
}

fn read_string<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    resolve(doc, dict.get(key).ok()?).ok()?.as_str().ok()
}

/// Decode a PDF text string
///
/// A leading `0xFE` byte selects UTF-16BE with BOM; anything else must be
/// UTF-8. Returns an error message on malformed input.
pub fn decode_text_string(bytes: &[u8]) -> std::result::Result<String, String> {
    if bytes.first() == Some(&0xFE) {
        let body = bytes
            .strip_prefix(&[0xFE, 0xFF])
            .ok_or_else(|| "truncated UTF-16 byte order mark".to_string())?;
        if body.len() % 2 != 0 {
            return Err("odd number of bytes in UTF-16 string".to_string());
        }
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|e| e.to_string())
    } else {
        String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
    }
}

/// Collect the widget annotations of every page, in page order
///
/// A widget without `T` takes its name (and tooltip) from its `Parent`.
/// When neither has a name the scan fails with `MissingFieldName`.
pub fn scan_widgets(doc: &Document) -> Result<Vec<WidgetAnnotation>> {
    let mut widgets = Vec::new();

    for (page_index, page_id) in doc.get_pages().into_values().enumerate() {
        let page = doc.get_dictionary(page_id)?;
        let annots = match page.get(b"Annots") {
            Ok(annots) => resolve(doc, annots)?,
            Err(_) => continue,
        };
        let annots = annots
            .as_array()
            .map_err(|_| PdfError::ParseError("Annots is not an array".to_string()))?;

        for annot in annots {
            let Ok(widget) = resolve(doc, annot)?.as_dict() else {
                continue;
            };
            let is_widget = widget
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|name| name == b"Widget")
                .unwrap_or(false);
            if !is_widget {
                continue;
            }

            let holder = match read_string(doc, widget, b"T") {
                Some(_) => widget,
                None => widget
                    .get(b"Parent")
                    .ok()
                    .and_then(|parent| resolve(doc, parent).ok())
                    .and_then(|parent| parent.as_dict().ok())
                    .filter(|parent| read_string(doc, parent, b"T").is_some())
                    .ok_or(PdfError::MissingFieldName(page_index))?,
            };
            let raw_name = read_string(doc, holder, b"T").unwrap_or_default();
            let name = decode_text_string(raw_name)
                .unwrap_or_else(|_| String::from_utf8_lossy(raw_name).into_owned());

            let field_type = widget
                .get(b"FT")
                .and_then(Object::as_name)
                .ok()
                .and_then(FieldType::from_name);

            debug!(page = page_index, field = %name, "found widget");
            widgets.push(WidgetAnnotation {
                page: page_index,
                name,
                field_type,
                rect: read_rect(doc, widget),
                tooltip: read_string(doc, holder, b"TU").map(<[u8]>::to_vec),
            });
        }
    }

    Ok(widgets)
}
