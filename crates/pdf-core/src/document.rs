//! PDF Document wrapper

use crate::image::generate_image_operators;
use crate::{number, PageFragment, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// PDF Document wrapper providing page-level composition
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("form.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Page object IDs in document order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().into_values().collect()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let ids = self.page_ids();
        ids.get(index)
            .copied()
            .ok_or(PdfError::InvalidPage(index, ids.len()))
    }

    /// Page size from the (possibly inherited) MediaBox, A4 when absent
    pub fn page_size(&self, index: usize) -> Result<PageSize> {
        let page_id = self.page_id(index)?;
        let Some(media_box) = self.get_inherited(page_id, b"MediaBox")? else {
            return Ok(PageSize::A4);
        };
        let media_box = self.resolve(&media_box)?;
        let values = media_box
            .as_array()
            .map_err(|_| PdfError::ParseError("MediaBox is not an array".to_string()))?;
        if values.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let coords: Vec<f64> = values[..4]
            .iter()
            .map(number)
            .collect::<Option<_>>()
            .ok_or_else(|| PdfError::ParseError("MediaBox entry is not a number".to_string()))?;
        Ok(PageSize::new(coords[2] - coords[0], coords[3] - coords[1]))
    }

    /// The underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    fn resolve(&self, obj: &Object) -> Result<Object> {
        match obj {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?.clone()),
            other => Ok(other.clone()),
        }
    }

    /// Look up `key` on the page, following the Parent chain if needed
    fn get_inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self.inner.get_dictionary(current_id)?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Root `Pages` object of the catalog
    fn pages_root_id(&self) -> Result<ObjectId> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?;
        self.inner
            .get_dictionary(catalog_id)?
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))
    }

    /// References to the page's content streams, in drawing order
    ///
    /// The streams are referenced as they are, whatever their filters. A
    /// direct stream is moved into its own object.
    fn content_refs(&mut self, page_id: ObjectId) -> Result<Vec<Object>> {
        let contents = match self.inner.get_dictionary(page_id)?.get(b"Contents") {
            Ok(contents) => contents.clone(),
            Err(_) => return Ok(Vec::new()),
        };

        let parts = match contents {
            Object::Reference(id) => match self.inner.get_object(id)? {
                Object::Array(parts) => parts.clone(),
                _ => vec![Object::Reference(id)],
            },
            Object::Array(parts) => parts,
            Object::Stream(stream) => vec![Object::Reference(self.inner.add_object(stream))],
            _ => Vec::new(),
        };

        let mut refs = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Object::Reference(_) => refs.push(part),
                Object::Stream(stream) => refs.push(Object::Reference(self.inner.add_object(stream))),
                _ => {}
            }
        }
        Ok(refs)
    }

    /// Page resources as a direct dictionary (inherited/indirect resolved)
    fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        match self.get_inherited(page_id, b"Resources")? {
            Some(resources) => Ok(self
                .resolve(&resources)?
                .as_dict()
                .cloned()
                .unwrap_or_default()),
            None => Ok(Dictionary::new()),
        }
    }

    /// Draw `fragment` on top of page `index` (0-based)
    ///
    /// The existing content streams are kept untouched and bracketed by
    /// new `q` and `Q` streams, so their graphics state cannot leak into
    /// the fragment; fragment images get fresh resource names on the page.
    pub fn merge_fragment(&mut self, index: usize, fragment: &PageFragment) -> Result<()> {
        let page_id = self.page_id(index)?;
        if fragment.is_empty() {
            return Ok(());
        }

        let mut resources = self.page_resources(page_id)?;
        let mut xobjects = match resources.get(b"XObject") {
            Ok(xobjects) => self.resolve(xobjects)?.as_dict().cloned().unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        let mut operators = Vec::new();
        let mut next_name = xobjects.len() + 1;
        for placement in &fragment.placements {
            let image_id = self.inner.add_object(placement.image.to_pdf_stream());

            let mut name = format!("Ovl{next_name}");
            while xobjects.has(name.as_bytes()) {
                next_name += 1;
                name = format!("Ovl{next_name}");
            }
            next_name += 1;

            xobjects.set(name.as_bytes(), Object::Reference(image_id));
            operators.extend(generate_image_operators(
                &name,
                placement.x,
                placement.y,
                placement.width,
                placement.height,
            ));
        }
        resources.set("XObject", Object::Dictionary(xobjects));

        let head_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut tail = b"\nQ\n".to_vec();
        tail.extend(operators);
        let tail_id = self.inner.add_object(Stream::new(Dictionary::new(), tail));

        let mut contents = vec![Object::Reference(head_id)];
        contents.extend(self.content_refs(page_id)?);
        contents.push(Object::Reference(tail_id));

        let mut page = self.inner.get_dictionary(page_id)?.clone();
        page.set("Contents", Object::Array(contents));
        page.set("Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, page.into());

        debug!(page = index, images = fragment.placements.len(), "merged fragment");
        Ok(())
    }

    /// Rebuild the page tree with exactly `indices`, in that order
    ///
    /// Repeated indices produce copies of the page. Inherited attributes
    /// are copied onto each page since the tree is flattened.
    pub fn select_pages(&mut self, indices: &[usize]) -> Result<()> {
        let page_ids = self.page_ids();
        let pages_id = self.pages_root_id()?;

        let mut kids = Vec::with_capacity(indices.len());
        let mut used = HashSet::new();
        for &index in indices {
            let page_id = *page_ids
                .get(index)
                .ok_or(PdfError::InvalidPage(index, page_ids.len()))?;

            let mut page = self.inner.get_dictionary(page_id)?.clone();
            for key in INHERITABLE_KEYS {
                if !page.has(key) {
                    if let Some(value) = self.get_inherited(page_id, key)? {
                        page.set(key, value);
                    }
                }
            }
            page.set("Parent", Object::Reference(pages_id));

            let target_id = if used.insert(page_id) {
                page_id
            } else {
                self.inner.new_object_id()
            };
            self.inner.objects.insert(target_id, page.into());
            kids.push(Object::Reference(target_id));
        }

        let mut pages = self.inner.get_dictionary(pages_id)?.clone();
        pages.set("Count", Object::Integer(kids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        self.inner.objects.insert(pages_id, pages.into());

        let pruned = self.inner.prune_objects();
        debug!(pages = indices.len(), pruned = pruned.len(), "selected pages");
        Ok(())
    }

    /// Append a blank page of `size` and return its index (0-based)
    pub fn add_blank_page(&mut self, size: PageSize) -> Result<usize> {
        let page_count = self.page_count();
        let pages_id = self.pages_root_id()?;

        let contents_id = self
            .inner
            .add_object(Object::Stream(Stream::new(Dictionary::new(), vec![])));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(size.width),
                Object::from(size.height),
            ]),
        );
        page.set("Resources", Object::Dictionary(Dictionary::new()));
        page.set("Contents", Object::Reference(contents_id));
        let page_id = self.inner.add_object(Object::Dictionary(page));

        let mut pages = self.inner.get_dictionary(pages_id)?.clone();
        let mut kids = pages
            .get(b"Kids")
            .and_then(Object::as_array)
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        kids.push(Object::Reference(page_id));
        let count = pages
            .get(b"Count")
            .and_then(Object::as_i64)
            .map_err(|_| PdfError::ParseError("Pages object missing Count".to_string()))?;
        pages.set("Kids", Object::Array(kids));
        pages.set("Count", Object::Integer(count + 1));
        self.inner.objects.insert(pages_id, pages.into());

        Ok(page_count)
    }
}

impl From<Document> for PdfDocument {
    fn from(inner: Document) -> Self {
        Self { inner }
    }
}
