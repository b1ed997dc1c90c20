//! Integration tests for pdf-core
//!
//! These tests build real PDFs with lopdf and run widget discovery and
//! page composition against them.

use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pdf_core::{
    scan_widgets, Attachment, FieldType, PageSize, PdfDocument, PdfError, Rect,
};
use pretty_assertions::assert_eq;
use std::io::Cursor;

/// Create a PDF with `page_count` empty A4 pages; returns the page ids too
fn create_test_document(page_count: usize) -> (Document, Vec<ObjectId>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for n in 0..page_count {
        let contents_id = doc.add_object(Stream::new(
            dictionary! {},
            format!("% page {n}\n").into_bytes(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => contents_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i64,
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! {},
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    (doc, page_ids)
}

fn set_annots(doc: &mut Document, page_id: ObjectId, annots: Vec<ObjectId>) {
    let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
    page.set(
        "Annots",
        annots.into_iter().map(Object::Reference).collect::<Vec<_>>(),
    );
}

fn text_widget(name: &str, tooltip: &str, rect: [i64; 4]) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal(name),
        "TU" => Object::string_literal(tooltip),
        "Rect" => rect.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(4, 4))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn page_content(doc: &PdfDocument, index: usize) -> String {
    let page_id = doc.page_ids()[index];
    let content = doc.inner().get_page_content(page_id).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}

#[test]
fn test_scan_finds_text_widgets_per_page() {
    let (mut doc, pages) = create_test_document(2);
    let first = doc.add_object(text_widget("name", "{{ name }}", [10, 20, 110, 40]));
    let second = doc.add_object(text_widget("city", "{{ city }}", [0, 0, 50, 10]));
    set_annots(&mut doc, pages[0], vec![first]);
    set_annots(&mut doc, pages[1], vec![second]);

    let widgets = scan_widgets(&doc).unwrap();

    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets[0].name, "name");
    assert_eq!(widgets[0].page, 0);
    assert_eq!(widgets[0].field_type, Some(FieldType::Text));
    assert_eq!(widgets[0].rect, Some(Rect::new(10.0, 20.0, 110.0, 40.0)));
    assert_eq!(widgets[0].tooltip.as_deref(), Some(&b"{{ name }}"[..]));
    assert_eq!(widgets[1].name, "city");
    assert_eq!(widgets[1].page, 1);
}

#[test]
fn test_scan_skips_non_widget_annotations() {
    let (mut doc, pages) = create_test_document(1);
    let link = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
    });
    set_annots(&mut doc, pages[0], vec![link]);

    assert!(scan_widgets(&doc).unwrap().is_empty());
}

#[test]
fn test_scan_uses_parent_name_and_tooltip() {
    let (mut doc, pages) = create_test_document(1);
    let parent = doc.add_object(dictionary! {
        "FT" => "Btn",
        "T" => Object::string_literal("agree"),
        "TU" => Object::string_literal("{{ agree|check }}"),
    });
    let kid = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "Parent" => parent,
        "Rect" => vec![1.into(), 2.into(), 3.into(), 4.into()],
    });
    set_annots(&mut doc, pages[0], vec![kid]);

    let widgets = scan_widgets(&doc).unwrap();

    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].name, "agree");
    assert_eq!(
        widgets[0].tooltip.as_deref(),
        Some(&b"{{ agree|check }}"[..])
    );
    // FT lives on the parent, so this kid does not anchor a rectangle
    assert_eq!(widgets[0].field_type, None);
    assert!(!widgets[0].anchors_rect());
}

#[test]
fn test_scan_fails_without_any_name() {
    let (mut doc, pages) = create_test_document(2);
    let parent = doc.add_object(dictionary! { "FT" => "Tx" });
    let orphan = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "Parent" => parent,
    });
    set_annots(&mut doc, pages[1], vec![orphan]);

    let result = scan_widgets(&doc);
    assert!(matches!(result, Err(PdfError::MissingFieldName(1))));
}

#[test]
fn test_scan_resolves_indirect_annots_array() {
    let (mut doc, pages) = create_test_document(1);
    let widget = doc.add_object(text_widget("total", "{{ total }}", [0, 0, 1, 1]));
    let annots = doc.add_object(vec![Object::Reference(widget)]);
    doc.get_object_mut(pages[0])
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Annots", annots);

    let widgets = scan_widgets(&doc).unwrap();
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].name, "total");
}

#[test]
fn test_page_size_is_inherited() {
    let (doc, _) = create_test_document(1);
    let doc = PdfDocument::from(doc);
    assert_eq!(doc.page_size(0).unwrap(), PageSize::new(595.0, 842.0));
    assert!(matches!(doc.page_size(3), Err(PdfError::InvalidPage(3, 1))));
}

#[test]
fn test_merge_fragment_draws_on_top_in_order() {
    let (doc, _) = create_test_document(1);
    let mut doc = PdfDocument::from(doc);

    let first = Attachment::new(&png_bytes(), Some([10.0, 10.0, 20.0, 20.0])).unwrap();
    let second = Attachment::new(&png_bytes(), Some([30.0, 30.0, 40.0, 40.0])).unwrap();
    doc.merge_fragment(0, &first.to_fragment()).unwrap();
    doc.merge_fragment(0, &second.to_fragment()).unwrap();

    let content = page_content(&doc, 0);
    let original = content.find("% page 0").unwrap();
    let a = content.find("20 0 0 20 10 10 cm").unwrap();
    let b = content.find("40 0 0 40 30 30 cm").unwrap();
    assert!(original < a && a < b);
    assert!(content.starts_with("q\n"));

    let page = doc.inner().get_dictionary(doc.page_ids()[0]).unwrap();
    let xobjects = page
        .get(b"Resources")
        .and_then(Object::as_dict)
        .and_then(|r| r.get(b"XObject"))
        .and_then(Object::as_dict)
        .unwrap();
    assert_eq!(xobjects.len(), 2);
}

#[test]
fn test_merge_fragment_keeps_filtered_content_stream() {
    let (mut doc, pages) = create_test_document(1);
    let hex_drawing = b"302030206D203130203130206C2053>".to_vec();
    let content_id = doc.add_object(Stream::new(
        dictionary! { "Filter" => "ASCIIHexDecode" },
        hex_drawing.clone(),
    ));
    doc.get_object_mut(pages[0])
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Contents", content_id);
    let mut doc = PdfDocument::from(doc);

    let stamp = Attachment::new(&png_bytes(), Some([1.0, 1.0, 5.0, 5.0])).unwrap();
    doc.merge_fragment(0, &stamp.to_fragment()).unwrap();

    let page = doc.inner().get_dictionary(doc.page_ids()[0]).unwrap();
    let contents = page.get(b"Contents").and_then(Object::as_array).unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[1], Object::Reference(content_id));

    let original = doc.inner().get_object(content_id).and_then(Object::as_stream).unwrap();
    assert_eq!(original.content, hex_drawing);
    assert_eq!(
        original.dict.get(b"Filter").and_then(Object::as_name).unwrap(),
        b"ASCIIHexDecode"
    );

    let head = doc.inner().get_object(contents[0].as_reference().unwrap()).and_then(Object::as_stream).unwrap();
    let tail = doc.inner().get_object(contents[2].as_reference().unwrap()).and_then(Object::as_stream).unwrap();
    assert_eq!(head.content, b"q\n".to_vec());
    assert_eq!(
        String::from_utf8_lossy(&tail.content),
        "\nQ\nq\n5 0 0 5 1 1 cm\n/Ovl1 Do\nQ\n"
    );
}

#[test]
fn test_merge_fragment_out_of_range() {
    let (doc, _) = create_test_document(1);
    let mut doc = PdfDocument::from(doc);
    let stamp = Attachment::new(&png_bytes(), None).unwrap();

    let result = doc.merge_fragment(1, &stamp.to_fragment());
    assert!(matches!(result, Err(PdfError::InvalidPage(1, 1))));
}

#[test]
fn test_select_pages_keeps_order_and_repeats() {
    let (doc, _) = create_test_document(3);
    let mut doc = PdfDocument::from(doc);

    doc.select_pages(&[2, 0, 2]).unwrap();

    assert_eq!(doc.page_count(), 3);
    assert!(page_content(&doc, 0).contains("% page 2"));
    assert!(page_content(&doc, 1).contains("% page 0"));
    assert!(page_content(&doc, 2).contains("% page 2"));
    // Inherited MediaBox is copied onto flattened pages
    let page = doc.inner().get_dictionary(doc.page_ids()[1]).unwrap();
    assert!(page.has(b"MediaBox"));
}

#[test]
fn test_select_pages_rejects_out_of_range() {
    let (doc, _) = create_test_document(2);
    let mut doc = PdfDocument::from(doc);

    let result = doc.select_pages(&[0, 5]);
    assert!(matches!(result, Err(PdfError::InvalidPage(5, 2))));
}

#[test]
fn test_add_blank_page_appends() {
    let (doc, _) = create_test_document(2);
    let mut doc = PdfDocument::from(doc);

    let index = doc.add_blank_page(PageSize::new(300.0, 400.0)).unwrap();

    assert_eq!(index, 2);
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.page_size(2).unwrap(), PageSize::new(300.0, 400.0));
}

#[test]
fn test_round_trip_through_bytes() {
    let (doc, _) = create_test_document(2);
    let mut doc = PdfDocument::from(doc);
    let stamp = Attachment::new(&png_bytes(), None).unwrap();
    doc.merge_fragment(1, &stamp.to_fragment()).unwrap();

    let bytes = doc.to_bytes().unwrap();
    let reopened = PdfDocument::open_from_bytes(&bytes).unwrap();

    assert_eq!(reopened.page_count(), 2);
    assert!(page_content(&reopened, 1).contains("/Ovl1 Do"));
}
