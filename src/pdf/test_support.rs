//! Small synthetic timesheets for unit tests

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Text lines drawn on one page
pub struct PageFixture {
    pub lines: Vec<String>,
}

pub fn simple_page(text: &str) -> PageFixture {
    PageFixture {
        lines: if text.is_empty() { vec![] } else { vec![text.to_string()] },
    }
}

pub fn page_with_lines(lines: &[&str]) -> PageFixture {
    PageFixture {
        lines: lines.iter().map(|line| line.to_string()).collect(),
    }
}

fn text_content(lines: &[String]) -> Vec<u8> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("TL", vec![14.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    Content { operations }.encode().unwrap()
}

/// Build a document with one page per fixture. MediaBox lives on the Pages
/// node so pages inherit it.
pub fn build_document(pages: &[PageFixture]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, text_content(&page.lines)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// One-page signature-line watermark: two stroked lines and a caption
pub fn watermark_document() -> Document {
    let mut doc = build_document(&[simple_page("Employee Signature")]);
    let page_id = doc.get_pages()[&1];

    let lines = Content {
        operations: vec![
            Operation::new("w", vec![1.into()]),
            Operation::new("m", vec![72.into(), 60.into()]),
            Operation::new("l", vec![288.into(), 60.into()]),
            Operation::new("m", vec![324.into(), 60.into()]),
            Operation::new("l", vec![540.into(), 60.into()]),
            Operation::new("S", vec![]),
        ],
    };
    let lines_id = doc.add_object(Stream::new(dictionary! {}, lines.encode().unwrap()));

    let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
    let first = page.get(b"Contents").unwrap().clone();
    page.set("Contents", vec![first, Object::Reference(lines_id)]);

    doc
}

/// Serialize a document to bytes
pub fn to_bytes(doc: &mut Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
