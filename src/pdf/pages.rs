//! Page access: counting, text extraction and inherited page attributes

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::error::Result;
use crate::layout::PageBox;

/// Page attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page object IDs in document order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Extract the text of every page, in order.
///
/// A page whose text cannot be extracted yields an empty string.
pub fn page_texts(doc: &Document) -> Vec<String> {
    let pages = doc.get_pages();
    let total = pages.len();

    pages
        .keys()
        .enumerate()
        .map(|(i, page_number)| {
            debug!(page = i + 1, total, "reading page");
            doc.extract_text(&[*page_number]).unwrap_or_else(|e| {
                debug!(page = i + 1, error = %e, "no text extracted");
                String::new()
            })
        })
        .collect()
}

/// Follow a reference, if any, and return the dictionary it points to
pub fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        },
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inherited values
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    // Bounded walk; malformed trees can contain Parent cycles.
    for _ in 0..64 {
        let node_id = current?;
        let node = match doc.get_object(node_id) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => return None,
        };

        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }

        current = match node.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => Some(*parent_id),
            _ => None,
        };
    }
    None
}

/// Copy inherited attributes onto the page itself so it can be moved to a
/// different page tree without losing them
pub fn flatten_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let inherited: Vec<(&[u8], Object)> = INHERITABLE_ATTRIBUTES
        .iter()
        .filter_map(|key| inherited_attribute(doc, page_id, key).map(|value| (*key, value)))
        .collect();

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    for (key, value) in inherited {
        if !page_dict.has(key) {
            page_dict.set(key.to_vec(), value);
        }
    }

    Ok(())
}

/// Visible box of a page: the CropBox if present, otherwise the MediaBox.
/// Falls back to US Letter when neither can be read.
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .iter()
        .filter_map(|key| inherited_attribute(doc, page_id, key))
        .find_map(|value| parse_box(doc, &value))
        .unwrap_or_else(PageBox::letter)
}

fn parse_box(doc: &Document, value: &Object) -> Option<PageBox> {
    let array = match value {
        Object::Array(array) => array,
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(array)) => array,
            _ => return None,
        },
        _ => return None,
    };

    if array.len() != 4 {
        return None;
    }

    let mut corners = [0.0f32; 4];
    for (corner, value) in corners.iter_mut().zip(array) {
        *corner = value.as_float().ok()?;
    }
    Some(PageBox::from_corners(corners))
}
