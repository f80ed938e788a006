//! Page content stream plumbing shared by the redaction and merge stages

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::Result;

/// Entries of a page's Contents as a flat list of references.
///
/// Handles a single stream reference, an inline array and a reference to
/// an array object.
pub fn page_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page_dict = doc.get_object(page_id)?.as_dict()?;

    let contents = match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(arr)) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => vec![],
    };

    Ok(contents)
}

/// Add a content stream to the document.
///
/// Streams are concatenated when a page is rendered, so the content is
/// padded with newlines to keep operators from running into their
/// neighbours.
pub fn add_content_stream(doc: &mut Document, content: &[u8]) -> ObjectId {
    let mut padded = Vec::with_capacity(content.len() + 2);
    padded.push(b'\n');
    padded.extend_from_slice(content);
    padded.push(b'\n');

    doc.add_object(Stream::new(Dictionary::new(), padded))
}

/// Encode a list of operations into a new content stream object
pub fn add_operations(doc: &mut Document, operations: Vec<Operation>) -> Result<ObjectId> {
    let encoded = Content { operations }.encode()?;
    Ok(add_content_stream(doc, &encoded))
}

/// Wrap the page's existing content in q/Q to isolate transformations
///
/// Any transformation matrix or color the original content leaves behind
/// would otherwise apply to content appended later.
pub fn wrap_in_graphics_state(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut contents = page_contents(doc, page_id)?;
    if contents.is_empty() {
        return Ok(());
    }

    let save_id = add_content_stream(doc, b"q");
    let restore_id = add_content_stream(doc, b"Q");

    contents.insert(0, Object::Reference(save_id));
    contents.push(Object::Reference(restore_id));
    set_contents(doc, page_id, contents)
}

/// Append a content stream to a page's Contents
///
/// Appended content is drawn after the original content, so on top of it.
pub fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = page_contents(doc, page_id)?;
    contents.push(Object::Reference(new_content_id));
    set_contents(doc, page_id, contents)
}

fn set_contents(doc: &mut Document, page_id: ObjectId, contents: Vec<Object>) -> Result<()> {
    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Contents", Object::Array(contents));
    Ok(())
}
