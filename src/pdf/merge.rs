//! Watermark merging using lopdf
//!
//! The first page of the watermark PDF is imported once into the redacted
//! document as a Form XObject. Every retained page then invokes it from a
//! content stream of its own, while excluded pages are dropped from a
//! rebuilt page tree. The imported template is shared read-only; each page
//! gets its own copy of the Resources dictionary that references it.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pdf::classify::ExcludedPages;
use crate::pdf::content::{add_content_stream, append_content_to_page, wrap_in_graphics_state};
use crate::pdf::pages::{flatten_inherited_attributes, inherited_attribute, page_box, page_ids, resolve_dict};

/// Resource name the watermark is registered under on every page
const WATERMARK_XOBJECT: &str = "Watermark";

/// Page counts of a finished merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Pages in the redacted input
    pub source_pages: usize,
    /// Pages written to the output
    pub written_pages: usize,
}

/// Merge the watermark onto every retained page of `redacted` and write the
/// result to `output`.
///
/// # Example
///
/// ```no_run
/// use ts_format::pdf::{merge, ExcludedPages};
/// use std::path::Path;
///
/// let excluded: ExcludedPages = [0, 1].into_iter().collect();
/// merge(
///     Path::new("redacted.pdf"),
///     Path::new("signature_lines.pdf"),
///     &excluded,
///     Path::new("output.pdf"),
/// ).expect("Failed to merge");
/// ```
pub fn merge(
    redacted: &Path,
    watermark: &Path,
    excluded: &ExcludedPages,
    output: &Path,
) -> Result<MergeSummary> {
    let doc = Document::load(redacted).map_err(|e| Error::merge_io("open intermediate", redacted, e))?;
    let watermark_doc = Document::load(watermark).map_err(|e| Error::merge_io("open watermark", watermark, e))?;

    let (mut merged, summary) = merge_documents(doc, &watermark_doc, excluded).map_err(|e| match e {
        Error::EmptyPdf(_) => Error::EmptyPdf(watermark.to_path_buf()),
        other => other,
    })?;

    let mut file = std::fs::File::create(output).map_err(|e| Error::merge_io("create output", output, e))?;
    merged
        .save_to(&mut file)
        .map_err(|e| Error::merge_io("write output", output, e))?;

    info!(
        written = summary.written_pages,
        skipped = summary.source_pages - summary.written_pages,
        output = %output.display(),
        "added signature lines"
    );
    Ok(summary)
}

/// Merge the watermark's first page onto the retained pages of `doc`
pub fn merge_documents(
    mut doc: Document,
    watermark: &Document,
    excluded: &ExcludedPages,
) -> Result<(Document, MergeSummary)> {
    let xobject_id = import_watermark(&mut doc, watermark)?;

    let pages = page_ids(&doc);
    let total = pages.len();
    let mut retained = Vec::with_capacity(total);

    for (i, page_id) in pages.into_iter().enumerate() {
        if excluded.contains(i) {
            debug!(page = i + 1, total, "skipping excluded page");
            continue;
        }
        debug!(page = i + 1, total, "adding signature lines");

        flatten_inherited_attributes(&mut doc, page_id)?;
        wrap_in_graphics_state(&mut doc, page_id)?;
        add_xobject_to_page_resources(&mut doc, page_id, xobject_id)?;

        let invoke = format!("q\n/{} Do\nQ", WATERMARK_XOBJECT);
        let invoke_id = add_content_stream(&mut doc, invoke.as_bytes());
        append_content_to_page(&mut doc, page_id, invoke_id)?;

        retained.push(page_id);
    }

    rebuild_page_tree(&mut doc, &retained);
    doc.prune_objects();
    doc.compress();

    let summary = MergeSummary {
        source_pages: total,
        written_pages: retained.len(),
    };
    Ok((doc, summary))
}

/// Copy the watermark document into `doc` and wrap its first page in a
/// Form XObject. Returns the XObject's ID.
fn import_watermark(doc: &mut Document, watermark: &Document) -> Result<ObjectId> {
    let watermark_page = *watermark
        .get_pages()
        .get(&1)
        .ok_or_else(|| Error::EmptyPdf(Default::default()))?;

    let content = watermark.get_page_content(watermark_page)?;
    let bbox = page_box(watermark, watermark_page);
    let resources = inherited_attribute(watermark, watermark_page, b"Resources")
        .and_then(|res| resolve_dict(watermark, &res).cloned())
        .unwrap_or_else(Dictionary::new);

    // Renumber every watermark object past the end of the target document
    let id_offset = doc.max_id + 1;
    let id_map: HashMap<ObjectId, ObjectId> = watermark
        .objects
        .keys()
        .map(|old_id| (*old_id, (old_id.0 + id_offset, old_id.1)))
        .collect();

    for (old_id, object) in watermark.objects.iter() {
        doc.objects.insert(id_map[old_id], renumber_object_references(object, &id_map));
    }
    doc.max_id = watermark.max_id + id_offset;

    let resources = match renumber_object_references(&Object::Dictionary(resources), &id_map) {
        Object::Dictionary(dict) => dict,
        _ => Dictionary::new(),
    };

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Real(bbox.llx),
            Object::Real(bbox.lly),
            Object::Real(bbox.urx),
            Object::Real(bbox.ury),
        ]),
    );
    xobject_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    xobject_dict.set("Resources", Object::Dictionary(resources));

    Ok(doc.add_object(Stream::new(xobject_dict, content)))
}

/// Renumber all object references in an object
fn renumber_object_references(object: &Object, id_map: &HashMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(old_id) => Object::Reference(*id_map.get(old_id).unwrap_or(old_id)),
        Object::Array(arr) => {
            Object::Array(arr.iter().map(|obj| renumber_object_references(obj, id_map)).collect())
        }
        Object::Dictionary(dict) => Object::Dictionary(renumber_dictionary(dict, id_map)),
        Object::Stream(stream) => {
            let mut new_stream = stream.clone();
            new_stream.dict = renumber_dictionary(&stream.dict, id_map);
            Object::Stream(new_stream)
        }
        _ => object.clone(),
    }
}

fn renumber_dictionary(dict: &Dictionary, id_map: &HashMap<ObjectId, ObjectId>) -> Dictionary {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), renumber_object_references(value, id_map));
    }
    new_dict
}

/// Register the watermark XObject in a fresh copy of the page's Resources
fn add_xobject_to_page_resources(doc: &mut Document, page_id: ObjectId, xobject_id: ObjectId) -> Result<()> {
    let mut resources = {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        page_dict
            .get(b"Resources")
            .ok()
            .and_then(|res| resolve_dict(doc, res))
            .cloned()
            .unwrap_or_else(Dictionary::new)
    };

    let mut xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|xo| resolve_dict(doc, xo))
        .cloned()
        .unwrap_or_else(Dictionary::new);
    xobjects.set(WATERMARK_XOBJECT, Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    // Set the Resources directly on the page (not as a reference) so pages
    // that shared a Resources object do not share the edit
    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Replace the page tree with a single Pages node holding `page_ids`
fn rebuild_page_tree(doc: &mut Document, page_ids: &[ObjectId]) {
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in page_ids {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }
}
