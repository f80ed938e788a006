//! Painting over the timesheet footer

use std::path::Path;

use lopdf::content::Operation;
use lopdf::{Document, Object};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::layout::{RedactionRegion, Rgb};
use crate::pdf::content::{add_operations, append_content_to_page, wrap_in_graphics_state};
use crate::pdf::pages::{page_box, page_ids};

/// Paint the redaction region onto every page of `source` and save the
/// result to `output`. Returns the number of pages written.
///
/// This has to run before the watermark is merged, otherwise the rectangle
/// would cover the signature lines.
pub fn redact(source: &Path, region: &RedactionRegion, output: &Path) -> Result<usize> {
    if !source.exists() {
        return Err(Error::DocumentOpen(source.to_path_buf()));
    }

    let mut doc = Document::load(source)?;
    let page_count = redact_document(&mut doc, region)?;
    doc.save(output)?;

    info!(pages = page_count, "removed footer");
    Ok(page_count)
}

/// Paint the redaction region onto every page of a loaded document
pub fn redact_document(doc: &mut Document, region: &RedactionRegion) -> Result<usize> {
    let pages = page_ids(doc);

    for (i, page_id) in pages.iter().enumerate() {
        let (x, y, width, height) = region.to_user_space(&page_box(doc, *page_id));
        debug!(page = i + 1, total = pages.len(), x, y, width, height, "painting footer");

        wrap_in_graphics_state(doc, *page_id)?;
        let stream_id = add_operations(doc, rectangle_operations(region, (x, y, width, height)))?;
        append_content_to_page(doc, *page_id, stream_id)?;
    }

    Ok(pages.len())
}

/// Filled and stroked white rectangle, in its own graphics state
fn rectangle_operations(region: &RedactionRegion, rect: (f32, f32, f32, f32)) -> Vec<Operation> {
    let Rgb(r, g, b) = Rgb::WHITE;
    let (x, y, width, height) = rect;

    vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
        Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
        Operation::new("w", vec![Object::Real(region.width)]),
        Operation::new(
            "re",
            vec![Object::Real(x), Object::Real(y), Object::Real(width), Object::Real(height)],
        ),
        Operation::new("B", vec![]),
        Operation::new("Q", vec![]),
    ]
}
