//! Finding the pages that belong to excluded employees
//!
//! A timesheet record normally fits on one page that ends with a
//! `Total Hours` line. When the page after a matched page lacks that line,
//! the record spilled over and the next page is excluded as well.

use std::collections::BTreeSet;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::names::ExcludedName;
use crate::pdf::pages::page_texts;

/// Text that marks the last page of a timesheet record
pub const CONTINUATION_MARKER: &str = "Total Hours";

/// 0-based indices of the pages to drop, in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedPages(BTreeSet<usize>);

impl ExcludedPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for ExcludedPages {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decide which pages to exclude, given the text of every page.
///
/// Patterns are tried in list order and the first match wins. A matched
/// pattern is removed from `names`, so each name excludes at most one
/// record. Pages with no text never match.
pub fn classify<S: AsRef<str>>(page_texts: &[S], names: &mut Vec<ExcludedName>) -> ExcludedPages {
    let mut excluded = ExcludedPages::new();
    let page_count = page_texts.len();

    for (index, text) in page_texts.iter().enumerate() {
        if excluded.contains(index) {
            continue;
        }

        let text = text.as_ref();
        if text.trim().is_empty() {
            continue;
        }

        let Some(position) = names.iter().position(|name| name.is_match(text)) else {
            continue;
        };

        let name = names.remove(position);
        excluded.insert(index);

        let next = index + 1;
        let continues = next < page_count && !page_texts[next].as_ref().contains(CONTINUATION_MARKER);
        if continues {
            excluded.insert(next);
        }

        debug!(
            name = name.as_str(),
            page = index,
            continuation = continues,
            "excluded record"
        );
    }

    excluded
}

/// Classify the pages of a loaded document
pub fn classify_document(doc: &Document, names: &mut Vec<ExcludedName>) -> ExcludedPages {
    let texts = page_texts(doc);
    let excluded = classify(&texts, names);
    info!(pages = texts.len(), excluded = excluded.len(), "finished reading pages");
    excluded
}

/// Load the source document and classify its pages
pub fn find_excluded_pages(source: &Path, names: &mut Vec<ExcludedName>) -> Result<ExcludedPages> {
    if !source.exists() {
        return Err(Error::DocumentOpen(source.to_path_buf()));
    }

    let doc = Document::load(source)?;
    Ok(classify_document(&doc, names))
}
