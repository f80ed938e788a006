//! PDF stages: page classification, footer redaction and watermark merging

pub mod classify;
pub mod content;
pub mod merge;
pub mod pages;
pub mod redact;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use classify::{classify, classify_document, find_excluded_pages, ExcludedPages, CONTINUATION_MARKER};
pub use merge::{merge, merge_documents, MergeSummary};
pub use pages::page_texts;
pub use redact::{redact, redact_document};
