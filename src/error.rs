//! Error types for the timesheet formatter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the timesheet formatter
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file missing or unparseable
    #[error("Unable to load JSON data from \"{}\": {reason}", .path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    /// No file in the search folder matched the keyword and type
    #[error(
        "Could not find file containing \"{keyword}\" in folder \"{}\". Ensure that you have \
         downloaded the correct file, or adjust the searchfile parameters.",
        .folder.display()
    )]
    FileNotFoundInSearch { keyword: String, folder: PathBuf },

    /// Excluded-name list file is absent
    #[error(
        "Could not find file \"{name}\" in directory {}. Ensure file exists in directory.",
        .folder.display()
    )]
    ExcludedNameFileMissing { name: String, folder: PathBuf },

    /// Source document could not be opened by the redaction stage
    #[error("Could not find file \"{}\". Ensure file exists in directory.", .0.display())]
    DocumentOpen(PathBuf),

    /// Watermark or intermediate unreadable, or output unwritable
    #[error("Unable to {action} \"{}\": {source}", .path.display())]
    MergeIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap a failure of the watermark/merge stage
    pub fn merge_io<E>(action: &'static str, path: &std::path::Path, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::MergeIo {
            action,
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// Whether this is a user-facing failure that ends the run with a prompt
    /// rather than a diagnostic trace.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Error::FileNotFoundInSearch { .. }
                | Error::ExcludedNameFileMissing { .. }
                | Error::DocumentOpen(_)
        )
    }
}
