//! Timesheet formatter library
//!
//! Prepares a downloaded timesheet PDF for printing:
//! - Finds the newest timesheet in the download folder
//! - Drops the pages of employees on the excluded-name list
//! - Paints over the footer on every page
//! - Adds the signature-line watermark to every remaining page
//!
//! # Example
//!
//! ```no_run
//! use ts_format::config::{Dirs, RawConfig};
//! use ts_format::diagnostics::DiagnosticContext;
//! use ts_format::pipeline::run;
//! use std::path::Path;
//!
//! let dirs = Dirs::detect().expect("Failed to detect directories");
//! let settings = RawConfig::load(Path::new("variables.json"))
//!     .expect("Failed to load configuration")
//!     .resolve(&dirs);
//!
//! let mut ctx = DiagnosticContext::new();
//! let outcome = run(&settings, &chrono::Local::now().naive_local(), &mut ctx)
//!     .expect("Failed to format timesheet");
//! println!("Wrote {}", outcome.output.display());
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod locate;
pub mod names;
pub mod naming;
pub mod pdf;
pub mod pipeline;

// Re-export commonly used items
pub use error::{Error, Result};
