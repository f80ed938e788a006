//! Output file naming
//!
//! Every run writes a new file named `<prefix><timestamp>-<source name>`,
//! so re-running never overwrites an earlier result.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Timestamp layout used in output file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Characters removed from output file names
const STRIPPED_CHARS: [char; 3] = [' ', '(', ')'];

/// Format a timestamp for use in a file name
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the output file name for a source document.
///
/// Spaces and parentheses are removed, since browser downloads such as
/// `Timesheet (3).pdf` trip up the viewer launch.
pub fn output_file_name(prefix: &str, at: &NaiveDateTime, source: &Path) -> String {
    let source_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!("{}{}-{}", prefix, format_timestamp(at), source_name)
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect()
}

/// Full output path inside `output_dir`
pub fn output_path(output_dir: &Path, prefix: &str, at: &NaiveDateTime, source: &Path) -> PathBuf {
    output_dir.join(output_file_name(prefix, at, source))
}
