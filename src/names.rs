//! Excluded-name list loading

use std::path::Path;

use regex::Regex;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// One excluded employee, matched against page text.
///
/// The line from the name list is used as a regular expression. Lines that
/// are not valid expressions are matched literally instead.
#[derive(Debug, Clone)]
pub struct ExcludedName {
    source: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Pattern(Regex),
    Literal,
}

impl ExcludedName {
    pub fn new(pattern: &str) -> Self {
        let matcher = match Regex::new(pattern) {
            Ok(regex) => Matcher::Pattern(regex),
            Err(e) => {
                warn!(pattern, error = %e, "not a valid pattern, matching literally");
                Matcher::Literal
            }
        };

        Self {
            source: pattern.to_string(),
            matcher,
        }
    }

    /// The pattern as written in the name list
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Pattern(regex) => regex.is_match(text),
            Matcher::Literal => text.contains(&self.source),
        }
    }
}

/// Parse a name list, one pattern per line. Blank lines are skipped.
pub fn parse_excluded_names(content: &str) -> Vec<ExcludedName> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(ExcludedName::new)
        .collect()
}

/// Read the excluded-name list from `folder/name`
pub fn load_excluded_names(folder: &Path, name: &str) -> Result<Vec<ExcludedName>> {
    let path = folder.join(name);
    let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ExcludedNameFileMissing {
            name: name.to_string(),
            folder: folder.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;

    let names = parse_excluded_names(&content);
    info!(count = names.len(), file = %path.display(), "loaded excluded names");
    Ok(names)
}
