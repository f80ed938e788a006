//! Locating the newest source timesheet in the search folder

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::{glob, Pattern};
use tracing::{debug, info};

use crate::config::SearchSettings;
use crate::error::{Error, Result};

/// Return the most recently created file in `search.folder` whose name
/// contains `search.keyword` and ends with `search.extension`.
///
/// Creation time falls back to modification time on platforms that do not
/// record it.
pub fn find_latest_file(search: &SearchSettings) -> Result<PathBuf> {
    let not_found = || Error::FileNotFoundInSearch {
        keyword: search.keyword.clone(),
        folder: search.folder.clone(),
    };

    if !search.folder.is_dir() {
        return Err(not_found());
    }

    let pattern = search_pattern(search);
    debug!(%pattern, "searching for source file");

    let entries = glob(&pattern).map_err(|e| Error::General(format!("Invalid glob pattern: {}", e)))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !path.is_file() || !matches_criteria(&path, search) {
            continue;
        }

        let created = creation_time(&path)?;
        if newest.as_ref().map_or(true, |(best, _)| created >= *best) {
            newest = Some((created, path));
        }
    }

    let (_, found) = newest.ok_or_else(not_found)?;
    info!(file = %found.display(), "found source file");
    Ok(found)
}

/// Glob pattern for every file with the wanted extension. The keyword is
/// checked separately since it may overlap the extension.
fn search_pattern(search: &SearchSettings) -> String {
    let folder = Pattern::escape(&search.folder.to_string_lossy());
    format!("{}/*{}", folder, Pattern::escape(&search.extension))
}

fn matches_criteria(path: &Path, search: &SearchSettings) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .map_or(false, |name| {
            name.ends_with(&search.extension) && name.contains(&search.keyword)
        })
}

fn creation_time(path: &Path) -> Result<SystemTime> {
    let metadata = std::fs::metadata(path)?;
    Ok(metadata.created().or_else(|_| metadata.modified())?)
}
