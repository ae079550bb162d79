//! Directory scanning for reference and tile images

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use log::warn;
use walkdir::WalkDir;

use crate::errors::GeoTileResult;

const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// List files under `dir` whose file name matches `glob`
///
/// # Arguments
/// * `dir` - Folder to scan
/// * `glob` - Shell pattern matched against the file name only
/// * `recursive` - Descend into sub-folders
///
/// # Returns
/// Matching file paths in sorted walk order. Unreadable entries are
/// logged and skipped.
pub fn list_files(dir: &Path, glob: &str, recursive: bool) -> GeoTileResult<Vec<PathBuf>> {
    let pattern = Pattern::new(glob)?;
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .map(|name| pattern.matches_with(name, NAME_MATCH))
            .unwrap_or(false);

        if matches {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
