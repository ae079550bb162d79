//! Reference lookup for tiles
//!
//! References are indexed by lower-cased file name and stem. A tile's
//! embedded reference name is tried as an exact name, then with the usual
//! JPEG extensions (optionally with a `_<frame>` suffix), then as a stem.
//! The last resort is a heuristic: the shortest indexed name that starts
//! with the base and contains the frame token. It can pick the wrong
//! reference when several references share a prefix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::{GeoTileError, GeoTileResult};
use crate::tiles::scan::list_files;

const REFERENCE_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// How a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Exact file name (including candidates built from base and frame)
    Name,
    /// File stem
    Stem,
    /// Shortest "starts with base, contains frame" name
    Heuristic,
}

/// Index of reference images by name and stem
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    by_name: HashMap<String, PathBuf>,
    by_stem: HashMap<String, PathBuf>,
    /// Lower-cased names in insertion order, for the heuristic scan
    names: Vec<String>,
}

impl ReferenceIndex {
    /// Create an empty index
    pub fn new() -> Self {
        ReferenceIndex::default()
    }

    /// Scan a references folder
    ///
    /// # Arguments
    /// * `dir` - References folder
    /// * `glob` - File-name pattern, e.g. `*.jpg`
    /// * `recursive` - Descend into sub-folders
    ///
    /// # Returns
    /// The index, or `NoReferences` if nothing matched
    pub fn scan(dir: &Path, glob: &str, recursive: bool) -> GeoTileResult<Self> {
        let mut index = ReferenceIndex::new();
        for path in list_files(dir, glob, recursive)? {
            index.insert(path);
        }

        if index.is_empty() {
            return Err(GeoTileError::NoReferences {
                dir: dir.to_path_buf(),
                glob: glob.to_string(),
            });
        }

        debug!("Indexed {} reference images from {}", index.len(), dir.display());
        Ok(index)
    }

    /// Add a reference; the first path seen for a name wins
    pub fn insert(&mut self, path: PathBuf) {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_lowercase(),
            None => {
                warn!("Ignoring reference with non UTF-8 name: {}", path.display());
                return;
            }
        };

        if let Some(existing) = self.by_name.get(&name) {
            warn!(
                "Duplicate reference name '{}': keeping {}, ignoring {}",
                name,
                existing.display(),
                path.display()
            );
            return;
        }

        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            self.by_stem.entry(stem.to_lowercase()).or_insert_with(|| path.clone());
        }
        self.names.push(name.clone());
        self.by_name.insert(name, path);
    }

    /// Number of indexed references
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Find the reference for a tile
    ///
    /// # Arguments
    /// * `reference` - Reference file name or base name extracted from the tile
    /// * `frame` - Optional frame token
    ///
    /// # Returns
    /// The reference path and how it was matched, or `None`
    pub fn resolve(&self, reference: &str, frame: Option<&str>) -> Option<(&Path, MatchKind)> {
        let reference = reference.to_lowercase();
        let frame = frame.map(str::to_lowercase).filter(|f| !f.is_empty());
        let base = strip_reference_extension(&reference);

        let mut candidates = vec![reference.clone()];
        for ext in REFERENCE_EXTENSIONS {
            candidates.push(format!("{}.{}", base, ext));
        }
        if let Some(frame) = &frame {
            for ext in REFERENCE_EXTENSIONS {
                candidates.push(format!("{}_{}.{}", base, frame, ext));
            }
        }

        for candidate in &candidates {
            if let Some(path) = self.by_name.get(candidate) {
                return Some((path.as_path(), MatchKind::Name));
            }
        }

        let mut stems = vec![base.to_string()];
        if let Some(frame) = &frame {
            stems.push(format!("{}_{}", base, frame));
        }
        for stem in &stems {
            if let Some(path) = self.by_stem.get(stem) {
                return Some((path.as_path(), MatchKind::Stem));
            }
        }

        self.heuristic_match(base, frame.as_deref())
            .map(|path| (path, MatchKind::Heuristic))
    }

    /// Shortest name starting with `base` and containing `frame`
    fn heuristic_match(&self, base: &str, frame: Option<&str>) -> Option<&Path> {
        if base.is_empty() {
            return None;
        }

        self.names
            .iter()
            .filter(|name| name.starts_with(base))
            .filter(|name| frame.map_or(true, |f| name.contains(f)))
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .and_then(|name| self.by_name.get(name))
            .map(PathBuf::as_path)
    }
}

/// Drop a trailing `.jpg`/`.jpeg` (already lower-cased input)
fn strip_reference_extension(name: &str) -> &str {
    for ext in REFERENCE_EXTENSIONS {
        if let Some(stripped) = name.strip_suffix(&format!(".{}", ext)) {
            return stripped;
        }
    }
    name
}
