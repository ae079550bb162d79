//! Per-run cache of loaded reference georeferencing
//!
//! Each reference is loaded at most once per run. Failures are remembered
//! too, so tiles of a broken reference are skipped without re-reading it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{GeoTileError, GeoTileResult};

/// Outcome of a cache lookup
#[derive(Debug)]
pub enum CacheLookup<'a, G> {
    /// Loaded now or earlier
    Ready(&'a G),
    /// Loading failed just now
    Failed(GeoTileError),
    /// Loading failed on an earlier lookup; carries the original message
    PreviouslyFailed(&'a str),
}

/// Reference cache owned by a single batch run
#[derive(Debug)]
pub struct ReferenceCache<G> {
    entries: HashMap<PathBuf, Result<G, String>>,
    loads: usize,
}

impl<G> Default for ReferenceCache<G> {
    fn default() -> Self {
        ReferenceCache {
            entries: HashMap::new(),
            loads: 0,
        }
    }
}

impl<G> ReferenceCache<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `path`, calling `loader` only on the first request
    pub fn get_or_load<F>(&mut self, path: &Path, loader: F) -> CacheLookup<'_, G>
    where
        F: FnOnce(&Path) -> GeoTileResult<G>,
    {
        match self.entries.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => match entry.into_mut() {
                Ok(georef) => CacheLookup::Ready(georef),
                Err(message) => CacheLookup::PreviouslyFailed(message.as_str()),
            },
            Entry::Vacant(entry) => {
                self.loads += 1;
                match loader(path) {
                    Ok(georef) => match entry.insert(Ok(georef)) {
                        Ok(georef) => CacheLookup::Ready(georef),
                        Err(message) => CacheLookup::PreviouslyFailed(message.as_str()),
                    },
                    Err(e) => {
                        entry.insert(Err(e.to_string()));
                        CacheLookup::Failed(e)
                    }
                }
            }
        }
    }

    /// Number of times a loader was invoked
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Number of references that loaded successfully
    pub fn loaded(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_ok()).count()
    }
}
