//! Batch sidecar generation
//!
//! Walks the tiles folder once, maps every tile to its reference, and
//! writes sidecars through a [`SidecarStrategy`]. Problems with single
//! tiles or references are counted in the [`BatchSummary`]; only
//! configuration problems abort the run.

mod strategy;

pub use strategy::{AuxXmlStrategy, SidecarStrategy, WorldFileStrategy};

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::BatchConfig;
use crate::errors::GeoTileResult;
use crate::georef::{CacheLookup, PixelOffset, ReferenceCache};
use crate::tiles::{list_files, MatchKind, ReferenceIndex, TileNameParser};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Tiles whose sidecars were written
    pub processed: usize,
    /// Tiles whose name did not match the expected pattern or whose grid
    /// position is out of range
    pub skipped_name: usize,
    /// Tiles that could not be opened as images
    pub skipped_unreadable: usize,
    /// Tiles without a matching reference
    pub no_reference: usize,
    /// References that failed to load (each counted once)
    pub reference_errors: usize,
    /// Tiles skipped because their reference failed to load
    pub skipped_reference: usize,
    /// Tiles whose sidecars could not be written
    pub write_errors: usize,
    /// References loaded successfully
    pub references_loaded: usize,
    /// Tile size setting
    pub tile_size: u32,
    /// Stride used for offsets
    pub stride: u32,
}

impl BatchSummary {
    fn for_config(config: &BatchConfig) -> Self {
        BatchSummary {
            tile_size: config.tile_size,
            stride: config.effective_stride(),
            ..BatchSummary::default()
        }
    }

    /// All tiles that did not get sidecars
    pub fn skipped(&self) -> usize {
        self.skipped_name
            + self.skipped_unreadable
            + self.no_reference
            + self.skipped_reference
            + self.write_errors
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Done.")?;
        writeln!(f, "Processed tiles: {}", self.processed)?;
        writeln!(f, "Skipped (name mismatch): {}", self.skipped_name)?;
        writeln!(f, "Skipped (unreadable image): {}", self.skipped_unreadable)?;
        writeln!(f, "No matching reference found: {}", self.no_reference)?;
        writeln!(f, "Reference read errors: {} ({} tiles skipped)", self.reference_errors, self.skipped_reference)?;
        writeln!(f, "Sidecar write errors: {}", self.write_errors)?;
        writeln!(f, "Skipped (total): {}", self.skipped())?;
        write!(f, "Stride used: {}px (tile size: {}px)", self.stride, self.tile_size)
    }
}

/// What happened to a single tile
#[derive(Debug)]
enum TileOutcome {
    Processed(Vec<PathBuf>),
    NameMismatch,
    GridOverflow { row: u64, col: u64 },
    NoReference(String),
    ReferenceError { reference: PathBuf, message: String },
    ReferenceSkipped { reference: PathBuf, message: String },
    Unreadable(String),
    WriteError(String),
}

/// Generate sidecars for every tile under `config.tiles_dir`
///
/// # Arguments
/// * `config` - Batch settings
/// * `strategy` - Which sidecars to produce
/// * `logger` - Run log receiving one line per tile
/// * `show_progress` - Draw a progress bar
///
/// # Returns
/// The run summary, or an error for configuration problems (missing
/// folders, no references, invalid patterns)
pub fn run_batch<S: SidecarStrategy>(
    config: &BatchConfig,
    strategy: &S,
    logger: &Logger,
    show_progress: bool,
) -> GeoTileResult<BatchSummary> {
    config.validate()?;

    let parser = TileNameParser::new(&config.tile_regex, config.swap_rowcol)?;
    let references = ReferenceIndex::scan(&config.refs_dir, &config.ref_glob, config.recursive_refs)?;
    let tiles = list_files(&config.tiles_dir, &config.tile_glob, config.recursive_tiles)?;

    info!(
        "[{}] {} references, {} candidate tiles, stride {}px",
        strategy.name(),
        references.len(),
        tiles.len(),
        config.effective_stride()
    );

    let progress = if show_progress {
        ProgressTracker::new(tiles.len() as u64, strategy.name())
    } else {
        ProgressTracker::hidden()
    };

    let mut cache: ReferenceCache<S::Reference> = ReferenceCache::new();
    let mut summary = BatchSummary::for_config(config);

    for tile in &tiles {
        let outcome = process_tile(tile, config, &parser, &references, &mut cache, strategy);
        record_outcome(&mut summary, tile, outcome, logger);
        progress.increment(1);
    }

    progress.finish();
    summary.references_loaded = cache.loaded();
    debug!("Loaded {} references ({} attempts)", cache.loaded(), cache.loads());

    Ok(summary)
}

fn process_tile<S: SidecarStrategy>(
    tile: &Path,
    config: &BatchConfig,
    parser: &TileNameParser,
    references: &ReferenceIndex,
    cache: &mut ReferenceCache<S::Reference>,
    strategy: &S,
) -> TileOutcome {
    let parsed = match tile
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| parser.parse(name))
    {
        Some(parsed) => parsed,
        None => return TileOutcome::NameMismatch,
    };

    let offset = match PixelOffset::from_grid(parsed.row, parsed.col, config.effective_stride()) {
        Some(offset) => offset,
        None => {
            return TileOutcome::GridOverflow {
                row: parsed.row,
                col: parsed.col,
            }
        }
    };

    let (reference_path, kind) = match references.resolve(&parsed.reference, parsed.frame.as_deref()) {
        Some(found) => found,
        None => return TileOutcome::NoReference(parsed.reference),
    };
    if kind == MatchKind::Heuristic {
        debug!("{} matched {} heuristically", tile.display(), reference_path.display());
    }

    let reference = match cache.get_or_load(reference_path, |path| strategy.load_reference(path)) {
        CacheLookup::Ready(reference) => reference,
        CacheLookup::Failed(e) => {
            return TileOutcome::ReferenceError {
                reference: reference_path.to_path_buf(),
                message: e.to_string(),
            }
        }
        CacheLookup::PreviouslyFailed(message) => {
            return TileOutcome::ReferenceSkipped {
                reference: reference_path.to_path_buf(),
                message: message.to_string(),
            }
        }
    };

    // Edge tiles may be smaller than the tile size; they only need to open
    match image::image_dimensions(tile) {
        Ok((width, height)) => {
            if width != config.tile_size || height != config.tile_size {
                debug!("{} is {}x{} (tile size {})", tile.display(), width, height, config.tile_size);
            }
        }
        Err(e) => return TileOutcome::Unreadable(e.to_string()),
    }

    let transform = strategy.reference_transform(reference).shifted_by(offset);
    debug!(
        "{} -> row {} col {} offset ({}, {}) from {}",
        tile.display(),
        parsed.row,
        parsed.col,
        offset.row,
        offset.col,
        reference_path.display()
    );

    match strategy.write_sidecars(reference, tile, &transform) {
        Ok(written) => TileOutcome::Processed(written),
        Err(e) => TileOutcome::WriteError(e.to_string()),
    }
}

fn record_outcome(summary: &mut BatchSummary, tile: &Path, outcome: TileOutcome, logger: &Logger) {
    let logged = match outcome {
        TileOutcome::Processed(written) => {
            summary.processed += 1;
            debug!("Wrote {} sidecar(s) for {}", written.len(), tile.display());
            logger.log_outcome("processed", tile, None)
        }
        TileOutcome::NameMismatch => {
            summary.skipped_name += 1;
            debug!("Skipping {}: name does not match", tile.display());
            logger.log_outcome("skipped-name", tile, None)
        }
        TileOutcome::GridOverflow { row, col } => {
            summary.skipped_name += 1;
            let detail = format!("grid position {}/{} is out of range", row, col);
            warn!("Skipping {}: {}", tile.display(), detail);
            logger.log_outcome("skipped-name", tile, Some(detail.as_str()))
        }
        TileOutcome::NoReference(reference) => {
            summary.no_reference += 1;
            debug!("No reference '{}' for {}", reference, tile.display());
            logger.log_outcome("no-reference", tile, Some(reference.as_str()))
        }
        TileOutcome::ReferenceError { reference, message } => {
            summary.reference_errors += 1;
            summary.skipped_reference += 1;
            warn!("[REF ERROR] {} -> {}", reference.display(), message);
            logger.log_outcome("reference-error", tile, Some(message.as_str()))
        }
        TileOutcome::ReferenceSkipped { reference, message } => {
            summary.skipped_reference += 1;
            debug!("Skipping {}: reference {} failed earlier", tile.display(), reference.display());
            logger.log_outcome("reference-skipped", tile, Some(message.as_str()))
        }
        TileOutcome::Unreadable(message) => {
            summary.skipped_unreadable += 1;
            debug!("Skipping {}: {}", tile.display(), message);
            logger.log_outcome("unreadable", tile, Some(message.as_str()))
        }
        TileOutcome::WriteError(message) => {
            summary.write_errors += 1;
            warn!("Failed to write sidecars for {}: {}", tile.display(), message);
            logger.log_outcome("write-error", tile, Some(message.as_str()))
        }
    };

    if let Err(e) = logged {
        warn!("Failed to write run log: {}", e);
    }
}
