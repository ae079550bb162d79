//! Tile filename parsing
//!
//! Tile names look like
//! `ffbdc372-20210911_..._Nadir.jpg_119_sharp_augment_2_0_12_34.jpg`:
//! an optional 8-hex-digit prefix, the reference filename, arbitrary
//! augmentation noise, and a `_<row>_<col>.<ext>` tail.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::errors::{GeoTileError, GeoTileResult};

/// Default tail pattern: trailing `_<row>_<col>.<ext>`
pub const DEFAULT_TILE_REGEX: &str = r"_(?P<row>\d+)_(?P<col>\d+)\.(jpg|jpeg|png)$";

lazy_static! {
    static ref LEADING_HEX_PREFIX: Regex = Regex::new(r"^[0-9a-fA-F]{8}-")
        .expect("static prefix pattern is valid");
    static ref REFERENCE_EXTENSION: Regex = Regex::new(r"(?i)\.(jpg|jpeg)")
        .expect("static extension pattern is valid");
}

/// Fields recovered from a tile filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileName {
    /// Tile row in the reference grid
    pub row: u64,
    /// Tile column in the reference grid
    pub col: u64,
    /// Reference filename (or base name) embedded in the tile name
    pub reference: String,
    /// Optional frame token, from a `frame` group in the tail pattern
    pub frame: Option<String>,
}

/// Remove a leading `ffbdc372-` style prefix, if present
pub fn strip_hex_prefix(name: &str) -> &str {
    match LEADING_HEX_PREFIX.find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    }
}

/// Everything up to and including the first `.jpg`/`.jpeg`
pub fn embedded_reference_name(name: &str) -> Option<&str> {
    REFERENCE_EXTENSION.find(name).map(|m| &name[..m.end()])
}

/// Parser for tile filenames with a configurable tail pattern
#[derive(Debug, Clone)]
pub struct TileNameParser {
    tail: Regex,
    swap_rowcol: bool,
}

impl TileNameParser {
    /// Create a parser from a tail regex
    ///
    /// # Arguments
    /// * `pattern` - Regex with named groups `row` and `col`; optional
    ///   groups `base` and `frame` override the embedded reference name
    /// * `swap_rowcol` - Interpret the captured pair as column/row instead
    ///
    /// # Returns
    /// The parser, or a configuration error if the regex is invalid or
    /// lacks the required groups
    pub fn new(pattern: &str, swap_rowcol: bool) -> GeoTileResult<Self> {
        let tail = RegexBuilder::new(pattern).case_insensitive(true).build()?;

        let names: Vec<&str> = tail.capture_names().flatten().collect();
        for required in ["row", "col"] {
            if !names.contains(&required) {
                return Err(GeoTileError::InvalidConfig(format!(
                    "tile regex '{}' must define a named group '{}'",
                    pattern, required
                )));
            }
        }

        Ok(TileNameParser { tail, swap_rowcol })
    }

    /// Parser with the default tail pattern
    pub fn with_defaults() -> GeoTileResult<Self> {
        Self::new(DEFAULT_TILE_REGEX, false)
    }

    /// Extract (row, col) from the tail of a filename
    pub fn parse_row_col(&self, file_name: &str) -> Option<(u64, u64)> {
        let caps = self.tail.captures(file_name)?;
        self.row_col_from(&caps)
    }

    fn row_col_from(&self, caps: &regex::Captures<'_>) -> Option<(u64, u64)> {
        let first = caps.name("row")?.as_str().parse::<u64>().ok()?;
        let second = caps.name("col")?.as_str().parse::<u64>().ok()?;

        if self.swap_rowcol {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    /// Parse a tile filename
    ///
    /// Returns `None` when the tail does not match or no reference name is
    /// embedded; callers count that as a skipped tile.
    pub fn parse(&self, file_name: &str) -> Option<TileName> {
        let caps = self.tail.captures(file_name)?;
        let (row, col) = self.row_col_from(&caps)?;
        let frame = caps.name("frame").map(|m| m.as_str().to_string());

        let reference = match caps.name("base") {
            Some(base) => strip_hex_prefix(base.as_str()).to_string(),
            None => embedded_reference_name(strip_hex_prefix(file_name))?.to_string(),
        };

        if reference.is_empty() {
            return None;
        }

        Some(TileName {
            row,
            col,
            reference,
            frame,
        })
    }
}
