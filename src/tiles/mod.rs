//! Tile and reference discovery
//!
//! This module parses tile filenames, scans folders, and maps each tile
//! to the reference image it was cut from.

pub mod name_parser;
pub mod resolver;
pub mod scan;

pub use name_parser::{TileName, TileNameParser, DEFAULT_TILE_REGEX, strip_hex_prefix, embedded_reference_name};
pub use resolver::{MatchKind, ReferenceIndex};
pub use scan::list_files;
