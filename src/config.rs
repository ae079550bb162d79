//! Batch configuration
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! config file, and command-line flags. A flag given on the command line
//! always wins over the file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::{debug, warn};

use crate::errors::{GeoTileError, GeoTileResult};
use crate::tiles::DEFAULT_TILE_REGEX;

/// Default tile edge length in pixels
pub const DEFAULT_TILE_SIZE: u32 = 512;
/// Default glob for reference images
pub const DEFAULT_REF_GLOB: &str = "*.jpg";
/// Default glob for tile images
pub const DEFAULT_TILE_GLOB: &str = "*";

/// Settings for one sidecar-generation run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Folder with reference images and their sidecars
    pub refs_dir: PathBuf,
    /// Folder with tile images
    pub tiles_dir: PathBuf,
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Distance between tile origins; `None` means `tile_size`
    pub stride: Option<u32>,
    pub recursive_refs: bool,
    pub recursive_tiles: bool,
    /// File-name glob selecting reference images
    pub ref_glob: String,
    /// File-name glob selecting candidate tiles; others are ignored silently
    pub tile_glob: String,
    /// Tail regex with `row` and `col` groups
    pub tile_regex: String,
    /// Read the captured pair as (col, row)
    pub swap_rowcol: bool,
    /// Optional per-tile run log
    pub log_file: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            refs_dir: PathBuf::new(),
            tiles_dir: PathBuf::new(),
            tile_size: DEFAULT_TILE_SIZE,
            stride: None,
            recursive_refs: false,
            recursive_tiles: false,
            ref_glob: DEFAULT_REF_GLOB.to_string(),
            tile_glob: DEFAULT_TILE_GLOB.to_string(),
            tile_regex: DEFAULT_TILE_REGEX.to_string(),
            swap_rowcol: false,
            log_file: None,
        }
    }
}

impl BatchConfig {
    /// Defaults for the given folders
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(refs_dir: P, tiles_dir: Q) -> Self {
        BatchConfig {
            refs_dir: refs_dir.into(),
            tiles_dir: tiles_dir.into(),
            ..BatchConfig::default()
        }
    }

    /// Stride actually used for offsets
    pub fn effective_stride(&self) -> u32 {
        self.stride.unwrap_or(self.tile_size)
    }

    /// Build the configuration from CLI arguments
    ///
    /// # Arguments
    /// * `args` - Matches of a batch subcommand
    ///
    /// # Returns
    /// The merged configuration; it is not validated yet
    pub fn from_args(args: &ArgMatches) -> GeoTileResult<Self> {
        let mut config = BatchConfig::default();

        if let Some(path) = args.get_one::<String>("config") {
            debug!("Loading config file {}", path);
            config.apply_file(Path::new(path))?;
        }

        if let Some(refs) = args.get_one::<String>("refs") {
            config.refs_dir = PathBuf::from(refs);
        }
        if let Some(tiles) = args.get_one::<String>("tiles") {
            config.tiles_dir = PathBuf::from(tiles);
        }
        if let Some(size) = args.get_one::<String>("tile-size") {
            config.tile_size = parse_pixels("--tile-size", size)?;
        }
        if let Some(stride) = args.get_one::<String>("stride") {
            config.stride = Some(parse_pixels("--stride", stride)?);
        }
        if args.get_flag("recursive-refs") {
            config.recursive_refs = true;
        }
        if args.get_flag("recursive-tiles") {
            config.recursive_tiles = true;
        }
        if let Some(glob) = args.get_one::<String>("ref-glob") {
            config.ref_glob = glob.clone();
        }
        if let Some(glob) = args.get_one::<String>("tile-glob") {
            config.tile_glob = glob.clone();
        }
        if let Some(regex) = args.get_one::<String>("tile-regex") {
            config.tile_regex = regex.clone();
        }
        if args.get_flag("swap-rowcol") {
            config.swap_rowcol = true;
        }
        if let Some(log_file) = args.get_one::<String>("log-file") {
            config.log_file = Some(PathBuf::from(log_file));
        }

        Ok(config)
    }

    /// Merge settings from a TOML file; relative paths resolve against the file's folder
    pub fn apply_file(&mut self, path: &Path) -> GeoTileResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeoTileError::InvalidConfig(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        self.apply_toml(&content, base)
    }

    /// Merge settings from TOML text
    pub fn apply_toml(&mut self, content: &str, base_dir: &Path) -> GeoTileResult<()> {
        let table = content
            .parse::<toml::Table>()
            .map_err(|e| GeoTileError::InvalidConfig(format!("failed to parse TOML: {}", e)))?;

        for (key, value) in &table {
            match key.as_str() {
                "refs" => self.refs_dir = base_dir.join(expect_str(key, value)?),
                "tiles" => self.tiles_dir = base_dir.join(expect_str(key, value)?),
                "log_file" => self.log_file = Some(base_dir.join(expect_str(key, value)?)),
                "tile_size" => self.tile_size = expect_pixels(key, value)?,
                "stride" => self.stride = Some(expect_pixels(key, value)?),
                "recursive_refs" => self.recursive_refs = expect_bool(key, value)?,
                "recursive_tiles" => self.recursive_tiles = expect_bool(key, value)?,
                "swap_rowcol" => self.swap_rowcol = expect_bool(key, value)?,
                "ref_glob" => self.ref_glob = expect_str(key, value)?.to_string(),
                "tile_glob" => self.tile_glob = expect_str(key, value)?.to_string(),
                "tile_regex" => self.tile_regex = expect_str(key, value)?.to_string(),
                other => warn!("Ignoring unknown config key '{}'", other),
            }
        }
        Ok(())
    }

    /// Check everything that makes a run impossible before it starts
    pub fn validate(&self) -> GeoTileResult<()> {
        if self.refs_dir.as_os_str().is_empty() {
            return Err(GeoTileError::InvalidConfig("missing references folder (--refs)".to_string()));
        }
        if self.tiles_dir.as_os_str().is_empty() {
            return Err(GeoTileError::InvalidConfig("missing tiles folder (--tiles)".to_string()));
        }
        if self.tile_size == 0 {
            return Err(GeoTileError::InvalidConfig("tile size must be positive".to_string()));
        }
        if self.effective_stride() == 0 {
            return Err(GeoTileError::InvalidConfig("stride must be positive".to_string()));
        }
        if !self.refs_dir.is_dir() {
            return Err(GeoTileError::FolderNotFound(self.refs_dir.clone()));
        }
        if !self.tiles_dir.is_dir() {
            return Err(GeoTileError::FolderNotFound(self.tiles_dir.clone()));
        }
        Ok(())
    }
}

fn parse_pixels(flag: &str, value: &str) -> GeoTileResult<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| GeoTileError::InvalidConfig(format!("{} expects a pixel count, got '{}'", flag, value)))
}

fn expect_str<'v>(key: &str, value: &'v toml::Value) -> GeoTileResult<&'v str> {
    value
        .as_str()
        .ok_or_else(|| GeoTileError::InvalidConfig(format!("config key '{}' must be a string", key)))
}

fn expect_bool(key: &str, value: &toml::Value) -> GeoTileResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| GeoTileError::InvalidConfig(format!("config key '{}' must be a boolean", key)))
}

fn expect_pixels(key: &str, value: &toml::Value) -> GeoTileResult<u32> {
    value
        .as_integer()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            GeoTileError::InvalidConfig(format!("config key '{}' must be a non-negative integer", key))
        })
}
