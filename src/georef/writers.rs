//! Plain-text sidecar writers
//!
//! World files (`.jgw`, `.pgw`, `.tfw`, `.wld`) and projection files (`.prj`).

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::{GeoTileError, GeoTileResult};
use crate::georef::transform::Affine;
use crate::utils::format_utils::format_fixed;

/// Decimals written per world-file coefficient
pub const WORLD_FILE_DECIMALS: usize = 12;

/// World-file extension for an image, chosen by its extension
pub fn world_file_extension(image: &Path) -> &'static str {
    let ext = image
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "jgw",
        "png" => "pgw",
        "tif" | "tiff" => "tfw",
        _ => "wld",
    }
}

/// Path of the world file belonging to `image`
pub fn world_file_path(image: &Path) -> PathBuf {
    image.with_extension(world_file_extension(image))
}

/// Path of the projection file belonging to `image`
pub fn projection_file_path(image: &Path) -> PathBuf {
    image.with_extension("prj")
}

/// Render a transform as world-file text: `A, D, B, E, C, F`, one per line
pub fn format_world_file(transform: &Affine) -> String {
    let mut out = String::new();
    for value in transform.to_world_file_order() {
        out.push_str(&format_fixed(value, WORLD_FILE_DECIMALS));
        out.push('\n');
    }
    out
}

/// Write a world file to `path`, replacing any existing file
pub fn write_world_file(path: &Path, transform: &Affine) -> GeoTileResult<()> {
    debug!("Writing world file {}", path.display());
    fs::write(path, format_world_file(transform))?;
    Ok(())
}

/// Parse world-file text (six numeric lines, blank lines ignored)
pub fn parse_world_file(content: &str) -> GeoTileResult<Affine> {
    let values = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>().map_err(|_| {
                GeoTileError::InvalidTransform(format!("world file line '{}' is not a number", line))
            })
        })
        .collect::<GeoTileResult<Vec<f64>>>()?;

    let ordered: [f64; 6] = values.as_slice().try_into().map_err(|_| {
        GeoTileError::InvalidTransform(format!("world file has {} values, expected 6", values.len()))
    })?;

    Ok(Affine::from_world_file_order(ordered))
}

/// Read a world file from disk
pub fn read_world_file(path: &Path) -> GeoTileResult<Affine> {
    let content = fs::read_to_string(path)?;
    parse_world_file(&content)
}

/// Write the CRS well-known text verbatim to `path`
pub fn write_projection_file(path: &Path, wkt: &str) -> GeoTileResult<()> {
    debug!("Writing projection file {}", path.display());
    fs::write(path, wkt)?;
    Ok(())
}
