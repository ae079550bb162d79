//! Affine geotransform handling
//!
//! Six coefficients mapping pixel (column, row) to geographic (X, Y):
//!
//! ```text
//! X = a * col + b * row + c
//! Y = d * col + e * row + f
//! ```
//!
//! GDAL stores the same values as `[c, a, b, f, d, e]`.

use crate::errors::{GeoTileError, GeoTileResult};
use crate::utils::format_utils::format_c_scientific;

/// Affine transformation values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    /// Pixel width (X change per column)
    pub a: f64,
    /// Row rotation (X change per row)
    pub b: f64,
    /// X of the upper-left corner of the upper-left pixel
    pub c: f64,
    /// Column rotation (Y change per column)
    pub d: f64,
    /// Pixel height (Y change per row), negative for north-up images
    pub e: f64,
    /// Y of the upper-left corner of the upper-left pixel
    pub f: f64,
}

/// Pixel offset of a tile inside its reference image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOffset {
    pub row: u64,
    pub col: u64,
}

impl PixelOffset {
    /// Offset of the tile at grid position (row, col) for the given stride
    ///
    /// Returns `None` when the offset does not fit in a `u64`.
    pub fn from_grid(row: u64, col: u64, stride: u32) -> Option<Self> {
        Some(PixelOffset {
            row: row.checked_mul(stride as u64)?,
            col: col.checked_mul(stride as u64)?,
        })
    }
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Affine { a, b, c, d, e, f }
    }

    /// Build from GDAL order `[c, a, b, f, d, e]`
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Affine::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// Coefficients in GDAL order `[c, a, b, f, d, e]`
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    /// Coefficients in ESRI world-file order `[A, D, B, E, C, F]`
    pub fn to_world_file_order(&self) -> [f64; 6] {
        [self.a, self.d, self.b, self.e, self.c, self.f]
    }

    /// Build from ESRI world-file order `[A, D, B, E, C, F]`
    pub fn from_world_file_order(values: [f64; 6]) -> Self {
        Affine::new(values[0], values[2], values[4], values[1], values[3], values[5])
    }

    /// Map a pixel position to geographic coordinates
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Compose with a pixel translation, i.e. `self * translation(col, row)`
    ///
    /// The scale and rotation terms are preserved; only the origin moves,
    /// so this holds for rotated and skewed transforms too.
    pub fn translated(&self, col_off: f64, row_off: f64) -> Self {
        let (c, f) = self.apply(col_off, row_off);
        Affine { c, f, ..*self }
    }

    /// Transform of a tile whose upper-left pixel sits at `offset` in this image
    pub fn shifted_by(&self, offset: PixelOffset) -> Self {
        self.translated(offset.col as f64, offset.row as f64)
    }

    /// Parse a GDAL `GeoTransform` element text (six comma-separated values)
    pub fn parse_gdal_text(text: &str) -> GeoTileResult<Self> {
        let values = text
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .map_err(|_| GeoTileError::InvalidTransform(format!("'{}' is not a number", part)))
            })
            .collect::<GeoTileResult<Vec<f64>>>()?;

        let gt: [f64; 6] = values.as_slice().try_into().map_err(|_| {
            GeoTileError::InvalidTransform(format!("expected 6 values, found {}", values.len()))
        })?;

        Ok(Affine::from_gdal(gt))
    }

    /// Format as GDAL writes it in PAM sidecars (`%24.16e` joined by commas)
    pub fn to_gdal_text(&self) -> String {
        self.to_gdal()
            .iter()
            .map(|v| format_c_scientific(*v, 16, 24))
            .collect::<Vec<_>>()
            .join(",")
    }
}
