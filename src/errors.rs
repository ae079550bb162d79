//! Custom error types for tile georeferencing

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error types raised while georeferencing tiles or rendering annotations
#[derive(Debug)]
pub enum GeoTileError {
    /// I/O error
    IoError(io::Error),
    /// Image could not be opened or decoded
    ImageError(image::ImageError),
    /// Input folder does not exist
    FolderNotFound(PathBuf),
    /// Reference scan produced no files
    NoReferences { dir: PathBuf, glob: String },
    /// Invalid user configuration (flags, regex, config file)
    InvalidConfig(String),
    /// Reference has no CRS, even after consulting its sidecars
    MissingCrs(PathBuf),
    /// Reference has no usable geotransform
    MissingTransform(PathBuf),
    /// Geotransform text could not be parsed
    InvalidTransform(String),
    /// Auxiliary XML has an unexpected root element
    UnexpectedRootTag { path: PathBuf, found: String },
    /// XML parse or write failure
    XmlError(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for GeoTileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoTileError::IoError(e) => write!(f, "I/O error: {}", e),
            GeoTileError::ImageError(e) => write!(f, "Image error: {}", e),
            GeoTileError::FolderNotFound(p) => write!(f, "Folder not found: {}", p.display()),
            GeoTileError::NoReferences { dir, glob } => {
                write!(f, "No reference images found in {} using glob '{}'", dir.display(), glob)
            }
            GeoTileError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            GeoTileError::MissingCrs(p) => {
                write!(f, "Reference has no CRS (even after reading its sidecars): {}", p.display())
            }
            GeoTileError::MissingTransform(p) => {
                write!(f, "Reference has no GeoTransform: {}", p.display())
            }
            GeoTileError::InvalidTransform(msg) => write!(f, "Invalid GeoTransform: {}", msg),
            GeoTileError::UnexpectedRootTag { path, found } => write!(
                f,
                "Unexpected root element <{}> in {} (expected <PAMDataset>)",
                found,
                path.display()
            ),
            GeoTileError::XmlError(msg) => write!(f, "XML error: {}", msg),
            GeoTileError::GenericError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for GeoTileError {}

impl From<io::Error> for GeoTileError {
    fn from(error: io::Error) -> Self {
        GeoTileError::IoError(error)
    }
}

impl From<image::ImageError> for GeoTileError {
    fn from(error: image::ImageError) -> Self {
        GeoTileError::ImageError(error)
    }
}

impl From<regex::Error> for GeoTileError {
    fn from(error: regex::Error) -> Self {
        GeoTileError::InvalidConfig(format!("invalid regex: {}", error))
    }
}

impl From<glob::PatternError> for GeoTileError {
    fn from(error: glob::PatternError) -> Self {
        GeoTileError::InvalidConfig(format!("invalid glob: {}", error))
    }
}

impl From<walkdir::Error> for GeoTileError {
    fn from(error: walkdir::Error) -> Self {
        GeoTileError::GenericError(format!("directory walk failed: {}", error))
    }
}

impl From<String> for GeoTileError {
    fn from(msg: String) -> Self {
        GeoTileError::GenericError(msg)
    }
}

/// Result type for georeferencing operations
pub type GeoTileResult<T> = Result<T, GeoTileError>;
