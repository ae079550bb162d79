//! Reference georeferencing from sidecar files
//!
//! GDAL keeps the georeferencing of plain JPEGs next to the image: a PAM
//! sidecar (`<name>.aux.xml`) with `SRS` and `GeoTransform`, or a world
//! file plus a `.prj`. The PAM sidecar is consulted first; whatever it does
//! not provide is taken from the world file and projection file.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::{GeoTileError, GeoTileResult};
use crate::georef::aux_xml::{aux_xml_path, AuxXmlDocument, GEOTRANSFORM_TAG, SRS_TAG};
use crate::georef::transform::Affine;
use crate::georef::writers::{projection_file_path, read_world_file, world_file_path};

/// Transform and CRS of a reference image
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceGeoref {
    /// Pixel to geographic transform
    pub transform: Affine,
    /// CRS as well-known text
    pub crs_wkt: String,
}

impl ReferenceGeoref {
    /// Read the georeferencing of `reference` from its sidecars
    ///
    /// # Arguments
    /// * `reference` - Path of the reference image
    ///
    /// # Returns
    /// The transform and CRS, or `MissingCrs` / `MissingTransform` if the
    /// sidecars do not provide them
    pub fn load(reference: &Path) -> GeoTileResult<Self> {
        let mut transform: Option<Affine> = None;
        let mut crs_wkt: Option<String> = None;

        let aux = aux_xml_path(reference);
        if aux.is_file() {
            match AuxXmlDocument::load(&aux) {
                Ok(document) => {
                    crs_wkt = non_empty(document.child_text(SRS_TAG)?);
                    if let Some(text) = non_empty(document.child_text(GEOTRANSFORM_TAG)?) {
                        transform = Some(Affine::parse_gdal_text(&text)?);
                    }
                }
                Err(GeoTileError::UnexpectedRootTag { path, found }) => {
                    warn!("Ignoring {}: unexpected root element <{}>", path.display(), found);
                }
                Err(e) => return Err(e),
            }
        }

        if transform.is_none() {
            if let Some(world_file) = find_world_file(reference) {
                debug!("Reading transform from {}", world_file.display());
                transform = Some(read_world_file(&world_file)?);
            }
        }

        if crs_wkt.is_none() {
            let prj = projection_file_path(reference);
            if prj.is_file() {
                debug!("Reading CRS from {}", prj.display());
                crs_wkt = non_empty(Some(fs::read_to_string(&prj)?));
            }
        }

        let crs_wkt = crs_wkt.ok_or_else(|| GeoTileError::MissingCrs(reference.to_path_buf()))?;
        let transform = transform.ok_or_else(|| GeoTileError::MissingTransform(reference.to_path_buf()))?;

        Ok(ReferenceGeoref { transform, crs_wkt })
    }
}

/// World file candidates GDAL looks for: `.jgw`, `.jpgw`, `.wld`
fn find_world_file(reference: &Path) -> Option<PathBuf> {
    let mut candidates = vec![world_file_path(reference)];
    if let Some(ext) = reference.extension().and_then(std::ffi::OsStr::to_str) {
        candidates.push(reference.with_extension(format!("{}w", ext)));
    }
    candidates.push(reference.with_extension("wld"));

    candidates.into_iter().find(|path| path.is_file())
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
