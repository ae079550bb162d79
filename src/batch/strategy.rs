//! Sidecar strategies
//!
//! A strategy knows how to load a reference's georeferencing and how to
//! write the sidecars of one tile from it. The batch loop is shared.

use std::path::{Path, PathBuf};

use crate::errors::GeoTileResult;
use crate::georef::{
    projection_file_path, world_file_path, write_projection_file, write_world_file, Affine,
    AuxXmlReference, ReferenceGeoref,
};

/// Strategy for producing tile sidecars from a reference
pub trait SidecarStrategy {
    /// Georeferencing loaded once per reference
    type Reference;

    /// Short name used in logs and the summary
    fn name(&self) -> &'static str;

    /// Load the georeferencing of a reference image
    ///
    /// # Arguments
    /// * `reference` - Path of the reference image
    ///
    /// # Returns
    /// The loaded georeferencing, or an error that skips the reference's tiles
    fn load_reference(&self, reference: &Path) -> GeoTileResult<Self::Reference>;

    /// Transform of the reference image
    fn reference_transform(&self, reference: &Self::Reference) -> Affine;

    /// Write the sidecars of one tile
    ///
    /// # Arguments
    /// * `reference` - Cached reference georeferencing
    /// * `tile` - Path of the tile image
    /// * `transform` - Already shifted transform of the tile
    ///
    /// # Returns
    /// Paths of the files written
    fn write_sidecars(
        &self,
        reference: &Self::Reference,
        tile: &Path,
        transform: &Affine,
    ) -> GeoTileResult<Vec<PathBuf>>;
}

/// World file + `.prj` per tile, from `.aux.xml` or world-file references
#[derive(Debug, Default, Clone, Copy)]
pub struct WorldFileStrategy;

impl SidecarStrategy for WorldFileStrategy {
    type Reference = ReferenceGeoref;

    fn name(&self) -> &'static str {
        "worldfile"
    }

    fn load_reference(&self, reference: &Path) -> GeoTileResult<ReferenceGeoref> {
        ReferenceGeoref::load(reference)
    }

    fn reference_transform(&self, reference: &ReferenceGeoref) -> Affine {
        reference.transform
    }

    fn write_sidecars(
        &self,
        reference: &ReferenceGeoref,
        tile: &Path,
        transform: &Affine,
    ) -> GeoTileResult<Vec<PathBuf>> {
        let world_file = world_file_path(tile);
        write_world_file(&world_file, transform)?;

        let prj = projection_file_path(tile);
        write_projection_file(&prj, &reference.crs_wkt)?;

        Ok(vec![world_file, prj])
    }
}

/// Clone of the reference `.aux.xml` per tile
#[derive(Debug, Default, Clone, Copy)]
pub struct AuxXmlStrategy;

impl SidecarStrategy for AuxXmlStrategy {
    type Reference = AuxXmlReference;

    fn name(&self) -> &'static str {
        "auxxml"
    }

    fn load_reference(&self, reference: &Path) -> GeoTileResult<AuxXmlReference> {
        AuxXmlReference::load(reference)
    }

    fn reference_transform(&self, reference: &AuxXmlReference) -> Affine {
        reference.transform
    }

    fn write_sidecars(
        &self,
        reference: &AuxXmlReference,
        tile: &Path,
        transform: &Affine,
    ) -> GeoTileResult<Vec<PathBuf>> {
        Ok(vec![reference.write_tile_sidecar(tile, transform)?])
    }
}
