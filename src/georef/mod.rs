//! Georeferencing of tiles
//!
//! This module holds the affine transform type, readers for reference
//! georeferencing, the per-run reference cache, and the sidecar writers.

pub mod transform;
pub mod writers;
pub mod aux_xml;
pub mod loader;
pub mod cache;
#[cfg(test)]
mod tests;

pub use transform::{Affine, PixelOffset};
pub use aux_xml::{aux_xml_path, AuxXmlDocument, AuxXmlReference};
pub use loader::ReferenceGeoref;
pub use cache::{CacheLookup, ReferenceCache};
pub use writers::{
    read_world_file, world_file_extension, world_file_path, projection_file_path,
    write_projection_file, write_world_file,
};
