pub mod errors;
pub mod config;
pub mod utils;
pub mod tiles;
pub mod georef;
pub mod batch;
pub mod annotate;
pub mod commands;

pub use errors::{GeoTileError, GeoTileResult};
pub use config::BatchConfig;
pub use batch::{run_batch, AuxXmlStrategy, BatchSummary, SidecarStrategy, WorldFileStrategy};
pub use georef::{Affine, PixelOffset};
pub use tiles::{ReferenceIndex, TileNameParser};
