//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod cli;
pub mod command_traits;
pub mod sidecar_command;
pub mod visualize_command;

pub use cli::build_cli;
pub use command_traits::{Command, CommandFactory};
pub use sidecar_command::SidecarCommand;
pub use visualize_command::VisualizeCommand;

use clap::ArgMatches;
use crate::batch::{AuxXmlStrategy, WorldFileStrategy};
use crate::errors::{GeoTileError, GeoTileResult};

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the selected subcommand and creates
/// the appropriate command instance for execution.
pub struct TileGeorefCommandFactory;

impl TileGeorefCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        TileGeorefCommandFactory
    }
}

impl Default for TileGeorefCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for TileGeorefCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> GeoTileResult<Box<dyn Command>> {
        match args.subcommand() {
            Some(("worldfile", sub)) => Ok(Box::new(SidecarCommand::new(sub, WorldFileStrategy)?)),
            Some(("auxxml", sub)) => Ok(Box::new(SidecarCommand::new(sub, AuxXmlStrategy)?)),
            Some(("visualize", sub)) => Ok(Box::new(VisualizeCommand::new(sub)?)),
            Some((other, _)) => Err(GeoTileError::InvalidConfig(format!("unknown command '{}'", other))),
            None => Err(GeoTileError::InvalidConfig("no command given".to_string())),
        }
    }
}
