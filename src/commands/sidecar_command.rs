//! Sidecar generation command
//!
//! This module implements the `worldfile` and `auxxml` commands, which share
//! the batch loop and differ only in their sidecar strategy.

use clap::ArgMatches;
use log::info;

use crate::batch::{run_batch, BatchSummary, SidecarStrategy};
use crate::commands::command_traits::Command;
use crate::config::BatchConfig;
use crate::errors::GeoTileResult;
use crate::utils::logger::Logger;

/// Command generating sidecars for a folder of tiles
pub struct SidecarCommand<S: SidecarStrategy> {
    /// Merged batch settings
    config: BatchConfig,
    /// Which sidecars to write
    strategy: S,
    /// Verbose per-tile logging (disables the progress bar)
    debug: bool,
}

impl<S: SidecarStrategy> SidecarCommand<S> {
    /// Create a new sidecar command
    ///
    /// # Arguments
    /// * `args` - Argument matches of the subcommand
    /// * `strategy` - Sidecar strategy to run
    ///
    /// # Returns
    /// A new SidecarCommand instance or a configuration error
    pub fn new(args: &ArgMatches, strategy: S) -> GeoTileResult<Self> {
        let config = BatchConfig::from_args(args)?;
        info!("References: {}", config.refs_dir.display());
        info!("Tiles: {}", config.tiles_dir.display());

        Ok(SidecarCommand {
            config,
            strategy,
            debug: args.get_flag("debug"),
        })
    }

    /// Run the batch and return its summary
    pub fn run(&self) -> GeoTileResult<BatchSummary> {
        let logger = match &self.config.log_file {
            Some(path) => Logger::new(path)?,
            None => Logger::sink(),
        };

        run_batch(&self.config, &self.strategy, &logger, !self.debug)
    }
}

impl<S: SidecarStrategy> Command for SidecarCommand<S> {
    fn execute(&self) -> GeoTileResult<()> {
        let summary = self.run()?;
        println!("{}", summary);
        Ok(())
    }
}
