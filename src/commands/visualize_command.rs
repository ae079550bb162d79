//! Annotation visualization command

use std::path::PathBuf;

use clap::ArgMatches;

use crate::annotate::{visualization_path, visualize};
use crate::commands::command_traits::Command;
use crate::errors::{GeoTileError, GeoTileResult};

/// Command drawing YOLO boxes over one image
pub struct VisualizeCommand {
    /// Annotated image
    image: PathBuf,
    /// Label file
    labels: PathBuf,
    /// Rendered output
    output: PathBuf,
}

impl VisualizeCommand {
    /// Create a new visualize command
    ///
    /// # Arguments
    /// * `args` - Argument matches of the `visualize` subcommand
    ///
    /// # Returns
    /// A new VisualizeCommand instance or an error
    pub fn new(args: &ArgMatches) -> GeoTileResult<Self> {
        let image = args
            .get_one::<String>("image")
            .map(PathBuf::from)
            .ok_or_else(|| GeoTileError::InvalidConfig("missing --image".to_string()))?;

        let labels = args
            .get_one::<String>("labels")
            .map(PathBuf::from)
            .unwrap_or_else(|| image.with_extension("txt"));

        let output_dir = args.get_one::<String>("output-dir").map(PathBuf::from);
        let output = visualization_path(&image, output_dir.as_deref());

        Ok(VisualizeCommand { image, labels, output })
    }
}

impl Command for VisualizeCommand {
    fn execute(&self) -> GeoTileResult<()> {
        let result = visualize(&self.image, &self.labels, &self.output)?;
        println!("Saved {} ({} boxes)", result.output.display(), result.boxes.len());
        Ok(())
    }
}
