//! Command-line definition

use clap::{Arg, ArgAction, Command as ClapCommand};

use crate::config::{DEFAULT_REF_GLOB, DEFAULT_TILE_GLOB, DEFAULT_TILE_SIZE};
use crate::tiles::DEFAULT_TILE_REGEX;

/// Arguments shared by the sidecar-generation subcommands
///
/// Value arguments carry no clap defaults so that an unset flag does not
/// override the config file; defaults live in `BatchConfig`.
fn batch_args() -> Vec<Arg> {
    vec![
        Arg::new("refs")
            .long("refs")
            .help("Folder containing reference images with their sidecars")
            .value_name("DIR"),
        Arg::new("tiles")
            .long("tiles")
            .help("Folder containing tile images")
            .value_name("DIR"),
        Arg::new("tile-size")
            .long("tile-size")
            .help(format!("Tile size in px (default {})", DEFAULT_TILE_SIZE))
            .value_name("PX"),
        Arg::new("stride")
            .long("stride")
            .help("Stride in px (default = tile size); with overlap, stride = tile size - overlap")
            .value_name("PX"),
        Arg::new("recursive-refs")
            .long("recursive-refs")
            .help("Scan the references folder recursively")
            .action(ArgAction::SetTrue),
        Arg::new("recursive-tiles")
            .long("recursive-tiles")
            .help("Scan the tiles folder recursively")
            .action(ArgAction::SetTrue),
        Arg::new("ref-glob")
            .long("ref-glob")
            .help(format!("Glob for reference images (default {})", DEFAULT_REF_GLOB))
            .value_name("GLOB"),
        Arg::new("tile-glob")
            .long("tile-glob")
            .help(format!("Glob selecting tile candidates (default {})", DEFAULT_TILE_GLOB))
            .value_name("GLOB"),
        Arg::new("tile-regex")
            .long("tile-regex")
            .help(format!(
                "Regex parsing tile row/col; needs named groups row and col, optional base and frame (default {})",
                DEFAULT_TILE_REGEX
            ))
            .value_name("REGEX"),
        Arg::new("swap-rowcol")
            .long("swap-rowcol")
            .help("Interpret the parsed pair as column/row")
            .action(ArgAction::SetTrue),
        Arg::new("config")
            .long("config")
            .help("TOML file with defaults for these flags")
            .value_name("FILE"),
        Arg::new("log-file")
            .long("log-file")
            .help("Write one line per tile outcome to this file")
            .value_name("FILE"),
    ]
}

/// Build the `tilegeoref` command line
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("tilegeoref")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Regenerate georeferencing sidecars for image tiles and inspect detection labels")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable verbose per-tile logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            ClapCommand::new("worldfile")
                .about("Write a world file and .prj per tile from reference .aux.xml / world files")
                .args(batch_args()),
        )
        .subcommand(
            ClapCommand::new("auxxml")
                .about("Write <tile>.aux.xml per tile, cloned from the reference .aux.xml")
                .args(batch_args()),
        )
        .subcommand(
            ClapCommand::new("visualize")
                .about("Draw YOLO label boxes over an image and save <name>_vis.jpg")
                .arg(
                    Arg::new("image")
                        .long("image")
                        .help("Annotated image")
                        .value_name("FILE")
                        .required(true),
                )
                .arg(
                    Arg::new("labels")
                        .long("labels")
                        .help("YOLO label file (default: image path with .txt extension)")
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .help("Folder for the rendered image (default: next to the image)")
                        .value_name("DIR"),
                ),
        )
}
