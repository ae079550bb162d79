//! Integration tests for whole sidecar-generation runs

extern crate std;

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use tilegeoref::commands::{build_cli, CommandFactory, SidecarCommand, TileGeorefCommandFactory};
use tilegeoref::georef::{aux_xml_path, read_world_file, AuxXmlDocument};
use tilegeoref::utils::logger::Logger;
use tilegeoref::{run_batch, Affine, AuxXmlStrategy, BatchConfig, GeoTileError, WorldFileStrategy};

const WKT: &str = "PROJCS[\"WGS 84 / UTM zone 32N\",GEOGCS[\"WGS 84\"]]";
const REFERENCE: &str = "20210911_flight3_Nadir.jpg";

struct Workspace {
    _dir: tempfile::TempDir,
    refs: PathBuf,
    tiles: PathBuf,
}

fn write_image(path: &Path, size: u32) {
    RgbImage::from_pixel(size, size, Rgb([90, 120, 60])).save(path).unwrap();
}

fn reference_sidecar() -> String {
    format!(
        "<PAMDataset>\n  <SRS>{}</SRS>\n  <GeoTransform>  4.5000000000000000e+05,  2.5000000000000000e-01,  0.0000000000000000e+00,  5.0000000000000000e+06,  0.0000000000000000e+00, -2.5000000000000000e-01</GeoTransform>\n</PAMDataset>\n",
        WKT.replace('"', "&quot;")
    )
}

/// refs/ with one georeferenced reference, tiles/ with a few tiles
fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let refs = dir.path().join("refs");
    let tiles = dir.path().join("tiles");
    fs::create_dir(&refs).unwrap();
    fs::create_dir(&tiles).unwrap();

    write_image(&refs.join(REFERENCE), 8);
    fs::write(aux_xml_path(&refs.join(REFERENCE)), reference_sidecar()).unwrap();

    write_image(&tiles.join(format!("ffbdc372-{}_119_sharp_augment_2_0_2_3.jpg", REFERENCE)), 4);
    write_image(&tiles.join(format!("{}_0_0.jpg", REFERENCE)), 4);
    // no row/col tail
    write_image(&tiles.join(format!("{}_preview.jpg", REFERENCE)), 4);
    // unknown reference
    write_image(&tiles.join("other_scene.jpg_1_1.jpg"), 4);
    // not an image
    fs::write(tiles.join(format!("{}_5_5.jpg", REFERENCE)), b"not a jpeg").unwrap();

    Workspace { _dir: dir, refs, tiles }
}

#[test]
fn test_worldfile_run() {
    let ws = workspace();
    let config = BatchConfig::new(&ws.refs, &ws.tiles);

    let summary = run_batch(&config, &WorldFileStrategy, &Logger::sink(), false).unwrap();

    std::assert_eq!(summary.processed, 2);
    std::assert_eq!(summary.skipped_name, 1);
    std::assert_eq!(summary.no_reference, 1);
    std::assert_eq!(summary.skipped_unreadable, 1);
    std::assert_eq!(summary.reference_errors, 0);
    std::assert_eq!(summary.references_loaded, 1);
    std::assert_eq!(summary.stride, 512);
    std::assert_eq!(summary.skipped(), 3);
    std::assert!(summary.to_string().contains("Skipped (total): 3"));

    let tile = ws.tiles.join(format!("ffbdc372-{}_119_sharp_augment_2_0_2_3.jpg", REFERENCE));
    let world = read_world_file(&tile.with_extension("jgw")).unwrap();
    std::assert_eq!(world, Affine::new(0.25, 0.0, 450000.0 + 3.0 * 512.0 * 0.25, 0.0, -0.25, 5000000.0 - 2.0 * 512.0 * 0.25));
    std::assert_eq!(fs::read_to_string(tile.with_extension("prj")).unwrap(), WKT);

    let origin = ws.tiles.join(format!("{}_0_0.jpg", REFERENCE));
    std::assert_eq!(read_world_file(&origin.with_extension("jgw")).unwrap(), Affine::new(0.25, 0.0, 450000.0, 0.0, -0.25, 5000000.0));

    std::assert!(!ws.tiles.join("other_scene.jpg_1_1.jgw").exists());
}

#[test]
fn test_worldfile_run_with_stride() {
    let ws = workspace();
    let config = BatchConfig {
        stride: Some(448),
        ..BatchConfig::new(&ws.refs, &ws.tiles)
    };

    let summary = run_batch(&config, &WorldFileStrategy, &Logger::sink(), false).unwrap();
    std::assert_eq!(summary.stride, 448);

    let tile = ws.tiles.join(format!("ffbdc372-{}_119_sharp_augment_2_0_2_3.jpg", REFERENCE));
    let world = read_world_file(&tile.with_extension("jgw")).unwrap();
    std::assert_eq!(world.c, 450000.0 + 3.0 * 448.0 * 0.25);
    std::assert_eq!(world.f, 5000000.0 - 2.0 * 448.0 * 0.25);
}

#[test]
fn test_auxxml_run() {
    let ws = workspace();
    let config = BatchConfig::new(&ws.refs, &ws.tiles);

    let summary = run_batch(&config, &AuxXmlStrategy, &Logger::sink(), false).unwrap();
    std::assert_eq!(summary.processed, 2);

    let tile = ws.tiles.join(format!("{}_0_0.jpg", REFERENCE));
    let written = fs::read_to_string(aux_xml_path(&tile)).unwrap();
    std::assert_eq!(written, fs::read_to_string(aux_xml_path(&ws.refs.join(REFERENCE))).unwrap());

    let shifted = ws.tiles.join(format!("ffbdc372-{}_119_sharp_augment_2_0_2_3.jpg", REFERENCE));
    let document = AuxXmlDocument::load(&aux_xml_path(&shifted)).unwrap();
    let transform = Affine::parse_gdal_text(&document.child_text("GeoTransform").unwrap().unwrap()).unwrap();
    std::assert_eq!(transform.c, 450000.0 + 3.0 * 512.0 * 0.25);
    std::assert_eq!(document.child_text("SRS").unwrap().as_deref(), Some(WKT));
}

#[test]
fn test_reference_errors_are_counted_once() {
    let ws = workspace();
    // template without a GeoTransform
    fs::write(aux_xml_path(&ws.refs.join(REFERENCE)), "<PAMDataset>\n  <SRS>LOCAL_CS[]</SRS>\n</PAMDataset>\n").unwrap();

    let summary = run_batch(&BatchConfig::new(&ws.refs, &ws.tiles), &AuxXmlStrategy, &Logger::sink(), false).unwrap();

    std::assert_eq!(summary.processed, 0);
    std::assert_eq!(summary.reference_errors, 1);
    // two readable tiles plus the broken jpeg all depend on the reference
    std::assert_eq!(summary.skipped_reference, 3);
    std::assert_eq!(summary.references_loaded, 0);
}

#[test]
fn test_skipped_tiles_log_the_reference_failure() {
    let ws = workspace();
    fs::write(aux_xml_path(&ws.refs.join(REFERENCE)), "<PAMDataset>\n  <SRS>LOCAL_CS[]</SRS>\n</PAMDataset>\n").unwrap();
    let log_path = ws.tiles.parent().unwrap().join("run.log");

    let logger = Logger::new(&log_path).unwrap();
    run_batch(&BatchConfig::new(&ws.refs, &ws.tiles), &AuxXmlStrategy, &logger, false).unwrap();

    let log = fs::read_to_string(&log_path).unwrap();
    let skipped: Vec<&str> = log.lines().filter(|l| l.starts_with("reference-skipped\t")).collect();
    std::assert_eq!(skipped.len(), 2);
    std::assert!(skipped.iter().all(|l| l.contains("Reference has no GeoTransform")));
}

#[test]
fn test_oversized_grid_index_is_skipped() {
    let ws = workspace();
    write_image(&ws.tiles.join(format!("{}_99999999999999999_0.jpg", REFERENCE)), 4);
    let log_path = ws.tiles.parent().unwrap().join("run.log");

    let logger = Logger::new(&log_path).unwrap();
    let summary = run_batch(&BatchConfig::new(&ws.refs, &ws.tiles), &WorldFileStrategy, &logger, false).unwrap();

    std::assert_eq!(summary.processed, 2);
    std::assert_eq!(summary.skipped_name, 2);
    std::assert!(!ws.tiles.join(format!("{}_99999999999999999_0.jgw", REFERENCE)).exists());

    let log = fs::read_to_string(&log_path).unwrap();
    std::assert!(log.lines().any(|l| l.starts_with("skipped-name\t") && l.ends_with("out of range")));
}

#[test]
fn test_unexpected_root_is_a_reference_error() {
    let ws = workspace();
    fs::write(aux_xml_path(&ws.refs.join(REFERENCE)), "<Metadata/>").unwrap();

    let summary = run_batch(&BatchConfig::new(&ws.refs, &ws.tiles), &AuxXmlStrategy, &Logger::sink(), false).unwrap();
    std::assert_eq!(summary.reference_errors, 1);
    std::assert_eq!(summary.processed, 0);
}

#[test]
fn test_missing_folders_and_references_are_fatal() {
    let ws = workspace();

    let missing = BatchConfig::new(ws.refs.join("nope"), &ws.tiles);
    std::assert!(std::matches!(
        run_batch(&missing, &WorldFileStrategy, &Logger::sink(), false),
        Err(GeoTileError::FolderNotFound(_))
    ));

    let no_refs = BatchConfig {
        ref_glob: "*.tif".to_string(),
        ..BatchConfig::new(&ws.refs, &ws.tiles)
    };
    std::assert!(std::matches!(
        run_batch(&no_refs, &WorldFileStrategy, &Logger::sink(), false),
        Err(GeoTileError::NoReferences { .. })
    ));

    let bad_regex = BatchConfig {
        tile_regex: r"_(\d+)_(\d+)\.jpg$".to_string(),
        ..BatchConfig::new(&ws.refs, &ws.tiles)
    };
    std::assert!(std::matches!(
        run_batch(&bad_regex, &WorldFileStrategy, &Logger::sink(), false),
        Err(GeoTileError::InvalidConfig(_))
    ));
}

#[test]
fn test_rerun_overwrites_sidecars() {
    let ws = workspace();
    let config = BatchConfig::new(&ws.refs, &ws.tiles);
    let tile = ws.tiles.join(format!("{}_0_0.jpg", REFERENCE));
    fs::write(tile.with_extension("jgw"), "stale").unwrap();

    run_batch(&config, &WorldFileStrategy, &Logger::sink(), false).unwrap();
    let second = run_batch(&config, &WorldFileStrategy, &Logger::sink(), false).unwrap();

    // sidecars from the first run are not tiles
    std::assert_eq!(second.processed, 2);
    std::assert_eq!(fs::read_to_string(tile.with_extension("jgw")).unwrap().lines().count(), 6);
}

#[test]
fn test_command_with_config_file_and_run_log() {
    let ws = workspace();
    let root = ws.refs.parent().unwrap().to_path_buf();
    fs::write(
        root.join("georef.toml"),
        "refs = \"refs\"\ntiles = \"tiles\"\ntile_size = 256\nlog_file = \"run.log\"\n",
    )
    .unwrap();

    let config_path = root.join("georef.toml");
    let matches = build_cli()
        .try_get_matches_from([
            "tilegeoref",
            "worldfile",
            "--config",
            config_path.to_str().unwrap(),
            "--stride",
            "100",
        ])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();

    let command = SidecarCommand::new(sub, WorldFileStrategy).unwrap();
    let summary = command.run().unwrap();
    std::assert_eq!(summary.tile_size, 256);
    std::assert_eq!(summary.stride, 100);
    std::assert_eq!(summary.processed, 2);

    let log = fs::read_to_string(root.join("run.log")).unwrap();
    std::assert_eq!(log.lines().filter(|l| l.starts_with("processed\t")).count(), 2);
    std::assert_eq!(log.lines().filter(|l| l.starts_with("no-reference\t")).count(), 1);
}

#[test]
fn test_factory_runs_visualize() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("sample.jpg");
    write_image(&image, 64);
    fs::write(dir.path().join("sample.txt"), "1 0.5 0.5 0.5 0.5\n0 0.5 0.5\n").unwrap();

    let matches = build_cli()
        .try_get_matches_from(["tilegeoref", "visualize", "--image", image.to_str().unwrap()])
        .unwrap();
    let command = TileGeorefCommandFactory::new().create_command(&matches).unwrap();
    command.execute().unwrap();

    let rendered = image::open(dir.path().join("sample_vis.jpg")).unwrap();
    std::assert_eq!((rendered.width(), rendered.height()), (64, 64));
}

#[test]
fn test_factory_rejects_missing_folders() {
    let matches = build_cli()
        .try_get_matches_from(["tilegeoref", "auxxml", "--refs", "/definitely/missing", "--tiles", "/also/missing"])
        .unwrap();
    let command = TileGeorefCommandFactory::new().create_command(&matches).unwrap();
    std::assert!(command.execute().is_err());
}
