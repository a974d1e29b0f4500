/// WUI mapping tool: loads the seven co-registered input layers of one EQUI7
/// tile, classifies every pixel into the nine WUI / non-WUI classes and writes
/// `WUI.tif` (LZW, Gray8) plus a `WUI.json` run manifest.
///
/// Example: `wui-mapper NA X0062_Y0061`
mod config;
mod geotiff;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use wui_core::{
    classify, ClassSummary, Grid, Layer, Region, Thresholds, TileId, TileLayout, WuiClass,
    WuiError, WuiInputs, OUTPUT_NODATA,
};

use config::MapperConfig;
use geotiff::{read_layer, write_class_grid, GeoReference};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "wui-mapper",
    about = "Classify one EQUI7 tile into Wildland-Urban Interface classes"
)]
struct Args {
    /// EQUI7 region (AF, AS, EU, NA, OC, SA). Only the first token is used.
    region: String,

    /// EQUI7 tile, e.g. X0062_Y0061. Only the first token is used.
    tile: String,

    /// JSON config with optional input_root, output_root and thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root of the input theme directories (overrides the config file)
    #[arg(long)]
    input_root: Option<PathBuf>,

    /// Root of the WUI output tree (overrides the config file)
    #[arg(long)]
    output_root: Option<PathBuf>,
}

// ── Input layers ─────────────────────────────────────────────────────────────

struct TileLayers {
    building_density: Grid,
    wild_vegetation: Grid,
    fsw_vegetation: Grid,
    water: Grid,
    land_cover: Grid,
    buffered_vegetation: Grid,
    buffered_fsw_vegetation: Grid,
    /// Georeferencing of the building-density layer, reattached to the output.
    geo: GeoReference,
}

impl TileLayers {
    fn load(layout: &TileLayout, region: Region, tile: TileId) -> Result<Self, WuiError> {
        let (building_density, geo) = load_layer(layout, Layer::BuildingDensity, region, tile)?;
        if geo.is_empty() {
            warn!("{} carries no georeferencing tags; output will be unreferenced", Layer::BuildingDensity);
        }

        let aligned = |layer: Layer| -> Result<Grid, WuiError> {
            let (grid, layer_geo) = load_layer(layout, layer, region, tile)?;
            if geo.disagrees_with(&layer_geo) {
                warn!(
                    "{layer} transform {:?} differs from {} transform {:?}",
                    layer_geo.geo_transform(),
                    Layer::BuildingDensity,
                    geo.geo_transform()
                );
            }
            Ok(grid)
        };
        let wild_vegetation = aligned(Layer::WildVegetation)?;
        let fsw_vegetation = aligned(Layer::FswVegetation)?;
        let water = aligned(Layer::Water)?;
        let land_cover = aligned(Layer::LandCover)?;
        let buffered_vegetation = aligned(Layer::BufferedVegetation)?;
        let buffered_fsw_vegetation = aligned(Layer::BufferedFswVegetation)?;

        Ok(Self {
            building_density,
            wild_vegetation,
            fsw_vegetation,
            water,
            land_cover,
            buffered_vegetation,
            buffered_fsw_vegetation,
            geo,
        })
    }

    fn inputs(&self) -> Result<WuiInputs<'_>, WuiError> {
        WuiInputs::new(
            &self.building_density,
            &self.wild_vegetation,
            &self.fsw_vegetation,
            &self.water,
            &self.land_cover,
            &self.buffered_vegetation,
            &self.buffered_fsw_vegetation,
        )
    }
}

fn load_layer(
    layout: &TileLayout,
    layer: Layer,
    region: Region,
    tile: TileId,
) -> Result<(Grid, GeoReference), WuiError> {
    let path = layout.input_path(layer, region, tile);
    let (grid, geo) = read_layer(&path, layer)?;
    info!("  {layer}: {} ({}x{})", path.display(), grid.width, grid.height);
    Ok((grid, geo))
}

// ── Output manifest ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Manifest<'a> {
    region: Region,
    tile: String,
    output: &'a Path,
    width: usize,
    height: usize,
    geo_transform: Option<[f64; 6]>,
    thresholds: &'a Thresholds,
    summary: &'a ClassSummary,
    wui_fraction: f64,
}

#[derive(Debug)]
struct TileReport {
    output: PathBuf,
    summary: ClassSummary,
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

fn run_tile(
    layout: &TileLayout,
    region: Region,
    tile: TileId,
    thresholds: &Thresholds,
) -> Result<TileReport> {
    info!("[wui] Loading {region} {tile}");
    let layers = TileLayers::load(layout, region, tile)?;
    let inputs = layers.inputs()?;
    let (width, height) = inputs.shape();

    info!("[wui] Classifying {width}x{height} pixels");
    let classes = classify(&inputs, thresholds);
    let summary = ClassSummary::from_grid(&classes);
    for class in WuiClass::ALL {
        info!("  {} {:<56} {:>12}", class.code(), class.description(), summary.count(class));
    }

    let out_dir = layout.output_dir(region, tile);
    fs::create_dir_all(&out_dir).map_err(|source| WuiError::IoWriteFailure {
        path: out_dir.clone(),
        source,
    })?;

    let output = layout.output_path(region, tile);
    write_class_grid(&output, &classes, &layers.geo, OUTPUT_NODATA)?;

    let manifest = Manifest {
        region,
        tile: tile.to_string(),
        output: &output,
        width,
        height,
        geo_transform: layers.geo.geo_transform(),
        thresholds,
        summary: &summary,
        wui_fraction: summary.wui_fraction(),
    };
    let manifest_path = layout.manifest_path(region, tile);
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Write failed: {}", manifest_path.display()))?;

    Ok(TileReport { output, summary })
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let region: Region = args.region.parse()?;
    let tile: TileId = args.tile.parse()?;

    let config = match &args.config {
        Some(path) => MapperConfig::load(path)?,
        None => MapperConfig::default(),
    };
    let thresholds = config.thresholds()?;
    thresholds.validate()?;
    let layout = config.layout(args.input_root.as_deref(), args.output_root.as_deref());
    info!("[wui] Thresholds: {:?}", thresholds);

    let report = run_tile(&layout, region, tile, &thresholds)
        .with_context(|| format!("Tile {region} {tile} failed"))?;

    info!(
        "[wui] {region} {tile} complete: {} ({:.2}% WUI)",
        report.output.display(),
        report.summary.wui_fraction() * 100.0
    );
    Ok(())
}
