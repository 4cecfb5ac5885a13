//! Offline map viewer.
//!
//! Generates a square block of regions on the background worker pool and
//! writes mosaic PNGs of the biome map, the landscape parameters and the
//! resulting surface heights, plus optional per-region text dumps.

use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use craft_config::{CliArgs, ClimateModelSetting, Config, LandscapeSourceSetting};
use craft_mapgen::debug_viz::{
    self, DebugImage, gray_ramp, render_biome_map, render_landscape_roughness,
    render_landscape_scale,
};
use craft_mapgen::{
    AsyncRegionGenerator, ClimateModel, LandscapeSource, MapGenParams, REGION_SPAN, RegionCache,
    RegionMaps, RegionTask, TerrainHeightSampler,
};
use glam::IVec2;
use tracing::{error, info, warn};

type BoxResult<T> = Result<T, Box<dyn Error>>;

fn map_gen_params(config: &Config) -> MapGenParams {
    let worldgen = &config.worldgen;
    MapGenParams {
        land_threshold: worldgen.land_threshold,
        climate_model: match worldgen.climate_model {
            ClimateModelSetting::Noise => ClimateModel::Noise,
            ClimateModelSetting::DistanceToOcean => ClimateModel::DistanceToOcean,
        },
        landscape_source: match worldgen.landscape_source {
            LandscapeSourceSetting::Biome => LandscapeSource::Biome,
            LandscapeSourceSetting::Ocean => LandscapeSource::Ocean,
        },
        stitch_biomes: worldgen.stitch_biomes,
    }
}

/// Region indices covered by the view, nearest to the center first.
fn view_regions(config: &Config) -> Vec<IVec2> {
    let r = config.view.radius as i32;
    let center = IVec2::new(config.view.center_x, config.view.center_z);
    let mut regions: Vec<IVec2> = (-r..=r)
        .flat_map(|dx| (-r..=r).map(move |dz| center + IVec2::new(dx, dz)))
        .collect();
    regions.sort_by_key(|index| (*index - center).length_squared());
    regions
}

/// Generates every region of the view, keyed by region index.
fn generate_view(
    generator: &AsyncRegionGenerator,
    regions: &[IVec2],
) -> BoxResult<BTreeMap<(i32, i32), Arc<RegionMaps>>> {
    let center = regions.first().copied().unwrap_or(IVec2::ZERO);
    let mut queue = regions.iter().copied().peekable();
    let mut done = BTreeMap::new();
    let deadline = Instant::now() + Duration::from_secs(600);

    while done.len() < regions.len() {
        while let Some(&index) = queue.peek() {
            let task = RegionTask {
                basepos: index * REGION_SPAN,
                priority: (index - center).length_squared() as u64,
            };
            if generator.submit(task).is_err() {
                break;
            }
            queue.next();
        }

        for region in generator.drain_results() {
            let index = region.basepos / REGION_SPAN;
            let maps = region.result?;
            info!(
                "region ({}, {}) ready in {:.1} ms",
                index.x,
                index.y,
                region.generation_time_us as f64 / 1000.0
            );
            done.insert((index.x, index.y), maps);
        }

        if Instant::now() > deadline {
            return Err(format!("timed out with {}/{} regions", done.len(), regions.len()).into());
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    Ok(done)
}

/// Surface heights over the region's finest grid, normalized to its own range.
fn render_heights(maps: &RegionMaps, sampler: &TerrainHeightSampler) -> DebugImage {
    let grid = &maps.biome;
    let (size, pad) = (grid.size(), grid.pad());
    let heights: Vec<i32> = (0..size)
        .flat_map(|i| (0..size).map(move |j| (i, j)))
        .map(|(i, j)| {
            let world = grid.map_to_world_point(pad + i, pad + j);
            sampler.sample_height(maps, world.x, world.y).unwrap_or(0)
        })
        .collect();

    let min = heights.iter().copied().min().unwrap_or(0);
    let max = heights.iter().copied().max().unwrap_or(0);
    let range = (max - min).max(1) as f64;

    let mut image = DebugImage::new(size as u32, size as u32);
    for (k, h) in heights.iter().enumerate() {
        let (y, x) = (k / size, k % size);
        image.set_rgb(x as u32, y as u32, gray_ramp((h - min) as f64 / range));
    }
    image
}

/// Lays region images out with region x growing downwards and z to the right,
/// matching the in-region row/column layout.
fn mosaic(
    regions: &BTreeMap<(i32, i32), Arc<RegionMaps>>,
    render: impl Fn(&RegionMaps) -> DebugImage,
) -> DebugImage {
    let mut rows: BTreeMap<i32, Vec<DebugImage>> = BTreeMap::new();
    for (&(rx, _), maps) in regions {
        let maps: &RegionMaps = maps;
        rows.entry(rx).or_default().push(render(maps));
    }
    let rows: Vec<DebugImage> = rows
        .values()
        .map(|row| DebugImage::concat_horizontal(row))
        .collect();
    DebugImage::concat_vertical(&rows)
}

fn save_png(image: DebugImage, path: &Path) -> BoxResult<()> {
    let (width, height) = image.dimensions();
    let buffer = image::RgbaImage::from_raw(width, height, image.pixels)
        .ok_or("pixel buffer does not match image dimensions")?;
    buffer.save(path)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn write_dumps(dir: &Path, index: (i32, i32), maps: &RegionMaps) -> BoxResult<()> {
    let (rx, rz) = index;
    let dumps = [
        ("biome", debug_viz::dump_biome_codes(&maps.biome)),
        ("scale", debug_viz::dump_landscape_scale(&maps.landscape)),
        ("roughness", debug_viz::dump_landscape_roughness(&maps.landscape)),
    ];
    for (name, text) in dumps {
        std::fs::write(dir.join(format!("{name}_{rx}_{rz}.txt")), text)?;
    }
    Ok(())
}

fn run(config: &Config) -> BoxResult<()> {
    config.validate()?;

    let cache = Arc::new(RegionCache::new(map_gen_params(config)));
    let generation = &config.generation;
    let generator = if generation.worker_threads == 0 {
        AsyncRegionGenerator::with_defaults(Arc::clone(&cache))?
    } else {
        AsyncRegionGenerator::new(
            Arc::clone(&cache),
            generation.worker_threads,
            generation.max_concurrent,
            generation.result_capacity,
        )?
    };

    let regions = view_regions(config);
    info!(
        "generating {} regions around ({}, {})",
        regions.len(),
        config.view.center_x,
        config.view.center_z
    );
    let start = Instant::now();
    let generated = generate_view(&generator, &regions)?;
    info!("generation finished in {:.2?}", start.elapsed());

    let out_dir = &config.output.directory;
    std::fs::create_dir_all(out_dir)?;

    let sampler = TerrainHeightSampler::default();
    save_png(mosaic(&generated, |m| render_biome_map(&m.biome)), &out_dir.join("biome.png"))?;
    save_png(
        mosaic(&generated, |m| render_landscape_scale(&m.landscape)),
        &out_dir.join("landscape_scale.png"),
    )?;
    save_png(
        mosaic(&generated, |m| render_landscape_roughness(&m.landscape)),
        &out_dir.join("landscape_roughness.png"),
    )?;
    save_png(
        mosaic(&generated, |m| render_heights(m, &sampler)),
        &out_dir.join("height.png"),
    )?;

    if config.output.write_text_dumps {
        for (&index, maps) in &generated {
            write_dumps(out_dir, index, maps)?;
        }
        info!("wrote text dumps for {} regions", generated.len());
    }
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    craft_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    if config.worldgen.stitch_biomes {
        warn!("biome stitching is on; results depend on generation order");
    }

    if let Err(e) = run(&config) {
        error!("map viewer failed: {e}");
        std::process::exit(1);
    }
}
