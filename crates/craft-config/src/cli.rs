//! Command-line argument parsing for the map tools.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Map viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "craft-mapview", about = "Generate regions and render their maps")]
pub struct CliArgs {
    /// Region index of the view center along x.
    #[arg(long, allow_hyphen_values = true)]
    pub region_x: Option<i32>,

    /// Region index of the view center along z.
    #[arg(long, allow_hyphen_values = true)]
    pub region_z: Option<i32>,

    /// Regions rendered on each side of the center.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Root noise value above which a cell becomes land.
    #[arg(long)]
    pub land_threshold: Option<f32>,

    /// Stitch neighbouring regions' biomes.
    #[arg(long)]
    pub stitch: Option<bool>,

    /// Worker thread count (0 = auto).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write text dumps next to the images.
    #[arg(long)]
    pub dumps: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(x) = args.region_x {
            self.view.center_x = x;
        }
        if let Some(z) = args.region_z {
            self.view.center_z = z;
        }
        if let Some(r) = args.radius {
            self.view.radius = r;
        }
        if let Some(t) = args.land_threshold {
            self.worldgen.land_threshold = t;
        }
        if let Some(stitch) = args.stitch {
            self.worldgen.stitch_biomes = stitch;
        }
        if let Some(threads) = args.threads {
            self.generation.worker_threads = threads;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(dumps) = args.dumps {
            self.output.write_text_dumps = dumps;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
