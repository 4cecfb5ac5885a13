//! Configuration for the map generator and viewer.
//!
//! Settings persist to disk as RON files with per-field defaults, so older and
//! newer config files both load. CLI arguments parsed with clap override them.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    ClimateModelSetting, Config, DebugConfig, GenerationConfig, LandscapeSourceSetting,
    OutputConfig, ViewConfig, WorldGenConfig,
};
pub use error::ConfigError;
