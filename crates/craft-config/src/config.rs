//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for map generation and the map viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Map generation parameters.
    pub worldgen: WorldGenConfig,
    /// Background worker pool sizing.
    pub generation: GenerationConfig,
    /// Which regions the viewer generates.
    pub view: ViewConfig,
    /// Where and what the viewer writes.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Source of the precipitation level fed to biome classification.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClimateModelSetting {
    #[default]
    Noise,
    DistanceToOcean,
}

/// Grid the landscape parameters are derived from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LandscapeSourceSetting {
    #[default]
    Biome,
    Ocean,
}

/// Map generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Root noise value above which a cell becomes land, in `[0, 1]`.
    pub land_threshold: f32,
    pub climate_model: ClimateModelSetting,
    pub landscape_source: LandscapeSourceSetting,
    /// Copy neighbouring regions' coarse biomes into each region's border.
    pub stitch_biomes: bool,
}

/// Worker pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Worker thread count; 0 picks one based on available cores.
    pub worker_threads: usize,
    /// Maximum regions queued at once.
    pub max_concurrent: usize,
    /// Capacity of the finished-region channel.
    pub result_capacity: usize,
}

/// Area the viewer renders, in region units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Region index of the center region along x.
    pub center_x: i32,
    /// Region index of the center region along z.
    pub center_z: i32,
    /// Regions rendered on each side of the center; the view is `2r + 1` regions wide.
    pub radius: u32,
}

/// Viewer output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving PNGs and dumps.
    pub directory: PathBuf,
    /// Also write space-separated text dumps of every region's maps.
    pub write_text_dumps: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            land_threshold: 0.3,
            climate_model: ClimateModelSetting::Noise,
            landscape_source: LandscapeSourceSetting::Biome,
            stitch_biomes: false,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            max_concurrent: 64,
            result_capacity: 128,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_x: 0,
            center_z: 0,
            radius: 1,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("map-output"),
            write_text_dumps: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for the map tools, e.g. `~/.config/craft-mapgen`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("craft-mapgen"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-reads `config.ron`: `Some(new_config)` if it differs from `self`, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Checks values serde cannot constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.worldgen.land_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue {
                field: "worldgen.land_threshold",
                reason: format!("{threshold} is outside [0, 1]"),
            });
        }
        if self.generation.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation.max_concurrent",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
