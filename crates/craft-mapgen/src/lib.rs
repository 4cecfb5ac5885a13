//! Layered procedural world-map generation: padded grids, deterministic hash noise,
//! zoom/classification layers, and a per-region cache consumed by terrain building.

mod async_generation;
mod biome;
mod cell;
mod error;
mod grid;
mod hash_noise;
mod pipeline;
mod terrain_height;

pub mod debug_viz;
pub mod layers;

pub use async_generation::{AsyncRegionGenerator, GeneratedRegion, RegionTask};
pub use biome::{
    BiomeData, BiomeType, DEEP_OCEAN_THRESHOLD, DRY_PRCP_MAX, classify_land, classify_ocean,
};
pub use cell::{LandscapeData, MapCell, OceanMapData, PreClimateData};
pub use error::MapGenError;
pub use grid::{DEFAULT_PAD, Grid, GridGeometry};
pub use hash_noise::{
    FractalNoise2D, OctaveWeighting, PerlinNoise2D, hash, hash_angle, hash_at, hash_gradient,
    hash_u32,
};
pub use pipeline::{
    BASE_MAP_SIZE, BASE_SCALE, BiomeStitchCache, ClimateModel, ColumnData, FINEST_MAP_SIZE,
    FINEST_SCALE, LandscapeSource, MapGenParams, REGION_SPAN, RegionCache, RegionMaps,
    generate_chunk_column_data, generate_region, region_base, validate_biome_map,
};
pub use terrain_height::{SEA_LEVEL, TerrainHeightSampler};
