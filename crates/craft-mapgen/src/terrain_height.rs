//! Block column surface heights from region maps.
//!
//! The landscape map decides how far a column may stray from sea level and
//! how rough it is; two fractal noise fields supply the actual shape.

use crate::hash_noise::FractalNoise2D;
use crate::pipeline::{ColumnData, RegionMaps};

/// Surface height of the water plane.
pub const SEA_LEVEL: i32 = 0;

/// Blends slow and fast fractal noise into surface heights.
#[derive(Clone, Debug)]
pub struct TerrainHeightSampler {
    slow: FractalNoise2D,
    fast: FractalNoise2D,
}

impl Default for TerrainHeightSampler {
    fn default() -> Self {
        Self::new(
            FractalNoise2D::new(0.5, vec![0.01]),
            FractalNoise2D::new(0.5, vec![0.03]),
        )
    }
}

impl TerrainHeightSampler {
    /// `slow` shapes smooth terrain, `fast` rough terrain.
    pub fn new(slow: FractalNoise2D, fast: FractalNoise2D) -> Self {
        Self { slow, fast }
    }

    /// Blended noise at `(x, z)`: `roughness · fast + (1 − roughness) · slow`.
    pub fn shape(&self, roughness: f32, x: i32, z: i32) -> f32 {
        let (x, z) = (x as f64, z as f64);
        let fast = self.fast.sample(x, z) as f32;
        let slow = self.slow.sample(x, z) as f32;
        roughness * fast + (1.0 - roughness) * slow
    }

    /// Surface height of the column at `(x, z)` given its sampled map data.
    ///
    /// Land rises to `scale · (1 + h)`; ocean floors sit at `scale · (h − 1)`
    /// but never above one block below sea level.
    pub fn column_height(&self, column: &ColumnData, x: i32, z: i32) -> i32 {
        let h = self.shape(column.landscape.roughness, x, z);
        let scale = column.landscape.max_abs_scale as f32;
        if column.biome.is_ocean() {
            ((scale * (h - 1.0)) as i32).min(SEA_LEVEL - 1)
        } else {
            (scale * (1.0 + h)) as i32
        }
    }

    /// Surface height at `(x, z)`, or `None` if the point lies outside `maps`.
    pub fn sample_height(&self, maps: &RegionMaps, x: i32, z: i32) -> Option<i32> {
        maps.column(x, z).map(|column| self.column_height(&column, x, z))
    }
}
