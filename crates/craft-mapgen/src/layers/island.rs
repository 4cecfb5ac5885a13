use glam::IVec2;

use crate::cell::OceanMapData;
use crate::grid::{Grid, GridGeometry};
use crate::hash_noise::hash_at;

/// White-noise value above which a base cell becomes land.
pub const LAND_THRESHOLD: f32 = 0.3;

/// Fills a grid with [`hash`](crate::hash) sampled at every cell's world point.
///
/// Root of the cascade: the only input is where the grid sits in the world.
pub fn white_noise(basepos: IVec2, scale: i32, size: usize, pad: usize) -> Grid<f32> {
    Grid::from_fn(GridGeometry::new(basepos, scale, size, pad), |_, _, world| {
        hash_at(world)
    })
}

/// White noise over the geometry of `like`, with world points shifted by `salt`.
///
/// Distinct salts give decorrelated fields over the same lattice; a zero salt
/// reproduces [`white_noise`].
pub fn white_noise_like<T>(like: &Grid<T>, salt: IVec2) -> Grid<f32> {
    Grid::from_fn(like.geometry(), |_, _, world| {
        hash_at(world.wrapping_add(salt))
    })
}

/// Marks every cell whose noise exceeds `land_threshold` as land.
pub fn gen_island(noise: &Grid<f32>, land_threshold: f32) -> Grid<OceanMapData> {
    noise.map_cells(|_, _, &value| OceanMapData {
        is_land: value > land_threshold,
    })
}
