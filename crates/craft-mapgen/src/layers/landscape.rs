use glam::IVec2;

use super::neighbors8;
use crate::biome::BiomeData;
use crate::cell::{LandscapeData, OceanMapData};
use crate::error::MapGenError;
use crate::grid::{Grid, GridGeometry};
use crate::hash_noise::{PerlinNoise2D, hash, hash_at};

/// World units per roughness noise cell; larger values vary roughness more slowly.
pub const ROUGHNESS_SCALE: i32 = 64;

/// Frequency of the gradient noise driving `max_abs_scale` on biome input.
pub const LANDSCAPE_FREQUENCY: f64 = 0.002;

/// Amplitude of `max_abs_scale`, both for the gradient noise and the hash variant.
pub const LANDSCAPE_AMPLITUDE: f32 = 32.0;

/// `max_abs_scale` forced onto cells on a land/ocean boundary.
pub const SHORELINE_MAX_ABS_SCALE: i32 = 0;

fn roughness_at(world: IVec2) -> f32 {
    hash(
        world.x.div_euclid(ROUGHNESS_SCALE),
        world.y.div_euclid(ROUGHNESS_SCALE),
    )
}

/// Returns `true` if cell `(i, j)` and any in-range 8-neighbour disagree on land vs ocean.
pub fn is_shore(biome: &Grid<BiomeData>, i: usize, j: usize) -> bool {
    let land = biome[(i, j)].biome_type.is_land();
    neighbors8(biome.stride(), i, j).any(|(ni, nj)| biome[(ni, nj)].biome_type.is_land() != land)
}

/// Landscape parameters drawn from hash noise over an ocean mask's lattice.
///
/// The mask only supplies geometry; shoreline clamping is left to
/// [`gen_shoreline`] once a biome map exists.
pub fn gen_landscape_from_ocean(ocean: &Grid<OceanMapData>) -> Grid<LandscapeData> {
    Grid::from_fn(ocean.geometry(), |_, _, world| LandscapeData {
        max_abs_scale: (2.0 * LANDSCAPE_AMPLITUDE * hash_at(world)) as i32,
        roughness: roughness_at(world),
    })
}

/// Landscape parameters for a pad-2 biome grid, returned with pad 1.
///
/// `max_abs_scale` follows low-frequency gradient noise, offset so it never
/// goes negative, and is clamped to [`SHORELINE_MAX_ABS_SCALE`] wherever the
/// underlying biome cell is on a shoreline. The narrower border means output
/// cell `(i, j)` lines up with biome cell `(i + 1, j + 1)`.
pub fn gen_landscape_from_biome(
    biome: &Grid<BiomeData>,
) -> Result<Grid<LandscapeData>, MapGenError> {
    if biome.pad() != 2 {
        return Err(MapGenError::PadMismatch {
            layer: "gen_landscape_from_biome",
            expected: 2,
            actual: biome.pad(),
        });
    }

    let perlin = PerlinNoise2D::LAYER;
    let geometry = GridGeometry::new(biome.basepos(), biome.scale(), biome.size(), 1);

    Ok(Grid::from_fn(geometry, |i, j, world| {
        let n = perlin.sample(
            LANDSCAPE_FREQUENCY * world.x as f64,
            LANDSCAPE_FREQUENCY * world.y as f64,
        );
        let max_abs_scale = if is_shore(biome, i + 1, j + 1) {
            SHORELINE_MAX_ABS_SCALE
        } else {
            ((LANDSCAPE_AMPLITUDE as f64 * (1.0 + n)) as i32).max(0)
        };
        LandscapeData {
            max_abs_scale,
            roughness: roughness_at(world),
        }
    }))
}

/// Clamps `max_abs_scale` at every land/ocean boundary of `biome`, in place.
///
/// The grids must cover the same lattice (`basepos`, `scale`, `size`); their
/// borders may differ, cells are matched by world point. Landscape cells whose
/// biome counterpart lies outside the biome grid are left alone. Running it
/// twice is the same as running it once.
pub fn gen_shoreline(
    landscape: &mut Grid<LandscapeData>,
    biome: &Grid<BiomeData>,
) -> Result<(), MapGenError> {
    let lg = landscape.geometry();
    let bg = biome.geometry();
    if !lg.same_anchor(&bg) || lg.size != bg.size {
        return Err(MapGenError::GeometryMismatch {
            layer: "gen_shoreline",
        });
    }

    for i in 0..lg.stride() {
        for j in 0..lg.stride() {
            let world = lg.map_to_world_point(i, j);
            let index = bg.world_to_map_point(world.x, world.y);
            if bg.contains_index(index) && is_shore(biome, index.x as usize, index.y as usize) {
                landscape[(i, j)].max_abs_scale = SHORELINE_MAX_ABS_SCALE;
            }
        }
    }
    Ok(())
}
