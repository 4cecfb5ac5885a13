use std::collections::VecDeque;

use glam::IVec2;

use super::island::white_noise_like;
use super::neighbors8;
use crate::biome::{BiomeData, classify_land, classify_ocean};
use crate::cell::{OceanMapData, PreClimateData};
use crate::error::MapGenError;
use crate::grid::Grid;
use crate::hash_noise::hash_at;

/// World offset that decorrelates the temperature field from precipitation.
pub const TEMPERATURE_SALT: IVec2 = IVec2::new(7_919, -104_729);

/// World offset for the noise deciding which open-ocean cells become deep.
pub const DEPTH_SALT: IVec2 = IVec2::new(-15_485_863, 32_452_843);

const MAX_LEVEL: i32 = 4;

fn temperature_levels(ocean: &Grid<OceanMapData>) -> Grid<i32> {
    white_noise_like(ocean, TEMPERATURE_SALT)
        .map_cells(|_, _, &v| ((v * MAX_LEVEL as f32) as i32).clamp(0, MAX_LEVEL))
}

/// Assigns climate levels from hash noise.
///
/// Precipitation is `4 · hash(world)` truncated; temperature comes from a
/// second, salted white-noise field scaled the same way. Both land in `0..=4`.
pub fn gen_pre_climate(ocean: &Grid<OceanMapData>) -> Grid<PreClimateData> {
    let temp = temperature_levels(ocean);
    Grid::from_fn(ocean.geometry(), |i, j, world| PreClimateData {
        temp_level: temp[(i, j)],
        prcp_level: ((MAX_LEVEL as f32 * hash_at(world)) as i32).clamp(0, MAX_LEVEL),
    })
}

/// Assigns precipitation by 4-connected distance to the nearest ocean cell.
///
/// Ocean cells get level 4 and every step inland loses one level, bottoming
/// out at 0. A grid with no ocean at all is uniformly dry. Temperature is
/// drawn exactly as in [`gen_pre_climate`].
pub fn gen_pre_climate_bfs(ocean: &Grid<OceanMapData>) -> Grid<PreClimateData> {
    let stride = ocean.stride();
    let mut distance: Grid<Option<i32>> =
        Grid::filled(ocean.geometry(), None);
    let mut queue = VecDeque::new();

    for (i, j, cell) in ocean.iter() {
        if !cell.is_land {
            distance[(i, j)] = Some(0);
            queue.push_back((i, j));
        }
    }

    while let Some((i, j)) = queue.pop_front() {
        let next = distance[(i, j)].map_or(MAX_LEVEL, |d| (d + 1).min(MAX_LEVEL));
        let steps = [
            (i.wrapping_sub(1), j),
            (i + 1, j),
            (i, j.wrapping_sub(1)),
            (i, j + 1),
        ];
        for (ni, nj) in steps {
            if ni < stride && nj < stride && distance[(ni, nj)].is_none() {
                distance[(ni, nj)] = Some(next);
                queue.push_back((ni, nj));
            }
        }
    }

    let temp = temperature_levels(ocean);
    distance.map_cells(|i, j, d| PreClimateData {
        temp_level: temp[(i, j)],
        prcp_level: MAX_LEVEL - d.unwrap_or(MAX_LEVEL),
    })
}

/// Classifies every cell into a biome.
///
/// Land cells use the climate table; ocean cells become deep ocean only when
/// no in-range neighbour is land and the salted depth noise is below 0.3.
pub fn gen_biome(
    climate: &Grid<PreClimateData>,
    ocean: &Grid<OceanMapData>,
) -> Result<Grid<BiomeData>, MapGenError> {
    if climate.geometry() != ocean.geometry() {
        return Err(MapGenError::GeometryMismatch { layer: "gen_biome" });
    }

    let depth = white_noise_like(ocean, DEPTH_SALT);
    let stride = ocean.stride();

    Ok(Grid::from_fn(ocean.geometry(), |i, j, _| {
        let biome = if ocean[(i, j)].is_land {
            let c = climate[(i, j)];
            classify_land(c.prcp_level, c.temp_level)
        } else {
            let open_water = neighbors8(stride, i, j).all(|(ni, nj)| !ocean[(ni, nj)].is_land);
            classify_ocean(open_water, depth[(i, j)])
        };
        BiomeData::new(biome)
    }))
}

/// Side of a grid that borders a neighbouring region.
///
/// Rows (`i`) run along world x and columns (`j`) along world z, so
/// [`Side::North`] is the low-x side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    South,
    West,
    East,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::South, Side::West, Side::East];

    /// Step from a region to its neighbour on this side, in region units.
    pub fn offset(self) -> IVec2 {
        match self {
            Side::North => IVec2::new(-1, 0),
            Side::South => IVec2::new(1, 0),
            Side::West => IVec2::new(0, -1),
            Side::East => IVec2::new(0, 1),
        }
    }

    fn in_band(self, geometry: &crate::grid::GridGeometry, i: usize, j: usize) -> bool {
        let far = geometry.pad + geometry.size;
        match self {
            Side::North => i < geometry.pad,
            Side::South => i >= far,
            Side::West => j < geometry.pad,
            Side::East => j >= far,
        }
    }
}

/// Overwrites the padding band of `grid` on `side` with the interior of its
/// already-generated neighbour.
///
/// Padding cells are only this region's guess at the neighbour's content;
/// copying the neighbour's real cells makes later zooms agree across the
/// seam. `neighbor` must have the same scale and size and sit exactly one
/// region span away on `side`.
pub fn stitch_biomes(
    grid: &mut Grid<BiomeData>,
    neighbor: &Grid<BiomeData>,
    side: Side,
) -> Result<(), MapGenError> {
    let geo = grid.geometry();
    let other = neighbor.geometry();
    let expected_base = geo.neighbor_base(side.offset());
    if other.scale != geo.scale || other.size != geo.size || other.basepos != expected_base {
        return Err(MapGenError::GeometryMismatch {
            layer: "stitch_biomes",
        });
    }

    for i in 0..geo.stride() {
        for j in 0..geo.stride() {
            if !side.in_band(&geo, i, j) {
                continue;
            }
            let world = geo.map_to_world_point(i, j);
            let index = other.world_to_map_point(world.x, world.y);
            if other.is_interior(index) {
                grid[(i, j)] = neighbor[(index.x as usize, index.y as usize)];
            }
        }
    }
    Ok(())
}
