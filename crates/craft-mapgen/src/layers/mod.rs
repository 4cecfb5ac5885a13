//! Generation layers.
//!
//! Each layer is a free function from one or more grids to a freshly
//! allocated grid. The only in-place layer is [`gen_shoreline`], which clamps
//! an existing landscape grid. Layers never keep state between calls, so any
//! number of regions can run through them concurrently.
//!
//! Layers that read neighbours depend on the border width of their input and
//! report [`MapGenError::PadMismatch`](crate::MapGenError::PadMismatch) when a
//! grid arrives with the wrong padding.

mod climate;
mod island;
mod landscape;
mod zoom;

pub use climate::{
    DEPTH_SALT, Side, TEMPERATURE_SALT, gen_biome, gen_pre_climate, gen_pre_climate_bfs,
    stitch_biomes,
};
pub use island::{LAND_THRESHOLD, gen_island, white_noise, white_noise_like};
pub use landscape::{
    LANDSCAPE_AMPLITUDE, LANDSCAPE_FREQUENCY, ROUGHNESS_SCALE, SHORELINE_MAX_ABS_SCALE,
    gen_landscape_from_biome, gen_landscape_from_ocean, gen_shoreline, is_shore,
};
pub use zoom::{noisy_zoom, zoom};

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-range 8-neighbourhood of `(i, j)` on a grid with padded side `stride`.
pub(crate) fn neighbors8(stride: usize, i: usize, j: usize) -> impl Iterator<Item = (usize, usize)> {
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(di, dj)| {
        let ni = i.checked_add_signed(di)?;
        let nj = j.checked_add_signed(dj)?;
        (ni < stride && nj < stride).then_some((ni, nj))
    })
}
