//! Rasterizers for biome, ocean and landscape grids.
//!
//! Every renderer draws the grid interior only, one pixel per cell, with grid
//! row `i` on image row `y` and column `j` on image column `x`.

use super::image::DebugImage;
use crate::biome::{BiomeData, BiomeType};
use crate::cell::{LandscapeData, OceanMapData};
use crate::grid::Grid;

/// Reference color for each biome.
pub fn biome_color(biome: BiomeType) -> (u8, u8, u8) {
    match biome {
        BiomeType::Desert => (235, 215, 66),
        BiomeType::Rainforest => (4, 145, 58),
        BiomeType::Shrubland => (178, 214, 92),
        BiomeType::Grassland => (55, 222, 80),
        BiomeType::Tundra => (132, 181, 167),
        BiomeType::Snowland => (225, 227, 226),
        BiomeType::ShallowOcean => (8, 147, 207),
        BiomeType::DeepOcean => (4, 46, 64),
        // Bright red so unassigned cells stand out.
        BiomeType::None => (255, 0, 0),
    }
}

/// Linear black-to-white ramp over `t` in `[0, 1]` (clamped).
pub fn gray_ramp(t: f64) -> (u8, u8, u8) {
    let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
    (v, v, v)
}

/// Five-stop heat ramp: dark blue, cyan, green, yellow, red.
pub fn heat_ramp(t: f64) -> (u8, u8, u8) {
    const STOPS: [(f64, f64, f64); 5] = [
        (20.0, 20.0, 120.0),
        (0.0, 170.0, 200.0),
        (40.0, 180.0, 60.0),
        (240.0, 220.0, 60.0),
        (200.0, 30.0, 30.0),
    ];
    let scaled = t.clamp(0.0, 1.0) * (STOPS.len() - 1) as f64;
    let k = (scaled.floor() as usize).min(STOPS.len() - 2);
    let f = scaled - k as f64;
    let (a, b) = (STOPS[k], STOPS[k + 1]);
    let lerp = |x: f64, y: f64| (x + (y - x) * f).round() as u8;
    (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn render_interior<T>(grid: &Grid<T>, mut color: impl FnMut(&T) -> (u8, u8, u8)) -> DebugImage {
    let size = grid.size() as u32;
    let pad = grid.pad();
    let mut image = DebugImage::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let cell = &grid[(pad + y as usize, pad + x as usize)];
            image.set_rgb(x, y, color(cell));
        }
    }
    image
}

/// Biome map in the reference palette.
pub fn render_biome_map(grid: &Grid<BiomeData>) -> DebugImage {
    render_interior(grid, |cell| biome_color(cell.biome_type))
}

/// Land/ocean mask: land in sand, ocean in shallow-water blue.
pub fn render_ocean_mask(grid: &Grid<OceanMapData>) -> DebugImage {
    render_interior(grid, |cell| {
        if cell.is_land {
            biome_color(BiomeType::Desert)
        } else {
            biome_color(BiomeType::ShallowOcean)
        }
    })
}

/// `max_abs_scale` as a heat map, normalized by the largest value in the grid.
pub fn render_landscape_scale(grid: &Grid<LandscapeData>) -> DebugImage {
    let max = grid
        .cells()
        .iter()
        .map(|c| c.max_abs_scale)
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    render_interior(grid, |cell| heat_ramp(cell.max_abs_scale as f64 / max))
}

/// `roughness` as a grayscale image.
pub fn render_landscape_roughness(grid: &Grid<LandscapeData>) -> DebugImage {
    render_interior(grid, |cell| gray_ramp(cell.roughness as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridGeometry;
    use glam::IVec2;

    #[test]
    fn test_biome_colors_are_distinct() {
        let colors: std::collections::HashSet<_> =
            BiomeType::ALL.into_iter().map(biome_color).collect();
        assert_eq!(colors.len(), BiomeType::COUNT);
    }

    #[test]
    fn test_biome_map_skips_padding() {
        let geometry = GridGeometry::new(IVec2::ZERO, 8, 4, 2);
        let mut grid = Grid::filled(geometry, BiomeData::new(BiomeType::DeepOcean));
        grid.set(2, 3, BiomeData::new(BiomeType::Desert));
        grid.set(0, 0, BiomeData::new(BiomeType::Snowland));

        let image = render_biome_map(&grid);
        assert_eq!(image.dimensions(), (4, 4));
        // row 2 -> y 0, column 3 -> x 1
        assert_eq!(image.get_pixel(1, 0), (235, 215, 66, 255));
        assert_eq!(image.get_pixel(0, 0), (4, 46, 64, 255));
        assert_eq!(image.unique_color_count(), 2);
    }

    #[test]
    fn test_ocean_mask_two_colors() {
        let geometry = GridGeometry::new(IVec2::ZERO, 8, 4, 2);
        let grid = Grid::from_fn(geometry, |i, _, _| OceanMapData { is_land: i % 2 == 0 });
        let image = render_ocean_mask(&grid);
        assert_eq!(image.unique_color_count(), 2);
        assert_eq!(image.get_pixel(0, 0).0, 235);
    }

    #[test]
    fn test_landscape_scale_normalizes_to_max() {
        let geometry = GridGeometry::new(IVec2::ZERO, 8, 2, 1);
        let mut grid = Grid::filled(geometry, LandscapeData::default());
        grid.set(1, 1, LandscapeData { max_abs_scale: 40, roughness: 0.0 });
        let image = render_landscape_scale(&grid);
        let (r, g, b) = heat_ramp(1.0);
        assert_eq!(image.get_pixel(0, 0), (r, g, b, 255));
        let (r, g, b) = heat_ramp(0.0);
        assert_eq!(image.get_pixel(1, 1), (r, g, b, 255));
    }

    #[test]
    fn test_roughness_grayscale() {
        let geometry = GridGeometry::new(IVec2::ZERO, 8, 2, 1);
        let grid = Grid::filled(geometry, LandscapeData { max_abs_scale: 0, roughness: 0.5 });
        let image = render_landscape_roughness(&grid);
        assert_eq!(image.get_pixel(1, 0), (128, 128, 128, 255));
    }

    #[test]
    fn test_ramps_cover_endpoints() {
        assert_eq!(gray_ramp(-1.0), (0, 0, 0));
        assert_eq!(gray_ramp(2.0), (255, 255, 255));
        assert_eq!(heat_ramp(0.0), (20, 20, 120));
        assert_eq!(heat_ramp(1.0), (200, 30, 30));
        assert_eq!(heat_ramp(0.25), (0, 170, 200));
    }
}
