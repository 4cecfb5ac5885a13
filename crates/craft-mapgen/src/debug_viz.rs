//! Map debug output: RGBA rasters and plain-text grid dumps.
//!
//! Images cover the grid interior only. Text dumps cover the whole padded
//! grid in row-major order, every value followed by a single space, so they
//! can be diffed against dumps from other builds of the generator.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    biome_color, gray_ramp, heat_ramp, render_biome_map, render_landscape_roughness,
    render_landscape_scale, render_ocean_mask,
};

use std::fmt::{Display, Write};

use crate::biome::{BiomeData, BiomeType};
use crate::cell::LandscapeData;
use crate::error::MapGenError;
use crate::grid::{Grid, GridGeometry};

fn dump_with<T, V: Display>(grid: &Grid<T>, value: impl Fn(&T) -> V) -> String {
    let mut out = String::with_capacity(grid.cells().len() * 2);
    for cell in grid.cells() {
        // Writing into a String cannot fail.
        let _ = write!(out, "{} ", value(cell));
    }
    out
}

/// Biome codes of every cell, padding included.
pub fn dump_biome_codes(grid: &Grid<BiomeData>) -> String {
    dump_with(grid, |cell| cell.biome_type as u8)
}

/// `max_abs_scale` of every cell, padding included.
pub fn dump_landscape_scale(grid: &Grid<LandscapeData>) -> String {
    dump_with(grid, |cell| cell.max_abs_scale)
}

/// `roughness` of every cell, padding included.
pub fn dump_landscape_roughness(grid: &Grid<LandscapeData>) -> String {
    dump_with(grid, |cell| cell.roughness)
}

/// Reads a biome dump back into a grid of the given geometry.
///
/// Any whitespace separates values. Fails on a wrong value count, a token
/// that is not a byte, or a byte that is not a biome code.
pub fn parse_biome_codes(text: &str, geometry: GridGeometry) -> Result<Grid<BiomeData>, MapGenError> {
    let cells = text
        .split_whitespace()
        .map(|token| {
            let code: u8 = token
                .parse()
                .map_err(|_| MapGenError::DumpParse(token.to_owned()))?;
            Ok(BiomeData::from(BiomeType::try_from(code)?))
        })
        .collect::<Result<Vec<_>, MapGenError>>()?;

    let expected = geometry.cell_count();
    let actual = cells.len();
    Grid::from_cells(geometry, cells).ok_or(MapGenError::DumpSize { expected, actual })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    fn small_biomes() -> Grid<BiomeData> {
        let geometry = GridGeometry::new(IVec2::new(-64, 32), 8, 2, 1);
        Grid::from_fn(geometry, |i, j, _| {
            BiomeData::new(BiomeType::ALL[(i * 4 + j) % BiomeType::COUNT])
        })
    }

    #[test]
    fn test_biome_dump_format() {
        let grid = small_biomes();
        let text = dump_biome_codes(&grid);
        assert!(text.starts_with("0 1 2 3 4 "), "unexpected dump: {text:?}");
        assert!(text.ends_with(' '));
        assert_eq!(text.split_whitespace().count(), 16);
    }

    #[test]
    fn test_biome_dump_parses_back() {
        let grid = small_biomes();
        let parsed = parse_biome_codes(&dump_biome_codes(&grid), grid.geometry()).unwrap();
        assert_eq!(parsed, grid);
    }

    #[test]
    fn test_parse_accepts_newlines() {
        let geometry = GridGeometry::new(IVec2::ZERO, 8, 1, 0);
        let parsed = parse_biome_codes("\n 7\n", geometry).unwrap();
        assert_eq!(parsed[(0, 0)].biome_type, BiomeType::DeepOcean);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let geometry = GridGeometry::new(IVec2::ZERO, 8, 1, 0);
        assert_eq!(
            parse_biome_codes("0 1 ", geometry),
            Err(MapGenError::DumpSize { expected: 1, actual: 2 })
        );
        assert_eq!(
            parse_biome_codes("x", geometry),
            Err(MapGenError::DumpParse("x".to_owned()))
        );
        assert_eq!(parse_biome_codes("9", geometry), Err(MapGenError::CorruptBiome(9)));
    }

    #[test]
    fn test_landscape_dumps() {
        let geometry = GridGeometry::new(IVec2::ZERO, 8, 1, 0);
        let grid = Grid::filled(geometry, LandscapeData { max_abs_scale: -3, roughness: 0.25 });
        assert_eq!(dump_landscape_scale(&grid), "-3 ");
        assert_eq!(dump_landscape_roughness(&grid), "0.25 ");
    }
}
