//! Cell payloads carried by map grids and the mixing rules zoom layers use
//! to synthesize new cells between existing ones.

use crate::grid::Grid;

/// A value that zoom layers can interpolate.
///
/// `r` is a draw in `[0, 1)` taken from the hash noise at the synthesized
/// cell's world point, so mixing is deterministic per location.
pub trait MapCell: Clone + Default {
    /// Combines two axis-adjacent cells.
    fn mix2(a: &Self, b: &Self, r: f32) -> Self;

    /// Combines three cells.
    fn mix3(a: &Self, b: &Self, c: &Self, r: f32) -> Self;

    /// Combines the four corners of a cell square.
    fn mix4(a: &Self, b: &Self, c: &Self, d: &Self, r: f32) -> Self;

    /// Samples `grid` at fractional cell coordinate `(x, y)`.
    fn sample_subpixel(grid: &Grid<Self>, x: f64, y: f64) -> Self {
        diagonal_subpixel(grid, x, y)
    }
}

/// Coarse subpixel sample: a single 4-way mix whose draw is the mean of the
/// two fractional offsets.
pub(crate) fn diagonal_subpixel<T: MapCell>(grid: &Grid<T>, x: f64, y: f64) -> T {
    let (x0, y0) = (x as usize, y as usize);
    let r = ((x - x0 as f64) + (y - y0 as f64)) / 2.0;
    T::mix4(
        &grid[(x0, y0)],
        &grid[(x0 + 1, y0)],
        &grid[(x0, y0 + 1)],
        &grid[(x0 + 1, y0 + 1)],
        r as f32,
    )
}

#[inline]
pub(crate) fn pick2<T: Clone>(a: &T, b: &T, r: f32) -> T {
    if r < 0.5 { a.clone() } else { b.clone() }
}

#[inline]
pub(crate) fn pick3<T: Clone>(a: &T, b: &T, c: &T, r: f32) -> T {
    if r < 0.33 {
        a.clone()
    } else if r < 0.67 {
        b.clone()
    } else {
        c.clone()
    }
}

#[inline]
pub(crate) fn pick4<T: Clone>(a: &T, b: &T, c: &T, d: &T, r: f32) -> T {
    if r < 0.25 {
        a.clone()
    } else if r < 0.5 {
        b.clone()
    } else if r < 0.75 {
        c.clone()
    } else {
        d.clone()
    }
}

/// Implements [`MapCell`] by picking one input verbatim according to which
/// uniform bucket of `[0, 1)` the draw lands in.
macro_rules! impl_bucket_mix {
    ($ty:ty) => {
        impl $crate::cell::MapCell for $ty {
            fn mix2(a: &Self, b: &Self, r: f32) -> Self {
                $crate::cell::pick2(a, b, r)
            }

            fn mix3(a: &Self, b: &Self, c: &Self, r: f32) -> Self {
                $crate::cell::pick3(a, b, c, r)
            }

            fn mix4(a: &Self, b: &Self, c: &Self, d: &Self, r: f32) -> Self {
                $crate::cell::pick4(a, b, c, d, r)
            }
        }
    };
}
pub(crate) use impl_bucket_mix;

/// Land/ocean mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OceanMapData {
    pub is_land: bool,
}

impl OceanMapData {
    pub const OCEAN: Self = Self { is_land: false };
    pub const LAND: Self = Self { is_land: true };
}

impl_bucket_mix!(OceanMapData);

/// Discrete climate levels assigned before biome classification.
///
/// Consumed at a single resolution, so it has no mixing rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PreClimateData {
    /// Temperature level in `0..=4`.
    pub temp_level: i32,
    /// Precipitation level in `0..=4`.
    pub prcp_level: i32,
}

/// Terrain shaping parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LandscapeData {
    /// Maximum height excursion from sea level, in blocks.
    pub max_abs_scale: i32,
    /// Blend weight between slow and fast height noise, in `[0, 1)`.
    pub roughness: f32,
}

impl MapCell for LandscapeData {
    fn mix2(a: &Self, b: &Self, r: f32) -> Self {
        let avg = (a.max_abs_scale + b.max_abs_scale) as f32 / 2.0;
        Self {
            max_abs_scale: (avg + (4.0 * r - 2.0)) as i32,
            roughness: (a.roughness + b.roughness) / 2.0,
        }
    }

    fn mix3(a: &Self, b: &Self, c: &Self, r: f32) -> Self {
        let avg = (a.max_abs_scale + b.max_abs_scale + c.max_abs_scale) as f32 / 3.0;
        Self {
            max_abs_scale: (avg + (4.0 * r - 2.0)) as i32,
            roughness: (a.roughness + b.roughness + c.roughness) / 3.0,
        }
    }

    fn mix4(a: &Self, b: &Self, c: &Self, d: &Self, _r: f32) -> Self {
        let sum = a.max_abs_scale + b.max_abs_scale + c.max_abs_scale + d.max_abs_scale;
        Self {
            max_abs_scale: (sum as f32 / 4.0) as i32,
            roughness: (a.roughness + b.roughness + c.roughness + d.roughness) / 4.0,
        }
    }

    /// Exact bilinear interpolation on the finest grid; the diagonal blend elsewhere.
    fn sample_subpixel(grid: &Grid<Self>, x: f64, y: f64) -> Self {
        if grid.size() < crate::pipeline::FINEST_MAP_SIZE {
            return diagonal_subpixel(grid, x, y);
        }

        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + 1, y0 + 1);
        let (wx1, wy1) = (x - x0 as f64, y - y0 as f64);
        let (wx0, wy0) = (1.0 - wx1, 1.0 - wy1);

        let d00 = grid[(x0, y0)];
        let d10 = grid[(x1, y0)];
        let d01 = grid[(x0, y1)];
        let d11 = grid[(x1, y1)];

        let lerp = |f: fn(&Self) -> f64| {
            let v0 = wy0 * f(&d00) + wy1 * f(&d01);
            let v1 = wy0 * f(&d10) + wy1 * f(&d11);
            wx0 * v0 + wx1 * v1
        };

        Self {
            max_abs_scale: lerp(|d| d.max_abs_scale as f64) as i32,
            roughness: lerp(|d| d.roughness as f64) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    const A: OceanMapData = OceanMapData::OCEAN;
    const B: OceanMapData = OceanMapData::LAND;

    fn below(b: f32) -> f32 {
        f32::from_bits(b.to_bits() - 1)
    }

    #[test]
    fn test_mix2_partition_boundary() {
        assert_eq!(OceanMapData::mix2(&A, &B, below(0.5)), A);
        assert_eq!(OceanMapData::mix2(&A, &B, 0.5), B, "r exactly 0.5 picks the upper bucket");
        assert_eq!(OceanMapData::mix2(&A, &B, 0.0), A);
        assert_eq!(OceanMapData::mix2(&A, &B, below(1.0)), B);
    }

    #[test]
    fn test_mix3_partition_boundaries() {
        let pick = |r| OceanMapData::mix3(&A, &B, &A, r);
        assert_eq!(pick(below(0.33)), A);
        assert_eq!(pick(0.33), B);
        assert_eq!(pick(below(0.67)), B);
        assert_eq!(pick(0.67), A);
    }

    #[test]
    fn test_mix4_partition_boundaries() {
        let cells = [
            OceanMapData::LAND,
            OceanMapData::OCEAN,
            OceanMapData::LAND,
            OceanMapData::OCEAN,
        ];
        let pick = |r| OceanMapData::mix4(&cells[0], &cells[1], &cells[2], &cells[3], r);
        for (k, b) in [0.25f32, 0.5, 0.75].into_iter().enumerate() {
            assert_eq!(pick(below(b)), cells[k], "just below {b}");
            assert_eq!(pick(b), cells[k + 1], "exactly {b}");
        }
    }

    #[test]
    fn test_landscape_mix2_adds_jitter() {
        let a = LandscapeData { max_abs_scale: 10, roughness: 0.2 };
        let b = LandscapeData { max_abs_scale: 20, roughness: 0.4 };
        assert_eq!(LandscapeData::mix2(&a, &b, 0.5).max_abs_scale, 15);
        assert_eq!(LandscapeData::mix2(&a, &b, 0.0).max_abs_scale, 13);
        assert_eq!(LandscapeData::mix2(&a, &b, 0.99).max_abs_scale, 16);
        assert!((LandscapeData::mix2(&a, &b, 0.1).roughness - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_landscape_mix3_adds_jitter() {
        let a = LandscapeData { max_abs_scale: 3, roughness: 0.0 };
        let b = LandscapeData { max_abs_scale: 6, roughness: 0.3 };
        let c = LandscapeData { max_abs_scale: 9, roughness: 0.6 };
        assert_eq!(LandscapeData::mix3(&a, &b, &c, 0.5).max_abs_scale, 6);
        assert_eq!(LandscapeData::mix3(&a, &b, &c, 0.0).max_abs_scale, 4);
        assert!((LandscapeData::mix3(&a, &b, &c, 0.0).roughness - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_landscape_mix4_ignores_draw() {
        let cells = [1, 2, 3, 6].map(|s| LandscapeData { max_abs_scale: s, roughness: 0.5 });
        let m0 = LandscapeData::mix4(&cells[0], &cells[1], &cells[2], &cells[3], 0.0);
        let m1 = LandscapeData::mix4(&cells[0], &cells[1], &cells[2], &cells[3], 0.99);
        assert_eq!(m0, m1);
        assert_eq!(m0.max_abs_scale, 3);
    }

    #[test]
    fn test_landscape_mix_truncates_toward_zero() {
        let a = LandscapeData { max_abs_scale: 0, roughness: 0.0 };
        // 0 + (4 * 0.1 - 2) = -1.6 truncates to -1
        assert_eq!(LandscapeData::mix2(&a, &a, 0.1).max_abs_scale, -1);
    }

    #[test]
    fn test_diagonal_subpixel_uses_mean_offset() {
        let mut grid: Grid<OceanMapData> = Grid::new(IVec2::ZERO, 64, 4);
        grid.set(2, 2, OceanMapData::LAND);
        // corners (2,2) (3,2) (2,3) (3,3); r = (0.1 + 0.1) / 2 = 0.1 picks the first.
        assert_eq!(grid.sample_point_subpixel(2.1, 2.1), OceanMapData::LAND);
        // r = (0.9 + 0.9) / 2 = 0.9 picks the last corner.
        assert_eq!(grid.sample_point_subpixel(2.9, 2.9), OceanMapData::OCEAN);
    }

    #[test]
    fn test_finest_landscape_subpixel_is_bilinear() {
        let size = crate::pipeline::FINEST_MAP_SIZE;
        let mut grid: Grid<LandscapeData> = Grid::with_pad(IVec2::ZERO, 8, size, 1);
        grid.set(1, 1, LandscapeData { max_abs_scale: 0, roughness: 0.0 });
        grid.set(2, 1, LandscapeData { max_abs_scale: 40, roughness: 0.4 });
        grid.set(1, 2, LandscapeData { max_abs_scale: 80, roughness: 0.8 });
        grid.set(2, 2, LandscapeData { max_abs_scale: 120, roughness: 1.0 });

        let mid = grid.sample_point_subpixel(1.5, 1.5);
        assert_eq!(mid.max_abs_scale, 60);
        assert!((mid.roughness - 0.55).abs() < 1e-6);

        let edge = grid.sample_point_subpixel(1.25, 1.0);
        assert_eq!(edge.max_abs_scale, 10);
        assert!((edge.roughness - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_coarse_landscape_subpixel_uses_mix() {
        let mut grid: Grid<LandscapeData> = Grid::new(IVec2::ZERO, 64, 8);
        for (i, j) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            grid.set(i, j, LandscapeData { max_abs_scale: 4 * (i + j) as i32, roughness: 0.0 });
        }
        // Plain 4-way average: (16 + 20 + 20 + 24) / 4
        assert_eq!(grid.sample_point_subpixel(2.5, 2.5).max_abs_scale, 20);
    }
}
