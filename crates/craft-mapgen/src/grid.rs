//! Square, padded, world-anchored grids shared by every generation layer.
//!
//! A grid of logical side `N` stores `(N + 2·pad)²` cells in one row-major
//! buffer. Cell `(pad, pad)` sits on the grid's `basepos`; every step along
//! either axis moves `scale` world units.
//!
//! World coordinates wrap at the `i32` range, so a grid straddling
//! `i32::MAX` continues at `i32::MIN`.

use std::ops::{Index, IndexMut};

use glam::{IVec2, Vec2};

use crate::cell::MapCell;

/// Border width used by every layer unless it narrows padding on purpose.
pub const DEFAULT_PAD: usize = 2;

/// Placement of a grid in world space: origin, cell size, side and border.
///
/// Layers build their output geometry from their input's, so comparing two
/// geometries tells whether two grids describe the same lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridGeometry {
    /// World coordinate of cell `(pad, pad)`.
    pub basepos: IVec2,
    /// World units per cell. Always positive.
    pub scale: i32,
    /// Logical side length `N`, excluding padding.
    pub size: usize,
    /// Border width on each side.
    pub pad: usize,
}

impl GridGeometry {
    /// Creates a geometry description.
    pub fn new(basepos: IVec2, scale: i32, size: usize, pad: usize) -> Self {
        debug_assert!(scale > 0, "grid scale must be positive, got {scale}");
        Self {
            basepos,
            scale,
            size,
            pad,
        }
    }

    /// Padded side length: `size + 2 * pad`.
    #[inline]
    pub fn stride(&self) -> usize {
        self.size + 2 * self.pad
    }

    /// Total number of stored cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.stride() * self.stride()
    }

    /// World coordinate of cell `(i, j)`: `basepos + (i - pad, j - pad) * scale`.
    #[inline]
    pub fn map_to_world_point(&self, i: usize, j: usize) -> IVec2 {
        let pad = self.pad as i32;
        let offset = IVec2::new(i as i32 - pad, j as i32 - pad);
        self.basepos
            .wrapping_add(offset.wrapping_mul(IVec2::splat(self.scale)))
    }

    /// Cell index containing world point `(x, z)`: `(world - basepos) / scale + pad`.
    ///
    /// Division truncates, so callers pass lattice points or points at or after
    /// `basepos`. The result may lie outside the grid; see [`Self::contains_index`].
    #[inline]
    pub fn world_to_map_point(&self, x: i32, z: i32) -> IVec2 {
        IVec2::new(x, z).wrapping_sub(self.basepos) / self.scale + IVec2::splat(self.pad as i32)
    }

    /// Fractional cell coordinate of world point `(x, z)`, for subpixel sampling.
    #[inline]
    pub fn world_to_map_point_f(&self, x: i32, z: i32) -> Vec2 {
        let scale = self.scale as f32;
        let pad = self.pad as f32;
        Vec2::new(
            x.wrapping_sub(self.basepos.x) as f32 / scale + pad,
            z.wrapping_sub(self.basepos.y) as f32 / scale + pad,
        )
    }

    /// Returns `true` if `index` addresses a stored cell.
    #[inline]
    pub fn contains_index(&self, index: IVec2) -> bool {
        let stride = self.stride() as i32;
        (0..stride).contains(&index.x) && (0..stride).contains(&index.y)
    }

    /// Returns `true` if `index` addresses a cell outside the padding border.
    #[inline]
    pub fn is_interior(&self, index: IVec2) -> bool {
        let lo = self.pad as i32;
        let hi = lo + self.size as i32;
        (lo..hi).contains(&index.x) && (lo..hi).contains(&index.y)
    }

    /// World span covered by the interior along one axis.
    #[inline]
    pub fn span(&self) -> i32 {
        self.size as i32 * self.scale
    }

    /// Base of the grid one span away along `step` (in spans), wrapping like world points.
    #[inline]
    pub fn neighbor_base(&self, step: IVec2) -> IVec2 {
        self.basepos
            .wrapping_add(step.wrapping_mul(IVec2::splat(self.span())))
    }

    /// Returns `true` if both geometries share origin and scale, ignoring size and padding.
    #[inline]
    pub fn same_anchor(&self, other: &GridGeometry) -> bool {
        self.basepos == other.basepos && self.scale == other.scale
    }
}

/// A square grid of map cells with a padding border and a world anchor.
///
/// Grids are plain owned values: cloning deep-copies the cell buffer, so a
/// grid handed out by a cache can never be changed through another handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    geometry: GridGeometry,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Allocates a default-filled grid with the standard border of [`DEFAULT_PAD`].
    pub fn new(basepos: IVec2, scale: i32, size: usize) -> Self {
        Self::with_pad(basepos, scale, size, DEFAULT_PAD)
    }

    /// Allocates a default-filled grid with an explicit border width.
    pub fn with_pad(basepos: IVec2, scale: i32, size: usize, pad: usize) -> Self {
        Self::filled(GridGeometry::new(basepos, scale, size, pad), T::default())
    }

    /// Allocates a grid with every cell set to `value`.
    pub fn filled(geometry: GridGeometry, value: T) -> Self {
        Self {
            cells: vec![value; geometry.cell_count()],
            geometry,
        }
    }
}

impl<T> Grid<T> {
    /// Builds a grid by evaluating `f(i, j, world_point)` for every stored cell.
    pub fn from_fn(geometry: GridGeometry, mut f: impl FnMut(usize, usize, IVec2) -> T) -> Self {
        let stride = geometry.stride();
        let mut cells = Vec::with_capacity(geometry.cell_count());
        for i in 0..stride {
            for j in 0..stride {
                cells.push(f(i, j, geometry.map_to_world_point(i, j)));
            }
        }
        Self { geometry, cells }
    }

    /// Wraps an existing row-major buffer.
    ///
    /// Returns `None` if `cells.len()` does not match the geometry.
    pub fn from_cells(geometry: GridGeometry, cells: Vec<T>) -> Option<Self> {
        (cells.len() == geometry.cell_count()).then_some(Self { geometry, cells })
    }

    /// Produces a grid of the same geometry by mapping every cell.
    pub fn map_cells<U>(&self, mut f: impl FnMut(usize, usize, &T) -> U) -> Grid<U> {
        let stride = self.stride();
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| f(idx / stride, idx % stride, cell))
            .collect();
        Grid {
            geometry: self.geometry,
            cells,
        }
    }

    /// The grid's placement in world space.
    #[inline]
    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Logical side length `N`.
    #[inline]
    pub fn size(&self) -> usize {
        self.geometry.size
    }

    /// Border width.
    #[inline]
    pub fn pad(&self) -> usize {
        self.geometry.pad
    }

    /// Padded side length `N + 2·pad`.
    #[inline]
    pub fn stride(&self) -> usize {
        self.geometry.stride()
    }

    /// World coordinate of cell `(pad, pad)`.
    #[inline]
    pub fn basepos(&self) -> IVec2 {
        self.geometry.basepos
    }

    /// World units per cell.
    #[inline]
    pub fn scale(&self) -> i32 {
        self.geometry.scale
    }

    /// See [`GridGeometry::map_to_world_point`].
    #[inline]
    pub fn map_to_world_point(&self, i: usize, j: usize) -> IVec2 {
        self.geometry.map_to_world_point(i, j)
    }

    /// See [`GridGeometry::world_to_map_point`].
    #[inline]
    pub fn world_to_map_point(&self, x: i32, z: i32) -> IVec2 {
        self.geometry.world_to_map_point(x, z)
    }

    /// See [`GridGeometry::world_to_map_point_f`].
    #[inline]
    pub fn world_to_map_point_f(&self, x: i32, z: i32) -> Vec2 {
        self.geometry.world_to_map_point_f(x, z)
    }

    /// See [`GridGeometry::contains_index`].
    #[inline]
    pub fn contains_index(&self, index: IVec2) -> bool {
        self.geometry.contains_index(index)
    }

    /// Cell at `(i, j)`, or `None` if out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        let stride = self.stride();
        if i < stride && j < stride {
            Some(&self.cells[i * stride + j])
        } else {
            None
        }
    }

    /// Mutable cell at `(i, j)`, or `None` if out of range.
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        let stride = self.stride();
        if i < stride && j < stride {
            Some(&mut self.cells[i * stride + j])
        } else {
            None
        }
    }

    /// Overwrites cell `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is out of range.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self[(i, j)] = value;
    }

    /// Cell stored at world point `(x, z)`, or `None` if it falls outside the buffer.
    pub fn at_world(&self, x: i32, z: i32) -> Option<&T> {
        let index = self.world_to_map_point(x, z);
        if self.contains_index(index) {
            self.get(index.x as usize, index.y as usize)
        } else {
            None
        }
    }

    /// Row-major view of every stored cell, padding included.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Iterates `(i, j, &cell)` over every stored cell.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let stride = self.stride();
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (idx / stride, idx % stride, cell))
    }
}

impl<T: MapCell> Grid<T> {
    /// Samples the grid at a fractional cell coordinate.
    ///
    /// Most cell types use the coarse diagonal blend of the four surrounding
    /// cells; [`LandscapeData`](crate::LandscapeData) switches to exact bilinear
    /// interpolation on the finest grid.
    ///
    /// # Panics
    ///
    /// Panics if `(x + 1, y + 1)` falls outside the buffer.
    pub fn sample_point_subpixel(&self, x: f64, y: f64) -> T {
        T::sample_subpixel(self, x, y)
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        let stride = self.stride();
        debug_assert!(i < stride && j < stride, "({i}, {j}) outside {stride}x{stride} grid");
        &self.cells[i * stride + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        let stride = self.stride();
        debug_assert!(i < stride && j < stride, "({i}, {j}) outside {stride}x{stride} grid");
        &mut self.cells[i * stride + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_grid_allocates_padded_buffer() {
        let grid: Grid<f32> = Grid::new(IVec2::new(0, 0), 4, 8);
        assert_eq!(grid.stride(), 12);
        assert_eq!(grid.cells().len(), 144);
        assert!(grid.cells().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_map_to_world_point_accounts_for_padding() {
        let grid: Grid<u8> = Grid::new(IVec2::new(100, -200), 8, 4);
        assert_eq!(grid.map_to_world_point(2, 2), IVec2::new(100, -200));
        assert_eq!(grid.map_to_world_point(0, 0), IVec2::new(84, -216));
        assert_eq!(grid.map_to_world_point(5, 3), IVec2::new(124, -192));
    }

    #[test]
    fn test_world_to_map_point_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let base = IVec2::new(rng.random_range(-100_000..100_000), rng.random_range(-100_000..100_000));
            let scale = rng.random_range(1..=512);
            let size = rng.random_range(1..=64);
            let pad = rng.random_range(0..=2);
            let grid: Grid<u8> = Grid::with_pad(base, scale, size, pad);
            for i in 0..grid.stride() {
                for j in 0..grid.stride() {
                    let world = grid.map_to_world_point(i, j);
                    assert_eq!(
                        grid.world_to_map_point(world.x, world.y),
                        IVec2::new(i as i32, j as i32),
                        "round trip failed at ({i}, {j}) for base {base}, scale {scale}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_world_to_map_point_f_is_fractional() {
        let grid: Grid<u8> = Grid::with_pad(IVec2::ZERO, 8, 4, 1);
        let p = grid.world_to_map_point_f(12, 4);
        assert!((p.x - 2.5).abs() < 1e-6);
        assert!((p.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_index_is_row_major() {
        let mut grid: Grid<u32> = Grid::with_pad(IVec2::ZERO, 1, 2, 1);
        grid.set(1, 3, 7);
        assert_eq!(grid.cells()[1 * 4 + 3], 7);
        assert_eq!(grid[(1, 3)], 7);
        assert_eq!(grid.get(1, 3), Some(&7));
        assert_eq!(grid.get(4, 0), None);
    }

    #[test]
    fn test_from_fn_receives_world_points() {
        let geometry = GridGeometry::new(IVec2::new(10, 20), 5, 3, 2);
        let grid = Grid::from_fn(geometry, |_, _, world| world);
        for (i, j, world) in grid.iter() {
            assert_eq!(*world, grid.map_to_world_point(i, j));
        }
    }

    #[test]
    fn test_map_cells_preserves_geometry() {
        let grid: Grid<u8> = Grid::new(IVec2::new(-64, 64), 16, 4);
        let mapped = grid.map_cells(|i, j, _| i * 100 + j);
        assert_eq!(mapped.geometry(), grid.geometry());
        assert_eq!(mapped[(3, 5)], 305);
    }

    #[test]
    fn test_at_world_rejects_points_outside_buffer() {
        let grid: Grid<u8> = Grid::new(IVec2::ZERO, 8, 4);
        assert!(grid.at_world(0, 0).is_some());
        assert!(grid.at_world(-16, -16).is_some());
        assert!(grid.at_world(-24, 0).is_none());
        assert!(grid.at_world(48, 0).is_none());
    }

    #[test]
    fn test_from_cells_checks_length() {
        let geometry = GridGeometry::new(IVec2::ZERO, 1, 1, 1);
        assert!(Grid::from_cells(geometry, vec![0u8; 9]).is_some());
        assert!(Grid::from_cells(geometry, vec![0u8; 8]).is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut grid: Grid<u8> = Grid::new(IVec2::ZERO, 1, 2);
        let snapshot = grid.clone();
        grid.set(0, 0, 9);
        assert_eq!(snapshot[(0, 0)], 0);
        assert_ne!(grid, snapshot);
    }

    #[test]
    fn test_world_points_wrap_at_i32_edges() {
        let low: Grid<u8> = Grid::new(IVec2::new(i32::MIN, 0), 8, 4);
        assert_eq!(low.map_to_world_point(0, 2), IVec2::new(i32::MAX - 15, 0));
        assert_eq!(low.map_to_world_point(2, 2), IVec2::new(i32::MIN, 0));
        assert_eq!(low.world_to_map_point(i32::MAX - 15, 0), IVec2::new(0, 2));

        let high: Grid<u8> = Grid::new(IVec2::new(i32::MAX - 31, 0), 8, 4);
        assert_eq!(high.map_to_world_point(7, 2), IVec2::new(i32::MIN + 8, 0));
        assert_eq!(high.world_to_map_point(i32::MIN + 8, 0), IVec2::new(7, 2));
        assert!(high.at_world(i32::MAX, 0).is_some());

        let p = high.world_to_map_point_f(i32::MIN, 0);
        assert!((p.x - 6.0).abs() < 1e-6, "got {p}");
    }

    #[test]
    fn test_round_trip_near_i32_edges() {
        for base in [IVec2::new(i32::MIN, i32::MIN), IVec2::new(i32::MAX - 4095, 0)] {
            let grid: Grid<u8> = Grid::with_pad(base, 128, 32, 2);
            for i in 0..grid.stride() {
                for j in 0..grid.stride() {
                    let world = grid.map_to_world_point(i, j);
                    assert_eq!(
                        grid.world_to_map_point(world.x, world.y),
                        IVec2::new(i as i32, j as i32)
                    );
                }
            }
        }
    }

    #[test]
    fn test_neighbor_base_wraps() {
        let geometry = GridGeometry::new(IVec2::new(i32::MIN, 0), 128, 32, 2);
        assert_eq!(geometry.neighbor_base(IVec2::new(1, 0)), IVec2::new(i32::MIN + 4096, 0));
        assert_eq!(geometry.neighbor_base(IVec2::new(-1, 0)), IVec2::new(i32::MAX - 4095, 0));
    }

    #[test]
    fn test_interior_bounds() {
        let geometry = GridGeometry::new(IVec2::ZERO, 1, 4, 2);
        assert!(geometry.is_interior(IVec2::new(2, 2)));
        assert!(geometry.is_interior(IVec2::new(5, 5)));
        assert!(!geometry.is_interior(IVec2::new(1, 2)));
        assert!(!geometry.is_interior(IVec2::new(6, 2)));
        assert!(geometry.contains_index(IVec2::new(7, 7)));
        assert!(!geometry.contains_index(IVec2::new(8, 0)));
    }
}
