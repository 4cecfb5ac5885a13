//! Region pipeline: runs the full layer cascade for one world region and
//! caches the results for block-level queries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use dashmap::DashMap;
use glam::IVec2;

use crate::biome::{BiomeData, BiomeType};
use crate::cell::LandscapeData;
use crate::error::MapGenError;
use crate::grid::{DEFAULT_PAD, Grid};
use crate::layers::{
    LAND_THRESHOLD, Side, gen_biome, gen_island, gen_landscape_from_biome,
    gen_landscape_from_ocean, gen_pre_climate, gen_pre_climate_bfs, gen_shoreline, noisy_zoom,
    stitch_biomes, white_noise, zoom,
};

/// Side of the root noise grid.
pub const BASE_MAP_SIZE: usize = 8;
/// World units per root noise cell.
pub const BASE_SCALE: i32 = 512;
/// Side of the block-resolution grids handed to terrain generation.
pub const FINEST_MAP_SIZE: usize = 512;
/// World units per cell of the finest grids.
pub const FINEST_SCALE: i32 = 8;
/// World units covered by one region along each axis.
pub const REGION_SPAN: i32 = BASE_MAP_SIZE as i32 * BASE_SCALE;

/// How precipitation levels are assigned before biome classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClimateModel {
    /// Precipitation from hash noise.
    #[default]
    Noise,
    /// Precipitation from distance to the nearest ocean cell.
    DistanceToOcean,
}

/// Which grid the landscape parameters are derived from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LandscapeSource {
    /// Gradient noise over the level-128 biome map with inline shoreline clamping,
    /// upsampled by noisy zoom.
    #[default]
    Biome,
    /// Hash noise over the level-32 ocean mask, upsampled by zoom and clamped
    /// against the finest biome map.
    Ocean,
}

/// Tunables for one pipeline instance.
#[derive(Clone, Debug, PartialEq)]
pub struct MapGenParams {
    /// Root noise value above which a cell is land.
    pub land_threshold: f32,
    pub climate_model: ClimateModel,
    pub landscape_source: LandscapeSource,
    /// Copy neighbouring regions' level-32 biome cells into this region's
    /// padding before zooming. Off by default, in which case adjacent regions
    /// are generated independently and may disagree along their seam.
    pub stitch_biomes: bool,
}

impl MapGenParams {
    /// Rejects parameters every comparison would silently ignore.
    pub fn validate(&self) -> Result<(), MapGenError> {
        if !self.land_threshold.is_finite() {
            return Err(MapGenError::InvalidParams {
                field: "land_threshold",
                reason: format!("{} is not a finite number", self.land_threshold),
            });
        }
        Ok(())
    }
}

impl Default for MapGenParams {
    fn default() -> Self {
        Self {
            land_threshold: LAND_THRESHOLD,
            climate_model: ClimateModel::default(),
            landscape_source: LandscapeSource::default(),
            stitch_biomes: false,
        }
    }
}

/// Base position of the region containing world point `(world_x, world_z)`.
///
/// Rounds toward negative infinity, so `-1` belongs to the region at `-REGION_SPAN`.
pub fn region_base(world_x: i32, world_z: i32) -> IVec2 {
    IVec2::new(
        world_x.div_euclid(REGION_SPAN) * REGION_SPAN,
        world_z.div_euclid(REGION_SPAN) * REGION_SPAN,
    )
}

/// Biome and landscape sample for one block column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnData {
    pub biome: BiomeType,
    pub landscape: LandscapeData,
}

/// Finest-resolution maps for one region.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionMaps {
    /// World position of the region's first interior cell.
    pub basepos: IVec2,
    /// Pad-2 biome map, [`FINEST_MAP_SIZE`] cells per side.
    pub biome: Grid<BiomeData>,
    /// Pad-1 landscape map, [`FINEST_MAP_SIZE`] cells per side.
    pub landscape: Grid<LandscapeData>,
}

impl RegionMaps {
    /// Returns `true` if `(x, z)` lies inside this region.
    pub fn contains(&self, x: i32, z: i32) -> bool {
        let offset = IVec2::new(x, z).wrapping_sub(self.basepos);
        (0..REGION_SPAN).contains(&offset.x) && (0..REGION_SPAN).contains(&offset.y)
    }

    /// Biome of the cell covering `(x, z)`, or `None` outside the region.
    pub fn biome_at(&self, x: i32, z: i32) -> Option<BiomeType> {
        self.contains(x, z).then(|| self.biome_in_region(x, z))
    }

    /// Interpolated landscape parameters at `(x, z)`, or `None` outside the region.
    pub fn landscape_at(&self, x: i32, z: i32) -> Option<LandscapeData> {
        self.contains(x, z).then(|| self.landscape_in_region(x, z))
    }

    /// Both samples for the block column at `(x, z)`, or `None` outside the region.
    pub fn column(&self, x: i32, z: i32) -> Option<ColumnData> {
        self.contains(x, z).then(|| self.column_in_region(x, z))
    }

    fn biome_in_region(&self, x: i32, z: i32) -> BiomeType {
        let index = self.biome.world_to_map_point(x, z);
        self.biome[(index.x as usize, index.y as usize)].biome_type
    }

    fn landscape_in_region(&self, x: i32, z: i32) -> LandscapeData {
        let p = self.landscape.world_to_map_point_f(x, z);
        self.landscape.sample_point_subpixel(p.x as f64, p.y as f64)
    }

    fn column_in_region(&self, x: i32, z: i32) -> ColumnData {
        ColumnData {
            biome: self.biome_in_region(x, z),
            landscape: self.landscape_in_region(x, z),
        }
    }
}

/// Fails if any cell of a generated biome map still holds [`BiomeType::None`].
pub fn validate_biome_map(biome: &Grid<BiomeData>) -> Result<(), MapGenError> {
    match biome
        .iter()
        .find(|(_, _, cell)| cell.biome_type == BiomeType::None)
    {
        Some((i, j, _)) => Err(MapGenError::UninitializedBiome { i, j }),
        None => Ok(()),
    }
}

/// Level-32 biome maps of already generated regions, keyed by region base.
///
/// Consulted only when [`MapGenParams::stitch_biomes`] is on. Results then
/// depend on generation order: a region generated after its neighbour takes
/// the neighbour's border cells, one generated before it does not.
#[derive(Debug, Default)]
pub struct BiomeStitchCache {
    maps: DashMap<IVec2, Grid<BiomeData>>,
}

impl BiomeStitchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stitches `biome` against every cached neighbour, then records the
    /// stitched map.
    ///
    /// Stitching only rewrites padding and neighbours only read interior
    /// cells, so the recorded border never feeds back into another region.
    pub fn stitch_and_insert(
        &self,
        region: IVec2,
        biome: &mut Grid<BiomeData>,
    ) -> Result<(), MapGenError> {
        for side in Side::ALL {
            let neighbor_base = region.wrapping_add(side.offset() * REGION_SPAN);
            if let Some(neighbor) = self.maps.get(&neighbor_base) {
                stitch_biomes(biome, &neighbor, side)?;
                log::trace!("stitched region {region} against {neighbor_base} ({side:?})");
            }
        }
        self.maps.insert(region, biome.clone());
        Ok(())
    }

    /// Recorded level-32 map of `region`, if any.
    pub fn get(&self, region: IVec2) -> Option<Grid<BiomeData>> {
        self.maps.get(&region).map(|map| map.value().clone())
    }

    pub fn contains(&self, region: IVec2) -> bool {
        self.maps.contains_key(&region)
    }

    pub fn remove(&self, region: IVec2) {
        self.maps.remove(&region);
    }

    pub fn clear(&self) {
        self.maps.clear();
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// Runs the full cascade for the region whose base is `basepos`.
///
/// Resolution ladder: white noise and island mask at 8 cells, two zooms to
/// 32, climate and biome classification at 32, four more zooms to 512. The
/// landscape branch starts at 128 (or 32 for [`LandscapeSource::Ocean`]) and
/// ends at 512 as well.
pub fn generate_region(
    basepos: IVec2,
    params: &MapGenParams,
    stitch: Option<&BiomeStitchCache>,
) -> Result<RegionMaps, MapGenError> {
    params.validate()?;
    let started = Instant::now();

    let noise = white_noise(basepos, BASE_SCALE, BASE_MAP_SIZE, DEFAULT_PAD);
    let ocean8 = gen_island(&noise, params.land_threshold);
    let ocean16 = zoom(&ocean8)?;
    let ocean32 = zoom(&ocean16)?;

    let climate32 = match params.climate_model {
        ClimateModel::Noise => gen_pre_climate(&ocean32),
        ClimateModel::DistanceToOcean => gen_pre_climate_bfs(&ocean32),
    };
    let mut biome32 = gen_biome(&climate32, &ocean32)?;
    if let Some(cache) = stitch.filter(|_| params.stitch_biomes) {
        cache.stitch_and_insert(basepos, &mut biome32)?;
    }

    let biome64 = zoom(&biome32)?;
    let biome128 = zoom(&biome64)?;
    let biome256 = zoom(&biome128)?;
    let biome512 = zoom(&biome256)?;

    let landscape = match params.landscape_source {
        LandscapeSource::Biome => {
            let landscape128 = gen_landscape_from_biome(&biome128)?;
            let landscape256 = noisy_zoom(&landscape128)?;
            noisy_zoom(&landscape256)?
        }
        LandscapeSource::Ocean => {
            let mut landscape = gen_landscape_from_ocean(&ocean32);
            for _ in 0..4 {
                landscape = zoom(&landscape)?;
            }
            gen_shoreline(&mut landscape, &biome512)?;
            landscape
        }
    };

    validate_biome_map(&biome512)?;

    log::debug!(
        "generated region {basepos} in {}us",
        started.elapsed().as_micros()
    );

    Ok(RegionMaps {
        basepos,
        biome: biome512,
        landscape,
    })
}

type RegionSlot = Arc<OnceLock<Result<Arc<RegionMaps>, MapGenError>>>;

/// Lazily populated map of region base to generated maps.
///
/// Each region is generated at most once: concurrent callers for the same
/// region block on a shared slot until the first finishes, and the maps are
/// published whole. A failed generation is cached too; every later request
/// for that region gets the same error until it is evicted. Handed-out maps
/// are immutable `Arc`s, so evicting or clearing never affects a caller that
/// already holds one.
#[derive(Debug)]
pub struct RegionCache {
    params: MapGenParams,
    regions: DashMap<IVec2, RegionSlot>,
    stitch: BiomeStitchCache,
    generations: AtomicUsize,
}

impl RegionCache {
    pub fn new(params: MapGenParams) -> Self {
        Self {
            params,
            regions: DashMap::new(),
            stitch: BiomeStitchCache::new(),
            generations: AtomicUsize::new(0),
        }
    }

    pub fn params(&self) -> &MapGenParams {
        &self.params
    }

    /// Returns the maps of the region containing `(world_x, world_z)`,
    /// generating them on first use.
    pub fn find_or_create(&self, world_x: i32, world_z: i32) -> Result<Arc<RegionMaps>, MapGenError> {
        let base = region_base(world_x, world_z);
        let slot = Arc::clone(self.regions.entry(base).or_default().value());
        slot.get_or_init(|| {
            self.generations.fetch_add(1, Ordering::Relaxed);
            let stitch = self.params.stitch_biomes.then_some(&self.stitch);
            generate_region(base, &self.params, stitch).map(Arc::new)
        })
        .clone()
    }

    /// Number of times the pipeline has run for this cache, failures included.
    pub fn generation_count(&self) -> usize {
        self.generations.load(Ordering::Relaxed)
    }

    /// Already generated maps for the region based at `basepos`, without generating.
    pub fn get(&self, basepos: IVec2) -> Option<Arc<RegionMaps>> {
        let slot = self.regions.get(&basepos)?;
        slot.value().get().and_then(|result| result.as_ref().ok().cloned())
    }

    /// Returns `true` if the region based at `basepos` has finished generating.
    pub fn contains(&self, basepos: IVec2) -> bool {
        self.get(basepos).is_some()
    }

    /// Drops the cached maps of one region. Holders of the maps keep them.
    pub fn evict(&self, basepos: IVec2) -> bool {
        self.stitch.remove(basepos);
        if self.regions.remove(&basepos).is_some() {
            true
        } else {
            log::warn!("evict: region {basepos} was not cached");
            false
        }
    }

    pub fn clear(&self) {
        self.regions.clear();
        self.stitch.clear();
    }

    /// Number of regions cached or being generated.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Default for RegionCache {
    fn default() -> Self {
        Self::new(MapGenParams::default())
    }
}

/// Biome and landscape parameters for the block column at `(world_x, world_z)`.
pub fn generate_chunk_column_data(
    cache: &RegionCache,
    world_x: i32,
    world_z: i32,
) -> Result<ColumnData, MapGenError> {
    let maps = cache.find_or_create(world_x, world_z)?;
    Ok(maps.column_in_region(world_x, world_z))
}
