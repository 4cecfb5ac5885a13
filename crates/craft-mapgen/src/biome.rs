//! Biome identifiers and the climate classification rules that assign them.

use std::fmt;

use crate::cell::impl_bucket_mix;
use crate::error::MapGenError;

/// Highest precipitation level still classified as a dry biome.
pub const DRY_PRCP_MAX: i32 = 2;

/// Ocean cells whose depth noise falls below this become deep ocean.
pub const DEEP_OCEAN_THRESHOLD: f32 = 0.3;

/// Biome category of a map cell.
///
/// The discriminant is the stable on-disk code used by biome dumps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BiomeType {
    Desert = 0,
    Rainforest = 1,
    Shrubland = 2,
    Grassland = 3,
    Tundra = 4,
    Snowland = 5,
    ShallowOcean = 6,
    DeepOcean = 7,
    /// Placeholder for cells no layer has written yet.
    #[default]
    None = 8,
}

impl BiomeType {
    /// Number of valid codes.
    pub const COUNT: usize = 9;

    /// Every variant, in code order.
    pub const ALL: [BiomeType; Self::COUNT] = [
        BiomeType::Desert,
        BiomeType::Rainforest,
        BiomeType::Shrubland,
        BiomeType::Grassland,
        BiomeType::Tundra,
        BiomeType::Snowland,
        BiomeType::ShallowOcean,
        BiomeType::DeepOcean,
        BiomeType::None,
    ];

    #[inline]
    pub fn is_ocean(self) -> bool {
        matches!(self, BiomeType::ShallowOcean | BiomeType::DeepOcean)
    }

    /// Anything that is not ocean counts as land, including [`BiomeType::None`].
    #[inline]
    pub fn is_land(self) -> bool {
        !self.is_ocean()
    }

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            BiomeType::Desert => "desert",
            BiomeType::Rainforest => "rainforest",
            BiomeType::Shrubland => "shrubland",
            BiomeType::Grassland => "grassland",
            BiomeType::Tundra => "tundra",
            BiomeType::Snowland => "snowland",
            BiomeType::ShallowOcean => "shallow_ocean",
            BiomeType::DeepOcean => "deep_ocean",
            BiomeType::None => "none",
        }
    }
}

impl TryFrom<u8> for BiomeType {
    type Error = MapGenError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(MapGenError::CorruptBiome(code))
    }
}

impl fmt::Display for BiomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Biome payload carried by biome grids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BiomeData {
    pub biome_type: BiomeType,
}

impl BiomeData {
    pub const fn new(biome_type: BiomeType) -> Self {
        Self { biome_type }
    }
}

impl From<BiomeType> for BiomeData {
    fn from(biome_type: BiomeType) -> Self {
        Self { biome_type }
    }
}

impl_bucket_mix!(BiomeData);

/// Land biome lookup, rows `[dry, wet]`, columns by rising temperature.
const LAND_TABLE: [[BiomeType; 3]; 2] = [
    [BiomeType::Tundra, BiomeType::Shrubland, BiomeType::Desert],
    [BiomeType::Snowland, BiomeType::Grassland, BiomeType::Rainforest],
];

/// Classifies a land cell from its climate levels.
///
/// `prcp_level <= 2` is dry; temperature levels of 2 and above share the hottest column.
pub fn classify_land(prcp_level: i32, temp_level: i32) -> BiomeType {
    let row = usize::from(prcp_level > DRY_PRCP_MAX);
    let col = temp_level.clamp(0, 2) as usize;
    LAND_TABLE[row][col]
}

/// Classifies an ocean cell: deep only when fully surrounded by ocean and the
/// depth noise falls below [`DEEP_OCEAN_THRESHOLD`].
pub fn classify_ocean(all_neighbors_ocean: bool, noise: f32) -> BiomeType {
    if all_neighbors_ocean && noise < DEEP_OCEAN_THRESHOLD {
        BiomeType::DeepOcean
    } else {
        BiomeType::ShallowOcean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::MapCell;

    #[test]
    fn test_land_table_matches_documented_lookup() {
        let expected = [
            // (prcp, temp, biome)
            (0, 0, BiomeType::Tundra),
            (1, 0, BiomeType::Tundra),
            (2, 1, BiomeType::Shrubland),
            (1, 2, BiomeType::Desert),
            (0, 4, BiomeType::Desert),
            (3, 0, BiomeType::Snowland),
            (4, 1, BiomeType::Grassland),
            (3, 2, BiomeType::Rainforest),
            (4, 4, BiomeType::Rainforest),
        ];
        for (prcp, temp, biome) in expected {
            assert_eq!(classify_land(prcp, temp), biome, "prcp {prcp}, temp {temp}");
        }
    }

    #[test]
    fn test_land_table_never_yields_ocean() {
        for prcp in 0..=4 {
            for temp in 0..=4 {
                assert!(classify_land(prcp, temp).is_land());
            }
        }
    }

    #[test]
    fn test_ocean_depth_rule() {
        assert_eq!(classify_ocean(true, 0.1), BiomeType::DeepOcean);
        assert_eq!(classify_ocean(true, 0.3), BiomeType::ShallowOcean);
        assert_eq!(classify_ocean(false, 0.1), BiomeType::ShallowOcean);
        assert_eq!(classify_ocean(false, 0.9), BiomeType::ShallowOcean);
    }

    #[test]
    fn test_codes_round_trip() {
        for biome in BiomeType::ALL {
            assert_eq!(BiomeType::try_from(biome as u8), Ok(biome));
        }
    }

    #[test]
    fn test_out_of_range_code_is_corruption() {
        assert_eq!(BiomeType::try_from(9), Err(MapGenError::CorruptBiome(9)));
        assert_eq!(BiomeType::try_from(255), Err(MapGenError::CorruptBiome(255)));
    }

    #[test]
    fn test_land_ocean_partition() {
        let oceans: Vec<_> = BiomeType::ALL.into_iter().filter(|b| b.is_ocean()).collect();
        assert_eq!(oceans, vec![BiomeType::ShallowOcean, BiomeType::DeepOcean]);
        assert!(BiomeType::None.is_land());
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(BiomeType::ShallowOcean.to_string(), "shallow_ocean");
        assert_eq!(BiomeData::default().biome_type, BiomeType::None);
    }

    #[test]
    fn test_biome_mix_picks_verbatim() {
        let a = BiomeData::new(BiomeType::Desert);
        let b = BiomeData::new(BiomeType::Tundra);
        assert_eq!(BiomeData::mix2(&a, &b, 0.49), a);
        assert_eq!(BiomeData::mix2(&a, &b, 0.5), b);
        assert_eq!(BiomeData::mix3(&a, &b, &a, 0.5), b);
        assert_eq!(BiomeData::mix4(&a, &a, &a, &b, 0.8), b);
    }
}
