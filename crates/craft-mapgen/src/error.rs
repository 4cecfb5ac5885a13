//! Map generation error types.

/// Errors raised while generating, validating, or decoding maps.
///
/// Pad and geometry mismatches indicate that layers were chained in the wrong
/// order; biome errors indicate corrupted or uninitialized map data. None of
/// them are expected at runtime in a correctly wired pipeline.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapGenError {
    /// A layer received an input grid with the wrong border width.
    #[error("{layer} expects input padding {expected}, got {actual}")]
    PadMismatch {
        /// Name of the rejecting layer.
        layer: &'static str,
        /// Padding the layer requires.
        expected: usize,
        /// Padding of the grid it was given.
        actual: usize,
    },

    /// A zoom layer cannot halve a scale below one world unit per cell.
    #[error("{layer} cannot halve scale {scale}")]
    ScaleUnderflow {
        /// Name of the rejecting layer.
        layer: &'static str,
        /// Scale of the input grid.
        scale: i32,
    },

    /// Grids combined by a layer do not cover the same world area.
    #[error("{layer} inputs disagree on grid geometry")]
    GeometryMismatch {
        /// Name of the rejecting layer.
        layer: &'static str,
    },

    /// A decoded biome code lies outside the [`BiomeType`](crate::BiomeType) range.
    #[error("biome code {0} is out of range")]
    CorruptBiome(u8),

    /// A generated biome map still holds the placeholder biome.
    #[error("biome map cell ({i}, {j}) was never assigned")]
    UninitializedBiome {
        /// Row index (padded).
        i: usize,
        /// Column index (padded).
        j: usize,
    },

    /// A text dump holds the wrong number of cells for its grid.
    #[error("map dump has {actual} cells, expected {expected}")]
    DumpSize {
        /// Cell count implied by the grid geometry.
        expected: usize,
        /// Cell count found in the dump.
        actual: usize,
    },

    /// Pipeline parameters that cannot produce a meaningful map.
    #[error("invalid map generation parameter {field}: {reason}")]
    InvalidParams {
        /// Name of the offending parameter.
        field: &'static str,
        /// What is wrong with its value.
        reason: String,
    },

    /// A text dump token is not a number.
    #[error("failed to parse map dump token {0:?}")]
    DumpParse(String),
}
