//! Deterministic integer hash noise and the gradient noise built on it.
//!
//! Every value here is a pure function of integer lattice coordinates. The
//! hash uses wrapping 32-bit arithmetic and all transcendental functions go
//! through `libm`, so a given `(ix, iy)` produces the same output on every
//! platform and every run.

use glam::{DVec2, IVec2};

const HASH_MUL_A: u32 = 3_284_157_443;
const HASH_MUL_B: u32 = 1_911_520_717;
const HASH_MUL_C: u32 = 2_048_419_325;

/// Truncated π used to turn hashes into angles. Every noise field in the
/// cascade depends on this exact value.
#[allow(clippy::approx_constant)]
const HASH_PI: f64 = 3.14159265;

/// Offset added to the hash angle before folding it into `[0, 1)`.
const SCALAR_OFFSET: f32 = 0.2;

/// Raw 32-bit hash of a lattice point (multiply / rotate-xor cascade).
#[inline]
pub fn hash_u32(ix: i32, iy: i32) -> u32 {
    let mut a = ix as u32;
    let mut b = iy as u32;
    a = a.wrapping_mul(HASH_MUL_A);
    b ^= a.rotate_left(16);
    b = b.wrapping_mul(HASH_MUL_B);
    a ^= b.rotate_left(16);
    a.wrapping_mul(HASH_MUL_C)
}

/// Hash mapped onto an angle in `[0, 2·3.14159265)`.
#[inline]
pub fn hash_angle(ix: i32, iy: i32) -> f32 {
    (hash_u32(ix, iy) as f64 * (HASH_PI / 2_147_483_648.0)) as f32
}

/// Scalar hash noise in `[0, 1)`.
///
/// Used as the random draw for zoom mixes, land probability and every other
/// per-cell decision in the layer cascade.
#[inline]
pub fn hash(ix: i32, iy: i32) -> f32 {
    let folded = libm::fmodf(hash_angle(ix, iy) + SCALAR_OFFSET, 1.0);
    // fmodf of a positive value is already in [0, 1); guard the f32 rounding edge.
    if folded >= 1.0 { 0.0 } else { folded }
}

/// [`hash`] at a world point.
#[inline]
pub fn hash_at(p: IVec2) -> f32 {
    hash(p.x, p.y)
}

/// Unit gradient `(sin θ, cos θ)` for the hash angle θ shifted by `phase`.
#[inline]
pub fn hash_gradient(ix: i32, iy: i32, phase: f64) -> DVec2 {
    let angle = hash_angle(ix, iy) as f64 + phase;
    DVec2::new(libm::sin(angle), libm::cos(angle))
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// Gradient noise over the hash lattice.
///
/// Gradients come from [`hash_gradient`]; the interpolant is the plain
/// fractional offset, so the field is continuous but not smooth across cell
/// edges. Output lies roughly in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerlinNoise2D {
    /// Angle offset applied to every lattice gradient.
    pub phase: f64,
}

impl PerlinNoise2D {
    /// Variant used by the landscape layer.
    pub const LAYER: Self = Self { phase: 0.05 };

    /// Creates a sampler with the given gradient phase.
    pub fn new(phase: f64) -> Self {
        Self { phase }
    }

    fn dot_gradient(&self, ix: i32, iy: i32, x: f64, y: f64) -> f64 {
        let g = hash_gradient(ix, iy, self.phase);
        (x - ix as f64) * g.y + (y - iy as f64) * g.x
    }

    /// Samples the noise at a continuous coordinate.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x0f = x.floor();
        let y0f = y.floor();
        let (x0, y0) = (x0f as i32, y0f as i32);
        let (x1, y1) = (x0.wrapping_add(1), y0.wrapping_add(1));
        let sx = x - x0f;
        let sy = y - y0f;

        let ix0 = lerp(
            self.dot_gradient(x0, y0, x, y),
            self.dot_gradient(x1, y0, x, y),
            sx,
        );
        let ix1 = lerp(
            self.dot_gradient(x0, y1, x, y),
            self.dot_gradient(x1, y1, x, y),
            sx,
        );
        lerp(ix0, ix1, sy)
    }
}

impl ::noise::NoiseFn<f64, 2> for PerlinNoise2D {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

/// How octave contributions are weighted by [`FractalNoise2D`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OctaveWeighting {
    /// Every octave contributes with unit weight; persistence is ignored.
    #[default]
    Flat,
    /// Octave `k` is weighted by `persistence^k`.
    Persistence,
}

/// Sum of [`PerlinNoise2D`] samples over a list of octave frequencies.
#[derive(Clone, Debug, PartialEq)]
pub struct FractalNoise2D {
    /// Per-octave amplitude decay, applied only with [`OctaveWeighting::Persistence`].
    pub persistence: f64,
    /// Frequencies, one per octave.
    pub octaves: Vec<f64>,
    /// Octave weighting mode.
    pub weighting: OctaveWeighting,
    perlin: PerlinNoise2D,
}

impl FractalNoise2D {
    /// Creates a flat-weighted fractal over `octaves`.
    pub fn new(persistence: f64, octaves: impl Into<Vec<f64>>) -> Self {
        Self {
            persistence,
            octaves: octaves.into(),
            weighting: OctaveWeighting::Flat,
            perlin: PerlinNoise2D::default(),
        }
    }

    /// Returns the same fractal with a different weighting mode.
    pub fn with_weighting(mut self, weighting: OctaveWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Samples the fractal at a continuous coordinate.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut amount = 1.0;
        let mut result = 0.0;
        for &f in &self.octaves {
            let term = self.perlin.sample(f * x, f * y);
            result += match self.weighting {
                OctaveWeighting::Flat => term,
                OctaveWeighting::Persistence => amount * term,
            };
            amount *= self.persistence;
        }
        result
    }
}

impl ::noise::NoiseFn<f64, 2> for FractalNoise2D {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}
