//! Pluggable 2D noise sources for noisy terrain
//!
//! A source is deterministic for a given seed and sampling order and returns
//! values in `[-1, 1]`. Coherent sources come from the `noise` crate; the
//! white source reproduces the uncorrelated per-cell jitter of early terrain
//! scripts.

use ::noise::{NoiseFn, Perlin, Simplex};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A seeded 2D noise function
pub trait NoiseSource {
    /// Sample the source at `(x, y)`, returning a value in `[-1, 1]`
    fn sample(&mut self, x: f64, y: f64) -> f64;
}

/// Adapter for any coherent `noise` crate generator
pub struct CoherentNoise<N> {
    inner: N,
}

impl<N: NoiseFn<f64, 2>> CoherentNoise<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

impl<N: NoiseFn<f64, 2>> NoiseSource for CoherentNoise<N> {
    fn sample(&mut self, x: f64, y: f64) -> f64 {
        self.inner.get([x, y]).clamp(-1.0, 1.0)
    }
}

/// Uniform random values that ignore the sample position
pub struct WhiteNoise {
    rng: Pcg64Mcg,
}

impl WhiteNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for WhiteNoise {
    fn sample(&mut self, _x: f64, _y: f64) -> f64 {
        self.rng.random_range(-1.0..=1.0)
    }
}

/// Which noise algorithm backs noisy terrain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoiseKind {
    /// Gradient noise (smooth rolling bumps)
    #[default]
    Perlin,
    /// Simplex noise (fewer directional artifacts)
    Simplex,
    /// Uncorrelated per-cell values
    White,
}

impl NoiseKind {
    /// Build a source of this kind seeded with `seed`
    pub fn source(self, seed: u64) -> Box<dyn NoiseSource> {
        match self {
            NoiseKind::Perlin => Box::new(CoherentNoise::new(Perlin::new(fold_seed(seed)))),
            NoiseKind::Simplex => Box::new(CoherentNoise::new(Simplex::new(fold_seed(seed)))),
            NoiseKind::White => Box::new(WhiteNoise::new(seed)),
        }
    }

    /// Parse a kind name (`perlin`, `simplex`, `white`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "perlin" => Some(NoiseKind::Perlin),
            "simplex" => Some(NoiseKind::Simplex),
            "white" | "uniform" => Some(NoiseKind::White),
            _ => None,
        }
    }
}

/// Seed for a child noise source
///
/// An explicit seed is used as-is and leaves `rng` untouched; otherwise one
/// value is drawn from `rng`.
pub fn child_seed<R: Rng + ?Sized>(seed: Option<u64>, rng: &mut R) -> u64 {
    match seed {
        Some(seed) => seed,
        None => rng.random(),
    }
}

// `noise` generators take 32-bit seeds
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
