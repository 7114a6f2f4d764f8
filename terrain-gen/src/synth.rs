//! Height-field primitives: flat, stairs, ramp, noise, and sectioned terrain
//!
//! Every generator builds a fresh [`HeightField`] of exactly the requested
//! resolution. Stochastic generators draw from a caller-supplied generator
//! instead of any shared state.

use rand::Rng;

use crate::field::{Bound, HeightField, Resolution, Terrain};
use crate::noise::{NoiseKind, NoiseSource, child_seed};
use crate::recipe::{Orientation, Section, SlopeType, TerrainRecipe};

/// Constant height everywhere
pub fn flat(resolution: Resolution, base_height: f64) -> HeightField {
    HeightField::filled(resolution, base_height)
}

/// Stairs with `steps` plateaus climbing along `orientation`
///
/// The plateau of row `i` is `floor(i / Rx * steps)`, capped at the last
/// step, so step edges follow relative index rather than physical distance.
/// Stairs cannot climb diagonally; a diagonal orientation climbs along x.
pub fn stairs(
    resolution: Resolution,
    step_height: f64,
    steps: u32,
    orientation: Orientation,
) -> HeightField {
    if steps == 0 {
        tracing::warn!("Stairs with zero steps, producing flat ground");
        return HeightField::zeros(resolution);
    }
    let along_y = match orientation {
        Orientation::Y => true,
        Orientation::X => false,
        Orientation::Diagonal => {
            tracing::warn!("Stairs cannot climb diagonally, falling back to x");
            false
        }
    };

    HeightField::from_fn(resolution, |i, j| {
        let step = if along_y {
            step_index(j, resolution.y(), steps)
        } else {
            step_index(i, resolution.x(), steps)
        };
        step as f64 * step_height
    })
}

#[inline]
fn step_index(index: usize, cells: usize, steps: u32) -> u32 {
    let rel = index as f64 / cells as f64;
    ((rel * steps as f64) as u32).min(steps - 1)
}

/// Ramp rising from 0 to `height` along `orientation`
pub fn ramp(
    resolution: Resolution,
    height: f64,
    orientation: Orientation,
    slope_type: SlopeType,
) -> HeightField {
    let span_x = resolution.x().saturating_sub(1).max(1) as f64;
    let span_y = resolution.y().saturating_sub(1).max(1) as f64;

    HeightField::from_fn(resolution, |i, j| {
        let x_rel = i as f64 / span_x;
        let y_rel = j as f64 / span_y;
        let progress = match orientation {
            Orientation::X => x_rel,
            Orientation::Y => y_rel,
            Orientation::Diagonal => (x_rel + y_rel) / 2.0,
        };
        slope_type.apply(progress, height)
    })
}

/// Noisy ground: `base_height + sample * amplitude`
///
/// Cell `(i, j)` samples the source at `(i/Rx, j/Ry) * scale * 10`. With an
/// explicit `seed` the noise is reproducible and `rng` is left untouched;
/// without one a fresh seed is drawn from `rng`.
pub fn noise<R: Rng + ?Sized>(
    resolution: Resolution,
    base_height: f64,
    amplitude: f64,
    scale: f64,
    seed: Option<u64>,
    kind: NoiseKind,
    rng: &mut R,
) -> HeightField {
    let mut source = kind.source(child_seed(seed, rng));
    let frequency = scale * 10.0;
    let (rx, ry) = (resolution.x() as f64, resolution.y() as f64);

    sample_noise(resolution, base_height, amplitude, source.as_mut(), |i, j| {
        [i as f64 / rx * frequency, j as f64 / ry * frequency]
    })
}

/// Fill a field from `source` sampled at `coords(i, j)`
pub(crate) fn sample_noise(
    resolution: Resolution,
    base_height: f64,
    amplitude: f64,
    source: &mut dyn NoiseSource,
    coords: impl Fn(usize, usize) -> [f64; 2],
) -> HeightField {
    HeightField::from_fn(resolution, |i, j| {
        let [x, y] = coords(i, j);
        base_height + source.sample(x, y) * amplitude
    })
}

impl TerrainRecipe {
    /// Render this recipe on its own grid
    ///
    /// Random directions are resolved once for the whole grid.
    pub fn render<R: Rng + ?Sized>(
        &self,
        resolution: Resolution,
        noise_kind: NoiseKind,
        rng: &mut R,
    ) -> HeightField {
        match *self {
            TerrainRecipe::Flat { base_height } => flat(resolution, base_height),
            TerrainRecipe::Stairs {
                step_height,
                steps,
                direction,
            } => stairs(resolution, step_height, steps, direction.resolve_stairs(rng)),
            TerrainRecipe::Ramp {
                height,
                direction,
                slope_type,
            } => ramp(resolution, height, direction.resolve_ramp(rng), slope_type),
            TerrainRecipe::Noise {
                base_height,
                amplitude,
                scale,
                seed,
            } => noise(
                resolution,
                base_height,
                amplitude,
                scale,
                seed,
                noise_kind,
                rng,
            ),
        }
    }
}

/// Terrain stitched from sections laid over fractions of the domain
///
/// Each section is rendered at its own sub-resolution, in its own relative
/// coordinates, and written over the cells it covers. Later sections win
/// where sections overlap; cells no section covers stay at 0.
pub fn combined<R: Rng + ?Sized>(
    resolution: Resolution,
    bound: Bound,
    sections: &[Section],
    noise_kind: NoiseKind,
    rng: &mut R,
) -> Terrain {
    let mut heights = HeightField::zeros(resolution);

    for (index, section) in sections.iter().enumerate() {
        let Some((start_i, start_j, sub)) = section.placement(resolution) else {
            tracing::debug!(
                "Skipping empty {} section #{}",
                section.recipe.kind().name(),
                index
            );
            continue;
        };
        let block = section.recipe.render(sub, noise_kind, rng);
        heights.blit(start_i, start_j, &block);
    }

    Terrain::new(heights, bound)
}
