//! Assignment pass: choose a recipe and base height for every patch

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::{Result, TerrainError};
use crate::noise::child_seed;
use crate::recipe::{Orientation, SlopeType, TerrainRecipe};

/// Range of the first patch's random base height
const FIRST_BASE_JITTER: f64 = 0.1;

/// A recipe with every random choice already made
#[derive(Debug, Clone, PartialEq)]
pub enum PatchKind {
    Flat,
    Stairs {
        step_height: f64,
        steps: u32,
        orientation: Orientation,
    },
    Ramp {
        height: f64,
        orientation: Orientation,
        slope_type: SlopeType,
    },
    Noise {
        amplitude: f64,
        scale: f64,
        seed: u64,
    },
}

impl PatchKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatchKind::Flat => "flat",
            PatchKind::Stairs { .. } => "stairs",
            PatchKind::Ramp { .. } => "ramp",
            PatchKind::Noise { .. } => "noise",
        }
    }
}

/// One patch after the assignment pass
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedPatch {
    pub kind: PatchKind,
    pub base_height: f64,
}

impl AssignedPatch {
    pub fn new(kind: PatchKind, base_height: f64) -> Self {
        Self { kind, base_height }
    }

    /// Base height plus the full rise of the recipe
    pub fn max_height(&self) -> f64 {
        let rise = match self.kind {
            PatchKind::Flat => 0.0,
            PatchKind::Stairs {
                step_height, steps, ..
            } => steps.saturating_sub(1) as f64 * step_height,
            PatchKind::Ramp { height, .. } => height,
            PatchKind::Noise { amplitude, .. } => amplitude,
        };
        self.base_height + rise
    }
}

/// Assign a recipe and base height to each of `counts` patches
///
/// Patches are visited row-major (`i` outer). A patch's base height follows
/// the patches already placed to its left and above so adjacent bases never
/// differ by more than `max_height_diff`. Ramp heights are capped at
/// `max_height_diff` and noise amplitudes at half of it.
pub fn assign_patches<R: Rng + ?Sized>(
    counts: (usize, usize),
    catalog: &[TerrainRecipe],
    max_height_diff: f64,
    rng: &mut R,
) -> Result<Vec<AssignedPatch>> {
    if !max_height_diff.is_finite() || max_height_diff < 0.0 {
        return Err(TerrainError::InvalidHeightDiff(max_height_diff));
    }
    if catalog.is_empty() {
        return Err(TerrainError::EmptyCatalog);
    }
    let (nx, ny) = counts;
    let mut patches: Vec<AssignedPatch> = Vec::with_capacity(nx * ny);

    for i in 0..nx {
        for j in 0..ny {
            let recipe = catalog.choose(rng).ok_or(TerrainError::EmptyCatalog)?;

            let left = (i > 0).then(|| patches[(i - 1) * ny + j].base_height);
            let above = (j > 0).then(|| patches[i * ny + j - 1].base_height);
            let neighbours: Vec<f64> = [left, above].into_iter().flatten().collect();
            let base_height = propagate_base(&neighbours, max_height_diff, rng);

            let kind = resolve_kind(recipe, max_height_diff, rng);
            tracing::debug!(
                "Patch ({}, {}): {} at base {:.3}",
                i,
                j,
                kind.name(),
                base_height
            );
            patches.push(AssignedPatch::new(kind, base_height));
        }
    }

    Ok(patches)
}

/// Base height for a patch given its already-placed neighbours
///
/// The mean of the neighbours is jittered by up to half of
/// `max_height_diff`, then clamped so it stays within `max_height_diff` of
/// every neighbour.
pub(crate) fn propagate_base<R: Rng + ?Sized>(
    neighbours: &[f64],
    max_height_diff: f64,
    rng: &mut R,
) -> f64 {
    if neighbours.is_empty() {
        return rng.random_range(-FIRST_BASE_JITTER..=FIRST_BASE_JITTER);
    }

    let mean = neighbours.iter().sum::<f64>() / neighbours.len() as f64;
    let half = max_height_diff / 2.0;
    let jittered = mean + rng.random_range(-half..=half);

    let highest = neighbours.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = neighbours.iter().copied().fold(f64::INFINITY, f64::min);
    jittered
        .max(highest - max_height_diff)
        .min(lowest + max_height_diff)
}

fn resolve_kind<R: Rng + ?Sized>(
    recipe: &TerrainRecipe,
    max_height_diff: f64,
    rng: &mut R,
) -> PatchKind {
    match *recipe {
        TerrainRecipe::Flat { .. } => PatchKind::Flat,
        TerrainRecipe::Stairs {
            step_height,
            steps,
            direction,
        } => PatchKind::Stairs {
            step_height,
            steps,
            orientation: direction.resolve_stairs(rng),
        },
        TerrainRecipe::Ramp {
            height,
            direction,
            slope_type,
        } => PatchKind::Ramp {
            height: height.min(max_height_diff),
            orientation: direction.resolve_ramp(rng),
            slope_type,
        },
        TerrainRecipe::Noise {
            amplitude,
            scale,
            seed,
            ..
        } => PatchKind::Noise {
            amplitude: amplitude.min(max_height_diff / 2.0),
            scale,
            seed: child_seed(seed, rng),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{Direction, default_catalog};
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn assert_adjacent_within(patches: &[AssignedPatch], counts: (usize, usize), max_diff: f64) {
        let (nx, ny) = counts;
        let base = |i: usize, j: usize| patches[i * ny + j].base_height;
        for i in 0..nx {
            for j in 0..ny {
                if i + 1 < nx {
                    assert!((base(i, j) - base(i + 1, j)).abs() <= max_diff + 1e-12);
                }
                if j + 1 < ny {
                    assert!((base(i, j) - base(i, j + 1)).abs() <= max_diff + 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_adjacent_bases_stay_within_limit() {
        for seed in 0..200 {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let max_diff = 0.05 + (seed % 7) as f64 * 0.1;
            let patches = assign_patches((6, 5), &default_catalog(), max_diff, &mut rng).unwrap();
            assert_eq!(patches.len(), 30);
            assert_adjacent_within(&patches, (6, 5), max_diff);
        }
    }

    #[test]
    fn test_clamp_pulls_base_between_divergent_neighbours() {
        for seed in 0..50 {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let base = propagate_base(&[0.0, 0.6], 0.3, &mut rng);
            assert!((base - 0.3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_first_patch_base_is_small() {
        for seed in 0..50 {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let base = propagate_base(&[], 0.3, &mut rng);
            assert!((-0.1..=0.1).contains(&base));
        }
    }

    #[test]
    fn test_zero_height_diff_flattens_bases() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let patches = assign_patches((4, 4), &default_catalog(), 0.0, &mut rng).unwrap();
        let first = patches[0].base_height;
        assert!(patches.iter().all(|p| p.base_height == first));
    }

    #[test]
    fn test_recipe_amplitudes_are_capped() {
        let catalog = vec![
            TerrainRecipe::ramp(5.0, Direction::Random, SlopeType::Linear),
            TerrainRecipe::noise(0.0, 5.0, 0.1, None),
        ];
        let mut rng = Pcg64Mcg::seed_from_u64(11);
        let patches = assign_patches((5, 5), &catalog, 0.4, &mut rng).unwrap();
        for patch in &patches {
            match patch.kind {
                PatchKind::Ramp { height, .. } => assert_eq!(height, 0.4),
                PatchKind::Noise { amplitude, .. } => assert_eq!(amplitude, 0.2),
                ref other => panic!("unexpected kind {other:?}"),
            }
        }
    }

    #[test]
    fn test_random_directions_are_resolved() {
        let catalog = vec![TerrainRecipe::stairs(0.1, 3, Direction::Random)];
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        let patches = assign_patches((4, 4), &catalog, 0.3, &mut rng).unwrap();
        for patch in &patches {
            match patch.kind {
                PatchKind::Stairs { orientation, .. } => {
                    assert!(matches!(orientation, Orientation::X | Orientation::Y))
                }
                ref other => panic!("unexpected kind {other:?}"),
            }
        }
    }

    #[test]
    fn test_errors() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        assert!(matches!(
            assign_patches((2, 2), &[], 0.3, &mut rng),
            Err(TerrainError::EmptyCatalog)
        ));
        assert!(matches!(
            assign_patches((2, 2), &default_catalog(), -0.1, &mut rng),
            Err(TerrainError::InvalidHeightDiff(_))
        ));
    }

    #[test]
    fn test_max_height() {
        let stairs = AssignedPatch::new(
            PatchKind::Stairs {
                step_height: 0.15,
                steps: 3,
                orientation: Orientation::X,
            },
            0.1,
        );
        assert!((stairs.max_height() - 0.4).abs() < 1e-12);
        assert_eq!(AssignedPatch::new(PatchKind::Flat, -0.2).max_height(), -0.2);
    }
}
