//! Rendering pass: draw each assigned patch into its interior

use crate::field::{HeightField, Resolution};
use crate::noise::NoiseKind;
use crate::synth::{flat, ramp, sample_noise, stairs};

use super::assign::{AssignedPatch, PatchKind};
use super::layout::PatchLayout;

/// Draw every patch into a fresh field
///
/// Patch `(i, j)` lives at slot `i * ny + j` of `patches`. Cells in the
/// padding gaps between interiors are left at 0 for the blend pass.
pub fn render_patches(
    layout: &PatchLayout,
    patches: &[AssignedPatch],
    noise_kind: NoiseKind,
) -> HeightField {
    let mut heights = HeightField::zeros(layout.resolution());
    let (nx, ny) = layout.counts();

    for i in 0..nx {
        for j in 0..ny {
            let Some(patch) = patches.get(layout.slot(i, j)) else {
                tracing::warn!("No assignment for patch ({}, {}), leaving it flat", i, j);
                continue;
            };
            let (xs, ys) = layout.interior(i, j);
            let local = layout.interior_resolution(i, j);
            let origin = (xs.start, ys.start);
            let block = render_patch(patch, local, (i, j), origin, layout, noise_kind);
            heights.blit(xs.start, ys.start, &block);
        }
    }

    heights
}

fn render_patch(
    patch: &AssignedPatch,
    local: Resolution,
    index: (usize, usize),
    origin: (usize, usize),
    layout: &PatchLayout,
    noise_kind: NoiseKind,
) -> HeightField {
    let base = patch.base_height;
    match patch.kind {
        PatchKind::Flat => flat(local, base),
        PatchKind::Stairs {
            step_height,
            steps,
            orientation,
        } => {
            let mut field = stairs(local, step_height, steps, orientation);
            field.offset(base);
            field
        }
        PatchKind::Ramp {
            height,
            orientation,
            slope_type,
        } => {
            let mut field = ramp(local, height, orientation, slope_type);
            field.offset(base);
            field
        }
        PatchKind::Noise {
            amplitude,
            scale,
            seed,
        } => {
            // The patch index offsets each patch's sample origin
            let mut source = noise_kind.source(seed);
            let frequency = scale * 10.0;
            let rx = layout.resolution().x() as f64;
            let ry = layout.resolution().y() as f64;
            sample_noise(local, base, amplitude, source.as_mut(), |x, y| {
                [
                    (index.0 as f64 + (origin.0 + x) as f64 / rx) * frequency,
                    (index.1 as f64 + (origin.1 + y) as f64 / ry) * frequency,
                ]
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{Orientation, SlopeType};

    fn layout() -> PatchLayout {
        PatchLayout::new(Resolution::new(30, 6).unwrap(), (3, 1), 0.3).unwrap()
    }

    #[test]
    fn test_interiors_filled_and_gaps_left_zero() {
        let patches = vec![
            AssignedPatch::new(PatchKind::Flat, 1.0),
            AssignedPatch::new(PatchKind::Flat, 2.0),
            AssignedPatch::new(PatchKind::Flat, 3.0),
        ];
        let heights = render_patches(&layout(), &patches, NoiseKind::Perlin);

        assert_eq!(heights.shape(), (30, 6));
        assert_eq!(heights.get(0, 0), 1.0);
        assert_eq!(heights.get(6, 5), 1.0);
        assert_eq!(heights.get(7, 0), 0.0);
        assert_eq!(heights.get(12, 0), 0.0);
        assert_eq!(heights.get(13, 0), 2.0);
        assert_eq!(heights.get(16, 3), 2.0);
        assert_eq!(heights.get(20, 3), 0.0);
        assert_eq!(heights.get(23, 3), 3.0);
        assert_eq!(heights.get(29, 5), 3.0);
    }

    #[test]
    fn test_base_height_is_added_to_recipe() {
        let patches = vec![
            AssignedPatch::new(
                PatchKind::Ramp {
                    height: 0.3,
                    orientation: Orientation::X,
                    slope_type: SlopeType::Linear,
                },
                0.5,
            ),
            AssignedPatch::new(
                PatchKind::Stairs {
                    step_height: 0.1,
                    steps: 2,
                    orientation: Orientation::X,
                },
                -0.5,
            ),
            AssignedPatch::new(
                PatchKind::Noise {
                    amplitude: 0.1,
                    scale: 0.2,
                    seed: 4,
                },
                1.0,
            ),
        ];
        let heights = render_patches(&layout(), &patches, NoiseKind::Perlin);

        // Ramp interior is rows 0..7
        assert!((heights.get(0, 2) - 0.5).abs() < 1e-12);
        assert!((heights.get(6, 2) - 0.8).abs() < 1e-12);
        // Stairs interior is rows 13..17 with two steps
        assert!((heights.get(13, 0) + 0.5).abs() < 1e-12);
        assert!((heights.get(16, 0) + 0.4).abs() < 1e-12);
        // Noise interior is rows 23..30
        for i in 23..30 {
            for j in 0..6 {
                let h = heights.get(i, j);
                assert!((0.9 - 1e-12..=1.1 + 1e-12).contains(&h));
            }
        }
    }

    #[test]
    fn test_noise_patches_are_offset_by_index() {
        let noise = || {
            AssignedPatch::new(
                PatchKind::Noise {
                    amplitude: 1.0,
                    scale: 0.2,
                    seed: 9,
                },
                0.0,
            )
        };
        let heights = render_patches(&layout(), &[noise(), noise(), noise()], NoiseKind::Perlin);

        // Same seed in every patch, yet the interiors differ
        let first: Vec<f64> = (0..7).map(|i| heights.get(i, 3)).collect();
        let last: Vec<f64> = (23..30).map(|i| heights.get(i, 3)).collect();
        assert_ne!(first, last);
    }

    #[test]
    fn test_missing_assignments_stay_flat() {
        let patches = vec![AssignedPatch::new(PatchKind::Flat, 1.0)];
        let heights = render_patches(&layout(), &patches, NoiseKind::Perlin);
        assert_eq!(heights.get(0, 0), 1.0);
        assert_eq!(heights.get(15, 0), 0.0);
    }
}
