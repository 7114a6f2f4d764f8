//! Blend pass: smooth the padding windows between neighbouring patches

use std::f64::consts::PI;

use crate::field::HeightField;

use super::layout::PatchLayout;

/// Smoothness at or above this switches from the cosine to the logistic kernel
const LOGISTIC_THRESHOLD: f64 = 0.5;

/// How a window cell finds the heights it blends between
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundarySampling {
    /// Reflect the cell across the boundary and blend with the reflection.
    ///
    /// Leaves a seam where the reflection lands in an unrendered padding
    /// cell.
    Mirror,
    /// Interpolate between the last interior cell below the window and the
    /// first interior cell above it.
    #[default]
    Neighbor,
}

impl BoundarySampling {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mirror" => Some(Self::Mirror),
            "neighbor" | "neighbour" => Some(Self::Neighbor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Axis {
    /// Cells along this axis
    fn len(self, field: &HeightField) -> usize {
        match self {
            Axis::X => field.rows(),
            Axis::Y => field.cols(),
        }
    }

    /// Cells across this axis
    fn span(self, field: &HeightField) -> usize {
        match self {
            Axis::X => field.cols(),
            Axis::Y => field.rows(),
        }
    }

    #[inline]
    fn cell(self, pos: usize, other: usize) -> (usize, usize) {
        match self {
            Axis::X => (pos, other),
            Axis::Y => (other, pos),
        }
    }
}

/// Blend every internal patch boundary of `heights`
///
/// Boundaries along x are blended first, then boundaries along y on the
/// result. Each window spans `padding` cells on either side of the boundary.
/// A layout with zero padding leaves the field untouched. `smoothness` is
/// clamped to `[0, 1]`, so the logistic steepness never exceeds 5.
pub fn blend_boundaries(
    heights: &mut HeightField,
    layout: &PatchLayout,
    smoothness: f64,
    sampling: BoundarySampling,
) {
    let smoothness = if smoothness.is_finite() {
        smoothness.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (pad_x, pad_y) = layout.padding();

    if pad_x > 0 {
        let boundaries: Vec<usize> = layout.boundaries_x().collect();
        match sampling {
            BoundarySampling::Mirror => {
                // Reflections read the unblended field on this axis
                let source = heights.clone();
                for &b in &boundaries {
                    blend_mirror(&source, heights, Axis::X, b, pad_x, smoothness);
                }
            }
            BoundarySampling::Neighbor => {
                for &b in &boundaries {
                    blend_neighbor(heights, Axis::X, b, pad_x, smoothness);
                }
            }
        }
    }

    if pad_y > 0 {
        let boundaries: Vec<usize> = layout.boundaries_y().collect();
        for &b in &boundaries {
            match sampling {
                BoundarySampling::Mirror => {
                    blend_mirror_in_place(heights, Axis::Y, b, pad_y, smoothness)
                }
                BoundarySampling::Neighbor => {
                    blend_neighbor(heights, Axis::Y, b, pad_y, smoothness)
                }
            }
        }
    }
}

/// Weight of the far side for a window cell under mirror sampling
fn mirror_weight(pos: usize, boundary: usize, pad: usize, smoothness: f64) -> f64 {
    if smoothness < LOGISTIC_THRESHOLD {
        let dist = pos.abs_diff(boundary) as f64 / pad as f64;
        0.5 * (1.0 - (dist * PI).cos())
    } else {
        // Window start may lie before the domain; position is measured from it
        let rel = (pos + pad - boundary) as f64 / (2 * pad) as f64;
        logistic(rel, 5.0 * smoothness)
    }
}

#[inline]
fn logistic(t: f64, scale: f64) -> f64 {
    1.0 / (1.0 + (-scale * (2.0 * t - 1.0)).exp())
}

/// Kernel reaching exactly 0 at `t = 0` and 1 at `t = 1`
fn neighbor_weight(t: f64, smoothness: f64) -> f64 {
    if smoothness < LOGISTIC_THRESHOLD {
        0.5 * (1.0 - (t * PI).cos())
    } else {
        let scale = 5.0 * smoothness;
        let lo = logistic(0.0, scale);
        let hi = logistic(1.0, scale);
        (logistic(t, scale) - lo) / (hi - lo)
    }
}

#[inline]
fn mirror_index(pos: usize, boundary: usize, len: usize) -> usize {
    let reflected = (2 * boundary) as isize - pos as isize;
    if pos < boundary {
        (reflected as usize).min(len - 1)
    } else {
        reflected.max(0) as usize
    }
}

fn window(boundary: usize, pad: usize, len: usize) -> std::ops::Range<usize> {
    boundary.saturating_sub(pad)..(boundary + pad).min(len)
}

fn blend_mirror(
    source: &HeightField,
    target: &mut HeightField,
    axis: Axis,
    boundary: usize,
    pad: usize,
    smoothness: f64,
) {
    let len = axis.len(source);
    for pos in window(boundary, pad, len) {
        let w = mirror_weight(pos, boundary, pad, smoothness);
        let mirror = mirror_index(pos, boundary, len);
        for other in 0..axis.span(source) {
            let (i, j) = axis.cell(pos, other);
            let (mi, mj) = axis.cell(mirror, other);
            let value = source.get(i, j) * (1.0 - w) + source.get(mi, mj) * w;
            target.set(i, j, value);
        }
    }
}

fn blend_mirror_in_place(
    heights: &mut HeightField,
    axis: Axis,
    boundary: usize,
    pad: usize,
    smoothness: f64,
) {
    let len = axis.len(heights);
    for pos in window(boundary, pad, len) {
        let w = mirror_weight(pos, boundary, pad, smoothness);
        let mirror = mirror_index(pos, boundary, len);
        for other in 0..axis.span(heights) {
            let (i, j) = axis.cell(pos, other);
            let (mi, mj) = axis.cell(mirror, other);
            let value = heights.get(i, j) * (1.0 - w) + heights.get(mi, mj) * w;
            heights.set(i, j, value);
        }
    }
}

fn blend_neighbor(
    heights: &mut HeightField,
    axis: Axis,
    boundary: usize,
    pad: usize,
    smoothness: f64,
) {
    let len = axis.len(heights);
    let lower = boundary.saturating_sub(pad + 1);
    let upper = (boundary + pad).min(len - 1);
    let steps = (2 * pad + 1) as f64;

    for other in 0..axis.span(heights) {
        let (li, lj) = axis.cell(lower, other);
        let (ui, uj) = axis.cell(upper, other);
        let from = heights.get(li, lj);
        let to = heights.get(ui, uj);

        for pos in window(boundary, pad, len) {
            let t = (pos + pad + 1 - boundary) as f64 / steps;
            let w = neighbor_weight(t, smoothness);
            let (i, j) = axis.cell(pos, other);
            heights.set(i, j, from * (1.0 - w) + to * w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Resolution;
    use crate::noise::NoiseKind;
    use crate::patches::assign::{AssignedPatch, PatchKind};
    use crate::patches::render::render_patches;

    fn terraced(
        x: usize,
        y: usize,
        counts: (usize, usize),
        ratio: f64,
    ) -> (HeightField, PatchLayout) {
        let layout = PatchLayout::new(Resolution::new(x, y).unwrap(), counts, ratio).unwrap();
        let patches: Vec<AssignedPatch> = (0..layout.patch_count())
            .map(|k| AssignedPatch::new(PatchKind::Flat, k as f64 * 0.3))
            .collect();
        (render_patches(&layout, &patches, NoiseKind::Perlin), layout)
    }

    fn largest_step(values: &[f64]) -> f64 {
        values
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_neighbor_blend_closes_seams_along_x() {
        for smoothness in [0.3, 0.8] {
            let (mut heights, layout) = terraced(30, 6, (3, 1), 0.3);
            blend_boundaries(&mut heights, &layout, smoothness, BoundarySampling::Neighbor);

            for j in 0..6 {
                let column: Vec<f64> = (0..30).map(|i| heights.get(i, j)).collect();
                assert!(column.windows(2).all(|w| w[1] >= w[0] - 1e-12));
                assert!(largest_step(&column) < 0.3);
                assert_eq!(column[0], 0.0);
                assert!((column[29] - 0.6).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_neighbor_blend_closes_seams_along_y() {
        let (mut heights, layout) = terraced(6, 30, (1, 3), 0.3);
        blend_boundaries(&mut heights, &layout, 0.3, BoundarySampling::Neighbor);

        for i in 0..6 {
            let row = heights.row(i);
            assert!(row.windows(2).all(|w| w[1] >= w[0] - 1e-12));
            assert!(largest_step(row) < 0.3);
        }
    }

    #[test]
    fn test_neighbor_blend_fills_crossing_gaps() {
        for smoothness in [0.3, 0.8] {
            let (mut heights, layout) = terraced(30, 30, (3, 3), 0.3);
            blend_boundaries(&mut heights, &layout, smoothness, BoundarySampling::Neighbor);

            // Bases run 0.0..=2.4, so only the first patch's interior stays at 0
            for i in 0..30 {
                for j in 0..30 {
                    let h = heights.get(i, j);
                    if i < 7 && j < 7 {
                        assert_eq!(h, 0.0);
                    } else {
                        assert!(h > 0.0, "cell ({i}, {j}) left unfilled");
                    }
                }
            }

            for k in 0..30 {
                let row = heights.row(k);
                let column: Vec<f64> = (0..30).map(|i| heights.get(i, k)).collect();
                assert!(row.windows(2).all(|w| w[1] >= w[0] - 1e-12));
                assert!(column.windows(2).all(|w| w[1] >= w[0] - 1e-12));
                assert!(largest_step(row) < 0.3);
                assert!(largest_step(&column) < 0.9);
            }
        }
    }

    #[test]
    fn test_smoothness_above_one_is_clamped() {
        let (base, layout) = terraced(30, 6, (3, 1), 0.3);
        let mut steep = base.clone();
        let mut capped = base;
        blend_boundaries(&mut steep, &layout, 4.0, BoundarySampling::Neighbor);
        blend_boundaries(&mut capped, &layout, 1.0, BoundarySampling::Neighbor);
        assert_eq!(steep, capped);
    }

    #[test]
    fn test_neighbor_blend_leaves_interiors_alone() {
        let (mut heights, layout) = terraced(30, 6, (3, 1), 0.3);
        let before = heights.clone();
        blend_boundaries(&mut heights, &layout, 0.6, BoundarySampling::Neighbor);

        for i in (0..7).chain(13..17).chain(23..30) {
            assert_eq!(heights.row(i), before.row(i));
        }
    }

    #[test]
    fn test_mirror_blend_matches_reflection() {
        let (mut heights, layout) = terraced(30, 6, (3, 1), 0.3);
        blend_boundaries(&mut heights, &layout, 0.3, BoundarySampling::Mirror);

        // Far edge of the window takes the reflected interior cell
        assert!((heights.get(7, 0) - 0.3).abs() < 1e-12);
        assert!((heights.get(17, 2) - 0.6).abs() < 1e-12);
        // Boundary cell keeps its own (unrendered) height
        assert_eq!(heights.get(10, 0), 0.0);
        assert_eq!(heights.get(20, 0), 0.0);
    }

    #[test]
    fn test_zero_padding_is_a_no_op() {
        for sampling in [BoundarySampling::Mirror, BoundarySampling::Neighbor] {
            let (mut heights, layout) = terraced(30, 30, (3, 3), 0.0);
            let before = heights.clone();
            blend_boundaries(&mut heights, &layout, 0.5, sampling);
            assert_eq!(heights, before);
        }
    }

    #[test]
    fn test_kernels_are_bounded() {
        for smoothness in [0.0, 0.49, 0.5, 1.0] {
            assert!(neighbor_weight(0.0, smoothness).abs() < 1e-12);
            assert!((neighbor_weight(1.0, smoothness) - 1.0).abs() < 1e-12);
            for k in 0..=10 {
                let t = k as f64 / 10.0;
                let w = neighbor_weight(t, smoothness);
                assert!((-1e-12..=1.0 + 1e-12).contains(&w));
            }
        }
    }

    #[test]
    fn test_sampling_from_name() {
        assert_eq!(BoundarySampling::from_name("Mirror"), Some(BoundarySampling::Mirror));
        assert_eq!(BoundarySampling::from_name("neighbour"), Some(BoundarySampling::Neighbor));
        assert_eq!(BoundarySampling::from_name("smear"), None);
    }
}
