//! Partition of a grid into equal patches with padding

use std::ops::Range;

use crate::error::{Result, TerrainError};
use crate::field::Resolution;

/// How a grid is split into `nx * ny` patches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchLayout {
    resolution: Resolution,
    counts: (usize, usize),
    patch_resolution: (usize, usize),
    padding: (usize, usize),
}

impl PatchLayout {
    /// Padding ratios above this are clamped
    pub const MAX_PADDING_RATIO: f64 = 0.4;

    /// Split `resolution` into `counts` patches
    ///
    /// Each patch spans `R / n` cells (integer division); cells left over at
    /// the far edge belong to the last patch. Padding is
    /// `floor(patch_cells * padding_ratio)` with the ratio clamped to
    /// `[0, 0.4]`.
    pub fn new(resolution: Resolution, counts: (usize, usize), padding_ratio: f64) -> Result<Self> {
        let (nx, ny) = counts;
        if nx == 0 || ny == 0 || resolution.x() < nx || resolution.y() < ny {
            return Err(TerrainError::InvalidPatchGrid {
                resolution_x: resolution.x(),
                resolution_y: resolution.y(),
                patches_x: nx,
                patches_y: ny,
            });
        }

        let ratio = if padding_ratio.is_nan() {
            0.0
        } else {
            padding_ratio.clamp(0.0, Self::MAX_PADDING_RATIO)
        };
        let patch_resolution = (resolution.x() / nx, resolution.y() / ny);
        let padding = (
            (patch_resolution.0 as f64 * ratio) as usize,
            (patch_resolution.1 as f64 * ratio) as usize,
        );

        Ok(Self {
            resolution,
            counts,
            patch_resolution,
            padding,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of patches along x and y
    pub fn counts(&self) -> (usize, usize) {
        self.counts
    }

    /// Cells spanned by one patch along x and y
    pub fn patch_resolution(&self) -> (usize, usize) {
        self.patch_resolution
    }

    /// Padding cells on each inner side of a patch along x and y
    pub fn padding(&self) -> (usize, usize) {
        self.padding
    }

    pub fn patch_count(&self) -> usize {
        self.counts.0 * self.counts.1
    }

    /// Row-major slot of patch `(i, j)`
    #[inline]
    pub fn slot(&self, i: usize, j: usize) -> usize {
        i * self.counts.1 + j
    }

    /// Cell ranges patch `(i, j)` renders into
    ///
    /// Inner sides give up `padding` cells to the blend window; sides on the
    /// domain edge reach the edge. Ranges are never empty.
    pub fn interior(&self, i: usize, j: usize) -> (Range<usize>, Range<usize>) {
        (
            interior_axis(
                i,
                self.counts.0,
                self.patch_resolution.0,
                self.padding.0,
                self.resolution.x(),
            ),
            interior_axis(
                j,
                self.counts.1,
                self.patch_resolution.1,
                self.padding.1,
                self.resolution.y(),
            ),
        )
    }

    /// Resolution of the interior of patch `(i, j)`
    pub fn interior_resolution(&self, i: usize, j: usize) -> Resolution {
        let (xs, ys) = self.interior(i, j);
        Resolution::at_least_one(xs.len(), ys.len())
    }

    /// Cell indices where patches meet along x
    pub fn boundaries_x(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.counts.0).map(move |k| k * self.patch_resolution.0)
    }

    /// Cell indices where patches meet along y
    pub fn boundaries_y(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.counts.1).map(move |k| k * self.patch_resolution.1)
    }
}

fn interior_axis(
    index: usize,
    count: usize,
    patch_cells: usize,
    padding: usize,
    cells: usize,
) -> Range<usize> {
    let start = if index == 0 {
        0
    } else {
        index * patch_cells + padding
    };
    let mut end = if index + 1 == count {
        cells
    } else {
        ((index + 1) * patch_cells).saturating_sub(padding)
    };
    if end <= start {
        end = start + 1;
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(x: usize, y: usize, counts: (usize, usize), ratio: f64) -> PatchLayout {
        PatchLayout::new(Resolution::new(x, y).unwrap(), counts, ratio).unwrap()
    }

    #[test]
    fn test_layout_dimensions() {
        let l = layout(100, 90, (3, 3), 0.15);
        assert_eq!(l.patch_resolution(), (33, 30));
        assert_eq!(l.padding(), (4, 4));
        assert_eq!(l.patch_count(), 9);
        assert_eq!(l.boundaries_x().collect::<Vec<_>>(), vec![33, 66]);
        assert_eq!(l.boundaries_y().collect::<Vec<_>>(), vec![30, 60]);
    }

    #[test]
    fn test_interior_ranges_respect_padding_and_edges() {
        let l = layout(100, 90, (3, 3), 0.15);
        assert_eq!(l.interior(0, 0), (0..29, 0..26));
        assert_eq!(l.interior(1, 1), (37..62, 34..56));
        assert_eq!(l.interior(2, 2), (70..100, 64..90));
    }

    #[test]
    fn test_padding_ratio_is_clamped() {
        let l = layout(40, 40, (2, 2), 0.9);
        assert_eq!(l.padding(), (8, 8));
        let none = layout(40, 40, (2, 2), -1.0);
        assert_eq!(none.padding(), (0, 0));
    }

    #[test]
    fn test_single_patch_covers_everything() {
        let l = layout(7, 5, (1, 1), 0.3);
        assert_eq!(l.interior(0, 0), (0..7, 0..5));
        assert_eq!(l.boundaries_x().count(), 0);
    }

    #[test]
    fn test_rejects_more_patches_than_cells() {
        let res = Resolution::new(4, 4).unwrap();
        assert!(matches!(
            PatchLayout::new(res, (5, 1), 0.1),
            Err(TerrainError::InvalidPatchGrid { patches_x: 5, .. })
        ));
        assert!(PatchLayout::new(res, (0, 1), 0.1).is_err());
    }

    #[test]
    fn test_interior_never_empty() {
        let l = layout(3, 3, (3, 3), 0.4);
        for i in 0..3 {
            for j in 0..3 {
                let (xs, ys) = l.interior(i, j);
                assert!(!xs.is_empty() && !ys.is_empty());
            }
        }
    }
}
