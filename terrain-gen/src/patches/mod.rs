//! Patch-quilted terrain
//!
//! The domain is split into a grid of equal patches. Generation runs in three
//! passes:
//!
//! 1. [`assign_patches`] picks a recipe and base height for every patch,
//!    keeping neighbouring bases within a maximum height difference.
//! 2. [`render_patches`] draws each patch into its interior, leaving the
//!    padding between patches empty.
//! 3. [`blend_boundaries`] fills the padding windows so patches meet without
//!    seams.

mod assign;
mod blend;
mod layout;
mod render;

use std::ops::Range;

use rand::Rng;

pub use assign::{AssignedPatch, PatchKind, assign_patches};
pub use blend::{BoundarySampling, blend_boundaries};
pub use layout::PatchLayout;
pub use render::render_patches;

use crate::error::Result;
use crate::field::{Bound, HeightField, Resolution, Terrain};
use crate::noise::NoiseKind;
use crate::recipe::{TerrainRecipe, default_catalog};

/// Settings for [`generate_square_terrain_patches`]
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Patches along x and y
    pub num_patches: (usize, usize),
    /// Recipes to draw patches from
    pub catalog: Vec<TerrainRecipe>,
    /// Share of a patch given to each blend window, clamped to `[0, 0.4]`
    pub padding_ratio: f64,
    /// Below 0.5 blends use a cosine kernel, otherwise a logistic one with
    /// steepness `5 * smoothness`. Clamped to `[0, 1]`; non-finite values
    /// count as 0.
    pub transition_smoothness: f64,
    /// Largest allowed base height difference between adjacent patches
    pub max_height_diff: f64,
    pub sampling: BoundarySampling,
    pub noise: NoiseKind,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            num_patches: (3, 3),
            catalog: default_catalog(),
            padding_ratio: 0.15,
            transition_smoothness: 0.5,
            max_height_diff: 0.3,
            sampling: BoundarySampling::default(),
            noise: NoiseKind::default(),
        }
    }
}

impl PatchConfig {
    pub fn with_patches(mut self, nx: usize, ny: usize) -> Self {
        self.num_patches = (nx, ny);
        self
    }

    pub fn with_catalog(mut self, catalog: Vec<TerrainRecipe>) -> Self {
        self.catalog = catalog;
        self
    }
}

/// A layout together with the assignment of every patch
#[derive(Debug, Clone)]
pub struct PatchGrid {
    layout: PatchLayout,
    patches: Vec<AssignedPatch>,
}

impl PatchGrid {
    /// Run the assignment pass for `layout`
    pub fn assign<R: Rng + ?Sized>(
        layout: PatchLayout,
        catalog: &[TerrainRecipe],
        max_height_diff: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let patches = assign_patches(layout.counts(), catalog, max_height_diff, rng)?;
        Ok(Self { layout, patches })
    }

    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    pub fn patches(&self) -> &[AssignedPatch] {
        &self.patches
    }

    /// Assignment of patch `(i, j)`
    pub fn patch(&self, i: usize, j: usize) -> Option<&AssignedPatch> {
        let (nx, ny) = self.layout.counts();
        if i >= nx || j >= ny {
            return None;
        }
        self.patches.get(self.layout.slot(i, j))
    }

    /// Run the rendering and blend passes
    pub fn render(
        &self,
        smoothness: f64,
        sampling: BoundarySampling,
        noise_kind: NoiseKind,
    ) -> HeightField {
        let mut heights = render_patches(&self.layout, &self.patches, noise_kind);
        blend_boundaries(&mut heights, &self.layout, smoothness, sampling);
        heights
    }

    /// Per-patch report, row-major
    pub fn summaries(&self) -> Vec<PatchSummary> {
        let (nx, ny) = self.layout.counts();
        let mut out = Vec::with_capacity(self.patches.len());
        for i in 0..nx {
            for j in 0..ny {
                let Some(patch) = self.patch(i, j) else {
                    continue;
                };
                out.push(PatchSummary {
                    index: (i, j),
                    kind: patch.kind.clone(),
                    base_height: patch.base_height,
                    max_height: patch.max_height(),
                    interior: self.layout.interior(i, j),
                });
            }
        }
        out
    }
}

/// What the assignment pass decided for one patch
#[derive(Debug, Clone, PartialEq)]
pub struct PatchSummary {
    pub index: (usize, usize),
    pub kind: PatchKind,
    pub base_height: f64,
    pub max_height: f64,
    /// Cells the patch rendered into, before blending
    pub interior: (Range<usize>, Range<usize>),
}

/// Output of [`generate_square_terrain_patches`]
#[derive(Debug, Clone)]
pub struct PatchTerrain {
    pub terrain: Terrain,
    pub patches: Vec<PatchSummary>,
}

/// Generate a terrain quilted from randomly chosen patches
///
/// # Errors
///
/// Fails when the patch grid does not fit the resolution, the catalog is
/// empty, or `max_height_diff` is negative or not finite.
pub fn generate_square_terrain_patches<R: Rng + ?Sized>(
    resolution: Resolution,
    bound: Bound,
    config: &PatchConfig,
    rng: &mut R,
) -> Result<PatchTerrain> {
    let layout = PatchLayout::new(resolution, config.num_patches, config.padding_ratio)?;
    let grid = PatchGrid::assign(layout, &config.catalog, config.max_height_diff, rng)?;

    tracing::debug!(
        "Patch grid {}x{}: {:?} cells per patch, padding {:?}",
        layout.counts().0,
        layout.counts().1,
        layout.patch_resolution(),
        layout.padding()
    );

    let heights = grid.render(config.transition_smoothness, config.sampling, config.noise);
    Ok(PatchTerrain {
        terrain: Terrain::new(heights, bound),
        patches: grid.summaries(),
    })
}
