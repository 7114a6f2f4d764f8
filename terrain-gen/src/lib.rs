//! Procedural height-field terrain for locomotion scenes
//!
//! This library synthesizes rectangular height grids from simple recipes
//! (flat ground, stairs, ramps, noise), stitches them into sectioned or
//! patch-quilted terrains, and turns the result into quad meshes.
//!
//! All randomness comes from a generator the caller passes in, so a seeded
//! generator reproduces a terrain exactly.
//!
//! # Primitive Example
//! ```no_run
//! use terrain_gen::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand_pcg::Pcg64Mcg::seed_from_u64(42);
//! let res = Resolution::new(100, 100)?;
//!
//! let steps = stairs(res, 0.2, 5, Orientation::X);
//! let hills = noise(res, 0.0, 0.5, 0.1, Some(7), NoiseKind::Perlin, &mut rng);
//! # Ok::<(), TerrainError>(())
//! ```
//!
//! # Patch Example
//! ```no_run
//! use terrain_gen::*;
//! use terrain_gen::mesh::{MeshSink, ObjSink};
//! use rand::SeedableRng;
//!
//! let mut rng = rand_pcg::Pcg64Mcg::seed_from_u64(1);
//! let res = Resolution::new(100, 100)?;
//! let bound = Bound::centered([0.0, 0.0], [10.0, 10.0])?;
//!
//! let out = generate_square_terrain_patches(res, bound, &PatchConfig::default(), &mut rng)?;
//! ObjSink::new("out").accept_terrain("patches", &out.terrain)?;
//! # Ok::<(), TerrainError>(())
//! ```

pub mod confined;
pub mod error;
pub mod export;
pub mod field;
pub mod mesh;
pub mod noise;
pub mod patches;
pub mod recipe;
pub mod synth;

pub use crate::error::{Result, TerrainError};
pub use crate::export::write_heightmap_png;
pub use crate::field::{Bound, HeightField, Resolution, Terrain};
pub use crate::noise::NoiseKind;
pub use crate::patches::{
    BoundarySampling, PatchConfig, PatchSummary, PatchTerrain, generate_square_terrain_patches,
};
pub use crate::recipe::{
    Direction, Orientation, RecipeKind, Section, SlopeType, TerrainRecipe, default_catalog,
    default_sections,
};
pub use crate::synth::{combined, flat, noise, ramp, stairs};
