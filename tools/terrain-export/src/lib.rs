//! terrain-export library
//!
//! Manifest parsing and the build pipeline behind the `terrain-export` tool.

pub mod build;
pub mod manifest;

pub use build::{Generated, PlannedTerrain, TerrainJob, build_all, sample, validate};
pub use manifest::TerrainManifest;
