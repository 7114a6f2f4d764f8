//! Destinations for generated terrain meshes

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::field::{Bound, HeightField, Terrain};

use super::{GridMesh, write_obj};

/// Receives finished height fields and turns them into meshes
///
/// Generators never talk to a modelling tool directly; whatever consumes
/// their output implements this trait.
pub trait MeshSink {
    /// Take ownership of one named terrain surface
    fn accept(&mut self, name: &str, heights: &HeightField, bound: &Bound) -> Result<()>;

    fn accept_terrain(&mut self, name: &str, terrain: &Terrain) -> Result<()> {
        self.accept(name, &terrain.heights, &terrain.bound)
    }
}

/// A surface captured by [`MemorySink`]
#[derive(Debug, Clone)]
pub struct EmittedMesh {
    pub name: String,
    pub heights: HeightField,
    pub bound: Bound,
    pub mesh: GridMesh,
}

/// Keeps every accepted surface in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub meshes: Vec<EmittedMesh>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&EmittedMesh> {
        self.meshes.iter().find(|m| m.name == name)
    }
}

impl MeshSink for MemorySink {
    fn accept(&mut self, name: &str, heights: &HeightField, bound: &Bound) -> Result<()> {
        let mesh = GridMesh::from_heights(heights, bound)?;
        self.meshes.push(EmittedMesh {
            name: name.to_string(),
            heights: heights.clone(),
            bound: *bound,
            mesh,
        });
        Ok(())
    }
}

/// Writes each accepted surface to `<dir>/<name>.obj`
#[derive(Debug)]
pub struct ObjSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ObjSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Write an already built mesh
    pub fn write_mesh(&mut self, name: &str, mesh: &GridMesh) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.obj", name));
        write_obj(mesh, &path, name)?;
        tracing::debug!(
            "Wrote {} ({} vertices, {} faces)",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count()
        );
        self.written.push(path.clone());
        Ok(path)
    }
}

impl MeshSink for ObjSink {
    fn accept(&mut self, name: &str, heights: &HeightField, bound: &Bound) -> Result<()> {
        let mesh = GridMesh::from_heights(heights, bound)?;
        self.write_mesh(name, &mesh)?;
        Ok(())
    }
}
