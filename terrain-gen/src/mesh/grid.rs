//! Quad meshes built from height fields

use glam::Vec3;

use crate::error::{Result, TerrainError};
use crate::field::{Bound, HeightField, Terrain};

/// Indexed quad mesh
///
/// Grid meshes wind each quad `(i, j) → (i, j+1) → (i+1, j+1) → (i+1, j)`.
/// With x to the right and y up that is clockwise seen from above, so face
/// normals point towards −z; use [`GridMesh::flip_winding`] for a surface
/// that should face up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridMesh {
    pub positions: Vec<Vec3>,
    pub quads: Vec<[u32; 4]>,
}

impl GridMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay `heights` over `bound`
    ///
    /// Vertex `(i, j)` has index `i * Ry + j` and sits at
    /// `x = xmin + width * i / (Rx - 1)`, `y = ymin + length * j / (Ry - 1)`,
    /// `z = h(i, j)`.
    ///
    /// # Errors
    ///
    /// A field with fewer than two samples on either axis has no faces and is
    /// rejected with [`TerrainError::DegenerateMesh`].
    pub fn from_heights(heights: &HeightField, bound: &Bound) -> Result<Self> {
        let (rows, cols) = heights.shape();
        if rows < 2 || cols < 2 {
            return Err(TerrainError::DegenerateMesh { rows, cols });
        }

        let step_x = bound.width() / (rows - 1) as f64;
        let step_y = bound.length() / (cols - 1) as f64;

        let mut positions = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                positions.push(Vec3::new(
                    (bound.xmin + step_x * i as f64) as f32,
                    (bound.ymin + step_y * j as f64) as f32,
                    heights.get(i, j) as f32,
                ));
            }
        }

        let cols = cols as u32;
        let mut quads = Vec::with_capacity((rows - 1) * (cols as usize - 1));
        for i in 0..rows as u32 - 1 {
            for j in 0..cols - 1 {
                let v = i * cols + j;
                quads.push([v, v + 1, v + cols + 1, v + cols]);
            }
        }

        Ok(Self { positions, quads })
    }

    pub fn from_terrain(terrain: &Terrain) -> Result<Self> {
        Self::from_heights(&terrain.heights, &terrain.bound)
    }

    /// Axis-aligned box with outward-facing quads
    pub fn cuboid(center: Vec3, size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = vec![
            center + Vec3::new(-h.x, -h.y, -h.z),
            center + Vec3::new(h.x, -h.y, -h.z),
            center + Vec3::new(h.x, h.y, -h.z),
            center + Vec3::new(-h.x, h.y, -h.z),
            center + Vec3::new(-h.x, -h.y, h.z),
            center + Vec3::new(h.x, -h.y, h.z),
            center + Vec3::new(h.x, h.y, h.z),
            center + Vec3::new(-h.x, h.y, h.z),
        ];
        let quads = vec![
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // -y
            [2, 3, 7, 6], // +y
            [1, 2, 6, 5], // +x
            [3, 0, 4, 7], // -x
        ];
        Self { positions, quads }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.quads.len()
    }

    /// Split every quad along its `v0`–`v2` diagonal
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.quads
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
    }

    /// Area-weighted vertex normals following the quad winding
    ///
    /// Vertices that belong to no face get a zero normal.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for [a, b, c] in self.triangles() {
            let p0 = self.positions[a as usize];
            let p1 = self.positions[b as usize];
            let p2 = self.positions[c as usize];
            // Unnormalized cross product weights by triangle area
            let face = (p1 - p0).cross(p2 - p0);
            normals[a as usize] += face;
            normals[b as usize] += face;
            normals[c as usize] += face;
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        normals
    }

    /// Reverse the winding of every quad, flipping its normal
    pub fn flip_winding(&mut self) {
        for quad in &mut self.quads {
            quad.swap(1, 3);
        }
    }

    /// Add the vertices and faces of `other` to this mesh
    pub fn append(&mut self, other: &GridMesh) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.quads
            .extend(other.quads.iter().map(|q| q.map(|v| v + offset)));
    }
}
