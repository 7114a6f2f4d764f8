//! Mesh emission: turning height fields into quad meshes
//!
//! [`GridMesh`] holds the geometry, [`write_obj`] serialises it and
//! [`MeshSink`] is the seam through which generated terrain leaves the
//! crate.

mod grid;
mod obj;
mod sink;

pub use grid::GridMesh;
pub use obj::{write_obj, write_obj_to};
pub use sink::{EmittedMesh, MemorySink, MeshSink, ObjSink};
