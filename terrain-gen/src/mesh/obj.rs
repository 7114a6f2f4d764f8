//! Wavefront OBJ export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::GridMesh;

/// Write `mesh` to a Wavefront OBJ file as a single named object
///
/// Vertex normals are written alongside positions and every quad references
/// both (`f v//vn ...`).
///
/// # Example
/// ```no_run
/// use terrain_gen::mesh::{GridMesh, write_obj};
/// use glam::Vec3;
/// use std::path::Path;
///
/// let mesh = GridMesh::cuboid(Vec3::ZERO, Vec3::ONE);
/// write_obj(&mesh, Path::new("box.obj"), "box").unwrap();
/// ```
pub fn write_obj(mesh: &GridMesh, path: &Path, name: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    write_obj_to(mesh, &mut w, name)?;
    w.flush()
}

/// Write `mesh` as OBJ text to any writer
pub fn write_obj_to<W: Write>(mesh: &GridMesh, w: &mut W, name: &str) -> std::io::Result<()> {
    writeln!(w, "# {} vertices, {} faces", mesh.vertex_count(), mesh.face_count())?;
    writeln!(w, "o {}", name)?;

    for p in &mesh.positions {
        writeln!(w, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    for n in mesh.vertex_normals() {
        writeln!(w, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
    }
    for quad in &mesh.quads {
        let [a, b, c, d] = quad.map(|v| v + 1);
        writeln!(w, "f {a}//{a} {b}//{b} {c}//{c} {d}//{d}")?;
    }

    Ok(())
}
