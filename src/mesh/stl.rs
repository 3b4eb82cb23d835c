use super::TriMesh;
use crate::error::ExportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// On-disk mesh format, chosen from the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    BinaryStl,
    AsciiStl,
    Obj,
}

impl MeshFormat {
    /// Pick the format for `path`
    ///
    /// `.stl` is binary unless `ascii` is set; `.obj` is Wavefront OBJ.
    pub fn from_path(path: &Path, ascii: bool) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "stl" if ascii => Ok(Self::AsciiStl),
            "stl" => Ok(Self::BinaryStl),
            "obj" => Ok(Self::Obj),
            _ => Err(ExportError::UnsupportedFormat { extension }),
        }
    }
}

/// Write a mesh to `path` in the given format
pub fn save_mesh(mesh: &TriMesh, path: &Path, format: MeshFormat) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    match format {
        MeshFormat::BinaryStl => write_binary_stl(mesh, &mut writer),
        MeshFormat::AsciiStl => write_ascii_stl(mesh, &mut writer),
        MeshFormat::Obj => write_obj(mesh, &mut writer),
    }
    .and_then(|_| writer.flush())
    .map_err(io_err)
}

/// Binary STL: 80 byte header, u32 count, then 50 bytes per triangle
fn write_binary_stl<W: Write>(mesh: &TriMesh, writer: &mut W) -> std::io::Result<()> {
    let to_f32 = |v: [f64; 3]| [v[0] as f32, v[1] as f32, v[2] as f32];

    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .map(|tri| stl_io::Triangle {
            normal: stl_io::Normal::new(to_f32(tri.normal)),
            vertices: tri.vertices.map(|v| stl_io::Vertex::new(to_f32(v))),
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())
}

fn write_ascii_stl<W: Write>(mesh: &TriMesh, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "solid heightmap3d")?;

    for tri in mesh.triangles() {
        let [nx, ny, nz] = tri.normal;
        writeln!(writer, "  facet normal {nx:.6e} {ny:.6e} {nz:.6e}")?;
        writeln!(writer, "    outer loop")?;
        for [x, y, z] in tri.vertices {
            writeln!(writer, "      vertex {x:.6e} {y:.6e} {z:.6e}")?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid heightmap3d")
}

/// Wavefront OBJ keeps the shared vertex list; face indices are 1-based
fn write_obj<W: Write>(mesh: &TriMesh, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# heightmap3d")?;
    for [x, y, z] in mesh.vertices() {
        writeln!(writer, "v {x} {y} {z}")?;
    }
    for [a, b, c] in mesh.faces() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

/// Get the file size of a binary STL with the given number of triangles
pub fn estimate_stl_size(triangle_count: usize) -> usize {
    // 80 (header) + 4 (count) + triangles * (12 normal + 36 vertices + 2 attribute)
    80 + 4 + triangle_count * 50
}
