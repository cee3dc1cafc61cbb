//! STL format support
//!
//! Parsing and binary writing go through `stl_io`, which also merges the
//! per-triangle corners back into shared vertices. Only the ASCII writer is
//! local since `stl_io` writes binary only.

use crate::{MeshReader, MeshWriter};
use rendercrate_core::{Error, Point3f, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

pub struct StlReader;
pub struct StlWriter;

impl MeshReader for StlReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let mut file = File::open(path)?;
        read_stl_from(&mut file)
    }
}

/// Parse binary or ASCII STL from memory
pub fn parse_stl(bytes: &[u8]) -> Result<TriangleMesh> {
    read_stl_from(&mut Cursor::new(bytes))
}

fn read_stl_from<R: Read + Seek>(read: &mut R) -> Result<TriangleMesh> {
    let indexed = stl_io::read_stl(read)
        .map_err(|e| Error::InvalidData(format!("STL: {}", e)))?;

    let vertices = indexed
        .vertices
        .iter()
        .map(|v| Point3f::new(v[0], v[1], v[2]))
        .collect();
    let faces = indexed.faces.iter().map(|f| f.vertices).collect();
    let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    mesh.validate()?;
    Ok(mesh)
}

fn to_stl_vector(p: &Point3f) -> stl_io::Vector<f32> {
    stl_io::Vector::new([p.x, p.y, p.z])
}

fn check_writable(mesh: &TriangleMesh) -> Result<()> {
    mesh.validate()?;
    if mesh.faces.is_empty() {
        return Err(Error::GeometryMismatch(
            "STL stores triangles only, point clouds cannot be written".to_string(),
        ));
    }
    Ok(())
}

impl MeshWriter for StlWriter {
    /// Binary STL; point clouds cannot be represented and are rejected
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        check_writable(mesh)?;

        let triangles: Vec<stl_io::Triangle> = mesh
            .faces
            .iter()
            .zip(mesh.calculate_face_normals())
            .map(|(face, normal)| stl_io::Triangle {
                normal: stl_io::Vector::new([normal.x, normal.y, normal.z]),
                vertices: [
                    to_stl_vector(&mesh.vertices[face[0]]),
                    to_stl_vector(&mesh.vertices[face[1]]),
                    to_stl_vector(&mesh.vertices[face[2]]),
                ],
            })
            .collect();

        let mut writer = BufWriter::new(File::create(path)?);
        stl_io::write_stl(&mut writer, triangles.iter())?;
        writer.flush()?;
        Ok(())
    }
}

impl StlWriter {
    /// ASCII STL, mostly useful for debugging
    pub fn write_mesh_ascii<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        check_writable(mesh)?;
        let mut writer = BufWriter::new(File::create(path)?);

        writeln!(writer, "solid rendercrate")?;
        for (face, n) in mesh.faces.iter().zip(mesh.calculate_face_normals()) {
            writeln!(writer, "  facet normal {} {} {}", n.x, n.y, n.z)?;
            writeln!(writer, "    outer loop")?;
            for &i in face {
                let v = mesh.vertices[i];
                writeln!(writer, "      vertex {} {} {}", v.x, v.y, v.z)?;
            }
            writeln!(writer, "    endloop")?;
            writeln!(writer, "  endfacet")?;
        }
        writeln!(writer, "endsolid rendercrate")?;

        writer.flush()?;
        Ok(())
    }
}
