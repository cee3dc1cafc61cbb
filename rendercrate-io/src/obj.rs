//! OBJ format support
//!
//! OBJ keeps positions, texture coordinates and normals in separate index
//! spaces. Each distinct (position, texture, normal) tuple used by a face
//! becomes one vertex. Colors are not stored; textured OBJ files carry their
//! appearance in a separate image.

use crate::{triangulate_fan, MeshReader, MeshWriter};
use rendercrate_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use obj::{IndexTuple, ObjData};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub struct ObjReader;
pub struct ObjWriter;

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path.as_ref())?;
        let data = ObjData::load_buf(BufReader::new(file))
            .map_err(|e| Error::InvalidData(format!("{}: {}", path.as_ref().display(), e)))?;
        obj_data_to_mesh(&data)
    }
}

fn obj_data_to_mesh(data: &ObjData) -> Result<TriangleMesh> {
    let polygons: Vec<&[IndexTuple]> = data
        .objects
        .iter()
        .flat_map(|o| o.groups.iter())
        .flat_map(|g| g.polys.iter())
        .map(|p| p.0.as_slice())
        .collect();

    // Vertex-only files become point clouds
    if polygons.is_empty() {
        let vertices = data.position.iter().map(|p| Point3f::new(p[0], p[1], p[2])).collect();
        return Ok(TriangleMesh::from_vertices_and_faces(vertices, Vec::new()));
    }

    let with_tex = polygons.iter().all(|p| p.iter().all(|t| t.1.is_some()));
    let with_normals = polygons.iter().all(|p| p.iter().all(|t| t.2.is_some()));

    let mut mesh = TriangleMesh::new();
    let mut tex_coords = Vec::new();
    let mut normals = Vec::new();
    let mut lookup: HashMap<(usize, Option<usize>, Option<usize>), usize> = HashMap::new();

    for polygon in polygons {
        let mut indices = Vec::with_capacity(polygon.len());
        for &IndexTuple(p, t, n) in polygon {
            let t = t.filter(|_| with_tex);
            let n = n.filter(|_| with_normals);
            let index = match lookup.get(&(p, t, n)) {
                Some(&index) => index,
                None => {
                    let position = lookup_index(&data.position, p, "position")?;
                    let index = mesh.add_vertex(Point3f::new(position[0], position[1], position[2]));
                    if let Some(t) = t {
                        tex_coords.push(*lookup_index(&data.texture, t, "texture")?);
                    }
                    if let Some(n) = n {
                        let normal = lookup_index(&data.normal, n, "normal")?;
                        normals.push(Vector3f::new(normal[0], normal[1], normal[2]));
                    }
                    lookup.insert((p, t, n), index);
                    index
                }
            };
            indices.push(index);
        }
        mesh.faces.extend(triangulate_fan(&indices));
    }

    if with_tex {
        mesh.tex_coords = Some(tex_coords);
    }
    if with_normals {
        mesh.normals = Some(normals);
    }
    Ok(mesh)
}

fn lookup_index<'a, T>(values: &'a [T], index: usize, what: &str) -> Result<&'a T> {
    values.get(index).ok_or_else(|| {
        Error::InvalidData(format!("{} index {} out of range 0..{}", what, index, values.len()))
    })
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        mesh.validate()?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "# rendercrate")?;
        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        if let Some(tex_coords) = &mesh.tex_coords {
            for uv in tex_coords {
                writeln!(writer, "vt {} {}", uv[0], uv[1])?;
            }
        }
        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
            }
        }

        // OBJ indices are 1-based; all attribute arrays share the vertex index
        let corner = |i: usize| match (mesh.tex_coords.is_some(), mesh.normals.is_some()) {
            (true, true) => format!("{0}/{0}/{0}", i + 1),
            (true, false) => format!("{0}/{0}", i + 1),
            (false, true) => format!("{0}//{0}", i + 1),
            (false, false) => format!("{}", i + 1),
        };
        for face in &mesh.faces {
            writeln!(writer, "f {} {} {}", corner(face[0]), corner(face[1]), corner(face[2]))?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(source: &str) -> TriangleMesh {
        let data = ObjData::load_buf(source.as_bytes()).unwrap();
        obj_data_to_mesh(&data).unwrap()
    }

    #[test]
    fn test_quad_is_triangulated() {
        let mesh = load_str("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert!(mesh.tex_coords.is_none());
    }

    #[test]
    fn test_texture_seams_split_vertices() {
        let mesh = load_str(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nvt 0.5 0.5\n\
             f 1/1 2/2 3/3\nf 1/5 3/3 4/4\n",
        );
        assert_eq!(mesh.num_points(), 5);
        assert_eq!(mesh.num_polygons(), 2);
        assert_eq!(mesh.tex_coords.as_ref().unwrap()[3], [0.5, 0.5]);
    }

    #[test]
    fn test_vertices_without_faces() {
        let mesh = load_str("v 0 0 0\nv 1 2 3\n");
        assert_eq!(mesh.num_points(), 2);
        assert_eq!(mesh.num_polygons(), 0);
    }
}
