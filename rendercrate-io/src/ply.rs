//! PLY format support

use crate::{triangulate_fan, MeshReader, MeshWriter};
use rendercrate_core::{Error, Point3f, Result, Rgb8, TriangleMesh, Vector3f};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use ply_rs::{
    parser::Parser,
    writer::Writer,
    ply::{Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType, ScalarType},
};

pub struct PlyReader;
pub struct PlyWriter;

const COLOR_NAMES: [[&str; 3]; 3] = [
    ["red", "green", "blue"],
    ["r", "g", "b"],
    ["diffuse_red", "diffuse_green", "diffuse_blue"],
];

const TEX_COORD_NAMES: [[&str; 2]; 3] = [["s", "t"], ["u", "v"], ["texture_u", "texture_v"]];

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let empty = Vec::new();
        let vertex_elements = ply.payload.get("vertex").unwrap_or(&empty);

        // Positions
        let mut vertices = Vec::with_capacity(vertex_elements.len());
        for vertex in vertex_elements {
            vertices.push(Point3f::new(
                extract_property_value(vertex, "x")?,
                extract_property_value(vertex, "y")?,
                extract_property_value(vertex, "z")?,
            ));
        }

        let normals = extract_optional_triplets(vertex_elements, ["nx", "ny", "nz"])
            .map(|n| n.into_iter().map(|[x, y, z]| Vector3f::new(x, y, z)).collect());
        let colors = COLOR_NAMES
            .iter()
            .find_map(|names| extract_colors(vertex_elements, *names));
        let tex_coords = TEX_COORD_NAMES
            .iter()
            .find_map(|names| extract_optional_pairs(vertex_elements, *names));

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, Vec::new());
        mesh.normals = normals;
        mesh.colors = colors;
        mesh.tex_coords = tex_coords;

        if let Some(face_elements) = ply.payload.get("face") {
            read_faces(&mut mesh, face_elements)?;
        }

        Ok(mesh)
    }
}

/// Triangulate faces. Per-corner `texcoord` lists split shared vertices so
/// every (vertex, uv) pair gets its own vertex.
fn read_faces(mesh: &mut TriangleMesh, face_elements: &[DefaultElement]) -> Result<()> {
    let mut split: HashMap<(usize, [u32; 2]), usize> = HashMap::new();
    let mut corner_uvs: Vec<Option<[f32; 2]>> = vec![None; mesh.vertices.len()];
    let mut has_corner_uvs = false;

    for face in face_elements {
        let mut indices = extract_face_indices(face)?;
        if let Some(uvs) = extract_face_tex_coords(face) {
            if uvs.len() == indices.len() * 2 {
                has_corner_uvs = true;
                for (corner, index) in indices.iter_mut().enumerate() {
                    let uv = [uvs[2 * corner], uvs[2 * corner + 1]];
                    let key = (*index, [uv[0].to_bits(), uv[1].to_bits()]);
                    *index = match split.get(&key) {
                        Some(&existing) => existing,
                        None if corner_uvs.get(*index).is_some_and(Option::is_none) => {
                            corner_uvs[*index] = Some(uv);
                            split.insert(key, *index);
                            *index
                        }
                        None => {
                            let new_index = duplicate_vertex(mesh, *index)?;
                            corner_uvs.push(Some(uv));
                            split.insert(key, new_index);
                            new_index
                        }
                    };
                }
            }
        }
        mesh.faces.extend(triangulate_fan(&indices));
    }

    if has_corner_uvs && mesh.tex_coords.is_none() {
        mesh.tex_coords = Some(corner_uvs.into_iter().map(|uv| uv.unwrap_or([0.0, 0.0])).collect());
    }
    Ok(())
}

fn duplicate_vertex(mesh: &mut TriangleMesh, index: usize) -> Result<usize> {
    let vertex = *mesh.vertices.get(index).ok_or_else(|| {
        Error::InvalidData(format!("face references missing vertex {}", index))
    })?;
    let new_index = mesh.add_vertex(vertex);
    if let Some(normals) = &mut mesh.normals {
        normals.push(normals[index]);
    }
    if let Some(colors) = &mut mesh.colors {
        colors.push(colors[index]);
    }
    if let Some(tex_coords) = &mut mesh.tex_coords {
        tex_coords.push(tex_coords[index]);
    }
    Ok(new_index)
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        PlyWriter::write_with_encoding(mesh, path, Encoding::Ascii)
    }
}

impl PlyWriter {
    /// Write binary little-endian PLY
    pub fn write_mesh_binary<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        PlyWriter::write_with_encoding(mesh, path, Encoding::BinaryLittleEndian)
    }

    fn write_with_encoding<P: AsRef<Path>>(mesh: &TriangleMesh, path: P, encoding: Encoding) -> Result<()> {
        mesh.validate()?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = encoding;

        // Define vertex element
        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = mesh.vertices.len();
        let float = PropertyType::Scalar(ScalarType::Float);
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(name.to_string(), float.clone()));
        }
        if mesh.normals.is_some() {
            for name in ["nx", "ny", "nz"] {
                vertex_element.properties.add(PropertyDef::new(name.to_string(), float.clone()));
            }
        }
        if mesh.colors.is_some() {
            for name in COLOR_NAMES[0] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::UChar),
                ));
            }
        }
        if mesh.tex_coords.is_some() {
            for name in TEX_COORD_NAMES[0] {
                vertex_element.properties.add(PropertyDef::new(name.to_string(), float.clone()));
            }
        }
        ply.header.elements.add(vertex_element);

        if !mesh.faces.is_empty() {
            let mut face_element = ElementDef::new("face".to_string());
            face_element.count = mesh.faces.len();
            face_element.properties.add(PropertyDef::new(
                "vertex_indices".to_string(),
                PropertyType::List(ScalarType::UChar, ScalarType::Int),
            ));
            ply.header.elements.add(face_element);
        }

        // Vertex payload
        let mut vertices = Vec::with_capacity(mesh.vertices.len());
        for (i, vertex) in mesh.vertices.iter().enumerate() {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(vertex.x));
            element.insert("y".to_string(), Property::Float(vertex.y));
            element.insert("z".to_string(), Property::Float(vertex.z));
            if let Some(normals) = &mesh.normals {
                element.insert("nx".to_string(), Property::Float(normals[i].x));
                element.insert("ny".to_string(), Property::Float(normals[i].y));
                element.insert("nz".to_string(), Property::Float(normals[i].z));
            }
            if let Some(colors) = &mesh.colors {
                for (name, value) in COLOR_NAMES[0].iter().zip(colors[i]) {
                    element.insert(name.to_string(), Property::UChar(value));
                }
            }
            if let Some(tex_coords) = &mesh.tex_coords {
                element.insert("s".to_string(), Property::Float(tex_coords[i][0]));
                element.insert("t".to_string(), Property::Float(tex_coords[i][1]));
            }
            vertices.push(element);
        }

        let ply_writer = Writer::new();
        match encoding {
            Encoding::Ascii => {
                ply.payload.insert("vertex".to_string(), vertices);
                if !mesh.faces.is_empty() {
                    let faces = mesh
                        .faces
                        .iter()
                        .map(|face| {
                            let mut element = DefaultElement::new();
                            let indices = face.iter().map(|&i| i as i32).collect();
                            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
                            element
                        })
                        .collect();
                    ply.payload.insert("face".to_string(), faces);
                }
                ply_writer.write_ply(&mut writer, &mut ply)?;
            }
            binary => {
                ply_writer.write_header(&mut writer, &ply.header)?;
                if let Some(vertex_def) = ply.header.elements.get("vertex") {
                    ply_writer.write_payload_of_element(&mut writer, &vertices, vertex_def, &ply.header)?;
                }
                write_binary_faces(&mut writer, &mesh.faces, binary)?;
            }
        }
        writer.flush()?;

        Ok(())
    }
}

/// Binary `list uchar int` faces. The binary list writer of ply-rs puts
/// the element count in front of every list, so faces are written here.
fn write_binary_faces<W: Write>(out: &mut W, faces: &[[usize; 3]], encoding: Encoding) -> Result<()> {
    for face in faces {
        out.write_all(&[3u8])?;
        for &index in face {
            let index = i32::try_from(index)
                .map_err(|_| Error::InvalidData(format!("vertex index {} exceeds the PLY int range", index)))?;
            let bytes = match encoding {
                Encoding::BinaryBigEndian => index.to_be_bytes(),
                _ => index.to_le_bytes(),
            };
            out.write_all(&bytes)?;
        }
    }
    Ok(())
}

fn property_as_f64(property: &Property) -> Option<f64> {
    match *property {
        Property::Char(v) => Some(v as f64),
        Property::UChar(v) => Some(v as f64),
        Property::Short(v) => Some(v as f64),
        Property::UShort(v) => Some(v as f64),
        Property::Int(v) => Some(v as f64),
        Property::UInt(v) => Some(v as f64),
        Property::Float(v) => Some(v as f64),
        Property::Double(v) => Some(v),
        _ => None,
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    element
        .get(name)
        .and_then(property_as_f64)
        .map(|v| v as f32)
        .ok_or_else(|| Error::InvalidData(format!("Property '{}' not found or invalid type", name)))
}

fn extract_optional_triplets(elements: &[DefaultElement], names: [&str; 3]) -> Option<Vec<[f32; 3]>> {
    if elements.is_empty() {
        return None;
    }
    elements
        .iter()
        .map(|e| {
            Some([
                extract_property_value(e, names[0]).ok()?,
                extract_property_value(e, names[1]).ok()?,
                extract_property_value(e, names[2]).ok()?,
            ])
        })
        .collect()
}

fn extract_optional_pairs(elements: &[DefaultElement], names: [&str; 2]) -> Option<Vec<[f32; 2]>> {
    if elements.is_empty() {
        return None;
    }
    elements
        .iter()
        .map(|e| {
            Some([
                extract_property_value(e, names[0]).ok()?,
                extract_property_value(e, names[1]).ok()?,
            ])
        })
        .collect()
}

/// Colors stored as uchar are taken as is; float colors are assumed to be in [0, 1]
fn extract_colors(elements: &[DefaultElement], names: [&str; 3]) -> Option<Vec<Rgb8>> {
    if elements.is_empty() {
        return None;
    }
    elements
        .iter()
        .map(|e| {
            let mut rgb = [0u8; 3];
            for (channel, name) in rgb.iter_mut().zip(names) {
                *channel = match e.get(name)? {
                    Property::Float(v) => (v.clamp(0.0, 1.0) * 255.0).round() as u8,
                    Property::Double(v) => (v.clamp(0.0, 1.0) * 255.0).round() as u8,
                    other => property_as_f64(other)?.clamp(0.0, 255.0) as u8,
                };
            }
            Some(rgb)
        })
        .collect()
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    let to_usize = |v: i64| {
        usize::try_from(v).map_err(|_| Error::InvalidData(format!("negative face index {}", v)))
    };
    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => indices.iter().map(|&i| to_usize(i as i64)).collect(),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        Some(Property::ListShort(indices)) => indices.iter().map(|&i| to_usize(i as i64)).collect(),
        Some(Property::ListUShort(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        _ => Err(Error::InvalidData("Face indices not found".to_string())),
    }
}

fn extract_face_tex_coords(element: &DefaultElement) -> Option<Vec<f32>> {
    match element.get("texcoord")? {
        Property::ListFloat(values) => Some(values.clone()),
        Property::ListDouble(values) => Some(values.iter().map(|&v| v as f32).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_quad_with_float_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.ply");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            "ply\nformat ascii 1.0\nelement vertex 4\n\
             property float x\nproperty float y\nproperty float z\n\
             property float red\nproperty float green\nproperty float blue\n\
             element face 1\nproperty list uchar int vertex_indices\nend_header\n\
             0 0 0 1 0 0\n1 0 0 0 1 0\n1 1 0 0 0 1\n0 1 0 1 1 1\n4 0 1 2 3\n"
        )
        .unwrap();
        drop(file);

        let mesh = PlyReader::read_mesh(&path).unwrap();
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        let colors = mesh.colors.unwrap();
        assert_eq!(colors[0], [255, 0, 0]);
        assert_eq!(colors[3], [255, 255, 255]);
    }

    #[test]
    fn test_face_texcoords_split_vertices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("split.ply");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            "ply\nformat ascii 1.0\nelement vertex 4\n\
             property float x\nproperty float y\nproperty float z\n\
             element face 2\nproperty list uchar int vertex_indices\n\
             property list uchar float texcoord\nend_header\n\
             0 0 0\n1 0 0\n1 1 0\n0 1 0\n\
             3 0 1 2 6 0 0 1 0 1 1\n\
             3 0 2 3 6 0.5 0.5 1 1 0 1\n"
        )
        .unwrap();
        drop(file);

        let mesh = PlyReader::read_mesh(&path).unwrap();
        // Vertex 0 appears with two different uvs
        assert_eq!(mesh.num_points(), 5);
        assert_eq!(mesh.faces[1][0], 4);
        let uvs = mesh.tex_coords.unwrap();
        assert_eq!(uvs[4], [0.5, 0.5]);
        assert_eq!(uvs[2], [1.0, 1.0]);
    }

    #[test]
    fn test_binary_write_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.ply");
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        mesh.tex_coords = Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);

        PlyWriter::write_mesh_binary(&mesh, &path).unwrap();
        let loaded = PlyReader::read_mesh(&path).unwrap();
        assert_eq!(loaded.faces, mesh.faces);
        assert_eq!(loaded.vertices, mesh.vertices);
        assert_eq!(loaded.tex_coords, mesh.tex_coords);
    }

    #[test]
    fn test_binary_face_lists_carry_their_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.ply");
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        PlyWriter::write_mesh_binary(&mesh, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let header_end = b"end_header\n";
        let body_start = bytes
            .windows(header_end.len())
            .position(|w| w == header_end)
            .unwrap()
            + header_end.len();
        // 4 vertices of 3 floats, then per face a count byte and 3 ints
        let faces = &bytes[body_start + 4 * 12..];
        assert_eq!(faces.len(), 2 * 13);
        assert_eq!(faces[0], 3);
        assert_eq!(faces[13], 3);
        assert_eq!(&faces[14..18], &0i32.to_le_bytes());
    }
}
