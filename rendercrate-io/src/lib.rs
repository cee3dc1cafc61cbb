//! I/O for poly data and textures
//!
//! Geometry is read from PLY, OBJ and STL files into a single
//! [`TriangleMesh`] container; whether it renders as a mesh or as a point
//! cloud is decided by its polygon count. Textures are decoded with the
//! `image` crate.

pub mod ply;
pub mod obj;
pub mod stl;
pub mod texture;

pub use ply::{PlyReader, PlyWriter};
pub use obj::{ObjReader, ObjWriter};
pub use stl::{StlReader, StlWriter};
pub use texture::{read_texture, write_gray16_png, write_gray8_image, write_rgba8_image};

use rendercrate_core::{ColoredPoint3f, Error, Point3f, PointCloud, Result, Rgb8, TriangleMesh};
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Geometry file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyFormat {
    Ply,
    Obj,
    Stl,
}

impl PolyFormat {
    /// Detect the format from the file extension, ignoring case
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_uppercase());
        match extension.as_deref() {
            Some("PLY") => Ok(PolyFormat::Ply),
            Some("OBJ") => Ok(PolyFormat::Obj),
            Some("STL") => Ok(PolyFormat::Stl),
            _ => Err(Error::UnsupportedFormat(format!(
                "{} (expected .ply, .obj or .stl)",
                path.display()
            ))),
        }
    }
}

/// Read a mesh or point cloud, dispatching on the file extension.
///
/// Fails with [`Error::NoPointsLoaded`] when the file contains no vertices.
pub fn read_poly_data<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let poly_data = match PolyFormat::from_path(path)? {
        PolyFormat::Ply => PlyReader::read_mesh(path)?,
        PolyFormat::Obj => ObjReader::read_mesh(path)?,
        PolyFormat::Stl => StlReader::read_mesh(path)?,
    };

    log::info!(
        "Read {}: {} points, {} polygons",
        path.display(),
        poly_data.num_points(),
        poly_data.num_polygons()
    );

    if poly_data.num_points() == 0 {
        return Err(Error::NoPointsLoaded { path: path.to_path_buf() });
    }
    poly_data.validate()?;
    Ok(poly_data)
}

/// Write a mesh or point cloud, dispatching on the file extension
pub fn write_poly_data<P: AsRef<Path>>(poly_data: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match PolyFormat::from_path(path)? {
        PolyFormat::Ply => PlyWriter::write_mesh(poly_data, path),
        PolyFormat::Obj => ObjWriter::write_mesh(poly_data, path),
        PolyFormat::Stl => StlWriter::write_mesh(poly_data, path),
    }
}

/// Write poly data as ASCII PLY including per-vertex RGB colors
pub fn write_poly_data_to_ply<P: AsRef<Path>>(poly_data: &TriangleMesh, path: P) -> Result<()> {
    PlyWriter::write_mesh(poly_data, path)
}

/// `size` copies of one color
pub fn create_color_array(size: usize, color: Rgb8) -> Vec<Rgb8> {
    vec![color; size]
}

/// Build vertex-only poly data from coordinates and one color per coordinate
pub fn create_point_cloud_poly_data(coords: &[Point3f], colors: &[Rgb8]) -> Result<TriangleMesh> {
    if coords.len() != colors.len() {
        return Err(Error::GeometryMismatch(format!(
            "{} colors given for {} points",
            colors.len(),
            coords.len()
        )));
    }
    let cloud: PointCloud<ColoredPoint3f> = coords
        .iter()
        .zip(colors)
        .map(|(&position, &color)| ColoredPoint3f::new(position, color))
        .collect();
    Ok(cloud.into())
}

/// Fan-triangulate a polygon given as vertex indices
pub(crate) fn triangulate_fan(indices: &[usize]) -> impl Iterator<Item = [usize; 3]> + '_ {
    (1..indices.len().saturating_sub(1)).map(move |i| [indices[0], indices[i], indices[i + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection_ignores_case() {
        assert_eq!(PolyFormat::from_path("a/b/mesh.PLY").unwrap(), PolyFormat::Ply);
        assert_eq!(PolyFormat::from_path("mesh.Obj").unwrap(), PolyFormat::Obj);
        assert_eq!(PolyFormat::from_path("mesh.stl").unwrap(), PolyFormat::Stl);
        assert!(matches!(
            PolyFormat::from_path("mesh.off"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(PolyFormat::from_path("mesh").is_err());
    }

    #[test]
    fn test_point_cloud_poly_data() {
        let coords: Vec<Point3f> = (0..10).map(|i| Point3f::new(i as f32, 0.0, 1.0)).collect();
        let colors = create_color_array(coords.len(), [10, 20, 30]);
        let poly = create_point_cloud_poly_data(&coords, &colors).unwrap();

        assert_eq!(poly.num_points(), 10);
        assert_eq!(poly.num_polygons(), 0);
        assert_eq!(poly.colors.as_ref().unwrap()[9], [10, 20, 30]);
    }

    #[test]
    fn test_point_cloud_poly_data_count_mismatch() {
        let coords = vec![Point3f::origin(); 3];
        let colors = create_color_array(2, [0, 0, 0]);
        assert!(matches!(
            create_point_cloud_poly_data(&coords, &colors),
            Err(Error::GeometryMismatch(_))
        ));
    }

    #[test]
    fn test_fan_triangulation() {
        let tris: Vec<_> = triangulate_fan(&[0, 1, 2, 3]).collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(triangulate_fan(&[0, 1]).count(), 0);
    }
}
