//! Write-then-read tests for every supported geometry format
//!
//! Point counts must survive every format; PLY additionally keeps
//! per-vertex colors.

use approx::assert_relative_eq;
use rendercrate_core::{Error, GeometryKind, Point3f, TriangleMesh};
use rendercrate_io::*;
use std::fs;

/// Unit cube centered at the origin, 8 shared vertices and 12 triangles
fn create_unit_cube() -> TriangleMesh {
    let vertices = vec![
        Point3f::new(-0.5, -0.5, -0.5),
        Point3f::new(0.5, -0.5, -0.5),
        Point3f::new(0.5, 0.5, -0.5),
        Point3f::new(-0.5, 0.5, -0.5),
        Point3f::new(-0.5, -0.5, 0.5),
        Point3f::new(0.5, -0.5, 0.5),
        Point3f::new(0.5, 0.5, 0.5),
        Point3f::new(-0.5, 0.5, 0.5),
    ];
    let faces = vec![
        [0, 2, 1], [0, 3, 2], // back
        [4, 5, 6], [4, 6, 7], // front
        [0, 1, 5], [0, 5, 4], // bottom
        [3, 7, 6], [3, 6, 2], // top
        [0, 4, 7], [0, 7, 3], // left
        [1, 2, 6], [1, 6, 5], // right
    ];
    TriangleMesh::from_vertices_and_faces(vertices, faces)
}

fn create_colored_cloud(n: usize) -> TriangleMesh {
    let coords: Vec<Point3f> = (0..n)
        .map(|i| Point3f::new(i as f32 * 0.1, (i % 7) as f32, -(i as f32)))
        .collect();
    let colors: Vec<[u8; 3]> = (0..n).map(|i| [(i * 3) as u8, (i * 5) as u8, 255 - i as u8]).collect();
    create_point_cloud_poly_data(&coords, &colors).unwrap()
}

#[test]
fn test_ply_point_cloud_keeps_count_and_colors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cloud.ply");
    let cloud = create_colored_cloud(50);

    write_poly_data_to_ply(&cloud, &path).unwrap();
    let loaded = read_poly_data(&path).unwrap();

    assert_eq!(loaded.num_points(), 50);
    assert_eq!(loaded.num_polygons(), 0);
    assert_eq!(loaded.kind(), GeometryKind::PointCloud);
    assert_eq!(loaded.colors, cloud.colors);
    assert_eq!(loaded.vertices, cloud.vertices);
}

#[test]
fn test_ply_mesh_keeps_faces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.PLY");
    let cube = create_unit_cube();

    write_poly_data(&cube, &path).unwrap();
    let loaded = read_poly_data(&path).unwrap();

    assert_eq!(loaded.num_points(), 8);
    assert_eq!(loaded.faces, cube.faces);
    assert_eq!(loaded.kind(), GeometryKind::Mesh);
}

#[test]
fn test_obj_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.obj");
    let mut cube = create_unit_cube();
    cube.tex_coords = Some((0..8).map(|i| [i as f32 / 8.0, 1.0 - i as f32 / 8.0]).collect());

    write_poly_data(&cube, &path).unwrap();
    let loaded = read_poly_data(&path).unwrap();

    assert_eq!(loaded.num_points(), cube.num_points());
    assert_eq!(loaded.num_polygons(), cube.num_polygons());

    // Vertices are renumbered in order of first use; compare face corners
    let loaded_uvs = loaded.tex_coords.as_ref().unwrap();
    let cube_uvs = cube.tex_coords.as_ref().unwrap();
    for (lf, cf) in loaded.faces.iter().zip(&cube.faces) {
        for c in 0..3 {
            assert_eq!(loaded.vertices[lf[c]], cube.vertices[cf[c]]);
            assert_eq!(loaded_uvs[lf[c]], cube_uvs[cf[c]]);
        }
    }
}

fn assert_same_cube_corners(loaded: &TriangleMesh, cube: &TriangleMesh) {
    for (lf, cf) in loaded.faces.iter().zip(&cube.faces) {
        for c in 0..3 {
            let (l, e) = (loaded.vertices[lf[c]], cube.vertices[cf[c]]);
            assert_relative_eq!(l.x, e.x);
            assert_relative_eq!(l.y, e.y);
            assert_relative_eq!(l.z, e.z);
        }
    }
}

#[test]
fn test_binary_ply_cube_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube_binary.ply");
    let cube = create_unit_cube();

    PlyWriter::write_mesh_binary(&cube, &path).unwrap();
    let loaded = read_poly_data(&path).unwrap();

    assert_eq!(loaded.num_points(), cube.num_points());
    assert_eq!(loaded.num_polygons(), cube.num_polygons());
    assert_eq!(loaded.faces, cube.faces);
    assert_same_cube_corners(&loaded, &cube);
}

#[test]
fn test_binary_stl_cube_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.stl");
    let cube = create_unit_cube();

    write_poly_data(&cube, &path).unwrap();
    let loaded = read_poly_data(&path).unwrap();

    assert_eq!(loaded.num_points(), cube.num_points());
    assert_eq!(loaded.num_polygons(), cube.num_polygons());
    assert_same_cube_corners(&loaded, &cube);
}

#[test]
fn test_ascii_stl_cube_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube_ascii.stl");
    let cube = create_unit_cube();

    StlWriter::write_mesh_ascii(&cube, &path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().starts_with("solid "));
    let loaded = read_poly_data(&path).unwrap();

    assert_eq!(loaded.num_points(), cube.num_points());
    assert_eq!(loaded.num_polygons(), cube.num_polygons());
    assert_same_cube_corners(&loaded, &cube);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.off");
    fs::write(&path, "OFF\n0 0 0\n").unwrap();

    assert!(matches!(read_poly_data(&path), Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_empty_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.ply");
    fs::write(
        &path,
        "ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
    )
    .unwrap();

    match read_poly_data(&path) {
        Err(Error::NoPointsLoaded { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected NoPointsLoaded, got {:?}", other),
    }

    let obj_path = dir.path().join("empty.obj");
    fs::write(&obj_path, "# nothing here\n").unwrap();
    assert!(matches!(read_poly_data(&obj_path), Err(Error::NoPointsLoaded { .. })));
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(read_poly_data("/does/not/exist.stl"), Err(Error::Io(_))));
}
