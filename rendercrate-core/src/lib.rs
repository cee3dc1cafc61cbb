//! Core data structures for rendercrate
//!
//! This crate provides the geometry containers ("poly data"), the pinhole
//! camera model with its computer-vision/OpenGL conventions, rays, bounding
//! boxes and the shared error type used across the workspace.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod bounds;
pub mod ray;
pub mod texture;
pub mod camera_model;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use bounds::*;
pub use ray::*;
pub use texture::*;
pub use camera_model::*;
pub use traits::*;
pub use transform::*;
pub use error::{Error, Result};

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Vector4, Matrix3, Matrix4};

// Type aliases for easier imports
pub type Point = Point3f;
pub type PolyData = TriangleMesh;
