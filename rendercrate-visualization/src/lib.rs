//! Rendering of reconstructions seen through calibrated cameras
//!
//! This crate puts meshes and point clouds into a scene, places a camera
//! from a calibration matrix and a cam-to-world pose, and renders with
//! wgpu:
//! - Offscreen renders with z-buffer, depth and color read-back
//! - Z-buffer to world coordinate conversion
//! - Coordinate axes, marker points and lines
//! - An interactive window with trackball camera controls
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rendercrate_visualization::{RenderInterface, RenderInterfaceConfig};
//! use rendercrate_core::calibration_matrix;
//! use nalgebra::Matrix4;
//!
//! fn example() -> rendercrate_core::Result<()> {
//!     let mut render = RenderInterface::new(RenderInterfaceConfig::default())?;
//!     render.load_vtk_mesh_or_point_cloud("mesh.ply", None)?;
//!     render.set_active_cam_from_computer_vision_cam_to_world_mat(
//!         &Matrix4::identity(),
//!         &calibration_matrix(525.0, 525.0, 320.0, 240.0),
//!         640,
//!         480,
//!         100.0,
//!     )?;
//!     render.render()?;
//!     let points = render.get_z_buffer_as_world_coords(10)?;
//!     println!("{} points", points.len());
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod camera_interface;
pub mod coordinate_axes;
pub mod frame;
pub mod image_buffer;
pub mod interactor;
pub mod primitives;
pub mod render_interface;
pub mod scene;
pub mod scene_camera;
pub mod zbuffer;

pub use actor::*;
pub use camera_interface::*;
pub use coordinate_axes::*;
pub use frame::*;
pub use image_buffer::*;
pub use interactor::TrackballStyle;
pub use primitives::*;
pub use render_interface::*;
pub use scene::*;
pub use scene_camera::*;
pub use zbuffer::*;
