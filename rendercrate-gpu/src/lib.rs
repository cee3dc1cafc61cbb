//! # rendercrate GPU
//!
//! Offscreen and on-screen rendering of triangle meshes, point clouds and
//! line sets with WGPU, plus read-back of the color and depth buffers.
//!
//! The crate knows nothing about cameras or scenes: callers hand in
//! clip-space matrices and pre-built vertex data.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rendercrate_gpu::{GpuContext, OffscreenTarget, SceneRenderer};
//!
//! async fn example() -> rendercrate_core::Result<()> {
//!     let gpu = GpuContext::new().await?;
//!     let target = OffscreenTarget::new(&gpu, 640, 480)?;
//!     let renderer = SceneRenderer::offscreen(&gpu)?;
//!     renderer.render(&gpu, target.views(), [0.0, 0.0, 1.0, 1.0], &[])?;
//!     let depth = target.read_depth(&gpu)?;
//!     assert_eq!(depth.len(), 640 * 480);
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod renderer;
pub mod target;

// Re-export commonly used items
pub use device::{GpuContext, COPY_ROW_ALIGNMENT};
pub use renderer::*;
pub use target::*;
