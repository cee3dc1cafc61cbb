//! Render depth maps of a mesh from calibrated cameras
//!
//! For every `--pose` the mesh is rendered offscreen and the linear depth
//! is written as a 16-bit PNG (millimeters by default) next to an 8-bit
//! z-buffer image.

use anyhow::{Context, Result};
use clap::Parser;
use rendercrate_demos::CameraArgs;
use rendercrate_visualization::{RenderInterface, RenderInterfaceConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mesh or point cloud (.ply, .obj, .stl)
    #[arg(short, long)]
    input_path: PathBuf,

    /// Directory receiving the depth maps
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Depth values are multiplied by this factor before rounding
    #[arg(long, default_value_t = 1000.0)]
    depth_scale: f64,

    /// Far clipping plane before fitting to the scene
    #[arg(long, default_value_t = 1000.0)]
    max_clipping_range: f64,

    #[command(flatten)]
    camera: CameraArgs,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let mut render_interface = RenderInterface::new(RenderInterfaceConfig {
        width: args.camera.width,
        height: args.camera.height,
        background_color: [0.0, 0.5, 0.5],
        ..Default::default()
    })?;
    render_interface.load_vtk_mesh_or_point_cloud(&args.input_path, None)?;

    for (index, cam) in args.camera.cameras()?.iter().enumerate() {
        render_interface.set_active_cam_from_computer_vision_cam(cam, args.max_clipping_range)?;
        render_interface.render()?;

        let depth_path = args.output_dir.join(format!("depth_{:04}.png", index));
        let z_buffer_path = args.output_dir.join(format!("z_buffer_{:04}.png", index));
        render_interface.write_depth_buffer_to_disc(&depth_path, args.depth_scale)?;
        render_interface.write_z_buffer_to_disc(&z_buffer_path)?;
        println!("Wrote {}", depth_path.display());
    }

    Ok(())
}
