//! Turn the z-buffer of a render back into world points
//!
//! Renders a (textured) mesh from one calibrated camera, writes the
//! z-buffer images and stores the recovered surface points as a PLY point
//! cloud. With `--show` the points are displayed on top of the mesh.

use anyhow::Result;
use clap::Parser;
use rendercrate_core::{colors, Point3f};
use rendercrate_demos::CameraArgs;
use rendercrate_visualization::{RenderInterface, RenderInterfaceConfig, DEFAULT_MAX_CLIPPING_RANGE};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mesh or point cloud (.ply, .obj, .stl)
    #[arg(short, long)]
    input_path: PathBuf,

    /// Optional texture image for the mesh
    #[arg(short, long)]
    texture_path: Option<PathBuf>,

    /// Directory receiving the z-buffer images and the point cloud
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Keep every n-th pixel
    #[arg(long, default_value_t = 1)]
    n_th_result_point: usize,

    /// Open an interactive window with the recovered points
    #[arg(long)]
    show: bool,

    #[command(flatten)]
    camera: CameraArgs,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.output_dir)?;

    let cam = args
        .camera
        .cameras()?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no camera given"))?;

    let config = RenderInterfaceConfig {
        width: args.camera.width,
        height: args.camera.height,
        background_color: [0.0, 0.5, 0.5],
        ..Default::default()
    };
    let mut render_interface = RenderInterface::new(config.clone())?;
    render_interface.load_vtk_mesh_or_point_cloud(&args.input_path, args.texture_path.as_deref())?;
    render_interface.set_active_cam_from_computer_vision_cam(&cam, DEFAULT_MAX_CLIPPING_RANGE)?;
    let principal_pt = cam.principal_point();
    log::info!("Principal point {:?}", principal_pt);
    render_interface.set_principal_point(principal_pt, cam.width, cam.height);
    render_interface.render()?;

    render_interface.write_z_buffer_to_disc(args.output_dir.join("z_buffer.png"))?;
    render_interface.write_z_buffer_visualization_to_disc(args.output_dir.join("z_buffer_viz.png"))?;

    let world_coords = render_interface.get_z_buffer_as_world_coords(args.n_th_result_point)?;
    println!("Recovered {} world points", world_coords.len());
    let coords: Vec<Point3f> = world_coords.iter().map(|p| p.cast::<f32>()).collect();
    let point_colors = rendercrate_io::create_color_array(coords.len(), colors::RED);
    let cloud = rendercrate_io::create_point_cloud_poly_data(&coords, &point_colors)?;
    rendercrate_io::write_poly_data_to_ply(&cloud, args.output_dir.join("world_coords.ply"))?;

    if args.show {
        let mut viewer = RenderInterface::new(RenderInterfaceConfig {
            off_screen_rendering: false,
            ..config
        })?;
        viewer.load_vtk_mesh_or_point_cloud(&args.input_path, args.texture_path.as_deref())?;
        viewer.add_point_cloud(&coords, Some(&point_colors))?;
        viewer.set_active_cam_from_computer_vision_cam(&cam, DEFAULT_MAX_CLIPPING_RANGE)?;
        viewer.render_and_start()?;
    }

    Ok(())
}
