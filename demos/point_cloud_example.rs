//! Show a random point cloud in an interactive window

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use rendercrate_core::{colors, Point3f};
use rendercrate_visualization::{RenderInterface, RenderInterfaceConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of points
    #[arg(short, long, default_value_t = 1000)]
    num_points: usize,

    /// Edge length of the cube the points are drawn from
    #[arg(long, default_value_t = 20.0)]
    extent: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = rand::thread_rng();
    let coords: Vec<Point3f> = (0..args.num_points)
        .map(|_| {
            let mut coord = || args.extent * (rng.gen::<f32>() - 0.5);
            Point3f::new(coord(), coord(), coord())
        })
        .collect();
    let point_colors = vec![colors::RED; coords.len()];

    let mut render_interface = RenderInterface::new(RenderInterfaceConfig {
        off_screen_rendering: false,
        width: 320,
        height: 240,
        background_color: [1.0, 1.0, 1.0],
        ..Default::default()
    })?;
    render_interface.add_point_cloud(&coords, Some(&point_colors))?;
    render_interface.look_with_camera_on_scene();
    render_interface.render_and_start()?;
    Ok(())
}
