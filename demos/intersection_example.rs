//! Cast a ray against a mesh and show the hits
//!
//! The ray origin is drawn red and every hit blue.

use anyhow::Result;
use clap::Parser;
use rendercrate_algorithms::MeshIntersector;
use rendercrate_core::{colors, Point3d, Ray, Vector3d};
use rendercrate_demos::parse_values3;
use rendercrate_visualization::{Actor, RenderInterface, RenderInterfaceConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mesh (.ply, .obj, .stl)
    #[arg(short, long)]
    input_path: PathBuf,

    /// Ray origin as x,y,z
    #[arg(long, value_parser = parse_values3, default_value = "0,0,0")]
    origin: [f64; 3],

    /// Ray direction as x,y,z
    #[arg(long, value_parser = parse_values3, default_value = "0,1,0")]
    direction: [f64; 3],

    /// Radius of the marker spheres
    #[arg(long, default_value_t = 0.5)]
    radius: f64,

    /// Open an interactive window with the mesh and the hits
    #[arg(long)]
    show: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let intersector = MeshIntersector::from_file(&args.input_path)?;
    let [ox, oy, oz] = args.origin;
    let [dx, dy, dz] = args.direction;
    let origin = Point3d::new(ox, oy, oz);
    let ray = Ray::new(origin, Vector3d::new(dx, dy, dz))?;

    let hits = intersector.compute_single_ray_mesh_intersections_sorted(&ray);
    println!("{} intersections", hits.len());
    for hit in &hits {
        println!("  {:.6} {:.6} {:.6}", hit.x, hit.y, hit.z);
    }

    if args.show {
        let mut render_interface = RenderInterface::new(RenderInterfaceConfig {
            off_screen_rendering: false,
            width: 1920,
            height: 1080,
            background_color: [0.0, 0.5, 0.5],
            ..Default::default()
        })?;
        render_interface.add_point(origin, colors::RED, args.radius);
        render_interface.add_actor(Actor::mesh_from_poly_data(intersector.mesh().clone(), None, 1.0)?);
        for hit in hits {
            render_interface.add_point(hit, colors::BLUE, args.radius);
        }
        render_interface.look_with_camera_on_scene();
        render_interface.render_and_start()?;
    }

    Ok(())
}
