//! Overwrite the vertex colors of a PLY file

use anyhow::Result;
use clap::Parser;
use rendercrate_demos::parse_color;
use rendercrate_core::Rgb8;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input geometry (.ply, .obj, .stl)
    #[arg(short, long)]
    input_path: PathBuf,

    /// Output PLY file
    #[arg(short, long)]
    output_path: PathBuf,

    /// New color as r,g,b in 0..=255
    #[arg(short, long, value_parser = parse_color, default_value = "255,255,0")]
    color: Rgb8,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut poly_data = rendercrate_io::read_poly_data(&args.input_path)?;
    let point_colors = rendercrate_io::create_color_array(poly_data.num_points(), args.color);
    poly_data.set_colors(point_colors)?;
    rendercrate_io::write_poly_data_to_ply(&poly_data, &args.output_path)?;

    println!(
        "Wrote {} points with color {:?} to {}",
        poly_data.num_points(),
        args.color,
        args.output_path.display()
    );
    Ok(())
}
