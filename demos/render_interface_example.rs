//! Interactive scene with a cylinder, a marker point and the orientation
//! marker
//!
//! Controls:
//!   Left drag: rotate        Shift + left drag / middle drag: pan
//!   Right drag / wheel: zoom R: fit the scene   Q, E, Escape: quit

use anyhow::Result;
use nalgebra::Matrix4;
use rendercrate_core::{colors, Point3d};
use rendercrate_visualization::{Actor, RenderInterface, RenderInterfaceConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut render_interface = RenderInterface::new(RenderInterfaceConfig {
        off_screen_rendering: false,
        width: 1920,
        height: 1080,
        title: "rendercrate example".to_string(),
        ..Default::default()
    })?;

    render_interface.add_point(Point3d::new(1.0, 1.0, 1.0), colors::LIME, 0.1);
    render_interface.add_actor(Actor::example_cylinder(1.0));
    render_interface.add_coordinate_axes(&Matrix4::identity(), true);
    render_interface.show_global_coordinate_axes_widget();
    render_interface.look_with_camera_on_scene();
    render_interface.render_and_start()?;
    Ok(())
}
