//! Coordinate axes, marker points and lines

use crate::actor::Actor;
use crate::scene::Scene;
use nalgebra::Matrix4;
use rendercrate_core::{colors, Drawable, Point3d, Rgb8};

/// Adds axes, points and lines to a [`Scene`] and tracks whether the
/// orientation marker is shown in interactive windows
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateAxesInterface {
    show_orientation_marker: bool,
}

impl CoordinateAxesInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the world axes in the lower-left corner of the interactive
    /// window, rotating with the camera
    pub fn show_global_coordinate_axes_widget(&mut self) {
        self.show_orientation_marker = true;
    }

    pub fn orientation_marker_shown(&self) -> bool {
        self.show_orientation_marker
    }

    /// Unit axes placed by `transformation`. Axis labels are not rendered.
    pub fn add_coordinate_axes(&self, scene: &mut Scene, transformation: &Matrix4<f64>, no_labels: bool) {
        if !no_labels {
            log::warn!("Axis labels are not supported, adding unlabeled axes");
        }
        scene.add_actor(Actor::axes(transformation));
    }

    pub fn add_point(&self, scene: &mut Scene, p: Point3d, color: Rgb8, radius: f64) {
        scene.add_actor(Actor::sphere(p, color, radius));
    }

    pub fn add_line(&self, scene: &mut Scene, p1: Point3d, p2: Point3d, color: Rgb8, line_width: f32) {
        let mut actor = Actor::line(p1, p2, color);
        actor.property.line_width = line_width;
        scene.add_actor(actor);
    }

    /// Axes of a computer-vision camera frame drawn as lines of `length`:
    /// X red, Y green, Z blue. Optionally marks the origin (black) and the
    /// axis endpoints with spheres of `point_radius`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_coordinate_axes_custom(
        &self,
        scene: &mut Scene,
        cam_to_world_cv: &Matrix4<f64>,
        length: f64,
        line_width: f32,
        point_radius: f64,
        add_center: bool,
        add_endpoints: bool,
    ) {
        let to_world = |p: Point3d| cam_to_world_cv.transform_point(&p);
        let origin = to_world(Point3d::origin());
        let axes = [
            (to_world(Point3d::new(length, 0.0, 0.0)), colors::RED),
            (to_world(Point3d::new(0.0, length, 0.0)), colors::LIME),
            (to_world(Point3d::new(0.0, 0.0, length)), colors::BLUE),
        ];

        for (end, color) in axes {
            self.add_line(scene, origin, end, color, line_width);
        }
        if add_center {
            self.add_point(scene, origin, colors::BLACK, point_radius);
        }
        if add_endpoints {
            for (end, color) in axes {
                self.add_point(scene, end, color, point_radius);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorGeometry;
    use approx::assert_relative_eq;
    use nalgebra::Translation3;

    #[test]
    fn test_custom_axes_follow_camera_pose() {
        let mut scene = Scene::default();
        let pose = Translation3::new(1.0, 2.0, 3.0).to_homogeneous();
        CoordinateAxesInterface::new().add_coordinate_axes_custom(&mut scene, &pose, 2.0, 3.0, 0.05, true, true);

        assert_eq!(scene.len(), 3 + 1 + 3);
        let ActorGeometry::Lines { segments } = &scene.actors()[0].geometry else {
            panic!("expected a line");
        };
        assert_eq!(segments[0][0], Point3d::new(1.0, 2.0, 3.0));
        assert_eq!(segments[0][1], Point3d::new(3.0, 2.0, 3.0));
        assert_eq!(scene.actors()[0].property.line_width, 3.0);

        let center = scene.actors()[3].bounds().unwrap().center();
        assert_relative_eq!(center, Point3d::new(1.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_axes_and_marker() {
        let mut scene = Scene::default();
        let mut axes = CoordinateAxesInterface::new();
        assert!(!axes.orientation_marker_shown());
        axes.show_global_coordinate_axes_widget();
        assert!(axes.orientation_marker_shown());

        axes.add_coordinate_axes(&mut scene, &Matrix4::new_scaling(2.0), false);
        let bounds = scene.bounds().unwrap();
        assert_relative_eq!(bounds.max.x, 2.0, epsilon = 1e-6);
    }
}
