//! Point and color types

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// 8-bit RGB color as stored per vertex
pub type Rgb8 = [u8; 3];

/// Named colors used by actors and axes
pub mod colors {
    use super::Rgb8;

    pub const RED: Rgb8 = [255, 0, 0];
    pub const LIME: Rgb8 = [0, 255, 0];
    pub const BLUE: Rgb8 = [0, 0, 255];
    pub const BLACK: Rgb8 = [0, 0, 0];
    pub const WHITE: Rgb8 = [255, 255, 255];
    pub const GRAY: Rgb8 = [128, 128, 128];
}

/// Convert an 8-bit color to normalized floats
pub fn rgb8_to_unit(color: Rgb8) -> [f32; 3] {
    [
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    ]
}

/// Convert a normalized float color to 8 bits, clamping out-of-range input
pub fn unit_to_rgb8(color: [f32; 3]) -> Rgb8 {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_u8(color[0]), to_u8(color[1]), to_u8(color[2])]
}

/// A point with color information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint3f {
    pub position: Point3f,
    pub color: Rgb8,
}

impl ColoredPoint3f {
    pub fn new(position: Point3f, color: Rgb8) -> Self {
        Self { position, color }
    }
}

impl Default for ColoredPoint3f {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            color: colors::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        assert_eq!(rgb8_to_unit(colors::RED), [1.0, 0.0, 0.0]);
        assert_eq!(unit_to_rgb8([0.5, 2.0, -1.0]), [128, 255, 0]);
    }
}
