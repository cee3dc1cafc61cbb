//! Command line helpers shared by the demos

use clap::Args;
use nalgebra::{Matrix3, Matrix4};
use rendercrate_core::{calibration_matrix, CameraConvention, PinholeCamera, Rgb8};

fn parse_values<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{}': {}", v, e)))
        .collect::<Result<Vec<_>, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {} comma-separated values, got {}", N, v.len()))
}

/// `fx,fy,cx,cy`
pub fn parse_intrinsics(s: &str) -> Result<[f64; 4], String> {
    parse_values::<4>(s)
}

/// `x,y,z`
pub fn parse_values3(s: &str) -> Result<[f64; 3], String> {
    parse_values::<3>(s)
}

/// `r,g,b` in 0..=255
pub fn parse_color(s: &str) -> Result<Rgb8, String> {
    let [r, g, b] = parse_values::<3>(s)?;
    let channel = |c: f64| {
        if (0.0..=255.0).contains(&c) {
            Ok(c.round() as u8)
        } else {
            Err(format!("color channel {} is outside 0..=255", c))
        }
    };
    Ok([channel(r)?, channel(g)?, channel(b)?])
}

/// 16 comma-separated values, row-major
pub fn parse_pose(s: &str) -> Result<Matrix4<f64>, String> {
    parse_values::<16>(s).map(|values| Matrix4::from_row_slice(&values))
}

/// Pinhole cameras from the command line
#[derive(Args, Debug, Clone)]
pub struct CameraArgs {
    /// Intrinsics as fx,fy,cx,cy in pixels
    #[arg(long, value_parser = parse_intrinsics, default_value = "525,525,320,240")]
    pub intrinsics: [f64; 4],

    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Computer-vision cam-to-world matrix, 16 values row-major; repeat
    /// for several cameras. The identity pose is used when omitted.
    #[arg(long = "pose", value_parser = parse_pose)]
    pub poses: Vec<Matrix4<f64>>,
}

impl CameraArgs {
    pub fn calibration(&self) -> Matrix3<f64> {
        let [fx, fy, cx, cy] = self.intrinsics;
        calibration_matrix(fx, fy, cx, cy)
    }

    pub fn cameras(&self) -> rendercrate_core::Result<Vec<PinholeCamera>> {
        let poses = if self.poses.is_empty() {
            vec![Matrix4::identity()]
        } else {
            self.poses.clone()
        };
        poses
            .into_iter()
            .map(|pose| {
                PinholeCamera::new(
                    self.width,
                    self.height,
                    self.calibration(),
                    pose,
                    CameraConvention::ComputerVision,
                )
            })
            .collect()
    }
}
