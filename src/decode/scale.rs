//! Output sizing for decoded frames.
//! Frames are scaled by swscale to an intermediate size and cropped into a
//! tightly packed RGBA8 buffer of exactly the requested dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bytes per RGBA8 pixel
pub const RGBA_BYTES: usize = 4;

/// Longest edge swscale is asked to produce before cropping
pub const MAX_SCALED_EDGE: u32 = 8192;

/// How a frame is fitted into the requested thumbnail box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Preserve aspect ratio and centre-crop whatever overflows the box
    #[default]
    Fill,
    /// Scale to exactly the box, ignoring aspect ratio
    Stretch,
}

impl FromStr for FitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fill" => Ok(FitMode::Fill),
            "stretch" => Ok(FitMode::Stretch),
            other => Err(format!("unknown fit mode {other:?} (expected fill or stretch)")),
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMode::Fill => f.write_str("fill"),
            FitMode::Stretch => f.write_str("stretch"),
        }
    }
}

/// Scaler output size and the crop window offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalePlan {
    pub scale_width: u32,
    pub scale_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Compute the scale size and crop offset for a `src` frame fitted into `dst`.
/// All dimensions must be non-zero.
pub fn fit_dimensions(
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
    fit: FitMode,
) -> ScalePlan {
    match fit {
        FitMode::Stretch => ScalePlan {
            scale_width: dst_width,
            scale_height: dst_height,
            crop_x: 0,
            crop_y: 0,
        },
        FitMode::Fill => {
            let scale = f64::max(
                dst_width as f64 / src_width as f64,
                dst_height as f64 / src_height as f64,
            );
            // Rounding may undershoot by a pixel; the box must stay covered.
            // Extreme aspect ratios are squashed along the long edge instead of
            // allocating an enormous intermediate image.
            let scale_width = ((src_width as f64 * scale).round() as u32)
                .min(MAX_SCALED_EDGE.max(dst_width))
                .max(dst_width);
            let scale_height = ((src_height as f64 * scale).round() as u32)
                .min(MAX_SCALED_EDGE.max(dst_height))
                .max(dst_height);

            ScalePlan {
                scale_width,
                scale_height,
                crop_x: (scale_width - dst_width) / 2,
                crop_y: (scale_height - dst_height) / 2,
            }
        }
    }
}

/// Copy the `width`×`height` window described by `plan` out of a strided RGBA8 plane.
pub fn crop_rgba(src: &[u8], stride: usize, plan: &ScalePlan, width: u32, height: u32) -> Vec<u8> {
    let row_bytes = width as usize * RGBA_BYTES;
    let mut out = Vec::with_capacity(row_bytes * height as usize);

    for y in 0..height as usize {
        let start = (plan.crop_y as usize + y) * stride + plan.crop_x as usize * RGBA_BYTES;
        out.extend_from_slice(&src[start..start + row_bytes]);
    }

    out
}
