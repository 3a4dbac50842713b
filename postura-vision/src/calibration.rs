use serde::{Deserialize, Serialize};

use crate::landmark::LandmarkSet;

/// Centimeters per image pixel, derived from the patient's declared height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Calibration {
    Scaled { cm_per_pixel: f64 },
    /// Head and heels share a row; no vertical reference to scale against.
    Degenerate,
}

impl Calibration {
    pub fn cm_per_pixel(&self) -> f64 {
        match self {
            Calibration::Scaled { cm_per_pixel } => *cm_per_pixel,
            Calibration::Degenerate => 0.0,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Calibration::Degenerate)
    }
}

/// Vertical nose-to-heels distance in pixels.
pub fn reference_pixel_height(landmarks: &LandmarkSet, image_pixel_height: u32) -> f64 {
    let heel_y = (landmarks.left_heel().y + landmarks.right_heel().y) / 2.0;
    (heel_y - landmarks.nose().y).abs() * image_pixel_height as f64
}

/// Scale factor mapping pixels to centimeters.
///
/// The nose stands in for the top of the head and the mean of both heels for the
/// floor. A zero reference length yields [`Calibration::Degenerate`].
pub fn compute_scale(
    landmarks: &LandmarkSet,
    declared_height_cm: f64,
    image_pixel_height: u32,
) -> Calibration {
    let pixel_height = reference_pixel_height(landmarks, image_pixel_height);
    if pixel_height == 0.0 {
        return Calibration::Degenerate;
    }
    Calibration::Scaled {
        cm_per_pixel: declared_height_cm / pixel_height,
    }
}
