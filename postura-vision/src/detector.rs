//! Pose landmark detection.
//!
//! [`Detector`] is the boundary the rest of the crate consumes: one image in, at most
//! one complete [`LandmarkSet`] out. [`BlazePoseDetector`] implements it on top of a
//! BlazePose "full" landmark model exported to ONNX:
//! - input: `[1, 256, 256, 3]` RGB, values in [0, 1]
//! - output 0: `[1, 195]`, 39 rows of (x, y, z, visibility, presence) in input pixels;
//!   the first 33 rows are body landmarks, the rest are auxiliary ROI points
//! - output 1: `[1, 1]` pose presence score
//!
//! The image is letterboxed to a square before inference and the landmarks are mapped
//! back to normalized coordinates of the original image.

use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use ort::{session::Session, value::Tensor};

use crate::landmark::{Landmark, LandmarkSet, PoseLandmark};

pub const INPUT_SIZE: u32 = 256;
const VALUES_PER_LANDMARK: usize = 5;

pub trait Detector {
    /// `Ok(None)` means no person was found; errors are reserved for inference failures.
    fn detect(&mut self, img: &DynamicImage) -> Result<Option<LandmarkSet>>;
}

/// Square padding applied to fit an image into the model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub target: u32,
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub width: u32,
    pub height: u32,
    scaled_width: u32,
    scaled_height: u32,
}

impl Letterbox {
    pub fn fit(width: u32, height: u32, target: u32) -> Self {
        let max_dim = width.max(height).max(1);
        let scale = target as f32 / max_dim as f32;
        let new_width = ((width as f32 * scale) as u32).min(target);
        let new_height = ((height as f32 * scale) as u32).min(target);
        Self {
            target,
            scale,
            offset_x: (target - new_width) / 2,
            offset_y: (target - new_height) / 2,
            width,
            height,
            scaled_width: new_width,
            scaled_height: new_height,
        }
    }

    pub fn scaled_size(&self) -> (u32, u32) {
        (self.scaled_width, self.scaled_height)
    }

    /// Model-input pixel coordinates to normalized coordinates of the source image.
    pub fn unmap(&self, x_px: f32, y_px: f32) -> (f64, f64) {
        let x = (x_px - self.offset_x as f32) / self.scale;
        let y = (y_px - self.offset_y as f32) / self.scale;
        (
            x as f64 / self.width.max(1) as f64,
            y as f64 / self.height.max(1) as f64,
        )
    }

    pub fn apply(&self, img: &DynamicImage) -> image::RgbImage {
        let (w, h) = self.scaled_size();
        let resized = img.resize_exact(w, h, image::imageops::FilterType::Triangle);
        let mut canvas = DynamicImage::new_rgb8(self.target, self.target);
        image::imageops::overlay(
            &mut canvas,
            &resized,
            self.offset_x as i64,
            self.offset_y as i64,
        );
        canvas.to_rgb8()
    }
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Decode the raw landmark tensor into a [`LandmarkSet`] of the source image.
pub fn decode_landmarks(raw: &[f32], letterbox: &Letterbox) -> Result<LandmarkSet> {
    let needed = PoseLandmark::COUNT * VALUES_PER_LANDMARK;
    if raw.len() < needed {
        anyhow::bail!(
            "landmark tensor too short: expected at least {} values, got {}",
            needed,
            raw.len()
        );
    }

    let landmarks: Vec<Landmark> = raw
        .chunks_exact(VALUES_PER_LANDMARK)
        .take(PoseLandmark::COUNT)
        .map(|row| {
            let (x, y) = letterbox.unmap(row[0], row[1]);
            Landmark {
                x,
                y,
                z: (row[2] / letterbox.target as f32) as f64,
                visibility: sigmoid(row[3]) as f64,
            }
        })
        .collect();

    Ok(LandmarkSet::from_slice(&landmarks)?)
}

pub struct BlazePoseDetector {
    session: Session,
    presence_threshold: f32,
}

impl BlazePoseDetector {
    pub fn new(model_path: &Path, presence_threshold: f32) -> Result<Self> {
        Ok(Self {
            session: crate::model::pose_session(model_path)?,
            presence_threshold,
        })
    }

    fn input_tensor(img: &image::RgbImage) -> Result<Tensor<f32>> {
        let size = INPUT_SIZE as usize;
        let data: Vec<f32> = img.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        let input_array = Array4::from_shape_vec((1, size, size, 3), data)?;
        Ok(Tensor::from_array(input_array)?)
    }
}

impl Detector for BlazePoseDetector {
    fn detect(&mut self, img: &DynamicImage) -> Result<Option<LandmarkSet>> {
        let (width, height) = img.dimensions();
        let letterbox = Letterbox::fit(width, height, INPUT_SIZE);
        let canvas = letterbox.apply(img);

        let input_tensor = Self::input_tensor(&canvas)?;
        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .context("pose inference")?;

        let mut raw_landmarks: Option<Vec<f32>> = None;
        let mut presence: Option<f32> = None;
        for (_name, output) in outputs.iter() {
            let (_shape, data) = output.try_extract_tensor::<f32>()?;
            if data.len() >= PoseLandmark::COUNT * VALUES_PER_LANDMARK && raw_landmarks.is_none() {
                raw_landmarks = Some(data.to_vec());
            } else if data.len() == 1 && presence.is_none() {
                presence = Some(data[0]);
            }
        }

        let raw = raw_landmarks.context("model produced no landmark tensor")?;
        // Older exports emit a logit instead of a probability.
        let score = presence
            .map(|p| if (0.0..=1.0).contains(&p) { p } else { sigmoid(p) })
            .unwrap_or(1.0);
        log::debug!("pose presence score {:.3}", score);

        if score < self.presence_threshold {
            return Ok(None);
        }

        decode_landmarks(&raw, &letterbox).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_portrait() {
        let lb = Letterbox::fit(512, 1024, 256);
        assert_eq!(lb.scaled_size(), (128, 256));
        assert_eq!(lb.offset_x, 64);
        assert_eq!(lb.offset_y, 0);
    }

    #[test]
    fn test_unmap_corners() {
        let lb = Letterbox::fit(512, 1024, 256);
        let (x0, y0) = lb.unmap(64.0, 0.0);
        assert!(x0.abs() < 1e-6 && y0.abs() < 1e-6);
        let (x1, y1) = lb.unmap(192.0, 256.0);
        assert!((x1 - 1.0).abs() < 1e-6 && (y1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_landmarks() -> Result<()> {
        let lb = Letterbox::fit(256, 256, 256);
        let mut raw = vec![0.0f32; 39 * VALUES_PER_LANDMARK];
        let row = PoseLandmark::LeftKnee.index() * VALUES_PER_LANDMARK;
        raw[row] = 64.0;
        raw[row + 1] = 192.0;
        raw[row + 3] = 10.0;

        let set = decode_landmarks(&raw, &lb)?;
        let knee = set.left_knee();
        assert!((knee.x - 0.25).abs() < 1e-6);
        assert!((knee.y - 0.75).abs() < 1e-6);
        assert!(knee.visibility > 0.99);
        assert!((set.nose().visibility - 0.5).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_decode_rejects_short_tensor() {
        let lb = Letterbox::fit(256, 256, 256);
        assert!(decode_landmarks(&[0.0; 20], &lb).is_err());
    }
}
