use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView, RgbImage};

use crate::detector::Detector;
use crate::landmark::LandmarkSet;
use crate::overlay::{self, OverlayStyle};
use crate::report::{self, PostureReport};

/// Result of analyzing one photograph.
#[derive(Debug, Clone)]
pub enum Analysis {
    Measured {
        report: PostureReport,
        landmarks: LandmarkSet,
        /// Source image with the skeleton drawn on
        annotated: RgbImage,
    },
    /// The detector found nobody; no report is produced.
    NoPersonDetected,
}

/// Full pipeline: detect landmarks → calibrate → measure → annotate
pub struct Pipeline<D> {
    pub detector: D,
}

impl<D: Detector> Pipeline<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn analyze(
        &mut self,
        img: &DynamicImage,
        patient_name: &str,
        declared_height_cm: f64,
    ) -> Result<Analysis> {
        let landmarks = match self.detector.detect(img).context("detecting pose")? {
            Some(landmarks) => landmarks,
            None => return Ok(Analysis::NoPersonDetected),
        };

        let (width, height) = img.dimensions();
        let report = report::build_report(&landmarks, patient_name, declared_height_cm, height);

        let mut annotated = img.to_rgb8();
        overlay::draw_skeleton(
            &mut annotated,
            &landmarks,
            &OverlayStyle::for_image(width, height),
        );

        Ok(Analysis::Measured {
            report,
            landmarks,
            annotated,
        })
    }
}
