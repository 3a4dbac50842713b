use serde::{Deserialize, Serialize};

use crate::calibration::{self, Calibration};
use crate::geometry::{self, Measure, Tilt};
use crate::landmark::{LandmarkSet, PoseLandmark};

pub const ANONYMOUS_PATIENT: &str = "Anonyme";

/// Landmarks the report is computed from.
pub const REPORT_LANDMARKS: [PoseLandmark; 11] = [
    PoseLandmark::Nose,
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
    PoseLandmark::LeftHeel,
    PoseLandmark::RightHeel,
];

/// Three landmarks whose middle one is the joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriple {
    pub proximal: PoseLandmark,
    pub joint: PoseLandmark,
    pub distal: PoseLandmark,
}

impl JointTriple {
    const fn new(proximal: PoseLandmark, joint: PoseLandmark, distal: PoseLandmark) -> Self {
        Self {
            proximal,
            joint,
            distal,
        }
    }

    pub fn measure(&self, landmarks: &LandmarkSet) -> Measure {
        geometry::angle_at(
            landmarks.get(self.proximal),
            landmarks.get(self.joint),
            landmarks.get(self.distal),
        )
    }
}

pub const LEFT_KNEE: JointTriple = JointTriple::new(
    PoseLandmark::LeftHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::LeftAnkle,
);
pub const RIGHT_KNEE: JointTriple = JointTriple::new(
    PoseLandmark::RightHip,
    PoseLandmark::RightKnee,
    PoseLandmark::RightAnkle,
);
pub const LEFT_ANKLE: JointTriple = JointTriple::new(
    PoseLandmark::LeftKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::LeftHeel,
);
pub const RIGHT_ANKLE: JointTriple = JointTriple::new(
    PoseLandmark::RightKnee,
    PoseLandmark::RightAnkle,
    PoseLandmark::RightHeel,
);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    pub left_knee: Measure,
    pub right_knee: Measure,
    pub left_ankle: Measure,
    pub right_ankle: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureReport {
    pub patient: String,
    pub declared_height_cm: f64,
    pub calibration: Calibration,
    pub shoulders: Tilt,
    pub pelvis: Tilt,
    pub joints: JointAngles,
    /// Lowest detector visibility among [`REPORT_LANDMARKS`]
    pub min_visibility: f64,
}

impl PostureReport {
    /// Names of the fields that fell back to zero.
    pub fn degenerate_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("shoulders.offset_cm", self.shoulders.offset_cm),
            ("pelvis.offset_cm", self.pelvis.offset_cm),
            ("joints.left_knee", self.joints.left_knee),
            ("joints.right_knee", self.joints.right_knee),
            ("joints.left_ankle", self.joints.left_ankle),
            ("joints.right_ankle", self.joints.right_ankle),
        ];
        fields
            .into_iter()
            .filter(|(_, m)| m.is_degenerate())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_low_confidence(&self, visibility_threshold: f64) -> bool {
        self.min_visibility < visibility_threshold || !self.degenerate_fields().is_empty()
    }
}

pub fn patient_label(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        ANONYMOUS_PATIENT.to_string()
    } else {
        name.to_string()
    }
}

/// Compute the full posture report for one detected person.
pub fn build_report(
    landmarks: &LandmarkSet,
    patient_name: &str,
    declared_height_cm: f64,
    image_pixel_height: u32,
) -> PostureReport {
    let calibration =
        calibration::compute_scale(landmarks, declared_height_cm, image_pixel_height);

    let shoulders = geometry::tilt(
        landmarks.left_shoulder(),
        landmarks.right_shoulder(),
        image_pixel_height,
        calibration,
    );
    let pelvis = geometry::tilt(
        landmarks.left_hip(),
        landmarks.right_hip(),
        image_pixel_height,
        calibration,
    );

    let joints = JointAngles {
        left_knee: LEFT_KNEE.measure(landmarks),
        right_knee: RIGHT_KNEE.measure(landmarks),
        left_ankle: LEFT_ANKLE.measure(landmarks),
        right_ankle: RIGHT_ANKLE.measure(landmarks),
    };

    PostureReport {
        patient: patient_label(patient_name),
        declared_height_cm,
        calibration,
        shoulders,
        pelvis,
        joints,
        min_visibility: landmarks.min_visibility(&REPORT_LANDMARKS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;

    #[test]
    fn test_patient_label_defaults() {
        assert_eq!(patient_label(""), "Anonyme");
        assert_eq!(patient_label("   "), "Anonyme");
        assert_eq!(patient_label(" Jean Dupont "), "Jean Dupont");
    }

    #[test]
    fn test_joint_triples_are_anatomical() {
        assert_eq!(LEFT_KNEE.joint, PoseLandmark::LeftKnee);
        assert_eq!(RIGHT_KNEE.proximal, PoseLandmark::RightHip);
        assert_eq!(LEFT_ANKLE.distal, PoseLandmark::LeftHeel);
        assert_eq!(RIGHT_ANKLE.joint, PoseLandmark::RightAnkle);
    }

    #[test]
    fn test_all_coincident_landmarks() {
        let set = LandmarkSet::new([Landmark::new(0.5, 0.5); PoseLandmark::COUNT]);
        let report = build_report(&set, "", 170.0, 720);

        assert_eq!(report.patient, "Anonyme");
        assert!(report.calibration.is_degenerate());
        assert_eq!(report.degenerate_fields().len(), 6);
        assert_eq!(report.joints.left_knee.value(), 0.0);
        assert!(report.is_low_confidence(0.5));
    }
}
