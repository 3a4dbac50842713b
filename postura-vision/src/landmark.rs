//! 33-point body landmark topology (BlazePose ordering).
//!
//! Every landmark index used anywhere in the crate goes through [`PoseLandmark`];
//! nothing outside this module indexes the raw array.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    pub const ALL: [PoseLandmark; PoseLandmark::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Skeleton edges used by the overlay renderer.
pub const POSE_CONNECTIONS: [(PoseLandmark, PoseLandmark); 35] = {
    use PoseLandmark::*;
    [
        // face
        (Nose, LeftEyeInner),
        (LeftEyeInner, LeftEye),
        (LeftEye, LeftEyeOuter),
        (LeftEyeOuter, LeftEar),
        (Nose, RightEyeInner),
        (RightEyeInner, RightEye),
        (RightEye, RightEyeOuter),
        (RightEyeOuter, RightEar),
        (MouthLeft, MouthRight),
        // arms
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftWrist, LeftPinky),
        (LeftWrist, LeftIndex),
        (LeftWrist, LeftThumb),
        (LeftPinky, LeftIndex),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightWrist, RightPinky),
        (RightWrist, RightIndex),
        (RightWrist, RightThumb),
        (RightPinky, RightIndex),
        // torso
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        // legs
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (LeftAnkle, LeftHeel),
        (LeftHeel, LeftFootIndex),
        (LeftAnkle, LeftFootIndex),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
        (RightAnkle, RightHeel),
        (RightHeel, RightFootIndex),
        (RightAnkle, RightFootIndex),
    ]
};

/// Single landmark in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Fraction of image width (0.0..=1.0)
    pub x: f64,
    /// Fraction of image height (0.0..=1.0)
    pub y: f64,
    /// Relative depth, carried through but unused by the metrics
    pub z: f64,
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let px = (self.x * width as f64).round() as i32;
        let py = (self.y * height as f64).round() as i32;
        (px, py)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongCount { expected: usize, actual: usize },
}

/// Complete landmark set for one person in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    #[serde(with = "landmark_array")]
    landmarks: [Landmark; PoseLandmark::COUNT],
}

impl LandmarkSet {
    pub fn new(landmarks: [Landmark; PoseLandmark::COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn from_slice(landmarks: &[Landmark]) -> Result<Self, LandmarkError> {
        let landmarks: [Landmark; PoseLandmark::COUNT] =
            landmarks.try_into().map_err(|_| LandmarkError::WrongCount {
                expected: PoseLandmark::COUNT,
                actual: landmarks.len(),
            })?;
        Ok(Self { landmarks })
    }

    pub fn get(&self, which: PoseLandmark) -> &Landmark {
        &self.landmarks[which.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoseLandmark, &Landmark)> {
        PoseLandmark::ALL.iter().copied().zip(self.landmarks.iter())
    }

    pub fn nose(&self) -> &Landmark {
        self.get(PoseLandmark::Nose)
    }

    pub fn left_shoulder(&self) -> &Landmark {
        self.get(PoseLandmark::LeftShoulder)
    }

    pub fn right_shoulder(&self) -> &Landmark {
        self.get(PoseLandmark::RightShoulder)
    }

    pub fn left_hip(&self) -> &Landmark {
        self.get(PoseLandmark::LeftHip)
    }

    pub fn right_hip(&self) -> &Landmark {
        self.get(PoseLandmark::RightHip)
    }

    pub fn left_knee(&self) -> &Landmark {
        self.get(PoseLandmark::LeftKnee)
    }

    pub fn right_knee(&self) -> &Landmark {
        self.get(PoseLandmark::RightKnee)
    }

    pub fn left_ankle(&self) -> &Landmark {
        self.get(PoseLandmark::LeftAnkle)
    }

    pub fn right_ankle(&self) -> &Landmark {
        self.get(PoseLandmark::RightAnkle)
    }

    pub fn left_heel(&self) -> &Landmark {
        self.get(PoseLandmark::LeftHeel)
    }

    pub fn right_heel(&self) -> &Landmark {
        self.get(PoseLandmark::RightHeel)
    }

    /// Lowest visibility among the given landmarks.
    pub fn min_visibility(&self, which: &[PoseLandmark]) -> f64 {
        which
            .iter()
            .map(|&w| self.get(w).visibility)
            .fold(1.0, f64::min)
    }
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); PoseLandmark::COUNT],
        }
    }
}

// serde only derives fixed arrays up to 32 elements.
mod landmark_array {
    use super::{Landmark, PoseLandmark};
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        landmarks: &[Landmark; PoseLandmark::COUNT],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        landmarks.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[Landmark; PoseLandmark::COUNT], D::Error> {
        let v = Vec::<Landmark>::deserialize(deserializer)?;
        let len = v.len();
        v.try_into()
            .map_err(|_| D::Error::invalid_length(len, &"33 landmarks"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_count() {
        assert_eq!(PoseLandmark::COUNT, 33);
        assert_eq!(PoseLandmark::ALL.len(), PoseLandmark::COUNT);
    }

    #[test]
    fn test_index_table_matches_discriminants() {
        for (i, lm) in PoseLandmark::ALL.iter().enumerate() {
            assert_eq!(lm.index(), i);
            assert_eq!(PoseLandmark::from_index(i), Some(*lm));
        }
        assert_eq!(PoseLandmark::from_index(33), None);
    }

    #[test]
    fn test_anatomical_indices() {
        assert_eq!(PoseLandmark::LeftShoulder.index(), 11);
        assert_eq!(PoseLandmark::RightShoulder.index(), 12);
        assert_eq!(PoseLandmark::LeftHip.index(), 23);
        assert_eq!(PoseLandmark::RightHip.index(), 24);
        assert_eq!(PoseLandmark::LeftKnee.index(), 25);
        assert_eq!(PoseLandmark::RightKnee.index(), 26);
        assert_eq!(PoseLandmark::LeftAnkle.index(), 27);
        assert_eq!(PoseLandmark::RightAnkle.index(), 28);
        assert_eq!(PoseLandmark::LeftHeel.index(), 29);
        assert_eq!(PoseLandmark::RightHeel.index(), 30);
    }

    #[test]
    fn test_from_slice_rejects_partial_sets() {
        let short = vec![Landmark::default(); 17];
        assert_eq!(
            LandmarkSet::from_slice(&short),
            Err(LandmarkError::WrongCount {
                expected: 33,
                actual: 17
            })
        );

        let full = vec![Landmark::new(0.5, 0.5); 33];
        assert!(LandmarkSet::from_slice(&full).is_ok());
    }

    #[test]
    fn test_named_accessors() {
        let mut landmarks = [Landmark::default(); PoseLandmark::COUNT];
        landmarks[11] = Landmark::new(0.4, 0.3);
        landmarks[30] = Landmark::new(0.6, 0.9);
        let set = LandmarkSet::new(landmarks);

        assert_eq!(set.left_shoulder().x, 0.4);
        assert_eq!(set.right_heel().y, 0.9);
    }

    #[test]
    fn test_to_pixel() {
        let lm = Landmark::new(0.5, 0.25);
        assert_eq!(lm.to_pixel(640, 480), (320, 120));
    }

    #[test]
    fn test_min_visibility() {
        let mut landmarks = [Landmark::default().with_visibility(0.9); PoseLandmark::COUNT];
        landmarks[PoseLandmark::LeftKnee.index()].visibility = 0.2;
        let set = LandmarkSet::new(landmarks);

        let v = set.min_visibility(&[PoseLandmark::LeftHip, PoseLandmark::LeftKnee]);
        assert!((v - 0.2).abs() < 1e-12);
        assert!((set.min_visibility(&[PoseLandmark::Nose]) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_json_roundtrip_keeps_all_landmarks() {
        let set = LandmarkSet::new([Landmark::new(0.1, 0.2); PoseLandmark::COUNT]);
        let json = serde_json::to_string(&set).unwrap();
        let back: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
    }
}
