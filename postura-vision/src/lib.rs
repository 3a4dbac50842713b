pub mod calibration;
pub mod detector;
pub mod geometry;
pub mod landmark;
pub mod model;
pub mod overlay;
pub mod pipeline;
pub mod report;
pub mod video;

// Re-export commonly used types
pub use calibration::Calibration;
pub use detector::{BlazePoseDetector, Detector};
pub use geometry::{Measure, Tilt};
pub use landmark::{Landmark, LandmarkSet, PoseLandmark};
pub use pipeline::{Analysis, Pipeline};
pub use report::PostureReport;
pub use video::Camera;
