pub mod config;
pub mod examination;
pub mod intake;
pub mod pdf;
pub mod summary;

// Re-export vision types for convenience
pub use postura_vision::{
    geometry, landmark, report, Analysis, BlazePoseDetector, Detector, LandmarkSet, Pipeline,
    PostureReport,
};
