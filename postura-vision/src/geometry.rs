use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::landmark::Landmark;

/// A metric that either computed normally or fell back to zero on degenerate geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Measure {
    Computed(f64),
    Degenerate,
}

impl Measure {
    pub fn value(&self) -> f64 {
        match self {
            Measure::Computed(v) => *v,
            Measure::Degenerate => 0.0,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Measure::Degenerate)
    }
}

/// Interior angle at `vertex`, in degrees, between the rays towards `a` and `b`.
///
/// Always in [0, 180]. A ray of zero length gives [`Measure::Degenerate`].
pub fn angle_at(a: &Landmark, vertex: &Landmark, b: &Landmark) -> Measure {
    let v1 = (a.x - vertex.x, a.y - vertex.y);
    let v2 = (b.x - vertex.x, b.y - vertex.y);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if mag1 == 0.0 || mag2 == 0.0 {
        return Measure::Degenerate;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Measure::Computed(cos.acos().to_degrees())
}

/// Tilt of the line joining a left/right landmark pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tilt {
    /// Signed, `atan2(left.y - right.y, left.x - right.x)` in degrees
    pub angle_deg: f64,
    /// Vertical separation of the pair in centimeters
    pub offset_cm: Measure,
}

pub fn tilt(
    left: &Landmark,
    right: &Landmark,
    image_pixel_height: u32,
    calibration: Calibration,
) -> Tilt {
    let dy = left.y - right.y;
    let dx = left.x - right.x;
    let angle_deg = dy.atan2(dx).to_degrees();

    let offset_cm = match calibration {
        Calibration::Scaled { cm_per_pixel } => {
            Measure::Computed(dy.abs() * image_pixel_height as f64 * cm_per_pixel)
        }
        Calibration::Degenerate => Measure::Degenerate,
    };

    Tilt {
        angle_deg,
        offset_cm,
    }
}
