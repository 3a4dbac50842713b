use std::fmt::Write;

use postura_vision::{Measure, Tilt};

use crate::examination::Examination;

/// Marker appended to values that fell back to zero.
pub const DEGENERATE_MARK: &str = "*";
pub const DEGENERATE_NOTE: &str = "* valeur non calculable, mise à zéro";

pub fn format_tilt(tilt: &Tilt) -> String {
    format!(
        "{:.1}° ({:.1} cm{})",
        tilt.angle_deg,
        tilt.offset_cm.value(),
        mark(&tilt.offset_cm)
    )
}

pub fn format_angle(angle: &Measure) -> String {
    format!("{:.1}°{}", angle.value(), mark(angle))
}

fn mark(m: &Measure) -> &'static str {
    if m.is_degenerate() {
        DEGENERATE_MARK
    } else {
        ""
    }
}

/// Labelled rows shared by the terminal summary and the PDF.
pub struct Sections {
    pub tilts: [(&'static str, String); 2],
    pub joints: [(&'static str, String); 4],
}

pub fn sections(exam: &Examination) -> Sections {
    let r = &exam.report;
    Sections {
        tilts: [
            ("Épaules", format_tilt(&r.shoulders)),
            ("Bassin", format_tilt(&r.pelvis)),
        ],
        joints: [
            ("Genou G", format_angle(&r.joints.left_knee)),
            ("Genou D", format_angle(&r.joints.right_knee)),
            ("Cheville G", format_angle(&r.joints.left_ankle)),
            ("Cheville D", format_angle(&r.joints.right_ankle)),
        ],
    }
}

/// Plain-text report for the terminal.
pub fn render(exam: &Examination) -> String {
    let s = sections(exam);
    let mut out = String::new();

    let _ = writeln!(out, "Patient : {}", exam.report.patient);
    let _ = writeln!(out, "Date : {}", exam.date_label());
    let _ = writeln!(out, "Taille déclarée : {:.0} cm", exam.report.declared_height_cm);
    let _ = writeln!(out);
    let _ = writeln!(out, "Mesures de bascule");
    for (label, value) in &s.tilts {
        let _ = writeln!(out, "  - {} : {}", label, value);
    }
    let _ = writeln!(out, "Angles articulaires");
    for (label, value) in &s.joints {
        let _ = writeln!(out, "  - {} : {}", label, value);
    }
    if !exam.report.degenerate_fields().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", DEGENERATE_NOTE);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use postura_vision::report::build_report;
    use postura_vision::{Landmark, LandmarkSet, PoseLandmark};

    fn exam(landmarks: [Landmark; PoseLandmark::COUNT]) -> Examination {
        Examination::new(build_report(
            &LandmarkSet::new(landmarks),
            "Jean Dupont",
            175.0,
            1000,
        ))
    }

    fn posed() -> [Landmark; PoseLandmark::COUNT] {
        let mut lm = [Landmark::new(0.5, 0.5); PoseLandmark::COUNT];
        lm[PoseLandmark::Nose.index()] = Landmark::new(0.5, 0.1);
        lm[PoseLandmark::LeftShoulder.index()] = Landmark::new(0.62, 0.26);
        lm[PoseLandmark::RightShoulder.index()] = Landmark::new(0.38, 0.25);
        lm[PoseLandmark::LeftHip.index()] = Landmark::new(0.58, 0.52);
        lm[PoseLandmark::RightHip.index()] = Landmark::new(0.42, 0.52);
        lm[PoseLandmark::LeftKnee.index()] = Landmark::new(0.58, 0.70);
        lm[PoseLandmark::RightKnee.index()] = Landmark::new(0.42, 0.70);
        lm[PoseLandmark::LeftAnkle.index()] = Landmark::new(0.58, 0.86);
        lm[PoseLandmark::RightAnkle.index()] = Landmark::new(0.42, 0.86);
        lm[PoseLandmark::LeftHeel.index()] = Landmark::new(0.57, 0.90);
        lm[PoseLandmark::RightHeel.index()] = Landmark::new(0.43, 0.90);
        lm
    }

    #[test]
    fn test_format_values() {
        assert_eq!(format_angle(&Measure::Computed(90.04)), "90.0°");
        assert_eq!(format_angle(&Measure::Degenerate), "0.0°*");

        let tilt = Tilt {
            angle_deg: -2.46,
            offset_cm: Measure::Computed(1.24),
        };
        assert_eq!(format_tilt(&tilt), "-2.5° (1.2 cm)");
    }

    #[test]
    fn test_render_lists_every_measurement() {
        let text = render(&exam(posed()));
        assert!(text.contains("Patient : Jean Dupont"));
        for label in ["Épaules", "Bassin", "Genou G", "Genou D", "Cheville G", "Cheville D"] {
            assert!(text.contains(label), "missing {}", label);
        }
        assert!(text.contains("Genou G : 180.0°"));
        assert!(text.contains("(2.2 cm)"));
        assert!(!text.contains(DEGENERATE_NOTE));
    }

    #[test]
    fn test_render_flags_degenerate_values() {
        let text = render(&exam([Landmark::new(0.5, 0.5); PoseLandmark::COUNT]));
        assert!(text.contains("0.0°*"));
        assert!(text.contains(DEGENERATE_NOTE));
    }
}
