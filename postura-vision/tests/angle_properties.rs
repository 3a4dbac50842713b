use postura_vision::geometry::{angle_at, tilt, Measure};
use postura_vision::{Calibration, Landmark};

fn p(x: f64, y: f64) -> Landmark {
    Landmark::new(x, y)
}

fn sample_points() -> Vec<Landmark> {
    let coords = [0.0, 0.13, 0.37, 0.5, 0.71, 0.94, 1.0];
    let mut points = Vec::new();
    for (i, &x) in coords.iter().enumerate() {
        for &y in coords.iter().skip(i % 3) {
            points.push(p(x, y));
        }
    }
    points
}

#[test]
fn angle_stays_within_half_turn() {
    let points = sample_points();
    for a in &points {
        for v in points.iter().step_by(5) {
            for b in points.iter().step_by(3) {
                let angle = angle_at(a, v, b).value();
                assert!(
                    (0.0..=180.0).contains(&angle),
                    "angle {} out of range for {:?} {:?} {:?}",
                    angle,
                    a,
                    v,
                    b
                );
            }
        }
    }
}

#[test]
fn angle_is_symmetric_in_outer_points() {
    let points = sample_points();
    for a in points.iter().step_by(2) {
        for v in points.iter().step_by(7) {
            for b in points.iter().step_by(4) {
                assert_eq!(angle_at(a, v, b), angle_at(b, v, a));
            }
        }
    }
}

#[test]
fn opposite_rays_give_straight_angle() {
    let angle = angle_at(&p(0.1, 0.1), &p(0.4, 0.4), &p(0.7, 0.7));
    assert!((angle.value() - 180.0).abs() < 1e-6);
}

#[test]
fn coincident_rays_give_zero() {
    let angle = angle_at(&p(0.6, 0.2), &p(0.2, 0.2), &p(0.9, 0.2));
    assert!(angle.value().abs() < 1e-6);
    assert!(matches!(angle, Measure::Computed(_)));
}

#[test]
fn vertex_on_outer_point_is_exactly_zero() {
    let v = p(0.42, 0.58);
    assert_eq!(angle_at(&v, &v, &p(0.1, 0.9)).value(), 0.0);
    assert_eq!(angle_at(&p(0.1, 0.9), &v, &v).value(), 0.0);
    assert!(angle_at(&v, &v, &v).is_degenerate());
}

#[test]
fn tilt_angle_flips_when_points_swap() {
    let cal = Calibration::Scaled { cm_per_pixel: 0.3 };
    let pairs = [
        (p(0.62, 0.31), p(0.38, 0.29)),
        (p(0.60, 0.25), p(0.41, 0.33)),
        (p(0.55, 0.52), p(0.45, 0.52)),
    ];

    for (l, r) in pairs {
        let forward = tilt(&l, &r, 900, cal);
        let backward = tilt(&r, &l, 900, cal);

        // atan2 of the negated vector differs by a half turn
        let diff = (forward.angle_deg - backward.angle_deg).abs();
        assert!((diff - 180.0).abs() < 1e-9, "diff was {}", diff);
        assert_eq!(forward.offset_cm, backward.offset_cm);
    }
}

#[test]
fn tilt_sign_follows_atan2() {
    let cal = Calibration::Scaled { cm_per_pixel: 1.0 };
    // left point lower in the image (larger y) and to the right
    let down = tilt(&p(0.6, 0.35), &p(0.4, 0.30), 100, cal);
    assert!(down.angle_deg > 0.0 && down.angle_deg < 90.0);

    let up = tilt(&p(0.6, 0.25), &p(0.4, 0.30), 100, cal);
    assert!(up.angle_deg < 0.0 && up.angle_deg > -90.0);
}
