use image::{Rgb, RgbImage};

use crate::landmark::{LandmarkSet, POSE_CONNECTIONS};

pub const LANDMARK_COLOR: Rgb<u8> = Rgb([0x00, 0xFF, 0x00]);
pub const SKELETON_COLOR: Rgb<u8> = Rgb([0xFF, 0xFF, 0x00]);
pub const LOW_VISIBILITY_COLOR: Rgb<u8> = Rgb([0xFF, 0x00, 0x00]);

#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub point_radius: i32,
    pub line_thickness: i32,
    /// Landmarks below this visibility are drawn in [`LOW_VISIBILITY_COLOR`]
    pub visibility_threshold: f64,
}

impl OverlayStyle {
    /// Sizes proportional to the image so the skeleton stays legible at any resolution.
    pub fn for_image(width: u32, height: u32) -> Self {
        let base = (width.min(height) / 200).max(1) as i32;
        Self {
            point_radius: base * 2,
            line_thickness: base,
            visibility_threshold: 0.5,
        }
    }
}

/// Draw the skeleton and landmark points onto `img` in place.
pub fn draw_skeleton(img: &mut RgbImage, landmarks: &LandmarkSet, style: &OverlayStyle) {
    let (w, h) = img.dimensions();

    for &(from, to) in POSE_CONNECTIONS.iter() {
        let a = landmarks.get(from).to_pixel(w, h);
        let b = landmarks.get(to).to_pixel(w, h);
        draw_line(img, a, b, style.line_thickness, SKELETON_COLOR);
    }

    for (_, lm) in landmarks.iter() {
        let color = if lm.visibility < style.visibility_threshold {
            LOW_VISIBILITY_COLOR
        } else {
            LANDMARK_COLOR
        };
        draw_disc(img, lm.to_pixel(w, h), style.point_radius, color);
    }
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_disc(img: &mut RgbImage, center: (i32, i32), radius: i32, color: Rgb<u8>) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

// Bresenham, stamping a square brush for thickness
fn draw_line(img: &mut RgbImage, a: (i32, i32), b: (i32, i32), thickness: i32, color: Rgb<u8>) {
    let (mut x, mut y) = a;
    let dx = (b.0 - a.0).abs();
    let dy = -(b.1 - a.1).abs();
    let sx = if a.0 < b.0 { 1 } else { -1 };
    let sy = if a.1 < b.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let half = thickness / 2;

    loop {
        for oy in -half..=half {
            for ox in -half..=half {
                put(img, x + ox, y + oy, color);
            }
        }
        if x == b.0 && y == b.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
