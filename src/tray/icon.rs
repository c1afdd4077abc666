//! Nested-arc tray icon: outer arc for weekly, inner arc for session.
//!
//! Both arcs sweep 270° clockwise from the lower-left (135°, measured from
//! 3 o'clock with y pointing down). A faint full-length track sits under the
//! filled portion, which is proportional to remaining capacity.

use std::path::Path;

use image::{ImageFormat, ImageResult, Rgba, RgbaImage};

/// Icon edge in pixels
pub const ICON_SIZE: u32 = 22;

const START_ANGLE: f64 = 135.0;
const SWEEP: f64 = 270.0;
const STROKE: f64 = 2.0;
const OUTER_RADIUS: f64 = 10.0;
const INNER_RADIUS: f64 = OUTER_RADIUS - 5.0;

const TRACK: Rgba<u8> = Rgba([0, 0, 0, 70]);
const FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Render the icon for the given remaining percentages
pub fn render_icon(session_remaining: f64, weekly_remaining: f64) -> RgbaImage {
    let mut img = RgbaImage::new(ICON_SIZE, ICON_SIZE);
    draw_arc(&mut img, OUTER_RADIUS, weekly_remaining);
    draw_arc(&mut img, INNER_RADIUS, session_remaining);
    img
}

/// Write the icon as PNG
pub fn save_icon(img: &RgbaImage, path: &Path) -> ImageResult<()> {
    img.save_with_format(path, ImageFormat::Png)
}

fn draw_arc(img: &mut RgbaImage, radius: f64, percent: f64) {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    let fill_sweep = percent / 100.0 * SWEEP;
    let center = (ICON_SIZE / 2) as f64;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = x as f64 + 0.5 - center;
        let dy = y as f64 + 0.5 - center;
        let distance = dx.hypot(dy);
        if distance < radius - STROKE || distance > radius {
            continue;
        }

        let offset = (dy.atan2(dx).to_degrees() - START_ANGLE).rem_euclid(360.0);
        if offset > SWEEP {
            continue;
        }
        *pixel = if percent > 0.0 && offset <= fill_sweep {
            FILL
        } else {
            TRACK
        };
    }
}
