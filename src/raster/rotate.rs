//! Rotation of RGBA rasters with canvas expansion.

use crate::raster::sample::{sample_bicubic, unpremultiply};
use crate::util::math::sin_cos_deg;
use image::RgbaImage;

/// Returns the size of the smallest canvas holding a `width`×`height`
/// image rotated by `angle_deg`.
pub fn expanded_size(width: u32, height: u32, angle_deg: f64) -> (u32, u32) {
    let (sin_a, cos_a) = sin_cos_deg(angle_deg);
    let (sin_a, cos_a) = (sin_a.abs(), cos_a.abs());
    let w = f64::from(width);
    let h = f64::from(height);
    // Drop float noise so 90° turns land on exact sizes.
    let new_w = (w * cos_a + h * sin_a - 1e-6).ceil().max(1.0);
    let new_h = (w * sin_a + h * cos_a - 1e-6).ceil().max(1.0);
    (new_w as u32, new_h as u32)
}

/// Rotates an RGBA image about its center with bicubic sampling.
///
/// Positive angles turn the content counter-clockwise as displayed (image
/// y axis pointing down). The output canvas grows to hold every rotated
/// corner; uncovered pixels are fully transparent. Rotation center is
/// `cx = (w - 1) / 2`, `cy = (h - 1) / 2` in pixel-index coordinates, and
/// each destination pixel is mapped back through the inverse rotation.
pub fn rotate_expand(src: &RgbaImage, angle_deg: f64) -> RgbaImage {
    if angle_deg == 0.0 || src.width() == 0 || src.height() == 0 {
        return src.clone();
    }

    let (out_w, out_h) = expanded_size(src.width(), src.height(), angle_deg);
    let (sin_a, cos_a) = sin_cos_deg(angle_deg);
    let cx = (f64::from(src.width()) - 1.0) * 0.5;
    let cy = (f64::from(src.height()) - 1.0) * 0.5;
    let ocx = (f64::from(out_w) - 1.0) * 0.5;
    let ocy = (f64::from(out_h) - 1.0) * 0.5;

    let mut out = RgbaImage::new(out_w, out_h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = f64::from(x) - ocx;
        let dy = f64::from(y) - ocy;
        let src_x = cos_a * dx - sin_a * dy + cx;
        let src_y = sin_a * dx + cos_a * dy + cy;
        *px = unpremultiply(sample_bicubic(src, src_x, src_y));
    }
    out
}
