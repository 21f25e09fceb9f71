//! RGBA raster utilities built on `image::RgbaImage`.
//!
//! Coordinates follow the image convention: x grows to the right, y grows
//! downwards, and pixel `(i, j)` has its center at `(i, j)` when sampled
//! continuously. Resizing delegates to `image::imageops`; rotation, warping
//! and compositing are implemented here so their conventions stay explicit.

use image::imageops::{self, FilterType};
use image::RgbaImage;

pub mod blend;
pub mod blur;
pub mod io;
pub mod rotate;
pub(crate) mod sample;

/// Resizes to exactly `width`×`height` (each clamped to at least 1).
pub fn resize(src: &RgbaImage, width: u32, height: u32, filter: FilterType) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    imageops::resize(src, width, height, filter)
}

/// Scales `src` to fully cover `width`×`height`, then center-crops to it.
///
/// The scale factor is the larger of the two axis ratios. Enlarging uses
/// Catmull-Rom, shrinking uses Lanczos3.
pub fn cover_fill(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let sx = f64::from(width) / f64::from(src.width().max(1));
    let sy = f64::from(height) / f64::from(src.height().max(1));
    let scale = sx.max(sy);
    let filter = if scale > 1.0 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    };

    let scaled_w = ((f64::from(src.width()) * scale).round() as u32).max(width);
    let scaled_h = ((f64::from(src.height()) * scale).round() as u32).max(height);
    let scaled = resize(src, scaled_w, scaled_h, filter);

    let left = (scaled_w - width) / 2;
    let top = (scaled_h - height) / 2;
    imageops::crop_imm(&scaled, left, top, width, height).to_image()
}
