//! Bicubic sampling in premultiplied space with a transparent border.

use crate::util::math::cubic_weights;
use image::{Rgba, RgbaImage};

/// Premultiplied RGBA sample with channels in `[0, 255]`.
pub(crate) type Premul = [f64; 4];

/// Samples `src` at continuous pixel-index coordinates `(x, y)`.
///
/// Pixel `(i, j)` has its center at `(i, j)`. Taps outside the image are
/// transparent, so edges fade out instead of smearing. Color channels are
/// weighted by alpha before filtering to avoid dark fringes.
pub(crate) fn sample_bicubic(src: &RgbaImage, x: f64, y: f64) -> Premul {
    let width = src.width() as i64;
    let height = src.height() as i64;
    if !x.is_finite() || !y.is_finite() {
        return [0.0; 4];
    }
    if x < -2.0 || y < -2.0 || x > width as f64 + 1.0 || y > height as f64 + 1.0 {
        return [0.0; 4];
    }

    let fx = x.floor();
    let fy = y.floor();
    let wx = cubic_weights(x - fx);
    let wy = cubic_weights(y - fy);
    let x0 = fx as i64 - 1;
    let y0 = fy as i64 - 1;

    let mut acc = [0.0f64; 4];
    for (j, wyj) in wy.iter().enumerate() {
        let sy = y0 + j as i64;
        if sy < 0 || sy >= height || *wyj == 0.0 {
            continue;
        }
        for (i, wxi) in wx.iter().enumerate() {
            let sx = x0 + i as i64;
            if sx < 0 || sx >= width {
                continue;
            }
            let w = wxi * wyj;
            if w == 0.0 {
                continue;
            }
            let px = src.get_pixel(sx as u32, sy as u32).0;
            let a = f64::from(px[3]);
            if a == 0.0 {
                continue;
            }
            let k = a / 255.0;
            acc[0] += w * f64::from(px[0]) * k;
            acc[1] += w * f64::from(px[1]) * k;
            acc[2] += w * f64::from(px[2]) * k;
            acc[3] += w * a;
        }
    }
    acc
}

/// Converts a premultiplied sample back to a straight-alpha pixel.
///
/// Cubic overshoot is clamped so color never exceeds coverage.
pub(crate) fn unpremultiply(p: Premul) -> Rgba<u8> {
    let alpha = p[3].clamp(0.0, 255.0);
    if alpha < 0.5 {
        return Rgba([0, 0, 0, 0]);
    }
    let scale = 255.0 / alpha;
    let channel = |c: f64| (c.clamp(0.0, alpha) * scale).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(p[0]),
        channel(p[1]),
        channel(p[2]),
        alpha.round() as u8,
    ])
}
