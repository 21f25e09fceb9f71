//! Perspective warping of an insert onto the canvas.

use crate::geometry::{Homography, Point};
use crate::raster::blend::mix_by_alpha;
use crate::raster::sample::{sample_bicubic, unpremultiply};
use image::RgbaImage;

/// Warps `src` onto `canvas` through `forward` (source → canvas) and blends
/// each canvas pixel with the warped color, weighted by the warped alpha.
/// Canvas alpha is left unchanged.
///
/// Only the canvas area covered by the image of `src` is visited; samples
/// falling outside `src` are transparent. Returns the number of canvas
/// pixels that received a non-zero weight.
pub fn warp_blend(canvas: &mut RgbaImage, src: &RgbaImage, forward: &Homography) -> usize {
    let Some(inverse) = invert(forward, src) else {
        return 0;
    };
    let Some((x0, y0, x1, y1)) = covered_box(canvas, src, forward) else {
        return 0;
    };

    let mut touched = 0usize;
    for y in y0..y1 {
        for x in x0..x1 {
            let Some(s) = inverse.apply(Point::new(f64::from(x), f64::from(y))) else {
                continue;
            };
            let px = unpremultiply(sample_bicubic(src, s.x, s.y));
            if px[3] == 0 {
                continue;
            }
            let dst = canvas.get_pixel_mut(x, y);
            *dst = mix_by_alpha(*dst, px);
            touched += 1;
        }
    }
    touched
}

/// Canvas → source transform, solved from the mapped source corners.
fn invert(forward: &Homography, src: &RgbaImage) -> Option<Homography> {
    let corners = source_corners(src);
    let mapped = mapped_corners(forward, src)?;
    Homography::from_quads(mapped, corners)
}

fn source_corners(src: &RgbaImage) -> [Point; 4] {
    let w = f64::from(src.width());
    let h = f64::from(src.height());
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

fn mapped_corners(forward: &Homography, src: &RgbaImage) -> Option<[Point; 4]> {
    let c = source_corners(src);
    Some([
        forward.apply(c[0])?,
        forward.apply(c[1])?,
        forward.apply(c[2])?,
        forward.apply(c[3])?,
    ])
}

/// Bounding box (exclusive end) of the warped source, padded for the
/// bicubic footprint and clipped to the canvas.
fn covered_box(
    canvas: &RgbaImage,
    src: &RgbaImage,
    forward: &Homography,
) -> Option<(u32, u32, u32, u32)> {
    let cw = f64::from(canvas.width());
    let ch = f64::from(canvas.height());
    let corners = mapped_corners(forward, src)?;
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in corners {
        if !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let x0 = (min_x - 2.0).floor().clamp(0.0, cw);
    let y0 = (min_y - 2.0).floor().clamp(0.0, ch);
    let x1 = (max_x + 3.0).ceil().clamp(0.0, cw);
    let y1 = (max_y + 3.0).ceil().clamp(0.0, ch);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}
