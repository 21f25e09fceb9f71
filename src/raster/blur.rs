//! Box blur restricted to a vertical strip at the left edge.

use image::RgbaImage;

/// Box-blurs the `strip_width`-pixel strip at the left edge of `img` in place.
///
/// The strip is treated as its own image: sample windows clamp to the strip
/// bounds rather than reading pixels to its right. The kernel is a
/// `(2 * radius + 1)`-wide box applied horizontally, then vertically, with
/// rounding to nearest. Returns `false` when nothing was done (zero
/// parameters or a canvas narrower than the strip).
pub fn box_blur_left_strip(img: &mut RgbaImage, strip_width: u32, radius: u32) -> bool {
    if strip_width == 0 || radius == 0 || img.width() < strip_width || img.height() == 0 {
        return false;
    }

    let w = strip_width as usize;
    let h = img.height() as usize;
    let mut strip = vec![[0u8; 4]; w * h];
    for y in 0..h {
        for x in 0..w {
            strip[y * w + x] = img.get_pixel(x as u32, y as u32).0;
        }
    }

    let mut tmp = vec![[0u8; 4]; w * h];
    box_pass(&strip, &mut tmp, w, h, radius as usize, Axis::Horizontal);
    box_pass(&tmp, &mut strip, w, h, radius as usize, Axis::Vertical);

    for y in 0..h {
        for x in 0..w {
            img.put_pixel(x as u32, y as u32, image::Rgba(strip[y * w + x]));
        }
    }
    true
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn box_pass(src: &[[u8; 4]], dst: &mut [[u8; 4]], w: usize, h: usize, r: usize, axis: Axis) {
    let r = r as i64;
    let taps = (2 * r + 1) as u32;
    let (outer, inner) = match axis {
        Axis::Horizontal => (h, w),
        Axis::Vertical => (w, h),
    };
    let index = |o: usize, i: usize| match axis {
        Axis::Horizontal => o * w + i,
        Axis::Vertical => i * w + o,
    };
    let last = inner as i64 - 1;

    for o in 0..outer {
        for i in 0..inner {
            let mut acc = [0u32; 4];
            for k in -r..=r {
                let s = (i as i64 + k).clamp(0, last) as usize;
                let px = src[index(o, s)];
                for c in 0..4 {
                    acc[c] += u32::from(px[c]);
                }
            }
            let out = &mut dst[index(o, i)];
            for c in 0..4 {
                out[c] = ((acc[c] + taps / 2) / taps) as u8;
            }
        }
    }
}
