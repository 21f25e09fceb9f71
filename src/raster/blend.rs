//! Alpha blending that leaves the destination alpha alone.

use image::Rgba;

/// Blends `src` color into `dst` weighted by `src` alpha, keeping `dst` alpha.
pub fn mix_by_alpha(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mut out = dst.0;
    for c in 0..3 {
        let num = u32::from(src[c]) * sa + u32::from(dst[c]) * inv;
        out[c] = ((num + 127) / 255) as u8;
    }
    Rgba(out)
}
