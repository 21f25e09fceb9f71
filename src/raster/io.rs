//! Convenience helpers for decoding rasters via the `image` crate.

use crate::trace::trace_warn;
use crate::util::{MarkerFillError, MarkerFillResult};
use image::RgbaImage;
use std::path::Path;

/// Decodes an encoded PNG/JPEG buffer into RGBA.
///
/// `what` names the input in the error (for example `"template"`).
pub fn decode_rgba(bytes: &[u8], what: &str) -> MarkerFillResult<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|err| MarkerFillError::decode(what, err))?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(MarkerFillError::InvalidDimensions {
            width: rgba.width(),
            height: rgba.height(),
        });
    }
    Ok(rgba)
}

/// Reads and decodes an image from disk.
pub fn load_rgba<P: AsRef<Path>>(path: P) -> MarkerFillResult<RgbaImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| MarkerFillError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    })?;
    decode_rgba(&bytes, &path.display().to_string())
}

/// Loads the optional overlay asset.
///
/// A missing or undecodable overlay is not fatal: a warning is emitted and
/// `None` is returned so photos are inserted without it.
pub fn load_overlay<P: AsRef<Path>>(path: P) -> Option<RgbaImage> {
    let path = path.as_ref();
    if !path.exists() {
        let shown = path.display().to_string();
        trace_warn!("overlay_missing", path = shown.as_str());
        return None;
    }
    match load_rgba(path) {
        Ok(img) => Some(img),
        Err(err) => {
            let reason = err.to_string();
            trace_warn!("overlay_unreadable", reason = reason.as_str());
            None
        }
    }
}
