//! Canvas preparation: upscaling the template and capping its pixel count.

use crate::raster::resize;
use crate::trace::trace_event;
use crate::util::{MarkerFillError, MarkerFillResult};
use image::imageops::FilterType;
use image::RgbaImage;

/// Configuration for the working canvas.
#[derive(Clone, Debug)]
pub struct CanvasConfig {
    /// Templates whose longer edge is shorter than this are upscaled to it.
    pub long_edge: u32,
    /// Upper bound on canvas pixels; larger canvases are shrunk to fit.
    pub max_pixels: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            long_edge: 2048,
            max_pixels: 80_000_000,
        }
    }
}

/// The upscaled template and the factor applied to its coordinates.
#[derive(Clone, Debug)]
pub struct Canvas {
    pub image: RgbaImage,
    pub scale: f64,
}

/// Computes the canvas size and scale for a `width`×`height` template.
///
/// Sizes are truncated and never drop below 1×1.
pub fn canvas_size(width: u32, height: u32, cfg: &CanvasConfig) -> (u32, u32, f64) {
    let longest = width.max(height).max(1);
    let mut scale = if longest < cfg.long_edge {
        f64::from(cfg.long_edge) / f64::from(longest)
    } else {
        1.0
    };
    let mut w = truncate(f64::from(width) * scale);
    let mut h = truncate(f64::from(height) * scale);

    let pixels = u64::from(w) * u64::from(h);
    if cfg.max_pixels > 0 && pixels > cfg.max_pixels {
        let shrink = (cfg.max_pixels as f64 / pixels as f64).sqrt();
        w = truncate(f64::from(w) * shrink);
        h = truncate(f64::from(h) * shrink);
        scale *= shrink;
    }
    (w, h, scale)
}

// Tolerates float noise so exact multiples are not truncated one short.
fn truncate(v: f64) -> u32 {
    ((v + 1e-9) as u32).max(1)
}

/// Builds the working canvas from the template.
pub fn prepare(template: &RgbaImage, cfg: &CanvasConfig) -> MarkerFillResult<Canvas> {
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 {
        return Err(MarkerFillError::InvalidDimensions {
            width: tw,
            height: th,
        });
    }
    let (w, h, scale) = canvas_size(tw, th, cfg);
    let image = resize(template, w, h, FilterType::Lanczos3);
    trace_event!("canvas_prepared", width = w, height = h, scale = scale);
    Ok(Canvas { image, scale })
}

#[cfg(test)]
mod tests {
    use super::{canvas_size, prepare, CanvasConfig};
    use crate::MarkerFillError;
    use image::{Rgba, RgbaImage};

    #[test]
    fn small_templates_are_upscaled_to_long_edge() {
        let (w, h, scale) = canvas_size(1200, 600, &CanvasConfig::default());
        assert_eq!((w, h), (2048, 1024));
        assert!((scale - 2048.0 / 1200.0).abs() < 1e-12);
    }

    #[test]
    fn large_templates_keep_their_size() {
        let (w, h, scale) = canvas_size(3000, 1000, &CanvasConfig::default());
        assert_eq!((w, h, scale), (3000, 1000, 1.0));
    }

    #[test]
    fn pixel_ceiling_shrinks_canvas_and_scale() {
        let cfg = CanvasConfig {
            long_edge: 100,
            max_pixels: 2_500,
        };
        let (w, h, scale) = canvas_size(100, 100, &cfg);
        assert!(u64::from(w) * u64::from(h) <= 2_500);
        assert_eq!((w, h), (50, 50));
        assert!((scale - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_sized_template_is_rejected() {
        let err = prepare(&RgbaImage::new(0, 5), &CanvasConfig::default()).unwrap_err();
        assert_eq!(
            err,
            MarkerFillError::InvalidDimensions {
                width: 0,
                height: 5
            }
        );
    }

    #[test]
    fn prepared_canvas_matches_computed_size() {
        let tpl = RgbaImage::from_pixel(300, 150, Rgba([10, 20, 30, 255]));
        let canvas = prepare(&tpl, &CanvasConfig::default()).unwrap();
        assert_eq!(canvas.image.dimensions(), (2048, 1024));
        assert_eq!(*canvas.image.get_pixel(1000, 500), Rgba([10, 20, 30, 255]));
    }
}
