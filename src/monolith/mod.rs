//! Insert ("monolith") preparation for one region.
//!
//! The photo is cover-filled into a supersampled rectangle whose height is
//! always the region's long side, optionally overlaid, rotated by a small
//! random angle, then downscaled so the rotated edges come out
//! anti-aliased. Orientation is fixed later, at paste time.

use crate::geometry::Sides;
use crate::raster::{cover_fill, resize, rotate::rotate_expand};
use crate::trace::trace_event;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rand::Rng;

/// Configuration for insert preparation and cosmetic jitter.
#[derive(Clone, Debug)]
pub struct MonolithConfig {
    /// Fraction of `side + margin` the insert occupies before supersampling.
    pub fill_factor: f64,
    /// Supersampling multiplier applied while rotating.
    pub supersample: u32,
    /// Rotation magnitude range in degrees; the sign is random.
    pub min_rotation_deg: f64,
    pub max_rotation_deg: f64,
    /// Translation jitter magnitude range in pixels; the sign is random.
    pub min_shift: i32,
    pub max_shift: i32,
}

impl Default for MonolithConfig {
    fn default() -> Self {
        Self {
            fill_factor: 0.5,
            supersample: 8,
            min_rotation_deg: 1.0,
            max_rotation_deg: 3.0,
            min_shift: 2,
            max_shift: 8,
        }
    }
}

/// A prepared insert and the jitter to apply when placing it.
#[derive(Clone, Debug)]
pub struct Monolith {
    /// Rotated, downscaled insert.
    pub image: RgbaImage,
    /// Size of the insert before rotation, after downscaling.
    pub base_size: (u32, u32),
    /// Rotation applied, in degrees (counter-clockwise positive).
    pub rotation_deg: f64,
    /// Translation jitter in canvas pixels.
    pub dx: i32,
    pub dy: i32,
}

/// Builds one insert per region.
pub struct MonolithBuilder<'a> {
    cfg: &'a MonolithConfig,
    overlay: Option<&'a RgbaImage>,
}

impl<'a> MonolithBuilder<'a> {
    /// Creates a builder; `overlay` is composited over every insert.
    pub fn new(cfg: &'a MonolithConfig, overlay: Option<&'a RgbaImage>) -> Self {
        Self { cfg, overlay }
    }

    /// Supersampled target size `(W, H)` for `sides` and a canvas-space
    /// `margin`. H follows the long side.
    pub fn target_size(&self, sides: Sides, margin: f64) -> (u32, u32) {
        let axis = |side: u32| {
            let base = ((f64::from(side) + margin) * self.cfg.fill_factor).round();
            (base.max(0.0) as u32).saturating_mul(self.cfg.supersample)
        };
        (axis(sides.short), axis(sides.long))
    }

    /// Prepares the insert for one region. Returns `None` when the target
    /// size rounds to zero.
    pub fn build<R: Rng + ?Sized>(
        &self,
        sides: Sides,
        margin: f64,
        photo: &RgbaImage,
        rng: &mut R,
    ) -> Option<Monolith> {
        let (w, h) = self.target_size(sides, margin);
        if w == 0 || h == 0 {
            return None;
        }

        let mut mono = cover_fill(photo, w, h);
        if let Some(overlay) = self.overlay {
            let overlay = resize(overlay, w, h, FilterType::Lanczos3);
            imageops::overlay(&mut mono, &overlay, 0, 0);
        }

        let magnitude = rng_range_f64(rng, self.cfg.min_rotation_deg, self.cfg.max_rotation_deg);
        let rotation_deg = signed(rng, magnitude);
        let rotated = rotate_expand(&mono, rotation_deg);

        let ss = self.cfg.supersample.max(1);
        let image = resize(
            &rotated,
            rotated.width() / ss,
            rotated.height() / ss,
            FilterType::Lanczos3,
        );
        let base_size = ((w / ss).max(1), (h / ss).max(1));

        let dx = shift(rng, self.cfg.min_shift, self.cfg.max_shift);
        let dy = shift(rng, self.cfg.min_shift, self.cfg.max_shift);

        trace_event!(
            "monolith_built",
            width = image.width(),
            height = image.height(),
            rotation_deg = rotation_deg,
            dx = dx,
            dy = dy
        );
        Some(Monolith {
            image,
            base_size,
            rotation_deg,
            dx,
            dy,
        })
    }
}

fn rng_range_f64<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..=hi)
}

fn signed<R: Rng + ?Sized>(rng: &mut R, magnitude: f64) -> f64 {
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

fn shift<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    let magnitude = if hi <= lo {
        lo
    } else {
        rng.random_range(lo..=hi)
    };
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}
