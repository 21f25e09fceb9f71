//! Canvas compositing.
//!
//! The [`Compositor`] owns the canvas for one job and applies inserts one
//! at a time, in region order. Later inserts paint over earlier ones, so
//! the order is part of the result.

use crate::geometry::{quad, Homography, Point, ResolvedGeometry};
use crate::monolith::Monolith;
use crate::raster::{blur, rotate::rotate_expand};
use crate::trace::{trace_event, trace_span};
use image::{imageops, RgbaImage};

pub mod warp;

/// Configuration for placement and the edge post-effect.
#[derive(Clone, Debug)]
pub struct CompositeConfig {
    /// Horizontal inset of the warp source rectangle, in pixels per side.
    ///
    /// The narrower source is mapped onto the full destination quad, which
    /// stretches the insert sideways.
    pub stretch_inset: f64,
    /// Width of the blurred strip at the canvas' left edge.
    pub edge_blur_width: u32,
    /// Box blur radius inside the strip.
    pub edge_blur_radius: u32,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            stretch_inset: 8.0,
            edge_blur_width: 25,
            edge_blur_radius: 5,
        }
    }
}

/// Outcome of one insertion attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The insert was drawn.
    Drawn,
    /// Nothing was drawn (degenerate transform or off-canvas).
    Skipped,
}

/// Owns the canvas and accumulates inserts.
pub struct Compositor {
    canvas: RgbaImage,
    cfg: CompositeConfig,
}

impl Compositor {
    /// Takes ownership of the canvas for one job.
    pub fn new(canvas: RgbaImage, cfg: CompositeConfig) -> Self {
        Self { canvas, cfg }
    }

    /// Borrows the current canvas.
    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Places one insert according to its region geometry.
    pub fn place(&mut self, geometry: &ResolvedGeometry, mono: &Monolith) -> Placement {
        match geometry {
            ResolvedGeometry::Quad { corners, .. } => self.place_quad(*corners, mono),
            ResolvedGeometry::RotRect { rect, .. } => {
                let _span = trace_span!("place_rotrect").entered();
                // Undo the min-area-rect angle so the insert's long axis
                // (its height) lines up with the region's long side.
                let angle = if rect.width < rect.height {
                    -rect.angle_deg
                } else {
                    -(rect.angle_deg + 90.0)
                };
                let rotated = rotate_expand(&mono.image, angle);
                let x = (rect.center.x + f64::from(mono.dx) - f64::from(rotated.width()) / 2.0)
                    .floor() as i64;
                let y = (rect.center.y + f64::from(mono.dy) - f64::from(rotated.height()) / 2.0)
                    .floor() as i64;
                imageops::overlay(&mut self.canvas, &rotated, x, y);
                Placement::Drawn
            }
        }
    }

    fn place_quad(&mut self, corners: [Point; 4], mono: &Monolith) -> Placement {
        let _span = trace_span!("place_quad").entered();
        let (bw, bh) = (f64::from(mono.base_size.0), f64::from(mono.base_size.1));
        let mut inset = self.cfg.stretch_inset.max(0.0);
        if bw - 2.0 * inset < 1.0 {
            inset = 0.0;
        }
        // The base rectangle sits centered in the expanded, rotated insert.
        let ox = (f64::from(mono.image.width()) - bw).max(0.0) / 2.0;
        let oy = (f64::from(mono.image.height()) - bh).max(0.0) / 2.0;
        let src = [
            Point::new(ox + inset, oy),
            Point::new(ox + bw - inset, oy),
            Point::new(ox + bw - inset, oy + bh),
            Point::new(ox + inset, oy + bh),
        ];
        let dst = quad::translate(corners, f64::from(mono.dx), f64::from(mono.dy));
        let Some(forward) = Homography::from_quads(src, dst) else {
            trace_event!("quad_degenerate");
            return Placement::Skipped;
        };
        let touched = warp::warp_blend(&mut self.canvas, &mono.image, &forward);
        trace_event!("quad_warped", pixels = touched);
        if touched == 0 {
            Placement::Skipped
        } else {
            Placement::Drawn
        }
    }

    /// Applies the left-edge blur and releases the canvas.
    pub fn finish(mut self) -> RgbaImage {
        let blurred = blur::box_blur_left_strip(
            &mut self.canvas,
            self.cfg.edge_blur_width,
            self.cfg.edge_blur_radius,
        );
        trace_event!("edge_blur", applied = blurred);
        self.canvas
    }

    /// Releases the canvas untouched by the post-effect.
    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }
}
