//! Marker region detection.
//!
//! A template marks insertion spots with a reserved key color. Which pixels
//! count as marker is decided by a [`MarkerPredicate`], so alternate
//! encodings (for example transparent holes) plug in without touching the
//! geometry or compositing stages.

use crate::trace::{trace_event, trace_span};
use image::{Rgba, RgbaImage};

pub mod contour;

use contour::{external_borders, polygon_area, Mask};

/// Decides whether a template pixel belongs to a marker region.
pub trait MarkerPredicate {
    /// Returns `true` when `px` is a marker pixel.
    fn is_marker(&self, px: Rgba<u8>) -> bool;
}

impl<F> MarkerPredicate for F
where
    F: Fn(Rgba<u8>) -> bool,
{
    fn is_marker(&self, px: Rgba<u8>) -> bool {
        self(px)
    }
}

/// Color-key predicate: strong green with weak red and blue.
///
/// A pixel matches when `g > min_green && r < max_red && b < max_blue`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelKey {
    pub min_green: u8,
    pub max_red: u8,
    pub max_blue: u8,
}

impl Default for ChannelKey {
    fn default() -> Self {
        Self {
            min_green: 200,
            max_red: 100,
            max_blue: 100,
        }
    }
}

impl MarkerPredicate for ChannelKey {
    fn is_marker(&self, px: Rgba<u8>) -> bool {
        px[1] > self.min_green && px[0] < self.max_red && px[2] < self.max_blue
    }
}

/// Alpha-mask predicate: pixels at or below `max_alpha` are marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlphaKey {
    pub max_alpha: u8,
}

impl Default for AlphaKey {
    fn default() -> Self {
        Self { max_alpha: 0 }
    }
}

impl MarkerPredicate for AlphaKey {
    fn is_marker(&self, px: Rgba<u8>) -> bool {
        px[3] <= self.max_alpha
    }
}

/// Configuration for region detection.
#[derive(Clone, Debug)]
pub struct DetectConfig {
    /// Regions with a border polygon area below this are treated as noise.
    pub min_area: f64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self { min_area: 1000.0 }
    }
}

/// One detected marker region in template pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerRegion {
    boundary: Vec<(i64, i64)>,
    left: i64,
    area: f64,
}

impl MarkerRegion {
    /// Returns the closed outer boundary, run-compressed.
    pub fn boundary(&self) -> &[(i64, i64)] {
        &self.boundary
    }

    /// Returns the left edge of the bounding box (the sort key).
    pub fn left(&self) -> i64 {
        self.left
    }

    /// Returns the polygon area enclosed by the boundary.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Returns the bounding box as `(x0, y0, x1, y1)`, inclusive.
    pub fn bounds(&self) -> (i64, i64, i64, i64) {
        let mut b = (i64::MAX, i64::MAX, i64::MIN, i64::MIN);
        for &(x, y) in &self.boundary {
            b.0 = b.0.min(x);
            b.1 = b.1.min(y);
            b.2 = b.2.max(x);
            b.3 = b.3.max(y);
        }
        b
    }
}

/// Finds marker regions and orders them left to right.
pub struct RegionDetector<'p> {
    predicate: &'p dyn MarkerPredicate,
    cfg: DetectConfig,
}

impl<'p> RegionDetector<'p> {
    /// Creates a detector for the given predicate.
    pub fn new(predicate: &'p dyn MarkerPredicate, cfg: DetectConfig) -> Self {
        Self { predicate, cfg }
    }

    /// Builds the binary marker mask of `template`.
    pub fn mask(&self, template: &RgbaImage) -> Mask {
        Mask::from_rgba(template, |px| self.predicate.is_marker(px))
    }

    /// Detects external marker regions, filtered by area and sorted by the
    /// left edge of their bounding boxes. An empty result is not an error.
    pub fn detect(&self, template: &RgbaImage) -> Vec<MarkerRegion> {
        let _span = trace_span!(
            "detect_regions",
            width = template.width(),
            height = template.height()
        )
        .entered();

        let mask = self.mask(template);
        let mut regions: Vec<MarkerRegion> = external_borders(&mask)
            .into_iter()
            .filter_map(|boundary| {
                let area = polygon_area(&boundary);
                if area < self.cfg.min_area {
                    return None;
                }
                let left = boundary.iter().map(|p| p.0).min()?;
                Some(MarkerRegion {
                    boundary,
                    left,
                    area,
                })
            })
            .collect();
        // Stable sort keeps raster order for equal left edges.
        regions.sort_by_key(|r| r.left);

        trace_event!("regions_detected", count = regions.len());
        regions
    }
}
