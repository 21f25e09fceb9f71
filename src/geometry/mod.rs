//! Region geometry: quadrilateral vs rotated-rectangle classification.
//!
//! Regions are detected on the original template and scaled into canvas
//! space here, so contour coordinates keep full precision until the last
//! moment.

use crate::detect::MarkerRegion;
use crate::trace::trace_event;

pub mod quad;
pub mod rect;
pub mod simplify;

pub use quad::Homography;
pub use rect::RotatedRect;

/// A 2D point in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Undistorted insert size of a region, in whole canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sides {
    pub long: u32,
    pub short: u32,
}

impl Sides {
    fn from_rect(rect: &RotatedRect) -> Option<Self> {
        let long = rect.width.max(rect.height).round();
        let short = rect.width.min(rect.height).round();
        if long < 1.0 || short < 1.0 {
            return None;
        }
        Some(Self {
            long: long as u32,
            short: short as u32,
        })
    }
}

/// Insertion geometry of one region, in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedGeometry {
    /// Four-cornered region: the insert is perspective-warped onto `corners`
    /// (TL, TR, BR, BL), already pushed outward by the margin.
    Quad { corners: [Point; 4], sides: Sides },
    /// Any other shape: the insert is rotated and centered on `rect`.
    RotRect { rect: RotatedRect, sides: Sides },
}

impl ResolvedGeometry {
    /// Returns the undistorted sides used to size the insert.
    pub fn sides(&self) -> Sides {
        match self {
            ResolvedGeometry::Quad { sides, .. } | ResolvedGeometry::RotRect { sides, .. } => {
                *sides
            }
        }
    }
}

/// Configuration for geometry resolution.
#[derive(Clone, Debug)]
pub struct GeometryConfig {
    /// Polygon approximation tolerance as a fraction of the perimeter.
    pub approx_epsilon_ratio: f64,
    /// Insertion bleed in template pixels; scaled with the canvas.
    pub margin: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            approx_epsilon_ratio: 0.02,
            margin: 75.0,
        }
    }
}

/// Classifies regions and computes their insertion geometry.
pub struct GeometryResolver {
    cfg: GeometryConfig,
}

impl GeometryResolver {
    /// Creates a resolver.
    pub fn new(cfg: GeometryConfig) -> Self {
        Self { cfg }
    }

    /// Margin in canvas pixels for a canvas scaled by `scale`.
    pub fn scaled_margin(&self, scale: f64) -> f64 {
        self.cfg.margin * scale
    }

    /// Resolves a region detected on the original template into canvas
    /// space. Returns `None` when the region is degenerate.
    pub fn resolve(&self, region: &MarkerRegion, scale: f64) -> Option<ResolvedGeometry> {
        let contour: Vec<Point> = region
            .boundary()
            .iter()
            .map(|&(x, y)| Point::new(x as f64 * scale, y as f64 * scale))
            .collect();

        let epsilon = self.cfg.approx_epsilon_ratio * simplify::perimeter(&contour);
        let approx = simplify::approx_closed(&contour, epsilon);
        let rect = rect::min_area_rect(&contour);
        let sides = Sides::from_rect(&rect)?;

        let geometry = match <[Point; 4]>::try_from(approx.as_slice()) {
            Ok(four) => {
                let ordered = quad::order_corners(four);
                ResolvedGeometry::Quad {
                    corners: quad::push_outward(ordered, self.scaled_margin(scale)),
                    sides,
                }
            }
            Err(_) => ResolvedGeometry::RotRect { rect, sides },
        };

        trace_event!(
            "region_resolved",
            quad = matches!(geometry, ResolvedGeometry::Quad { .. }),
            long = sides.long,
            short = sides.short
        );
        Some(geometry)
    }
}
