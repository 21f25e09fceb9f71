//! Low-level building blocks for custom compositing pipelines.
//!
//! These expose the individual stages (contour tracing, polygon fitting,
//! perspective warping, rotation, strip blur) for callers that need more
//! control than the high-level `Composer` API. Most users should prefer
//! `Composer` and `ComposeConfig`.

pub use crate::canvas::{canvas_size, prepare as prepare_canvas, Canvas};
pub use crate::composite::warp::warp_blend;
pub use crate::composite::{Compositor, Placement};
pub use crate::detect::contour::{external_borders, polygon_area, Mask};
pub use crate::geometry::quad::{order_corners, push_outward, translate};
pub use crate::geometry::rect::{convex_hull, min_area_rect};
pub use crate::geometry::simplify::{approx_closed, perimeter};
pub use crate::geometry::{Homography, Point, RotatedRect};
pub use crate::monolith::{Monolith, MonolithBuilder};
pub use crate::raster::blend::mix_by_alpha;
pub use crate::raster::blur::box_blur_left_strip;
pub use crate::raster::rotate::{expanded_size, rotate_expand};
pub use crate::raster::{cover_fill, resize};
