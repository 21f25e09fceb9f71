//! Markerfill composites user photos into the marked regions of a template.
//!
//! A template reserves insertion spots with a key color (or any other
//! [`MarkerPredicate`]). Each spot is traced, classified as a quadrilateral
//! or a rotated rectangle, and filled with a cover-cropped, slightly
//! jittered copy of a photo. The result is encoded as PNG, falling back to
//! JPEG under a byte ceiling. Bounded job-level parallelism is available
//! with the `rayon` feature.

#[cfg(feature = "rayon")]
pub mod batch;
pub mod canvas;
pub mod composite;
pub mod detect;
pub mod encode;
pub mod geometry;
pub mod lowlevel;
pub mod monolith;
pub mod pipeline;
pub mod raster;
mod trace;
pub mod util;

pub use canvas::CanvasConfig;
pub use composite::CompositeConfig;
pub use detect::{
    AlphaKey, ChannelKey, DetectConfig, MarkerPredicate, MarkerRegion, RegionDetector,
};
pub use encode::{EncodeConfig, EncodedOutput, Encoder, OutputFormat};
pub use geometry::{GeometryConfig, GeometryResolver, ResolvedGeometry, Sides};
pub use monolith::MonolithConfig;
pub use pipeline::{ComposeConfig, ComposeReport, Composer, Composition};
pub use raster::io::{decode_rgba, load_overlay, load_rgba};
pub use util::{MarkerFillError, MarkerFillResult};

#[cfg(feature = "rayon")]
pub use batch::{compose_batch, ComposeJob};
