//! High-level composition API.
//!
//! A [`Composer`] is configured once and then runs any number of jobs. It
//! holds no per-job state, so one instance can be shared across threads.
//! Each job walks the stages in order: canvas preparation, detection,
//! geometry, insert building, compositing, edge blur, encoding.

use std::borrow::Cow;

use crate::canvas::{self, CanvasConfig};
use crate::composite::{CompositeConfig, Compositor, Placement};
use crate::detect::{ChannelKey, DetectConfig, MarkerPredicate, RegionDetector};
use crate::encode::{EncodeConfig, EncodedOutput, Encoder};
use crate::geometry::{GeometryConfig, GeometryResolver};
use crate::monolith::{MonolithBuilder, MonolithConfig};
use crate::raster::io::decode_rgba;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{MarkerFillError, MarkerFillResult};
use image::RgbaImage;
use rand::Rng;

/// Configuration for every stage of a composition job.
#[derive(Clone, Debug, Default)]
pub struct ComposeConfig {
    pub canvas: CanvasConfig,
    pub detect: DetectConfig,
    pub geometry: GeometryConfig,
    pub monolith: MonolithConfig,
    pub composite: CompositeConfig,
    pub encode: EncodeConfig,
}

impl ComposeConfig {
    /// Checks the configuration for values no job could run with.
    pub fn validate(&self) -> MarkerFillResult<()> {
        let reject = |reason: &'static str| Err(MarkerFillError::InvalidConfig { reason });
        if self.canvas.long_edge == 0 {
            return reject("canvas.long_edge must be positive");
        }
        if !self.detect.min_area.is_finite() || self.detect.min_area < 0.0 {
            return reject("detect.min_area must be finite and non-negative");
        }
        let eps = self.geometry.approx_epsilon_ratio;
        if !eps.is_finite() || eps <= 0.0 {
            return reject("geometry.approx_epsilon_ratio must be positive");
        }
        if !self.geometry.margin.is_finite() || self.geometry.margin < 0.0 {
            return reject("geometry.margin must be finite and non-negative");
        }
        let mono = &self.monolith;
        if !mono.fill_factor.is_finite() || mono.fill_factor <= 0.0 {
            return reject("monolith.fill_factor must be positive");
        }
        if mono.supersample == 0 {
            return reject("monolith.supersample must be at least 1");
        }
        if !(mono.min_rotation_deg.is_finite() && mono.max_rotation_deg.is_finite())
            || mono.min_rotation_deg < 0.0
            || mono.min_rotation_deg > mono.max_rotation_deg
        {
            return reject("monolith rotation range must satisfy 0 <= min <= max");
        }
        if mono.min_shift < 0 || mono.min_shift > mono.max_shift {
            return reject("monolith shift range must satisfy 0 <= min <= max");
        }
        let inset = self.composite.stretch_inset;
        if !inset.is_finite() || inset < 0.0 {
            return reject("composite.stretch_inset must be finite and non-negative");
        }
        if self.encode.max_bytes == 0 {
            return reject("encode.max_bytes must be positive");
        }
        if self.encode.quality_ladder.is_empty() {
            return reject("encode.quality_ladder must not be empty");
        }
        if self
            .encode
            .quality_ladder
            .iter()
            .any(|&q| q == 0 || q > 100)
        {
            return reject("encode.quality_ladder entries must be in 1..=100");
        }
        Ok(())
    }
}

/// Counters describing one composition job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeReport {
    /// Marker regions found on the template.
    pub regions: usize,
    /// Regions that received an insert.
    pub filled: usize,
    /// Regions that had a photo but were degenerate.
    pub skipped: usize,
    /// Factor from template to canvas coordinates.
    pub scale: f64,
}

/// A rendered canvas before encoding.
#[derive(Clone, Debug)]
pub struct Composition {
    pub image: RgbaImage,
    pub report: ComposeReport,
}

/// Fills the marker regions of templates with photos.
pub struct Composer {
    cfg: ComposeConfig,
    predicate: Box<dyn MarkerPredicate + Send + Sync>,
    overlay: Option<RgbaImage>,
    encoder: Encoder,
}

impl Composer {
    /// Creates a composer using the default green color key and no overlay.
    pub fn new(cfg: ComposeConfig) -> MarkerFillResult<Self> {
        cfg.validate()?;
        let encoder = Encoder::new(cfg.encode.clone());
        Ok(Self {
            cfg,
            predicate: Box::new(ChannelKey::default()),
            overlay: None,
            encoder,
        })
    }

    /// Replaces the marker predicate.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: MarkerPredicate + Send + Sync + 'static,
    {
        self.predicate = Box::new(predicate);
        self
    }

    /// Composites `overlay` over every insert.
    pub fn with_overlay(mut self, overlay: RgbaImage) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Decodes an optional overlay. Missing or undecodable bytes leave the
    /// composer without an overlay and emit a warning.
    pub fn with_overlay_bytes(mut self, bytes: Option<&[u8]>) -> Self {
        self.overlay = match bytes {
            None => {
                trace_warn!("overlay_missing", reason = "no overlay bytes");
                None
            }
            Some(bytes) => match decode_rgba(bytes, "overlay") {
                Ok(img) => Some(img),
                Err(err) => {
                    let reason = err.to_string();
                    trace_warn!("overlay_unreadable", reason = reason.as_str());
                    None
                }
            },
        };
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ComposeConfig {
        &self.cfg
    }

    /// Returns the overlay, if one is set.
    pub fn overlay(&self) -> Option<&RgbaImage> {
        self.overlay.as_ref()
    }

    /// Counts the usable marker regions of a template, i.e. how many photos
    /// a job can place.
    pub fn region_count(&self, template: &RgbaImage) -> usize {
        self.detector().detect(template).len()
    }

    /// Decodes a template and counts its marker regions.
    pub fn region_count_bytes(&self, template: &[u8]) -> MarkerFillResult<usize> {
        let template = decode_rgba(template, "template")?;
        Ok(self.region_count(&template))
    }

    /// Renders a composition without encoding it.
    ///
    /// Photos are assigned to regions left to right; surplus regions stay
    /// as they are on the template and surplus photos are ignored. With no
    /// regions the upscaled template is returned without the edge blur.
    pub fn render<R: Rng + ?Sized>(
        &self,
        template: &RgbaImage,
        photos: &[RgbaImage],
        rng: &mut R,
    ) -> MarkerFillResult<Composition> {
        self.render_with(template, photos.len(), |i| Ok(Cow::Borrowed(&photos[i])), rng)
    }

    /// Renders and encodes a composition.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        template: &RgbaImage,
        photos: &[RgbaImage],
        rng: &mut R,
    ) -> MarkerFillResult<EncodedOutput> {
        let composition = self.render(template, photos, rng)?;
        self.encoder.encode(&composition.image)
    }

    /// Decodes the inputs, then renders and encodes a composition.
    ///
    /// Only the photos that are actually placed are decoded; a surplus
    /// photo never causes an error.
    pub fn compose_bytes<R, B>(
        &self,
        template: &[u8],
        photos: &[B],
        rng: &mut R,
    ) -> MarkerFillResult<EncodedOutput>
    where
        R: Rng + ?Sized,
        B: AsRef<[u8]>,
    {
        let template = decode_rgba(template, "template")?;
        let decode = |i: usize| {
            let what = format!("photo #{}", i + 1);
            decode_rgba(photos[i].as_ref(), &what).map(Cow::Owned)
        };
        let composition = self.render_with(&template, photos.len(), decode, rng)?;
        self.encoder.encode(&composition.image)
    }

    /// Encodes a rendered canvas with the configured ceiling.
    pub fn encode(&self, canvas: &RgbaImage) -> MarkerFillResult<EncodedOutput> {
        self.encoder.encode(canvas)
    }

    fn detector(&self) -> RegionDetector<'_> {
        RegionDetector::new(&*self.predicate, self.cfg.detect.clone())
    }

    fn render_with<'p, R, F>(
        &self,
        template: &RgbaImage,
        photo_count: usize,
        mut photo_at: F,
        rng: &mut R,
    ) -> MarkerFillResult<Composition>
    where
        R: Rng + ?Sized,
        F: FnMut(usize) -> MarkerFillResult<Cow<'p, RgbaImage>>,
    {
        let _span = trace_span!("compose", photos = photo_count).entered();
        let canvas = canvas::prepare(template, &self.cfg.canvas)?;
        let regions = self.detector().detect(template);
        let mut report = ComposeReport {
            regions: regions.len(),
            filled: 0,
            skipped: 0,
            scale: canvas.scale,
        };
        if regions.is_empty() {
            trace_event!("no_regions");
            return Ok(Composition {
                image: canvas.image,
                report,
            });
        }

        let resolver = GeometryResolver::new(self.cfg.geometry.clone());
        let builder = MonolithBuilder::new(&self.cfg.monolith, self.overlay.as_ref());
        let margin = resolver.scaled_margin(canvas.scale);
        let mut compositor = Compositor::new(canvas.image, self.cfg.composite.clone());

        for (index, region) in regions.iter().take(photo_count).enumerate() {
            let photo = photo_at(index)?;
            let Some(geometry) = resolver.resolve(region, canvas.scale) else {
                report.skipped += 1;
                continue;
            };
            let Some(mono) = builder.build(geometry.sides(), margin, &photo, rng) else {
                report.skipped += 1;
                continue;
            };
            match compositor.place(&geometry, &mono) {
                Placement::Drawn => report.filled += 1,
                Placement::Skipped => report.skipped += 1,
            }
        }

        trace_event!(
            "regions_filled",
            regions = report.regions,
            filled = report.filled,
            skipped = report.skipped
        );
        Ok(Composition {
            image: compositor.finish(),
            report,
        })
    }
}
