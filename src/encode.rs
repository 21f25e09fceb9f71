//! Output encoding under a byte ceiling.
//!
//! PNG is tried first; if it is too large the canvas is re-encoded as JPEG
//! down a descending quality ladder. The ceiling is best-effort: when no
//! rung fits, the lowest-quality result is returned anyway.

use crate::trace::{trace_event, trace_span};
use crate::util::{MarkerFillError, MarkerFillResult};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Configuration for the encoder.
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    /// Target upper bound on the encoded size in bytes.
    pub max_bytes: usize,
    /// JPEG qualities tried in order after PNG; the last one is the fallback.
    pub quality_ladder: Vec<u8>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            quality_ladder: vec![95, 90, 85, 80, 75, 70, 65, 50],
        }
    }
}

/// Container format of an encoded result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Recovers the format from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
        if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type for uploads.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Encoded bytes and their format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedOutput {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl EncodedOutput {
    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encodes canvases according to an [`EncodeConfig`].
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    cfg: EncodeConfig,
}

impl Encoder {
    /// Creates an encoder.
    pub fn new(cfg: EncodeConfig) -> Self {
        Self { cfg }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EncodeConfig {
        &self.cfg
    }

    /// Encodes `canvas`, preferring lossless output.
    pub fn encode(&self, canvas: &RgbaImage) -> MarkerFillResult<EncodedOutput> {
        let _span = trace_span!("encode", max_bytes = self.cfg.max_bytes).entered();
        let png = encode_png(canvas)?;
        trace_event!("png_encoded", bytes = png.len());
        if png.len() <= self.cfg.max_bytes {
            return Ok(EncodedOutput {
                bytes: png,
                format: OutputFormat::Png,
            });
        }

        if self.cfg.quality_ladder.is_empty() {
            return Err(MarkerFillError::InvalidConfig {
                reason: "encode.quality_ladder must not be empty",
            });
        }

        let rgb = drop_alpha(canvas);
        let mut last = Vec::new();
        for &quality in &self.cfg.quality_ladder {
            last = encode_jpeg(&rgb, canvas.width(), canvas.height(), quality)?;
            trace_event!("jpeg_encoded", quality = quality, bytes = last.len());
            if last.len() <= self.cfg.max_bytes {
                break;
            }
        }
        Ok(EncodedOutput {
            bytes: last,
            format: OutputFormat::Jpeg,
        })
    }
}

fn encode_png(canvas: &RgbaImage) -> MarkerFillResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|err| MarkerFillError::Encode {
            reason: err.to_string(),
        })?;
    Ok(out)
}

fn encode_jpeg(rgb: &[u8], width: u32, height: u32, quality: u8) -> MarkerFillResult<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|err| MarkerFillError::Encode {
            reason: err.to_string(),
        })?;
    Ok(out)
}

/// Discards the alpha channel without compositing against a background.
fn drop_alpha(canvas: &RgbaImage) -> Vec<u8> {
    canvas
        .pixels()
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{EncodeConfig, Encoder, OutputFormat};
    use crate::util::MarkerFillError;
    use image::{Rgba, RgbaImage};

    fn noisy(w: u32, h: u32) -> RgbaImage {
        let mut state = 0x2545_f491_u32;
        RgbaImage::from_fn(w, h, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let b = state.to_le_bytes();
            Rgba([b[0], b[1], b[2], 255])
        })
    }

    #[test]
    fn small_canvas_stays_png() {
        let canvas = RgbaImage::from_pixel(32, 32, Rgba([1, 2, 3, 255]));
        let out = Encoder::default().encode(&canvas).unwrap();
        assert_eq!(out.format, OutputFormat::Png);
        assert_eq!(OutputFormat::sniff(&out.bytes), Some(OutputFormat::Png));
    }

    #[test]
    fn oversized_png_falls_back_to_jpeg() {
        let canvas = noisy(128, 128);
        let encoder = Encoder::new(EncodeConfig {
            max_bytes: 40_000,
            ..EncodeConfig::default()
        });
        let out = encoder.encode(&canvas).unwrap();
        assert_eq!(out.format, OutputFormat::Jpeg);
        assert_eq!(OutputFormat::sniff(&out.bytes), Some(OutputFormat::Jpeg));
    }

    #[test]
    fn unattainable_ceiling_returns_lowest_quality() {
        let canvas = noisy(64, 64);
        let encoder = Encoder::new(EncodeConfig {
            max_bytes: 1,
            quality_ladder: vec![90, 20],
        });
        let out = encoder.encode(&canvas).unwrap();
        assert_eq!(out.format, OutputFormat::Jpeg);
        let q20 = Encoder::new(EncodeConfig {
            max_bytes: 1,
            quality_ladder: vec![20],
        })
        .encode(&canvas)
        .unwrap();
        assert_eq!(out.bytes, q20.bytes);
    }

    #[test]
    fn oversized_png_without_ladder_is_an_error() {
        let encoder = Encoder::new(EncodeConfig {
            max_bytes: 1,
            quality_ladder: Vec::new(),
        });
        assert!(matches!(
            encoder.encode(&noisy(16, 16)),
            Err(MarkerFillError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn format_metadata() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::sniff(b"GIF89a"), None);
    }
}
