use clap::Parser;
use image::RgbaImage;
use markerfill::{
    load_overlay, load_rgba, AlphaKey, CanvasConfig, ChannelKey, ComposeConfig, CompositeConfig,
    Composer, DetectConfig, EncodeConfig, GeometryConfig, MarkerFillResult, MonolithConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Markerfill CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Only report how many marker regions the template has.
    #[arg(long)]
    count: bool,
    /// Enable tracing output for each pipeline stage.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum MarkerConfig {
    ChannelKey {
        #[serde(default = "default_min_green")]
        min_green: u8,
        #[serde(default = "default_max_red")]
        max_red: u8,
        #[serde(default = "default_max_blue")]
        max_blue: u8,
    },
    Alpha {
        #[serde(default)]
        max_alpha: u8,
    },
}

fn default_min_green() -> u8 {
    ChannelKey::default().min_green
}

fn default_max_red() -> u8 {
    ChannelKey::default().max_red
}

fn default_max_blue() -> u8 {
    ChannelKey::default().max_blue
}

impl Default for MarkerConfig {
    fn default() -> Self {
        let key = ChannelKey::default();
        Self::ChannelKey {
            min_green: key.min_green,
            max_red: key.max_red,
            max_blue: key.max_blue,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CanvasConfigJson {
    long_edge: u32,
    max_pixels: u64,
}

impl Default for CanvasConfigJson {
    fn default() -> Self {
        let cfg = CanvasConfig::default();
        Self {
            long_edge: cfg.long_edge,
            max_pixels: cfg.max_pixels,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RegionConfigJson {
    min_area: f64,
    approx_epsilon_ratio: f64,
    margin: f64,
}

impl Default for RegionConfigJson {
    fn default() -> Self {
        let detect = DetectConfig::default();
        let geometry = GeometryConfig::default();
        Self {
            min_area: detect.min_area,
            approx_epsilon_ratio: geometry.approx_epsilon_ratio,
            margin: geometry.margin,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct InsertConfigJson {
    fill_factor: f64,
    supersample: u32,
    min_rotation_deg: f64,
    max_rotation_deg: f64,
    min_shift: i32,
    max_shift: i32,
    stretch_inset: f64,
    edge_blur_width: u32,
    edge_blur_radius: u32,
}

impl Default for InsertConfigJson {
    fn default() -> Self {
        let mono = MonolithConfig::default();
        let comp = CompositeConfig::default();
        Self {
            fill_factor: mono.fill_factor,
            supersample: mono.supersample,
            min_rotation_deg: mono.min_rotation_deg,
            max_rotation_deg: mono.max_rotation_deg,
            min_shift: mono.min_shift,
            max_shift: mono.max_shift,
            stretch_inset: comp.stretch_inset,
            edge_blur_width: comp.edge_blur_width,
            edge_blur_radius: comp.edge_blur_radius,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EncodeConfigJson {
    max_bytes: usize,
    quality_ladder: Vec<u8>,
}

impl Default for EncodeConfigJson {
    fn default() -> Self {
        let cfg = EncodeConfig::default();
        Self {
            max_bytes: cfg.max_bytes,
            quality_ladder: cfg.quality_ladder,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    template_path: String,
    photo_paths: Vec<String>,
    overlay_path: Option<String>,
    output_path: Option<String>,
    seed: Option<u64>,
    marker: MarkerConfig,
    canvas: CanvasConfigJson,
    region: RegionConfigJson,
    insert: InsertConfigJson,
    encode: EncodeConfigJson,
}

impl Config {
    fn compose_config(&self) -> ComposeConfig {
        ComposeConfig {
            canvas: CanvasConfig {
                long_edge: self.canvas.long_edge,
                max_pixels: self.canvas.max_pixels,
            },
            detect: DetectConfig {
                min_area: self.region.min_area,
            },
            geometry: GeometryConfig {
                approx_epsilon_ratio: self.region.approx_epsilon_ratio,
                margin: self.region.margin,
            },
            monolith: MonolithConfig {
                fill_factor: self.insert.fill_factor,
                supersample: self.insert.supersample,
                min_rotation_deg: self.insert.min_rotation_deg,
                max_rotation_deg: self.insert.max_rotation_deg,
                min_shift: self.insert.min_shift,
                max_shift: self.insert.max_shift,
            },
            composite: CompositeConfig {
                stretch_inset: self.insert.stretch_inset,
                edge_blur_width: self.insert.edge_blur_width,
                edge_blur_radius: self.insert.edge_blur_radius,
            },
            encode: EncodeConfig {
                max_bytes: self.encode.max_bytes,
                quality_ladder: self.encode.quality_ladder.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct CountOutput {
    regions: usize,
}

#[derive(Debug, Serialize)]
struct Output {
    regions: usize,
    filled: usize,
    skipped: usize,
    scale: f64,
    width: u32,
    height: u32,
    format: &'static str,
    bytes: usize,
    output_path: Option<String>,
}

/// Appends the format's extension when the configured path has none.
fn output_file(path: &str, extension: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(extension)
    }
}

/// Loads only the photos that will be placed; surplus paths are never read.
fn load_photos(paths: &[String], regions: usize) -> MarkerFillResult<Vec<RgbaImage>> {
    paths.iter().take(regions).map(load_rgba).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("markerfill=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.template_path.is_empty() {
        return Err("template_path must be set in the config".into());
    }

    let mut composer = Composer::new(config.compose_config())?;
    composer = match config.marker {
        MarkerConfig::ChannelKey {
            min_green,
            max_red,
            max_blue,
        } => composer.with_predicate(ChannelKey {
            min_green,
            max_red,
            max_blue,
        }),
        MarkerConfig::Alpha { max_alpha } => composer.with_predicate(AlphaKey { max_alpha }),
    };
    if let Some(overlay) = config.overlay_path.as_deref().and_then(load_overlay) {
        composer = composer.with_overlay(overlay);
    }

    let template = load_rgba(&config.template_path)?;
    if cli.count {
        let output = CountOutput {
            regions: composer.region_count(&template),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let photos = load_photos(&config.photo_paths, composer.region_count(&template))?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let composition = composer.render(&template, &photos, &mut rng)?;
    let encoded = composer.encode(&composition.image)?;

    let written = match &config.output_path {
        Some(path) => {
            let file = output_file(path, encoded.format.extension());
            fs::write(&file, &encoded.bytes)?;
            tracing::info!(path = %file.display(), bytes = encoded.len(), "output written");
            Some(file.display().to_string())
        }
        None => None,
    };

    let report = composition.report;
    let output = Output {
        regions: report.regions,
        filled: report.filled,
        skipped: report.skipped,
        scale: report.scale,
        width: composition.image.width(),
        height: composition.image.height(),
        format: encoded.format.mime_type(),
        bytes: encoded.len(),
        output_path: written,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
