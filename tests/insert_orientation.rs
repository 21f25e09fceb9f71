use image::{Rgba, RgbaImage};
use markerfill::lowlevel::prepare_canvas;
use markerfill::{
    ChannelKey, ComposeConfig, Composer, DetectConfig, GeometryConfig, GeometryResolver,
    RegionDetector, ResolvedGeometry,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

fn tilted_ellipse(angle_deg: f64) -> RgbaImage {
    let (cx, cy) = (150.0, 150.0);
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    RgbaImage::from_fn(300, 300, |x, y| {
        let dx = f64::from(x) - cx;
        let dy = f64::from(y) - cy;
        let u = dx * cos_a + dy * sin_a;
        let v = -dx * sin_a + dy * cos_a;
        if (u / 80.0).powi(2) + (v / 40.0).powi(2) <= 1.0 {
            GREEN
        } else {
            WHITE
        }
    })
}

fn unit_scale_cfg() -> ComposeConfig {
    let mut cfg = ComposeConfig::default();
    cfg.canvas.long_edge = 300;
    cfg.geometry.margin = 0.0;
    cfg.monolith.fill_factor = 1.0;
    cfg.monolith.supersample = 2;
    cfg.composite.edge_blur_width = 0;
    cfg
}

/// Orientation in degrees, in `[0, 180)`, of the principal axis of the
/// pixels that differ between `a` and `b`.
fn principal_axis_deg(a: &RgbaImage, b: &RgbaImage) -> f64 {
    let changed: Vec<(f64, f64)> = a
        .enumerate_pixels()
        .filter(|&(x, y, p)| p != b.get_pixel(x, y))
        .map(|(x, y, _)| (f64::from(x), f64::from(y)))
        .collect();
    assert!(changed.len() > 1000, "only {} pixels changed", changed.len());
    let n = changed.len() as f64;
    let mx = changed.iter().map(|p| p.0).sum::<f64>() / n;
    let my = changed.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(x, y) in &changed {
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
        sxy += (x - mx) * (y - my);
    }
    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    theta.to_degrees().rem_euclid(180.0)
}

fn angle_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(180.0);
    d.min(180.0 - d)
}

#[test]
fn rotated_rect_inserts_follow_the_region_axis() {
    let cfg = unit_scale_cfg();
    let composer = Composer::new(cfg.clone()).unwrap();
    let resolver = GeometryResolver::new(GeometryConfig {
        margin: 0.0,
        ..GeometryConfig::default()
    });
    let key = ChannelKey::default();
    let photo = RgbaImage::from_pixel(120, 90, Rgba([200, 10, 10, 255]));

    for angle in [30.0, 75.0, 120.0] {
        let tpl = tilted_ellipse(angle);
        let regions = RegionDetector::new(&key, DetectConfig::default()).detect(&tpl);
        assert_eq!(regions.len(), 1);
        assert!(matches!(
            resolver.resolve(&regions[0], 1.0),
            Some(ResolvedGeometry::RotRect { .. })
        ));

        let canvas = prepare_canvas(&tpl, &cfg.canvas).unwrap();
        let out = composer
            .render(&tpl, &[photo.clone()], &mut StdRng::seed_from_u64(21))
            .unwrap();
        assert_eq!(out.report.filled, 1);
        let axis = principal_axis_deg(&out.image, &canvas.image);
        assert!(
            angle_gap(axis, angle) < 6.0,
            "region at {angle} deg, insert axis {axis:.1} deg"
        );
    }
}

#[test]
fn degenerate_region_with_a_photo_leaves_the_canvas_alone() {
    let mut tpl = RgbaImage::from_pixel(200, 100, WHITE);
    for x in 100..140 {
        tpl.put_pixel(x, 50, GREEN);
    }
    let mut cfg = ComposeConfig::default();
    cfg.canvas.long_edge = 200;
    cfg.detect.min_area = 0.0;
    let composer = Composer::new(cfg.clone()).unwrap();

    let photo = RgbaImage::from_pixel(64, 64, Rgba([9, 9, 9, 255]));
    let out = composer
        .render(&tpl, &[photo], &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(out.report.regions, 1);
    assert_eq!(out.report.filled, 0);
    assert_eq!(out.report.skipped, 1);
    let canvas = prepare_canvas(&tpl, &cfg.canvas).unwrap();
    assert_eq!(out.image, canvas.image);
}
