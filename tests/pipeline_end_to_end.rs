use image::{Rgba, RgbaImage};
use markerfill::lowlevel::prepare_canvas;
use markerfill::{decode_rgba, ComposeConfig, Composer, Encoder, OutputFormat};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

fn paint(img: &mut RgbaImage, x0: u32, y0: u32, w: u32, h: u32, px: Rgba<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, px);
        }
    }
}

fn photo(width: u32, height: u32, base: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            base[0],
            base[1].wrapping_add((x % 32) as u8),
            base[2].wrapping_add((y % 16) as u8),
            255,
        ])
    })
}

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let out = Encoder::default().encode(img).unwrap();
    assert_eq!(out.format, OutputFormat::Png);
    out.bytes
}

/// Bounding box `(x0, y0, x1, y1)` (inclusive) of pixels that differ.
fn changed_box(a: &RgbaImage, b: &RgbaImage, skip_left: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bbox: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pa) in a.enumerate_pixels() {
        if x < skip_left || pa == b.get_pixel(x, y) {
            continue;
        }
        bbox = Some(match bbox {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bbox
}

fn fast_cfg() -> ComposeConfig {
    let mut cfg = ComposeConfig::default();
    cfg.canvas.long_edge = 600;
    cfg.monolith.supersample = 2;
    cfg
}

#[test]
fn single_rectangle_insert_stays_near_its_region() {
    let mut tpl = RgbaImage::from_pixel(1200, 1200, WHITE);
    paint(&mut tpl, 450, 350, 300, 500, GREEN);
    let mut cfg = ComposeConfig::default();
    cfg.monolith.supersample = 2;
    let composer = Composer::new(cfg.clone()).unwrap();
    let canvas = prepare_canvas(&tpl, &cfg.canvas).unwrap();
    let scale = canvas.scale;

    // Allowed box: rectangle size plus margin and jitter on every side.
    let cx = 600.0 * scale;
    let cy = 600.0 * scale;
    let pad = cfg.geometry.margin * scale + f64::from(cfg.monolith.max_shift);
    let half_w = 150.0 * scale + pad;
    let half_h = 250.0 * scale + pad;

    let photo = photo(800, 600, [30, 60, 180]);
    for seed in 0..4 {
        let out = composer
            .render(&tpl, &[photo.clone()], &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert_eq!(out.report.regions, 1);
        assert_eq!(out.report.filled, 1);
        assert_eq!(out.image.dimensions(), canvas.image.dimensions());

        let (x0, y0, x1, y1) =
            changed_box(&out.image, &canvas.image, cfg.composite.edge_blur_width)
                .expect("insert should change the canvas");
        assert!(
            f64::from(x0) >= cx - half_w && f64::from(x1) <= cx + half_w,
            "seed {seed}: x [{x0}, {x1}] outside {:.1}..{:.1}",
            cx - half_w,
            cx + half_w
        );
        assert!(
            f64::from(y0) >= cy - half_h && f64::from(y1) <= cy + half_h,
            "seed {seed}: y [{y0}, {y1}] outside {:.1}..{:.1}",
            cy - half_h,
            cy + half_h
        );

        let mid = out.image.get_pixel(cx as u32, cy as u32);
        assert_ne!(*mid, GREEN);
        assert_eq!(mid[0], 30);
    }

    let tpl_bytes = png_bytes(&tpl);
    let photo_bytes = png_bytes(&photo);
    let encoded = composer
        .compose_bytes(&tpl_bytes, &[photo_bytes], &mut StdRng::seed_from_u64(11))
        .unwrap();
    assert!(OutputFormat::sniff(&encoded.bytes).is_some());
    let decoded = decode_rgba(&encoded.bytes, "output").unwrap();
    assert_eq!(decoded.dimensions(), canvas.image.dimensions());
}

#[test]
fn zero_regions_return_the_upscaled_template() {
    let mut tpl = RgbaImage::from_pixel(300, 200, WHITE);
    paint(&mut tpl, 0, 0, 20, 200, Rgba([40, 40, 40, 255]));
    paint(&mut tpl, 100, 50, 60, 60, Rgba([250, 250, 0, 255]));
    let cfg = fast_cfg();
    let composer = Composer::new(cfg.clone()).unwrap();

    let photos = [photo(50, 50, [1, 2, 3])];
    let out = composer
        .render(&tpl, &photos, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(out.report.regions, 0);
    assert_eq!(out.report.filled, 0);

    let canvas = prepare_canvas(&tpl, &cfg.canvas).unwrap();
    assert_eq!(out.image, canvas.image);

    let encoded = composer
        .compose(&tpl, &photos, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(encoded.format, OutputFormat::Png);
    assert_eq!(decode_rgba(&encoded.bytes, "output").unwrap(), canvas.image);
}

#[test]
fn one_photo_fills_only_the_leftmost_region() {
    let mut tpl = RgbaImage::from_pixel(600, 300, WHITE);
    paint(&mut tpl, 50, 80, 150, 140, GREEN);
    paint(&mut tpl, 350, 80, 150, 140, GREEN);
    let composer = Composer::new(fast_cfg()).unwrap();
    assert_eq!(composer.region_count(&tpl), 2);

    let out = composer
        .render(&tpl, &[photo(200, 200, [200, 10, 10])], &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert_eq!(out.report.regions, 2);
    assert_eq!(out.report.filled, 1);
    assert_ne!(*out.image.get_pixel(125, 150), GREEN);
    for y in 80..220 {
        for x in 350..500 {
            assert_eq!(*out.image.get_pixel(x, y), GREEN, "right region touched at ({x}, {y})");
        }
    }
}

#[test]
fn photos_are_assigned_left_to_right() {
    let mut tpl = RgbaImage::from_pixel(600, 300, WHITE);
    // The right region comes first in raster order.
    paint(&mut tpl, 350, 40, 150, 140, GREEN);
    paint(&mut tpl, 50, 120, 150, 140, GREEN);
    let composer = Composer::new(fast_cfg()).unwrap();

    let left_photo = photo(200, 200, [200, 10, 10]);
    let right_photo = photo(200, 200, [10, 10, 200]);
    let out = composer
        .render(&tpl, &[left_photo, right_photo], &mut StdRng::seed_from_u64(8))
        .unwrap();
    assert_eq!(out.report.filled, 2);
    assert_eq!(out.image.get_pixel(125, 190)[0], 200);
    assert_eq!(out.image.get_pixel(425, 110)[0], 10);
}

#[test]
fn surplus_or_missing_photos_never_fail() {
    let mut tpl = RgbaImage::from_pixel(300, 300, WHITE);
    paint(&mut tpl, 100, 80, 100, 140, GREEN);
    let composer = Composer::new(fast_cfg()).unwrap();
    let mut rng = StdRng::seed_from_u64(2);

    let none = composer.render(&tpl, &[], &mut rng).unwrap();
    assert_eq!((none.report.regions, none.report.filled), (1, 0));
    // Canvas is doubled, so the region's center sits at (300, 300).
    assert_eq!(*none.image.get_pixel(300, 300), GREEN);

    let photos: Vec<RgbaImage> = (0..3).map(|i| photo(64, 64, [i * 40, 0, 0])).collect();
    let many = composer.render(&tpl, &photos, &mut rng).unwrap();
    assert_eq!((many.report.regions, many.report.filled), (1, 1));

    // Surplus photo bytes are never decoded.
    let tpl_bytes = png_bytes(&tpl);
    let photo_bytes = png_bytes(&photos[0]);
    let inputs: Vec<&[u8]> = vec![photo_bytes.as_slice(), b"not an image".as_slice()];
    assert!(composer.compose_bytes(&tpl_bytes, &inputs, &mut rng).is_ok());
}

#[test]
fn same_seed_gives_identical_bytes() {
    let mut tpl = RgbaImage::from_pixel(400, 300, WHITE);
    paint(&mut tpl, 60, 60, 120, 160, GREEN);
    paint(&mut tpl, 240, 90, 100, 100, GREEN);
    let composer = Composer::new(fast_cfg()).unwrap();
    let photos = [photo(120, 90, [90, 20, 40]), photo(90, 120, [10, 90, 40])];

    let a = composer
        .compose(&tpl, &photos, &mut StdRng::seed_from_u64(1234))
        .unwrap();
    let b = composer
        .compose(&tpl, &photos, &mut StdRng::seed_from_u64(1234))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn pixel_ceiling_bounds_decoded_output() {
    let mut tpl = RgbaImage::from_pixel(200, 100, WHITE);
    paint(&mut tpl, 40, 20, 60, 60, GREEN);
    let mut cfg = fast_cfg();
    cfg.canvas.max_pixels = 50_000;
    cfg.detect.min_area = 100.0;
    let composer = Composer::new(cfg).unwrap();

    let photos = [png_bytes(&photo(80, 80, [5, 5, 5]))];
    let encoded = composer
        .compose_bytes(&png_bytes(&tpl), &photos, &mut StdRng::seed_from_u64(4))
        .unwrap();
    let decoded = decode_rgba(&encoded.bytes, "output").unwrap();
    let (w, h) = decoded.dimensions();
    assert!(u64::from(w) * u64::from(h) <= 50_000);
    assert_eq!((w, h), (316, 158));
}
