use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use markerfill::lowlevel::rotate_expand;
use markerfill::{ChannelKey, ComposeConfig, Composer, DetectConfig, Encoder, RegionDetector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn make_template(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_fn(width, height, |x, y| {
        let v = (((x * 13) ^ (y * 7)) & 0x7F) as u8 + 100;
        Rgba([v, v / 2, v, 255])
    });
    for y in 100..400 {
        for x in 80..260 {
            img.put_pixel(x, y, Rgba([0, 255, 0, 255]));
        }
    }
    for y in 150..350 {
        for x in 400..700 {
            let dx = x as i32 - 550;
            let dy = y as i32 - 250;
            if dx * dx / 4 + dy * dy <= 90 * 90 {
                img.put_pixel(x, y, Rgba([0, 255, 0, 255]));
            }
        }
    }
    img
}

fn make_photo(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn bench_stages(c: &mut Criterion) {
    let template = make_template(800, 500);
    let photo = make_photo(640, 480);

    let key = ChannelKey::default();
    let detector = RegionDetector::new(&key, DetectConfig::default());
    c.bench_function("detect_regions_800x500", |b| {
        b.iter(|| black_box(detector.detect(&template)));
    });

    c.bench_function("rotate_expand_640x480", |b| {
        b.iter(|| black_box(rotate_expand(&photo, 2.5)));
    });

    let mut cfg = ComposeConfig::default();
    cfg.canvas.long_edge = 1024;
    cfg.monolith.supersample = 4;
    let composer = Composer::new(cfg).unwrap();
    let photos = [photo.clone(), photo.clone()];
    c.bench_function("render_two_regions_1024", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(7);
            black_box(composer.render(&template, &photos, &mut rng).unwrap())
        });
    });

    let canvas = composer
        .render(&template, &photos, &mut StdRng::seed_from_u64(7))
        .unwrap()
        .image;
    let encoder = Encoder::default();
    c.bench_function("encode_png_1024", |b| {
        b.iter(|| black_box(encoder.encode(&canvas).unwrap()));
    });
}

criterion_group!(benches, bench_stages);
criterion_main!(benches);
