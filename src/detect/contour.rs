//! Connected components and outer-border tracing on a binary mask.
//!
//! Foreground is 8-connected and background 4-connected, so every
//! foreground component has a single well-defined outer border. A component
//! is *external* when it touches the image edge or borders the background
//! region connected to the image edge; components sitting inside a hole of
//! another component are not external.

use image::{Rgba, RgbaImage};
use std::collections::VecDeque;

/// Binary mask in row-major order.
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl Mask {
    /// Creates a mask from a row-major buffer of `width * height` flags.
    pub fn new(width: usize, height: usize, data: Vec<bool>) -> Option<Self> {
        if data.len() != width.checked_mul(height)? {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Evaluates `is_set` for every pixel of `img`.
    pub fn from_rgba(img: &RgbaImage, mut is_set: impl FnMut(Rgba<u8>) -> bool) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.pixels().map(|px| is_set(*px)).collect(),
        }
    }

    /// Returns the mask width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the mask height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` when `(x, y)` is inside the mask and set.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width + x as usize]
    }
}

/// Neighbor offsets, clockwise as displayed, starting east.
const DIRS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const WEST: usize = 4;

fn dir_index(from: (i64, i64), to: (i64, i64)) -> usize {
    let d = (to.0 - from.0, to.1 - from.1);
    DIRS.iter().position(|&o| o == d).unwrap_or(WEST)
}

/// Traces the outer borders of all external components.
///
/// Borders are returned in raster order of their first pixel. Each border
/// is a closed sequence of pixel coordinates with collinear runs compressed
/// to their end points.
pub fn external_borders(mask: &Mask) -> Vec<Vec<(i64, i64)>> {
    let w = mask.width;
    let h = mask.height;
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let outside = outside_background(mask);
    let mut labeled = vec![false; w * h];
    let mut borders = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if !mask.data[idx] || labeled[idx] {
                continue;
            }

            // Flood the component and check whether it faces the outside.
            let mut external = false;
            labeled[idx] = true;
            queue.push_back((x, y));
            while let Some((cx, cy)) = queue.pop_front() {
                if cx == 0 || cy == 0 || cx + 1 == w || cy + 1 == h {
                    external = true;
                }
                for &(dx, dy) in &DIRS {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if mask.data[nidx] {
                        if !labeled[nidx] {
                            labeled[nidx] = true;
                            queue.push_back((nx as usize, ny as usize));
                        }
                    } else if dx == 0 || dy == 0 {
                        external |= outside[nidx];
                    }
                }
            }

            if external {
                let border = trace_outer(mask, (x as i64, y as i64));
                borders.push(compress_runs(border));
            }
        }
    }
    borders
}

/// Marks background pixels 4-connected to the image edge.
fn outside_background(mask: &Mask) -> Vec<bool> {
    let w = mask.width;
    let h = mask.height;
    let mut outside = vec![false; w * h];
    let mut queue = VecDeque::new();
    let seed = |x: usize, y: usize, outside: &mut Vec<bool>, queue: &mut VecDeque<_>| {
        let idx = y * w + x;
        if !mask.data[idx] && !outside[idx] {
            outside[idx] = true;
            queue.push_back((x, y));
        }
    };
    for x in 0..w {
        seed(x, 0, &mut outside, &mut queue);
        seed(x, h - 1, &mut outside, &mut queue);
    }
    for y in 0..h {
        seed(0, y, &mut outside, &mut queue);
        seed(w - 1, y, &mut outside, &mut queue);
    }
    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(1i64, 0i64), (-1, 0), (0, 1), (0, -1)] {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                continue;
            }
            seed(nx as usize, ny as usize, &mut outside, &mut queue);
        }
    }
    outside
}

/// Follows the outer border starting at the first raster pixel of a
/// component, whose west neighbor is background.
fn trace_outer(mask: &Mask, start: (i64, i64)) -> Vec<(i64, i64)> {
    let step = |p: (i64, i64), d: usize| (p.0 + DIRS[d].0, p.1 + DIRS[d].1);

    // Clockwise search from the west neighbor for the first foreground pixel.
    let first = (0..8)
        .map(|k| (WEST + k) % 8)
        .map(|d| step(start, d))
        .find(|&p| mask.get(p.0, p.1));
    let Some(first) = first else {
        return vec![start];
    };

    let mut border = vec![start];
    let mut prev = first;
    let mut cur = start;
    loop {
        // Counter-clockwise search around `cur`, starting just past `prev`.
        let d0 = dir_index(cur, prev);
        let mut next = prev;
        for k in 1..=8 {
            let cand = step(cur, (d0 + 8 - k) % 8);
            if mask.get(cand.0, cand.1) {
                next = cand;
                break;
            }
        }
        if next == start && cur == first {
            break;
        }
        prev = cur;
        cur = next;
        border.push(cur);
    }
    border
}

/// Drops points lying in the middle of straight unit-step runs.
fn compress_runs(points: Vec<(i64, i64)>) -> Vec<(i64, i64)> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let delta = |a: (i64, i64), b: (i64, i64)| (b.0 - a.0, b.1 - a.1);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            delta(prev, points[i]) != delta(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[(i64, i64)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for i in 0..n {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % n];
        twice += x0 * y1 - x1 * y0;
    }
    (twice as f64 * 0.5).abs()
}
