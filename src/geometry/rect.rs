//! Convex hull and minimum-area bounding rectangle.

use crate::geometry::Point;

/// A rectangle with arbitrary orientation.
///
/// `width` is measured along `(cos a, sin a)` and `height` along
/// `(-sin a, cos a)` in image coordinates (y down), with
/// `angle_deg ∈ [0, 90)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatedRect {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

impl RotatedRect {
    /// Returns the four corners, starting at the `(-w/2, -h/2)` corner.
    pub fn corners(&self) -> [Point; 4] {
        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        let u = Point::new(cos * self.width * 0.5, sin * self.width * 0.5);
        let v = Point::new(-sin * self.height * 0.5, cos * self.height * 0.5);
        let c = self.center;
        [
            Point::new(c.x - u.x - v.x, c.y - u.y - v.y),
            Point::new(c.x + u.x - v.x, c.y + u.y - v.y),
            Point::new(c.x + u.x + v.x, c.y + u.y + v.y),
            Point::new(c.x - u.x + v.x, c.y - u.y + v.y),
        ]
    }
}

/// Convex hull via the monotone chain algorithm, without collinear points.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: Point, a: Point, b: Point| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);
    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Smallest-area rectangle enclosing `points`.
///
/// One side of the optimal rectangle is collinear with a hull edge, so
/// every hull edge direction is tried. Ties keep the first edge found.
pub fn min_area_rect(points: &[Point]) -> RotatedRect {
    let hull = convex_hull(points);
    match hull.len() {
        0 => RotatedRect {
            center: Point::new(0.0, 0.0),
            width: 0.0,
            height: 0.0,
            angle_deg: 0.0,
        },
        1 => RotatedRect {
            center: hull[0],
            width: 0.0,
            height: 0.0,
            angle_deg: 0.0,
        },
        _ => {
            let mut best: Option<(f64, RotatedRect)> = None;
            let n = hull.len();
            for i in 0..n {
                let a = hull[i];
                let b = hull[(i + 1) % n];
                let len = a.distance(b);
                if len == 0.0 {
                    continue;
                }
                let u = Point::new((b.x - a.x) / len, (b.y - a.y) / len);
                let v = Point::new(-u.y, u.x);
                let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
                let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
                for p in &hull {
                    let pu = p.x * u.x + p.y * u.y;
                    let pv = p.x * v.x + p.y * v.y;
                    min_u = min_u.min(pu);
                    max_u = max_u.max(pu);
                    min_v = min_v.min(pv);
                    max_v = max_v.max(pv);
                }
                let width = max_u - min_u;
                let height = max_v - min_v;
                let area = width * height;
                if best.as_ref().is_some_and(|(best_area, _)| area >= *best_area - 1e-9) {
                    continue;
                }
                let mid_u = (min_u + max_u) * 0.5;
                let mid_v = (min_v + max_v) * 0.5;
                let rect = RotatedRect {
                    center: Point::new(u.x * mid_u + v.x * mid_v, u.y * mid_u + v.y * mid_v),
                    width,
                    height,
                    angle_deg: u.y.atan2(u.x).to_degrees(),
                };
                best = Some((area, rect));
            }
            match best {
                Some((_, rect)) => normalize(rect),
                None => RotatedRect {
                    center: hull[0],
                    width: 0.0,
                    height: 0.0,
                    angle_deg: 0.0,
                },
            }
        }
    }
}

/// Folds the angle into `[0, 90)`, swapping sides when turning by 90°.
fn normalize(mut rect: RotatedRect) -> RotatedRect {
    const EPS: f64 = 1e-9;
    let mut angle = rect.angle_deg.rem_euclid(180.0);
    if angle >= 180.0 - EPS {
        angle = 0.0;
    }
    if angle >= 90.0 - EPS {
        angle = (angle - 90.0).max(0.0);
        std::mem::swap(&mut rect.width, &mut rect.height);
    }
    rect.angle_deg = angle;
    rect
}
