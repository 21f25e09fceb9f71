//! Quadrilateral helpers and perspective transforms.

use crate::geometry::Point;
use crate::util::math::solve_linear;

/// Orders four points as top-left, top-right, bottom-right, bottom-left.
///
/// TL minimizes `x + y`, BR maximizes it; TR minimizes `y - x`, BL
/// maximizes it. Ties keep the earliest point.
pub fn order_corners(pts: [Point; 4]) -> [Point; 4] {
    let pick = |key: &dyn Fn(Point) -> f64, want_max: bool| {
        let mut best = pts[0];
        for &p in &pts[1..] {
            let better = if want_max {
                key(p) > key(best)
            } else {
                key(p) < key(best)
            };
            if better {
                best = p;
            }
        }
        best
    };
    let sum = |p: Point| p.x + p.y;
    let diff = |p: Point| p.y - p.x;
    [
        pick(&sum, false),
        pick(&diff, false),
        pick(&sum, true),
        pick(&diff, true),
    ]
}

/// Moves every corner `margin` pixels away from the vertex centroid.
pub fn push_outward(quad: [Point; 4], margin: f64) -> [Point; 4] {
    let cx = quad.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = quad.iter().map(|p| p.y).sum::<f64>() / 4.0;
    quad.map(|p| {
        let vx = p.x - cx;
        let vy = p.y - cy;
        let len = (vx * vx + vy * vy).sqrt() + 1e-6;
        Point::new(p.x + vx / len * margin, p.y + vy / len * margin)
    })
}

/// Translates every corner by `(dx, dy)`.
pub fn translate(quad: [Point; 4], dx: f64, dy: f64) -> [Point; 4] {
    quad.map(|p| Point::new(p.x + dx, p.y + dy))
}

/// Planar projective transform `p' = H p` in homogeneous coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    m: [f64; 9],
}

impl Homography {
    /// Solves the transform mapping each `src[i]` onto `dst[i]`.
    ///
    /// Returns `None` when three or more points are collinear.
    pub fn from_quads(src: [Point; 4], dst: [Point; 4]) -> Option<Self> {
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];
        for i in 0..4 {
            let (x, y) = (src[i].x, src[i].y);
            let (u, v) = (dst[i].x, dst[i].y);
            a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u];
            b[2 * i] = u;
            a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v];
            b[2 * i + 1] = v;
        }
        let h = solve_linear(a, b)?;
        let m = [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0];
        if m.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self { m })
    }

    /// Maps a point; `None` when it lands on the line at infinity.
    pub fn apply(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let w = m[6] * p.x + m[7] * p.y + m[8];
        if w.abs() < 1e-12 {
            return None;
        }
        Some(Point::new(
            (m[0] * p.x + m[1] * p.y + m[2]) / w,
            (m[3] * p.x + m[4] * p.y + m[5]) / w,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{order_corners, push_outward, Homography};
    use crate::geometry::Point;

    #[test]
    fn corners_are_ordered_clockwise_from_top_left() {
        let tl = Point::new(10.0, 12.0);
        let tr = Point::new(90.0, 5.0);
        let br = Point::new(95.0, 80.0);
        let bl = Point::new(8.0, 70.0);
        assert_eq!(order_corners([br, tl, bl, tr]), [tl, tr, br, bl]);
    }

    #[test]
    fn push_outward_grows_square_diagonally() {
        let sq = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let out = push_outward(sq, 2f64.sqrt());
        assert!((out[0].x + 1.0).abs() < 1e-5 && (out[0].y + 1.0).abs() < 1e-5);
        assert!((out[2].x - 11.0).abs() < 1e-5 && (out[2].y - 11.0).abs() < 1e-5);
    }

    #[test]
    fn homography_maps_corners_exactly() {
        let src = [
            Point::new(8.0, 0.0),
            Point::new(92.0, 0.0),
            Point::new(92.0, 200.0),
            Point::new(8.0, 200.0),
        ];
        let dst = [
            Point::new(310.0, 120.0),
            Point::new(520.0, 140.0),
            Point::new(540.0, 600.0),
            Point::new(300.0, 590.0),
        ];
        let h = Homography::from_quads(src, dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let p = h.apply(*s).unwrap();
            assert!(p.distance(*d) < 1e-6, "{p:?} vs {d:?}");
        }
    }

    #[test]
    fn collinear_points_have_no_homography() {
        let line = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        ];
        let dst = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!(Homography::from_quads(line, dst).is_none());
    }
}
