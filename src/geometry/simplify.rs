//! Closed-polygon simplification (Douglas-Peucker).

use crate::geometry::Point;

/// Perimeter of a closed polygon.
pub fn perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].distance(points[(i + 1) % n]))
        .sum()
}

/// Simplifies a closed polygon so no dropped vertex lies farther than
/// `epsilon` from the kept outline.
///
/// The ring is split at its first vertex and the vertex farthest from it;
/// each half is simplified independently, so both split points survive.
/// Output keeps the input's vertex order.
pub fn approx_closed(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let origin = points[0];
    let far = (1..n)
        .max_by(|&a, &b| {
            origin
                .distance(points[a])
                .total_cmp(&origin.distance(points[b]))
        })
        .unwrap_or(0);
    if far == 0 || origin.distance(points[far]) == 0.0 {
        return vec![origin];
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;

    let first: Vec<usize> = (0..=far).collect();
    let second: Vec<usize> = (far..n).chain(std::iter::once(0)).collect();
    mark_chain(points, &first, epsilon, &mut keep);
    mark_chain(points, &second, epsilon, &mut keep);

    (0..n).filter(|&i| keep[i]).map(|i| points[i]).collect()
}

/// Douglas-Peucker over an open chain given by indices into `points`.
fn mark_chain(points: &[Point], chain: &[usize], epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(0usize, chain.len().saturating_sub(1))];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let a = points[chain[lo]];
        let b = points[chain[hi]];
        let mut best = lo;
        let mut best_dist = -1.0f64;
        for k in (lo + 1)..hi {
            let d = line_distance(points[chain[k]], a, b);
            if d > best_dist {
                best_dist = d;
                best = k;
            }
        }
        if best_dist > epsilon {
            keep[chain[best]] = true;
            stack.push((lo, best));
            stack.push((best, hi));
        }
    }
}

/// Distance from `p` to the line through `a` and `b`.
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}
