use kurbo::{Point, Vec2};

/// Offsets below this many pixels leave the points unchanged.
const MIN_OFFSET: f64 = 0.1;

/// Shift a polyline sideways by `offset` pixels; positive values move it to the right of the
/// direction of travel (screen coordinates, y down).
///
/// Interior points are placed on the intersection of both shifted segments. Repeated points are
/// dropped first; hairpin turns fall back to the outgoing segment's normal.
pub fn offset_points(points: &[Point], offset: f64) -> Vec<Point> {
    let mut pts: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    if offset.abs() < MIN_OFFSET || pts.len() < 2 {
        return pts;
    }

    let normal = |a: Point, b: Point| -> Vec2 {
        let d = b - a;
        let len = d.hypot();
        Vec2::new(-d.y / len, d.x / len)
    };

    let n = pts.len();
    let closed = n >= 4 && pts[0] == pts[n - 1];
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = if i > 0 {
            Some(pts[i - 1])
        } else if closed {
            Some(pts[n - 2])
        } else {
            None
        };
        let next = if i + 1 < n {
            Some(pts[i + 1])
        } else if closed {
            Some(pts[1])
        } else {
            None
        };
        let cur = pts[i];
        let shifted = match (prev, next) {
            (Some(a), Some(b)) => {
                let n_in = normal(a, cur);
                let n_out = normal(cur, b);
                let denom = 1.0 + n_in.dot(n_out);
                if denom < 1e-3 {
                    cur + n_out * offset
                } else {
                    cur + (n_in + n_out) * (offset / denom)
                }
            }
            (None, Some(b)) => cur + normal(cur, b) * offset,
            (Some(a), None) => cur + normal(a, cur) * offset,
            (None, None) => cur,
        };
        out.push(shifted);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/view/offset.rs"]
mod tests;
