use kurbo::{BezPath, Point, Rect};

use crate::view::path::MapViewPath;

/// Opening angle of arrow wings and oneway markers (20 degrees).
pub const PHI: f64 = std::f64::consts::PI / 9.0;

/// Distance between two oneway markers along a line, in pixels.
pub const ONEWAY_INTERVAL: f64 = 60.0;

/// Size of the oneway marker casing.
pub const ONEWAY_CASING_SIZE: f64 = 3.0;

/// Size of the inner oneway marker.
pub const ONEWAY_ARROW_SIZE: f64 = 2.0;

/// Appends arrow heads (two wings meeting at a tip) to a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowHelper {
    length: f64,
    sin: f64,
    cos: f64,
}

impl ArrowHelper {
    /// Arrow with wings `length` pixels long, `angle` radians off the line.
    pub fn new(angle: f64, length: f64) -> Self {
        Self {
            length,
            sin: angle.sin(),
            cos: angle.cos(),
        }
    }

    /// Arrow used for orientation markers of a line `line_width` pixels wide.
    pub fn for_line(line_width: f64) -> Self {
        Self::new(PHI, 10.0 + line_width)
    }

    /// Length of the arrow projected onto the line.
    pub fn on_line_length(&self) -> f64 {
        self.length * self.cos
    }

    /// Append an arrow with its tip at `point`, pointing away from `from`.
    pub fn paint_arrow_at(&self, path: &mut BezPath, point: Point, from: Point) {
        let mut dx = from.x - point.x;
        let mut dy = from.y - point.y;
        let norm = dx.hypot(dy);
        if norm <= 1e-10 {
            return;
        }
        dx *= self.length / norm;
        dy *= self.length / norm;
        path.move_to(Point::new(
            point.x + dx * self.cos - dy * self.sin,
            point.y + dx * self.sin + dy * self.cos,
        ));
        path.line_to(point);
        path.line_to(Point::new(
            point.x + dx * self.cos + dy * self.sin,
            point.y - dx * self.sin + dy * self.cos,
        ));
    }
}

/// Orientation arrows for a polyline.
///
/// An arrow is added at the end of each segment long enough to hold it. Selected lines always get
/// the arrow on their last segment; `head_only` limits unselected lines to the last segment.
pub fn orientation_arrows(
    points: &[Point],
    line_width: f64,
    selected: bool,
    head_only: bool,
) -> BezPath {
    let helper = ArrowHelper::for_line(line_width);
    let min_len_sq = (helper.on_line_length() * 1.3).powi(2);
    let mut out = BezPath::new();
    for (i, w) in points.windows(2).enumerate() {
        let (p1, p2) = (w[0], w[1]);
        let last = i + 2 == points.len();
        let long_enough = (p2 - p1).hypot2() > min_len_sq;
        let draw = if selected {
            last || long_enough
        } else {
            (!head_only || last) && long_enough
        };
        if draw {
            helper.paint_arrow_at(&mut out, p2, p1);
        }
    }
    out
}

/// Append one oneway triangle at distance `dist` from `start` along the unit direction
/// `(nx, ny)`.
///
/// The triangle is attached at its incenter so that a casing of `size + 1` leaves an even
/// border of one pixel.
pub fn append_oneway_path(
    reversed: bool,
    start: Point,
    nx: f64,
    ny: f64,
    dist: f64,
    size: f64,
    path: &mut BezPath,
) {
    let (sin, cos) = PHI.sin_cos();
    let dir = if reversed { -1.0 } else { 1.0 };
    let fac = -dir * size * (1.0 + sin) / (sin * cos);
    let sx = nx * fac;
    let sy = ny * fac;

    let x = start.x + nx * (dist + dir * (size / sin));
    let y = start.y + ny * (dist + dir * (size / sin));

    path.move_to(Point::new(x, y));
    path.line_to(Point::new(x + cos * sx - sin * sy, y + sin * sx + cos * sy));
    path.line_to(Point::new(x + cos * sx + sin * sy, y - sin * sx + cos * sy));
    path.line_to(Point::new(x, y));
}

/// Oneway markers along the visible part of `path`: `(casing, arrows)`.
///
/// Markers keep their spacing across segments; the phase is measured from the start of the
/// unclipped path.
pub fn oneway_arrows(path: &MapViewPath, clip: Rect, reversed: bool) -> (BezPath, BezPath) {
    let mut casing = BezPath::new();
    let mut arrows = BezPath::new();
    path.visit_clipped_line(clip, |offset, start, end| {
        let len = start.distance(end);
        if len <= 0.001 {
            return;
        }
        let nx = (end.x - start.x) / len;
        let ny = (end.y - start.y) / len;
        let mut dist = ONEWAY_INTERVAL - offset % ONEWAY_INTERVAL;
        while dist < len {
            append_oneway_path(
                reversed,
                start,
                nx,
                ny,
                dist,
                ONEWAY_CASING_SIZE,
                &mut casing,
            );
            append_oneway_path(
                reversed,
                start,
                nx,
                ny,
                dist,
                ONEWAY_ARROW_SIZE,
                &mut arrows,
            );
            dist += ONEWAY_INTERVAL;
        }
    });
    (casing, arrows)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/arrow.rs"]
mod tests;
