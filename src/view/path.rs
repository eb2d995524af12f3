use std::sync::Arc;

use kurbo::{BezPath, PathEl, Point, Rect, Shape};

use crate::data::primitive::Node;
use crate::view::viewport::Viewport;

/// A polyline/polygon path in screen coordinates.
///
/// Only straight segments are produced; traversal helpers report the running length along the
/// path ("in-line offset") so patterns keep their phase across segments and clipping.
#[derive(Clone, Debug, Default)]
pub struct MapViewPath {
    path: BezPath,
}

impl MapViewPath {
    /// Empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open polyline through `points`.
    pub fn from_points(points: &[Point]) -> Self {
        let mut out = Self::new();
        out.append_points(points, false);
        out
    }

    /// Path through the screen positions of `nodes`. A node list that ends where it starts is
    /// closed instead of repeating the first point.
    pub fn from_nodes(viewport: &Viewport, nodes: &[Arc<Node>]) -> Self {
        let closed = nodes.len() >= 3
            && nodes.first().map(|n| n.id()) == nodes.last().map(|n| n.id());
        let points = nodes
            .iter()
            .map(|n| viewport.point_for_node(n))
            .collect::<Vec<_>>();
        let mut out = Self::new();
        out.append_points(&points, closed);
        out
    }

    /// Wrap a screen-space path made of straight segments.
    pub fn from_bez(path: BezPath) -> Self {
        Self { path }
    }

    /// Transform an east/north path to the screen and clip each closed ring to `clip`.
    pub fn from_east_north(viewport: &Viewport, en_path: &BezPath, clip: Rect) -> Self {
        let mut screen = en_path.clone();
        screen.apply_affine(viewport.affine());
        let mut out = Self::new();
        for ring in rings(&screen) {
            let clipped = clip_polygon(&ring, clip);
            if clipped.len() >= 3 {
                out.append_points(&clipped, true);
            }
        }
        out
    }

    /// Append a polyline; `closed` drops a repeated last point and closes the subpath.
    pub fn append_points(&mut self, points: &[Point], closed: bool) {
        let mut pts = points;
        if closed && pts.len() >= 2 && pts.first() == pts.last() {
            pts = &pts[..pts.len() - 1];
        }
        let Some((first, rest)) = pts.split_first() else {
            return;
        };
        self.path.move_to(*first);
        for p in rest {
            self.path.line_to(*p);
        }
        if closed {
            self.path.close_path();
        }
    }

    /// Start a subpath.
    pub fn move_to(&mut self, p: Point) {
        self.path.move_to(p);
    }

    /// Straight segment to `p`.
    pub fn line_to(&mut self, p: Point) {
        self.path.line_to(p);
    }

    /// Close the current subpath.
    pub fn close(&mut self) {
        self.path.close_path();
    }

    /// Underlying path.
    pub fn as_bez(&self) -> &BezPath {
        &self.path
    }

    /// `true` when the path has no segment.
    pub fn is_empty(&self) -> bool {
        self.segments().is_empty()
    }

    /// Bounding box of all points.
    pub fn bounds(&self) -> Option<Rect> {
        if self.path.elements().is_empty() {
            return None;
        }
        Some(self.path.bounding_box())
    }

    /// Total length of all segments.
    pub fn length(&self) -> f64 {
        self.segments().iter().map(|(a, b)| a.distance(*b)).sum()
    }

    /// Straight segments in order; closing segments are included.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let mut out = Vec::new();
        let mut start = None;
        let mut last = None;
        for el in self.path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    start = Some(p);
                    last = Some(p);
                }
                PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                    if let Some(l) = last {
                        out.push((l, p));
                    }
                    last = Some(p);
                }
                PathEl::ClosePath => {
                    if let (Some(l), Some(s)) = (last, start)
                        && l != s
                    {
                        out.push((l, s));
                    }
                    last = start;
                }
            }
        }
        out
    }

    /// Visit every segment with its offset from the start of the path.
    pub fn visit_line(&self, mut consumer: impl FnMut(f64, Point, Point)) -> f64 {
        let mut offset = 0.0;
        for (a, b) in self.segments() {
            consumer(offset, a, b);
            offset += a.distance(b);
        }
        offset
    }

    /// Visit the parts of the segments inside `clip`. The offset passed to `consumer` is the
    /// distance from the start of the unclipped path to the clipped start point.
    pub fn visit_clipped_line(&self, clip: Rect, mut consumer: impl FnMut(f64, Point, Point)) {
        self.visit_line(|offset, a, b| {
            if let Some((t0, t1)) = clip_segment(a, b, clip) {
                let len = a.distance(b);
                consumer(offset + t0 * len, a.lerp(b, t0), a.lerp(b, t1));
            }
        });
    }

    /// Each subpath treated as a closed ring and clipped to `clip`.
    pub fn clipped_polygon(&self, clip: Rect) -> MapViewPath {
        let mut out = MapViewPath::new();
        for ring in rings(&self.path) {
            let clipped = clip_polygon(&ring, clip);
            if clipped.len() >= 3 {
                out.append_points(&clipped, true);
            }
        }
        out
    }

    /// Even-odd containment; every subpath counts as a closed ring.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for ring in rings(&self.path) {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > p.y) != (b.y > p.y)
                    && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }

    /// Polyline made of the parts of the path inside `clip`.
    pub fn clipped(&self, clip: Rect) -> MapViewPath {
        let mut out = MapViewPath::new();
        let mut last: Option<Point> = None;
        self.visit_clipped_line(clip, |_, a, b| {
            if last != Some(a) {
                out.move_to(a);
            }
            out.line_to(b);
            last = Some(b);
        });
        out
    }
}

/// Liang-Barsky clipping of the segment `a -> b`; returns the parameter range inside `clip`.
pub(crate) fn clip_segment(a: Point, b: Point, clip: Rect) -> Option<(f64, f64)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, a.x - clip.x0),
        (dx, clip.x1 - a.x),
        (-dy, a.y - clip.y0),
        (dy, clip.y1 - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    (t0 <= t1).then_some((t0, t1))
}

fn rings(path: &BezPath) -> Vec<Vec<Point>> {
    let mut out = Vec::new();
    let mut cur: Vec<Point> = Vec::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
                cur.push(p);
            }
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => cur.push(p),
            PathEl::ClosePath => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Sutherland-Hodgman clipping of a closed polygon against an axis aligned rectangle.
pub(crate) fn clip_polygon(points: &[Point], clip: Rect) -> Vec<Point> {
    if points.iter().all(|p| clip.contains(*p)) {
        return points.to_vec();
    }

    #[derive(Clone, Copy)]
    enum Edge {
        Left(f64),
        Right(f64),
        Top(f64),
        Bottom(f64),
    }

    fn inside(e: Edge, p: Point) -> bool {
        match e {
            Edge::Left(x) => p.x >= x,
            Edge::Right(x) => p.x <= x,
            Edge::Top(y) => p.y >= y,
            Edge::Bottom(y) => p.y <= y,
        }
    }

    fn cross(e: Edge, a: Point, b: Point) -> Point {
        match e {
            Edge::Left(x) | Edge::Right(x) => {
                let t = (x - a.x) / (b.x - a.x);
                Point::new(x, a.y + t * (b.y - a.y))
            }
            Edge::Top(y) | Edge::Bottom(y) => {
                let t = (y - a.y) / (b.y - a.y);
                Point::new(a.x + t * (b.x - a.x), y)
            }
        }
    }

    let mut poly = points.to_vec();
    for edge in [
        Edge::Left(clip.x0),
        Edge::Right(clip.x1),
        Edge::Top(clip.y0),
        Edge::Bottom(clip.y1),
    ] {
        if poly.is_empty() {
            break;
        }
        let input = std::mem::take(&mut poly);
        let mut prev = input[input.len() - 1];
        for &cur in &input {
            match (inside(edge, prev), inside(edge, cur)) {
                (true, true) => poly.push(cur),
                (true, false) => poly.push(cross(edge, prev, cur)),
                (false, true) => {
                    poly.push(cross(edge, prev, cur));
                    poly.push(cur);
                }
                (false, false) => {}
            }
            prev = cur;
        }
    }
    poly
}

#[cfg(test)]
#[path = "../../tests/unit/view/path.rs"]
mod tests;
