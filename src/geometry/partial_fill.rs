use std::sync::Arc;

use kurbo::{BezPath, Point};

use crate::data::coor::EastNorth;
use crate::data::multipolygon::PolyData;
use crate::data::primitive::Node;

/// Area and perimeter of a polygon in east/north units.
///
/// A list whose last point equals its first is treated as closed; otherwise the closing segment
/// back to the first point is added.
pub fn area_and_perimeter(points: &[EastNorth]) -> (f64, f64) {
    let Some(first) = points.first() else {
        return (0.0, 0.0);
    };
    let closed = points.len() > 1 && points.first() == points.last();
    let segments = if closed {
        points.len() - 1
    } else {
        points.len()
    };

    let mut area = 0.0;
    let mut perimeter = 0.0;
    let mut p1 = *first;
    for i in 1..=segments {
        let p2 = points[if i == segments { 0 } else { i }];
        area += p1.east * p2.north - p2.east * p1.north;
        perimeter += p1.distance(p2);
        p1 = p2;
    }
    (area.abs() / 2.0, perimeter)
}

/// `true` when a partial fill of width `extent` pixels should be drawn instead of a full fill.
///
/// Without a threshold partial fill is always used. Otherwise the covered area is estimated as
/// `perimeter * extent` and compared against `threshold` times the real area.
pub fn use_partial_fill(
    area: f64,
    perimeter: f64,
    extent: f32,
    threshold: Option<f32>,
    scale: f64,
) -> bool {
    match threshold {
        None => true,
        Some(t) => perimeter * f64::from(extent) * scale < f64::from(t) * area,
    }
}

/// Point `q` such that `p1, p2, q` form a right angle, `|q - p2| == extent` and `q` lies on the
/// same side of the line `p1, p2` as `p3`.
///
/// `None` when the angle at `p2` is 90 degrees or less, or when `p1 == p2`.
pub fn displaced_end_point(
    p1: EastNorth,
    p2: EastNorth,
    p3: EastNorth,
    extent: f64,
) -> Option<EastNorth> {
    let dx1 = p2.east - p1.east;
    let dy1 = p2.north - p1.north;
    let dx2 = p3.east - p2.east;
    let dy2 = p3.north - p2.north;
    if dx1 * dx2 + dy1 * dy2 >= 0.0 {
        return None;
    }
    let len = dx1.hypot(dy1);
    if len == 0.0 {
        return None;
    }
    let mut dxm = -dy1 * extent / len;
    let mut dym = dx1 * extent / len;
    if dx1 * dy2 - dx2 * dy1 < 0.0 {
        dxm = -dxm;
        dym = -dym;
    }
    Some(EastNorth::new(p2.east + dxm, p2.north + dym))
}

/// Append the clip outline of one ring to `clip`.
///
/// The outline follows the ring; for rings of three or more points the displaced end points are
/// added after it (last end first) so the mask does not cut the corners of unclosed polygons.
pub fn build_clip(clip: &mut BezPath, points: &[EastNorth], extent: f64) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    clip.move_to(to_point(*first));
    for p in rest {
        clip.line_to(to_point(*p));
    }

    let n = points.len();
    if n < 3 {
        return;
    }
    let fst = points[0];
    let snd = points[1];
    let lst = points[n - 1];
    let lbo = points[n - 2];

    let mut c_lst = displaced_end_point(lbo, lst, fst, extent);
    let c_fst = displaced_end_point(snd, fst, c_lst.unwrap_or(lst), extent);
    if c_lst.is_none()
        && let Some(f) = c_fst
    {
        c_lst = displaced_end_point(lbo, lst, f, extent);
    }
    if let Some(p) = c_lst {
        clip.line_to(to_point(p));
    }
    if let Some(p) = c_fst {
        clip.line_to(to_point(p));
    }
}

/// Clip outline for an unclosed way, in east/north space.
pub fn clip_for_way(nodes: &[Arc<Node>], extent: f64) -> BezPath {
    let points = nodes.iter().map(|n| n.east_north()).collect::<Vec<_>>();
    let mut clip = BezPath::new();
    build_clip(&mut clip, &points, extent);
    clip.close_path();
    clip
}

/// Clip outline for an unclosed multipolygon ring and its inner rings, in east/north space.
pub fn clip_for_polygon(polygon: &PolyData, extent: f64) -> BezPath {
    let mut clip = BezPath::new();
    build_clip(&mut clip, &polygon.east_north(), extent);
    clip.close_path();
    for inner in &polygon.inners {
        build_clip(&mut clip, &inner.east_north(), extent);
        clip.close_path();
    }
    clip
}

fn to_point(en: EastNorth) -> Point {
    Point::new(en.east, en.north)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/partial_fill.rs"]
mod tests;
