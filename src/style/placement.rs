use std::cmp::Ordering;
use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::{Affine, Point, Rect, Vec2};

use crate::view::path::MapViewPath;
use crate::view::viewport::Viewport;

/// Where a label or icon goes on screen and how it is rotated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    /// Centre of the label.
    pub point: Point,
    /// Rotation in radians.
    pub rotation: f64,
}

/// One glyph of a shaped string, measured along the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphAdvance {
    /// Pen position of the glyph from the start of the string.
    pub x: f64,
    /// Advance width.
    pub advance: f64,
}

/// Strategy for placing a label or icon on a line or inside an area.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionStrategy {
    /// Along the longest visible straight stretch, shifted by `y_offset` pixels.
    OnLine {
        /// Perpendicular offset from the line.
        #[serde(default)]
        y_offset: f64,
    },
    /// At the centre of the visible area, even if the label sticks out.
    PartiallyInside,
    /// Only where the whole label fits inside the area.
    CompletelyInside,
}

impl Default for PositionStrategy {
    fn default() -> Self {
        Self::OnLine { y_offset: 0.0 }
    }
}

/// Depth of the grid refinement used by [`PositionStrategy::CompletelyInside`].
const INSIDE_SEARCH_DEPTH: u32 = 4;
/// Cells per side of the grid used by [`PositionStrategy::PartiallyInside`].
const PARTIAL_SEARCH_CELLS: u32 = 8;

impl PositionStrategy {
    /// Strategy for a style keyword; unknown or absent keywords give `default`.
    pub fn from_keyword(keyword: Option<&str>, default: Self) -> Self {
        match keyword {
            Some("center") => Self::PartiallyInside,
            Some("inside") => Self::CompletelyInside,
            Some("line") => Self::OnLine { y_offset: 0.0 },
            _ => default,
        }
    }

    /// Same strategy with a vertical label offset applied.
    pub fn with_added_offset(self, dy: f64) -> Self {
        match self {
            Self::OnLine { y_offset } if dy.abs() >= 1e-5 => Self::OnLine {
                y_offset: y_offset - dy,
            },
            other => other,
        }
    }

    /// `true` when the strategy can lay glyphs out one by one along a path.
    pub fn supports_glyphs(&self) -> bool {
        matches!(self, Self::OnLine { .. })
    }

    /// Best placement of a label with bounds `label` on `path`, if any.
    pub fn find_label_placement(
        &self,
        path: &MapViewPath,
        label: Rect,
        viewport: &Viewport,
    ) -> Option<LabelPlacement> {
        match *self {
            Self::OnLine { y_offset } => {
                let best = optimal_half_segment(path, label.width(), viewport)?;
                let center = best.start.midpoint(best.end);
                let theta = upside_theta(best.start, best.end);
                Some(LabelPlacement {
                    point: Point::new(
                        center.x - theta.sin() * y_offset,
                        center.y + theta.cos() * y_offset,
                    ),
                    rotation: theta,
                })
            }
            Self::PartiallyInside => partially_inside(path, label, viewport),
            Self::CompletelyInside => completely_inside(path, label, viewport),
        }
    }

    /// Per-glyph transforms laying `glyphs` along `path`; glyphs are drawn with their pen
    /// position at the origin.
    ///
    /// `None` when the strategy does not support glyph layout or the path is shorter than the
    /// text plus 8 px.
    pub fn glyph_transforms(
        &self,
        path: &MapViewPath,
        text_width: f64,
        glyphs: &[GlyphAdvance],
        font_size: f64,
        viewport: &Viewport,
    ) -> Option<Vec<Affine>> {
        let Self::OnLine { y_offset } = *self else {
            return None;
        };
        let path_length = path.length();
        if path_length < text_width + 8.0 || glyphs.is_empty() {
            return None;
        }

        let middle = optimal_half_segment(path, text_width, viewport)
            .map(|s| s.offset)
            .unwrap_or(path_length / 2.0);

        let rotate = should_rotate_text(path, middle - text_width / 2.0, middle + text_width / 2.0);
        let dir = if rotate { -1.0 } else { 1.0 };
        let start = middle - dir * text_width / 2.0;
        let pre_rotate = if rotate { PI } else { 0.0 };

        let mut placed = glyphs
            .iter()
            .enumerate()
            .map(|(i, g)| (start + dir * (g.x + g.advance / 2.0), i))
            .collect::<Vec<_>>();
        placed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut out = vec![Affine::IDENTITY; glyphs.len()];
        let mut next = 0usize;
        path.visit_line(|seg_start, a, b| {
            if next >= placed.len() {
                return;
            }
            let seg_len = a.distance(b);
            let seg_end = seg_start + seg_len;
            let theta = (b.y - a.y).atan2(b.x - a.x);
            let is_last = seg_end > path_length - 0.1;
            while next < placed.len() && (placed[next].0 <= seg_end || is_last) {
                let (offset, i) = placed[next];
                let t = if seg_len > 0.0 {
                    (offset - seg_start) / seg_len
                } else {
                    0.0
                };
                let p = a.lerp(b, t);
                out[i] = Affine::translate(p.to_vec2())
                    * Affine::rotate(theta + pre_rotate)
                    * Affine::translate(Vec2::new(
                        -glyphs[i].advance / 2.0,
                        y_offset + font_size * 0.25,
                    ));
                next += 1;
            }
        });
        Some(out)
    }
}

/// Transform drawing a string with bounds `string_bounds` centred on `placement`.
///
/// Unrotated labels snap to whole pixels.
pub fn display_text_transform(string_bounds: Rect, placement: &LabelPlacement) -> Affine {
    let c = string_bounds.center();
    if placement.rotation.abs() < 0.01 {
        Affine::translate(Vec2::new(
            (placement.point.x - c.x).round(),
            (placement.point.y - c.y).round(),
        ))
    } else {
        Affine::translate(placement.point.to_vec2())
            * Affine::rotate(placement.rotation)
            * Affine::translate(Vec2::new(-c.x, -c.y))
    }
}

#[derive(Clone, Copy, Debug)]
struct HalfSegment {
    start: Point,
    end: Point,
    quality: f64,
    offset: f64,
}

fn optimal_half_segment(
    path: &MapViewPath,
    label_width: f64,
    viewport: &Viewport,
) -> Option<HalfSegment> {
    let min_len = 2.0 * (label_width + 4.0);
    let mut halves = Vec::new();
    let length = path.visit_line(|offset, start, end| {
        let len = start.distance(end);
        if len > min_len {
            let center = start.midpoint(end);
            halves.push(HalfSegment {
                start,
                end: center,
                quality: quality(viewport, start, center) + 0.1,
                offset: offset + 0.25 * len,
            });
            halves.push(HalfSegment {
                start: center,
                end,
                quality: quality(viewport, center, end),
                offset: offset + 0.75 * len,
            });
        }
    });
    let score = |s: &HalfSegment| s.quality - 1e-5 * (s.offset - length / 2.0).abs();
    // Ties keep the earlier half segment.
    halves
        .into_iter()
        .fold(None, |best: Option<HalfSegment>, s| match best {
            Some(b) if score(&s).total_cmp(&score(&b)) != Ordering::Greater => Some(b),
            _ => Some(s),
        })
}

fn quality(viewport: &Viewport, a: Point, b: Point) -> f64 {
    f64::from(u8::from(viewport.is_in_view(a))) + f64::from(u8::from(viewport.is_in_view(b)))
}

fn upside_theta(start: Point, end: Point) -> f64 {
    let theta = (end.y - start.y).atan2(end.x - start.x);
    if theta < -FRAC_PI_2 {
        theta + PI
    } else if theta > FRAC_PI_2 {
        theta - PI
    } else {
        theta
    }
}

/// `true` when more of the stretch `[from, to]` runs right-to-left than left-to-right.
fn should_rotate_text(path: &MapViewPath, from: f64, to: f64) -> bool {
    let mut up = 0.0;
    let mut down = 0.0;
    path.visit_line(|offset, a, b| {
        let len = a.distance(b);
        if offset > to || offset + len < from {
            return;
        }
        let covered = (offset + len).min(to) - offset.max(from);
        if a.x < b.x {
            up += covered;
        } else {
            down += covered;
        }
    });
    up < down
}

fn partially_inside(
    path: &MapViewPath,
    label: Rect,
    viewport: &Viewport,
) -> Option<LabelPlacement> {
    let visible = path.clipped_polygon(viewport.view_rect());
    let bounds = visible.bounds()?;
    if bounds.width() < label.width() || bounds.height() < label.height() {
        tracing::trace!(?bounds, ?label, "area too small for label");
        return None;
    }
    let center = bounds.center();
    if visible.contains(center) {
        return Some(LabelPlacement {
            point: center,
            rotation: 0.0,
        });
    }

    // Cell centre farthest from the outline.
    let segments = visible.segments();
    let mut best: Option<(f64, Point)> = None;
    for cell in grid_centers(bounds, PARTIAL_SEARCH_CELLS) {
        if !visible.contains(cell) {
            continue;
        }
        let clearance = segments
            .iter()
            .map(|(a, b)| distance_to_segment(cell, *a, *b))
            .fold(f64::INFINITY, f64::min);
        if best.is_none_or(|(d, _)| clearance > d) {
            best = Some((clearance, cell));
        }
    }
    best.map(|(_, point)| LabelPlacement {
        point,
        rotation: 0.0,
    })
}

fn completely_inside(
    path: &MapViewPath,
    label: Rect,
    viewport: &Viewport,
) -> Option<LabelPlacement> {
    let visible = path.clipped_polygon(viewport.view_rect());
    let bounds = visible.bounds()?;
    if bounds.width() < label.width() || bounds.height() < label.height() {
        return None;
    }
    let segments = visible.segments();
    let fits = |c: Point| {
        let r = Rect::from_center_size(c, label.size());
        let corners = [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x0, r.y1),
            Point::new(r.x1, r.y1),
        ];
        corners.iter().all(|p| visible.contains(*p))
            && !segments.iter().any(|&(a, b)| segment_crosses_rect(a, b, r))
    };

    let mut queue = VecDeque::from([(bounds, 0u32)]);
    while let Some((cell, depth)) = queue.pop_front() {
        let c = cell.center();
        if fits(c) {
            return Some(LabelPlacement {
                point: c,
                rotation: 0.0,
            });
        }
        if depth < INSIDE_SEARCH_DEPTH {
            let (w, h) = (cell.width() / 2.0, cell.height() / 2.0);
            for (dx, dy) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
                let origin = Point::new(cell.x0 + dx, cell.y0 + dy);
                let sub = Rect::from_origin_size(origin, (w, h));
                queue.push_back((sub, depth + 1));
            }
        }
    }
    tracing::trace!(?bounds, ?label, "no position fits the label inside the area");
    None
}

fn grid_centers(bounds: Rect, cells: u32) -> impl Iterator<Item = Point> {
    let n = f64::from(cells);
    (0..cells).flat_map(move |i| {
        (0..cells).map(move |j| {
            Point::new(
                bounds.x0 + (f64::from(i) + 0.5) * bounds.width() / n,
                bounds.y0 + (f64::from(j) + 0.5) * bounds.height() / n,
            )
        })
    })
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// `true` when the segment passes through the interior of `r`.
fn segment_crosses_rect(a: Point, b: Point, r: Rect) -> bool {
    let inner = r.inset(-1e-9);
    crate::view::path::clip_segment(a, b, inner).is_some_and(|(t0, t1)| t1 - t0 > 1e-12)
}

#[cfg(test)]
#[path = "../../tests/unit/style/placement.rs"]
mod tests;
