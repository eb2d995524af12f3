use kurbo::Point;

use crate::data::primitive::Way;
use crate::foundation::core::{Rgba8, ScreenRect};
use crate::geometry::arrow::{ONEWAY_CASING_SIZE, PHI};
use crate::render::painter::FrameScope;
use crate::view::offset::offset_points;
use crate::view::path::MapViewPath;
use crate::view::viewport::Viewport;

/// Line end decoration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Flat end at the last point.
    #[default]
    Butt,
    /// Half circle.
    Round,
    /// Half square.
    Square,
}

/// Corner decoration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    /// Sharp corner up to the miter limit.
    Miter,
    /// Rounded corner.
    #[default]
    Round,
    /// Cut corner.
    Bevel,
}

/// Stroke of a way.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LineStyle {
    /// Stroke colour.
    pub color: Rgba8,
    /// Stroke width in pixels.
    pub width: f32,
    /// Dash pattern (on, off, ...).
    pub dashes: Option<Vec<f32>>,
    /// Colour drawn into the gaps of the dash pattern.
    pub dashes_background: Option<Rgba8>,
    /// Sideways offset in pixels, positive to the right.
    pub offset: f32,
    /// End decoration.
    pub cap: LineCap,
    /// Corner decoration.
    pub join: LineJoin,
    /// Miter limit for [`LineJoin::Miter`].
    pub miter_limit: f32,
    /// Draw arrows showing the node order.
    pub show_orientation: bool,
    /// Only the last orientation arrow for unselected ways.
    pub show_head_arrow_only: bool,
    /// Draw oneway markers.
    pub show_oneway: bool,
    /// Oneway markers point against the node order.
    pub oneway_reversed: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::WHITE,
            width: 1.0,
            dashes: None,
            dashes_background: None,
            offset: 0.0,
            cap: LineCap::default(),
            join: LineJoin::default(),
            miter_limit: 10.0,
            show_orientation: false,
            show_head_arrow_only: false,
            show_oneway: false,
            oneway_reversed: false,
        }
    }
}

impl LineStyle {
    /// Solid line.
    pub fn new(color: Rgba8, width: f32) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    /// Dash pattern with zero-length or negative entries rejected.
    pub fn dash_pattern(&self) -> Option<Vec<f64>> {
        let dashes = self.dashes.as_ref()?;
        if dashes.is_empty()
            || dashes.iter().any(|d| !d.is_finite() || *d < 0.0)
            || dashes.iter().all(|d| *d == 0.0)
        {
            return None;
        }
        Some(dashes.iter().map(|d| f64::from(*d)).collect())
    }

    /// Pattern and offset of the stroke filling the gaps: the pattern rotated by one entry.
    pub fn background_dash_pattern(&self) -> Option<(Vec<f64>, f64)> {
        self.dashes_background?;
        let dashes = self.dash_pattern()?;
        let mut rotated = Vec::with_capacity(dashes.len());
        rotated.push(dashes[dashes.len() - 1]);
        rotated.extend_from_slice(&dashes[..dashes.len() - 1]);
        let offset = rotated.get(1).copied().unwrap_or(0.0);
        Some((rotated, offset))
    }

    /// Width actually stroked; 1 px when strokes are disabled at this zoom.
    pub(crate) fn stroke_width(&self, use_strokes: bool) -> f64 {
        if use_strokes {
            f64::from(self.width.max(0.0))
        } else {
            1.0
        }
    }

    /// Screen points of `way`, shifted by the line offset.
    pub(crate) fn screen_points(&self, way: &Way, viewport: &Viewport) -> Vec<Point> {
        let points = way
            .nodes()
            .iter()
            .map(|n| viewport.point_for_node(n))
            .collect::<Vec<_>>();
        offset_points(&points, f64::from(self.offset))
    }

    /// Distance from the centre line that paint can reach.
    fn reach(&self, scope: &FrameScope) -> f64 {
        let config = &scope.settings.config;
        let width = self.stroke_width(scope.settings.use_strokes);
        let join = match self.join {
            LineJoin::Miter => f64::from(self.miter_limit.max(1.0)),
            LineJoin::Round | LineJoin::Bevel => std::f64::consts::SQRT_2,
        };
        let mut reach = width / 2.0 * join;
        let highlight =
            width + f64::from(config.highlight_width) + f64::from(config.wider_highlight);
        reach = reach.max(highlight / 2.0);
        if self.show_orientation {
            let miter = f64::from(self.miter_limit.max(1.0)).min(4.0);
            reach = reach.max((10.0 + width) * miter);
        }
        if self.show_oneway {
            let (sin, cos) = PHI.sin_cos();
            reach = reach.max(ONEWAY_CASING_SIZE * (1.0 + sin) / (sin * cos) + width);
        }
        // Highlighted segments follow the nodes, not the offset line.
        reach + f64::from(self.offset.abs()) + 2.0
    }

    pub(crate) fn bounds(&self, way: &Way, scope: &FrameScope) -> Option<ScreenRect> {
        if way.node_count() < 2 {
            return None;
        }
        let reach = self.reach(scope);
        let path = MapViewPath::from_points(&self.screen_points(way, &scope.viewport));
        let clipped = path.clipped(scope.viewport.clip_rect(reach));
        let r = clipped.bounds()?;
        Some(ScreenRect::covering(r.inflate(reach, reach)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/line.rs"]
mod tests;
