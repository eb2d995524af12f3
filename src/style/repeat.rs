use kurbo::{Affine, Rect, Vec2};

use crate::data::primitive::Way;
use crate::foundation::core::ScreenRect;
use crate::render::painter::FrameScope;
use crate::style::image::MapImage;
use crate::view::offset::offset_points;
use crate::view::path::MapViewPath;

/// Vertical alignment of a repeated image relative to the line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatAlign {
    /// Image on the top side of the line.
    Top,
    /// Image centred on the line.
    #[default]
    Center,
    /// Image on the bottom side of the line.
    Bottom,
}

impl RepeatAlign {
    /// Offset relative to the image height, compared to centring the image on the line.
    pub fn alignment_offset(self) -> f64 {
        match self {
            Self::Top => 0.5,
            Self::Center => 0.0,
            Self::Bottom => -0.5,
        }
    }
}

/// Image repeated along a way.
#[derive(Clone, Debug, PartialEq)]
pub struct RepeatImageStyle {
    /// Image drawn at every repetition.
    pub pattern: MapImage,
    /// Sideways offset of the line in pixels.
    pub offset: f32,
    /// Gap between two images in pixels.
    pub spacing: f32,
    /// Shift of the first image along the line in pixels; positive values move the pattern
    /// towards the start of the way.
    pub phase: f32,
    /// Opacity of the images.
    pub opacity: f32,
    /// Vertical alignment.
    pub align: RepeatAlign,
}

impl RepeatImageStyle {
    /// Images without gaps, centred on the line.
    pub fn new(pattern: MapImage) -> Self {
        Self {
            pattern,
            offset: 0.0,
            spacing: 0.0,
            phase: 0.0,
            opacity: 1.0,
            align: RepeatAlign::Center,
        }
    }

    /// Distance between the starts of two images.
    pub fn repeat(&self) -> f64 {
        f64::from(self.pattern.width()) + f64::from(self.spacing.max(0.0))
    }

    /// Vertical position of the image top relative to the line.
    pub fn dy(&self) -> i32 {
        ((self.align.alignment_offset() - 0.5) * f64::from(self.pattern.height())) as i32
    }

    /// Offset of the pattern start, normalised into `[0, repeat)`.
    pub fn start_offset(&self) -> f64 {
        let repeat = self.repeat();
        let start = -f64::from(self.phase) % repeat;
        if start < 0.0 { start + repeat } else { start }
    }

    /// Offset line path of `way` in screen space.
    pub(crate) fn path(&self, way: &Way, scope: &FrameScope) -> MapViewPath {
        let points = way
            .nodes()
            .iter()
            .map(|n| scope.viewport.point_for_node(n))
            .collect::<Vec<_>>();
        MapViewPath::from_points(&offset_points(&points, f64::from(self.offset)))
    }

    pub(crate) fn bounds(&self, way: &Way, scope: &FrameScope) -> Option<ScreenRect> {
        let repeat = self.repeat();
        let h = f64::from(self.pattern.height());
        let dy = f64::from(self.dy());
        let y0 = dy.min(-dy);
        let y1 = dy.max(-dy) + h;
        let mut bounds = ScreenRect::NONEXISTENT;
        self.path(way, scope).visit_clipped_line(
            scope.viewport.clip_rect(repeat),
            |_, start, end| {
                let d = end - start;
                let len = d.hypot();
                let r = Rect::new(-1.0, y0 - 1.0, len.ceil() + 1.0, y1 + 1.0);
                let at = Affine::translate(Vec2::new(start.x, start.y))
                    * Affine::rotate(d.y.atan2(d.x));
                bounds = bounds.union(ScreenRect::covering(r).transform_bounds(at));
            },
        );
        (bounds.width >= 0).then_some(bounds)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/repeat.rs"]
mod tests;
