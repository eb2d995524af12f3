use kurbo::{Affine, Rect};

use crate::data::primitive::Primitive;
use crate::foundation::core::{Rgba8, ScreenRect};
use crate::render::painter::FrameScope;
use crate::style::image::MapImage;
use crate::style::placement::PositionStrategy;

/// Fill of a closed way or multipolygon.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaStyle {
    /// Fill colour; its alpha is kept when the selection colours replace it.
    pub color: Rgba8,
    /// Pattern drawn instead of the colour.
    pub fill_image: Option<MapImage>,
    /// Width of the partial fill along the outline, in pixels. `None` fills the whole area.
    pub extent: Option<f32>,
    /// Partial fill is replaced by a full fill when it would cover more than this share of the
    /// area.
    pub extent_threshold: Option<f32>,
}

impl AreaStyle {
    /// Plain colour fill.
    pub fn new(color: Rgba8) -> Self {
        Self {
            color,
            fill_image: None,
            extent: None,
            extent_threshold: None,
        }
    }

    pub(crate) fn bounds(&self, primitive: &Primitive, scope: &FrameScope) -> Option<ScreenRect> {
        let rect = scope.viewport.rectangle_for(&primitive.bbox());
        (rect.width >= 0 && rect.height >= 0).then(|| rect.inflate(1))
    }
}

/// Icon placed inside an area.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaIconStyle {
    /// Icon image.
    pub image: MapImage,
    /// Placement inside the area.
    pub position: PositionStrategy,
    /// Extra rotation in radians.
    pub theta: f64,
}

impl AreaIconStyle {
    /// Icon centred in the visible part of the area.
    pub fn new(image: MapImage) -> Self {
        Self {
            image,
            position: PositionStrategy::PartiallyInside,
            theta: 0.0,
        }
    }

    /// Icon rectangle centred on the origin.
    pub fn icon_rect(&self) -> Rect {
        let w = f64::from(self.image.width());
        let h = f64::from(self.image.height());
        Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
    }

    /// Transform of every icon placement.
    pub(crate) fn placements(&self, primitive: &Primitive, scope: &FrameScope) -> Vec<Affine> {
        let rect = self.icon_rect();
        scope
            .polygons(primitive)
            .iter()
            .filter_map(|path| {
                self.position
                    .find_label_placement(path, rect, &scope.viewport)
            })
            .map(|p| Affine::translate(p.point.to_vec2()) * Affine::rotate(self.theta + p.rotation))
            .collect()
    }

    pub(crate) fn bounds(&self, primitive: &Primitive, scope: &FrameScope) -> Option<ScreenRect> {
        if !scope.settings.show_icons {
            return None;
        }
        let rect = ScreenRect::covering(self.icon_rect());
        // Hint rectangle and its stroke.
        let hinted = rect.inflate(4);
        let bounds = self
            .placements(primitive, scope)
            .into_iter()
            .fold(ScreenRect::NONEXISTENT, |acc, at| {
                acc.union(hinted.transform_bounds(at))
            });
        (bounds.width >= 0).then_some(bounds)
    }
}
