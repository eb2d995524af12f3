use kurbo::Rect;

use crate::data::primitive::Primitive;
use crate::foundation::core::ScreenRect;
use crate::render::order::RecordFlags;
use crate::render::painter::{FrameScope, MapPainter};
use crate::render::text::TextShaper;
use crate::style::area::{AreaIconStyle, AreaStyle};
use crate::style::defaults::DefaultStyles;
use crate::style::line::LineStyle;
use crate::style::node::NodeStyle;
use crate::style::placement::display_text_transform;
use crate::style::repeat::RepeatImageStyle;
use crate::style::text::{BoxTextStyle, TextStyle};

/// The drawable part of a style element.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleKind {
    /// Fill of a closed way or multipolygon.
    Area(AreaStyle),
    /// Icon inside an area.
    AreaIcon(AreaIconStyle),
    /// Stroke of a way.
    Line(LineStyle),
    /// Image repeated along a way.
    RepeatImage(RepeatImageStyle),
    /// Marker of a node, or the icon of a turn restriction.
    Node(NodeStyle),
    /// Label next to a node.
    BoxText(BoxTextStyle),
    /// Label along a way or inside an area.
    Text(TextStyle),
}

impl StyleKind {
    /// Major z-index used when the style source does not set one.
    pub fn default_major_z_index(&self) -> f32 {
        match self {
            Self::Area(_) => 1.0,
            Self::AreaIcon(_) => 4.8,
            Self::Line(_) => 2.0,
            Self::RepeatImage(_) => 2.9,
            Self::Node(_) => 4.0,
            Self::BoxText(_) => 5.0,
            Self::Text(_) => 4.9,
        }
    }
}

/// One drawable style of a primitive with its ordering attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleElement {
    /// Coarse layer: fills below lines below icons below labels.
    pub major_z_index: f32,
    /// Order inside a layer.
    pub z_index: f32,
    /// Order between styles of the same primitive.
    pub object_z_index: f32,
    /// Modifier styles extend another style of the primitive; they never draw direction arrows.
    pub is_modifier: bool,
    /// Selected primitives switch to the selection colour.
    pub default_selected_handling: bool,
    /// What to draw.
    pub kind: StyleKind,
}

impl StyleElement {
    /// Element with the default z-indices of `kind`.
    pub fn new(kind: StyleKind) -> Self {
        Self {
            major_z_index: kind.default_major_z_index(),
            z_index: 0.0,
            object_z_index: 0.0,
            is_modifier: false,
            default_selected_handling: true,
            kind,
        }
    }

    /// Set the major z-index.
    pub fn with_major_z_index(mut self, z: f32) -> Self {
        self.major_z_index = z;
        self
    }

    /// Set the z-index.
    pub fn with_z_index(mut self, z: f32) -> Self {
        self.z_index = z;
        self
    }

    /// Set the object z-index.
    pub fn with_object_z_index(mut self, z: f32) -> Self {
        self.object_z_index = z;
        self
    }

    /// Mark as modifier.
    pub fn with_modifier(mut self, is_modifier: bool) -> Self {
        self.is_modifier = is_modifier;
        self
    }

    /// Enable or disable the selection colour.
    pub fn with_default_selected_handling(mut self, enabled: bool) -> Self {
        self.default_selected_handling = enabled;
        self
    }

    /// `true` when this is the built-in default point style.
    pub fn is_default_simple_node(&self) -> bool {
        *self == *DefaultStyles::simple_node()
    }

    /// Screen bounds of everything [`StyleElement::paint`] may draw; `None` when it draws
    /// nothing.
    pub(crate) fn bounds(
        &self,
        primitive: &Primitive,
        scope: &FrameScope,
        shaper: &mut TextShaper,
    ) -> Option<ScreenRect> {
        match &self.kind {
            StyleKind::Area(style) => match primitive {
                Primitive::Node(_) => None,
                _ => style.bounds(primitive, scope),
            },
            StyleKind::AreaIcon(style) => style.bounds(primitive, scope),
            StyleKind::Line(style) => style.bounds(primitive.as_way()?, scope),
            StyleKind::RepeatImage(style) => style.bounds(primitive.as_way()?, scope),
            StyleKind::Node(style) => style.bounds(primitive, scope),
            StyleKind::BoxText(style) => box_text_bounds(style, primitive, scope, shaper),
            StyleKind::Text(style) => text_bounds(style, primitive, scope, shaper),
        }
    }

    /// Draw this element for `primitive`.
    pub(crate) fn paint(
        &self,
        primitive: &Primitive,
        painter: &mut MapPainter<'_>,
        flags: RecordFlags,
    ) {
        let selected = flags.is_selected();
        let member = flags.is_member();
        let outer_member = flags.is_outer_member();
        match &self.kind {
            StyleKind::Area(style) => painter.paint_area(primitive, style, selected, outer_member),
            StyleKind::AreaIcon(style) => {
                painter.paint_area_icon(primitive, style, selected, member || outer_member)
            }
            StyleKind::Line(style) => {
                if let Some(way) = primitive.as_way() {
                    painter.paint_line(way, style, self, selected, member || outer_member);
                }
            }
            StyleKind::RepeatImage(style) => {
                if let Some(way) = primitive.as_way() {
                    painter.paint_repeat_image(way, style);
                }
            }
            StyleKind::Node(style) => painter.paint_node(
                primitive,
                style,
                self.default_selected_handling,
                selected,
                member || outer_member,
            ),
            StyleKind::BoxText(style) => {
                if let Some(node) = primitive.as_node() {
                    painter.paint_box_text(node, primitive, style);
                }
            }
            StyleKind::Text(style) => painter.paint_text(primitive, style),
        }
    }
}

fn halo_margin(radius: f32) -> i32 {
    2 + radius.max(0.0).ceil() as i32
}

fn box_text_bounds(
    style: &BoxTextStyle,
    primitive: &Primitive,
    scope: &FrameScope,
    shaper: &mut TextShaper,
) -> Option<ScreenRect> {
    if !scope.settings.show_names {
        return None;
    }
    let node = primitive.as_node()?;
    let s = style.text.string_for(primitive)?;
    let shaped = shaper.shape(&s, style.text.font_size)?;
    let point = scope.viewport.point_for_node(node);
    let at = style.transform(point, shaped.width, shaped.ascent, shaped.descent);
    let string = BoxTextStyle::string_bounds(shaped.width, shaped.ascent, shaped.descent);
    Some(
        ScreenRect::covering(string)
            .transform_bounds(at)
            .inflate(halo_margin(style.text.halo_radius)),
    )
}

fn text_bounds(
    style: &TextStyle,
    primitive: &Primitive,
    scope: &FrameScope,
    shaper: &mut TextShaper,
) -> Option<ScreenRect> {
    if !scope.settings.show_names {
        return None;
    }
    let s = style.text.string_for(primitive)?;
    let shaped = shaper.shape(&s, style.text.font_size)?;
    let string = BoxTextStyle::string_bounds(shaped.width, shaped.ascent, shaped.descent);
    let string_rect = ScreenRect::covering(string);
    let advances = shaped.advances();

    let mut bounds = ScreenRect::NONEXISTENT;
    for path in scope.polygons(primitive) {
        if let Some(placement) =
            style
                .position
                .find_label_placement(&path, string, &scope.viewport)
        {
            let at = display_text_transform(string, &placement);
            bounds = bounds.union(string_rect.transform_bounds(at));
        } else if let Some(transforms) = style.position.glyph_transforms(
            &path,
            shaped.width,
            &advances,
            f64::from(shaped.font_size),
            &scope.viewport,
        ) {
            for (glyph, at) in advances.iter().zip(transforms) {
                let r = Rect::new(0.0, -shaped.ascent, glyph.advance, shaped.descent);
                bounds = bounds.union(ScreenRect::covering(r).transform_bounds(at));
            }
        } else {
            tracing::trace!(primitive = %primitive.id(), label = %s, "no label placement");
        }
    }
    (bounds.width >= 0).then(|| bounds.inflate(halo_margin(style.text.halo_radius)))
}

#[cfg(test)]
#[path = "../../tests/unit/style/element.rs"]
mod tests;
