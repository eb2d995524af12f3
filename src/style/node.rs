use kurbo::{Affine, Point};

use crate::data::primitive::Primitive;
use crate::foundation::core::{Rgba8, ScreenRect};
use crate::geometry::restriction::restriction_transform;
use crate::geometry::symbol::SymbolShape;
use crate::render::painter::FrameScope;
use crate::style::image::MapImage;

/// Outline of a [`Symbol`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SymbolStroke {
    /// Stroke width in pixels.
    pub width: f32,
    /// Stroke colour.
    pub color: Rgba8,
}

/// Vector marker drawn at a node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    /// Outline shape.
    pub shape: SymbolShape,
    /// Edge length of the bounding square in pixels.
    pub size: u32,
    /// Optional outline.
    #[serde(default)]
    pub stroke: Option<SymbolStroke>,
    /// Optional fill.
    #[serde(default)]
    pub fill_color: Option<Rgba8>,
}

impl Symbol {
    /// `true` when the symbol draws nothing.
    pub fn is_invisible(&self) -> bool {
        self.size == 0 || (self.stroke.is_none() && self.fill_color.is_none())
    }
}

/// What a node style draws.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeGlyph {
    /// An icon; also used for turn restriction relations.
    Image(MapImage),
    /// A vector symbol.
    Symbol(Symbol),
    /// The configurable default square.
    Simple,
}

/// Point style of a node, or the icon of a turn restriction.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    /// Marker.
    pub glyph: NodeGlyph,
    /// Transform applied to icons around the node, e.g. a rotation.
    pub icon_transform: Option<Affine>,
}

/// Pixel a node is drawn at. Fractions are truncated towards zero.
pub(crate) fn node_pixel(p: Point) -> (i32, i32) {
    (p.x as i32, p.y as i32)
}

/// Edge length of the highlight drawn around a marker of `size` pixels.
pub(crate) fn highlight_size(size: f64, scope: &FrameScope) -> f64 {
    let config = &scope.settings.config;
    let mut s = size + f64::from(config.highlight_radius);
    if config.use_wider_highlight {
        s += f64::from(config.wider_highlight);
    }
    s
}

impl NodeStyle {
    /// Style drawing only `glyph`.
    pub fn new(glyph: NodeGlyph) -> Self {
        Self {
            glyph,
            icon_transform: None,
        }
    }

    /// Box occupied by the glyph relative to the node, before the icon transform.
    pub fn symbol_bounds(&self, max_node_size: i32) -> ScreenRect {
        match &self.glyph {
            NodeGlyph::Image(image) => {
                let w = image.width() as i32;
                let h = image.height() as i32;
                ScreenRect::new(image.offset_x() - w / 2, image.offset_y() - h / 2, w, h)
            }
            NodeGlyph::Symbol(symbol) => {
                let s = symbol.size as i32;
                ScreenRect::new(-s / 2, -s / 2, s, s)
            }
            NodeGlyph::Simple => {
                let s = max_node_size;
                ScreenRect::new(-s / 2, -s / 2, s, s)
            }
        }
    }

    /// Size of the highlight ring.
    fn highlight_base(&self, scope: &FrameScope) -> f64 {
        match &self.glyph {
            NodeGlyph::Image(image) => f64::from(image.width().max(image.height())),
            NodeGlyph::Symbol(symbol) => f64::from(symbol.size),
            NodeGlyph::Simple => f64::from(scope.settings.max_node_size),
        }
    }

    pub(crate) fn bounds(&self, primitive: &Primitive, scope: &FrameScope) -> Option<ScreenRect> {
        let max_node_size = scope.settings.max_node_size;
        match primitive {
            Primitive::Node(node) => {
                let (x, y) = node_pixel(scope.viewport.point_for_node(node));
                let hidden_icon =
                    matches!(self.glyph, NodeGlyph::Image(_)) && !scope.settings.show_icons;
                let base = if hidden_icon {
                    NodeStyle::new(NodeGlyph::Simple).symbol_bounds(max_node_size)
                } else {
                    self.symbol_bounds(max_node_size)
                        .transform_bounds(self.icon_transform.unwrap_or(Affine::IDENTITY))
                };
                let stroke = match &self.glyph {
                    NodeGlyph::Symbol(Symbol {
                        stroke: Some(s), ..
                    }) => (s.width / 2.0).ceil() as i32,
                    _ => 0,
                };
                let mut bounds = base.inflate(3 + stroke);
                if primitive.is_highlighted() {
                    let size = if hidden_icon {
                        f64::from(max_node_size)
                    } else {
                        self.highlight_base(scope)
                    };
                    let s = highlight_size(size, scope).ceil() as i32;
                    bounds = bounds.union(ScreenRect::new(-s / 2 - 1, -s / 2 - 1, s + 2, s + 2));
                }
                Some(bounds.translate(x, y))
            }
            Primitive::Relation(relation) => {
                if !matches!(self.glyph, NodeGlyph::Image(_)) {
                    return None;
                }
                let at = restriction_transform(
                    relation,
                    &scope.viewport,
                    scope.settings.config.left_hand_traffic,
                )?;
                let bounds = self.symbol_bounds(max_node_size);
                Some(bounds.transform_bounds(at).inflate(1))
            }
            Primitive::Way(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/node.rs"]
mod tests;
