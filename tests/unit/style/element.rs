use std::sync::Arc;

use super::*;
use crate::data::coor::EastNorth;
use crate::data::primitive::{Node, PrimitiveId, Tags, Way};
use crate::foundation::core::Rgba8;
use crate::render::config::RenderConfig;
use crate::style::node::NodeGlyph;
use crate::style::text::{LabelText, TextLabel};
use crate::view::viewport::Viewport;

fn scope() -> FrameScope {
    let vp = Viewport::new(40, 40, EastNorth::new(0.0, 0.0), 1.0).unwrap();
    FrameScope::new(&RenderConfig::default(), vp, &[], Vec::new(), None)
}

fn node_at(scope: &FrameScope, id: u64, x: f64, y: f64) -> Arc<Node> {
    let ll = scope.viewport.lat_lon_for(kurbo::Point::new(x, y));
    Arc::new(Node::new(PrimitiveId(id), ll, Tags::new()))
}

#[test]
fn new_elements_use_the_layer_of_their_kind() {
    let area = StyleElement::new(StyleKind::Area(AreaStyle::new(Rgba8::WHITE)));
    assert_eq!(area.major_z_index, 1.0);
    assert_eq!(area.z_index, 0.0);
    assert!(area.default_selected_handling);
    assert!(!area.is_modifier);

    let line = StyleElement::new(StyleKind::Line(LineStyle::default())).with_major_z_index(3.5);
    assert_eq!(line.major_z_index, 3.5);
}

#[test]
fn only_the_builtin_square_is_the_default_simple_node() {
    assert!(DefaultStyles::simple_node().is_default_simple_node());
    let plain = StyleElement::new(StyleKind::Node(NodeStyle::new(NodeGlyph::Simple)));
    assert!(!plain.is_default_simple_node());
}

#[test]
fn node_bounds_surround_the_point() {
    let scope = scope();
    let mut shaper = TextShaper::new(None);
    let node = Primitive::Node(node_at(&scope, 1, 20.0, 20.0));
    let b = DefaultStyles::simple_node()
        .bounds(&node, &scope, &mut shaper)
        .unwrap();
    assert!(b.contains(20, 20));
    assert!(b.width < 40 && b.height < 40);
}

#[test]
fn area_on_a_node_has_no_bounds() {
    let scope = scope();
    let mut shaper = TextShaper::new(None);
    let node = Primitive::Node(node_at(&scope, 1, 20.0, 20.0));
    let area = StyleElement::new(StyleKind::Area(AreaStyle::new(Rgba8::WHITE)));
    assert!(area.bounds(&node, &scope, &mut shaper).is_none());
}

#[test]
fn line_bounds_cover_the_stroke() {
    let scope = scope();
    let mut shaper = TextShaper::new(None);
    let a = node_at(&scope, 1, 5.0, 20.0);
    let b = node_at(&scope, 2, 35.0, 20.0);
    let way = Primitive::Way(Arc::new(Way::new(PrimitiveId(10), vec![a, b], Tags::new())));
    let line = StyleElement::new(StyleKind::Line(LineStyle::new(Rgba8::WHITE, 6.0)));
    let r = line.bounds(&way, &scope, &mut shaper).unwrap();
    assert!(r.x <= 2 && r.x1() >= 38, "{r:?}");
    assert!(r.y <= 17 && r.y1() >= 23, "{r:?}");
}

#[test]
fn labels_without_a_font_have_no_bounds() {
    let scope = scope();
    let mut shaper = TextShaper::new(None);
    let node = Primitive::Node(node_at(&scope, 1, 20.0, 20.0));
    let label = StyleElement::new(StyleKind::BoxText(BoxTextStyle {
        text: TextLabel::new(
            LabelText::Static {
                text: "Cafe".to_owned(),
            },
            10.0,
            Rgba8::WHITE,
        ),
        box_rect: kurbo::Rect::new(-4.0, -4.0, 4.0, 4.0),
        x_offset: 0.0,
        y_offset: 0.0,
        h_align: Default::default(),
        v_align: Default::default(),
    }));
    assert!(label.bounds(&node, &scope, &mut shaper).is_none());
}
