use std::sync::Arc;

use super::*;
use crate::data::coor::LatLon;
use crate::data::primitive::{Node, PrimitiveId, Tags};

fn node(tags: &[(&str, &str)]) -> Primitive {
    let tags = tags
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect::<Tags>();
    Primitive::Node(Arc::new(Node::new(PrimitiveId(1), LatLon::new(0.0, 0.0), tags)))
}

fn box_style(h_align: HAlign, v_align: VAlign) -> BoxTextStyle {
    BoxTextStyle {
        text: TextLabel::new(LabelText::AutoName, 8.0, Rgba8::WHITE),
        box_rect: Rect::new(-3.0, -3.0, 3.0, 3.0),
        x_offset: 0.0,
        y_offset: 0.0,
        h_align,
        v_align,
    }
}

#[test]
fn auto_name_falls_back_through_keys() {
    let label = TextLabel::new(LabelText::AutoName, 8.0, Rgba8::WHITE);
    let by_ref = node(&[("ref", "A7")]);
    assert_eq!(label.string_for(&by_ref), Some("A7".to_owned()));
    assert_eq!(
        label.string_for(&node(&[("ref", "A7"), ("name", "Main")])),
        Some("Main".to_owned())
    );
    assert_eq!(label.string_for(&node(&[("highway", "bus_stop")])), None);
}

#[test]
fn blank_strings_are_absent() {
    let label = TextLabel::new(
        LabelText::Tag {
            key: "name".to_owned(),
        },
        8.0,
        Rgba8::WHITE,
    );
    assert_eq!(label.string_for(&node(&[("name", "  ")])), None);
    let fixed = TextLabel::new(
        LabelText::Static {
            text: "x".to_owned(),
        },
        8.0,
        Rgba8::WHITE,
    );
    assert_eq!(fixed.string_for(&node(&[])), Some("x".to_owned()));
}

#[test]
fn halo_defaults_to_complement() {
    let label = TextLabel::new(LabelText::AutoName, 8.0, Rgba8::rgb(255, 200, 0));
    assert_eq!(label.halo(), None);
    let with_halo = label.clone().with_halo(1.5, None);
    assert_eq!(with_halo.halo(), Some(Rgba8::rgb(0, 55, 255)));
    let explicit = label.with_halo(1.0, Some(Rgba8::BLACK));
    assert_eq!(explicit.halo(), Some(Rgba8::BLACK));
}

#[test]
fn default_anchor_is_right_bottom() {
    let style = box_style(HAlign::default(), VAlign::default());
    assert_eq!(style.anchor(20.0, 7.0, 2.0), Vec2::new(5.0, 3.0));
}

#[test]
fn anchors_follow_alignment() {
    let (w, a, d) = (20.0, 7.0, 2.0);
    let cases = [
        (HAlign::Center, VAlign::Center, Vec2::new(-10.0, 3.0)),
        (HAlign::Left, VAlign::Above, Vec2::new(-27.0, -5.0)),
        (HAlign::Right, VAlign::Top, Vec2::new(5.0, 4.0)),
        (HAlign::Right, VAlign::Below, Vec2::new(5.0, 12.0)),
    ];
    for (h, v, expected) in cases {
        assert_eq!(box_style(h, v).anchor(w, a, d), expected, "{h:?} {v:?}");
    }
}

#[test]
fn box_transform_rounds_the_point() {
    let style = box_style(HAlign::Right, VAlign::Bottom);
    let t = style.transform(Point::new(10.4, 20.6), 20.0, 7.0, 2.0);
    assert_eq!(t * Point::ZERO, Point::new(15.0, 24.0));
}

#[test]
fn labels_deserialize_with_defaults() {
    let label: TextLabel =
        serde_json::from_str(r#"{ "source": { "kind": "tag", "key": "name" } }"#).unwrap();
    assert_eq!(label.font_size, 8.0);
    assert_eq!(label.color, Rgba8::WHITE);
    assert_eq!(label.halo(), None);
}
