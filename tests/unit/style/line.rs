use super::*;

#[test]
fn invalid_dash_patterns_are_ignored() {
    let mut style = LineStyle::new(Rgba8::WHITE, 2.0);
    assert_eq!(style.dash_pattern(), None);
    style.dashes = Some(vec![]);
    assert_eq!(style.dash_pattern(), None);
    style.dashes = Some(vec![0.0, 0.0]);
    assert_eq!(style.dash_pattern(), None);
    style.dashes = Some(vec![4.0, -1.0]);
    assert_eq!(style.dash_pattern(), None);
    style.dashes = Some(vec![4.0, 2.0]);
    assert_eq!(style.dash_pattern(), Some(vec![4.0, 2.0]));
}

#[test]
fn background_dashes_fill_the_gaps() {
    let mut style = LineStyle::new(Rgba8::WHITE, 2.0);
    style.dashes = Some(vec![6.0, 2.0, 1.0, 3.0]);
    assert_eq!(style.background_dash_pattern(), None);
    style.dashes_background = Some(Rgba8::BLACK);
    let (pattern, offset) = style.background_dash_pattern().unwrap();
    assert_eq!(pattern, vec![3.0, 6.0, 2.0, 1.0]);
    assert_eq!(offset, 6.0);
}

#[test]
fn strokes_collapse_to_one_pixel_when_zoomed_out() {
    let style = LineStyle::new(Rgba8::WHITE, 5.0);
    assert_eq!(style.stroke_width(true), 5.0);
    assert_eq!(style.stroke_width(false), 1.0);
}

#[test]
fn deserializes_with_defaults() {
    let style: LineStyle =
        serde_json::from_str(r##"{ "color": "#ff0000", "width": 3, "join": "miter" }"##).unwrap();
    assert_eq!(style.color, Rgba8::rgb(255, 0, 0));
    assert_eq!(style.width, 3.0);
    assert_eq!(style.join, LineJoin::Miter);
    assert_eq!(style.cap, LineCap::Butt);
    assert_eq!(style.miter_limit, 10.0);
    assert!(!style.show_oneway);
}
