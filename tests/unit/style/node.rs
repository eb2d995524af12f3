use super::*;

fn image(w: u32, h: u32) -> MapImage {
    MapImage::from_rgba8("icon", w, h, vec![255; (w * h * 4) as usize]).unwrap()
}

#[test]
fn image_bounds_are_centred_with_offset() {
    let style = NodeStyle::new(NodeGlyph::Image(image(16, 10).with_offset(2, -1)));
    assert_eq!(style.symbol_bounds(5), ScreenRect::new(-6, -6, 16, 10));
}

#[test]
fn odd_sizes_use_integer_halves() {
    let symbol = Symbol {
        shape: SymbolShape::Circle,
        size: 7,
        stroke: None,
        fill_color: Some(Rgba8::WHITE),
    };
    let style = NodeStyle::new(NodeGlyph::Symbol(symbol));
    assert_eq!(style.symbol_bounds(5), ScreenRect::new(-3, -3, 7, 7));
    assert_eq!(
        NodeStyle::new(NodeGlyph::Simple).symbol_bounds(5),
        ScreenRect::new(-2, -2, 5, 5)
    );
}

#[test]
fn symbols_without_paint_are_invisible() {
    let mut symbol = Symbol {
        shape: SymbolShape::Square,
        size: 6,
        stroke: None,
        fill_color: None,
    };
    assert!(symbol.is_invisible());
    symbol.stroke = Some(SymbolStroke {
        width: 1.0,
        color: Rgba8::BLACK,
    });
    assert!(!symbol.is_invisible());
    symbol.size = 0;
    assert!(symbol.is_invisible());
}

#[test]
fn node_pixels_truncate() {
    assert_eq!(node_pixel(Point::new(10.9, 3.2)), (10, 3));
    assert_eq!(node_pixel(Point::new(-0.5, 0.0)), (0, 0));
}

#[test]
fn symbols_deserialize() {
    let symbol: Symbol = serde_json::from_str(
        r##"{ "shape": "triangle", "size": 10, "fill_color": "#00ff00" }"##,
    )
    .unwrap();
    assert_eq!(symbol.shape, SymbolShape::Triangle);
    assert_eq!(symbol.fill_color, Some(Rgba8::rgb(0, 255, 0)));
    assert!(symbol.stroke.is_none());
}
