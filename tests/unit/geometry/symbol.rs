use kurbo::{PathEl, Point};

use super::*;

#[test]
fn keywords_map_to_shapes() {
    let parse = SymbolShape::from_keyword;
    assert_eq!(parse("triangle"), Some(SymbolShape::Triangle));
    assert_eq!(parse(" Octagon "), Some(SymbolShape::Octagon));
    assert_eq!(parse("star"), None);
}

#[test]
fn square_is_axis_aligned() {
    let path = SymbolShape::Square.shape_around(10.0, 20.0, 6.0);
    assert_eq!(path.bounding_box(), Rect::new(7.0, 17.0, 13.0, 23.0));
}

#[test]
fn circle_fits_the_size() {
    let b = SymbolShape::Circle
        .shape_around(0.0, 0.0, 10.0)
        .bounding_box();
    assert!((b.width() - 10.0).abs() < 1e-6);
    assert!((b.height() - 10.0).abs() < 1e-6);
}

#[test]
fn triangle_starts_at_the_top() {
    let path = SymbolShape::Triangle.shape_around(0.0, 0.0, 10.0);
    let vertices = path
        .elements()
        .iter()
        .filter_map(|el| match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(p),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(vertices.len(), 3);
    assert!(vertices[0].distance(Point::new(0.0, -5.0)) < 1e-9);
    assert!(matches!(path.elements().last(), Some(PathEl::ClosePath)));
}

#[test]
fn polygons_have_their_side_count() {
    for shape in [
        SymbolShape::Pentagon,
        SymbolShape::Hexagon,
        SymbolShape::Heptagon,
        SymbolShape::Octagon,
        SymbolShape::Nonagon,
        SymbolShape::Decagon,
    ] {
        let path = shape.shape_around(0.0, 0.0, 8.0);
        assert_eq!(path.elements().len() as u32, shape.sides() + 1);
    }
}
