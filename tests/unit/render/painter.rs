use super::*;
use crate::data::primitive::Tags;
use crate::render::order::RecordFlags;
use crate::style::StyleKind;
use crate::style::defaults::DefaultStyles;

const SIZE: u32 = 32;
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn viewport() -> Viewport {
    Viewport::new(SIZE, SIZE, EastNorth::new(0.0, 0.0), 1.0).unwrap()
}

fn scope(config: &RenderConfig) -> FrameScope {
    FrameScope::new(config, viewport(), &[], Vec::new(), None)
}

fn node_at(id: u64, x: f64, y: f64) -> Arc<Node> {
    let ll = viewport().lat_lon_for(Point::new(x, y));
    Arc::new(Node::new(PrimitiveId(id), ll, Tags::new()))
}

fn square_way(id: u64, x0: f64, y0: f64, x1: f64, y1: f64) -> Arc<Way> {
    let a = node_at(id * 10 + 1, x0, y0);
    let b = node_at(id * 10 + 2, x1, y0);
    let c = node_at(id * 10 + 3, x1, y1);
    let d = node_at(id * 10 + 4, x0, y1);
    Arc::new(Way::new(PrimitiveId(id), vec![a.clone(), b, c, d, a], Tags::new()))
}

fn record(
    style: Arc<StyleElement>,
    primitive: Primitive,
    scope: &FrameScope,
    seq: u64,
) -> StyleRecord {
    let flags = RecordFlags::compute(primitive.state(), false);
    let mut r = StyleRecord::new(style, primitive, flags, seq);
    r.compute_bounds(scope, &mut TextShaper::new(None));
    r
}

fn paint(scope: &FrameScope, records: &[StyleRecord]) -> (Vec<u8>, usize, usize) {
    let mut painter = MapPainter::new(scope, ScreenRect::from_size(SIZE, SIZE)).unwrap();
    for r in records {
        painter.paint_record(r);
    }
    painter.finish()
}

fn px(pixels: &[u8], stride: usize, x: usize, y: usize) -> [u8; 4] {
    let i = (y * stride + x) * 4;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn area(color: Rgba8) -> Arc<StyleElement> {
    Arc::new(StyleElement::new(StyleKind::Area(AreaStyle::new(color))))
}

#[test]
fn empty_canvas_is_background() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let (pixels, stride, painted) = paint(&scope, &[]);
    assert_eq!(stride, SIZE as usize);
    assert_eq!(painted, 0);
    assert_eq!(px(&pixels, stride, 0, 0), BLACK);
    assert_eq!(px(&pixels, stride, 31, 31), BLACK);
}

#[test]
fn selected_simple_node_is_a_filled_square() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let n = node_at(1, 16.0, 16.0);
    n.set_state(PrimitiveState::SELECTED);
    let r = record(DefaultStyles::simple_node(), Primitive::Node(n), &scope, 0);
    let (pixels, stride, painted) = paint(&scope, &[r]);
    assert_eq!(painted, 1);
    assert_eq!(px(&pixels, stride, 16, 16), [255, 0, 0, 255]);
    assert_eq!(px(&pixels, stride, 4, 4), BLACK);
}

#[test]
fn unselected_simple_node_is_an_outline() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let r = record(
        DefaultStyles::simple_node(),
        Primitive::Node(node_at(1, 16.0, 16.0)),
        &scope,
        0,
    );
    let (pixels, stride, _) = paint(&scope, &[r]);
    assert_eq!(px(&pixels, stride, 16, 16), BLACK);
    assert_ne!(px(&pixels, stride, 14, 16), BLACK);
}

#[test]
fn line_is_stroked_with_its_width() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let a = node_at(1, 4.0, 16.0);
    let b = node_at(2, 28.0, 16.0);
    let way = Arc::new(Way::new(PrimitiveId(10), vec![a, b], Tags::new()));
    let style = Arc::new(StyleElement::new(StyleKind::Line(LineStyle::new(
        Rgba8::rgb(0, 255, 0),
        4.0,
    ))));
    let r = record(style, Primitive::Way(way), &scope, 0);
    let (pixels, stride, _) = paint(&scope, &[r]);
    assert_eq!(px(&pixels, stride, 16, 15), [0, 255, 0, 255]);
    assert_eq!(px(&pixels, stride, 16, 16), [0, 255, 0, 255]);
    assert_eq!(px(&pixels, stride, 16, 4), BLACK);
    assert_eq!(px(&pixels, stride, 1, 16), BLACK);
}

#[test]
fn area_fills_the_closed_way() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let way = square_way(1, 8.0, 8.0, 24.0, 24.0);
    let r = record(area(Rgba8::rgb(0, 0, 255)), Primitive::Way(way), &scope, 0);
    let (pixels, stride, _) = paint(&scope, &[r]);
    assert_eq!(px(&pixels, stride, 16, 16), [0, 0, 255, 255]);
    assert_eq!(px(&pixels, stride, 4, 4), BLACK);
}

#[test]
fn outline_only_skips_area_fills() {
    let config = RenderConfig {
        outline_only: true,
        ..RenderConfig::default()
    };
    let scope = scope(&config);
    let way = square_way(1, 8.0, 8.0, 24.0, 24.0);
    let r = record(area(Rgba8::rgb(0, 0, 255)), Primitive::Way(way), &scope, 0);
    let (pixels, stride, painted) = paint(&scope, &[r]);
    assert_eq!(painted, 1);
    assert_eq!(px(&pixels, stride, 16, 16), BLACK);
}

#[test]
fn inactive_mode_dims_area_fills() {
    let config = RenderConfig {
        inactive_mode: true,
        ..RenderConfig::default()
    };
    let scope = scope(&config);
    let way = square_way(1, 8.0, 8.0, 24.0, 24.0);
    let r = record(area(Rgba8::rgb(0, 0, 255)), Primitive::Way(way), &scope, 0);
    let (pixels, stride, _) = paint(&scope, &[r]);
    let blue = px(&pixels, stride, 16, 16)[2];
    assert!((70..=100).contains(&blue), "blue = {blue}");
}

#[test]
fn selected_area_keeps_fill_alpha() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let way = square_way(1, 8.0, 8.0, 24.0, 24.0);
    way.set_state(PrimitiveState::SELECTED);
    let r = record(
        area(Rgba8::rgba(0, 0, 255, 255)),
        Primitive::Way(way),
        &scope,
        0,
    );
    let (pixels, stride, _) = paint(&scope, &[r]);
    assert_eq!(px(&pixels, stride, 16, 16), [255, 0, 0, 255]);
}

#[test]
fn later_records_paint_over_earlier_ones() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let red = record(
        area(Rgba8::rgb(255, 0, 0)),
        Primitive::Way(square_way(1, 8.0, 8.0, 24.0, 24.0)),
        &scope,
        0,
    );
    let green = record(
        area(Rgba8::rgb(0, 255, 0)),
        Primitive::Way(square_way(2, 12.0, 12.0, 20.0, 20.0)),
        &scope,
        1,
    );
    let (pixels, stride, painted) = paint(&scope, &[red, green]);
    assert_eq!(painted, 2);
    assert_eq!(px(&pixels, stride, 16, 16), [0, 255, 0, 255]);
    assert_eq!(px(&pixels, stride, 10, 10), [255, 0, 0, 255]);
}

#[test]
fn debug_bounds_are_drawn_inside_record_bounds() {
    let config = RenderConfig {
        debug_bounds: true,
        ..RenderConfig::default()
    };
    let scope = scope(&config);
    let r = record(
        area(Rgba8::rgba(0, 0, 0, 0)),
        Primitive::Way(square_way(1, 8.0, 8.0, 24.0, 24.0)),
        &scope,
        0,
    );
    let bounds = r.bounds().unwrap();
    let (pixels, stride, _) = paint(&scope, &[r]);
    let edge = px(&pixels, stride, bounds.x as usize, 16);
    assert_ne!(edge, BLACK);
    assert_eq!(px(&pixels, stride, 16, 16), BLACK);
}

#[test]
fn multipolygons_are_assembled_once_per_frame() {
    let config = RenderConfig::default();
    let scope = scope(&config);
    let outer = square_way(1, 8.0, 8.0, 24.0, 24.0);
    let mut tags = Tags::new();
    tags.insert("type".to_owned(), "multipolygon".to_owned());
    let relation = Relation::new(
        PrimitiveId(100),
        vec![crate::data::primitive::RelationMember {
            role: "outer".to_owned(),
            member: Primitive::Way(outer),
        }],
        tags,
    );
    let first = scope.multipolygon(&relation);
    let second = scope.multipolygon(&relation);
    assert!(Arc::ptr_eq(&first, &second));
    let relation = Primitive::Relation(Arc::new(relation));
    assert_eq!(scope.polygons(&relation).len(), 1);
}
