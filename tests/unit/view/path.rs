use super::*;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn ring(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
    [p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]
}

#[test]
fn visit_line_accumulates_offsets_including_close() {
    let mut path = MapViewPath::new();
    let triangle = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 0.0)];
    path.append_points(&triangle, true);
    let mut offsets = Vec::new();
    let total = path.visit_line(|o, _, _| offsets.push(o));
    assert_eq!(offsets, vec![0.0, 10.0, 20.0]);
    assert!((total - (20.0 + 200f64.sqrt())).abs() < 1e-9);
    assert!((path.length() - total).abs() < 1e-12);
}

#[test]
fn clipped_visit_keeps_phase() {
    let path = MapViewPath::from_points(&[p(-50.0, 5.0), p(50.0, 5.0), p(50.0, 100.0)]);
    let clip = Rect::new(0.0, 0.0, 40.0, 40.0);
    let mut seen = Vec::new();
    path.visit_clipped_line(clip, |o, a, b| seen.push((o, a, b)));
    assert_eq!(seen.len(), 1);
    let (o, a, b) = seen[0];
    assert!((o - 50.0).abs() < 1e-9);
    assert_eq!(a, p(0.0, 5.0));
    assert_eq!(b, p(40.0, 5.0));
}

#[test]
fn clip_segment_rejects_outside() {
    let clip = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(clip_segment(p(-5.0, -5.0), p(-1.0, 20.0), clip), None);
    let inside = clip_segment(p(1.0, 1.0), p(2.0, 2.0), clip);
    assert_eq!(inside, Some((0.0, 1.0)));
    let (t0, t1) = clip_segment(p(-10.0, 5.0), p(20.0, 5.0), clip).unwrap();
    assert!((t0 - 1.0 / 3.0).abs() < 1e-12);
    assert!((t1 - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn polygon_clipping_stays_inside() {
    let square = ring(-10.0, -10.0, 20.0, 20.0);
    let clip = Rect::new(0.0, 0.0, 10.0, 10.0);
    let out = clip_polygon(&square, clip);
    assert_eq!(out.len(), 4);
    for q in &out {
        assert!(q.x >= 0.0 && q.x <= 10.0 && q.y >= 0.0 && q.y <= 10.0);
    }
    let away = [p(30.0, 30.0), p(40.0, 30.0), p(40.0, 40.0)];
    assert!(clip_polygon(&away, clip).is_empty());
}

#[test]
fn clipped_path_joins_consecutive_parts() {
    let path = MapViewPath::from_points(&[p(-5.0, 1.0), p(5.0, 1.0), p(5.0, 5.0), p(50.0, 5.0)]);
    let out = path.clipped(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(out.segments().len(), 3);
    assert_eq!(out.as_bez().elements().len(), 4);
}

#[test]
fn empty_path_has_no_bounds() {
    let path = MapViewPath::new();
    assert!(path.is_empty());
    assert!(path.bounds().is_none());
}

#[test]
fn contains_is_even_odd_over_rings() {
    let mut path = MapViewPath::new();
    path.append_points(&ring(0.0, 0.0, 10.0, 10.0), true);
    path.append_points(&ring(3.0, 3.0, 7.0, 7.0), true);
    assert!(path.contains(p(1.0, 1.0)));
    assert!(!path.contains(p(5.0, 5.0)));
    assert!(!path.contains(p(11.0, 5.0)));
}

#[test]
fn clipped_polygon_stays_closed() {
    let mut path = MapViewPath::new();
    path.append_points(&ring(-10.0, -10.0, 10.0, 10.0), true);
    let clipped = path.clipped_polygon(Rect::new(0.0, 0.0, 20.0, 20.0));
    assert_eq!(clipped.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    let last = clipped.as_bez().elements().last();
    assert!(matches!(last, Some(kurbo::PathEl::ClosePath)));
}
