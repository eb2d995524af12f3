use kurbo::PathEl;

use super::*;

fn en(e: f64, n: f64) -> EastNorth {
    EastNorth::new(e, n)
}

fn near(p: EastNorth, east: f64, north: f64) -> bool {
    (p.east - east).abs() < 1e-12 && (p.north - north).abs() < 1e-12
}

#[test]
fn area_and_perimeter_of_square_open_or_closed() {
    let open = [en(0.0, 0.0), en(1.0, 0.0), en(1.0, 1.0), en(0.0, 1.0)];
    let mut closed = open.to_vec();
    closed.push(en(0.0, 0.0));

    for pts in [&open[..], &closed[..]] {
        let (area, perimeter) = area_and_perimeter(pts);
        assert!((area - 1.0).abs() < 1e-12);
        assert!((perimeter - 4.0).abs() < 1e-12);
    }
    assert_eq!(area_and_perimeter(&[]), (0.0, 0.0));
}

#[test]
fn partial_fill_threshold() {
    assert!(use_partial_fill(1.0, 4.0, 1.0, None, 0.1));
    assert!(use_partial_fill(1.0, 4.0, 1.0, Some(0.5), 0.1));
    assert!(!use_partial_fill(1.0, 4.0, 1.0, Some(0.3), 0.1));
}

#[test]
fn displaced_point_follows_third_point_side() {
    let up = displaced_end_point(en(0.0, 0.0), en(10.0, 0.0), en(5.0, 5.0), 2.0).unwrap();
    assert!(near(up, 10.0, 2.0));

    let down = displaced_end_point(en(0.0, 0.0), en(10.0, 0.0), en(5.0, -5.0), 2.0).unwrap();
    assert!(near(down, 10.0, -2.0));
}

#[test]
fn displaced_point_absent_for_acute_turns_and_degenerate_segments() {
    assert!(displaced_end_point(en(0.0, 0.0), en(10.0, 0.0), en(15.0, 5.0), 2.0).is_none());
    assert!(displaced_end_point(en(1.0, 1.0), en(1.0, 1.0), en(0.0, 0.0), 2.0).is_none());
}

#[test]
fn clip_adds_corners_last_end_first() {
    let pts = [en(0.0, 0.0), en(10.0, 0.0), en(10.0, 10.0)];
    let mut clip = BezPath::new();
    build_clip(&mut clip, &pts, 2.0);

    let points = clip
        .elements()
        .iter()
        .filter_map(|el| match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(p),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(points.len(), 5);
    assert!((points[3] - Point::new(8.0, 10.0)).hypot() < 1e-12);
    assert!((points[4] - Point::new(0.0, 2.0)).hypot() < 1e-12);
}

#[test]
fn clip_of_two_points_is_just_the_segment() {
    let mut clip = BezPath::new();
    build_clip(&mut clip, &[en(0.0, 0.0), en(5.0, 0.0)], 2.0);
    assert_eq!(clip.elements().len(), 2);
}
