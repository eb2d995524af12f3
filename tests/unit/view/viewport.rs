use super::*;

fn vp() -> Viewport {
    Viewport::new(200, 100, EastNorth::new(1000.0, 2000.0), 2.0).unwrap()
}

#[test]
fn rejects_bad_parameters() {
    assert!(Viewport::new(0, 10, EastNorth::default(), 1.0).is_err());
    assert!(Viewport::new(10, 10, EastNorth::default(), 0.0).is_err());
    assert!(Viewport::new(10, 70_000, EastNorth::default(), 1.0).is_err());
    assert!(Viewport::new(10, 10, EastNorth::new(f64::NAN, 0.0), 1.0).is_err());
}

#[test]
fn center_maps_to_middle_and_north_is_up() {
    let v = vp();
    let center = v.point_for(EastNorth::new(1000.0, 2000.0));
    assert_eq!(center, Point::new(100.0, 50.0));
    let north_east = v.point_for(EastNorth::new(1002.0, 2002.0));
    assert_eq!(north_east, Point::new(101.0, 49.0));
}

#[test]
fn affine_matches_point_for() {
    let v = vp();
    let en = EastNorth::new(950.0, 2030.0);
    let a = v.affine() * Point::new(en.east, en.north);
    let b = v.point_for(en);
    assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    let back = v.east_north_for(b);
    assert!((back.east - en.east).abs() < 1e-9);
    assert!((back.north - en.north).abs() < 1e-9);
}

#[test]
fn in_view_includes_edges() {
    let v = vp();
    assert!(v.is_in_view(Point::new(0.0, 0.0)));
    assert!(v.is_in_view(Point::new(200.0, 100.0)));
    assert!(!v.is_in_view(Point::new(-0.1, 50.0)));
}

#[test]
fn rectangle_for_round_trips_view_bbox() {
    let v = Viewport::from_lat_lon(200, 100, LatLon::new(10.0, 20.0), 5.0).unwrap();
    let r = v.rectangle_for(&v.bbox());
    assert!(r.x <= 0 && r.y <= 0);
    assert!(r.x1() >= 200 && r.y1() >= 100);
    assert!(r.x >= -1 && r.y >= -1 && r.x1() <= 201 && r.y1() <= 101);
}

#[test]
fn circum_is_100_pixels_in_metres() {
    let v = Viewport::from_lat_lon(200, 100, LatLon::new(0.0, 0.0), 1.0).unwrap();
    assert!((v.circum() - 100.0).abs() < 0.01);
}

#[test]
fn fit_covers_bbox() {
    let bbox = BBox::from_corners(10.0, 10.0, 10.01, 10.02);
    let v = Viewport::fit(300, 200, &bbox, 10.0).unwrap();
    let r = v.rectangle_for(&bbox);
    assert!(r.x >= 9 && r.y >= 9);
    assert!(r.x1() <= 291 && r.y1() <= 191);
    assert!(Viewport::fit(300, 200, &BBox::new(), 0.0).is_err());
}
