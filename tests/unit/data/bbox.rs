use super::*;

#[test]
fn starts_invalid_and_grows() {
    let mut b = BBox::new();
    assert!(!b.is_valid());
    assert_eq!(b.width(), 0.0);
    b.add(1.0, 2.0);
    assert!(b.is_valid());
    assert_eq!(b.width(), 0.0);
    b.add(3.0, -1.0);
    assert_eq!(b.width(), 2.0);
    assert_eq!(b.height(), 3.0);
}

#[test]
fn nan_points_are_ignored() {
    let mut b = BBox::from_corners(0.0, 0.0, 1.0, 1.0);
    b.add(f64::NAN, 5.0);
    assert_eq!(b, BBox::from_corners(0.0, 0.0, 1.0, 1.0));
}

#[test]
fn intersects_and_contains() {
    let a = BBox::from_corners(0.0, 0.0, 10.0, 10.0);
    let b = BBox::from_corners(10.0, 10.0, 12.0, 12.0);
    let c = BBox::from_corners(2.0, 2.0, 3.0, 3.0);
    assert!(a.intersects(&b));
    assert!(a.contains(&c));
    assert!(!c.contains(&a));
    assert!(!a.intersects(&BBox::new()));
}

#[test]
fn inflate_grows_by_factor() {
    let b = BBox::from_corners(0.0, 0.0, 2.0, 4.0).inflate(0.5);
    assert_eq!(b, BBox::from_corners(-1.0, -2.0, 3.0, 6.0));
}

#[test]
fn add_bbox_skips_invalid() {
    let mut a = BBox::from_point(LatLon::new(1.0, 2.0));
    a.add_bbox(&BBox::new());
    assert_eq!(a, BBox::from_point(LatLon::new(1.0, 2.0)));
    a.add_bbox(&BBox::from_point_radius(0.0, 0.0, 1.0));
    assert_eq!(a, BBox::from_corners(-1.0, -1.0, 2.0, 1.0));
}
