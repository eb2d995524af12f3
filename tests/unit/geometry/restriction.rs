use super::*;
use crate::data::coor::{EastNorth, LatLon};
use crate::data::dataset::{DataSet, DataSetWriteGuard};
use crate::data::primitive::{PrimitiveId, PrimitiveKind, Tags};

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn nodes(w: &mut DataSetWriteGuard<'_>, coords: &[(u64, f64, f64)]) {
    for &(id, lat, lon) in coords {
        w.add_node(PrimitiveId(id), LatLon::new(lat, lon), Tags::new())
            .unwrap();
    }
}

fn way(w: &mut DataSetWriteGuard<'_>, id: u64, nodes: &[u64], tags: Tags) {
    let nodes: Vec<_> = nodes.iter().map(|n| PrimitiveId(*n)).collect();
    w.add_way(PrimitiveId(id), &nodes, tags).unwrap();
}

fn member(role: &str, kind: PrimitiveKind, id: u64) -> (String, PrimitiveKind, PrimitiveId) {
    (role.to_string(), kind, PrimitiveId(id))
}

/// From way runs west -> east into the via node at the view centre, to way leaves north.
fn restriction(via_way_tags: Option<Tags>) -> Arc<Relation> {
    let data = DataSet::new();
    let mut w = data.write();
    nodes(&mut w, &[(1, 0.0, -0.001), (2, 0.0, 0.0), (3, 0.001, 0.0)]);
    way(&mut w, 10, &[1, 2], Tags::new());
    way(&mut w, 11, &[2, 3], Tags::new());

    let via = match via_way_tags {
        Some(t) => {
            nodes(&mut w, &[(4, 0.0, 0.0005)]);
            way(&mut w, 12, &[2, 4], t);
            member("via", PrimitiveKind::Way, 12)
        }
        None => member("via", PrimitiveKind::Node, 2),
    };
    w.add_relation(
        PrimitiveId(20),
        &[
            member("from", PrimitiveKind::Way, 10),
            via,
            member("to", PrimitiveKind::Way, 11),
        ],
        tags(&[("type", "restriction")]),
    )
    .unwrap()
}

fn viewport() -> Viewport {
    Viewport::new(400, 300, EastNorth::new(0.0, 0.0), 1.0).unwrap()
}

#[test]
fn icon_sits_behind_and_right_of_the_via_node() {
    let vp = viewport();
    let at = restriction_transform(&restriction(None), &vp, false).unwrap();
    let origin = at * Point::ZERO;
    assert!((origin.x - (200.0 - 14.0)).abs() < 1e-9);
    assert!((origin.y - (150.0 + 10.0)).abs() < 1e-9);
    let dir = at * Point::new(1.0, 0.0) - origin;
    assert!(dir.x.abs() < 1e-9 && (dir.y - 1.0).abs() < 1e-9);
}

#[test]
fn left_hand_traffic_mirrors_the_side() {
    let vp = viewport();
    let at = restriction_transform(&restriction(None), &vp, true).unwrap();
    let origin = at * Point::ZERO;
    assert!((origin.y - (150.0 - 10.0)).abs() < 1e-9);
}

#[test]
fn via_way_is_accepted_when_it_touches_the_from_way() {
    let vp = viewport();
    let rel = restriction(Some(Tags::new()));
    assert!(restriction_transform(&rel, &vp, false).is_some());
}

#[test]
fn reversed_oneway_via_way_rejects_its_start() {
    let vp = viewport();
    let via = tags(&[("oneway", "-1")]);
    let rel = restriction(Some(via));
    assert!(restriction_transform(&rel, &vp, false).is_none());
}

#[test]
fn missing_to_member_gives_no_transform() {
    let data = DataSet::new();
    let mut w = data.write();
    nodes(&mut w, &[(1, 0.0, -0.001), (2, 0.0, 0.0)]);
    way(&mut w, 10, &[1, 2], Tags::new());
    let rel = w
        .add_relation(
            PrimitiveId(20),
            &[
                member("from", PrimitiveKind::Way, 10),
                member("via", PrimitiveKind::Node, 2),
            ],
            Tags::new(),
        )
        .unwrap();
    assert!(restriction_transform(&rel, &viewport(), false).is_none());
}
