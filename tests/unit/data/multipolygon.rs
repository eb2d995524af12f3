use super::*;
use crate::data::coor::LatLon;
use crate::data::dataset::DataSet;
use crate::data::primitive::{PrimitiveId, PrimitiveKind, Tags};

fn mp_tags() -> Tags {
    [("type".to_string(), "multipolygon".to_string())]
        .into_iter()
        .collect()
}

fn build(members: &[(&str, u64)], extra_open: bool) -> Multipolygon {
    let data = DataSet::new();
    let mut w = data.write();
    let coords = [
        (1, 0.0, 0.0),
        (2, 0.0, 1.0),
        (3, 1.0, 1.0),
        (4, 1.0, 0.0),
        (5, 0.25, 0.25),
        (6, 0.25, 0.75),
        (7, 0.75, 0.75),
        (8, 3.0, 3.0),
        (9, 3.0, 4.0),
    ];
    for (id, lat, lon) in coords {
        w.add_node(PrimitiveId(id), LatLon::new(lat, lon), Tags::new())
            .unwrap();
    }
    // Two halves of the outer square, the second one reversed.
    let ways: [(u64, &[u64]); 4] = [
        (100, &[1, 2, 3]),
        (101, &[1, 4, 3]),
        (102, &[5, 6, 7, 5]),
        (103, &[8, 9]),
    ];
    for (id, nodes) in ways {
        let nodes: Vec<_> = nodes.iter().map(|n| PrimitiveId(*n)).collect();
        w.add_way(PrimitiveId(id), &nodes, Tags::new()).unwrap();
    }
    let selected = PrimitiveState::SELECTED;
    w.set_state(PrimitiveKind::Way, PrimitiveId(101), selected)
        .unwrap();
    let mut list = members
        .iter()
        .map(|(role, id)| (role.to_string(), PrimitiveKind::Way, PrimitiveId(*id)))
        .collect::<Vec<_>>();
    if extra_open {
        list.push(("outer".to_string(), PrimitiveKind::Way, PrimitiveId(103)));
    }
    let r = w.add_relation(PrimitiveId(200), &list, mp_tags()).unwrap();
    Multipolygon::build(&r)
}

#[test]
fn joins_split_outer_ring() {
    let mp = build(&[("outer", 100), ("outer", 101)], false);
    assert_eq!(mp.polygons().len(), 1);
    let p = &mp.polygons()[0];
    assert!(p.closed);
    assert!(p.selected);
    let ids: Vec<_> = p.nodes.iter().map(|n| n.id().0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 1]);
}

#[test]
fn inner_ring_attaches_to_outer() {
    let mp = build(&[("outer", 100), ("inner", 102), ("", 101)], false);
    assert_eq!(mp.polygons().len(), 1);
    let p = &mp.polygons()[0];
    assert_eq!(p.inners.len(), 1);
    let (area, perimeter) = p.area_and_perimeter();
    let (outer_area, _) = crate::geometry::partial_fill::area_and_perimeter(&p.east_north());
    assert!(area > 0.0 && area < outer_area);
    assert!(perimeter > 0.0);
    // Outer ring plus inner ring.
    assert_eq!(p.east_north_path().elements().len(), 5 + 1 + 4 + 1);
}

#[test]
fn unjoinable_ways_stay_unclosed() {
    let mp = build(&[("outer", 100)], true);
    assert_eq!(mp.polygons().len(), 2);
    assert!(mp.polygons().iter().all(|p| !p.closed));
}

#[test]
fn non_multipolygon_relation_is_empty() {
    let r = Relation::new(PrimitiveId(1), Vec::new(), Tags::new());
    assert!(Multipolygon::build(&r).polygons().is_empty());
}
