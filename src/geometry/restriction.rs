use std::sync::Arc;

use kurbo::{Affine, Point, Vec2};

use crate::data::primitive::{Node, Primitive, PrimitiveState, Relation, Way};
use crate::view::viewport::Viewport;

/// Distance of the icon from the via node, measured back along the from way.
const DISTANCE_FROM_VIA: f64 = 14.0;
/// Distance of the icon from the from way, perpendicular to it.
const DISTANCE_FROM_WAY: f64 = 10.0;

enum Via<'a> {
    Node(&'a Arc<Node>),
    Way(&'a Arc<Way>),
}

/// Transform placing a turn restriction icon next to the end of the `from` way.
///
/// The icon sits 14 px back along the from way and 10 px to its side (right side for right-hand
/// traffic), rotated by quadrant. `None` when members are missing or the from way does not touch
/// the via element.
pub fn restriction_transform(
    relation: &Relation,
    viewport: &Viewport,
    left_hand_traffic: bool,
) -> Option<Affine> {
    let mut from_way: Option<&Arc<Way>> = None;
    let mut to_way: Option<&Arc<Way>> = None;
    let mut via: Option<Via<'_>> = None;

    for m in relation.members() {
        if m.member.state().contains(PrimitiveState::INCOMPLETE) {
            return None;
        }
        match &m.member {
            Primitive::Way(w) => {
                if w.node_count() < 2 {
                    continue;
                }
                match m.role.as_str() {
                    "from" if from_way.is_none() => from_way = Some(w),
                    "to" if to_way.is_none() => to_way = Some(w),
                    "via" if via.is_none() => via = Some(Via::Way(w)),
                    _ => {}
                }
            }
            Primitive::Node(n) => {
                if via.is_none() && m.role == "via" {
                    via = Some(Via::Node(n));
                }
            }
            Primitive::Relation(_) => {}
        }
    }

    let (from_way, _to_way, via) = (from_way?, to_way?, via?);

    let via_node = match via {
        Via::Node(n) => {
            if !from_way.is_first_last_node(n) {
                return None;
            }
            n
        }
        Via::Way(w) => {
            let mut first = w.first_node()?;
            let mut last = w.last_node()?;
            let mut oneway = false;
            match w.tags().get("oneway").map(String::as_str) {
                Some("-1") => {
                    oneway = true;
                    std::mem::swap(&mut first, &mut last);
                }
                Some(v) => oneway = matches!(v, "yes" | "true" | "1"),
                None => {}
            }
            if from_way.is_first_last_node(first) {
                first
            } else if !oneway && from_way.is_first_last_node(last) {
                last
            } else {
                return None;
            }
        }
    };

    let nodes = from_way.nodes();
    let from_node = if nodes.first().map(|n| n.id()) == Some(via_node.id()) {
        &nodes[1]
    } else {
        &nodes[nodes.len() - 2]
    };

    let p_from = rounded(viewport.point_for_node(from_node));
    let p_via = rounded(viewport.point_for_node(via_node));
    Some(icon_transform(p_from, p_via, left_hand_traffic))
}

fn rounded(p: Point) -> Point {
    Point::new(p.x.round(), p.y.round())
}

fn icon_transform(p_from: Point, p_via: Point, left_hand_traffic: bool) -> Affine {
    let dx = (p_from.x - p_via.x).abs();
    let dy = (p_from.y - p_via.y).abs();
    let from_angle = if dx == 0.0 {
        std::f64::consts::FRAC_PI_2
    } else {
        (dy / dx).atan()
    };
    let deg = from_angle.to_degrees();

    let mut vx = DISTANCE_FROM_VIA * from_angle.cos();
    let mut vy = DISTANCE_FROM_VIA * from_angle.sin();
    if p_from.x < p_via.x {
        vx = -vx;
    }
    if p_from.y < p_via.y {
        vy = -vy;
    }

    let polar = |angle_deg: f64| {
        let r = angle_deg.to_radians();
        (DISTANCE_FROM_WAY * r.cos(), DISTANCE_FROM_WAY * r.sin())
    };
    let swapped = |angle_deg: f64| {
        let r = angle_deg.to_radians();
        (DISTANCE_FROM_WAY * r.sin(), DISTANCE_FROM_WAY * r.cos())
    };

    let right = p_from.x >= p_via.x;
    let below = p_from.y >= p_via.y;
    let lht = left_hand_traffic;
    let ((vx2, vy2), icon_deg) = match (right, below) {
        (true, true) => (polar(if lht { deg + 90.0 } else { deg - 90.0 }), 270.0 + deg),
        (false, true) => (swapped(if lht { deg + 180.0 } else { deg }), 90.0 - deg),
        (false, false) => (polar(if lht { deg - 90.0 } else { deg + 90.0 }), 90.0 + deg),
        (true, false) => (swapped(if lht { deg } else { deg + 180.0 }), 270.0 - deg),
    };

    Affine::translate(Vec2::new(p_via.x + vx + vx2, p_via.y + vy + vy2))
        * Affine::rotate(icon_deg.to_radians())
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/restriction.rs"]
mod tests;
