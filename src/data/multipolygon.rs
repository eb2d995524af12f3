use std::sync::Arc;

use kurbo::{BezPath, Point, Shape};

use crate::data::bbox::BBox;
use crate::data::coor::EastNorth;
use crate::data::primitive::{Node, Primitive, PrimitiveState, Relation};
use crate::geometry::partial_fill::area_and_perimeter;

/// One polygon of a multipolygon: an outer ring and the inner rings inside it.
#[derive(Clone, Debug)]
pub struct PolyData {
    /// Ring nodes; closed rings repeat the first node at the end.
    pub nodes: Vec<Arc<Node>>,
    /// `false` when the member ways could not be joined into a ring.
    pub closed: bool,
    /// Inner rings whose first node lies inside this ring.
    pub inners: Vec<PolyData>,
    /// `true` when any way of this ring is selected.
    pub selected: bool,
}

impl PolyData {
    fn new(nodes: Vec<Arc<Node>>, selected: bool) -> Self {
        let closed = is_ring(&nodes);
        Self {
            nodes,
            closed,
            inners: Vec::new(),
            selected,
        }
    }

    /// Projected coordinates of the outer ring.
    pub fn east_north(&self) -> Vec<EastNorth> {
        self.nodes.iter().map(|n| n.east_north()).collect()
    }

    /// Outer and inner rings as closed subpaths in east/north space.
    pub fn east_north_path(&self) -> BezPath {
        let mut path = BezPath::new();
        append_ring(&mut path, &self.nodes);
        for inner in &self.inners {
            append_ring(&mut path, &inner.nodes);
        }
        path
    }

    /// Area (outer minus inners) and perimeter (all rings) in east/north units.
    pub fn area_and_perimeter(&self) -> (f64, f64) {
        let (mut area, mut perimeter) = area_and_perimeter(&self.east_north());
        for inner in &self.inners {
            let (a, p) = area_and_perimeter(&inner.east_north());
            area -= a;
            perimeter += p;
        }
        (area.max(0.0), perimeter)
    }

    /// Bounding box of the outer ring.
    pub fn bbox(&self) -> BBox {
        let mut b = BBox::new();
        for n in &self.nodes {
            b.add_lat_lon(n.coor());
        }
        b
    }

    fn contains(&self, p: EastNorth) -> bool {
        let mut ring = BezPath::new();
        append_ring(&mut ring, &self.nodes);
        ring.contains(Point::new(p.east, p.north))
    }
}

/// Polygons assembled from a multipolygon relation.
#[derive(Clone, Debug, Default)]
pub struct Multipolygon {
    polygons: Vec<PolyData>,
}

impl Multipolygon {
    /// Join the member ways of `relation` into rings.
    ///
    /// Relations that are not of type `multipolygon` or `boundary` have no polygons.
    pub fn build(relation: &Relation) -> Self {
        if !relation.is_multipolygon() {
            return Self::default();
        }

        let mut outer_ways = Vec::new();
        let mut inner_ways = Vec::new();
        for m in relation.members() {
            let Primitive::Way(w) = &m.member else {
                continue;
            };
            if w.node_count() < 2 {
                continue;
            }
            let selected = w.state().contains(PrimitiveState::SELECTED);
            match m.role.as_str() {
                "inner" => inner_ways.push((w.nodes().to_vec(), selected)),
                "outer" | "" => outer_ways.push((w.nodes().to_vec(), selected)),
                _ => {}
            }
        }

        let mut polygons = join_rings(outer_ways)
            .into_iter()
            .map(|(nodes, selected)| PolyData::new(nodes, selected))
            .collect::<Vec<_>>();

        for (nodes, selected) in join_rings(inner_ways) {
            let inner = PolyData::new(nodes, selected);
            let Some(first) = inner.nodes.first().map(|n| n.east_north()) else {
                continue;
            };
            match polygons.iter_mut().find(|p| p.closed && p.contains(first)) {
                Some(outer) => outer.inners.push(inner),
                None => {
                    tracing::trace!(
                        relation = %relation.id(),
                        "inner ring outside every outer ring"
                    );
                }
            }
        }

        Self { polygons }
    }

    /// Assembled polygons.
    pub fn polygons(&self) -> &[PolyData] {
        &self.polygons
    }
}

fn is_ring(nodes: &[Arc<Node>]) -> bool {
    nodes.len() >= 3 && nodes.first().map(|n| n.id()) == nodes.last().map(|n| n.id())
}

fn append_ring(path: &mut BezPath, nodes: &[Arc<Node>]) {
    let mut it = nodes.iter().map(|n| n.east_north());
    let Some(first) = it.next() else {
        return;
    };
    path.move_to((first.east, first.north));
    for en in it {
        path.line_to((en.east, en.north));
    }
    path.close_path();
}

/// Join node chains that share end nodes. Returns each chain with its selection flag.
fn join_rings(mut pending: Vec<(Vec<Arc<Node>>, bool)>) -> Vec<(Vec<Arc<Node>>, bool)> {
    let mut out = Vec::new();
    while !pending.is_empty() {
        let (mut chain, mut selected) = pending.remove(0);
        while !is_ring(&chain) {
            let (Some(head), Some(tail)) = (
                chain.first().map(|n| n.id()),
                chain.last().map(|n| n.id()),
            ) else {
                break;
            };
            let found = pending.iter().position(|(nodes, _)| {
                let (Some(f), Some(l)) = (nodes.first(), nodes.last()) else {
                    return false;
                };
                f.id() == tail || l.id() == tail || l.id() == head || f.id() == head
            });
            let Some(idx) = found else {
                break;
            };
            let (mut next, next_selected) = pending.remove(idx);
            selected |= next_selected;
            let next_first = next.first().map(|n| n.id());
            let next_last = next.last().map(|n| n.id());
            if next_first == Some(tail) {
                chain.extend(next.into_iter().skip(1));
            } else if next_last == Some(tail) {
                next.reverse();
                chain.extend(next.into_iter().skip(1));
            } else if next_last == Some(head) {
                next.pop();
                next.extend(chain);
                chain = next;
            } else {
                next.reverse();
                next.pop();
                next.extend(chain);
                chain = next;
            }
        }
        out.push((chain, selected));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/data/multipolygon.rs"]
mod tests;
