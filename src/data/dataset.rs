use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::data::bbox::BBox;
use crate::data::coor::LatLon;
use crate::data::primitive::{
    Node, Primitive, PrimitiveId, PrimitiveKind, PrimitiveState, Relation, RelationMember, Tags,
    Way,
};
use crate::foundation::error::{MapPaintError, MapPaintResult};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Segment `lower_index -> lower_index + 1` of a way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaySegment {
    /// Way the segment belongs to.
    pub way: PrimitiveId,
    /// Index of the segment's first node.
    pub lower_index: usize,
}

#[derive(Debug, Default)]
struct Store {
    nodes: BTreeMap<PrimitiveId, Arc<Node>>,
    ways: BTreeMap<PrimitiveId, Arc<Way>>,
    relations: BTreeMap<PrimitiveId, Arc<Relation>>,
    highlighted: Vec<WaySegment>,
}

/// Shared primitive store guarded by a read/write lock.
///
/// Readers take the lock with a timeout so a long-running edit never blocks a paint.
#[derive(Debug)]
pub struct DataSet {
    id: u64,
    store: RwLock<Store>,
}

impl Default for DataSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSet {
    /// Create an empty dataset with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed),
            store: RwLock::new(Store::default()),
        }
    }

    /// Process-unique identity, used in error reports.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Try to take the read lock, giving up after `timeout`.
    pub fn try_read_for(&self, timeout: Duration) -> Option<DataSetReadGuard<'_>> {
        self.store
            .try_read_for(timeout)
            .map(|guard| DataSetReadGuard { guard })
    }

    /// Take the read lock, blocking.
    pub fn read(&self) -> DataSetReadGuard<'_> {
        DataSetReadGuard {
            guard: self.store.read(),
        }
    }

    /// Take the write lock, blocking.
    pub fn write(&self) -> DataSetWriteGuard<'_> {
        DataSetWriteGuard {
            guard: self.store.write(),
        }
    }
}

/// Read access to a [`DataSet`].
pub struct DataSetReadGuard<'a> {
    guard: RwLockReadGuard<'a, Store>,
}

impl DataSetReadGuard<'_> {
    /// Nodes inside `bbox`, ordered by id.
    pub fn search_nodes(&self, bbox: &BBox) -> Vec<Primitive> {
        self.guard
            .nodes
            .values()
            .filter(|n| bbox.contains_lat_lon(n.coor()))
            .map(|n| Primitive::Node(n.clone()))
            .collect()
    }

    /// Ways whose bbox intersects `bbox`, ordered by id.
    pub fn search_ways(&self, bbox: &BBox) -> Vec<Primitive> {
        self.guard
            .ways
            .values()
            .filter(|w| w.bbox().intersects(bbox))
            .map(|w| Primitive::Way(w.clone()))
            .collect()
    }

    /// Relations whose bbox intersects `bbox`, ordered by id.
    pub fn search_relations(&self, bbox: &BBox) -> Vec<Primitive> {
        self.guard
            .relations
            .values()
            .filter(|r| r.bbox().intersects(bbox))
            .map(|r| Primitive::Relation(r.clone()))
            .collect()
    }

    /// Highlighted way segments.
    pub fn highlighted_segments(&self) -> &[WaySegment] {
        &self.guard.highlighted
    }

    /// Look up a primitive.
    pub fn primitive(&self, kind: PrimitiveKind, id: PrimitiveId) -> Option<Primitive> {
        lookup(&self.guard, kind, id)
    }

    /// Look up a way.
    pub fn way(&self, id: PrimitiveId) -> Option<Arc<Way>> {
        self.guard.ways.get(&id).cloned()
    }

    /// Number of primitives of every kind.
    pub fn len(&self) -> usize {
        self.guard.nodes.len() + self.guard.ways.len() + self.guard.relations.len()
    }

    /// `true` when the dataset holds no primitive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding box of all nodes.
    pub fn bounds(&self) -> BBox {
        let mut b = BBox::new();
        for n in self.guard.nodes.values() {
            b.add_lat_lon(n.coor());
        }
        b
    }
}

/// Write access to a [`DataSet`].
pub struct DataSetWriteGuard<'a> {
    guard: RwLockWriteGuard<'a, Store>,
}

impl DataSetWriteGuard<'_> {
    /// Add a node.
    pub fn add_node(
        &mut self,
        id: PrimitiveId,
        coor: LatLon,
        tags: Tags,
    ) -> MapPaintResult<Arc<Node>> {
        if !coor.is_valid() {
            return Err(MapPaintError::validation(format!(
                "node {id} has invalid coordinate {coor:?}"
            )));
        }
        if self.guard.nodes.contains_key(&id) {
            return Err(MapPaintError::validation(format!("duplicate node id {id}")));
        }
        let node = Arc::new(Node::new(id, coor, tags));
        self.guard.nodes.insert(id, node.clone());
        Ok(node)
    }

    /// Add a way over existing nodes and count it as a referrer of each distinct node.
    pub fn add_way(
        &mut self,
        id: PrimitiveId,
        node_ids: &[PrimitiveId],
        tags: Tags,
    ) -> MapPaintResult<Arc<Way>> {
        if self.guard.ways.contains_key(&id) {
            return Err(MapPaintError::validation(format!("duplicate way id {id}")));
        }
        let nodes = node_ids
            .iter()
            .map(|nid| {
                self.guard.nodes.get(nid).cloned().ok_or_else(|| {
                    MapPaintError::validation(format!("way {id} references unknown node {nid}"))
                })
            })
            .collect::<MapPaintResult<Vec<_>>>()?;

        let mut seen = nodes.iter().map(|n| n.id()).collect::<Vec<_>>();
        seen.sort_unstable();
        seen.dedup();
        for nid in seen {
            if let Some(n) = self.guard.nodes.get(&nid) {
                n.add_referrer();
            }
        }

        let way = Arc::new(Way::new(id, nodes, tags));
        self.guard.ways.insert(id, way.clone());
        Ok(way)
    }

    /// Add a relation. Members that cannot be found are skipped and the relation is marked
    /// incomplete.
    pub fn add_relation(
        &mut self,
        id: PrimitiveId,
        members: &[(String, PrimitiveKind, PrimitiveId)],
        tags: Tags,
    ) -> MapPaintResult<Arc<Relation>> {
        if self.guard.relations.contains_key(&id) {
            return Err(MapPaintError::validation(format!("duplicate relation id {id}")));
        }
        let mut resolved = Vec::with_capacity(members.len());
        let mut incomplete = false;
        for (role, kind, mid) in members {
            match lookup(&self.guard, *kind, *mid) {
                Some(member) => resolved.push(RelationMember {
                    role: role.clone(),
                    member,
                }),
                None => incomplete = true,
            }
        }
        let relation = Arc::new(Relation::new(id, resolved, tags));
        if incomplete {
            tracing::debug!(relation = %id, "relation has missing members");
            relation.set_state(PrimitiveState::INCOMPLETE);
        }
        self.guard.relations.insert(id, relation.clone());
        Ok(relation)
    }

    /// Replace the state flags of a primitive.
    pub fn set_state(
        &mut self,
        kind: PrimitiveKind,
        id: PrimitiveId,
        state: PrimitiveState,
    ) -> MapPaintResult<()> {
        let p = lookup(&self.guard, kind, id)
            .ok_or_else(|| MapPaintError::validation(format!("unknown {kind:?} {id}")))?;
        p.set_state(state);
        Ok(())
    }

    /// Replace the list of highlighted way segments.
    pub fn set_highlighted_segments(&mut self, segments: Vec<WaySegment>) {
        self.guard.highlighted = segments;
    }
}

fn lookup(store: &Store, kind: PrimitiveKind, id: PrimitiveId) -> Option<Primitive> {
    match kind {
        PrimitiveKind::Node => store.nodes.get(&id).cloned().map(Primitive::Node),
        PrimitiveKind::Way => store.ways.get(&id).cloned().map(Primitive::Way),
        PrimitiveKind::Relation => store.relations.get(&id).cloned().map(Primitive::Relation),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/dataset.rs"]
mod tests;
