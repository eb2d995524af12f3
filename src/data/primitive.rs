use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::data::bbox::BBox;
use crate::data::coor::{EastNorth, LatLon};

/// Unique primitive id. Larger ids were created later.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrimitiveId(pub u64);

impl std::fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// A point.
    Node,
    /// A polyline or closed polygon.
    Way,
    /// A group of members with roles.
    Relation,
}

bitflags! {
    /// Selection and visibility flags of a primitive.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PrimitiveState: u16 {
        /// Drawn in the inactive colour.
        const DISABLED = 1 << 0;
        /// Part of the current selection.
        const SELECTED = 1 << 1;
        /// Member of a selected relation.
        const MEMBER_OF_SELECTED = 1 << 2;
        /// Outer member of a selected multipolygon.
        const OUTER_MEMBER_OF_SELECTED = 1 << 3;
        /// Hovered or otherwise highlighted.
        const HIGHLIGHTED = 1 << 4;
        /// Deleted, never drawn.
        const DELETED = 1 << 5;
        /// Missing members or nodes, never drawn.
        const INCOMPLETE = 1 << 6;
        /// Disabled and hidden, never drawn.
        const HIDDEN = 1 << 7;
    }
}

impl Default for PrimitiveState {
    fn default() -> Self {
        Self::empty()
    }
}

impl PrimitiveState {
    /// `false` for deleted, incomplete and hidden primitives.
    pub const fn is_drawable(self) -> bool {
        !self.intersects(Self::DELETED.union(Self::INCOMPLETE).union(Self::HIDDEN))
    }
}

/// Key/value tags of a primitive.
pub type Tags = BTreeMap<String, String>;

/// Keys that do not make a primitive "tagged".
pub const UNINTERESTING_KEYS: &[&str] = &[
    "created_by",
    "source",
    "note",
    "comment",
    "fixme",
    "FIXME",
    "converted_by",
];

/// `true` when any tag key is not in [`UNINTERESTING_KEYS`].
pub fn has_interesting_tags(tags: &Tags) -> bool {
    tags.keys()
        .any(|k| !UNINTERESTING_KEYS.contains(&k.as_str()))
}

#[derive(Debug, Default)]
struct StateCell(AtomicU16);

impl StateCell {
    fn get(&self) -> PrimitiveState {
        PrimitiveState::from_bits_truncate(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, state: PrimitiveState) {
        self.0.store(state.bits(), Ordering::Relaxed);
    }
}

/// A point primitive.
#[derive(Debug)]
pub struct Node {
    id: PrimitiveId,
    coor: LatLon,
    east_north: EastNorth,
    tags: Tags,
    state: StateCell,
    referrers: AtomicU32,
}

impl Node {
    /// Create a node. Its projected coordinate is computed once.
    pub fn new(id: PrimitiveId, coor: LatLon, tags: Tags) -> Self {
        Self {
            id,
            coor,
            east_north: coor.to_east_north(),
            tags,
            state: StateCell::default(),
            referrers: AtomicU32::new(0),
        }
    }

    /// Unique id.
    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    /// Geographic position.
    pub fn coor(&self) -> LatLon {
        self.coor
    }

    /// Projected position.
    pub fn east_north(&self) -> EastNorth {
        self.east_north
    }

    /// Tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Current state flags.
    pub fn state(&self) -> PrimitiveState {
        self.state.get()
    }

    /// Number of ways containing this node.
    pub fn referrers(&self) -> u32 {
        self.referrers.load(Ordering::Relaxed)
    }

    /// `true` when more than one way contains this node.
    pub fn is_connection_node(&self) -> bool {
        self.referrers() > 1
    }

    /// `true` when the node carries interesting tags.
    pub fn is_tagged(&self) -> bool {
        has_interesting_tags(&self.tags)
    }

    pub(crate) fn set_state(&self, state: PrimitiveState) {
        self.state.set(state);
    }

    pub(crate) fn add_referrer(&self) {
        self.referrers.fetch_add(1, Ordering::Relaxed);
    }
}

/// An ordered node list, open or closed.
#[derive(Debug)]
pub struct Way {
    id: PrimitiveId,
    nodes: Vec<Arc<Node>>,
    tags: Tags,
    state: StateCell,
}

impl Way {
    /// Create a way over `nodes`. Referrer counts are maintained by the dataset.
    pub fn new(id: PrimitiveId, nodes: Vec<Arc<Node>>, tags: Tags) -> Self {
        Self {
            id,
            nodes,
            tags,
            state: StateCell::default(),
        }
    }

    /// Unique id.
    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    /// Nodes in order.
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Current state flags.
    pub fn state(&self) -> PrimitiveState {
        self.state.get()
    }

    /// At least three nodes and the first node equals the last.
    pub fn is_closed(&self) -> bool {
        self.nodes.len() >= 3
            && self.first_node().map(|n| n.id()) == self.last_node().map(|n| n.id())
    }

    /// First node.
    pub fn first_node(&self) -> Option<&Arc<Node>> {
        self.nodes.first()
    }

    /// Last node.
    pub fn last_node(&self) -> Option<&Arc<Node>> {
        self.nodes.last()
    }

    /// `true` when `node` is the first or the last node.
    pub fn is_first_last_node(&self, node: &Node) -> bool {
        self.first_node().is_some_and(|n| n.id() == node.id())
            || self.last_node().is_some_and(|n| n.id() == node.id())
    }

    /// Bounding box of all nodes.
    pub fn bbox(&self) -> BBox {
        let mut b = BBox::new();
        for n in &self.nodes {
            b.add_lat_lon(n.coor());
        }
        b
    }

    pub(crate) fn set_state(&self, state: PrimitiveState) {
        self.state.set(state);
    }
}

/// A member of a relation.
#[derive(Clone, Debug)]
pub struct RelationMember {
    /// Role, possibly empty.
    pub role: String,
    /// Member primitive.
    pub member: Primitive,
}

/// A group of primitives with roles.
#[derive(Debug)]
pub struct Relation {
    id: PrimitiveId,
    members: Vec<RelationMember>,
    tags: Tags,
    state: StateCell,
}

const MAX_RELATION_DEPTH: usize = 8;

impl Relation {
    /// Create a relation.
    pub fn new(id: PrimitiveId, members: Vec<RelationMember>, tags: Tags) -> Self {
        Self {
            id,
            members,
            tags,
            state: StateCell::default(),
        }
    }

    /// Unique id.
    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    /// Members in order.
    pub fn members(&self) -> &[RelationMember] {
        &self.members
    }

    /// Tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Current state flags.
    pub fn state(&self) -> PrimitiveState {
        self.state.get()
    }

    /// Value of the `type` tag.
    pub fn relation_type(&self) -> Option<&str> {
        self.tags.get("type").map(String::as_str)
    }

    /// `true` for `type=multipolygon` and `type=boundary`.
    pub fn is_multipolygon(&self) -> bool {
        matches!(self.relation_type(), Some("multipolygon" | "boundary"))
    }

    /// Union of the member boxes. Nested relations deeper than a fixed limit are ignored.
    pub fn bbox(&self) -> BBox {
        self.bbox_at_depth(0)
    }

    fn bbox_at_depth(&self, depth: usize) -> BBox {
        let mut b = BBox::new();
        if depth >= MAX_RELATION_DEPTH {
            return b;
        }
        for m in &self.members {
            match &m.member {
                Primitive::Node(n) => b.add_lat_lon(n.coor()),
                Primitive::Way(w) => b.add_bbox(&w.bbox()),
                Primitive::Relation(r) => b.add_bbox(&r.bbox_at_depth(depth + 1)),
            }
        }
        b
    }

    pub(crate) fn set_state(&self, state: PrimitiveState) {
        self.state.set(state);
    }
}

/// Any primitive, shared.
#[derive(Clone, Debug)]
pub enum Primitive {
    /// A node.
    Node(Arc<Node>),
    /// A way.
    Way(Arc<Way>),
    /// A relation.
    Relation(Arc<Relation>),
}

impl Primitive {
    /// Unique id.
    pub fn id(&self) -> PrimitiveId {
        match self {
            Primitive::Node(n) => n.id(),
            Primitive::Way(w) => w.id(),
            Primitive::Relation(r) => r.id(),
        }
    }

    /// Kind of primitive.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Node(_) => PrimitiveKind::Node,
            Primitive::Way(_) => PrimitiveKind::Way,
            Primitive::Relation(_) => PrimitiveKind::Relation,
        }
    }

    /// Current state flags.
    pub fn state(&self) -> PrimitiveState {
        match self {
            Primitive::Node(n) => n.state(),
            Primitive::Way(w) => w.state(),
            Primitive::Relation(r) => r.state(),
        }
    }

    /// Tags.
    pub fn tags(&self) -> &Tags {
        match self {
            Primitive::Node(n) => n.tags(),
            Primitive::Way(w) => w.tags(),
            Primitive::Relation(r) => r.tags(),
        }
    }

    /// Tag value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags().get(key).map(String::as_str)
    }

    /// `true` when the primitive carries interesting tags.
    pub fn is_tagged(&self) -> bool {
        has_interesting_tags(self.tags())
    }

    /// Bounding box.
    pub fn bbox(&self) -> BBox {
        match self {
            Primitive::Node(n) => BBox::from_point(n.coor()),
            Primitive::Way(w) => w.bbox(),
            Primitive::Relation(r) => r.bbox(),
        }
    }

    /// `false` for deleted, incomplete and hidden primitives.
    pub fn is_drawable(&self) -> bool {
        self.state().is_drawable()
    }

    /// Drawn in the inactive colour.
    pub fn is_disabled(&self) -> bool {
        self.state().contains(PrimitiveState::DISABLED)
    }

    /// Part of the selection.
    pub fn is_selected(&self) -> bool {
        self.state().contains(PrimitiveState::SELECTED)
    }

    /// Member of a selected relation.
    pub fn is_member_of_selected(&self) -> bool {
        self.state().contains(PrimitiveState::MEMBER_OF_SELECTED)
    }

    /// Outer member of a selected multipolygon.
    pub fn is_outer_member_of_selected(&self) -> bool {
        self.state()
            .contains(PrimitiveState::OUTER_MEMBER_OF_SELECTED)
    }

    /// Highlighted.
    pub fn is_highlighted(&self) -> bool {
        self.state().contains(PrimitiveState::HIGHLIGHTED)
    }

    /// The node, when this is one.
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Primitive::Node(n) => Some(n),
            _ => None,
        }
    }

    /// The way, when this is one.
    pub fn as_way(&self) -> Option<&Arc<Way>> {
        match self {
            Primitive::Way(w) => Some(w),
            _ => None,
        }
    }

    /// The relation, when this is one.
    pub fn as_relation(&self) -> Option<&Arc<Relation>> {
        match self {
            Primitive::Relation(r) => Some(r),
            _ => None,
        }
    }

    pub(crate) fn set_state(&self, state: PrimitiveState) {
        match self {
            Primitive::Node(n) => n.set_state(state),
            Primitive::Way(w) => w.set_state(state),
            Primitive::Relation(r) => r.set_state(state),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/primitive.rs"]
mod tests;
