use crate::foundation::core::ScreenRect;

/// Items a node holds before it splits.
pub const NODE_CAPACITY: usize = 8;

/// Deepest level a node may split to.
pub const MAX_DEPTH: u8 = 8;

/// Region quadtree over screen rectangles.
///
/// Items are stored in the deepest node whose area contains them completely. Items that do not
/// fit into the root area are kept at the root, so every inserted item can be found again.
#[derive(Debug)]
pub struct Quadtree<T> {
    root: QuadNode<T>,
    len: usize,
}

#[derive(Debug)]
struct QuadNode<T> {
    area: ScreenRect,
    depth: u8,
    items: Vec<(ScreenRect, T)>,
    children: Option<Box<[QuadNode<T>; 4]>>,
}

impl<T> QuadNode<T> {
    fn new(area: ScreenRect, depth: u8) -> Self {
        Self {
            area,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn can_split(&self) -> bool {
        self.depth < MAX_DEPTH && self.area.width >= 2 && self.area.height >= 2
    }

    fn child_for(&mut self, envelope: ScreenRect) -> Option<&mut QuadNode<T>> {
        self.children
            .as_mut()?
            .iter_mut()
            .find(|c| c.area.contains_rect(envelope))
    }

    fn split(&mut self) {
        let a = self.area;
        let hw = a.width / 2;
        let hh = a.height / 2;
        let depth = self.depth + 1;
        self.children = Some(Box::new([
            QuadNode::new(ScreenRect::new(a.x, a.y, hw, hh), depth),
            QuadNode::new(ScreenRect::new(a.x + hw, a.y, a.width - hw, hh), depth),
            QuadNode::new(ScreenRect::new(a.x, a.y + hh, hw, a.height - hh), depth),
            QuadNode::new(
                ScreenRect::new(a.x + hw, a.y + hh, a.width - hw, a.height - hh),
                depth,
            ),
        ]));
        let items = std::mem::take(&mut self.items);
        for (envelope, item) in items {
            self.insert(envelope, item);
        }
    }

    fn insert(&mut self, envelope: ScreenRect, item: T) {
        if self.children.is_none() {
            if self.items.len() < NODE_CAPACITY || !self.can_split() {
                self.items.push((envelope, item));
                return;
            }
            self.split();
        }
        match self.child_for(envelope) {
            Some(child) => child.insert(envelope, item),
            None => self.items.push((envelope, item)),
        }
    }

    fn query<'a>(&'a self, envelope: ScreenRect, out: &mut Vec<&'a T>) {
        out.extend(
            self.items
                .iter()
                .filter(|(e, _)| e.intersects(envelope))
                .map(|(_, item)| item),
        );
        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.area.intersects(envelope) {
                    child.query(envelope, out);
                }
            }
        }
    }
}

impl<T> Quadtree<T> {
    /// Empty tree covering `area`.
    pub fn new(area: ScreenRect) -> Self {
        Self {
            root: QuadNode::new(area, 0),
            len: 0,
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when no item was inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `item` with its envelope. Empty envelopes are stored but never returned by
    /// queries.
    pub fn insert(&mut self, envelope: ScreenRect, item: T) {
        self.len += 1;
        if self.root.area.contains_rect(envelope) {
            self.root.insert(envelope, item);
        } else {
            self.root.items.push((envelope, item));
        }
    }

    /// Every item whose envelope intersects `envelope`.
    pub fn query(&self, envelope: ScreenRect) -> Vec<&T> {
        let mut out = Vec::new();
        self.root.query(envelope, &mut out);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/index.rs"]
mod tests;
