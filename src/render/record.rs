use std::cmp::Ordering;
use std::sync::Arc;

use crate::data::primitive::Primitive;
use crate::foundation::core::ScreenRect;
use crate::render::order::{OrderKey, RecordFlags};
use crate::render::painter::{FrameScope, MapPainter};
use crate::render::text::TextShaper;
use crate::style::StyleElement;

/// One style element of one primitive, ready to be painted.
///
/// Records are totally ordered: by order key, then primitive id, then object z-index, then the
/// per-frame sequence number. Two records of one frame never compare equal.
#[derive(Clone, Debug)]
pub struct StyleRecord {
    style: Arc<StyleElement>,
    primitive: Primitive,
    flags: RecordFlags,
    order: OrderKey,
    bounds: Option<ScreenRect>,
    seq: u64,
}

impl StyleRecord {
    /// Record without bounds; it paints nothing until bounds are set.
    ///
    /// `seq` must be unique among the records of one frame.
    pub fn new(
        style: Arc<StyleElement>,
        primitive: Primitive,
        flags: RecordFlags,
        seq: u64,
    ) -> Self {
        let order = OrderKey::new(
            flags,
            style.major_z_index,
            style.z_index,
            style.is_default_simple_node(),
        );
        Self {
            style,
            primitive,
            flags,
            order,
            bounds: None,
            seq,
        }
    }

    /// Same record with screen bounds.
    pub fn with_bounds(mut self, bounds: ScreenRect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Style element.
    pub fn style(&self) -> &Arc<StyleElement> {
        &self.style
    }

    /// Primitive the style applies to.
    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// Selection flags.
    pub fn flags(&self) -> RecordFlags {
        self.flags
    }

    /// Order key computed at construction.
    pub fn order_key(&self) -> OrderKey {
        self.order
    }

    /// Screen bounds, `None` when the record draws nothing.
    pub fn bounds(&self) -> Option<ScreenRect> {
        self.bounds
    }

    /// Construction sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// `true` when the record has bounds that overlap `rect`.
    pub fn intersects(&self, rect: ScreenRect) -> bool {
        self.bounds.is_some_and(|b| b.intersects(rect))
    }

    /// Compute and store the screen bounds.
    pub(crate) fn compute_bounds(&mut self, scope: &FrameScope, shaper: &mut TextShaper) {
        self.bounds = self.style.bounds(&self.primitive, scope, shaper);
    }

    pub(crate) fn paint(&self, painter: &mut MapPainter<'_>) {
        self.style.paint(&self.primitive, painter, self.flags);
    }
}

impl Ord for StyleRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.primitive.id().cmp(&other.primitive.id()))
            .then_with(|| {
                self.style
                    .object_z_index
                    .total_cmp(&other.style.object_z_index)
            })
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for StyleRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for StyleRecord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StyleRecord {}

#[cfg(test)]
#[path = "../../tests/unit/render/record.rs"]
mod tests;
