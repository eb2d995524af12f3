use std::panic::AssertUnwindSafe;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::data::bbox::BBox;
use crate::data::dataset::DataSetReadGuard;
use crate::data::primitive::Primitive;
use crate::foundation::core::ScreenRect;
use crate::foundation::error::{MapPaintError, panic_message};
use crate::render::index::Quadtree;
use crate::render::order::RecordFlags;
use crate::render::painter::FrameScope;
use crate::render::record::StyleRecord;
use crate::render::text::TextShaper;
use crate::style::{StyleElement, StyleKind, StyleSource};

/// Primitive kinds in the order they are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pass {
    Relations = 0,
    Ways = 1,
    Nodes = 2,
}

impl Pass {
    /// `true` when `element` may be drawn for a primitive of this pass with `flags`.
    pub(crate) fn accepts(
        self,
        element: &StyleElement,
        flags: RecordFlags,
        scope: &FrameScope,
    ) -> bool {
        let settings = &scope.settings;
        match self {
            Pass::Relations => {
                let areas = settings.draw_multipolygon && settings.draw_area;
                match element.kind {
                    StyleKind::Area(_) | StyleKind::AreaIcon(_) => areas && !flags.is_disabled(),
                    StyleKind::Text(_) => areas,
                    StyleKind::Node(_) => settings.draw_restriction,
                    _ => false,
                }
            }
            Pass::Ways => match element.kind {
                StyleKind::Area(_) => settings.draw_area && !flags.is_disabled(),
                _ => true,
            },
            Pass::Nodes => true,
        }
    }

    /// Sequence number of element `element` of primitive `index` in this pass. Deterministic
    /// across frames and unique within one.
    fn seq(self, index: usize, element: usize) -> u64 {
        ((self as u64) << 56) | ((index as u64 & 0xff_ffff_ffff) << 16) | (element as u64 & 0xffff)
    }
}

/// Published records of one frame.
pub(crate) enum ResolvedRecords {
    /// Every record, sorted in paint order.
    Sorted(Vec<StyleRecord>),
    /// Records indexed by their screen bounds.
    Indexed(Quadtree<StyleRecord>),
}

pub(crate) struct ResolveOutcome {
    pub(crate) records: ResolvedRecords,
    pub(crate) primitives: usize,
    pub(crate) published: usize,
    pub(crate) failed: usize,
}

/// Resolve every drawable primitive in `bbox` to style records.
///
/// Relations, ways and nodes are resolved in that order, each pass in parallel on `pool`. A
/// primitive whose style source fails or panics is logged and contributes no record. Returns
/// after every task has finished.
///
/// With `indexed` the workers insert into a shared quadtree; otherwise every worker returns its
/// records and the lists are concatenated and sorted once on the calling thread.
pub(crate) fn resolve_frame(
    pool: &rayon::ThreadPool,
    data: &DataSetReadGuard<'_>,
    bbox: &BBox,
    scope: &FrameScope,
    source: &dyn StyleSource,
    indexed: bool,
) -> ResolveOutcome {
    let screen = scope.viewport.screen_rect();
    let index = indexed.then(|| Mutex::new(Quadtree::new(screen)));
    let mut list = Vec::new();

    let mut primitives = 0usize;
    let mut failed = 0usize;
    for (pass, found) in [
        (Pass::Relations, data.search_relations(bbox)),
        (Pass::Ways, data.search_ways(bbox)),
        (Pass::Nodes, data.search_nodes(bbox)),
    ] {
        let drawable = found
            .into_iter()
            .filter(Primitive::is_drawable)
            .collect::<Vec<_>>();
        primitives += drawable.len();
        let results = pool.install(|| {
            drawable
                .par_iter()
                .enumerate()
                .map_init(
                    || TextShaper::new(scope.font()),
                    |shaper, (i, primitive)| {
                        let records =
                            resolve_primitive(pass, i, primitive, scope, source, shaper, screen)?;
                        match &index {
                            Some(tree) => {
                                let mut tree = tree.lock();
                                for record in records {
                                    if let Some(bounds) = record.bounds() {
                                        tree.insert(bounds, record);
                                    }
                                }
                                Ok(Vec::new())
                            }
                            None => Ok(records),
                        }
                    },
                )
                .collect::<Vec<Result<Vec<StyleRecord>, ()>>>()
        });
        for result in results {
            match result {
                Ok(records) => list.extend(records),
                Err(()) => failed += 1,
            }
        }
    }

    let (records, published) = match index {
        Some(tree) => {
            let tree = tree.into_inner();
            let n = tree.len();
            (ResolvedRecords::Indexed(tree), n)
        }
        None => {
            list.sort_unstable();
            let n = list.len();
            (ResolvedRecords::Sorted(list), n)
        }
    };
    tracing::debug!(primitives, published, failed, "styles resolved");
    ResolveOutcome {
        records,
        primitives,
        published,
        failed,
    }
}

/// Records of one primitive with bounds, or `Err` after logging a failure.
fn resolve_primitive(
    pass: Pass,
    index: usize,
    primitive: &Primitive,
    scope: &FrameScope,
    source: &dyn StyleSource,
    shaper: &mut TextShaper,
    screen: ScreenRect,
) -> Result<Vec<StyleRecord>, ()> {
    let flags = RecordFlags::compute(primitive.state(), false);
    let resolved = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let circum = scope.settings.circum;
        let styles = source.resolve(primitive, circum, &scope.viewport)?;
        let mut records = Vec::with_capacity(styles.len());
        for (i, style) in styles.into_iter().enumerate() {
            if !pass.accepts(&style, flags, scope) {
                continue;
            }
            let mut record = StyleRecord::new(style, primitive.clone(), flags, pass.seq(index, i));
            record.compute_bounds(scope, shaper);
            if record.intersects(screen) {
                records.push(record);
            }
        }
        Ok::<_, MapPaintError>(records)
    }));
    match resolved {
        Ok(Ok(records)) => Ok(records),
        Ok(Err(err)) => {
            tracing::error!(primitive = %primitive.id(), error = %err, "failed to resolve styles");
            Err(())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(
                primitive = %primitive.id(),
                panic = %message,
                "style resolution panicked"
            );
            Err(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/resolve.rs"]
mod tests;
