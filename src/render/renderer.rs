use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use rayon::prelude::*;

use crate::data::dataset::{DataSet, DataSetReadGuard};
use crate::foundation::core::ScreenRect;
use crate::foundation::error::{FrameContext, MapPaintError, MapPaintResult, panic_message};
use crate::render::config::RenderConfig;
use crate::render::frame::{FrameBuffer, FrameOutcome, FrameReport, SkipReason};
use crate::render::index::Quadtree;
use crate::render::painter::{FrameScope, MapPainter};
use crate::render::record::StyleRecord;
use crate::render::resolve::{ResolvedRecords, resolve_frame};
use crate::render::text::FontAsset;
use crate::render::tiles::split_tiles;
use crate::style::StyleSource;
use crate::view::viewport::Viewport;

/// State derived from one configuration version.
struct FrameCaches {
    version: u64,
    render_threads: usize,
    resolve_pool: rayon::ThreadPool,
    paint_pool: Option<rayon::ThreadPool>,
    font: Option<Arc<FontAsset>>,
}

impl FrameCaches {
    fn build(config: &RenderConfig, version: u64) -> MapPaintResult<Self> {
        let render_threads = config.effective_render_threads();
        let resolve_pool = build_thread_pool(config.resolve_threads, "resolve")?;
        let paint_pool = if render_threads > 1 {
            Some(build_thread_pool(render_threads, "paint")?)
        } else {
            None
        };
        let font = config
            .font_path
            .as_deref()
            .map(FontAsset::load)
            .transpose()?
            .map(Arc::new);
        tracing::debug!(
            version,
            render_threads,
            resolve_threads = config.resolve_threads,
            font = font.is_some(),
            "frame caches rebuilt"
        );
        Ok(Self {
            version,
            render_threads,
            resolve_pool,
            paint_pool,
            font,
        })
    }
}

fn build_thread_pool(threads: usize, role: &str) -> MapPaintResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(MapPaintError::validation(format!("{role} thread count must be >= 1")));
    }
    let role = role.to_owned();
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("mappaint-{role}-{i}"))
        .build()
        .map_err(|e| MapPaintError::paint(format!("failed to build rayon thread pool: {e}")))
}

/// Paints a [`DataSet`] in style order.
///
/// A frame resolves the visible primitives in parallel and then paints the records either
/// serially on the calling thread (`render_threads == 1`) or on disjoint screen tiles. Both
/// modes give the same pixels.
pub struct MapRenderer {
    config: RenderConfig,
    version: u64,
    source: Arc<dyn StyleSource>,
    caches: Option<FrameCaches>,
    paint: PaintFn,
}

impl std::fmt::Debug for MapRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapRenderer")
            .field("config", &self.config)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl MapRenderer {
    /// Renderer with a validated configuration.
    pub fn new(config: RenderConfig, source: Arc<dyn StyleSource>) -> MapPaintResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            version: 0,
            source,
            caches: None,
            paint: paint_records,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the configuration. Thread pools and the font are rebuilt at the start of the
    /// next frame.
    pub fn set_config(&mut self, config: RenderConfig) -> MapPaintResult<()> {
        config.validate()?;
        self.config = config;
        self.version += 1;
        Ok(())
    }

    /// Replace the style source.
    pub fn set_style_source(&mut self, source: Arc<dyn StyleSource>) {
        self.source = source;
    }

    fn ensure_caches(&mut self) -> MapPaintResult<()> {
        if self
            .caches
            .as_ref()
            .is_none_or(|c| c.version != self.version)
        {
            self.caches = Some(FrameCaches::build(&self.config, self.version)?);
        }
        Ok(())
    }

    /// Paint one frame of `data` seen through `viewport` into `out`.
    ///
    /// When the dataset stays write-locked for longer than the configured timeout the frame is
    /// skipped: nothing is painted, `out` is left unchanged and the report says why.
    #[tracing::instrument(
        skip_all,
        fields(dataset = data.id(), width = viewport.width(), height = viewport.height())
    )]
    pub fn render(
        &mut self,
        data: &DataSet,
        viewport: &Viewport,
        out: &mut FrameBuffer,
    ) -> MapPaintResult<FrameReport> {
        let context = FrameContext {
            dataset: data.id(),
            circum: viewport.circum(),
            scale: viewport.scale(),
            width: viewport.width(),
            height: viewport.height(),
            render_threads: self.config.effective_render_threads(),
        };
        self.ensure_caches()
            .map_err(|e| e.in_frame(context.clone()))?;

        let Some(guard) = data.try_read_for(self.config.lock_timeout()) else {
            tracing::warn!(
                timeout_ms = self.config.lock_timeout_ms,
                "cannot paint layer: dataset is locked"
            );
            return Ok(FrameReport::skipped(SkipReason::LockTimeout));
        };
        self.render_locked(&guard, viewport, out)
            .map_err(|e| e.in_frame(context))
    }

    fn render_locked(
        &self,
        data: &DataSetReadGuard<'_>,
        viewport: &Viewport,
        out: &mut FrameBuffer,
    ) -> MapPaintResult<FrameReport> {
        let caches = self
            .caches
            .as_ref()
            .ok_or_else(|| MapPaintError::paint("frame caches missing"))?;
        let bbox = viewport.bbox();
        let virtual_ways = if self.config.render_virtual_nodes {
            data.search_ways(&bbox)
                .into_iter()
                .filter(|p| p.is_drawable() && !p.is_disabled())
                .filter_map(|p| p.as_way().cloned())
                .collect()
        } else {
            Vec::new()
        };
        let scope = FrameScope::new(
            &self.config,
            *viewport,
            data.highlighted_segments(),
            virtual_ways,
            caches.font.clone(),
        );
        let screen = viewport.screen_rect();

        let resolved = resolve_frame(
            &caches.resolve_pool,
            data,
            &bbox,
            &scope,
            self.source.as_ref(),
            caches.paint_pool.is_some(),
        );

        // Every tile is painted before the first one is copied, so a failed frame leaves
        // `out` untouched.
        let painted_tiles = match (&resolved.records, &caches.paint_pool) {
            (ResolvedRecords::Sorted(records), _) => {
                let records = records.iter().collect::<Vec<_>>();
                let tile = paint_isolated(self.paint, &scope, &records, screen)?;
                vec![(screen, tile)]
            }
            (ResolvedRecords::Indexed(tree), Some(pool)) => {
                let tiles = split_tiles(screen, caches.render_threads);
                let paint = self.paint;
                let rendered = pool.install(|| {
                    tiles
                        .par_iter()
                        .map(|tile| paint_tile(paint, &scope, tree, *tile))
                        .collect::<MapPaintResult<Vec<_>>>()
                })?;
                tiles.into_iter().zip(rendered).collect::<Vec<_>>()
            }
            (ResolvedRecords::Indexed(_), None) => {
                return Err(MapPaintError::paint("indexed records without a paint pool"));
            }
        };
        out.ensure_size(viewport.width(), viewport.height());
        let tiles = painted_tiles.len();
        let mut painted = 0;
        for (tile, result) in &painted_tiles {
            out.copy_tile(&result.pixels, *tile)?;
            painted += result.painted;
        }

        tracing::info!(
            elements = resolved.published,
            painted,
            tiles,
            failed = resolved.failed,
            "frame painted"
        );
        Ok(FrameReport {
            outcome: FrameOutcome::Painted,
            primitives_resolved: resolved.primitives,
            records_published: resolved.published,
            records_painted: painted,
            tiles,
            failed_primitives: resolved.failed,
        })
    }
}

/// Pixels of one painted screen rectangle.
struct PaintedTile {
    pixels: Vec<u8>,
    painted: usize,
}

/// Paints records in the given order onto a canvas for one screen rectangle.
type PaintFn = fn(&FrameScope, &[&StyleRecord], ScreenRect) -> MapPaintResult<PaintedTile>;

fn paint_records(
    scope: &FrameScope,
    records: &[&StyleRecord],
    area: ScreenRect,
) -> MapPaintResult<PaintedTile> {
    let mut painter = MapPainter::new(scope, area)?;
    for record in records {
        painter.paint_record(record);
    }
    let (pixels, _, painted) = painter.finish();
    Ok(PaintedTile { pixels, painted })
}

/// Run `paint`, turning a panic into a geometry error for `area`.
fn paint_isolated(
    paint: PaintFn,
    scope: &FrameScope,
    records: &[&StyleRecord],
    area: ScreenRect,
) -> MapPaintResult<PaintedTile> {
    match std::panic::catch_unwind(AssertUnwindSafe(|| paint(scope, records, area))) {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(?area, panic = %message, "painting panicked");
            Err(MapPaintError::geometry(format!("painting {area:?} panicked: {message}")))
        }
    }
}

/// Paint the records touching `tile` on a canvas of the tile's size.
fn paint_tile(
    paint: PaintFn,
    scope: &FrameScope,
    tree: &Quadtree<StyleRecord>,
    tile: ScreenRect,
) -> MapPaintResult<PaintedTile> {
    let mut records = tree
        .query(tile)
        .into_iter()
        .filter(|r| r.intersects(tile))
        .collect::<Vec<_>>();
    records.sort_unstable();
    tracing::trace!(?tile, records = records.len(), "painting tile");
    paint_isolated(paint, scope, &records, tile)
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
