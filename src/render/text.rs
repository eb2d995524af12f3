use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{MapPaintError, MapPaintResult};
use crate::style::placement::GlyphAdvance;

/// Font file used for all labels of a frame.
pub struct FontAsset {
    bytes: Arc<Vec<u8>>,
    paint: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("bytes", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl FontAsset {
    /// Font from raw TrueType/OpenType bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> MapPaintResult<Self> {
        if bytes.is_empty() {
            return Err(MapPaintError::validation("font file is empty"));
        }
        let bytes = Arc::new(bytes);
        let paint = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Ok(Self { bytes, paint })
    }

    /// Read a font file.
    pub fn load(path: &Path) -> MapPaintResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            MapPaintError::validation(format!("read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn paint_font(&self) -> &vello_cpu::peniko::FontData {
        &self.paint
    }
}

/// One shaped glyph, positioned relative to the start of the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShapedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) advance: f32,
}

/// A single line of shaped text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ShapedText {
    pub(crate) glyphs: Vec<ShapedGlyph>,
    pub(crate) font_size: f32,
    pub(crate) width: f64,
    pub(crate) ascent: f64,
    pub(crate) descent: f64,
}

impl ShapedText {
    /// Pen positions and advances, for placing glyphs one by one.
    pub(crate) fn advances(&self) -> Vec<GlyphAdvance> {
        self.glyphs
            .iter()
            .map(|g| GlyphAdvance {
                x: f64::from(g.x),
                advance: f64::from(g.advance),
            })
            .collect()
    }

    /// Glyphs for a run drawn at the baseline origin.
    pub(crate) fn cpu_glyphs(&self) -> impl Iterator<Item = vello_cpu::Glyph> + '_ {
        self.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        })
    }
}

/// Per-worker text shaping state.
///
/// Parley contexts are not shareable, so every resolver worker and every paint task owns one.
pub(crate) struct TextShaper {
    family: Option<String>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
}

impl TextShaper {
    /// Shaper for `font`; without a font nothing can be shaped.
    pub(crate) fn new(font: Option<&FontAsset>) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let family = font.and_then(|font| {
            let families = font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
            let family_id = families.first().map(|(id, _)| *id)?;
            font_ctx
                .collection
                .family_name(family_id)
                .map(str::to_owned)
        });
        if font.is_some() && family.is_none() {
            tracing::warn!("font file has no usable family; labels are disabled");
        }
        Self {
            family,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape `text` on a single line. `None` without a font or for empty output.
    pub(crate) fn shape(&mut self, text: &str, font_size: f32) -> Option<ShapedText> {
        let Some(family) = self.family.clone() else {
            tracing::trace!("no font configured, skipping label");
            return None;
        };
        if text.is_empty() || !font_size.is_finite() || font_size <= 0.0 {
            return None;
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size));
        builder.push_default(parley::style::StyleProperty::Brush(Rgba8::default()));
        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let mut ascent = 0.0f32;
        let mut descent = 0.0f32;
        let mut width = 0.0f32;
        // Labels are single line; only the first line is used.
        if let Some(line) = layout.lines().next() {
            let metrics = line.metrics();
            ascent = metrics.ascent;
            descent = metrics.descent;
            let baseline = metrics.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                for g in run.positioned_glyphs() {
                    width = width.max(g.x + g.advance);
                    glyphs.push(ShapedGlyph {
                        id: g.id,
                        x: g.x,
                        y: g.y - baseline,
                        advance: g.advance,
                    });
                }
            }
        }
        if glyphs.is_empty() {
            return None;
        }
        Some(ShapedText {
            glyphs,
            font_size,
            width: f64::from(width),
            ascent: f64::from(ascent),
            descent: f64::from(descent),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
