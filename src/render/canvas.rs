use std::sync::Arc;

use kurbo::{Affine, BezPath, PathEl, Point, Rect};

use crate::foundation::core::{Rgba8, ScreenRect};
use crate::foundation::error::{MapPaintError, MapPaintResult};
use crate::style::line::{LineCap, LineJoin};

/// Coverage threshold used for aliased fills.
const ALIASING_THRESHOLD: u8 = 128;

/// Stroke parameters in pixels.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StrokeStyle {
    pub(crate) width: f64,
    pub(crate) cap: LineCap,
    pub(crate) join: LineJoin,
    pub(crate) miter_limit: f64,
    pub(crate) dashes: Option<(Vec<f64>, f64)>,
}

impl StrokeStyle {
    /// One pixel wide, square caps, miter joins.
    pub(crate) fn hairline() -> Self {
        Self::new(1.0, LineCap::Square, LineJoin::Miter, 10.0)
    }

    pub(crate) fn new(width: f64, cap: LineCap, join: LineJoin, miter_limit: f64) -> Self {
        Self {
            width,
            cap,
            join,
            miter_limit,
            dashes: None,
        }
    }

    pub(crate) fn with_dashes(mut self, pattern: Vec<f64>, offset: f64) -> Self {
        self.dashes = Some((pattern, offset));
        self
    }

    fn to_cpu(&self) -> vello_cpu::kurbo::Stroke {
        let cap = match self.cap {
            LineCap::Butt => vello_cpu::kurbo::Cap::Butt,
            LineCap::Round => vello_cpu::kurbo::Cap::Round,
            LineCap::Square => vello_cpu::kurbo::Cap::Square,
        };
        let join = match self.join {
            LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
            LineJoin::Round => vello_cpu::kurbo::Join::Round,
            LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
        };
        let stroke = vello_cpu::kurbo::Stroke::new(self.width)
            .with_caps(cap)
            .with_join(join)
            .with_miter_limit(self.miter_limit.max(1.0));
        match &self.dashes {
            Some((pattern, offset)) => stroke.with_dashes(*offset, pattern.iter().copied()),
            None => stroke,
        }
    }
}

/// What a fill or stroke is painted with.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Ink<'a> {
    Color(Rgba8),
    /// Image repeated from the screen origin at its native size.
    Pattern(&'a vello_cpu::Image),
}

/// A private drawing surface for one rectangle of the screen.
///
/// Drawing calls take screen coordinates. The surface is shifted by a whole number of pixels,
/// so a tile canvas renders the pixels of its tile exactly like the full-size canvas does.
pub(crate) struct Canvas {
    ctx: vello_cpu::RenderContext,
    origin: Affine,
    width: u16,
    height: u16,
    antialiasing: bool,
}

impl Canvas {
    /// Canvas for `area`, filled with `background`.
    pub(crate) fn new(
        area: ScreenRect,
        background: Rgba8,
        antialiasing: bool,
    ) -> MapPaintResult<Self> {
        let out_of_range = |what: &str, v: i32| {
            MapPaintError::paint(format!("canvas {what} {v} out of range"))
        };
        let w: u16 = area
            .width
            .try_into()
            .map_err(|_| out_of_range("width", area.width))?;
        let h: u16 = area
            .height
            .try_into()
            .map_err(|_| out_of_range("height", area.height))?;
        let (w, h) = (w.max(1), h.max(1));
        let mut canvas = Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            origin: Affine::translate((-f64::from(area.x), -f64::from(area.y))),
            width: w,
            height: h,
            antialiasing,
        };
        canvas.reset();
        canvas.ctx.set_paint(background.to_cpu());
        canvas.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            f64::from(area.x),
            f64::from(area.y),
            f64::from(area.x) + f64::from(w),
            f64::from(area.y) + f64::from(h),
        ));
        Ok(canvas)
    }

    /// Map screen coordinates under `transform` to device pixels of this canvas.
    fn set_transform(&mut self, transform: Affine) {
        self.ctx
            .set_transform(affine_to_cpu(self.origin * transform));
    }

    fn reset(&mut self) {
        self.set_transform(Affine::IDENTITY);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
        self.set_aliased(false);
    }

    fn set_aliased(&mut self, aliased: bool) {
        let threshold = (aliased || !self.antialiasing).then_some(ALIASING_THRESHOLD);
        self.ctx.set_aliasing_threshold(threshold);
    }

    fn set_ink(&mut self, ink: Ink<'_>) {
        match ink {
            Ink::Color(c) => self.ctx.set_paint(c.to_cpu()),
            Ink::Pattern(image) => self.ctx.set_paint(repeating(image)),
        }
    }

    fn set_fill_rule(&mut self, even_odd: bool) {
        self.ctx.set_fill_rule(if even_odd {
            vello_cpu::peniko::Fill::EvenOdd
        } else {
            vello_cpu::peniko::Fill::NonZero
        });
    }

    /// Fill `path` in screen coordinates.
    pub(crate) fn fill(&mut self, path: &BezPath, ink: Ink<'_>, even_odd: bool, aliased: bool) {
        if path.elements().is_empty() {
            return;
        }
        self.reset();
        self.set_aliased(aliased);
        self.set_fill_rule(even_odd);
        self.set_ink(ink);
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    /// Stroke `path` in screen coordinates.
    pub(crate) fn stroke(
        &mut self,
        path: &BezPath,
        ink: Ink<'_>,
        stroke: &StrokeStyle,
        aliased: bool,
    ) {
        if path.elements().is_empty() || !(stroke.width > 0.0) {
            return;
        }
        self.reset();
        self.set_aliased(aliased);
        self.set_ink(ink);
        self.ctx.set_stroke(stroke.to_cpu());
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    /// Fill an axis aligned rectangle.
    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.reset();
        self.ctx.set_paint(color.to_cpu());
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Stroke a rectangle drawn under `transform`.
    pub(crate) fn stroke_rect(&mut self, rect: Rect, transform: Affine, color: Rgba8, width: f64) {
        self.reset();
        self.set_transform(transform);
        self.ctx.set_paint(color.to_cpu());
        self.ctx
            .set_stroke(StrokeStyle::new(width, LineCap::Square, LineJoin::Miter, 10.0).to_cpu());
        self.ctx.stroke_rect(&rect_to_cpu(rect));
    }

    /// Restrict drawing to `path` until [`Canvas::pop_layer`].
    pub(crate) fn push_clip(&mut self, path: &BezPath, even_odd: bool, aliased: bool) {
        self.reset();
        self.set_aliased(aliased);
        self.set_fill_rule(even_odd);
        self.ctx.push_clip_layer(&bezpath_to_cpu(path));
    }

    /// Composite everything until [`Canvas::pop_layer`] with `opacity`.
    pub(crate) fn push_opacity(&mut self, opacity: f32) {
        self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
    }

    pub(crate) fn pop_layer(&mut self) {
        self.ctx.pop_layer();
    }

    /// Draw the part `src` of an image whose top-left pixel lands at `transform * (0, 0)`.
    pub(crate) fn draw_image(&mut self, image: &vello_cpu::Image, transform: Affine, src: Rect) {
        if src.width() <= 0.0 || src.height() <= 0.0 {
            return;
        }
        self.reset();
        self.set_transform(transform);
        self.ctx.set_paint(image.clone());
        self.ctx.fill_rect(&rect_to_cpu(src));
    }

    /// Fill glyphs under `transform`; glyph positions are relative to the baseline origin.
    pub(crate) fn fill_glyphs(
        &mut self,
        font: &vello_cpu::peniko::FontData,
        font_size: f32,
        transform: Affine,
        glyphs: impl Iterator<Item = vello_cpu::Glyph>,
        color: Rgba8,
    ) {
        self.reset();
        self.set_transform(transform);
        self.ctx.set_paint(color.to_cpu());
        self.ctx
            .glyph_run(font)
            .font_size(font_size)
            .fill_glyphs(glyphs);
    }

    /// Stroke glyph outlines under `transform`, used for label halos.
    pub(crate) fn stroke_glyphs(
        &mut self,
        font: &vello_cpu::peniko::FontData,
        font_size: f32,
        transform: Affine,
        glyphs: impl Iterator<Item = vello_cpu::Glyph>,
        color: Rgba8,
        width: f64,
    ) {
        self.reset();
        self.set_transform(transform);
        self.ctx.set_paint(color.to_cpu());
        self.ctx
            .set_stroke(StrokeStyle::new(width, LineCap::Butt, LineJoin::Round, 10.0).to_cpu());
        self.ctx
            .glyph_run(font)
            .font_size(font_size)
            .stroke_glyphs(glyphs);
    }

    /// Rasterize and return the premultiplied RGBA8 pixels of the canvas area and its width.
    pub(crate) fn finish(mut self) -> (Vec<u8>, usize) {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        (pixmap.data_as_u8_slice().to_vec(), usize::from(self.width))
    }
}

fn repeating(image: &vello_cpu::Image) -> vello_cpu::Image {
    vello_cpu::Image {
        image: image.image.clone(),
        sampler: vello_cpu::peniko::ImageSampler {
            x_extend: vello_cpu::peniko::Extend::Repeat,
            y_extend: vello_cpu::peniko::Extend::Repeat,
            ..vello_cpu::peniko::ImageSampler::default()
        },
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Wrap premultiplied RGBA8 pixels as an image paint.
pub(crate) fn rgba_premul_to_image(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> MapPaintResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MapPaintError::image("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MapPaintError::image("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(MapPaintError::image("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
