use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{MapPaintError, MapPaintResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::canvas::rgba_premul_to_image;

/// Edge length icons are scaled down to when they are larger than [`AUTO_RESCALE_LIMIT`].
pub const MAP_ICON_SIZE: u32 = 16;

/// Images with both sides above this many pixels and no explicit size are rescaled.
pub const AUTO_RESCALE_LIMIT: u32 = 48;

const MAX_DIM: u32 = 4096;

/// Icon or fill pattern, decoded once and kept as premultiplied RGBA8.
///
/// A greyed variant is prepared at load time for disabled primitives and inactive layers.
#[derive(Clone)]
pub struct MapImage {
    name: String,
    width: u32,
    height: u32,
    offset_x: i32,
    offset_y: i32,
    alpha: f32,
    pixels: Arc<[u8]>,
    disabled_pixels: Arc<[u8]>,
    paint: vello_cpu::Image,
    disabled_paint: vello_cpu::Image,
}

impl std::fmt::Debug for MapImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapImage")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("offset_x", &self.offset_x)
            .field("offset_y", &self.offset_y)
            .field("alpha", &self.alpha)
            .finish_non_exhaustive()
    }
}

impl PartialEq for MapImage {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.width == other.width
            && self.height == other.height
            && self.offset_x == other.offset_x
            && self.offset_y == other.offset_y
            && self.alpha == other.alpha
            && Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl MapImage {
    /// Build an image from straight-alpha RGBA8 pixels.
    pub fn from_rgba8(
        name: impl Into<String>,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> MapPaintResult<Self> {
        let name = name.into();
        if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
            return Err(MapPaintError::image(format!(
                "image '{name}' has unsupported size {width}x{height}"
            )));
        }
        let expected = (width as usize) * (height as usize) * 4;
        if rgba.len() != expected {
            return Err(MapPaintError::image(format!(
                "image '{name}' has {} bytes, expected {expected}",
                rgba.len()
            )));
        }

        let mut disabled = rgba.clone();
        grey_out_in_place(&mut disabled);
        premultiply_rgba8_in_place(&mut disabled);

        let mut pixels = rgba;
        premultiply_rgba8_in_place(&mut pixels);

        let paint = rgba_premul_to_image(&pixels, width, height)?;
        let disabled_paint = rgba_premul_to_image(&disabled, width, height)?;
        Ok(Self {
            name,
            width,
            height,
            offset_x: 0,
            offset_y: 0,
            alpha: 1.0,
            pixels: pixels.into(),
            disabled_pixels: disabled.into(),
            paint,
            disabled_paint,
        })
    }

    /// Decode PNG/JPEG or SVG bytes.
    ///
    /// `width`/`height` force a display size (one side alone keeps the aspect ratio). Without
    /// either, images larger than [`AUTO_RESCALE_LIMIT`] in both dimensions are scaled to fit
    /// [`MAP_ICON_SIZE`].
    pub fn decode(
        name: impl Into<String>,
        bytes: &[u8],
        width: Option<u32>,
        height: Option<u32>,
    ) -> MapPaintResult<Self> {
        let name = name.into();
        if looks_like_svg(&name, bytes) {
            let opts = usvg::Options::default();
            let tree = usvg::Tree::from_data(bytes, &opts)
                .map_err(|e| MapPaintError::image(format!("parse svg '{name}': {e}")))?;
            let size = tree.size();
            let w0 = (size.width().ceil() as u32).max(1);
            let h0 = (size.height().ceil() as u32).max(1);
            let (w, h) = target_size(w0, h0, width, height);
            let rgba = rasterize_svg(&tree, w, h, &name)?;
            return Self::from_rgba8(name, w, h, rgba);
        }

        let decoded = image::load_from_memory(bytes)
            .map_err(|e| MapPaintError::image(format!("decode '{name}': {e}")))?;
        let rgba = decoded.to_rgba8();
        let (w0, h0) = rgba.dimensions();
        let (w, h) = target_size(w0, h0, width, height);
        let rgba = if (w, h) == (w0, h0) {
            rgba
        } else {
            image::imageops::resize(&rgba, w, h, image::imageops::FilterType::CatmullRom)
        };
        Self::from_rgba8(name, w, h, rgba.into_raw())
    }

    /// Read and decode an image file.
    pub fn load(path: &Path, width: Option<u32>, height: Option<u32>) -> MapPaintResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            MapPaintError::image(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::decode(path.display().to_string(), &bytes, width, height)
    }

    /// Shift the drawn image relative to its anchor.
    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    /// Opacity in `[0, 1]`.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Source name (file path or identifier).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Display height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Horizontal anchor offset.
    pub fn offset_x(&self) -> i32 {
        self.offset_x
    }

    /// Vertical anchor offset.
    pub fn offset_y(&self) -> i32 {
        self.offset_y
    }

    /// Opacity in `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Premultiplied RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Premultiplied RGBA8 pixels of the greyed variant.
    pub fn disabled_pixels(&self) -> &[u8] {
        &self.disabled_pixels
    }

    /// Top-left corner of the drawn image relative to its anchor.
    pub fn draw_origin(&self) -> (i32, i32) {
        (
            -(self.width as i32 / 2) + self.offset_x,
            -(self.height as i32 / 2) + self.offset_y,
        )
    }

    pub(crate) fn paint(&self, disabled: bool) -> &vello_cpu::Image {
        if disabled {
            &self.disabled_paint
        } else {
            &self.paint
        }
    }
}

fn looks_like_svg(name: &str, bytes: &[u8]) -> bool {
    if name.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Display size for an image of `w0 x h0`.
pub(crate) fn target_size(w0: u32, h0: u32, width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let scaled = |v: u32, num: u32, den: u32| -> u32 {
        ((f64::from(v) * f64::from(num) / f64::from(den.max(1))).round() as u32).max(1)
    };
    match (width.filter(|w| *w > 0), height.filter(|h| *h > 0)) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scaled(h0, w, w0)),
        (None, Some(h)) => (scaled(w0, h, h0), h),
        (None, None) => {
            if w0 > AUTO_RESCALE_LIMIT && h0 > AUTO_RESCALE_LIMIT {
                let longest = w0.max(h0);
                (
                    scaled(w0, MAP_ICON_SIZE, longest),
                    scaled(h0, MAP_ICON_SIZE, longest),
                )
            } else {
                (w0, h0)
            }
        }
    }
}

fn rasterize_svg(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
    name: &str,
) -> MapPaintResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        MapPaintError::image(format!("failed to allocate svg pixmap for '{name}'"))
    })?;
    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    // tiny-skia stores premultiplied pixels; the constructor expects straight alpha.
    let mut out = pixmap.data().to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    Ok(out)
}

/// Greyscale and lighten, keeping alpha.
fn grey_out_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let l = (u32::from(px[0]) * 299 + u32::from(px[1]) * 587 + u32::from(px[2]) * 114) / 1000;
        let grey = (255 - (255 - l) / 2) as u8;
        px[0] = grey;
        px[1] = grey;
        px[2] = grey;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/image.rs"]
mod tests;
