use crate::foundation::core::{Rgba8, ScreenRect};
use crate::foundation::error::{MapPaintError, MapPaintResult};

/// Premultiplied RGBA8 output of a frame, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FrameBuffer {
    /// Transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Premultiplied bytes of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Rgba8) {
        let px = color.premultiplied();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Straight-alpha copy of the pixels, e.g. for PNG encoding.
    pub fn to_unpremultiplied(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    pub(crate) fn ensure_size(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    /// Copy the pixels of `tile` into place. `src` holds exactly the tile's premultiplied
    /// RGBA8 pixels, row-major.
    pub(crate) fn copy_tile(&mut self, src: &[u8], tile: ScreenRect) -> MapPaintResult<()> {
        let src_width = tile.width.max(0) as usize;
        let expected = src_width * tile.height.max(0) as usize * 4;
        if src.len() != expected {
            return Err(MapPaintError::paint(format!(
                "tile {tile:?} needs {expected} bytes, got {}",
                src.len()
            )));
        }
        let Some(clipped) = tile.intersection(ScreenRect::from_size(self.width, self.height)) else {
            return Ok(());
        };
        let dst_width = self.width as usize;
        let row_len = clipped.width as usize * 4;
        for y in clipped.y..clipped.y1() {
            let sx = (clipped.x - tile.x) as usize;
            let sy = (y - tile.y) as usize;
            let s = (sy * src_width + sx) * 4;
            let d = (y as usize * dst_width + clipped.x as usize) * 4;
            self.data[d..d + row_len].copy_from_slice(&src[s..s + row_len]);
        }
        Ok(())
    }
}

/// Why a frame painted nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The dataset read lock was not acquired in time.
    LockTimeout,
}

/// Result of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was painted.
    Painted,
    /// The frame was skipped; the buffer is unchanged.
    Skipped(SkipReason),
}

/// Counters of one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Whether anything was painted.
    pub outcome: FrameOutcome,
    /// Primitives handed to the style source.
    pub primitives_resolved: usize,
    /// Records with bounds that entered the paint phase.
    pub records_published: usize,
    /// Paint calls, summed over tiles.
    pub records_painted: usize,
    /// Tiles painted; `1` in serial mode.
    pub tiles: usize,
    /// Primitives whose styles failed to resolve.
    pub failed_primitives: usize,
}

impl FrameReport {
    /// Report of a frame that did not run.
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: FrameOutcome::Skipped(reason),
            primitives_resolved: 0,
            records_published: 0,
            records_painted: 0,
            tiles: 0,
            failed_primitives: 0,
        }
    }

    /// `true` when the frame was painted.
    pub fn is_painted(&self) -> bool {
        self.outcome == FrameOutcome::Painted
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
