use kurbo::{Affine, Point, Rect};

use crate::data::bbox::BBox;
use crate::data::coor::{EastNorth, LatLon};
use crate::data::primitive::Node;
use crate::foundation::core::ScreenRect;
use crate::foundation::error::{MapPaintError, MapPaintResult};

/// Extra screen margin around the view used when clipping geometry.
pub const CLIP_PADDING: f64 = 100.0;

/// Map view: pixel size, centre and scale (east/north units per pixel).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    center: EastNorth,
    scale: f64,
}

impl Viewport {
    /// Create a validated viewport.
    pub fn new(width: u32, height: u32, center: EastNorth, scale: f64) -> MapPaintResult<Self> {
        if width == 0 || height == 0 {
            return Err(MapPaintError::validation("viewport size must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(MapPaintError::validation(format!(
                "viewport size {width}x{height} exceeds {}",
                u16::MAX
            )));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(MapPaintError::validation("viewport scale must be finite and > 0"));
        }
        if !center.east.is_finite() || !center.north.is_finite() {
            return Err(MapPaintError::validation("viewport center must be finite"));
        }
        Ok(Self {
            width,
            height,
            center,
            scale,
        })
    }

    /// Viewport centred on a geographic coordinate.
    pub fn from_lat_lon(
        width: u32,
        height: u32,
        center: LatLon,
        scale: f64,
    ) -> MapPaintResult<Self> {
        Self::new(width, height, center.to_east_north(), scale)
    }

    /// Viewport showing `bbox` with `margin_px` pixels around it.
    pub fn fit(width: u32, height: u32, bbox: &BBox, margin_px: f64) -> MapPaintResult<Self> {
        if !bbox.is_valid() {
            return Err(MapPaintError::validation("cannot fit an empty bbox"));
        }
        let a = bbox.bottom_right().to_east_north();
        let b = bbox.top_left().to_east_north();
        let span_e = (a.east - b.east).abs();
        let span_n = (a.north - b.north).abs();
        let avail_w = (f64::from(width) - 2.0 * margin_px).max(1.0);
        let avail_h = (f64::from(height) - 2.0 * margin_px).max(1.0);
        let scale = (span_e / avail_w).max(span_n / avail_h).max(1e-3);
        let center = EastNorth::new((a.east + b.east) / 2.0, (a.north + b.north) / 2.0);
        Self::new(width, height, center, scale)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// East/north coordinate at the view centre.
    pub fn center(&self) -> EastNorth {
        self.center
    }

    /// East/north units per pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Transform from east/north to screen coordinates.
    pub fn affine(&self) -> Affine {
        let s = self.scale;
        Affine::new([
            1.0 / s,
            0.0,
            0.0,
            -1.0 / s,
            f64::from(self.width) / 2.0 - self.center.east / s,
            f64::from(self.height) / 2.0 + self.center.north / s,
        ])
    }

    /// Screen position of an east/north coordinate.
    pub fn point_for(&self, en: EastNorth) -> Point {
        Point::new(
            (en.east - self.center.east) / self.scale + f64::from(self.width) / 2.0,
            f64::from(self.height) / 2.0 - (en.north - self.center.north) / self.scale,
        )
    }

    /// Screen position of a node.
    pub fn point_for_node(&self, node: &Node) -> Point {
        self.point_for(node.east_north())
    }

    /// East/north coordinate at a screen position.
    pub fn east_north_for(&self, p: Point) -> EastNorth {
        EastNorth::new(
            self.center.east + (p.x - f64::from(self.width) / 2.0) * self.scale,
            self.center.north - (p.y - f64::from(self.height) / 2.0) * self.scale,
        )
    }

    /// Geographic coordinate at a screen position.
    pub fn lat_lon_for(&self, p: Point) -> LatLon {
        self.east_north_for(p).to_lat_lon()
    }

    /// `true` when `p` is inside the visible area (edges included).
    pub fn is_in_view(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= f64::from(self.width) && p.y <= f64::from(self.height)
    }

    /// Visible area.
    pub fn view_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Visible area as an integer rectangle.
    pub fn screen_rect(&self) -> ScreenRect {
        ScreenRect::from_size(self.width, self.height)
    }

    /// Visible area grown by [`CLIP_PADDING`] plus `margin` pixels.
    pub fn clip_rect(&self, margin: f64) -> Rect {
        let pad = CLIP_PADDING + margin.max(0.0);
        self.view_rect().inflate(pad, pad)
    }

    /// Lat/lon box covered by a screen rectangle.
    pub fn lat_lon_bounds(&self, rect: ScreenRect) -> BBox {
        let r = rect.to_rect();
        let mut b = BBox::new();
        for p in [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x0, r.y1),
            Point::new(r.x1, r.y1),
        ] {
            b.add_lat_lon(self.lat_lon_for(p));
        }
        b
    }

    /// Lat/lon box of the whole view.
    pub fn bbox(&self) -> BBox {
        self.lat_lon_bounds(self.screen_rect())
    }

    /// Integer screen rectangle covering a lat/lon box.
    pub fn rectangle_for(&self, bbox: &BBox) -> ScreenRect {
        if !bbox.is_valid() {
            return ScreenRect::NONEXISTENT;
        }
        let p1 = self.point_for(bbox.top_left().to_east_north());
        let p2 = self.point_for(bbox.bottom_right().to_east_north());
        ScreenRect::covering(Rect::from_points(p1, p2))
    }

    /// Metres represented by 100 pixels at the view centre; never 0.
    pub fn circum(&self) -> f64 {
        let cx = f64::from(self.width / 2);
        let cy = f64::from(self.height / 2);
        let a = self.lat_lon_for(Point::new(cx - 50.0, cy));
        let b = self.lat_lon_for(Point::new(cx + 50.0, cy));
        let d = a.greatcircle_distance(b);
        if d <= 0.0 { 0.1 } else { d }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/viewport.rs"]
mod tests;
