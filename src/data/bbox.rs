use crate::data::coor::LatLon;

/// Lat/lon aligned bounding box; `x` is longitude and `y` latitude.
///
/// A fresh box is invalid (`xmin > xmax`) until the first point is added.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    /// Minimum longitude.
    pub xmin: f64,
    /// Minimum latitude.
    pub ymin: f64,
    /// Maximum longitude.
    pub xmax: f64,
    /// Maximum latitude.
    pub ymax: f64,
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox {
    /// Invalid box that grows with each added point.
    pub const fn new() -> Self {
        Self {
            xmin: f64::INFINITY,
            ymin: f64::INFINITY,
            xmax: f64::NEG_INFINITY,
            ymax: f64::NEG_INFINITY,
        }
    }

    /// Box around a single point.
    pub fn from_point(ll: LatLon) -> Self {
        let mut b = Self::new();
        b.add(ll.lon, ll.lat);
        b
    }

    /// Box around `(x, y)` extended by `r` degrees on every side.
    pub fn from_point_radius(x: f64, y: f64, r: f64) -> Self {
        Self::from_corners(x - r, y - r, x + r, y + r)
    }

    /// Smallest box containing both corners.
    pub fn from_corners(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        let mut b = Self::new();
        b.add(ax, ay);
        b.add(bx, by);
        b
    }

    /// Extend to contain `(x, y)`. NaN coordinates are ignored.
    pub fn add(&mut self, x: f64, y: f64) {
        if x.is_nan() || y.is_nan() {
            return;
        }
        self.xmin = self.xmin.min(x);
        self.xmax = self.xmax.max(x);
        self.ymin = self.ymin.min(y);
        self.ymax = self.ymax.max(y);
    }

    /// Extend to contain `ll`.
    pub fn add_lat_lon(&mut self, ll: LatLon) {
        self.add(ll.lon, ll.lat);
    }

    /// Extend to contain `other` when it is valid.
    pub fn add_bbox(&mut self, other: &BBox) {
        if other.is_valid() {
            self.add(other.xmin, other.ymin);
            self.add(other.xmax, other.ymax);
        }
    }

    /// `true` once at least one point was added.
    pub fn is_valid(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }

    /// Longitude span, 0 for invalid boxes.
    pub fn width(&self) -> f64 {
        if self.is_valid() {
            self.xmax - self.xmin
        } else {
            0.0
        }
    }

    /// Latitude span, 0 for invalid boxes.
    pub fn height(&self) -> f64 {
        if self.is_valid() {
            self.ymax - self.ymin
        } else {
            0.0
        }
    }

    /// `true` when the boxes overlap (touching counts).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    /// `true` when `other` lies completely inside.
    pub fn contains(&self, other: &BBox) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.xmin <= other.xmin
            && self.xmax >= other.xmax
            && self.ymin <= other.ymin
            && self.ymax >= other.ymax
    }

    /// `true` when `ll` lies inside.
    pub fn contains_lat_lon(&self, ll: LatLon) -> bool {
        self.xmin <= ll.lon && ll.lon <= self.xmax && self.ymin <= ll.lat && ll.lat <= self.ymax
    }

    /// Copy grown by `factor` times the current size on every side.
    pub fn inflate(&self, factor: f64) -> BBox {
        let dx = self.width() * factor;
        let dy = self.height() * factor;
        BBox::from_corners(
            self.xmin - dx,
            self.ymin - dy,
            self.xmax + dx,
            self.ymax + dy,
        )
    }

    /// Top-left corner (max latitude, min longitude).
    pub fn top_left(&self) -> LatLon {
        LatLon::new(self.ymax, self.xmin)
    }

    /// Bottom-right corner (min latitude, max longitude).
    pub fn bottom_right(&self) -> LatLon {
        LatLon::new(self.ymin, self.xmax)
    }

    /// Centre point.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            self.ymin + (self.ymax - self.ymin) / 2.0,
            self.xmin + (self.xmax - self.xmin) / 2.0,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/bbox.rs"]
mod tests;
