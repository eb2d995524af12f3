pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Integer rectangle in screen pixels, `x`/`y` is the top-left corner.
///
/// A rectangle with a negative width or height is "nonexistent": unions start from it and it
/// intersects nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ScreenRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl ScreenRect {
    /// Rectangle that every union starts from.
    pub const NONEXISTENT: Self = Self::new(0, 0, -1, -1);

    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Exclusive right edge.
    pub fn x1(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn y1(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// `true` when the rectangle covers no pixel.
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// `true` when both rectangles are non-empty and share at least one pixel.
    pub fn intersects(self, other: ScreenRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x1() && other.x < self.x1() && self.y < other.y1() && other.y < self.y1()
    }

    /// `true` when `other` lies completely inside `self`.
    pub fn contains_rect(self, other: ScreenRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.x1() <= self.x1()
            && other.y1() <= self.y1()
    }

    /// `true` when the pixel at `(px, py)` is inside.
    pub fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x1() && py < self.y1()
    }

    /// Overlapping part of both rectangles.
    pub fn intersection(self, other: ScreenRect) -> Option<ScreenRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.x1().min(other.x1());
        let y1 = self.y1().min(other.y1());
        let out = ScreenRect::new(x0, y0, x1 - x0, y1 - y0);
        (!out.is_empty()).then_some(out)
    }

    /// Smallest rectangle containing both. Nonexistent rectangles are ignored.
    pub fn union(self, other: ScreenRect) -> ScreenRect {
        if self.width < 0 || self.height < 0 {
            return other;
        }
        if other.width < 0 || other.height < 0 {
            return self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.x1().max(other.x1());
        let y1 = self.y1().max(other.y1());
        ScreenRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Move by `(dx, dy)`.
    pub fn translate(self, dx: i32, dy: i32) -> ScreenRect {
        ScreenRect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Grow by `d` pixels on every side.
    pub fn inflate(self, d: i32) -> ScreenRect {
        ScreenRect::new(
            self.x.saturating_sub(d),
            self.y.saturating_sub(d),
            self.width.saturating_add(d.saturating_mul(2)),
            self.height.saturating_add(d.saturating_mul(2)),
        )
    }

    /// Smallest integer rectangle covering a floating point rectangle.
    pub fn covering(r: Rect) -> ScreenRect {
        let x0 = clamp_i32(r.x0.min(r.x1).floor());
        let y0 = clamp_i32(r.y0.min(r.y1).floor());
        let x1 = clamp_i32(r.x0.max(r.x1).ceil());
        let y1 = clamp_i32(r.y0.max(r.y1).ceil());
        ScreenRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Floating point rectangle with the same corners.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x1()),
            f64::from(self.y1()),
        )
    }

    /// Integer rectangle covering the four transformed corners of `self`.
    pub fn transform_bounds(self, transform: Affine) -> ScreenRect {
        let r = self.to_rect();
        let corners = [
            transform * Point::new(r.x0, r.y0),
            transform * Point::new(r.x1, r.y0),
            transform * Point::new(r.x0, r.y1),
            transform * Point::new(r.x1, r.y1),
        ];
        let mut out = Rect::from_points(corners[0], corners[1]);
        out = out.union_pt(corners[2]);
        out = out.union_pt(corners[3]);
        ScreenRect::covering(out)
    }
}

fn clamp_i32(v: f64) -> i32 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(f64::from(i32::MIN / 2), f64::from(i32::MAX / 2)) as i32
}

/// Straight-alpha RGBA8 colour.
///
/// Serialized as `"#rrggbb"` / `"#rrggbbaa"`; an `[r, g, b]` or `[r, g, b, a]` byte array is
/// accepted as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Colour with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with another alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// RGB complement, alpha kept.
    pub const fn complement(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
            a: self.a,
        }
    }

    /// Premultiplied bytes.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        [
            crate::foundation::math::mul_div255_u8(u16::from(self.r), a),
            crate::foundation::math::mul_div255_u8(u16::from(self.g), a),
            crate::foundation::math::mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn parse_hex(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> Result<u8, String> {
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
        }

        if !s.is_ascii() {
            return Err("hex color must be ASCII".to_owned());
        }
        match s.len() {
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::rgba(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            )),
            _ => Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
        }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        };
        serializer.serialize_str(&s)
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match <Repr as serde::Deserialize>::deserialize(deserializer)? {
            Repr::Hex(s) => Self::parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
