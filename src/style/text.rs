use kurbo::{Affine, Point, Rect, Vec2};

use crate::data::primitive::Primitive;
use crate::foundation::core::Rgba8;
use crate::style::placement::PositionStrategy;

/// Keys tried in order by [`LabelText::AutoName`].
pub const AUTO_NAME_KEYS: &[&str] = &[
    "name",
    "int_name",
    "loc_name",
    "ref",
    "operator",
    "brand",
    "addr:housenumber",
];

/// Where the text of a label comes from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelText {
    /// Fixed string.
    Static {
        /// Text to show.
        text: String,
    },
    /// Value of one tag.
    Tag {
        /// Tag key.
        key: String,
    },
    /// First present key of [`AUTO_NAME_KEYS`].
    AutoName,
}

/// Text, font size and colours shared by all label styles.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextLabel {
    /// Source of the string.
    pub source: LabelText,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Fill colour.
    #[serde(default = "default_text_color")]
    pub color: Rgba8,
    /// Halo width in pixels; `<= 0` disables the halo.
    #[serde(default)]
    pub halo_radius: f32,
    /// Halo colour; the complement of `color` when absent.
    #[serde(default)]
    pub halo_color: Option<Rgba8>,
    /// Extra transform applied around the anchor.
    #[serde(default)]
    pub text_transform: Option<Affine>,
}

fn default_font_size() -> f32 {
    8.0
}

fn default_text_color() -> Rgba8 {
    Rgba8::WHITE
}

impl TextLabel {
    /// Label without halo.
    pub fn new(source: LabelText, font_size: f32, color: Rgba8) -> Self {
        Self {
            source,
            font_size,
            color,
            halo_radius: 0.0,
            halo_color: None,
            text_transform: None,
        }
    }

    /// Same label with a halo.
    pub fn with_halo(mut self, radius: f32, color: Option<Rgba8>) -> Self {
        self.halo_radius = radius;
        self.halo_color = color;
        self
    }

    /// String shown for `primitive`; `None` when it would be empty.
    pub fn string_for(&self, primitive: &Primitive) -> Option<String> {
        let s = match &self.source {
            LabelText::Static { text } => Some(text.as_str()),
            LabelText::Tag { key } => primitive.get(key),
            LabelText::AutoName => AUTO_NAME_KEYS.iter().find_map(|k| primitive.get(k)),
        }?;
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_owned())
    }

    /// Effective halo colour, `None` without halo.
    pub fn halo(&self) -> Option<Rgba8> {
        (self.halo_radius > 0.0).then(|| self.halo_color.unwrap_or(self.color.complement()))
    }

    /// Optional transform, identity when absent.
    pub fn transform(&self) -> Affine {
        self.text_transform.unwrap_or(Affine::IDENTITY)
    }
}

/// Horizontal position of a box label relative to its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    /// Left of the box.
    Left,
    /// Centred on the box.
    Center,
    /// Right of the box.
    #[default]
    Right,
}

/// Vertical position of a box label relative to its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    /// Baseline at the top edge minus the descent.
    Above,
    /// Text hanging from the top edge.
    Top,
    /// Vertically centred on the point.
    Center,
    /// Baseline at the bottom edge.
    #[default]
    Bottom,
    /// Text below the box.
    Below,
}

/// Label placed next to a point, relative to the box its symbol occupies.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoxTextStyle {
    /// Text and colours.
    pub text: TextLabel,
    /// Box of the point symbol, relative to the point.
    pub box_rect: Rect,
    /// Extra horizontal offset.
    #[serde(default)]
    pub x_offset: f64,
    /// Extra vertical offset.
    #[serde(default)]
    pub y_offset: f64,
    /// Horizontal alignment.
    #[serde(default)]
    pub h_align: HAlign,
    /// Vertical alignment.
    #[serde(default)]
    pub v_align: VAlign,
}

impl BoxTextStyle {
    /// Label bounds relative to the baseline origin.
    pub fn string_bounds(width: f64, ascent: f64, descent: f64) -> Rect {
        Rect::new(0.0, -ascent, width, descent)
    }

    /// Baseline origin relative to the point, rounded to whole pixels.
    pub fn anchor(&self, width: f64, ascent: f64, descent: f64) -> Vec2 {
        let b = self.box_rect;
        let mut x = self.x_offset;
        let mut y = self.y_offset;
        match self.h_align {
            HAlign::Right => x += b.x1 + 2.0,
            HAlign::Center => x -= width / 2.0,
            HAlign::Left => x -= -b.x0 + 4.0 + width,
        }
        match self.v_align {
            VAlign::Bottom => y += b.y1,
            VAlign::Above => y -= -b.y0 + descent,
            VAlign::Top => y -= -b.y0 - ascent,
            VAlign::Center => y += (ascent - descent) / 2.0,
            VAlign::Below => y += b.y1 + ascent + 2.0,
        }
        Vec2::new(x.round(), y.round())
    }

    /// Transform from string space to the screen for a label at `point`.
    pub fn transform(&self, point: Point, width: f64, ascent: f64, descent: f64) -> Affine {
        Affine::translate(Vec2::new(point.x.round(), point.y.round()))
            * self.text.transform()
            * Affine::translate(self.anchor(width, ascent, descent))
    }
}

/// Label along a line or inside an area.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    /// Text and colours.
    pub text: TextLabel,
    /// Placement strategy.
    #[serde(default)]
    pub position: PositionStrategy,
}

#[cfg(test)]
#[path = "../../tests/unit/style/text.rs"]
mod tests;
