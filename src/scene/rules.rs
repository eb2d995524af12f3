use std::path::{Path, PathBuf};
use std::sync::Arc;

use kurbo::Affine;
use serde::{Deserialize, Serialize};

use crate::data::primitive::{Primitive, PrimitiveKind};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{MapPaintError, MapPaintResult};
use crate::style::area::{AreaIconStyle, AreaStyle};
use crate::style::defaults::DefaultStyles;
use crate::style::image::MapImage;
use crate::style::line::LineStyle;
use crate::style::node::{NodeGlyph, NodeStyle, Symbol};
use crate::style::placement::PositionStrategy;
use crate::style::repeat::{RepeatAlign, RepeatImageStyle};
use crate::style::text::{BoxTextStyle, TextStyle};
use crate::style::{StyleElement, StyleElementList, StyleKind, StyleSource};
use crate::view::viewport::Viewport;

/// Which primitives a rule applies to. Every set condition must hold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSelector {
    /// Primitive kind.
    pub kind: Option<PrimitiveKind>,
    /// Tag key that must be present.
    pub key: Option<String>,
    /// Required value of `key`.
    pub value: Option<String>,
    /// Ways only: closed or open.
    pub closed: Option<bool>,
    /// Lowest zoom circum (inclusive) the rule applies at.
    pub min_circum: Option<f64>,
    /// Highest zoom circum (exclusive) the rule applies at.
    pub max_circum: Option<f64>,
}

impl RuleSelector {
    /// Selector matching every primitive of `kind`.
    pub fn kind(kind: PrimitiveKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Selector matching primitives tagged `key=value`.
    pub fn tag(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// `true` when `primitive` satisfies every condition at `circum`.
    pub fn matches(&self, primitive: &Primitive, circum: f64) -> bool {
        if self.kind.is_some_and(|k| k != primitive.kind()) {
            return false;
        }
        if let Some(key) = &self.key {
            match (primitive.get(key), &self.value) {
                (None, _) => return false,
                (Some(v), Some(want)) if v != want => return false,
                _ => {}
            }
        }
        if let Some(closed) = self.closed
            && !primitive.as_way().is_some_and(|w| w.is_closed() == closed)
        {
            return false;
        }
        self.min_circum.is_none_or(|min| circum >= min)
            && self.max_circum.is_none_or(|max| circum < max)
    }
}

fn default_alpha() -> f32 {
    1.0
}

/// An image referenced by a rule: a file, or a solid rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    /// PNG, JPEG or SVG file, relative to the scene directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Colour of a generated solid image; needs `width` and `height`.
    #[serde(default)]
    pub fill: Option<Rgba8>,
    /// Display width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Display height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
    /// Horizontal shift of the drawn image.
    #[serde(default)]
    pub offset_x: i32,
    /// Vertical shift of the drawn image.
    #[serde(default)]
    pub offset_y: i32,
    /// Opacity.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
}

impl ImageSpec {
    fn load(&self, base_dir: &Path) -> MapPaintResult<MapImage> {
        let image = match (&self.path, self.fill) {
            (Some(path), _) => MapImage::load(&base_dir.join(path), self.width, self.height)?,
            (None, Some(color)) => {
                let (Some(w), Some(h)) = (self.width, self.height) else {
                    return Err(MapPaintError::validation(
                        "solid image needs both width and height",
                    ));
                };
                let rgba = [color.r, color.g, color.b, color.a]
                    .into_iter()
                    .cycle()
                    .take(w as usize * h as usize * 4)
                    .collect();
                MapImage::from_rgba8("solid", w, h, rgba)?
            }
            (None, None) => {
                return Err(MapPaintError::validation("image needs a path or a fill"));
            }
        };
        Ok(image
            .with_offset(self.offset_x, self.offset_y)
            .with_alpha(self.alpha))
    }
}

fn default_area_position() -> PositionStrategy {
    PositionStrategy::PartiallyInside
}

/// The drawable part of an [`ElementSpec`], keyed by element type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindSpec {
    /// Area fill.
    Area {
        /// Fill colour.
        color: Rgba8,
        /// Pattern drawn instead of the colour.
        #[serde(default)]
        fill_image: Option<ImageSpec>,
        /// Partial fill width in pixels.
        #[serde(default)]
        extent: Option<f32>,
        /// Share of the area above which the fill is complete.
        #[serde(default)]
        extent_threshold: Option<f32>,
    },
    /// Icon inside an area.
    AreaIcon {
        /// The icon.
        icon: ImageSpec,
        /// Placement.
        #[serde(default = "default_area_position")]
        position: PositionStrategy,
        /// Extra rotation in degrees.
        #[serde(default)]
        rotation_deg: f64,
    },
    /// Way stroke.
    Line(LineStyle),
    /// Image repeated along a way.
    RepeatImage {
        /// Image drawn at every repetition.
        pattern: ImageSpec,
        /// Sideways offset in pixels.
        #[serde(default)]
        offset: f32,
        /// Gap between images in pixels.
        #[serde(default)]
        spacing: f32,
        /// Shift of the first image in pixels.
        #[serde(default)]
        phase: f32,
        /// Opacity.
        #[serde(default = "default_alpha")]
        opacity: f32,
        /// Vertical alignment.
        #[serde(default)]
        align: RepeatAlign,
    },
    /// Node or restriction icon.
    NodeIcon {
        /// The icon.
        icon: ImageSpec,
        /// Rotation around the node in degrees.
        #[serde(default)]
        rotation_deg: Option<f64>,
    },
    /// Vector symbol at a node.
    Symbol(Symbol),
    /// The configurable default square.
    SimpleNode {},
    /// Label next to a node.
    BoxText(BoxTextStyle),
    /// Label along a way or inside an area.
    Text(TextStyle),
}

impl KindSpec {
    fn build(&self, base_dir: &Path) -> MapPaintResult<StyleKind> {
        Ok(match self {
            Self::Area {
                color,
                fill_image,
                extent,
                extent_threshold,
            } => StyleKind::Area(AreaStyle {
                color: *color,
                fill_image: fill_image.as_ref().map(|i| i.load(base_dir)).transpose()?,
                extent: *extent,
                extent_threshold: *extent_threshold,
            }),
            Self::AreaIcon {
                icon,
                position,
                rotation_deg,
            } => StyleKind::AreaIcon(AreaIconStyle {
                image: icon.load(base_dir)?,
                position: *position,
                theta: rotation_deg.to_radians(),
            }),
            Self::Line(style) => StyleKind::Line(style.clone()),
            Self::RepeatImage {
                pattern,
                offset,
                spacing,
                phase,
                opacity,
                align,
            } => StyleKind::RepeatImage(RepeatImageStyle {
                pattern: pattern.load(base_dir)?,
                offset: *offset,
                spacing: *spacing,
                phase: *phase,
                opacity: *opacity,
                align: *align,
            }),
            Self::NodeIcon { icon, rotation_deg } => StyleKind::Node(NodeStyle {
                glyph: NodeGlyph::Image(icon.load(base_dir)?),
                icon_transform: rotation_deg.map(|d| Affine::rotate(d.to_radians())),
            }),
            Self::Symbol(symbol) => {
                StyleKind::Node(NodeStyle::new(NodeGlyph::Symbol(symbol.clone())))
            }
            Self::SimpleNode {} => StyleKind::Node(NodeStyle::new(NodeGlyph::Simple)),
            Self::BoxText(style) => StyleKind::BoxText(style.clone()),
            Self::Text(style) => StyleKind::Text(style.clone()),
        })
    }
}

/// One style element of a rule: what to draw plus its ordering attributes.
///
/// In JSON the element type is the key holding the style, next to the ordering fields:
/// `{ "line": { "width": 2 }, "z_index": 1 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// What to draw.
    #[serde(flatten)]
    pub kind: KindSpec,
    /// Major z-index; the element type's default when absent.
    #[serde(default)]
    pub major_z_index: Option<f32>,
    /// Z-index.
    #[serde(default)]
    pub z_index: f32,
    /// Object z-index.
    #[serde(default)]
    pub object_z_index: f32,
    /// Modifier element.
    #[serde(default)]
    pub modifier: bool,
    /// Use the selection colour for selected primitives.
    #[serde(default = "default_selected_handling")]
    pub default_selected_handling: bool,
}

fn default_selected_handling() -> bool {
    true
}

impl ElementSpec {
    /// Build the element, loading images relative to `base_dir`.
    pub fn build(&self, base_dir: &Path) -> MapPaintResult<StyleElement> {
        let mut element = StyleElement::new(self.kind.build(base_dir)?)
            .with_z_index(self.z_index)
            .with_object_z_index(self.object_z_index)
            .with_modifier(self.modifier)
            .with_default_selected_handling(self.default_selected_handling);
        if let Some(z) = self.major_z_index {
            element = element.with_major_z_index(z);
        }
        Ok(element)
    }
}

/// A selector and the elements it adds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleRule {
    /// Matching primitives; an empty selector matches everything.
    #[serde(default, rename = "match")]
    pub selector: RuleSelector,
    /// Elements added for every match.
    pub styles: Vec<ElementSpec>,
}

#[derive(Debug)]
struct CompiledRule {
    selector: RuleSelector,
    styles: StyleElementList,
}

/// Style source applying tag rules in order.
///
/// Every matching rule appends its elements. Nodes that end up without a point style get
/// [`DefaultStyles::simple_node`] unless that is switched off.
#[derive(Debug)]
pub struct RuleStyleSource {
    rules: Vec<CompiledRule>,
    default_node_style: bool,
}

impl Default for RuleStyleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStyleSource {
    /// Source without rules.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_node_style: true,
        }
    }

    /// Compile parsed rules, loading their images relative to `base_dir`.
    pub fn from_rules(rules: &[StyleRule], base_dir: &Path) -> MapPaintResult<Self> {
        let mut source = Self::new();
        for (i, rule) in rules.iter().enumerate() {
            let styles = rule
                .styles
                .iter()
                .map(|s| s.build(base_dir).map(Arc::new))
                .collect::<MapPaintResult<Vec<_>>>()
                .map_err(|e| MapPaintError::validation(format!("style rule {i}: {e}")))?;
            source.rules.push(CompiledRule {
                selector: rule.selector.clone(),
                styles,
            });
        }
        Ok(source)
    }

    /// Append a rule.
    pub fn with_rule(mut self, selector: RuleSelector, styles: Vec<StyleElement>) -> Self {
        self.rules.push(CompiledRule {
            selector,
            styles: styles.into_iter().map(Arc::new).collect(),
        });
        self
    }

    /// Enable or disable the default square for nodes without a point style.
    pub fn with_default_node_style(mut self, enabled: bool) -> Self {
        self.default_node_style = enabled;
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` without rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl StyleSource for RuleStyleSource {
    fn resolve(
        &self,
        primitive: &Primitive,
        circum: f64,
        _viewport: &Viewport,
    ) -> MapPaintResult<StyleElementList> {
        let mut out = StyleElementList::new();
        for rule in &self.rules {
            if rule.selector.matches(primitive, circum) {
                out.extend(rule.styles.iter().cloned());
            }
        }
        if self.default_node_style
            && matches!(primitive, Primitive::Node(_))
            && !out.iter().any(|e| matches!(e.kind, StyleKind::Node(_)))
        {
            out.push(DefaultStyles::simple_node());
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/rules.rs"]
mod tests;
