use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{MapPaintError, MapPaintResult};

/// Colours used by the renderer itself, independent of the style source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderColors {
    /// Canvas background, also the inner colour of oneway markers.
    pub background: Rgba8,
    /// Everything on an inactive layer and disabled primitives.
    pub inactive: Rgba8,
    /// Selected primitives.
    pub selected: Rgba8,
    /// Members of a selected relation.
    pub relation_selected: Rgba8,
    /// Highlighted ways and nodes.
    pub highlight: Rgba8,
    /// Untagged nodes.
    pub node: Rgba8,
    /// Tagged nodes.
    pub tagged: Rgba8,
    /// Untagged nodes shared by several ways.
    pub connection: Rgba8,
    /// Tagged nodes shared by several ways.
    pub tagged_connection: Rgba8,
    /// Fallback label colour.
    pub text: Rgba8,
}

impl Default for RenderColors {
    fn default() -> Self {
        Self {
            background: Rgba8::BLACK,
            inactive: Rgba8::rgb(0x40, 0x40, 0x40),
            selected: Rgba8::rgb(0xff, 0x00, 0x00),
            relation_selected: Rgba8::rgb(0xcc, 0x00, 0xcc),
            highlight: Rgba8::rgb(0x00, 0xff, 0xff),
            node: Rgba8::rgb(0xff, 0xff, 0x00),
            tagged: Rgba8::rgb(0xcc, 0xff, 0xff),
            connection: Rgba8::rgb(0xff, 0xff, 0x00),
            tagged_connection: Rgba8::rgb(0xff, 0xff, 0x00),
            text: Rgba8::WHITE,
        }
    }
}

impl RenderColors {
    /// Selection colour with the alpha of the colour it replaces.
    pub fn selected_with_alpha(&self, alpha: u8) -> Rgba8 {
        self.selected.with_alpha(alpha)
    }

    /// Relation selection colour with the alpha of the colour it replaces.
    pub fn relation_selected_with_alpha(&self, alpha: u8) -> Rgba8 {
        self.relation_selected.with_alpha(alpha)
    }
}

/// Renderer configuration.
///
/// Deserialized from JSON with every field optional. Changing it through
/// [`crate::MapRenderer::set_config`] rebuilds worker pools and the font at the next frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Paint workers; `0` uses the available parallelism, `1` paints serially on the caller's
    /// thread, `N > 1` splits the view into `N` tiles.
    pub render_threads: usize,
    /// Style resolution workers.
    pub resolve_threads: usize,
    /// Antialiased geometry and text.
    pub antialiasing: bool,
    /// How long to wait for the dataset read lock.
    pub lock_timeout_ms: u64,
    /// Extra width of a highlighted way.
    pub highlight_width: f32,
    /// Extra size of a highlighted node.
    pub highlight_radius: f32,
    /// Width decrement between the rings of a way highlight.
    pub highlight_step: f32,
    /// Extra size of the wider highlight.
    pub wider_highlight: f32,
    /// Add [`RenderConfig::wider_highlight`] to highlights.
    pub use_wider_highlight: bool,
    /// Partial fill width used for area styles that do not set one.
    pub partial_fill_extent: Option<f32>,
    /// Partial fill threshold used for area styles that do not set one.
    pub partial_fill_threshold: Option<f32>,
    /// Turn restriction icons go to the left of the from way.
    pub left_hand_traffic: bool,
    /// Draw everything in the inactive colour.
    pub inactive_mode: bool,
    /// Skip area fills.
    pub outline_only: bool,
    /// Areas are filled only while `circum` is at most this many metres.
    pub fill_areas_distance: f64,
    /// Fill multipolygon relations.
    pub multipolygon: bool,
    /// Draw turn restriction icons.
    pub restriction: bool,
    /// Line widths and dashes apply while `circum` is below this many metres.
    pub use_strokes_distance: f64,
    /// Labels are drawn while `circum` is below this many metres.
    pub show_names_distance: f64,
    /// Icons are drawn while `circum` is below this many metres.
    pub show_icons_distance: f64,
    /// Size of selected nodes.
    pub selected_node_size: u32,
    /// Size of plain nodes.
    pub unselected_node_size: u32,
    /// Size of connection nodes.
    pub connection_node_size: u32,
    /// Size of tagged nodes.
    pub tagged_node_size: u32,
    /// Fill selected nodes.
    pub fill_selected_node: bool,
    /// Fill plain nodes.
    pub fill_unselected_node: bool,
    /// Fill connection nodes.
    pub fill_connection_node: bool,
    /// Fill tagged nodes.
    pub fill_tagged_node: bool,
    /// Renderer colours.
    pub colors: RenderColors,
    /// Font for all labels; without one no label is drawn.
    pub font_path: Option<std::path::PathBuf>,
    /// Default label size in pixels.
    pub font_size: f32,
    /// Outline every record's bounds.
    pub debug_bounds: bool,
    /// Draw midpoint markers on long segments.
    pub render_virtual_nodes: bool,
    /// Size of a virtual node marker.
    pub virtual_node_size: u32,
    /// Minimum segment length for a virtual node.
    pub virtual_node_space: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_threads: 1,
            resolve_threads: 8,
            antialiasing: true,
            lock_timeout_ms: 1000,
            highlight_width: 4.0,
            highlight_radius: 7.0,
            highlight_step: 4.0,
            wider_highlight: 5.0,
            use_wider_highlight: true,
            partial_fill_extent: None,
            partial_fill_threshold: None,
            left_hand_traffic: false,
            inactive_mode: false,
            outline_only: false,
            fill_areas_distance: 10_000_000.0,
            multipolygon: true,
            restriction: true,
            use_strokes_distance: 1_000_000.0,
            show_names_distance: 10_000_000.0,
            show_icons_distance: 10_000_000.0,
            selected_node_size: 5,
            unselected_node_size: 3,
            connection_node_size: 5,
            tagged_node_size: 3,
            fill_selected_node: true,
            fill_unselected_node: false,
            fill_connection_node: false,
            fill_tagged_node: true,
            colors: RenderColors::default(),
            font_path: None,
            font_size: 8.0,
            debug_bounds: false,
            render_virtual_nodes: false,
            virtual_node_size: 8,
            virtual_node_space: 70,
        }
    }
}

impl RenderConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json_str(s: &str) -> MapPaintResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| MapPaintError::validation(format!("invalid render config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> MapPaintResult<()> {
        if self.resolve_threads == 0 {
            return Err(MapPaintError::validation("resolve_threads must be >= 1"));
        }
        let floats = [
            ("highlight_width", self.highlight_width),
            ("highlight_radius", self.highlight_radius),
            ("highlight_step", self.highlight_step),
            ("wider_highlight", self.wider_highlight),
            ("font_size", self.font_size),
        ];
        for (name, v) in floats {
            if !v.is_finite() || v < 0.0 {
                return Err(MapPaintError::validation(format!("{name} must be finite and >= 0")));
            }
        }
        let distances = [
            ("fill_areas_distance", self.fill_areas_distance),
            ("use_strokes_distance", self.use_strokes_distance),
            ("show_names_distance", self.show_names_distance),
            ("show_icons_distance", self.show_icons_distance),
        ];
        for (name, v) in distances {
            if v.is_nan() {
                return Err(MapPaintError::validation(format!("{name} must not be NaN")));
            }
        }
        for (name, v) in [
            ("partial_fill_extent", self.partial_fill_extent),
            ("partial_fill_threshold", self.partial_fill_threshold),
        ] {
            if let Some(v) = v
                && (!v.is_finite() || v < 0.0)
            {
                return Err(MapPaintError::validation(format!("{name} must be finite and >= 0")));
            }
        }
        Ok(())
    }

    /// Read lock timeout.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Effective paint worker count; `0` resolves to the available parallelism.
    pub fn effective_render_threads(&self) -> usize {
        match self.render_threads {
            0 => std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1),
            n => n,
        }
    }

    /// Largest configured node size.
    pub fn max_node_size(&self) -> u32 {
        self.selected_node_size
            .max(self.unselected_node_size)
            .max(self.connection_node_size)
            .max(self.tagged_node_size)
    }
}

/// Zoom dependent switches of one frame, derived from the configuration and the view scale.
#[derive(Clone, Debug)]
pub(crate) struct FrameSettings {
    pub(crate) config: RenderConfig,
    pub(crate) circum: f64,
    pub(crate) draw_area: bool,
    pub(crate) draw_multipolygon: bool,
    pub(crate) draw_restriction: bool,
    pub(crate) use_strokes: bool,
    pub(crate) show_names: bool,
    pub(crate) show_icons: bool,
    pub(crate) max_node_size: i32,
}

impl FrameSettings {
    pub(crate) fn new(config: &RenderConfig, circum: f64) -> Self {
        let draw_area = circum <= config.fill_areas_distance;
        Self {
            config: config.clone(),
            circum,
            draw_area,
            draw_multipolygon: draw_area && config.multipolygon,
            draw_restriction: config.restriction,
            use_strokes: config.use_strokes_distance > circum,
            show_names: config.show_names_distance > circum,
            show_icons: config.show_icons_distance > circum,
            max_node_size: config.max_node_size() as i32,
        }
    }

    /// Colours of the frame.
    pub(crate) fn colors(&self) -> &RenderColors {
        &self.config.colors
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
