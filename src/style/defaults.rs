use std::sync::{Arc, LazyLock};

use crate::style::element::{StyleElement, StyleKind};
use crate::style::node::{NodeGlyph, NodeStyle};

/// Major z-index of the default node style; above icons and symbols of the same primitive.
pub const SIMPLE_NODE_MAJOR_Z_INDEX: f32 = 4.1;

static SIMPLE_NODE: LazyLock<Arc<StyleElement>> = LazyLock::new(|| {
    Arc::new(
        StyleElement::new(StyleKind::Node(NodeStyle::new(NodeGlyph::Simple)))
            .with_major_z_index(SIMPLE_NODE_MAJOR_Z_INDEX),
    )
});

/// Styles used when a style source has nothing better.
#[derive(Debug)]
pub struct DefaultStyles;

impl DefaultStyles {
    /// The default point: a square sized and coloured by the renderer configuration.
    pub fn simple_node() -> Arc<StyleElement> {
        Arc::clone(&SIMPLE_NODE)
    }
}
