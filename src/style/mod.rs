use std::sync::Arc;

use crate::data::primitive::Primitive;
use crate::foundation::error::MapPaintResult;
use crate::view::viewport::Viewport;

/// Area fills and area icons.
pub mod area;
/// Built-in styles.
pub mod defaults;
/// The style element type shared by all styles.
pub mod element;
/// Icons and fill patterns.
pub mod image;
/// Way strokes.
pub mod line;
/// Node markers.
pub mod node;
/// Label and icon placement on lines and areas.
pub mod placement;
/// Images repeated along ways.
pub mod repeat;
/// Labels.
pub mod text;

pub use element::{StyleElement, StyleKind};

/// Styles of one primitive, in the order the style source produced them.
pub type StyleElementList = Vec<Arc<StyleElement>>;

/// Maps primitives to style elements.
///
/// Called concurrently from the resolver's worker threads, once per primitive and frame.
pub trait StyleSource: Send + Sync {
    /// Styles of `primitive` at a zoom where 100 px cover `circum` metres.
    fn resolve(
        &self,
        primitive: &Primitive,
        circum: f64,
        viewport: &Viewport,
    ) -> MapPaintResult<StyleElementList>;
}
