//! mappaint renders geographic vector data in a deterministic, style-ordered way.
//!
//! A frame goes through two phases:
//!
//! - resolve every visible primitive into style records (in parallel, one task per primitive)
//! - paint the records in one global order, either serially or on disjoint screen tiles
//!
//! Entry point is [`MapRenderer::render`], which reads a [`DataSet`] under a short read lock and
//! writes into a [`FrameBuffer`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Geographic data model: coordinates, primitives, dataset and multipolygons.
pub mod data;
/// Geometry helpers used while painting: partial fills, arrows, symbols and restrictions.
pub mod geometry;
/// Frame rendering: order keys, records, resolver, spatial index, tiles and painter.
pub mod render;
/// JSON scene files and the rule-based style source built from them.
pub mod scene;
/// Style elements and label placement.
pub mod style;
/// Viewport projection and screen-space paths.
pub mod view;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, ScreenRect, Vec2};
pub use crate::foundation::error::{FrameContext, MapPaintError, MapPaintResult};

pub use crate::data::bbox::BBox;
pub use crate::data::coor::{EastNorth, LatLon};
pub use crate::data::dataset::{DataSet, DataSetReadGuard, DataSetWriteGuard, WaySegment};
pub use crate::data::primitive::{
    Node, Primitive, PrimitiveId, PrimitiveKind, PrimitiveState, Relation, RelationMember, Tags,
    Way,
};
pub use crate::render::config::{RenderColors, RenderConfig};
pub use crate::render::frame::{FrameBuffer, FrameOutcome, FrameReport, SkipReason};
pub use crate::render::order::{OrderKey, RecordFlags, float_to_fixed};
pub use crate::render::record::StyleRecord;
pub use crate::render::renderer::MapRenderer;
pub use crate::render::tiles::{split_tiles, tile_grid};
pub use crate::scene::{BuiltScene, RuleSelector, RuleStyleSource, SceneFile};
pub use crate::style::{StyleElement, StyleElementList, StyleKind, StyleSource};
pub use crate::view::viewport::Viewport;
