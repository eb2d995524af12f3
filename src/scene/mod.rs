use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::coor::LatLon;
use crate::data::dataset::{DataSet, WaySegment};
use crate::data::primitive::{PrimitiveId, PrimitiveKind, PrimitiveState, Tags};
use crate::foundation::error::{MapPaintError, MapPaintResult};
use crate::render::config::RenderConfig;
use crate::view::viewport::Viewport;

mod rules;

pub use rules::{ElementSpec, ImageSpec, KindSpec, RuleSelector, RuleStyleSource, StyleRule};

/// A self-contained frame description: data, view, configuration and style rules.
///
/// ```json
/// {
///   "viewport": { "mode": "fit", "width": 256, "height": 256, "margin": 16 },
///   "nodes": [
///     { "id": 1, "lat": 47.0, "lon": 8.0 },
///     { "id": 2, "lat": 47.001, "lon": 8.001, "tags": { "amenity": "cafe" } }
///   ],
///   "ways": [{ "id": 10, "nodes": [1, 2], "tags": { "highway": "residential" } }],
///   "rules": [
///     {
///       "match": { "key": "highway" },
///       "styles": [{ "line": { "color": "#ffffff", "width": 3 } }]
///     }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    /// Size and position of the view.
    pub viewport: ViewSpec,
    /// Renderer configuration.
    #[serde(default)]
    pub config: RenderConfig,
    /// Nodes, added first.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// Ways over the nodes above.
    #[serde(default)]
    pub ways: Vec<WaySpec>,
    /// Relations, added in file order; members must be declared before the relation.
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
    /// Highlighted way segments.
    #[serde(default)]
    pub highlighted_segments: Vec<WaySegment>,
    /// Style rules, applied in order.
    #[serde(default)]
    pub rules: Vec<StyleRule>,
    /// Give nodes without a point style the default square.
    #[serde(default = "default_true")]
    pub default_node_style: bool,
}

fn default_true() -> bool {
    true
}

fn default_margin() -> f64 {
    10.0
}

/// How the view is placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewSpec {
    /// Centred on a coordinate at a fixed scale.
    Center {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Latitude of the centre.
        lat: f64,
        /// Longitude of the centre.
        lon: f64,
        /// East/north units per pixel.
        scale: f64,
    },
    /// Showing every node of the scene.
    Fit {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Free pixels around the data.
        #[serde(default = "default_margin")]
        margin: f64,
    },
}

/// State flag of a primitive in a scene file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateFlag {
    /// See [`PrimitiveState::DISABLED`].
    Disabled,
    /// See [`PrimitiveState::SELECTED`].
    Selected,
    /// See [`PrimitiveState::MEMBER_OF_SELECTED`].
    MemberOfSelected,
    /// See [`PrimitiveState::OUTER_MEMBER_OF_SELECTED`].
    OuterMemberOfSelected,
    /// See [`PrimitiveState::HIGHLIGHTED`].
    Highlighted,
    /// See [`PrimitiveState::DELETED`].
    Deleted,
    /// See [`PrimitiveState::INCOMPLETE`].
    Incomplete,
    /// See [`PrimitiveState::HIDDEN`].
    Hidden,
}

impl StateFlag {
    fn state(self) -> PrimitiveState {
        match self {
            Self::Disabled => PrimitiveState::DISABLED,
            Self::Selected => PrimitiveState::SELECTED,
            Self::MemberOfSelected => PrimitiveState::MEMBER_OF_SELECTED,
            Self::OuterMemberOfSelected => PrimitiveState::OUTER_MEMBER_OF_SELECTED,
            Self::Highlighted => PrimitiveState::HIGHLIGHTED,
            Self::Deleted => PrimitiveState::DELETED,
            Self::Incomplete => PrimitiveState::INCOMPLETE,
            Self::Hidden => PrimitiveState::HIDDEN,
        }
    }
}

fn combined_state(flags: &[StateFlag]) -> PrimitiveState {
    flags
        .iter()
        .fold(PrimitiveState::empty(), |acc, f| acc | f.state())
}

/// A node of a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    /// Node id.
    pub id: PrimitiveId,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Tags.
    #[serde(default)]
    pub tags: Tags,
    /// State flags.
    #[serde(default)]
    pub state: Vec<StateFlag>,
}

/// A way of a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaySpec {
    /// Way id.
    pub id: PrimitiveId,
    /// Node ids in order; repeat the first id to close the way.
    pub nodes: Vec<PrimitiveId>,
    /// Tags.
    #[serde(default)]
    pub tags: Tags,
    /// State flags.
    #[serde(default)]
    pub state: Vec<StateFlag>,
}

/// A relation member of a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSpec {
    /// Kind of the member.
    #[serde(rename = "type")]
    pub kind: PrimitiveKind,
    /// Member id.
    #[serde(rename = "ref")]
    pub id: PrimitiveId,
    /// Role, e.g. `outer`.
    #[serde(default)]
    pub role: String,
}

/// A relation of a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationSpec {
    /// Relation id.
    pub id: PrimitiveId,
    /// Members in order.
    pub members: Vec<MemberSpec>,
    /// Tags.
    #[serde(default)]
    pub tags: Tags,
    /// State flags.
    #[serde(default)]
    pub state: Vec<StateFlag>,
}

/// Everything needed to paint the frame a scene describes.
#[derive(Debug)]
pub struct BuiltScene {
    /// The primitives.
    pub data: DataSet,
    /// The view.
    pub viewport: Viewport,
    /// Styles from the scene rules.
    pub source: RuleStyleSource,
    /// Validated configuration.
    pub config: RenderConfig,
}

impl SceneFile {
    /// Parse a scene from JSON.
    pub fn from_json_str(s: &str) -> MapPaintResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| MapPaintError::validation(format!("invalid scene file: {e}")))
    }

    /// Read and parse a scene file.
    pub fn load(path: &Path) -> MapPaintResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            MapPaintError::validation(format!("failed to read scene '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    /// Build the dataset, view and style source. Image paths in the rules are relative to
    /// `base_dir`.
    pub fn build(&self, base_dir: &Path) -> MapPaintResult<BuiltScene> {
        self.config.validate()?;
        let data = self.build_dataset()?;
        let viewport = self.build_viewport(&data)?;
        let source = RuleStyleSource::from_rules(&self.rules, base_dir)?
            .with_default_node_style(self.default_node_style);
        tracing::debug!(
            nodes = self.nodes.len(),
            ways = self.ways.len(),
            relations = self.relations.len(),
            rules = self.rules.len(),
            "scene built"
        );
        Ok(BuiltScene {
            data,
            viewport,
            source,
            config: self.config.clone(),
        })
    }

    fn build_dataset(&self) -> MapPaintResult<DataSet> {
        let data = DataSet::new();
        {
            let mut w = data.write();
            for n in &self.nodes {
                let node = w.add_node(n.id, LatLon::new(n.lat, n.lon), n.tags.clone())?;
                if !n.state.is_empty() {
                    w.set_state(
                        PrimitiveKind::Node,
                        n.id,
                        node.state() | combined_state(&n.state),
                    )?;
                }
            }
            for way in &self.ways {
                let added = w.add_way(way.id, &way.nodes, way.tags.clone())?;
                if !way.state.is_empty() {
                    w.set_state(
                        PrimitiveKind::Way,
                        way.id,
                        added.state() | combined_state(&way.state),
                    )?;
                }
            }
            for r in &self.relations {
                let members = r
                    .members
                    .iter()
                    .map(|m| (m.role.clone(), m.kind, m.id))
                    .collect::<Vec<_>>();
                let added = w.add_relation(r.id, &members, r.tags.clone())?;
                if !r.state.is_empty() {
                    w.set_state(
                        PrimitiveKind::Relation,
                        r.id,
                        added.state() | combined_state(&r.state),
                    )?;
                }
            }
            w.set_highlighted_segments(self.highlighted_segments.clone());
        }
        Ok(data)
    }

    fn build_viewport(&self, data: &DataSet) -> MapPaintResult<Viewport> {
        match self.viewport {
            ViewSpec::Center {
                width,
                height,
                lat,
                lon,
                scale,
            } => Viewport::from_lat_lon(width, height, LatLon::new(lat, lon), scale),
            ViewSpec::Fit {
                width,
                height,
                margin,
            } => {
                let bounds = data.read().bounds();
                Viewport::fit(width, height, &bounds, margin)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mod.rs"]
mod tests;
