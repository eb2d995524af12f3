//! Geographic data model: coordinates, primitives, the dataset and multipolygon assembly.

/// Lat/lon aligned bounding boxes.
pub mod bbox;
/// Geographic and projected coordinates.
pub mod coor;
/// Shared primitive store behind a timed read/write lock.
pub mod dataset;
/// Ring assembly for multipolygon relations.
pub mod multipolygon;
/// Nodes, ways, relations and their state flags.
pub mod primitive;
