/// Orientation arrows and oneway markers.
pub mod arrow;
/// Partial area fill: when to use it and the clip outline for unclosed polygons.
pub mod partial_fill;
/// Turn restriction icon placement.
pub mod restriction;
/// Regular polygon symbols drawn for nodes.
pub mod symbol;
