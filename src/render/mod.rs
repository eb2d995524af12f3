pub(crate) mod canvas;
/// Renderer configuration and the per-frame zoom switches derived from it.
pub mod config;
/// Output buffer and frame reports.
pub mod frame;
/// Spatial index of records by screen bounds.
pub mod index;
/// Order keys and selection flags.
pub mod order;
pub(crate) mod painter;
/// Style records and their paint order.
pub mod record;
/// The frame entry point.
pub mod renderer;
pub(crate) mod resolve;
/// Fonts and text shaping.
pub mod text;
/// Splitting the screen into paint tiles.
pub mod tiles;
