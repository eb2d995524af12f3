//! Projection from east/north to screen space, and screen-space paths.

/// Parallel offset of screen polylines.
pub mod offset;
/// Screen-space paths with length-aware and clipped traversal.
pub mod path;
/// Map view state: centre, scale and pixel size.
pub mod viewport;
