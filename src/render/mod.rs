//! CPU raster helpers: pixel compositing, font discovery and caption text rendering.

/// Premultiplied pixel compositing.
pub mod composite;
/// System font discovery.
pub mod fonts;
/// Parley layout and `vello_cpu` glyph rasterization.
pub mod text;
