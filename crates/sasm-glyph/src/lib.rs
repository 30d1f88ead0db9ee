//! SASM Glyph - glyph render descriptors
//!
//! A [`GlyphRender`] names the variant in which a glyph is rendered. It is an
//! immutable key for glyph render data caches: scalable kinds are one entry
//! regardless of pixel size, coverage glyphs get one entry per pixel size.

pub mod render;

pub use render::{GlyphRender, GlyphType};
