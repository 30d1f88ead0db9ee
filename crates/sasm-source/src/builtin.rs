//! Bundled GLSL resources
//!
//! Snippets stored as external .glsl files and included at compile time.
//! They are registered in [`ResourceTable::with_builtins`](crate::ResourceTable::with_builtins)
//! and can be added to a shader with [`SourceKind::Resource`](crate::SourceKind::Resource).

/// Bundled resource: label plus GLSL text
pub struct BundledSource {
    pub label: &'static str,
    pub glsl: &'static str,
}

/// Color packing - pack/unpack RGBA8 in a uint, sRGB to linear
pub const COLOR: BundledSource = BundledSource {
    label: "sasm/color.glsl",
    glsl: include_str!("shaders/color.glsl"),
};

/// Fullscreen triangle - position and uv from gl_VertexID
pub const FULLSCREEN: BundledSource = BundledSource {
    label: "sasm/fullscreen.glsl",
    glsl: include_str!("shaders/fullscreen.glsl"),
};

/// Math - saturate, remap and SASM_PI
pub const MATH: BundledSource = BundledSource {
    label: "sasm/math.glsl",
    glsl: include_str!("shaders/math.glsl"),
};

/// All bundled sources
pub const ALL_SOURCES: &[&BundledSource] = &[&COLOR, &FULLSCREEN, &MATH];
