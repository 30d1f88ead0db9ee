//! SASM - GLSL shader source assembler
//!
//! This is the root crate containing the command line pipeline.
//! The actual implementation lives in:
//! - `sasm-source` - Shader source assembly and resolvers
//! - `sasm-config` - Configuration, manifests and file watching
//! - `sasm-glyph` - Glyph render descriptors
//!
//! Assemble a shader:
//! ```sh
//! sasm shaders/blur.toml -D RADIUS=4 -o blur.frag
//! sasm shaders/blur.toml --watch -o blur.frag
//! ```

pub mod pipeline;

pub use pipeline::{Assembly, BuildOptions, MacroOverride, Pipeline};
