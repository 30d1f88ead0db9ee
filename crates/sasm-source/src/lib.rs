//! SASM Source - GLSL shader source assembly
//!
//! This crate provides:
//! - `ShaderSource`, an ordered model of version, extension, macro and
//!   source-block fragments serialized into one program on demand
//! - The `SourceResolver` seam used to load file and resource blocks at
//!   assembly time, with filesystem and resource-table implementations
//! - The built-in prelude and bundled GLSL resources

pub mod builtin;
pub mod error;
pub mod prelude;
pub mod resolver;
pub mod source;

pub use error::ShaderSourceError;
pub use resolver::{FileSystemResolver, ResourceTable, Resolver, SourceResolver, StringResolver};
pub use source::{
    AddLocation, ExtensionMode, MacroOp, MacroValue, ShaderSource, SourceBlock, SourceKind,
};
