//! Assembly errors

use thiserror::Error;

/// Errors raised while assembling a [`ShaderSource`](crate::ShaderSource).
///
/// Mutating a shader source never fails; only resolving file and resource
/// blocks at assembly time can. Assembly stops at the first failure.
#[derive(Error, Debug)]
pub enum ShaderSourceError {
    #[error("Unresolved shader file {path:?}: {source}")]
    UnresolvedFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unresolved shader resource: {key}")]
    UnresolvedResource { key: String },
}

impl ShaderSourceError {
    /// The file path or resource label that could not be resolved
    pub fn reference(&self) -> &str {
        match self {
            ShaderSourceError::UnresolvedFile { path, .. } => path,
            ShaderSourceError::UnresolvedResource { key } => key,
        }
    }
}
