//! Manifest to GLSL pipeline
//!
//! Side-effect-free apart from reading the manifest and the shader files it
//! references, so the command line tool and tests share it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use sasm_config::{Config, ShaderManifest};
use sasm_source::{AddLocation, ShaderSource};

/// Macro operation given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroOverride {
    /// `-D NAME` or `-D NAME=VALUE`
    Define { name: String, value: String },
    /// `-U NAME`
    Undef(String),
}

impl MacroOverride {
    /// Parse the argument of `-D`: `NAME` or `NAME=VALUE`
    pub fn define(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((name, value)) => MacroOverride::Define {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => MacroOverride::Define {
                name: arg.trim().to_string(),
                value: String::new(),
            },
        }
    }

    pub fn undef(name: &str) -> Self {
        MacroOverride::Undef(name.trim().to_string())
    }

    fn apply(&self, shader: &mut ShaderSource) {
        match self {
            MacroOverride::Define { name, value } => {
                shader.add_macro(name, value, AddLocation::PushBack);
            }
            MacroOverride::Undef(name) => {
                shader.remove_macro(name);
            }
        }
    }
}

/// Overrides applied on top of the manifest
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Replaces the manifest's version
    pub version: Option<String>,
    /// Drop the built-in prelude
    pub no_prelude: bool,
    /// Appended after the manifest's macros, in the order given
    pub macros: Vec<MacroOverride>,
}

/// A manifest plus the configuration and overrides used to assemble it
#[derive(Debug, Clone)]
pub struct Pipeline {
    manifest: PathBuf,
    config: Config,
    options: BuildOptions,
}

impl Pipeline {
    pub fn new(manifest: impl Into<PathBuf>, config: Config, options: BuildOptions) -> Self {
        Self {
            manifest: manifest.into(),
            config,
            options,
        }
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the manifest tree and apply the overrides
    pub fn shader(&self) -> anyhow::Result<ShaderSource> {
        self.tracked_shader().map(|(shader, _)| shader)
    }

    /// Build and assemble the shader, reading every referenced file
    pub fn assemble(&self) -> anyhow::Result<String> {
        self.run().map(|assembly| assembly.code)
    }

    /// Build and assemble the shader, also reporting the manifest
    /// directories the build visited
    pub fn run(&self) -> anyhow::Result<Assembly> {
        let resolver = self
            .config
            .resolver()
            .context("Failed to set up shader resolver")?;
        let (mut shader, manifest_dirs) = self.tracked_shader()?;
        let code = shader
            .assembled_code(&resolver)
            .with_context(|| format!("Failed to assemble {:?}", self.manifest))?
            .to_string();
        Ok(Assembly {
            code,
            manifest_dirs,
        })
    }

    fn tracked_shader(&self) -> anyhow::Result<(ShaderSource, Vec<PathBuf>)> {
        let (mut shader, dirs) = ShaderManifest::build_tracked(&self.manifest, &self.config.general)
            .with_context(|| format!("Failed to build shader from {:?}", self.manifest))?;

        if let Some(version) = &self.options.version {
            shader.specify_version(version);
        }
        if self.options.no_prelude {
            shader.disable_pre_added_source();
        }
        for op in &self.options.macros {
            op.apply(&mut shader);
        }

        Ok((shader, dirs))
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Assembled GLSL
    pub code: String,
    /// Canonical directories of the manifest and its libraries
    pub manifest_dirs: Vec<PathBuf>,
}
