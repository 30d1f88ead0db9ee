//! Shader manifests
//!
//! A manifest is a TOML file describing the fragments of one shader:
//!
//! ```toml
//! version = "450"
//! libraries = ["common.toml"]
//!
//! [extensions]
//! GL_ARB_shader_image_load_store = "require"
//!
//! [[macros]]
//! name = "TILE_SIZE"
//! value = 16
//!
//! [[sources]]
//! resource = "sasm/color.glsl"
//!
//! [[sources]]
//! file = "main.frag"
//! ```
//!
//! Libraries are manifests of their own. Their source blocks and macros are
//! merged ahead of the including manifest's, and their extensions are
//! specified on it; their version and prelude settings are ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use sasm_source::{AddLocation, ExtensionMode, ShaderSource, SourceKind};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, GeneralConfig};

/// Insertion location of a macro or source entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Back,
    Front,
}

impl From<Location> for AddLocation {
    fn from(location: Location) -> Self {
        match location {
            Location::Back => AddLocation::PushBack,
            Location::Front => AddLocation::PushFront,
        }
    }
}

/// Extension usage as written in a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionSetting {
    Require,
    Enable,
    Warn,
    Disable,
}

impl From<ExtensionSetting> for ExtensionMode {
    fn from(setting: ExtensionSetting) -> Self {
        match setting {
            ExtensionSetting::Require => ExtensionMode::Require,
            ExtensionSetting::Enable => ExtensionMode::Enable,
            ExtensionSetting::Warn => ExtensionMode::Warn,
            ExtensionSetting::Disable => ExtensionMode::Disable,
        }
    }
}

/// Macro value as written in a manifest
///
/// Scalars are emitted as GLSL literals: floats keep their decimal point, so
/// `1.0` stays `1.0` and never becomes the integer `1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MacroSetting {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl fmt::Display for MacroSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroSetting::Integer(value) => write!(f, "{}", value),
            // Debug keeps the shortest round-trip form with a `.0` or exponent
            MacroSetting::Float(value) => write!(f, "{:?}", value),
            MacroSetting::Boolean(value) => write!(f, "{}", value),
            MacroSetting::Text(value) => f.write_str(value),
        }
    }
}

impl Default for MacroSetting {
    fn default() -> Self {
        MacroSetting::Text(String::new())
    }
}

/// `[[macros]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroEntry {
    pub name: String,

    #[serde(default)]
    pub value: MacroSetting,

    #[serde(default)]
    pub location: Location,
}

/// `[[sources]]` entry; exactly one of `file`, `string` and `resource` is set
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    #[serde(default)]
    pub location: Location,
}

impl SourceEntry {
    /// Content and kind of this entry
    fn block(&self) -> Result<(&str, SourceKind), String> {
        match (&self.file, &self.string, &self.resource) {
            (Some(file), None, None) => Ok((file.as_str(), SourceKind::File)),
            (None, Some(string), None) => Ok((string.as_str(), SourceKind::String)),
            (None, None, Some(resource)) => Ok((resource.as_str(), SourceKind::Resource)),
            (None, None, None) => {
                Err("source entry needs one of file, string or resource".to_string())
            }
            _ => Err("source entry sets more than one of file, string and resource".to_string()),
        }
    }
}

/// Description of one shader
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShaderManifest {
    /// GLSL version; the config default is used when unset, `""` omits `#version`
    #[serde(default)]
    pub version: Option<String>,

    /// Set to false to drop the built-in prelude
    #[serde(default)]
    pub pre_added_source: Option<bool>,

    /// Library manifests, relative to this manifest's directory
    #[serde(default)]
    pub libraries: Vec<PathBuf>,

    #[serde(default)]
    pub extensions: BTreeMap<String, ExtensionSetting>,

    #[serde(default)]
    pub macros: Vec<MacroEntry>,

    /// Macro names to `#undef` after all macros
    #[serde(default)]
    pub undefs: Vec<String>,

    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

impl ShaderManifest {
    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Build the shader described by the manifest at `path`, including its
    /// libraries, with `general` supplying the version and prelude defaults
    pub fn build(path: &Path, general: &GeneralConfig) -> Result<ShaderSource, ConfigError> {
        Self::build_tracked(path, general).map(|(shader, _)| shader)
    }

    /// Like [`build`](Self::build), also returning the canonical directory of
    /// every manifest visited, the top-level one first
    ///
    /// Library manifests may live outside the top-level manifest's directory;
    /// these are the directories a hot-reload watcher has to cover.
    pub fn build_tracked(
        path: &Path,
        general: &GeneralConfig,
    ) -> Result<(ShaderSource, Vec<PathBuf>), ConfigError> {
        let mut tree = ManifestTree::default();
        let shader = tree.build(path, Some(general))?;
        log::info!(
            "Built shader from {:?}: {} macro(s), {} source block(s)",
            path,
            shader.macros().len(),
            shader.sources().len()
        );
        Ok((shader, tree.dirs))
    }

    /// Apply this manifest's own fragments to `shader`
    ///
    /// `base_dir` anchors relative file sources; `defaults` is only given for
    /// the top-level manifest.
    pub fn apply(
        &self,
        shader: &mut ShaderSource,
        base_dir: &Path,
        defaults: Option<&GeneralConfig>,
    ) -> Result<(), String> {
        match (&self.version, defaults) {
            (Some(version), _) => {
                shader.specify_version(version);
            }
            (None, Some(general)) => {
                shader.specify_version(&general.default_version);
            }
            (None, None) => {}
        }

        let pre_added = self
            .pre_added_source
            .or_else(|| defaults.map(|general| general.pre_added_source));
        if pre_added == Some(false) {
            shader.disable_pre_added_source();
        }

        for (name, setting) in &self.extensions {
            shader.specify_extension(name, (*setting).into());
        }

        for entry in &self.macros {
            shader.add_macro(&entry.name, entry.value.to_string(), entry.location.into());
        }

        for name in &self.undefs {
            shader.remove_macro(name);
        }

        for entry in &self.sources {
            let (content, kind) = entry.block()?;
            let content = match kind {
                SourceKind::File => anchor_file(content, base_dir),
                _ => content.to_string(),
            };
            shader.add_source(content, kind, entry.location.into());
        }

        Ok(())
    }
}

/// Relative file sources next to the manifest win over include directories
fn anchor_file(file: &str, base_dir: &Path) -> String {
    let path = Path::new(file);
    if path.is_absolute() {
        return file.to_string();
    }
    let anchored = base_dir.join(path);
    if anchored.is_file() {
        anchored.to_string_lossy().into_owned()
    } else {
        file.to_string()
    }
}

/// Walk state of one manifest build
#[derive(Default)]
struct ManifestTree {
    /// Manifests currently being built, for cycle detection
    stack: Vec<PathBuf>,
    /// Directories of every manifest visited, deduplicated
    dirs: Vec<PathBuf>,
}

impl ManifestTree {
    fn build(
        &mut self,
        path: &Path,
        defaults: Option<&GeneralConfig>,
    ) -> Result<ShaderSource, ConfigError> {
        let canonical = path
            .canonicalize()
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        if self.stack.contains(&canonical) {
            let chain: Vec<String> = self
                .stack
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect();
            return Err(ConfigError::ManifestError(
                path.to_path_buf(),
                format!("library cycle: {}", chain.join(" -> ")),
            ));
        }

        let manifest = ShaderManifest::load(path)?;
        let base_dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        if !self.dirs.contains(&base_dir) {
            self.dirs.push(base_dir.clone());
        }
        self.stack.push(canonical);

        let mut shader = ShaderSource::new();
        for library in &manifest.libraries {
            let library_path = base_dir.join(library);
            log::debug!("Merging library {:?}", library_path);
            let library_shader = self.build(&library_path, None)?;
            shader.add_source_from(&library_shader);
            shader.specify_extensions(&library_shader);
        }

        manifest
            .apply(&mut shader, &base_dir, defaults)
            .map_err(|msg| ConfigError::ManifestError(path.to_path_buf(), msg))?;

        self.stack.pop();
        Ok(shader)
    }
}
