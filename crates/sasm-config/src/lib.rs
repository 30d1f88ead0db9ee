//! SASM Configuration Management
//!
//! Handles loading and managing configuration from ~/.sasm/config.toml,
//! shader manifests describing one program each, and hot-reload watching.

pub mod manifest;
pub mod watcher;

pub use manifest::{
    ExtensionSetting, Location, MacroEntry, MacroSetting, ShaderManifest, SourceEntry,
};
pub use watcher::{ManifestEvent, ManifestWatcher};

use sasm_source::{FileSystemResolver, ResourceTable, Resolver};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration directory name
const CONFIG_DIR_NAME: &str = ".sasm";
/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable overriding the configuration directory
const CONFIG_DIR_ENV: &str = "SASM_CONFIG_DIR";

/// General configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// GLSL version used when a manifest does not set one
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Emit the built-in prelude unless a manifest disables it
    #[serde(default = "default_pre_added_source")]
    pub pre_added_source: bool,
}

fn default_version() -> String {
    "330".to_string()
}

fn default_pre_added_source() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_version: default_version(),
            pre_added_source: default_pre_added_source(),
        }
    }
}

/// Search path configuration section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Directories searched, in order, for relative shader file names
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Directories whose *.glsl files are registered as resources
    #[serde(default)]
    pub resource_dirs: Vec<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Search paths
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            log::info!("Config file not found, creating default at {:?}", config_path);
            Self::create_default_config()?;
        }

        let config = Self::load_from(&config_path)?;
        log::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        Ok(config)
    }

    /// Get the configuration directory path ($SASM_CONFIG_DIR or ~/.sasm/)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file path (~/.sasm/config.toml)
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Create the default configuration file and directory
    pub fn create_default_config() -> Result<(), ConfigError> {
        let config_dir = Self::config_dir()?;
        let config_path = Self::config_file_path()?;

        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::CreateDirError(config_dir.clone(), e))?;

        let default_config = Config::default();
        let toml_content = toml::to_string_pretty(&default_config)
            .map_err(ConfigError::SerializeError)?;

        let content = format!(
            "# SASM Shader Assembler Configuration\n\
             #\n\
             # include_dirs are searched in order for relative shader file names.\n\
             # Every *.glsl file in resource_dirs can be added as a resource by file name.\n\
             \n\
             {toml_content}"
        );

        fs::write(&config_path, content)
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e))?;

        log::info!("Created default configuration at {:?}", config_path);
        Ok(())
    }

    /// Build the resolver for assembling shaders: include directories for
    /// files, bundled sources plus resource directories for resources
    ///
    /// Missing resource directories are skipped with a warning.
    pub fn resolver(&self) -> Result<Resolver, ConfigError> {
        let files = FileSystemResolver::with_include_dirs(self.paths.include_dirs.iter().cloned());
        let mut resources = ResourceTable::with_builtins();

        for dir in &self.paths.resource_dirs {
            if !dir.is_dir() {
                log::warn!("Resource directory {:?} does not exist, skipping", dir);
                continue;
            }
            let count = resources
                .load_dir(dir)
                .map_err(|e| ConfigError::ReadError(dir.clone(), e))?;
            log::info!("Registered {} resource(s) from {:?}", count, dir);
        }

        Ok(Resolver::new(files, resources))
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Home directory not found
    NoHomeDirectory,
    /// Failed to read config, manifest or resource file
    ReadError(PathBuf, std::io::Error),
    /// Failed to parse config or manifest file
    ParseError(PathBuf, toml::de::Error),
    /// Failed to serialize config
    SerializeError(toml::ser::Error),
    /// Failed to write config file
    WriteError(PathBuf, std::io::Error),
    /// Failed to create directory
    CreateDirError(PathBuf, std::io::Error),
    /// Failed to set up file watcher
    WatchError(String),
    /// Manifest is well-formed TOML but describes an invalid shader
    ManifestError(PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoHomeDirectory => write!(f, "Could not determine home directory"),
            ConfigError::ReadError(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            ConfigError::ParseError(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::WriteError(path, e) => write!(f, "Failed to write {:?}: {}", path, e),
            ConfigError::CreateDirError(path, e) => write!(f, "Failed to create {:?}: {}", path, e),
            ConfigError::WatchError(e) => write!(f, "Failed to watch files: {}", e),
            ConfigError::ManifestError(path, msg) => {
                write!(f, "Invalid manifest {:?}: {}", path, msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e)
            | ConfigError::WriteError(_, e)
            | ConfigError::CreateDirError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
            ConfigError::SerializeError(e) => Some(e),
            _ => None,
        }
    }
}
