//! Common test utilities and harness
//!
//! Provides reusable utilities for functional testing including:
//! - Test environment setup (temp directories with shaders and manifests)
//! - Shader assembly helpers
//! - Assertion utilities

#![allow(dead_code)]

use std::path::PathBuf;

use sasm_config::Config;
use sasm_source::{ShaderSource, StringResolver};
use tempfile::TempDir;

/// Test environment with an isolated shader directory
pub struct TestEnvironment {
    /// Temporary directory holding manifests and shaders
    pub temp_dir: TempDir,
    /// Path to the shader directory
    pub shader_dir: PathBuf,
    /// Path to the include directory
    pub include_dir: PathBuf,
    /// Path to the resource directory
    pub resource_dir: PathBuf,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let shader_dir = temp_dir.path().join("shaders");
        let include_dir = temp_dir.path().join("include");
        let resource_dir = temp_dir.path().join("resources");

        for dir in [&shader_dir, &include_dir, &resource_dir] {
            std::fs::create_dir_all(dir).expect("Failed to create test directory");
        }

        Self {
            temp_dir,
            shader_dir,
            include_dir,
            resource_dir,
        }
    }

    /// Write a file relative to the shader directory, returning its path
    pub fn write_shader(&self, name: &str, content: &str) -> PathBuf {
        let path = self.shader_dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create shader subdirectory");
        }
        std::fs::write(&path, content).expect("Failed to write test shader");
        path
    }

    /// Write a manifest to the shader directory
    pub fn write_manifest(&self, name: &str, content: &str) -> PathBuf {
        self.write_shader(name, content)
    }

    /// Write a file to the include directory
    pub fn write_include(&self, name: &str, content: &str) {
        std::fs::write(self.include_dir.join(name), content).expect("Failed to write test include");
    }

    /// Write a resource to the resource directory
    pub fn write_resource(&self, name: &str, content: &str) {
        std::fs::write(self.resource_dir.join(name), content)
            .expect("Failed to write test resource");
    }

    /// Config searching the include and resource directories, prelude off
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.general.pre_added_source = false;
        config.paths.include_dirs = vec![self.include_dir.clone()];
        config.paths.resource_dirs = vec![self.resource_dir.clone()];
        config
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Shader source with the prelude disabled
pub fn bare_source() -> ShaderSource {
    let mut source = ShaderSource::new();
    source.disable_pre_added_source();
    source
}

/// Assemble with an empty in-memory resolver
pub fn assemble(source: &ShaderSource) -> String {
    source
        .assemble(&StringResolver::new())
        .expect("Assembly should succeed")
}

/// Lines of the assembled code
pub fn lines(code: &str) -> Vec<&str> {
    code.lines().collect()
}

/// Assert `first` appears before `second` in `code`
pub fn assert_before(code: &str, first: &str, second: &str) {
    let a = code
        .find(first)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", first, code));
    let b = code
        .find(second)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", second, code));
    assert!(a < b, "Expected '{}' before '{}' in:\n{}", first, second, code);
}
