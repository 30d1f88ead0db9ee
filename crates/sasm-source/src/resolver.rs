//! Resolution of file and resource source blocks
//!
//! A [`ShaderSource`](crate::ShaderSource) never touches the filesystem or the
//! resource table when blocks are added. Blocks are resolved through a
//! [`SourceResolver`] only when the program is assembled.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::builtin;

/// Loads the text behind file and resource source blocks
pub trait SourceResolver {
    /// Read the full text of the file at `path`
    fn read_file(&self, path: &str) -> io::Result<String>;

    /// Fetch the text registered under the resource label `key`
    fn fetch_resource(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<T: SourceResolver + ?Sized> SourceResolver for &T {
    fn read_file(&self, path: &str) -> io::Result<String> {
        (**self).read_file(path)
    }

    fn fetch_resource(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).fetch_resource(key)
    }
}

/// Reads shader files from disk, searching include directories in order
#[derive(Debug, Clone, Default)]
pub struct FileSystemResolver {
    include_dirs: Vec<PathBuf>,
}

impl FileSystemResolver {
    /// Create a resolver that reads relative paths from the current directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with a list of include directories
    pub fn with_include_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            include_dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Append an include directory (searched after the existing ones)
    pub fn add_include_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    /// Find the file a relative or absolute path refers to
    ///
    /// Absolute paths are returned as-is. Relative paths are tried against
    /// each include directory, then against the current directory.
    pub fn locate(&self, path: &str) -> Option<PathBuf> {
        let path = Path::new(path);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }

        self.include_dirs
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
            .or_else(|| path.is_file().then(|| path.to_path_buf()))
    }
}

impl SourceResolver for FileSystemResolver {
    fn read_file(&self, path: &str) -> io::Result<String> {
        match self.locate(path) {
            Some(found) => {
                log::debug!("Reading shader file {:?}", found);
                fs::read_to_string(found)
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found in {} include dir(s)", path, self.include_dirs.len()),
            )),
        }
    }

    fn fetch_resource(&self, _key: &str) -> Option<Cow<'_, str>> {
        None
    }
}

/// Label to GLSL text registry
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    entries: HashMap<String, Cow<'static, str>>,
}

impl ResourceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding every bundled source
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for source in builtin::ALL_SOURCES {
            table.insert(source.label, source.glsl);
        }
        table
    }

    /// Register text under a label, replacing any previous entry
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        text: impl Into<Cow<'static, str>>,
    ) -> &mut Self {
        self.entries.insert(label.into(), text.into());
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(|text| text.as_ref())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// All registered labels, sorted
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register every `*.glsl` file of a directory under its file name
    ///
    /// Returns the number of resources registered.
    pub fn load_dir(&mut self, dir: &Path) -> io::Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().map(|e| e != "glsl").unwrap_or(true) {
                continue;
            }
            let Some(label) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let text = fs::read_to_string(&path)?;
            log::debug!("Registered resource {} from {:?}", label, path);
            self.insert(label, text);
            count += 1;
        }
        Ok(count)
    }
}

impl SourceResolver for ResourceTable {
    fn read_file(&self, path: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("resource table cannot read file {}", path),
        ))
    }

    fn fetch_resource(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(Cow::Borrowed)
    }
}

/// Filesystem plus resource table, the resolver used by the command line tool
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    pub files: FileSystemResolver,
    pub resources: ResourceTable,
}

impl Resolver {
    pub fn new(files: FileSystemResolver, resources: ResourceTable) -> Self {
        Self { files, resources }
    }

    /// Current-directory file access plus the bundled resources
    pub fn with_builtins() -> Self {
        Self::new(FileSystemResolver::new(), ResourceTable::with_builtins())
    }
}

impl SourceResolver for Resolver {
    fn read_file(&self, path: &str) -> io::Result<String> {
        self.files.read_file(path)
    }

    fn fetch_resource(&self, key: &str) -> Option<Cow<'_, str>> {
        self.resources.fetch_resource(key)
    }
}

/// In-memory resolver over pre-resolved file and resource text
///
/// Useful for embedders that must not block during assembly, and for tests.
#[derive(Debug, Clone, Default)]
pub struct StringResolver {
    files: HashMap<String, String>,
    resources: HashMap<String, String>,
}

impl StringResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into());
        self
    }

    pub fn with_resource(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.resources.insert(key.into(), text.into());
        self
    }
}

impl SourceResolver for StringResolver {
    fn read_file(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn fetch_resource(&self, key: &str) -> Option<Cow<'_, str>> {
        self.resources.get(key).map(|text| Cow::Borrowed(text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resource_table_builtins() {
        let table = ResourceTable::with_builtins();
        assert_eq!(table.len(), builtin::ALL_SOURCES.len());
        assert!(table.contains("sasm/color.glsl"));
        assert!(table.get("sasm/math.glsl").unwrap().contains("SASM_PI"));
        assert!(table.fetch_resource("nope").is_none());
    }

    #[test]
    fn test_resource_table_insert_replaces() {
        let mut table = ResourceTable::new();
        assert!(table.is_empty());
        table.insert("a", "first").insert("a", String::from("second"));
        assert_eq!(table.get("a"), Some("second"));
        assert_eq!(table.labels(), vec!["a"]);
    }

    #[test]
    fn test_resource_table_load_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("noise.glsl"), "float noise(vec2 p);").unwrap();
        fs::write(dir.path().join("readme.txt"), "not a shader").unwrap();

        let mut table = ResourceTable::new();
        let count = table.load_dir(dir.path()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(table.get("noise.glsl"), Some("float noise(vec2 p);"));
        assert!(!table.contains("readme.txt"));
    }

    #[test]
    fn test_file_resolver_include_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("shared.glsl"), "// first").unwrap();
        fs::write(second.path().join("shared.glsl"), "// second").unwrap();
        fs::write(second.path().join("only_second.glsl"), "// only second").unwrap();

        let resolver = FileSystemResolver::with_include_dirs([first.path(), second.path()]);
        assert_eq!(resolver.read_file("shared.glsl").unwrap(), "// first");
        assert_eq!(resolver.read_file("only_second.glsl").unwrap(), "// only second");

        let absolute = second.path().join("shared.glsl");
        assert_eq!(resolver.read_file(absolute.to_str().unwrap()).unwrap(), "// second");

        let err = resolver.read_file("missing.glsl").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_string_resolver() {
        let resolver = StringResolver::new()
            .with_file("a.frag", "void main() {}")
            .with_resource("lib", "float f();");
        assert_eq!(resolver.read_file("a.frag").unwrap(), "void main() {}");
        assert!(resolver.read_file("b.frag").is_err());
        assert_eq!(resolver.fetch_resource("lib").as_deref(), Some("float f();"));
        assert!(resolver.fetch_resource("other").is_none());
    }

    #[test]
    fn test_combined_resolver_dispatch() {
        let resolver = Resolver::with_builtins();
        assert!(resolver.fetch_resource("sasm/fullscreen.glsl").is_some());
        assert!(resolver.read_file("definitely/not/here.glsl").is_err());
    }
}
