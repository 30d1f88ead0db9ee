//! Shader source assembly
//!
//! A [`ShaderSource`] collects the fragments of a GLSL program (version,
//! extensions, macros and source blocks) and serializes them into a single
//! string. Output order is fixed:
//!
//! 1. `#version` (omitted when the version is empty)
//! 2. the built-in prelude, unless disabled
//! 3. `#extension` lines, in the order the names were first specified
//! 4. `#define` / `#undef` lines, in macro sequence order
//! 5. source blocks, in source sequence order, each followed by a newline

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::error::ShaderSourceError;
use crate::prelude::PRE_ADDED_SOURCE;
use crate::resolver::SourceResolver;

/// How the content of a source block is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceKind {
    /// Content is a filename, read at assembly time
    #[default]
    File,
    /// Content is GLSL source text
    String,
    /// Content is a label in the resource table, fetched at assembly time
    Resource,
}

/// Where a source block or macro is inserted in its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddLocation {
    #[default]
    PushBack,
    PushFront,
}

/// Usage of a GLSL extension, i.e. the keyword of `#extension name: keyword`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtensionMode {
    Require,
    #[default]
    Enable,
    Warn,
    Disable,
}

impl ExtensionMode {
    /// Directive keyword for this mode
    pub fn keyword(self) -> &'static str {
        match self {
            ExtensionMode::Require => "require",
            ExtensionMode::Enable => "enable",
            ExtensionMode::Warn => "warn",
            ExtensionMode::Disable => "disable",
        }
    }
}

impl fmt::Display for ExtensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A block of source: literal text, a filename or a resource label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    content: String,
    kind: SourceKind,
}

impl SourceBlock {
    pub fn new(content: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }

    /// Literal text, filename or resource label, depending on [`kind`](Self::kind)
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Load the text of this block
    fn resolve<'a, R>(&'a self, resolver: &'a R) -> Result<Cow<'a, str>, ShaderSourceError>
    where
        R: SourceResolver + ?Sized,
    {
        match self.kind {
            SourceKind::String => Ok(Cow::Borrowed(&self.content)),
            SourceKind::File => resolver
                .read_file(&self.content)
                .map(Cow::Owned)
                .map_err(|source| ShaderSourceError::UnresolvedFile {
                    path: self.content.clone(),
                    source,
                }),
            SourceKind::Resource => resolver.fetch_resource(&self.content).ok_or_else(|| {
                ShaderSourceError::UnresolvedResource {
                    key: self.content.clone(),
                }
            }),
        }
    }
}

/// One entry of the macro sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroOp {
    /// `#define name value`, or `#define name` when the value is empty
    Define { name: String, value: String },
    /// `#undef name`
    Undef { name: String },
}

impl MacroOp {
    pub fn name(&self) -> &str {
        match self {
            MacroOp::Define { name, .. } | MacroOp::Undef { name } => name,
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            MacroOp::Define { name, value } if value.is_empty() => {
                out.push_str("#define ");
                out.push_str(name);
            }
            MacroOp::Define { name, value } => {
                out.push_str("#define ");
                out.push_str(name);
                out.push(' ');
                out.push_str(value);
            }
            MacroOp::Undef { name } => {
                out.push_str("#undef ");
                out.push_str(name);
            }
        }
        out.push('\n');
    }
}

/// Values accepted by [`ShaderSource::add_macro`]
///
/// Integers are formatted as decimal text when the macro is added.
pub trait MacroValue {
    fn into_macro_value(self) -> String;
}

impl MacroValue for &str {
    fn into_macro_value(self) -> String {
        self.to_string()
    }
}

impl MacroValue for String {
    fn into_macro_value(self) -> String {
        self
    }
}

impl MacroValue for &String {
    fn into_macro_value(self) -> String {
        self.clone()
    }
}

macro_rules! integer_macro_value {
    ($($t:ty),*) => {
        $(
            impl MacroValue for $t {
                fn into_macro_value(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_macro_value!(i32, u32, i64, u64, usize);

/// Extensions keyed by name, iterated in first-specification order
#[derive(Debug, Clone, Default)]
struct ExtensionList {
    entries: Vec<(String, ExtensionMode)>,
    index: HashMap<String, usize>,
}

impl ExtensionList {
    fn upsert(&mut self, name: &str, mode: ExtensionMode) {
        match self.index.get(name) {
            Some(&slot) => self.entries[slot].1 = mode,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), mode));
            }
        }
    }

    fn get(&self, name: &str) -> Option<ExtensionMode> {
        self.index.get(name).map(|&slot| self.entries[slot].1)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, ExtensionMode)> {
        self.entries.iter().map(|(name, mode)| (name.as_str(), *mode))
    }
}

/// Source code of a GLSL shader built from version, extension, macro and
/// source fragments
///
/// All strings are copied on insertion. File and resource blocks are only
/// read when the code is assembled, so adding a missing file succeeds and
/// the failure is reported by [`assemble`](Self::assemble) or
/// [`assembled_code`](Self::assembled_code).
#[derive(Debug, Clone)]
pub struct ShaderSource {
    version: String,
    extensions: ExtensionList,
    macros: VecDeque<MacroOp>,
    sources: VecDeque<SourceBlock>,
    pre_added_source: bool,
    /// Last assembled code; `None` when a mutation happened since
    assembled: Option<String>,
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self {
            version: String::new(),
            extensions: ExtensionList::default(),
            macros: VecDeque::new(),
            sources: VecDeque::new(),
            pre_added_source: true,
            assembled: None,
        }
    }
}

impl ShaderSource {
    /// Create an empty shader source with the prelude enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shader source holding a single literal source block
    pub fn from_string(code: impl Into<String>) -> Self {
        let mut source = Self::new();
        source.add_source(code, SourceKind::String, AddLocation::PushBack);
        source
    }

    /// Set the GLSL version of the `#version` directive
    ///
    /// An empty string removes the directive.
    #[doc(alias = "set_version")]
    pub fn specify_version(&mut self, version: &str) -> &mut Self {
        self.version.clear();
        self.version.push_str(version);
        self.invalidate()
    }

    /// Version set by [`specify_version`](Self::specify_version), empty if none
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Add a source block
    pub fn add_source(
        &mut self,
        content: impl Into<String>,
        kind: SourceKind,
        location: AddLocation,
    ) -> &mut Self {
        let block = SourceBlock::new(content, kind);
        match location {
            AddLocation::PushBack => self.sources.push_back(block),
            AddLocation::PushFront => self.sources.push_front(block),
        }
        self.invalidate()
    }

    /// Append the source blocks and macros of another shader source
    ///
    /// The version, extensions and prelude setting of `other` are ignored.
    pub fn add_source_from(&mut self, other: &ShaderSource) -> &mut Self {
        self.sources.extend(other.sources.iter().cloned());
        self.macros.extend(other.macros.iter().cloned());
        self.invalidate()
    }

    /// Add `#define name value`
    ///
    /// Redefinitions are kept; the assembler does not deduplicate.
    pub fn add_macro(
        &mut self,
        name: &str,
        value: impl MacroValue,
        location: AddLocation,
    ) -> &mut Self {
        let op = MacroOp::Define {
            name: name.to_string(),
            value: value.into_macro_value(),
        };
        match location {
            AddLocation::PushBack => self.macros.push_back(op),
            AddLocation::PushFront => self.macros.push_front(op),
        }
        self.invalidate()
    }

    /// Add `#undef name` at the back of the macro sequence
    pub fn remove_macro(&mut self, name: &str) -> &mut Self {
        self.macros.push_back(MacroOp::Undef { name: name.to_string() });
        self.invalidate()
    }

    /// Specify the usage of an extension, replacing any previous mode for it
    pub fn specify_extension(&mut self, name: &str, mode: ExtensionMode) -> &mut Self {
        self.extensions.upsert(name, mode);
        self.invalidate()
    }

    /// Copy every extension specification of `other`, overwriting modes
    /// already set here for the same names
    pub fn specify_extensions(&mut self, other: &ShaderSource) -> &mut Self {
        for (name, mode) in other.extensions.iter() {
            self.extensions.upsert(name, mode);
        }
        self.invalidate()
    }

    /// Do not emit the built-in prelude
    pub fn disable_pre_added_source(&mut self) -> &mut Self {
        self.pre_added_source = false;
        self.invalidate()
    }

    pub fn pre_added_source_enabled(&self) -> bool {
        self.pre_added_source
    }

    pub fn sources(&self) -> impl ExactSizeIterator<Item = &SourceBlock> {
        self.sources.iter()
    }

    pub fn macros(&self) -> impl ExactSizeIterator<Item = &MacroOp> {
        self.macros.iter()
    }

    /// Extension specifications in first-specification order
    pub fn extensions(&self) -> impl Iterator<Item = (&str, ExtensionMode)> {
        self.extensions.iter()
    }

    pub fn extension(&self, name: &str) -> Option<ExtensionMode> {
        self.extensions.get(name)
    }

    /// True when no version, extension, macro or source block was added
    pub fn is_empty(&self) -> bool {
        self.version.is_empty()
            && self.extensions.entries.is_empty()
            && self.macros.is_empty()
            && self.sources.is_empty()
    }

    /// Exchange contents with another shader source
    pub fn swap(&mut self, other: &mut ShaderSource) {
        std::mem::swap(self, other);
    }

    /// Assemble the code without touching the cache
    ///
    /// Every file and resource block is resolved on each call. Stops at the
    /// first block that cannot be resolved.
    pub fn assemble<R>(&self, resolver: &R) -> Result<String, ShaderSourceError>
    where
        R: SourceResolver + ?Sized,
    {
        let mut out = String::new();

        if !self.version.is_empty() {
            out.push_str("#version ");
            out.push_str(&self.version);
            out.push('\n');
        }

        if self.pre_added_source {
            out.push_str(PRE_ADDED_SOURCE);
        }

        for (name, mode) in self.extensions.iter() {
            out.push_str("#extension ");
            out.push_str(name);
            out.push_str(": ");
            out.push_str(mode.keyword());
            out.push('\n');
        }

        for op in &self.macros {
            op.write_to(&mut out);
        }

        for block in &self.sources {
            let text = block.resolve(resolver)?;
            out.push_str(&text);
            out.push('\n');
        }

        log::debug!(
            "Assembled shader: {} bytes, {} macro(s), {} source block(s)",
            out.len(),
            self.macros.len(),
            self.sources.len()
        );
        Ok(out)
    }

    /// Assembled code, assembling only if something changed since the last call
    ///
    /// The returned text borrows `self`, so it stays valid until the next
    /// mutation. On error the cache is left empty and nothing is returned.
    pub fn assembled_code<R>(&mut self, resolver: &R) -> Result<&str, ShaderSourceError>
    where
        R: SourceResolver + ?Sized,
    {
        let code = match self.assembled.take() {
            Some(code) => code,
            None => self.assemble(resolver)?,
        };
        Ok(self.assembled.insert(code).as_str())
    }

    /// Code cached by the last [`assembled_code`](Self::assembled_code) call,
    /// if no mutation happened since
    pub fn cached_code(&self) -> Option<&str> {
        self.assembled.as_deref()
    }

    fn invalidate(&mut self) -> &mut Self {
        self.assembled = None;
        self
    }
}
