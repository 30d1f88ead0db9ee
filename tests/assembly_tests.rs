//! Shader source assembly functional tests
//!
//! Exercises ordering, caching and merge behavior of `ShaderSource`
//! against in-memory resolvers. These tests run headlessly and are fast.

mod common;

use common::{assemble, assert_before, bare_source, lines};
use sasm_glyph::{GlyphRender, GlyphType};
use sasm_source::prelude::PRE_ADDED_SOURCE;
use sasm_source::{
    AddLocation, ExtensionMode, MacroOp, ShaderSource, ShaderSourceError, SourceKind,
    StringResolver,
};

// === Assembly determinism ===

#[test]
fn test_idempotent_assembly() {
    let resolver = StringResolver::new()
        .with_file("main.frag", "void main() {}")
        .with_resource("lib", "float lib();");
    let mut source = ShaderSource::new();
    source
        .specify_version("330")
        .specify_extension("GL_ARB_texture_rectangle", ExtensionMode::Enable)
        .add_macro("N", 8u32, AddLocation::PushBack)
        .add_source("lib", SourceKind::Resource, AddLocation::PushBack)
        .add_source("main.frag", SourceKind::File, AddLocation::PushBack);

    let first = source.assembled_code(&resolver).unwrap().to_string();
    let second = source.assembled_code(&resolver).unwrap().to_string();
    assert_eq!(first, second);
    assert_eq!(source.assemble(&resolver).unwrap(), first);
}

// === Ordering ===

#[test]
fn test_push_back_order() {
    let mut source = bare_source();
    for block in ["// A", "// B", "// C"] {
        source.add_source(block, SourceKind::String, AddLocation::PushBack);
    }
    let code = assemble(&source);
    assert_before(&code, "// A", "// B");
    assert_before(&code, "// B", "// C");
}

#[test]
fn test_push_front_most_recent_first() {
    let mut source = bare_source();
    source
        .add_source("// A", SourceKind::String, AddLocation::PushFront)
        .add_source("// B", SourceKind::String, AddLocation::PushFront);
    let code = assemble(&source);
    assert_before(&code, "// B", "// A");
}

#[test]
fn test_section_order() {
    let mut source = ShaderSource::new();
    source
        .add_source("void main() {}", SourceKind::String, AddLocation::PushBack)
        .add_macro("M", "1", AddLocation::PushBack)
        .specify_extension("GL_EXT_x", ExtensionMode::Require)
        .specify_version("450 core");

    let code = assemble(&source);
    assert!(code.starts_with("#version 450 core\n"));
    assert_before(&code, "#version", "sasm_mask");
    assert_before(&code, "sasm_do_nothing", "#extension GL_EXT_x: require");
    assert_before(&code, "#extension GL_EXT_x", "#define M 1");
    assert_before(&code, "#define M 1", "void main() {}");
}

// === Extensions ===

#[test]
fn test_extension_idempotent_upsert() {
    let mut source = bare_source();
    source
        .specify_extension("GL_FOO", ExtensionMode::Require)
        .specify_extension("GL_FOO", ExtensionMode::Warn);
    let code = assemble(&source);
    assert_eq!(code.matches("GL_FOO").count(), 1);
    assert_eq!(lines(&code), vec!["#extension GL_FOO: warn"]);
}

#[test]
fn test_extension_order_is_first_specification() {
    let mut source = bare_source();
    for name in ["GL_C", "GL_A", "GL_B"] {
        source.specify_extension(name, ExtensionMode::Enable);
    }
    source.specify_extension("GL_C", ExtensionMode::Disable);
    assert_eq!(
        lines(&assemble(&source)),
        vec!["#extension GL_C: disable", "#extension GL_A: enable", "#extension GL_B: enable"]
    );
}

// === Macros ===

#[test]
fn test_macro_round_trip() {
    let mut source = bare_source();
    source
        .add_macro("X", 5, AddLocation::PushBack)
        .add_macro("Y", "", AddLocation::PushBack);
    let code = assemble(&source);
    let code_lines = lines(&code);
    assert!(code_lines.contains(&"#define X 5"));
    assert!(code_lines.contains(&"#define Y"));
    assert!(!code.contains("#define Y "));
}

#[test]
fn test_remove_macro_emits_undef_at_back() {
    let mut source = bare_source();
    source
        .add_macro("A", 1, AddLocation::PushBack)
        .remove_macro("A")
        .add_macro("A", 2, AddLocation::PushFront);
    assert_eq!(lines(&assemble(&source)), vec!["#define A 2", "#define A 1", "#undef A"]);
}

// === Version and prelude ===

#[test]
fn test_version_omission() {
    let mut source = ShaderSource::from_string("void main() {}");
    assert!(!assemble(&source).contains("#version"));

    source.specify_version("");
    assert!(!assemble(&source).contains("#version"));
}

#[test]
fn test_prelude_present_once() {
    let mut source = ShaderSource::new();
    for i in 0..5 {
        source.add_source(format!("// block {}", i), SourceKind::String, AddLocation::PushBack);
    }
    let code = assemble(&source);
    assert_eq!(code.matches(PRE_ADDED_SOURCE).count(), 1);
    assert_eq!(code.matches("void sasm_do_nothing").count(), 1);
}

#[test]
fn test_prelude_toggle() {
    let mut source = ShaderSource::from_string("void main() {}");
    source.disable_pre_added_source().disable_pre_added_source();
    let code = assemble(&source);
    assert!(!code.contains("sasm_mask"));
    assert!(!code.contains("SASM_EXTRACT_BITS"));
    assert_eq!(code, "void main() {}\n");
}

// === Merging ===

#[test]
fn test_merge_semantics() {
    let mut p = bare_source();
    p.add_macro("M1", 1, AddLocation::PushBack);
    let mut q = ShaderSource::new();
    q.add_macro("M2", 2, AddLocation::PushBack)
        .specify_version("450")
        .specify_extension("GL_Q", ExtensionMode::Require);
    let q_before = q.clone();

    p.add_source_from(&q);

    let merged: Vec<MacroOp> = p.macros().cloned().collect();
    assert_eq!(
        merged,
        vec![
            MacroOp::Define { name: "M1".to_string(), value: "1".to_string() },
            MacroOp::Define { name: "M2".to_string(), value: "2".to_string() },
        ]
    );
    assert_eq!(assemble(&q), assemble(&q_before));
    assert_eq!(p.version(), "");
    assert!(p.extension("GL_Q").is_none());

    p.specify_extensions(&q);
    assert_eq!(p.extension("GL_Q"), Some(ExtensionMode::Require));
}

#[test]
fn test_library_composition() {
    let mut library = bare_source();
    library
        .add_macro("LIB_VERSION", 2, AddLocation::PushBack)
        .add_source("float lib_fn() { return 1.0; }", SourceKind::String, AddLocation::PushBack);

    let mut shader = bare_source();
    shader.specify_version("330").add_source_from(&library).add_source(
        "void main() { lib_fn(); }",
        SourceKind::String,
        AddLocation::PushBack,
    );

    assert_eq!(
        assemble(&shader),
        "#version 330\n\
         #define LIB_VERSION 2\n\
         float lib_fn() { return 1.0; }\n\
         void main() { lib_fn(); }\n"
    );
}

// === Failures ===

#[test]
fn test_missing_file_is_assembly_error() {
    let mut source = bare_source();
    // Adding never fails, even for files that do not exist
    source.add_source("does/not/exist.frag", SourceKind::File, AddLocation::PushBack);

    let err = source.assembled_code(&StringResolver::new()).unwrap_err();
    assert!(matches!(err, ShaderSourceError::UnresolvedFile { .. }));
    assert_eq!(err.reference(), "does/not/exist.frag");
}

#[test]
fn test_retry_after_fixing_resource() {
    let mut source = bare_source();
    source.add_source("late", SourceKind::Resource, AddLocation::PushBack);

    let err = source.assembled_code(&StringResolver::new()).unwrap_err();
    assert!(matches!(err, ShaderSourceError::UnresolvedResource { .. }));

    let fixed = StringResolver::new().with_resource("late", "// now here");
    assert_eq!(source.assembled_code(&fixed).unwrap(), "// now here\n");
}

// === Value semantics ===

#[test]
fn test_copies_are_independent() {
    let mut a = bare_source();
    a.add_source("shared", SourceKind::String, AddLocation::PushBack);
    let mut b = a.clone();
    b.add_source("only b", SourceKind::String, AddLocation::PushBack);

    assert_eq!(assemble(&a), "shared\n");
    assert_eq!(assemble(&b), "shared\nonly b\n");

    std::mem::swap(&mut a, &mut b);
    assert_eq!(assemble(&a), "shared\nonly b\n");
}

#[test]
fn test_shader_source_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShaderSource>();
}

// === Glyph descriptors ===

#[test]
fn test_glyph_ordering() {
    let near = GlyphRender::scalable(GlyphType::DistanceField).unwrap();
    let far = GlyphRender::scalable(GlyphType::BandedRays).unwrap();
    assert!(near < far);
    assert!(GlyphRender::coverage(10) < GlyphRender::coverage(20));
    assert!(!GlyphRender::default().valid());
}
