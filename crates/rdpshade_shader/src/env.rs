//! Shader Template Environment
//!
//! All GLSL lives in `src/shaders/` as minijinja templates and is embedded
//! into the binary. rust-embed reads the folder from disk in debug builds, so
//! template edits do not need a rebuild.
//!
//! | Syntax          | Meaning                         |
//! |-----------------|---------------------------------|
//! | `{{ expr }}`    | value substitution              |
//! | `{$ ... $}`     | block tag (`include`, `for`, …) |
//! | `$$ ...`        | line statement                  |
//!
//! Templates are addressed as `<namespace>/<stem>`:
//!
//! | Namespace   | Holds                                   |
//! |-------------|-----------------------------------------|
//! | `fragment/` | library fragments of the main program   |
//! | `vertex/`   | main-program vertex shapes              |
//! | `utility/`  | utility program stages                  |
//! | `chunks/`   | shared snippets, only reachable by `include` |
//!
//! A bare `{$ include "name.glsl" $}` resolves against `chunks/`.

use std::sync::OnceLock;

use minijinja::{Environment, Error, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::errors::{AssemblyError, Result};

static SHADER_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/shaders"]
struct ShaderAssets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Chunks,
    Fragment,
    Vertex,
    Utility,
}

impl Namespace {
    fn parse(dir: &str) -> Option<Self> {
        match dir {
            "chunks" => Some(Self::Chunks),
            "fragment" => Some(Self::Fragment),
            "vertex" => Some(Self::Vertex),
            "utility" => Some(Self::Utility),
            _ => None,
        }
    }

    fn dir(self) -> &'static str {
        match self {
            Self::Chunks => "chunks",
            Self::Fragment => "fragment",
            Self::Vertex => "vertex",
            Self::Utility => "utility",
        }
    }
}

/// Maps a template name to its embedded file, or `None` when the name is
/// outside every namespace.
fn asset_path(name: &str) -> Option<String> {
    let (dir, stem) = name.split_once('/')?;
    let namespace = Namespace::parse(dir)?;
    let stem = stem.strip_suffix(".glsl").unwrap_or(stem);
    if stem.is_empty() || stem.contains('/') {
        return None;
    }
    Some(format!("{}/{stem}.glsl", namespace.dir()))
}

/// Bare include names are chunks; qualified names pass through.
fn join_include(name: &str, _parent: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{name}", Namespace::Chunks.dir())
    }
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let Some(path) = asset_path(name) else {
        return Ok(None);
    };
    Ok(ShaderAssets::get(&path)
        .and_then(|file| String::from_utf8(file.data.into_owned()).ok()))
}

pub fn get_env() -> &'static Environment<'static> {
    SHADER_ENV.get_or_init(|| {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
            .expect("Failed to configure shader template syntax");

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);

        env.set_loader(shader_loader);
        env.set_path_join_callback(|name, parent| join_include(name, parent).into());

        env
    })
}

/// Renders a single template with `ctx`.
pub fn render<S: Serialize>(template_name: &str, ctx: &S) -> Result<String> {
    let env = get_env();
    let template = env
        .get_template(template_name)
        .map_err(|e| AssemblyError::from_template(template_name, &e))?;
    template
        .render(ctx)
        .map_err(|e| AssemblyError::from_template(template_name, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_is_reported() {
        let err = render("fragment/does_not_exist", &()).unwrap_err();
        assert!(matches!(err, AssemblyError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_include_resolves_against_chunks() {
        let source = render("fragment/header", &()).unwrap();
        assert!(source.starts_with("#version 100\n"));
        assert!(source.contains("precision mediump float;"));
    }

    #[test]
    fn test_asset_path_namespaces() {
        assert_eq!(asset_path("fragment/main").as_deref(), Some("fragment/main.glsl"));
        assert_eq!(asset_path("chunks/version.glsl").as_deref(), Some("chunks/version.glsl"));
        assert_eq!(asset_path("shaders/main"), None);
        assert_eq!(asset_path("main"), None);
        assert_eq!(asset_path("fragment/"), None);
        assert_eq!(asset_path("fragment/../chunks/version"), None);
    }

    #[test]
    fn test_unknown_namespace_is_not_found() {
        let err = render("mesh/main", &()).unwrap_err();
        assert!(matches!(err, AssemblyError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_include_join() {
        assert_eq!(join_include("version.glsl", "fragment/header"), "chunks/version.glsl");
        assert_eq!(join_include("fragment/noise", "fragment/main"), "fragment/noise");
    }
}
