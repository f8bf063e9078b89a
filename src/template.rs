//! Template environment and render context construction.
//!
//! Templates are resolved by name from the project's `templates/` directory
//! through a minijinja environment. Every template can call the global
//! `rel_path(path, resource_type)` to link static or style assets relative
//! to the current page's nesting depth.

use crate::error::SiteError;
use crate::markdown::FrontMatter;
use anyhow::{Context, Result};
use minijinja::{AutoEscape, Environment, ErrorKind, State, Template, path_loader};
use serde_json::{Map, Value};
use std::path::Path;

/// Build the template environment rooted at the templates directory.
///
/// Auto-escaping is off: `content` is already rendered HTML and templates
/// bind it directly, so the default escaping for `*.html` template names
/// would double-encode every page body.
pub fn make_env(templates: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(templates));
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_function("rel_path", rel_path);
    env
}

/// Template global: prefix `file_path` with one `../` per nesting level of
/// the page being rendered, so asset links work at any depth.
///
/// `resource_type` must be `static` or `style`.
fn rel_path(
    state: &State,
    file_path: String,
    resource_type: String,
) -> Result<String, minijinja::Error> {
    if resource_type != "static" && resource_type != "style" {
        return Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            "resource_type must be either static or style",
        ));
    }

    let context = state
        .lookup("section")
        .or_else(|| state.lookup("page"));
    let depth = context
        .and_then(|ctx| ctx.get_attr("depth").ok())
        .and_then(|value| usize::try_from(value).ok())
        .unwrap_or(0);

    Ok(format!("{}{file_path}", "../".repeat(depth)))
}

/// Resolve the template named by the frontmatter's `template` key.
pub fn get_template<'env>(
    env: &'env Environment<'static>,
    matter: &FrontMatter,
) -> Result<Template<'env, 'env>> {
    let name = matter.template().unwrap_or_default();
    env.get_template(name).map_err(|_| {
        SiteError::TemplateNotFound {
            name: name.to_string(),
        }
        .into()
    })
}

/// Build the mapping bound into a template for one output file.
///
/// The reserved keys `content`, `depth`, `url` and `pages` are inserted
/// first, then the frontmatter is merged on top: on collision the
/// frontmatter value wins.
pub fn build_context(
    matter: &FrontMatter,
    content: &str,
    depth: usize,
    url: &str,
    pages: Option<Vec<Value>>,
) -> Result<Value> {
    let mut map = Map::new();
    map.insert("content".to_string(), Value::String(content.to_string()));
    map.insert("depth".to_string(), Value::from(depth));
    map.insert("url".to_string(), Value::String(url.to_string()));
    if let Some(pages) = pages {
        map.insert("pages".to_string(), Value::Array(pages));
    }

    for (key, value) in matter.iter() {
        // Non-string keys cannot be template identifiers
        let Some(key) = key.as_str() else { continue };
        let value = serde_json::to_value(value)
            .with_context(|| format!("Unserializable frontmatter value for `{key}`"))?;
        map.insert(key.to_string(), value);
    }

    Ok(Value::Object(map))
}
