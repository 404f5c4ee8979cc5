//! Output formats for a finished fact document.

use std::fs;
use std::path::Path;

use minijinja::Environment;
use serde_json::Value;

use crate::error::RenderError;

/// Encodes the document as indented JSON.
pub fn to_json_pretty(doc: &Value) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Renders a template with the document's namespaces as top-level variables.
///
/// `{{ System.Hostname }}` resolves to the host name.
pub fn render_template(source: &str, doc: &Value) -> Result<String, RenderError> {
    let env = Environment::new();
    Ok(env.render_str(source, doc)?)
}

/// Reads a template from `path` and renders it like [`render_template`].
pub fn render_template_file(path: &Path, doc: &Value) -> Result<String, RenderError> {
    let source = fs::read_to_string(path).map_err(|source| RenderError::TemplateFile {
        path: path.to_path_buf(),
        source,
    })?;
    render_template(&source, doc)
}
