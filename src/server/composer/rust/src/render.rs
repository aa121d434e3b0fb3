/* src/server/composer/rust/src/render.rs */

use crate::errors::ComposeError;
use crate::helpers::{escape_html, stringify};
use crate::template::{DocumentHtml, HtmlTemplate, TemplateVar};

/// Render a document root into its final HTML string.
pub fn render(document: &DocumentHtml) -> Result<String, ComposeError> {
  match document {
    DocumentHtml::Escaped(escaped) => Ok(escaped.as_str().to_string()),
    DocumentHtml::Template(template) => render_template(template),
  }
}

/// Render a template: escaped values verbatim, nested templates recursively,
/// everything else stringified and HTML-escaped.
pub fn render_template(template: &HtmlTemplate) -> Result<String, ComposeError> {
  let parts = template.parts();
  let vars = template.vars();
  if parts.len() != vars.len() + 1 {
    return Err(ComposeError::internal(format!(
      "malformed template: {} literal parts for {} interpolated values",
      parts.len(),
      vars.len()
    )));
  }

  let mut out = String::new();
  for (part, var) in parts.iter().zip(vars) {
    out.push_str(part);
    match var {
      TemplateVar::Escaped(escaped) => out.push_str(escaped.as_str()),
      TemplateVar::Template(nested) => out.push_str(&render_template(nested)?),
      TemplateVar::Value(value) => out.push_str(&escape_html(&stringify(value))),
    }
  }
  if let Some(last) = parts.last() {
    out.push_str(last);
  }
  Ok(out)
}
