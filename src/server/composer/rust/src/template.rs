/* src/server/composer/rust/src/template.rs */

use serde_json::Value;

use crate::errors::ComposeError;
use crate::helpers::json_type_name;

/// A string the author asserts is already safe HTML. Rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedString(String);

impl EscapedString {
  pub fn new(html: impl Into<String>) -> Self {
    Self(html.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

/// A composed, not yet rendered template: literal parts interleaved with
/// interpolated values. Escaping happens at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTemplate {
  parts: Vec<String>,
  vars: Vec<TemplateVar>,
}

impl HtmlTemplate {
  pub fn parts(&self) -> &[String] {
    &self.parts
  }

  pub fn vars(&self) -> &[TemplateVar] {
    &self.vars
  }
}

/// One interpolated value of an `HtmlTemplate`.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateVar {
  /// Untrusted value, escaped on render.
  Value(Value),
  /// Trusted markup, inserted as-is.
  Escaped(EscapedString),
  /// Nested template, rendered recursively without escaping its output again.
  Template(HtmlTemplate),
}

/// Root input of the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentHtml {
  Escaped(EscapedString),
  Template(HtmlTemplate),
}

/// Build a template node from literal parts and interpolated values.
/// Nothing is checked or escaped here; `render` does both.
pub fn escape_inject<P: Into<String>>(
  parts: impl IntoIterator<Item = P>,
  vars: Vec<TemplateVar>,
) -> HtmlTemplate {
  HtmlTemplate { parts: parts.into_iter().map(Into::into).collect(), vars }
}

/// Compose a template from a literal where every `{}` marks an interpolation.
///
/// ```
/// use ssrkit_composer::{escape_inject, render_template};
///
/// let title = "Tom & Jerry";
/// let html = escape_inject!("<title>{}</title>", title);
/// assert_eq!(render_template(&html).unwrap(), "<title>Tom &amp; Jerry</title>");
/// ```
#[macro_export]
macro_rules! escape_inject {
  ($template:literal $(, $var:expr)* $(,)?) => {
    $crate::escape_inject(
      $template.split("{}"),
      vec![$($crate::TemplateVar::from($var)),*],
    )
  };
}

/// Mark a string as already-escaped HTML.
///
/// Re-wrapping an `EscapedString` returns it unchanged. Anything that is not
/// a string is rejected.
pub fn dangerously_skip_escape(
  already_escaped: impl Into<TemplateVar>,
) -> Result<EscapedString, ComposeError> {
  match already_escaped.into() {
    TemplateVar::Escaped(escaped) => Ok(escaped),
    TemplateVar::Value(Value::String(s)) => Ok(EscapedString(s)),
    TemplateVar::Value(other) => Err(ComposeError::usage(format!(
      "[dangerously_skip_escape(str)] Argument `str` should be a string but we got a `{}`.",
      json_type_name(&other)
    ))),
    TemplateVar::Template(_) => Err(ComposeError::usage(
      "[dangerously_skip_escape(str)] Argument `str` is an `escape_inject` template. \
       Interpolate it directly instead, nested templates are never escaped twice.",
    )),
  }
}

// -- Conversions --

impl From<Value> for TemplateVar {
  fn from(value: Value) -> Self {
    Self::Value(value)
  }
}

impl From<&str> for TemplateVar {
  fn from(value: &str) -> Self {
    Self::Value(Value::String(value.to_string()))
  }
}

impl From<String> for TemplateVar {
  fn from(value: String) -> Self {
    Self::Value(Value::String(value))
  }
}

impl From<&String> for TemplateVar {
  fn from(value: &String) -> Self {
    Self::Value(Value::String(value.clone()))
  }
}

macro_rules! impl_template_var_scalar {
  ($($ty:ty),*) => {
    $(
      impl From<$ty> for TemplateVar {
        fn from(value: $ty) -> Self {
          Self::Value(Value::from(value))
        }
      }
    )*
  };
}

impl_template_var_scalar!(bool, i32, i64, u32, u64, usize, f64);

impl From<EscapedString> for TemplateVar {
  fn from(value: EscapedString) -> Self {
    Self::Escaped(value)
  }
}

impl From<HtmlTemplate> for TemplateVar {
  fn from(value: HtmlTemplate) -> Self {
    Self::Template(value)
  }
}

impl<T: Into<TemplateVar>> From<Option<T>> for TemplateVar {
  fn from(value: Option<T>) -> Self {
    value.map_or(Self::Value(Value::Null), Into::into)
  }
}

impl From<EscapedString> for DocumentHtml {
  fn from(value: EscapedString) -> Self {
    Self::Escaped(value)
  }
}

impl From<HtmlTemplate> for DocumentHtml {
  fn from(value: HtmlTemplate) -> Self {
    Self::Template(value)
  }
}
