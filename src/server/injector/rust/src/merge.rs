/* src/server/injector/rust/src/merge.rs */

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use ssrkit_composer::escape_html;

use crate::sanitize::sanitize_json;

fn script_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<script\b(?:\s[^>]*>|>))(.*?)</script\s*>").unwrap())
}

fn src_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s'">]+))"#).unwrap())
}

fn type_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)\btype\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s'">]+))"#).unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedScript {
  /// Attribute value with entity escaping undone.
  src: Option<String>,
  is_module: bool,
  inner: String,
}

fn attr_value(caps: &Captures<'_>) -> Option<String> {
  caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)).map(|m| m.as_str().to_string())
}

fn parse_scripts(html: &str) -> Vec<ParsedScript> {
  script_re()
    .captures_iter(html)
    .map(|caps| {
      let open_tag = caps.get(1).map_or("", |m| m.as_str());
      let inner = caps.get(2).map_or("", |m| m.as_str());
      let src = src_re()
        .captures(open_tag)
        .and_then(|c| attr_value(&c))
        .filter(|s| !s.is_empty())
        .map(|s| unescape_attr(&s));
      let is_module = type_re()
        .captures(open_tag)
        .and_then(|c| attr_value(&c))
        .is_some_and(|t| t.eq_ignore_ascii_case("module"));
      ParsedScript { src, is_module, inner: inner.trim().to_string() }
    })
    .collect()
}

/// Undo the attribute escaping of a `src`; it is re-escaped for wherever it is emitted.
fn unescape_attr(value: &str) -> String {
  value
    .replace("&quot;", "\"")
    .replace("&#039;", "'")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&amp;", "&")
}

/// Collapse a run of `<script>` tags into the minimal equivalent markup.
///
/// Tags sharing a `src` are dropped after the first. Module scripts keep
/// their relative order by being merged into one module that imports (or
/// inlines) each of them, unless there is only a single external one.
/// Attributes other than `src` and `type` are not carried over.
pub fn merge_script_tags(scripts_html: &str) -> Option<String> {
  let mut seen = HashSet::new();
  let scripts: Vec<ParsedScript> = parse_scripts(scripts_html)
    .into_iter()
    .filter(|s| s.src.as_ref().is_none_or(|src| seen.insert(src.clone())))
    .filter(|s| s.src.is_some() || !s.inner.is_empty())
    .collect();

  let (modules, classic): (Vec<_>, Vec<_>) = scripts.into_iter().partition(|s| s.is_module);
  let mut merged = String::new();

  match modules.as_slice() {
    [] => {}
    [ParsedScript { src: Some(src), inner, .. }] if inner.is_empty() => {
      let src = escape_html(src);
      merged.push_str(&format!(r#"<script type="module" src="{src}" async></script>"#));
    }
    _ => {
      let mut body = String::new();
      for script in &modules {
        if let Some(src) = &script.src {
          // Inside an inline script: `</script` must not survive
          let specifier = sanitize_json(&serde_json::Value::String(src.clone()).to_string());
          body.push_str(&format!("import {specifier};\n"));
        }
        if !script.inner.is_empty() {
          body.push_str(&script.inner);
          body.push('\n');
        }
      }
      merged.push_str(&format!("<script type=\"module\" async>\n{body}</script>"));
    }
  }

  for script in classic {
    match script.src {
      Some(src) => merged.push_str(&format!(r#"<script src="{}"></script>"#, escape_html(&src))),
      None => merged.push_str(&format!("<script>{}</script>", script.inner)),
    }
  }

  if merged.is_empty() { None } else { Some(merged) }
}
