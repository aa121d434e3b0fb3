/* src/server/composer/rust/src/lib.rs */

//! HTML template composition with deferred escaping.
//!
//! Templates are built with [`escape_inject!`] (or [`escape_inject`]) and
//! rendered with [`render`]. Interpolated values are HTML-escaped unless they
//! were wrapped by [`dangerously_skip_escape`] or are templates themselves.

pub mod errors;
pub mod helpers;
pub mod render;
pub mod template;

// Public API re-exports
pub use errors::ComposeError;
pub use helpers::{escape_html, json_type_name, stringify};
pub use render::{render, render_template};
pub use template::{
  DocumentHtml, EscapedString, HtmlTemplate, TemplateVar, dangerously_skip_escape, escape_inject,
};
