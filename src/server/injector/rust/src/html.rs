/* src/server/injector/rust/src/html.rs */

//! Position-aware splicing into raw HTML. Tags are matched ASCII
//! case-insensitively and may carry attributes.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::errors::InjectError;
use crate::snippet::Position;

const HTML_HEAD: &str = "<head></head>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
  Html,
  Head,
  Body,
}

fn html_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<html(?:\s[^>]*)?>").unwrap())
}

fn html_close_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)</html\s*>").unwrap())
}

fn head_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").unwrap())
}

fn head_close_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)</head\s*>").unwrap())
}

fn body_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").unwrap())
}

fn body_close_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)</body\s*>").unwrap())
}

fn doctype_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<!doctype(?:\s[^>]*)?>").unwrap())
}

impl Tag {
  fn opening_re(self) -> &'static Regex {
    match self {
      Self::Html => html_open_re(),
      Self::Head => head_open_re(),
      Self::Body => body_open_re(),
    }
  }

  fn closing_re(self) -> &'static Regex {
    match self {
      Self::Html => html_close_re(),
      Self::Head => head_close_re(),
      Self::Body => body_close_re(),
    }
  }
}

pub fn tag_opening_exists(tag: Tag, html: &str) -> bool {
  tag.opening_re().is_match(html)
}

pub fn tag_closing_exists(tag: Tag, html: &str) -> bool {
  tag.closing_re().is_match(html)
}

fn insert_at(html: &str, at: usize, snippet: &str) -> String {
  let mut result = String::with_capacity(html.len() + snippet.len());
  result.push_str(&html[..at]);
  result.push_str(snippet);
  result.push_str(&html[at..]);
  result
}

/// Insert `snippet` right after the first opening `tag`. `None` if absent.
pub fn inject_at_opening_tag(tag: Tag, html: &str, snippet: &str) -> Option<String> {
  let m = tag.opening_re().find(html)?;
  Some(insert_at(html, m.end(), snippet))
}

/// Insert `snippet` right before the last closing `tag`. `None` if absent.
pub fn inject_at_closing_tag(tag: Tag, html: &str, snippet: &str) -> Option<String> {
  let m = tag.closing_re().find_iter(html).last()?;
  Some(insert_at(html, m.start(), snippet))
}

/// Make sure the document carries a `<head>`. A synthetic one goes right
/// before `<body>`, else after `<html>`, else after the doctype, else first.
pub fn create_html_head_if_missing(html: &str) -> String {
  if tag_opening_exists(Tag::Head, html) {
    return html.to_string();
  }
  debug!("document has no <head>, creating one");

  if let Some(m) = body_open_re().find(html) {
    return insert_at(html, m.start(), HTML_HEAD);
  }
  if let Some(with_head) = inject_at_opening_tag(Tag::Html, html, HTML_HEAD) {
    return with_head;
  }
  if let Some(m) = doctype_re().find(html) {
    return insert_at(html, m.end(), HTML_HEAD);
  }
  format!("{HTML_HEAD}{html}")
}

/// Splice one resolved snippet at its position. Stream snippets never reach
/// the buffered splicer.
pub fn inject_html_snippet(
  html: &str,
  snippet: &str,
  position: Position,
) -> Result<String, InjectError> {
  match position {
    Position::HeadOpening => inject_at_opening_tag(Tag::Head, html, snippet).ok_or_else(|| {
      InjectError::internal("HEAD_OPENING snippet spliced into html without <head>")
    }),
    // A chunk that ends inside the head keeps it open for the snippet
    Position::HeadClosing => Ok(
      inject_first_closing(Tag::Head, html, snippet).unwrap_or_else(|| format!("{html}{snippet}")),
    ),
    Position::DocumentEnd => Ok(
      inject_at_closing_tag(Tag::Body, html, snippet).unwrap_or_else(|| format!("{html}{snippet}")),
    ),
    Position::Stream => {
      Err(InjectError::internal("STREAM snippet spliced into buffered html, no stream sink"))
    }
  }
}

fn inject_first_closing(tag: Tag, html: &str, snippet: &str) -> Option<String> {
  let m = tag.closing_re().find(html)?;
  Some(insert_at(html, m.start(), snippet))
}
