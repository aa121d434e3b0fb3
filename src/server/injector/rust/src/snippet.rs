/* src/server/injector/rust/src/snippet.rs */

/// Where a snippet lands in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
  /// Right after `<head ...>`.
  HeadOpening,
  /// Right before `</head>`.
  HeadClosing,
  /// Right before `</body>`, or appended.
  DocumentEnd,
  /// Written to the stream sink as soon as the stream is writable.
  Stream,
}

/// Markup of a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetHtml {
  Static(String),
  /// The serialized page context. Rendered when spliced, after the pending
  /// context has been merged.
  PageContextScript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlSnippet {
  pub html: SnippetHtml,
  pub position: Position,
}

impl HtmlSnippet {
  pub fn new(html: impl Into<String>, position: Position) -> Self {
    Self { html: SnippetHtml::Static(html.into()), position }
  }

  pub fn page_context(position: Position) -> Self {
    Self { html: SnippetHtml::PageContextScript, position }
  }
}
