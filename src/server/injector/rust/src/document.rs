/* src/server/injector/rust/src/document.rs */

use ssrkit_composer::{DocumentHtml, render};

use crate::context::PageContext;
use crate::deps::InjectDeps;
use crate::errors::InjectError;
use crate::session::RenderSession;

/// Inject every snippet into a complete, buffered document.
///
/// Returns the document together with the page context, which carries the
/// fields resolved after the render hook returned.
pub async fn inject_assets(
  html: &str,
  page_context: PageContext,
  deps: InjectDeps,
) -> Result<(String, PageContext), InjectError> {
  let mut session = RenderSession::new(page_context, deps);
  let html = session.inject_at_document_begin(html).await?;
  let html = session.inject_at_document_end(&html).await?;
  Ok((html, session.into_page_context()))
}

/// Render what the render hook returned and inject the page's assets.
pub async fn render_escape_result(
  document: impl Into<DocumentHtml>,
  page_context: PageContext,
  deps: InjectDeps,
) -> Result<(String, PageContext), InjectError> {
  let html = render(&document.into())?;
  inject_assets(&html, page_context, deps).await
}
