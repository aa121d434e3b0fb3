/* src/server/injector/rust/src/session.rs */

//! Per-render injection state.
//!
//! A `RenderSession` is created for exactly one render. The snippet list is
//! computed by `inject_at_document_begin` and consumed by
//! `inject_at_document_end`; the two must run once each, in that order.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::asset::{AssetType, PageAsset, PreloadType, infer_asset_tag};
use crate::context::{
  PageContext, assert_page_context_provided_by_user, serialize_page_context_client_side,
};
use crate::deps::InjectDeps;
use crate::dev::get_dev_scripts;
use crate::errors::InjectError;
use crate::html::{create_html_head_if_missing, inject_html_snippet};
use crate::merge::merge_script_tags;
use crate::sanitize::sanitize_json;
use crate::snippet::{HtmlSnippet, Position, SnippetHtml};
use crate::stream::StreamSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
  Fresh,
  Begun,
  Ended,
  /// Snippet computation failed, the render cannot continue.
  Failed,
}

/// Flags steering snippet computation for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnippetOptions {
  /// No client-side hydration: neither scripts nor the serialized context.
  pub is_html_only: bool,
  pub is_production: bool,
  /// Scripts go to the stream sink instead of the document end.
  pub inject_js_during_stream: bool,
}

pub struct RenderSession {
  page_context: PageContext,
  deps: InjectDeps,
  sink: Option<Arc<dyn StreamSink>>,
  snippets: Vec<HtmlSnippet>,
  stage: Stage,
}

impl RenderSession {
  /// Session for buffered delivery.
  pub fn new(page_context: PageContext, deps: InjectDeps) -> Self {
    Self { page_context, deps, sink: None, snippets: Vec::new(), stage: Stage::Fresh }
  }

  /// Session for streamed delivery: `STREAM` snippets are written to `sink`.
  pub fn with_stream_sink(
    page_context: PageContext,
    deps: InjectDeps,
    sink: Arc<dyn StreamSink>,
  ) -> Self {
    Self { sink: Some(sink), ..Self::new(page_context, deps) }
  }

  pub fn page_context(&self) -> &PageContext {
    &self.page_context
  }

  /// Hand the (possibly merged) page context back to the caller.
  pub fn into_page_context(self) -> PageContext {
    self.page_context
  }

  /// Snippets computed by `inject_at_document_begin`.
  pub fn snippets(&self) -> &[HtmlSnippet] {
    &self.snippets
  }

  /// Inject every snippet not bound to the document end into the first part
  /// of the document, creating a `<head>` if there is none.
  pub async fn inject_at_document_begin(
    &mut self,
    html_begin: &str,
  ) -> Result<String, InjectError> {
    if self.stage != Stage::Fresh {
      return Err(InjectError::internal("inject_at_document_begin() called twice for one render"));
    }

    let options = SnippetOptions {
      is_html_only: self.page_context.is_html_only,
      is_production: self.page_context.is_production,
      inject_js_during_stream: !self.page_context.has_pending_context() && self.sink.is_some(),
    };
    self.stage = Stage::Failed;
    self.snippets = compute_snippets(&self.deps, options).await?;
    self.stage = Stage::Begun;

    let html = create_html_head_if_missing(html_begin);
    self.inject_snippets(html, |position| position != Position::DocumentEnd)
  }

  /// Resolve the pending page context, then inject the document-end
  /// snippets into the last part of the document.
  pub async fn inject_at_document_end(&mut self, html_end: &str) -> Result<String, InjectError> {
    match self.stage {
      Stage::Fresh => {
        return Err(InjectError::internal(
          "inject_at_document_end() called before inject_at_document_begin()",
        ));
      }
      Stage::Ended => {
        return Err(InjectError::internal("inject_at_document_end() called twice for one render"));
      }
      Stage::Failed => {
        return Err(InjectError::internal(
          "inject_at_document_end() called after inject_at_document_begin() failed",
        ));
      }
      Stage::Begun => {}
    }
    self.stage = Stage::Ended;

    resolve_page_context_promise(&mut self.page_context).await?;
    self.inject_snippets(html_end.to_string(), |position| position == Position::DocumentEnd)
  }

  fn inject_snippets(
    &self,
    mut html: String,
    include: impl Fn(Position) -> bool,
  ) -> Result<String, InjectError> {
    for position in [Position::HeadOpening, Position::HeadClosing, Position::DocumentEnd] {
      if !include(position) {
        continue;
      }
      let mut joined = String::new();
      for snippet in self.snippets.iter().filter(|s| s.position == position) {
        joined.push_str(&self.resolve_snippet_html(&snippet.html)?);
      }
      if !joined.is_empty() {
        html = inject_html_snippet(&html, &joined, position)?;
      }
    }

    if include(Position::Stream) {
      for snippet in self.snippets.iter().filter(|s| s.position == Position::Stream) {
        let sink = self
          .sink
          .as_ref()
          .ok_or_else(|| InjectError::internal("STREAM snippet computed without a stream sink"))?;
        let markup = self.resolve_snippet_html(&snippet.html)?;
        trace!(len = markup.len(), "writing snippet to stream");
        sink.write(markup);
      }
    }
    Ok(html)
  }

  fn resolve_snippet_html(&self, html: &SnippetHtml) -> Result<String, InjectError> {
    match html {
      SnippetHtml::Static(markup) => Ok(markup.clone()),
      SnippetHtml::PageContextScript => {
        get_page_context_tag(&self.page_context, &self.deps.config.page_context_id)
      }
    }
  }
}

/// Await the context the render hook resolves after returning, validate it
/// and merge it into the page context.
async fn resolve_page_context_promise(page_context: &mut PageContext) -> Result<(), InjectError> {
  let Some(pending) = page_context.take_page_context_promise() else {
    return Ok(());
  };
  let provided = pending.await?;
  if let Some(fields) = assert_page_context_provided_by_user(provided, &page_context.render_hook)? {
    debug!(keys = fields.len(), "merging page context resolved after render");
    page_context.merge(fields);
  }
  Ok(())
}

/// The inline JSON block the client reads its page context from.
pub fn get_page_context_tag(page_context: &PageContext, id: &str) -> Result<String, InjectError> {
  let serialized = sanitize_json(&serialize_page_context_client_side(page_context)?);
  Ok(format!(r#"<script id="{id}" type="application/json">{serialized}</script>"#))
}

/// Compute the ordered snippets of one render.
///
/// Order within a position: serialized context, merged scripts, then one
/// tag per remaining asset in input order.
pub async fn compute_snippets(
  deps: &InjectDeps,
  options: SnippetOptions,
) -> Result<Vec<HtmlSnippet>, InjectError> {
  let page_assets = (deps.get_page_assets)().await?;
  let position_js =
    if options.inject_js_during_stream { Position::Stream } else { Position::DocumentEnd };

  let mut snippets = Vec::new();

  if !options.is_html_only {
    // Rendered at splice time, after the pending context is merged
    snippets.push(HtmlSnippet::page_context(position_js));

    if let Some(script) = get_merged_script_tag(&page_assets, deps, options.is_production).await? {
      snippets.push(HtmlSnippet::new(script, position_js));
    }
  }

  for asset in &page_assets {
    match (asset.asset_type, asset.preload_type) {
      // Part of the merged script tag
      (AssetType::Script, _) => {}
      (AssetType::Preload, Some(PreloadType::Script)) => {
        if !options.is_html_only {
          snippets.push(HtmlSnippet::new(infer_asset_tag(asset)?, position_js));
        }
      }
      // Explicit style links go first in <head>, ahead of any styles a dev
      // server injects later.
      (AssetType::Style, _)
      | (AssetType::Preload, Some(PreloadType::Style | PreloadType::Font)) => {
        snippets.push(HtmlSnippet::new(infer_asset_tag(asset)?, Position::HeadOpening));
      }
      (AssetType::Preload, _) => {
        snippets.push(HtmlSnippet::new(infer_asset_tag(asset)?, Position::DocumentEnd));
      }
    }
  }

  debug!(
    assets = page_assets.len(),
    snippets = snippets.len(),
    html_only = options.is_html_only,
    stream = options.inject_js_during_stream,
    "computed html snippets"
  );
  Ok(snippets)
}

/// Dev scripts plus every script asset, merged into a single tag run.
async fn get_merged_script_tag(
  page_assets: &[PageAsset],
  deps: &InjectDeps,
  is_production: bool,
) -> Result<Option<String>, InjectError> {
  let mut scripts_html =
    get_dev_scripts(is_production, deps.dev_server.as_deref(), &deps.config.dev_probe_url).await?;
  for asset in page_assets.iter().filter(|a| a.asset_type == AssetType::Script) {
    scripts_html.push_str(&infer_asset_tag(asset)?);
  }
  Ok(merge_script_tags(&scripts_html))
}
