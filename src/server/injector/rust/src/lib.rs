/* src/server/injector/rust/src/lib.rs */

//! Asset and page-context injection for server-rendered documents.
//!
//! A render computes its HTML snippets once (styles, preloads, the merged
//! script tag and the serialized page context) and splices them at the head
//! opening, the head closing, the document end, or into a response stream.
//! Buffered documents go through [`inject_assets`], streamed ones through
//! [`inject_stream`]; both drive a [`RenderSession`].

pub mod asset;
pub mod config;
pub mod context;
pub mod deps;
pub mod dev;
pub mod document;
pub mod errors;
pub mod html;
pub mod media;
pub mod merge;
pub mod sanitize;
pub mod session;
pub mod snippet;
pub mod stream;

// Public API re-exports
pub use asset::{AssetType, PageAsset, PreloadType, infer_asset_tag};
pub use config::{InjectConfig, PAGE_CONTEXT_SCRIPT_ID};
pub use context::{
  HookInfo, PageContext, PageContextFuture, assert_page_context_provided_by_user,
  serialize_page_context_client_side,
};
pub use deps::{AssetResolverFn, BoxFuture, BoxStream, InjectDeps};
pub use dev::{DevServer, get_dev_scripts};
pub use document::{inject_assets, render_escape_result};
pub use errors::{BoxError, InjectError};
pub use media::{MediaType, infer_media_type};
pub use merge::merge_script_tags;
pub use sanitize::sanitize_json;
pub use session::{RenderSession, SnippetOptions, compute_snippets, get_page_context_tag};
pub use snippet::{HtmlSnippet, Position, SnippetHtml};
pub use stream::{ChunkQueue, StreamSink, inject_stream};

#[cfg(test)]
mod tests;
