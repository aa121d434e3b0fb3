/* src/server/injector/rust/src/tests/mod.rs */

use super::*;
use serde_json::Value;

mod pipeline;

const VITE_CLIENT: &str = r#"<script type="module" src="/@vite/client"></script>"#;

const HOOK_FILE: &str = "/renderer/+onRenderHtml.ts";

const STYLE_LINK: &str = r#"<link rel="stylesheet" type="text/css" href="/a.css">"#;
const ENTRY_SCRIPT: &str = r#"<script type="module" src="/b.js" async></script>"#;
const IMAGE_PRELOAD: &str = r#"<link rel="preload" href="/c.png" as="image" type="image/png">"#;

fn page_assets() -> Vec<PageAsset> {
  vec![
    PageAsset::from_src("/a.css", AssetType::Style),
    PageAsset::from_src("/b.js", AssetType::Script),
    PageAsset::from_src("/c.png", AssetType::Preload),
  ]
}

fn index_page() -> PageContext {
  PageContext::new("/", "/pages/index").production(true).render_hook(HookInfo::render(HOOK_FILE))
}

fn context_script(json: &str) -> String {
  format!(r#"<script id="ssrkit_pageContext" type="application/json">{json}</script>"#)
}

fn resolves_to(value: Value) -> PageContextFuture {
  Box::pin(async move { Ok(value) })
}

/// Dev server that injects a live-reload client into every page.
struct ViteLike;

impl DevServer for ViteLike {
  fn transform_index_html(&self, _url: &str, html: &str) -> BoxFuture<Result<String, InjectError>> {
    let transformed = html.replacen("<head>", &format!("<head>{VITE_CLIENT}"), 1);
    Box::pin(async move { Ok(transformed) })
  }
}
