/* src/server/injector/rust/src/tests/pipeline.rs */

use std::sync::Arc;

use serde_json::json;
use ssrkit_composer::{dangerously_skip_escape, escape_inject};

use super::*;

const DOCUMENT: &str =
  r#"<html><head><title>Home</title></head><body><div id="root">hi</div></body></html>"#;

// -- Snippet placement --

#[tokio::test]
async fn buffered_document_gets_every_snippet() {
  let deps = InjectDeps::from_assets(page_assets());
  let (html, _) = inject_assets(DOCUMENT, index_page(), deps).await.unwrap();
  let expected = format!(
    "<html><head>{STYLE_LINK}<title>Home</title></head><body><div id=\"root\">hi</div>{}{}</body></html>",
    context_script(r#"{"_pageId":"/pages/index"}"#),
    format!("{ENTRY_SCRIPT}{IMAGE_PRELOAD}"),
  );
  assert_eq!(html, expected);
}

#[tokio::test]
async fn context_precedes_scripts() {
  let deps = InjectDeps::from_assets(page_assets());
  let (html, _) = inject_assets(DOCUMENT, index_page(), deps).await.unwrap();
  let context_at = html.find("ssrkit_pageContext").unwrap();
  let script_at = html.find(ENTRY_SCRIPT).unwrap();
  assert!(context_at < script_at);
}

#[tokio::test]
async fn html_only_page_has_no_script() {
  let mut assets = page_assets();
  assets.push(PageAsset::from_src("/chunk.js", AssetType::Preload));
  let deps = InjectDeps::from_assets(assets).dev_server(Arc::new(ViteLike));
  let page = index_page().production(false).html_only(true);
  let (html, _) = inject_assets(DOCUMENT, page, deps).await.unwrap();
  assert!(!html.contains("<script"));
  assert!(!html.contains("modulepreload"));
  assert!(html.contains(STYLE_LINK));
  assert!(html.contains(IMAGE_PRELOAD));
}

#[tokio::test]
async fn missing_head_is_created_before_body() {
  let deps = InjectDeps::from_assets(vec![PageAsset::from_src("/a.css", AssetType::Style)]);
  let page = index_page().html_only(true);
  let (html, _) =
    inject_assets("<!DOCTYPE html><html><body>x</body></html>", page, deps).await.unwrap();
  assert_eq!(html, format!("<!DOCTYPE html><html><head>{STYLE_LINK}</head><body>x</body></html>"));
}

#[tokio::test]
async fn fragment_without_tags() {
  let deps = InjectDeps::from_assets(page_assets());
  let (html, _) = inject_assets("<p>hi</p>", index_page(), deps).await.unwrap();
  assert_eq!(
    html,
    format!(
      "<head>{STYLE_LINK}</head><p>hi</p>{}{ENTRY_SCRIPT}{IMAGE_PRELOAD}",
      context_script(r#"{"_pageId":"/pages/index"}"#)
    )
  );
}

#[tokio::test]
async fn head_snippets_keep_discovery_order() {
  let assets = vec![
    PageAsset::from_src("/first.css", AssetType::Style),
    PageAsset::from_src("/inter.woff2", AssetType::Preload),
    PageAsset::from_src("/second.css", AssetType::Style),
  ];
  let deps = InjectDeps::from_assets(assets);
  let (html, _) = inject_assets(DOCUMENT, index_page().html_only(true), deps).await.unwrap();
  let first = html.find("/first.css").unwrap();
  let font = html.find("/inter.woff2").unwrap();
  let second = html.find("/second.css").unwrap();
  assert!(first < font && font < second);
  assert!(second < html.find("<title>").unwrap());
}

#[tokio::test]
async fn dev_scripts_merge_with_entry() {
  let deps = InjectDeps::from_assets(page_assets()).dev_server(Arc::new(ViteLike));
  let page = index_page().production(false);
  let (html, _) = inject_assets(DOCUMENT, page, deps).await.unwrap();
  let merged = concat!(
    "<script type=\"module\" async>\n",
    "import \"/@vite/client\";\n",
    "import \"/b.js\";\n",
    "</script>"
  );
  assert!(html.contains(merged));
  assert!(!html.contains(VITE_CLIENT));
}

#[tokio::test]
async fn production_ignores_dev_server() {
  let deps = InjectDeps::from_assets(page_assets()).dev_server(Arc::new(ViteLike));
  let (html, _) = inject_assets(DOCUMENT, index_page(), deps).await.unwrap();
  assert!(!html.contains("/@vite/client"));
  assert!(html.contains(ENTRY_SCRIPT));
}

#[tokio::test]
async fn custom_page_context_id() {
  let config = InjectConfig::from_json(r#"{"page_context_id": "app-data"}"#).unwrap();
  let deps = InjectDeps::from_assets(page_assets()).config(config);
  let (html, _) = inject_assets(DOCUMENT, index_page(), deps).await.unwrap();
  assert!(html.contains(r#"<script id="app-data" type="application/json">"#));
  assert!(!html.contains("ssrkit_pageContext"));
}

// -- Pending page context --

#[tokio::test]
async fn pending_context_is_merged_and_serialized() {
  let page = index_page().pass_to_client(["user"]).page_context_promise(resolves_to(json!({
    "user": "ada",
    "serverOnly": true
  })));
  let deps = InjectDeps::from_assets(page_assets());
  let (html, page) = inject_assets(DOCUMENT, page, deps).await.unwrap();
  assert!(html.contains(&context_script(r#"{"_pageId":"/pages/index","user":"ada"}"#)));
  assert_eq!(page.get("user"), Some(json!("ada")));
  assert_eq!(page.get("serverOnly"), Some(json!(true)));
  assert!(!page.has_pending_context());
}

#[tokio::test]
async fn pending_null_context_changes_nothing() {
  let page = index_page().value("title", "Home").page_context_promise(resolves_to(Value::Null));
  let deps = InjectDeps::from_assets(page_assets());
  let (_, page) = inject_assets(DOCUMENT, page, deps).await.unwrap();
  assert_eq!(page.values.len(), 1);
}

#[tokio::test]
async fn pending_context_with_reserved_key() {
  let page = index_page().page_context_promise(resolves_to(json!({"_secret": 1})));
  let deps = InjectDeps::from_assets(page_assets());
  let err = inject_assets(DOCUMENT, page, deps).await.unwrap_err();
  assert!(err.is_usage());
  let msg = err.to_string();
  assert!(msg.starts_with("USAGE_ERROR: "));
  assert!(msg.contains("render() hook defined by /renderer/+onRenderHtml.ts"));
  assert!(msg.contains("`_secret`"));
}

#[tokio::test]
async fn pending_context_not_an_object() {
  let page = index_page().page_context_promise(resolves_to(json!([1, 2])));
  let deps = InjectDeps::from_assets(page_assets());
  let err = inject_assets(DOCUMENT, page, deps).await.unwrap_err();
  assert!(err.is_usage());
  assert!(err.to_string().contains("`array`"));
}

#[tokio::test]
async fn pending_context_failure_is_forwarded() {
  let failing: PageContextFuture =
    Box::pin(async { Err(InjectError::external(std::io::Error::other("db timeout"))) });
  let page = index_page().page_context_promise(failing);
  let deps = InjectDeps::from_assets(page_assets());
  let err = inject_assets(DOCUMENT, page, deps).await.unwrap_err();
  assert_eq!(err.to_string(), "db timeout");
}

#[tokio::test]
async fn serialized_context_cannot_close_script() {
  let page = index_page().pass_to_client(["title"]).value("title", "</script><script>alert(1)");
  let deps = InjectDeps::from_assets(Vec::new());
  let (html, _) = inject_assets(DOCUMENT, page, deps).await.unwrap();
  assert_eq!(html.matches("</script>").count(), 1);
  assert!(html.contains(&sanitize_json(r#""</script><script>alert(1)""#)));
}

#[tokio::test]
async fn hostile_script_src_stays_inside_its_tag() {
  let assets = vec![
    PageAsset::from_src("/a.js?v=</script><img src=x onerror=alert(1)>", AssetType::Script),
    PageAsset::from_src("/b.js", AssetType::Script),
  ];
  let deps = InjectDeps::from_assets(assets);
  let (html, _) = inject_assets(DOCUMENT, index_page(), deps).await.unwrap();
  // One for the context script, one for the merged module
  assert_eq!(html.matches("</script").count(), 2);
  assert!(!html.contains("<img"));
}

// -- Failures --

#[tokio::test]
async fn script_asset_with_unknown_media_type() {
  let asset = PageAsset {
    src: "/module.wasm".to_string(),
    asset_type: AssetType::Script,
    media_type: None,
    preload_type: None,
  };
  let deps = InjectDeps::from_assets(vec![asset]);
  let err = inject_assets(DOCUMENT, index_page(), deps).await.unwrap_err();
  assert!(err.is_internal());
}

#[tokio::test]
async fn asset_resolver_failure_is_forwarded() {
  let deps = InjectDeps::new(Arc::new(|| -> BoxFuture<Result<Vec<PageAsset>, InjectError>> {
    Box::pin(async { Err(InjectError::external(std::io::Error::other("manifest missing"))) })
  }));
  let err = inject_assets(DOCUMENT, index_page(), deps).await.unwrap_err();
  assert_eq!(err.to_string(), "manifest missing");
}

// -- Session lifecycle --

#[tokio::test]
async fn end_before_begin() {
  let mut session = RenderSession::new(index_page(), InjectDeps::from_assets(page_assets()));
  let err = session.inject_at_document_end("</body>").await.unwrap_err();
  assert!(err.is_internal());
}

#[tokio::test]
async fn begin_twice() {
  let mut session = RenderSession::new(index_page(), InjectDeps::from_assets(page_assets()));
  session.inject_at_document_begin("<head></head>").await.unwrap();
  let err = session.inject_at_document_begin("<head></head>").await.unwrap_err();
  assert!(err.is_internal());
}

#[tokio::test]
async fn end_twice() {
  let mut session = RenderSession::new(index_page(), InjectDeps::from_assets(page_assets()));
  session.inject_at_document_begin("<head></head>").await.unwrap();
  session.inject_at_document_end("</body>").await.unwrap();
  let err = session.inject_at_document_end("</body>").await.unwrap_err();
  assert!(err.is_internal());
}

#[tokio::test]
async fn end_after_failed_begin() {
  let deps = InjectDeps::new(Arc::new(|| -> BoxFuture<Result<Vec<PageAsset>, InjectError>> {
    Box::pin(async { Err(InjectError::external(std::io::Error::other("manifest missing"))) })
  }));
  let mut session = RenderSession::new(index_page(), deps);
  let err = session.inject_at_document_begin("<head></head>").await.unwrap_err();
  assert_eq!(err.to_string(), "manifest missing");

  let err = session.inject_at_document_end("</body>").await.unwrap_err();
  assert!(err.is_internal());
  assert!(err.to_string().contains("failed"));
  let err = session.inject_at_document_begin("<head></head>").await.unwrap_err();
  assert!(err.is_internal());
}

#[tokio::test]
async fn split_document_parts() {
  let mut session = RenderSession::new(index_page(), InjectDeps::from_assets(page_assets()));
  let begin = session.inject_at_document_begin("<html><head></head><body>").await.unwrap();
  assert_eq!(begin, format!("<html><head>{STYLE_LINK}</head><body>"));
  assert_eq!(session.snippets().len(), 4);
  let end = session.inject_at_document_end("</body></html>").await.unwrap();
  assert!(end.starts_with("<script id=\"ssrkit_pageContext\""));
  assert!(end.ends_with(&format!("{IMAGE_PRELOAD}</body></html>")));
}

// -- Composed documents --

#[tokio::test]
async fn composed_template_is_escaped_then_injected() {
  let document = escape_inject!(
    "<html><head><title>{}</title></head><body>{}</body></html>",
    "Tom & Jerry",
    dangerously_skip_escape("<div id=\"root\"></div>").unwrap()
  );
  let deps = InjectDeps::from_assets(page_assets());
  let (html, _) = render_escape_result(document, index_page(), deps).await.unwrap();
  assert!(html.starts_with(&format!("<html><head>{STYLE_LINK}<title>Tom &amp; Jerry</title>")));
  assert!(html.contains("<body><div id=\"root\"></div><script id=\"ssrkit_pageContext\""));
}

#[tokio::test]
async fn composed_escaped_string_is_injected_verbatim() {
  let document =
    dangerously_skip_escape("<html><head></head><body><b>raw</b></body></html>").unwrap();
  let deps = InjectDeps::from_assets(Vec::new());
  let page = index_page().html_only(true);
  let (html, _) = render_escape_result(document, page, deps).await.unwrap();
  assert_eq!(html, "<html><head></head><body><b>raw</b></body></html>");
}

#[tokio::test]
async fn malformed_template_is_internal() {
  let document = escape_inject(["<p>", "</p>", "x"], vec![]);
  let deps = InjectDeps::from_assets(Vec::new());
  let err = render_escape_result(document, index_page(), deps).await.unwrap_err();
  assert!(err.is_internal());
  assert!(matches!(err, InjectError::Compose(_)));
}
