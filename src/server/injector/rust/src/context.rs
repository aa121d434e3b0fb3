/* src/server/injector/rust/src/context.rs */

use std::fmt;

use serde_json::{Map, Value};
use ssrkit_composer::json_type_name;

use crate::deps::BoxFuture;
use crate::errors::InjectError;

/// Context fields resolved after the render hook returned.
pub type PageContextFuture = BoxFuture<Result<Value, InjectError>>;

/// The user hook that produced the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInfo {
  pub hook_name: String,
  pub hook_file_path: String,
}

impl HookInfo {
  pub fn render(hook_file_path: impl Into<String>) -> Self {
    Self { hook_name: "render".to_string(), hook_file_path: hook_file_path.into() }
  }
}

impl fmt::Display for HookInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}() hook defined by {}", self.hook_name, self.hook_file_path)
  }
}

/// The part of a page context the injector reads, plus the user fields.
pub struct PageContext {
  pub url_pathname: String,
  pub page_id: String,
  /// Keys serialized for client-side hydration.
  pub pass_to_client: Vec<String>,
  pub is_html_only: bool,
  pub is_production: bool,
  pub is_404: Option<bool>,
  pub render_hook: HookInfo,
  /// User-provided fields. Take precedence over the built-in ones on lookup.
  pub values: Map<String, Value>,
  page_context_promise: Option<PageContextFuture>,
}

impl PageContext {
  pub fn new(url_pathname: impl Into<String>, page_id: impl Into<String>) -> Self {
    let page_id = page_id.into();
    Self {
      url_pathname: url_pathname.into(),
      render_hook: HookInfo::render(page_id.clone()),
      page_id,
      pass_to_client: Vec::new(),
      is_html_only: false,
      is_production: false,
      is_404: None,
      values: Map::new(),
      page_context_promise: None,
    }
  }

  pub fn pass_to_client<I, S>(mut self, keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.pass_to_client.extend(keys.into_iter().map(Into::into));
    self
  }

  pub fn html_only(mut self, is_html_only: bool) -> Self {
    self.is_html_only = is_html_only;
    self
  }

  pub fn production(mut self, is_production: bool) -> Self {
    self.is_production = is_production;
    self
  }

  pub fn is_404(mut self, is_404: bool) -> Self {
    self.is_404 = Some(is_404);
    self
  }

  pub fn render_hook(mut self, hook: HookInfo) -> Self {
    self.render_hook = hook;
    self
  }

  pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.values.insert(key.into(), value.into());
    self
  }

  /// Context fields the render hook resolves after returning the document.
  pub fn page_context_promise(mut self, pending: PageContextFuture) -> Self {
    self.page_context_promise = Some(pending);
    self
  }

  pub fn has_pending_context(&self) -> bool {
    self.page_context_promise.is_some()
  }

  pub(crate) fn take_page_context_promise(&mut self) -> Option<PageContextFuture> {
    self.page_context_promise.take()
  }

  /// Look up a field: user values first, then the built-ins.
  pub fn get(&self, key: &str) -> Option<Value> {
    if let Some(value) = self.values.get(key) {
      return Some(value.clone());
    }
    match key {
      "urlPathname" => Some(Value::String(self.url_pathname.clone())),
      "_pageId" => Some(Value::String(self.page_id.clone())),
      "is404" => self.is_404.map(Value::Bool),
      _ => None,
    }
  }

  /// Merge fields resolved by the render hook into the user values.
  pub fn merge(&mut self, provided: Map<String, Value>) {
    self.values.extend(provided);
  }
}

impl fmt::Debug for PageContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PageContext")
      .field("url_pathname", &self.url_pathname)
      .field("page_id", &self.page_id)
      .field("pass_to_client", &self.pass_to_client)
      .field("is_html_only", &self.is_html_only)
      .field("is_production", &self.is_production)
      .field("is_404", &self.is_404)
      .field("render_hook", &self.render_hook)
      .field("values", &self.values)
      .field("has_pending_context", &self.has_pending_context())
      .finish()
  }
}

/// JSON handed to the client: `_pageId`, `is404` when known, and every
/// `pass_to_client` key that resolves.
pub fn serialize_page_context_client_side(
  page_context: &PageContext,
) -> Result<String, InjectError> {
  let mut client = Map::new();
  client.insert("_pageId".to_string(), Value::String(page_context.page_id.clone()));
  if let Some(is_404) = page_context.is_404 {
    client.insert("is404".to_string(), Value::Bool(is_404));
  }
  for key in &page_context.pass_to_client {
    if let Some(value) = page_context.get(key) {
      client.insert(key.clone(), value);
    }
  }

  serde_json::to_string(&Value::Object(client)).map_err(|e| {
    InjectError::usage(format!(
      "pageContext couldn't be serialized for the client ({e}). \
       Check the values of the keys passed to the client: {:?}",
      page_context.pass_to_client
    ))
  })
}

/// Validate what a render hook resolved its pending page context to.
/// `null` means nothing to merge.
pub fn assert_page_context_provided_by_user(
  provided: Value,
  hook: &HookInfo,
) -> Result<Option<Map<String, Value>>, InjectError> {
  let err_prefix = format!("The `pageContext` object provided by the {hook}");
  let provided = match provided {
    Value::Null => return Ok(None),
    Value::Object(map) => map,
    other => {
      return Err(InjectError::usage(format!(
        "{err_prefix} should be an object (but it's `{}` instead)",
        json_type_name(&other)
      )));
    }
  };

  if provided.contains_key("isPageContext") {
    return Err(InjectError::usage(format!(
      "{err_prefix} shouldn't be the whole `pageContext` object, return only the fields to add"
    )));
  }
  if let Some(reserved) = provided.keys().find(|key| key.starts_with('_')) {
    return Err(InjectError::usage(format!(
      "{err_prefix} sets `{reserved}`, keys starting with `_` are reserved for internal use"
    )));
  }
  Ok(Some(provided))
}
