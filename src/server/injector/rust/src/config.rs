/* src/server/injector/rust/src/config.rs */

use serde::Deserialize;

use crate::errors::InjectError;

/// Id of the `<script type="application/json">` block carrying the
/// serialized page context. Client bootstrap code looks it up by this id.
pub const PAGE_CONTEXT_SCRIPT_ID: &str = "ssrkit_pageContext";

/// Injector settings, usually passed in as JSON by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct InjectConfig {
  #[serde(default = "default_page_context_id")]
  pub page_context_id: String,
  /// Url handed to the dev server when probing for its injected scripts.
  #[serde(default = "default_dev_probe_url")]
  pub dev_probe_url: String,
}

fn default_page_context_id() -> String {
  PAGE_CONTEXT_SCRIPT_ID.to_string()
}

fn default_dev_probe_url() -> String {
  "/".to_string()
}

impl Default for InjectConfig {
  fn default() -> Self {
    Self { page_context_id: default_page_context_id(), dev_probe_url: default_dev_probe_url() }
  }
}

impl InjectConfig {
  pub fn from_json(json: &str) -> Result<Self, InjectError> {
    let config: Self =
      serde_json::from_str(json).map_err(|e| InjectError::config(format!("parse config: {e}")))?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), InjectError> {
    if self.page_context_id.is_empty() {
      return Err(InjectError::config("page_context_id must not be empty"));
    }
    let id = &self.page_context_id;
    if id.contains(['"', '\'', '<', '>', '&']) || id.contains(char::is_whitespace) {
      return Err(InjectError::config(format!(
        "page_context_id \"{id}\" must be a plain html id without quotes, markup or whitespace"
      )));
    }
    Ok(())
  }
}
