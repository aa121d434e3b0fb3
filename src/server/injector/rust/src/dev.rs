/* src/server/injector/rust/src/dev.rs */

use tracing::debug;

use crate::deps::BoxFuture;
use crate::errors::InjectError;

/// Development server hook, e.g. a bundler's live-reload client injection.
pub trait DevServer: Send + Sync {
  /// Apply the dev server's index-html transforms to `html` served at `url`.
  fn transform_index_html(&self, url: &str, html: &str) -> BoxFuture<Result<String, InjectError>>;
}

const PROBE_BEGIN: &str = "<html><head>";
const PROBE_END: &str = "</head><body></body></html>";

/// Scripts the dev server wants in every page. Empty in production.
///
/// The dev server transforms an empty probe document; whatever it inserted
/// inside the probe's `<head>` is the dev script markup.
pub async fn get_dev_scripts(
  is_production: bool,
  dev_server: Option<&dyn DevServer>,
  probe_url: &str,
) -> Result<String, InjectError> {
  if is_production {
    return Ok(String::new());
  }
  let Some(dev_server) = dev_server else {
    debug!("no dev server attached, skipping dev scripts");
    return Ok(String::new());
  };

  let probe = format!("{PROBE_BEGIN}{PROBE_END}");
  let transformed = dev_server.transform_index_html(probe_url, &probe).await?;

  if transformed.contains(r#"rel="stylesheet""#) {
    return Err(InjectError::usage(
      "the dev server's index-html transform injected a stylesheet link; \
       styles must be declared as page assets",
    ));
  }

  let injection =
    transformed.strip_prefix(PROBE_BEGIN).and_then(|rest| rest.strip_suffix(PROBE_END)).ok_or_else(
      || InjectError::internal(format!("dev server rewrote the probe document: {transformed}")),
    )?;
  Ok(injection.to_string())
}
