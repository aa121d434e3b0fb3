/* src/server/injector/rust/src/deps.rs */

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;

use crate::asset::PageAsset;
use crate::config::InjectConfig;
use crate::dev::DevServer;
use crate::errors::InjectError;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Resolves the ordered page assets of the page being rendered.
pub type AssetResolverFn =
  Arc<dyn Fn() -> BoxFuture<Result<Vec<PageAsset>, InjectError>> + Send + Sync>;

/// Collaborators and settings shared by every render of a page.
#[derive(Clone)]
pub struct InjectDeps {
  pub get_page_assets: AssetResolverFn,
  pub dev_server: Option<Arc<dyn DevServer>>,
  pub config: InjectConfig,
}

impl InjectDeps {
  pub fn new(get_page_assets: AssetResolverFn) -> Self {
    Self { get_page_assets, dev_server: None, config: InjectConfig::default() }
  }

  /// Resolver over a fixed asset list, for pages whose assets are known upfront.
  pub fn from_assets(assets: Vec<PageAsset>) -> Self {
    let assets = Arc::new(assets);
    Self::new(Arc::new(move || -> BoxFuture<Result<Vec<PageAsset>, InjectError>> {
      let assets = Arc::clone(&assets);
      Box::pin(async move { Ok(assets.as_ref().clone()) })
    }))
  }

  pub fn dev_server(mut self, dev_server: Arc<dyn DevServer>) -> Self {
    self.dev_server = Some(dev_server);
    self
  }

  pub fn config(mut self, config: InjectConfig) -> Self {
    self.config = config;
    self
  }
}
