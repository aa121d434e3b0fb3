/* src/server/injector/rust/src/errors.rs */

use ssrkit_composer::ComposeError;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum InjectError {
  /// Invalid input from the caller or a user hook. Ends the render.
  #[error("USAGE_ERROR: {0}")]
  Usage(String),
  /// Unreachable state given correct call sites.
  #[error("INTERNAL_ERROR: {0}")]
  Internal(String),
  #[error(transparent)]
  Compose(#[from] ComposeError),
  #[error("CONFIG_ERROR: {0}")]
  Config(String),
  /// Failure of a collaborator (asset resolver, dev server, pending context),
  /// forwarded as-is.
  #[error(transparent)]
  External(BoxError),
}

impl InjectError {
  pub fn usage(msg: impl Into<String>) -> Self {
    Self::Usage(msg.into())
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::Internal(msg.into())
  }

  pub fn config(msg: impl Into<String>) -> Self {
    Self::Config(msg.into())
  }

  pub fn external(err: impl Into<BoxError>) -> Self {
    Self::External(err.into())
  }

  pub fn is_usage(&self) -> bool {
    matches!(self, Self::Usage(_) | Self::Compose(ComposeError::Usage(_)))
  }

  pub fn is_internal(&self) -> bool {
    matches!(self, Self::Internal(_) | Self::Compose(ComposeError::Internal(_)))
  }
}
