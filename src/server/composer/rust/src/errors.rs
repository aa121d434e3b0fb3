/* src/server/composer/rust/src/errors.rs */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
  /// The caller handed the composer something it cannot accept.
  #[error("USAGE_ERROR: {0}")]
  Usage(String),
  /// A template reached the renderer in a shape the composer never builds.
  #[error("INTERNAL_ERROR: {0}")]
  Internal(String),
}

impl ComposeError {
  pub fn usage(msg: impl Into<String>) -> Self {
    Self::Usage(msg.into())
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::Internal(msg.into())
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::Usage(_) => "USAGE_ERROR",
      Self::Internal(_) => "INTERNAL_ERROR",
    }
  }

  pub fn message(&self) -> &str {
    match self {
      Self::Usage(msg) | Self::Internal(msg) => msg,
    }
  }
}
