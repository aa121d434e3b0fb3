/* src/server/injector/rust/src/stream.rs */

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use futures_core::Stream;
use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::context::PageContext;
use crate::deps::{BoxStream, InjectDeps};
use crate::errors::InjectError;
use crate::html::inject_html_snippet;
use crate::session::RenderSession;
use crate::snippet::Position;

/// Accepts raw markup to be written into a response stream.
pub trait StreamSink: Send + Sync {
  fn write(&self, html: String);
}

impl StreamSink for UnboundedSender<String> {
  fn write(&self, html: String) {
    if self.send(html).is_err() {
      trace!("stream receiver dropped, snippet discarded");
    }
  }
}

/// In-memory sink, drained by whoever produces the response stream.
#[derive(Debug, Clone, Default)]
pub struct ChunkQueue {
  chunks: Arc<Mutex<Vec<String>>>,
}

impl ChunkQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn drain(&self) -> Vec<String> {
    std::mem::take(&mut *self.chunks.lock().unwrap_or_else(PoisonError::into_inner))
  }

  pub fn is_empty(&self) -> bool {
    self.chunks.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
  }
}

impl StreamSink for ChunkQueue {
  fn write(&self, html: String) {
    self.chunks.lock().unwrap_or_else(PoisonError::into_inner).push(html);
  }
}

struct Injection<S> {
  upstream: Pin<Box<S>>,
  session: RenderSession,
  queue: ChunkQueue,
  /// Possibly the last chunk; released once the next one arrives.
  held: Option<String>,
  ready: VecDeque<String>,
  begun: bool,
  finished: bool,
}

impl<S> Injection<S>
where
  S: Stream<Item = Result<String, InjectError>> + Send,
{
  async fn advance(&mut self) -> Result<(), InjectError> {
    match self.upstream.next().await {
      Some(chunk) => {
        let mut chunk = chunk?;
        if !self.begun {
          self.begun = true;
          chunk = self.session.inject_at_document_begin(&chunk).await?;
        }
        if let Some(previous) = self.held.replace(chunk) {
          self.ready.push_back(previous);
          self.ready.extend(self.queue.drain());
        }
      }
      None => {
        self.finished = true;
        if !self.begun {
          self.begun = true;
          self.held = Some(self.session.inject_at_document_begin("").await?);
        }
        let mut last = self.held.take().unwrap_or_default();
        let late = self.queue.drain().concat();
        if !late.is_empty() {
          last = inject_html_snippet(&last, &late, Position::DocumentEnd)?;
        }
        self.ready.push_back(self.session.inject_at_document_end(&last).await?);
      }
    }
    Ok(())
  }
}

/// Inject assets into a streamed document.
///
/// The first chunk receives the head snippets, the last one the
/// document-end snippets. Scripts computed for streaming are emitted right
/// after the chunk that carried the head.
pub fn inject_stream<S>(
  page_context: PageContext,
  deps: InjectDeps,
  chunks: S,
) -> BoxStream<Result<String, InjectError>>
where
  S: Stream<Item = Result<String, InjectError>> + Send + 'static,
{
  let queue = ChunkQueue::new();
  let session = RenderSession::with_stream_sink(page_context, deps, Arc::new(queue.clone()));
  let state = Injection {
    upstream: Box::pin(chunks),
    session,
    queue,
    held: None,
    ready: VecDeque::new(),
    begun: false,
    finished: false,
  };

  Box::pin(stream::unfold(state, |mut state| async move {
    loop {
      if let Some(chunk) = state.ready.pop_front() {
        return Some((Ok(chunk), state));
      }
      if state.finished {
        return None;
      }
      if let Err(e) = state.advance().await {
        state.finished = true;
        state.ready.clear();
        return Some((Err(e), state));
      }
    }
  }))
}
