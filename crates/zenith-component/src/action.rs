//! The executable body of a component.
//!
//! An action comes in one of two explicitly tagged shapes:
//! - [`ActionKind::Single`]: produces at most one output, either immediately
//!   ([`Action::immediate`]) or after awaiting ([`Action::deferred`]).
//! - [`ActionKind::Stream`]: produces a sequence of outputs
//!   ([`Action::stream`]), each validated and observable on its own.
//!
//! The engine dispatches on the tag; it never inspects what a body returns.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt as _};
use futures::stream::{BoxStream, Stream, StreamExt as _};
use thiserror::Error;

use crate::context::CallContext;
use crate::parameters::Values;

/// Future returned by a single-shot body.
pub type ActionFuture = BoxFuture<'static, Result<Option<Values>, ActionError>>;

/// Stream returned by a streaming body.
pub type ActionStream = BoxStream<'static, Result<Values, ActionError>>;

/// Failure raised by an action body.
#[derive(Debug, Error)]
pub enum ActionError {
  #[error("{0}")]
  Message(String),

  /// The inputs could not be read into the body's own input type.
  #[error("failed to read inputs: {0}")]
  Inputs(#[from] serde_json::Error),

  #[error(transparent)]
  Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
  pub fn msg(message: impl Into<String>) -> Self {
    Self::Message(message.into())
  }

  pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Other(Box::new(error))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
  Single,
  Stream,
}

/// A component body, tagged with its shape.
#[derive(Clone)]
pub enum Action {
  Single(Arc<dyn Fn(CallContext) -> ActionFuture + Send + Sync>),
  Stream(Arc<dyn Fn(CallContext) -> ActionStream + Send + Sync>),
}

impl Action {
  /// A body that runs to completion as soon as it is invoked.
  pub fn immediate<F>(body: F) -> Self
  where
    F: Fn(CallContext) -> Result<Option<Values>, ActionError> + Send + Sync + 'static,
  {
    Action::Single(Arc::new(move |ctx| future::ready(body(ctx)).boxed()))
  }

  /// A body that produces its single output after awaiting.
  pub fn deferred<F, Fut>(body: F) -> Self
  where
    F: Fn(CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Values>, ActionError>> + Send + 'static,
  {
    Action::Single(Arc::new(move |ctx| body(ctx).boxed()))
  }

  /// A body that yields a sequence of outputs.
  pub fn stream<F, S>(body: F) -> Self
  where
    F: Fn(CallContext) -> S + Send + Sync + 'static,
    S: Stream<Item = Result<Values, ActionError>> + Send + 'static,
  {
    Action::Stream(Arc::new(move |ctx| body(ctx).boxed()))
  }

  pub fn kind(&self) -> ActionKind {
    match self {
      Action::Single(_) => ActionKind::Single,
      Action::Stream(_) => ActionKind::Stream,
    }
  }
}

impl fmt::Debug for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Action").field(&self.kind()).finish()
  }
}
