//! Observed execution.
//!
//! A call moves through `idle → running → outputs* → completed | failed →
//! torn down`. Events are only published on channels that have subscribers:
//!
//! - `Output` for every validated output, in the order the action produced them.
//! - `Error` when the call fails. Without an `Error` subscriber the failure is
//!   returned to the caller instead.
//! - `End` exactly once, after every other event of the call.
//!
//! Teardown removes every listener from the emitter, whether the call
//! completed, failed, or its future was dropped halfway.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::{error, info, instrument, trace};
use zenith_component::{Channel, Component, ComponentError, Emitter, Event, Values};
use zenith_schema::{Decoder, StandardDecoder};

use crate::exec::Execution;

/// A component whose calls publish lifecycle events to an [`Emitter`].
///
/// Clones share the component and the emitter. One call runs at a time;
/// use separate [`new_observable_component`] pairs for concurrent calls.
#[derive(Clone)]
pub struct ObservableComponent {
  inner: Arc<Inner>,
}

struct Inner {
  component: Component,
  decoder: Arc<dyn Decoder>,
  emitter: Emitter,
  running: AtomicBool,
}

/// Wrap `component` for observed calls.
///
/// Returns the emitter to subscribe on and the component to call. Listeners
/// live for a single call: subscribe before each call.
pub fn new_observable_component(component: Component) -> (Emitter, ObservableComponent) {
  ObservableComponent::with_decoder(component, Arc::new(StandardDecoder))
}

impl ObservableComponent {
  /// Like [`new_observable_component`], validating parameters with `decoder`.
  pub fn with_decoder(component: Component, decoder: Arc<dyn Decoder>) -> (Emitter, Self) {
    let emitter = Emitter::new();
    let observable = Self {
      inner: Arc::new(Inner {
        component,
        decoder,
        emitter: emitter.clone(),
        running: AtomicBool::new(false),
      }),
    };
    (emitter, observable)
  }

  pub fn component(&self) -> &Component {
    &self.inner.component
  }

  /// Run one observed call.
  ///
  /// Returns the last output the action produced, whether or not it was
  /// published. When the call fails and someone listens on `Error`, the
  /// failure is published and the call resolves to `None`.
  #[instrument(
    name = "component_call",
    skip_all,
    fields(component = %self.inner.component.label(), mode = "observable")
  )]
  pub async fn call(&self, inputs: Value) -> Result<Option<Values>, ComponentError> {
    let inner: &Inner = &self.inner;
    if inner.running.swap(true, Ordering::AcqRel) {
      return Err(ComponentError::CallInProgress {
        component: inner.component.label().to_string(),
      });
    }
    let _teardown = Teardown { inner };

    info!(subscribed = ?inner.emitter.channels(), "call_started");

    let emitter = &inner.emitter;
    let execution = Execution {
      component: &inner.component,
      decoder: inner.decoder.as_ref(),
      emitter: Some(emitter.clone()),
    };
    let result = execution
      .run(inputs, |output| {
        if emitter.has_subscribers(&Channel::Output) {
          emitter.publish(Event::Output(output.clone()));
        }
      })
      .await;

    let outcome = match result {
      Ok(output) => {
        info!(produced_output = output.is_some(), "call_completed");
        Ok(output)
      }
      Err(e) => {
        error!(error = %e, "call_failed");
        if emitter.has_subscribers(&Channel::Error) {
          emitter.publish(Event::Error(Arc::new(e)));
          Ok(None)
        } else {
          Err(e)
        }
      }
    };

    if emitter.has_subscribers(&Channel::End) {
      emitter.publish(Event::End);
    }
    outcome
  }

  /// Notify inlet `name` of the running call, if the action registered it.
  pub fn notify_inlet(&self, name: &str) {
    let emitter = &self.inner.emitter;
    if emitter.has_subscribers(&Channel::Inlet(name.to_string())) {
      emitter.publish(Event::Inlet(name.to_string()));
    } else {
      trace!(
        component = %self.inner.component.label(),
        inlet = name,
        "inlet notified without a handler"
      );
    }
  }

  /// Whether a call is currently running.
  pub fn is_running(&self) -> bool {
    self.inner.running.load(Ordering::Acquire)
  }
}

impl std::fmt::Debug for ObservableComponent {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ObservableComponent")
      .field("component", &self.inner.component)
      .field("emitter", &self.inner.emitter)
      .field("running", &self.is_running())
      .finish_non_exhaustive()
  }
}

/// Ends the call scope: drops every listener and frees the component for
/// the next call. Runs on every exit path, including a dropped call future.
struct Teardown<'a> {
  inner: &'a Inner,
}

impl Drop for Teardown<'_> {
  fn drop(&mut self) {
    self.inner.emitter.clear();
    self.inner.running.store(false, Ordering::Release);
  }
}
