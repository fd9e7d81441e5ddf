//! Unobserved execution.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument};
use zenith_component::{Component, ComponentError, Values};
use zenith_schema::{Decoder, StandardDecoder};

use crate::exec::Execution;

/// A component wrapped as a plain async function.
///
/// No emitter is attached: outlets raised by the action go nowhere and inlets
/// it registers can never fire.
#[derive(Clone)]
pub struct CallableComponent {
  component: Component,
  decoder: Arc<dyn Decoder>,
}

/// Wrap `component` for unobserved calls.
pub fn new_callable_component(component: Component) -> CallableComponent {
  CallableComponent::with_decoder(component, Arc::new(StandardDecoder))
}

impl CallableComponent {
  /// Wrap `component`, validating parameters with `decoder`.
  pub fn with_decoder(component: Component, decoder: Arc<dyn Decoder>) -> Self {
    Self { component, decoder }
  }

  pub fn component(&self) -> &Component {
    &self.component
  }

  /// Run one call.
  ///
  /// `inputs` is a JSON object, or `null` for a component without inputs.
  /// Streaming actions are drained; only their last output is returned.
  /// Any failure, validation or action, is returned as an error.
  #[instrument(
    name = "component_call",
    skip_all,
    fields(component = %self.component.label(), mode = "callable")
  )]
  pub async fn call(&self, inputs: Value) -> Result<Option<Values>, ComponentError> {
    info!("call_started");

    let execution = Execution {
      component: &self.component,
      decoder: self.decoder.as_ref(),
      emitter: None,
    };
    let result = execution.run(inputs, |_| {}).await;

    match &result {
      Ok(output) => info!(produced_output = output.is_some(), "call_completed"),
      Err(e) => error!(error = %e, "call_failed"),
    }
    result
  }
}

impl std::fmt::Debug for CallableComponent {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CallableComponent")
      .field("component", &self.component)
      .finish_non_exhaustive()
  }
}
