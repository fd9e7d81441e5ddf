//! The execution routine shared by callable and observable calls.

use futures::StreamExt as _;
use serde_json::Value;
use tracing::debug;
use zenith_component::{
  Action, CallContext, Component, ComponentError, Emitter, ParameterKind, Values, into_values,
  output_names, parse_parameters,
};
use zenith_schema::Decoder;

/// Everything one execution needs.
pub(crate) struct Execution<'a> {
  pub component: &'a Component,
  pub decoder: &'a dyn Decoder,
  /// Attached to the call context when the call is observed.
  pub emitter: Option<Emitter>,
}

impl Execution<'_> {
  /// Run the action once.
  ///
  /// Every output the action produces is validated and handed to `on_output`
  /// in order; the last one is returned. A single-shot action that returns
  /// nothing yields `None` and never reaches `on_output`.
  pub async fn run<F>(self, inputs: Value, mut on_output: F) -> Result<Option<Values>, ComponentError>
  where
    F: FnMut(&Values),
  {
    let Execution {
      component,
      decoder,
      emitter,
    } = self;

    let inputs = into_values(ParameterKind::Inputs, component.spec(), inputs)?;
    let ctx = CallContext::new(component, inputs.as_ref(), emitter, decoder)?;

    match component.action() {
      Action::Single(body) => {
        let Some(output) = body(ctx).await.map_err(|source| body_failure(component, source))? else {
          return Ok(None);
        };
        let output = validate_output(component, decoder, output)?;
        on_output(&output);
        Ok(Some(output))
      }

      Action::Stream(body) => {
        let mut outputs = body(ctx);
        let mut last = None;
        while let Some(output) = outputs.next().await {
          let output = output.map_err(|source| body_failure(component, source))?;
          let output = validate_output(component, decoder, output)?;
          on_output(&output);
          last = Some(output);
        }

        if last.is_none() && !output_names(component.spec()).is_empty() {
          debug!(
            component = %component.label(),
            "stream completed without producing outputs"
          );
        }
        Ok(last)
      }
    }
  }
}

fn validate_output(
  component: &Component,
  decoder: &dyn Decoder,
  output: Values,
) -> Result<Values, ComponentError> {
  let output = parse_parameters(
    ParameterKind::Outputs,
    component.spec(),
    Some(&output),
    decoder,
  )?;
  debug!(component = %component.label(), output = ?output, "output validated");
  Ok(output)
}

fn body_failure(component: &Component, source: zenith_component::ActionError) -> ComponentError {
  ComponentError::BodyFailure {
    component: component.label().to_string(),
    source,
  }
}
