use serde::Deserialize;
use zenith_component::{
  Action, ActionError, CallContext, CompletionPort, Component, ComponentSpec, ParameterSpec,
  PortOptions, PortSpec, Values, new_component,
};
use zenith_schema::Schema;

#[derive(Deserialize)]
struct Inputs {
  condition: bool,
}

fn spec() -> ComponentSpec {
  ComponentSpec::new("Branch")
    .with_doc("Branches based on the condition")
    .with_input(
      "condition",
      ParameterSpec::new(Schema::boolean()).with_doc("The condition to check"),
    )
    .with_outlet("true", PortSpec::new().with_doc("Called if the condition is true"))
    .with_outlet("false", PortSpec::new().with_doc("Called if the condition is false"))
    // The outlets already tell when the branch is done.
    .with_port_options(PortOptions {
      completion_port: Some(CompletionPort {
        hide: Some(true),
        ..CompletionPort::default()
      }),
      execution_port: None,
    })
}

fn run(ctx: CallContext) -> Result<Option<Values>, ActionError> {
  let Inputs { condition } = ctx.inputs_as()?;
  ctx.notify_outlet(if condition { "true" } else { "false" });
  Ok(None)
}

/// Raise outlet `true` or `false` depending on `condition`. Produces no output.
pub fn branch() -> Component {
  new_component(spec()).bind(Action::immediate(run))
}
