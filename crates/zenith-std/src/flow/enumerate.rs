use std::sync::atomic::Ordering;

use async_stream::stream;
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use zenith_component::{
  Action, ActionError, CallContext, Component, ComponentSpec, ParameterSpec, PortSpec, Values,
  new_component,
};
use zenith_schema::Schema;

#[derive(Deserialize)]
struct Inputs {
  collection: Vec<Value>,
}

fn spec() -> ComponentSpec {
  ComponentSpec::new("Enumerate")
    .with_doc("Enumerates over a collection")
    .with_input(
      "collection",
      ParameterSpec::new(Schema::array(Schema::any()))
        .with_doc("The collection to enumerate over"),
    )
    .with_output(
      "element",
      ParameterSpec::new(Schema::any()).with_doc("The current item in the collection"),
    )
    .with_output(
      "elementIndex",
      ParameterSpec::new(Schema::number()).with_doc("The index of the current item"),
    )
    .with_inlet("break", PortSpec::new().with_doc("Breaks out of the loop"))
    .with_outlet(
      "onElement",
      PortSpec::new().with_doc("Called for each item in the collection"),
    )
}

fn run(ctx: CallContext) -> impl Stream<Item = Result<Values, ActionError>> {
  let halt = ctx.inlet_flag("break");
  stream! {
    let inputs: Inputs = match ctx.inputs_as() {
      Ok(inputs) => inputs,
      Err(e) => {
        yield Err(e);
        return;
      }
    };

    for (index, element) in inputs.collection.into_iter().enumerate() {
      if halt.load(Ordering::SeqCst) {
        debug!(element_index = index, "enumeration halted");
        break;
      }

      let mut output = Values::new();
      output.insert("element".to_string(), element);
      output.insert("elementIndex".to_string(), Value::from(index));
      yield Ok(output);

      ctx.notify_outlet("onElement");
    }
  }
}

/// Stream `{ element, elementIndex }` for every item of `collection`, raising
/// `onElement` after each one. Notifying `break` stops before the next item.
pub fn enumerate() -> Component {
  new_component(spec()).bind(Action::stream(run))
}
