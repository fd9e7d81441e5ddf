use serde::Deserialize;
use serde_json::{Number, Value};
use zenith_component::{
  Action, ActionError, CallContext, Component, ComponentSpec, ParameterSpec, Values,
  new_component,
};
use zenith_schema::Schema;

#[derive(Deserialize)]
struct Inputs {
  numbers: Vec<Number>,
}

fn spec() -> ComponentSpec {
  ComponentSpec::new("Sum")
    .with_doc("Adds up an array of numbers")
    .with_input(
      "numbers",
      ParameterSpec::new(Schema::array(Schema::number())).with_doc("The numbers to sum"),
    )
    .with_output(
      "sum",
      ParameterSpec::new(Schema::number()).with_doc("The sum of the numbers"),
    )
}

/// Integers add up exactly while they fit in an `i64`; anything else is
/// summed as floats.
fn total(numbers: &[Number]) -> Value {
  numbers
    .iter()
    .try_fold(0i64, |acc, n| n.as_i64().and_then(|n| acc.checked_add(n)))
    .map(Value::from)
    .unwrap_or_else(|| Value::from(numbers.iter().filter_map(Number::as_f64).sum::<f64>()))
}

fn run(ctx: CallContext) -> Result<Option<Values>, ActionError> {
  let Inputs { numbers } = ctx.inputs_as()?;
  let mut output = Values::new();
  output.insert("sum".to_string(), total(&numbers));
  Ok(Some(output))
}

/// Add up `numbers` into `sum`.
pub fn sum() -> Component {
  new_component(spec()).bind(Action::immediate(run))
}
