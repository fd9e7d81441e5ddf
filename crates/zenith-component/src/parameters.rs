//! Typed input and output slots, and validation of concrete values against them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zenith_schema::{Decoder, Schema};

use crate::error::ComponentError;
use crate::spec::ComponentSpec;

/// A bag of named values, as passed into or produced by an action.
pub type Values = serde_json::Map<String, Value>;

/// Declaration of one input or output slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub doc: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,

  /// Shape every value of this slot must decode against.
  #[serde(rename = "type")]
  pub schema: Schema,
}

impl ParameterSpec {
  pub fn new(schema: Schema) -> Self {
    Self {
      doc: None,
      label: None,
      schema,
    }
  }

  pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
    self.doc = Some(doc.into());
    self
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }
}

/// Slot name to declaration.
pub type ParameterSet = BTreeMap<String, ParameterSpec>;

/// All inputs and outputs of a component. An absent half accepts/produces nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inputs: Option<ParameterSet>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outputs: Option<ParameterSet>,
}

/// Which half of [`Parameters`] is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
  Inputs,
  Outputs,
}

impl fmt::Display for ParameterKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParameterKind::Inputs => f.write_str("inputs"),
      ParameterKind::Outputs => f.write_str("outputs"),
    }
  }
}

/// Validate a bag of values against one declared parameter set.
///
/// The result contains exactly the declared keys: undeclared keys are dropped
/// and a declared key missing from `values` is decoded as `null` (so it only
/// passes if its schema accepts `null`).
pub fn parse_parameters(
  kind: ParameterKind,
  spec: &ComponentSpec,
  values: Option<&Values>,
  decoder: &dyn Decoder,
) -> Result<Values, ComponentError> {
  let definitions = spec.parameter_set(kind);
  let declared = definitions.map_or(0, |d| d.len());
  let supplied = values.map_or(0, |v| v.len());

  if declared == 0 && supplied > 0 {
    return Err(ComponentError::UnexpectedValues {
      component: spec.label_or_unknown().to_string(),
      kind,
    });
  }
  if declared > 0 && supplied == 0 {
    return Err(ComponentError::MissingValues {
      component: spec.label_or_unknown().to_string(),
      kind,
    });
  }

  let mut parsed = Values::new();
  let (Some(definitions), Some(values)) = (definitions, values) else {
    return Ok(parsed);
  };

  for (key, definition) in definitions {
    let raw = values.get(key).unwrap_or(&Value::Null);
    let value =
      decoder
        .decode(&definition.schema, raw)
        .map_err(|source| ComponentError::InvalidParameter {
          component: spec.label_or_unknown().to_string(),
          kind,
          key: key.clone(),
          source,
        })?;
    parsed.insert(key.clone(), value);
  }

  Ok(parsed)
}

/// Turn a caller-supplied JSON value into a value bag.
///
/// `null` means "no values"; anything other than an object is rejected.
pub fn into_values(
  kind: ParameterKind,
  spec: &ComponentSpec,
  value: Value,
) -> Result<Option<Values>, ComponentError> {
  match value {
    Value::Null => Ok(None),
    Value::Object(values) => Ok(Some(values)),
    other => Err(ComponentError::InvalidValues {
      component: spec.label_or_unknown().to_string(),
      kind,
      found: other.to_string(),
    }),
  }
}

/// Names of the declared inputs.
pub fn input_names(spec: &ComponentSpec) -> Vec<&str> {
  names(spec.parameter_set(ParameterKind::Inputs))
}

/// Names of the declared outputs.
pub fn output_names(spec: &ComponentSpec) -> Vec<&str> {
  names(spec.parameter_set(ParameterKind::Outputs))
}

fn names(set: Option<&ParameterSet>) -> Vec<&str> {
  set
    .map(|set| set.keys().map(String::as_str).collect())
    .unwrap_or_default()
}
