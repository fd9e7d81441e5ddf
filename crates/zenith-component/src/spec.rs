use serde::{Deserialize, Serialize};

use crate::parameters::{ParameterKind, ParameterSet, ParameterSpec, Parameters};
use crate::ports::{PortOptions, PortSpec, Ports};

/// Label used in diagnostics when a spec has none.
const UNKNOWN_LABEL: &str = "unknown";

/// The contract of a component: what it consumes, produces and signals.
///
/// A spec is plain data and never changes once built. It can be authored in
/// Rust with the `with_*` builders or loaded from JSON:
///
/// ```json
/// {
///   "label": "Branch",
///   "parameters": { "inputs": { "condition": { "type": { "type": "boolean" } } } },
///   "ports": { "outlets": { "true": {}, "false": {} } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub doc: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parameters: Option<Parameters>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ports: Option<Ports>,
}

impl ComponentSpec {
  /// Create an empty spec with the given label.
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: Some(label.into()),
      ..Self::default()
    }
  }

  /// Parse a spec from its JSON representation.
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  /// The label, or `"unknown"` when none was declared.
  pub fn label_or_unknown(&self) -> &str {
    self.label.as_deref().unwrap_or(UNKNOWN_LABEL)
  }

  /// The declared parameter set for inputs or outputs, if any.
  pub fn parameter_set(&self, kind: ParameterKind) -> Option<&ParameterSet> {
    let parameters = self.parameters.as_ref()?;
    match kind {
      ParameterKind::Inputs => parameters.inputs.as_ref(),
      ParameterKind::Outputs => parameters.outputs.as_ref(),
    }
  }

  pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
    self.doc = Some(doc.into());
    self
  }

  pub fn with_input(self, name: impl Into<String>, parameter: ParameterSpec) -> Self {
    self.with_parameter(ParameterKind::Inputs, name, parameter)
  }

  pub fn with_output(self, name: impl Into<String>, parameter: ParameterSpec) -> Self {
    self.with_parameter(ParameterKind::Outputs, name, parameter)
  }

  pub fn with_inlet(mut self, name: impl Into<String>, port: PortSpec) -> Self {
    self
      .ports
      .get_or_insert_with(Ports::default)
      .inlets
      .get_or_insert_with(Default::default)
      .insert(name.into(), port);
    self
  }

  pub fn with_outlet(mut self, name: impl Into<String>, port: PortSpec) -> Self {
    self
      .ports
      .get_or_insert_with(Ports::default)
      .outlets
      .get_or_insert_with(Default::default)
      .insert(name.into(), port);
    self
  }

  pub fn with_port_options(mut self, options: PortOptions) -> Self {
    self.ports.get_or_insert_with(Ports::default).options = Some(options);
    self
  }

  fn with_parameter(
    mut self,
    kind: ParameterKind,
    name: impl Into<String>,
    parameter: ParameterSpec,
  ) -> Self {
    let parameters = self.parameters.get_or_insert_with(Parameters::default);
    let set = match kind {
      ParameterKind::Inputs => &mut parameters.inputs,
      ParameterKind::Outputs => &mut parameters.outputs,
    };
    set
      .get_or_insert_with(Default::default)
      .insert(name.into(), parameter);
    self
  }
}
