//! Named, payload-less signal ports.
//!
//! Inlets let the outside world influence a running call (e.g. `break` out of
//! a loop); outlets let a call announce something happened (e.g. `onElement`).
//! A port carries no data, only its name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::Channel;
use crate::spec::ComponentSpec;

/// Declaration of one inlet or outlet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub doc: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl PortSpec {
  pub fn new() -> Self {
    Self::default()
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

/// All inlets and outlets of a component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ports {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inlets: Option<BTreeMap<String, PortSpec>>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outlets: Option<BTreeMap<String, PortSpec>>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<PortOptions>,
}

/// Reserved system ports, distinct from user-declared ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortOptions {
  /// Signals that the component finished its work.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completion_port: Option<CompletionPort>,

  /// Starts execution. Not visible to the action itself.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_port: Option<PortSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionPort {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub doc: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,

  /// Hide the completion port, typically because named outlets already
  /// signal completion.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hide: Option<bool>,
}

/// Names of the declared inlets.
pub fn inlet_names(spec: &ComponentSpec) -> Vec<&str> {
  port_names(spec.ports.as_ref().and_then(|p| p.inlets.as_ref()))
}

/// Names of the declared outlets.
pub fn outlet_names(spec: &ComponentSpec) -> Vec<&str> {
  port_names(spec.ports.as_ref().and_then(|p| p.outlets.as_ref()))
}

/// Every port event channel the spec implies: one per outlet, then one per inlet.
pub fn port_channels(spec: &ComponentSpec) -> Vec<Channel> {
  outlet_names(spec)
    .into_iter()
    .map(|name| Channel::Outlet(name.to_string()))
    .chain(
      inlet_names(spec)
        .into_iter()
        .map(|name| Channel::Inlet(name.to_string())),
    )
    .collect()
}

/// Whether the completion port is shown. Only an explicit `hide: true` hides it.
pub fn completion_port_visible(spec: &ComponentSpec) -> bool {
  let hide = spec
    .ports
    .as_ref()
    .and_then(|p| p.options.as_ref())
    .and_then(|o| o.completion_port.as_ref())
    .and_then(|c| c.hide)
    .unwrap_or(false);
  !hide
}

fn port_names(ports: Option<&BTreeMap<String, PortSpec>>) -> Vec<&str> {
  ports
    .map(|ports| ports.keys().map(String::as_str).collect())
    .unwrap_or_default()
}
