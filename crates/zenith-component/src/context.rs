//! The per-call handle given to an action.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};
use zenith_schema::Decoder;

use crate::action::ActionError;
use crate::component::Component;
use crate::error::ComponentError;
use crate::events::{Channel, Emitter, Event};
use crate::parameters::{ParameterKind, Values, parse_parameters};
use crate::ports::{inlet_names, outlet_names};
use crate::spec::ComponentSpec;

/// Everything an action can see of its call.
///
/// A context is created for one call and dropped with it. When the call is not
/// observed (no emitter attached), raising outlets and registering inlets are
/// harmless no-ops, so actions never need to know how they are run.
#[derive(Debug, Clone)]
pub struct CallContext {
  spec: Arc<ComponentSpec>,
  inputs: Values,
  emitter: Option<Emitter>,
}

impl CallContext {
  /// Validate `inputs` against the component's declared inputs and build the
  /// context. Fails before any action code runs.
  pub fn new(
    component: &Component,
    inputs: Option<&Values>,
    emitter: Option<Emitter>,
    decoder: &dyn Decoder,
  ) -> Result<Self, ComponentError> {
    let inputs = parse_parameters(ParameterKind::Inputs, component.spec(), inputs, decoder)?;
    Ok(Self {
      spec: component.shared_spec(),
      inputs,
      emitter,
    })
  }

  /// The validated inputs: exactly the declared keys.
  pub fn inputs(&self) -> &Values {
    &self.inputs
  }

  pub fn input(&self, key: &str) -> Option<&Value> {
    self.inputs.get(key)
  }

  /// Read the validated inputs into the action's own type.
  pub fn inputs_as<T: DeserializeOwned>(&self) -> Result<T, ActionError> {
    Ok(serde_json::from_value(Value::Object(self.inputs.clone()))?)
  }

  /// Whether an emitter is attached to this call.
  pub fn is_observed(&self) -> bool {
    self.emitter.is_some()
  }

  /// Raise an outlet.
  ///
  /// Publishes on the broad [`Channel::OutletRaised`] channel and then on the
  /// outlet's own channel, each only if it has subscribers. An outlet nobody
  /// handles is reported at trace level and otherwise ignored.
  pub fn notify_outlet(&self, name: &str) {
    if !outlet_names(&self.spec).contains(&name) {
      warn!(
        component = %self.spec.label_or_unknown(),
        outlet = name,
        "outlet is not declared by component"
      );
    }

    let mut notified = false;
    if let Some(emitter) = &self.emitter {
      if emitter.has_subscribers(&Channel::OutletRaised) {
        emitter.publish(Event::OutletRaised(name.to_string()));
        notified = true;
      }
      if emitter.has_subscribers(&Channel::Outlet(name.to_string())) {
        emitter.publish(Event::Outlet(name.to_string()));
        notified = true;
      }
    }

    if !notified {
      trace!(
        component = %self.spec.label_or_unknown(),
        outlet = name,
        "outlet was raised and not handled"
      );
    }
  }

  /// Run `handler` whenever the host notifies inlet `name` during this call.
  ///
  /// Does nothing when the call is not observed.
  pub fn register_inlet<F>(&self, name: &str, handler: F)
  where
    F: Fn() + Send + Sync + 'static,
  {
    if !inlet_names(&self.spec).contains(&name) {
      warn!(
        component = %self.spec.label_or_unknown(),
        inlet = name,
        "inlet is not declared by component"
      );
    }

    if let Some(emitter) = &self.emitter {
      emitter.on(Channel::Inlet(name.to_string()), move |_| handler());
    }
  }

  /// Register inlet `name` as a flag that flips to `true` once notified.
  ///
  /// This is the usual way for an action to react to cooperative
  /// cancellation, e.g. a `break` inlet checked between iterations.
  pub fn inlet_flag(&self, name: &str) -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);
    self.register_inlet(name, move || raised.store(true, Ordering::SeqCst));
    flag
  }
}
