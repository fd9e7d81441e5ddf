//! Zenith Component
//!
//! This crate defines what a component is: a declarative [`ComponentSpec`]
//! (typed input/output [`Parameters`] and payload-less signal [`Ports`]) bound
//! to one executable [`Action`].
//!
//! It also provides the per-call pieces an action interacts with:
//! - [`CallContext`]: validated inputs plus outlet/inlet signalling.
//! - [`Emitter`]: the typed event dispatcher observers subscribe to.
//!
//! Executing components lives in `zenith-exec`.
//!
//! # Usage
//!
//! ```ignore
//! use zenith_component::{Action, ComponentSpec, ParameterSpec, new_component};
//! use zenith_schema::Schema;
//!
//! let spec = ComponentSpec::new("Sum")
//!   .with_input("numbers", ParameterSpec::new(Schema::array(Schema::number())))
//!   .with_output("sum", ParameterSpec::new(Schema::number()));
//!
//! let sum = new_component(spec).bind(Action::immediate(|ctx| { /* ... */ }));
//! ```

mod action;
mod component;
mod context;
mod error;
mod events;
mod parameters;
mod ports;
mod spec;

pub use action::{Action, ActionError, ActionFuture, ActionKind, ActionStream};
pub use component::{Component, ComponentFactory, new_component};
pub use context::CallContext;
pub use error::ComponentError;
pub use events::{Channel, Emitter, Event, Listener, ListenerId};
pub use parameters::{
  ParameterKind, ParameterSet, ParameterSpec, Parameters, Values, input_names, into_values,
  output_names, parse_parameters,
};
pub use ports::{
  CompletionPort, PortOptions, PortSpec, Ports, completion_port_visible, inlet_names,
  outlet_names, port_channels,
};
pub use spec::ComponentSpec;
