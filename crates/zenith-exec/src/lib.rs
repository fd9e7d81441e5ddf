//! Zenith Exec
//!
//! This crate runs components. Both entry points share one execution routine:
//!
//! ```text
//! inputs ──▶ validate inputs ──▶ action ──▶ validate each output ──▶ result
//!                                  │                 │
//!                          outlets / inlets    output events
//!                                  └──── Emitter ────┘  (observable only)
//! ```
//!
//! - [`new_callable_component`]: plain `call(inputs) -> outputs`. Nothing is
//!   observed; streaming actions are drained and the last output is returned.
//! - [`new_observable_component`]: returns an [`Emitter`] plus the callable.
//!   Each call publishes port, output, error and end events to whoever
//!   subscribed, then removes every listener.
//!
//! # Usage
//!
//! ```ignore
//! use zenith_exec::{new_observable_component, Channel};
//!
//! let (emitter, enumerate) = new_observable_component(component);
//! emitter.on(Channel::Output, |event| println!("{:?}", event));
//! let last = enumerate.call(json!({ "collection": [1, 2, 3] })).await?;
//! ```
//!
//! [`Emitter`]: zenith_component::Emitter

mod callable;
mod exec;
mod observable;

pub use callable::{CallableComponent, new_callable_component};
pub use observable::{ObservableComponent, new_observable_component};

pub use zenith_component::{Channel, ComponentError, Emitter, Event, Values};
