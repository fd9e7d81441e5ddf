//! Zenith Std
//!
//! Ready-made components:
//! - [`branch`]: raises `true` or `false` depending on a condition.
//! - [`enumerate`]: streams every element of a collection, stoppable through
//!   its `break` inlet.
//! - [`sum`]: adds up an array of numbers.
//!
//! [`catalog`] lists all of them and [`find`] looks one up by label.

mod catalog;
mod flow;
mod math;

pub use catalog::{catalog, find};
pub use flow::{branch, enumerate};
pub use math::sum;
