//! Arithmetic components.

mod sum;

pub use sum::sum;
