//! Control-flow components.

mod branch;
mod enumerate;

pub use branch::branch;
pub use enumerate::enumerate;
