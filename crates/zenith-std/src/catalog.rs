use zenith_component::Component;

use crate::{branch, enumerate, sum};

/// Every component this crate provides, in label order.
pub fn catalog() -> Vec<Component> {
  vec![branch(), enumerate(), sum()]
}

/// Look up a component by label, ignoring ASCII case.
pub fn find(name: &str) -> Option<Component> {
  catalog()
    .into_iter()
    .find(|component| component.label().eq_ignore_ascii_case(name))
}
