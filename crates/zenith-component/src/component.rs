use std::sync::Arc;

use crate::action::Action;
use crate::spec::ComponentSpec;

/// A spec bound to exactly one action.
///
/// Components are never mutated; binding a different action means building a
/// new component. Clones share the spec.
#[derive(Debug, Clone)]
pub struct Component {
  spec: Arc<ComponentSpec>,
  action: Action,
}

impl Component {
  pub fn new(spec: impl Into<Arc<ComponentSpec>>, action: Action) -> Self {
    Self {
      spec: spec.into(),
      action,
    }
  }

  pub fn spec(&self) -> &ComponentSpec {
    &self.spec
  }

  pub(crate) fn shared_spec(&self) -> Arc<ComponentSpec> {
    Arc::clone(&self.spec)
  }

  pub fn action(&self) -> &Action {
    &self.action
  }

  /// The spec label, or `"unknown"`.
  pub fn label(&self) -> &str {
    self.spec.label_or_unknown()
  }
}

/// Binds actions to one spec. See [`new_component`].
#[derive(Debug, Clone)]
pub struct ComponentFactory {
  spec: Arc<ComponentSpec>,
}

impl ComponentFactory {
  pub fn spec(&self) -> &ComponentSpec {
    &self.spec
  }

  /// Build a component from this factory's spec and `action`.
  ///
  /// Nothing is checked here; spec/action mismatches surface when the
  /// component is called.
  pub fn bind(&self, action: Action) -> Component {
    Component::new(Arc::clone(&self.spec), action)
  }
}

/// Start building components for `spec`.
///
/// Declaration and behavior are authored separately and combined with
/// [`ComponentFactory::bind`]:
///
/// ```ignore
/// let branch = new_component(spec).bind(Action::immediate(|ctx| { /* ... */ }));
/// ```
pub fn new_component(spec: ComponentSpec) -> ComponentFactory {
  ComponentFactory {
    spec: Arc::new(spec),
  }
}
