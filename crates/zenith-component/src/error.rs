use thiserror::Error;
use zenith_schema::DecodeError;

use crate::action::ActionError;
use crate::parameters::ParameterKind;

/// Errors that can fail a component call.
#[derive(Debug, Error)]
pub enum ComponentError {
  /// Values were supplied for a parameter set the component does not declare.
  #[error("component ({component}) does not define any {kind}, but values were provided")]
  UnexpectedValues {
    component: String,
    kind: ParameterKind,
  },

  /// A declared, non-empty parameter set received no values.
  #[error("component ({component}) defines {kind}, but no values were provided")]
  MissingValues {
    component: String,
    kind: ParameterKind,
  },

  /// A declared value failed schema decoding.
  #[error("component ({component}) failed to parse \"{key}\" of {kind}: {source}")]
  InvalidParameter {
    component: String,
    kind: ParameterKind,
    key: String,
    #[source]
    source: DecodeError,
  },

  /// The supplied value bag is neither an object nor null.
  #[error("component ({component}) expects {kind} as an object, found {found}")]
  InvalidValues {
    component: String,
    kind: ParameterKind,
    found: String,
  },

  /// The action itself failed.
  #[error("component ({component}) action failed: {source}")]
  BodyFailure {
    component: String,
    #[source]
    source: ActionError,
  },

  /// An observable component was called while a previous call was still running.
  #[error("component ({component}) is already running a call")]
  CallInProgress { component: String },
}

impl ComponentError {
  /// Label of the component the error originated from.
  pub fn component(&self) -> &str {
    match self {
      ComponentError::UnexpectedValues { component, .. }
      | ComponentError::MissingValues { component, .. }
      | ComponentError::InvalidParameter { component, .. }
      | ComponentError::InvalidValues { component, .. }
      | ComponentError::BodyFailure { component, .. }
      | ComponentError::CallInProgress { component } => component,
    }
  }

  /// Whether the error came from parameter validation rather than the action.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      ComponentError::UnexpectedValues { .. }
        | ComponentError::MissingValues { .. }
        | ComponentError::InvalidParameter { .. }
        | ComponentError::InvalidValues { .. }
    )
  }
}
