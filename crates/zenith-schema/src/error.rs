use thiserror::Error;

/// A value did not match its schema.
///
/// `path` is a JSON-pointer-like location inside the decoded value
/// (empty for the root).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}{}", location(.path))]
pub struct DecodeError {
  pub path: String,
  pub message: String,
}

impl DecodeError {
  pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      message: message.into(),
    }
  }
}

fn location(path: &str) -> String {
  if path.is_empty() {
    String::new()
  } else {
    format!(" at {}", path)
  }
}
