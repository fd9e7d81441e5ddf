use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structural type of a JSON value.
///
/// Schemas are plain data so that component specs can be authored in JSON:
///
/// ```json
/// { "type": "array", "items": { "type": "number" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
  /// Accepts any value, including `null`.
  Any,
  Null,
  Boolean,
  /// Any JSON number.
  Number,
  /// A JSON number without a fractional part.
  Integer,
  String,
  Array {
    #[serde(default = "any_items")]
    items: Box<Schema>,
  },
  Object {
    #[serde(default)]
    properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,
    /// Whether keys not listed in `properties` are allowed (and kept).
    #[serde(default = "default_true", rename = "additionalProperties")]
    additional_properties: bool,
  },
  /// `null` or a value matching `inner`.
  Optional { inner: Box<Schema> },
  /// The first matching alternative wins.
  Union {
    #[serde(rename = "anyOf")]
    any_of: Vec<Schema>,
  },
  /// Exactly this value.
  Literal { value: serde_json::Value },
}

fn any_items() -> Box<Schema> {
  Box::new(Schema::Any)
}

fn default_true() -> bool {
  true
}

impl Schema {
  pub fn any() -> Self {
    Self::Any
  }

  pub fn null() -> Self {
    Self::Null
  }

  pub fn boolean() -> Self {
    Self::Boolean
  }

  pub fn number() -> Self {
    Self::Number
  }

  pub fn integer() -> Self {
    Self::Integer
  }

  pub fn string() -> Self {
    Self::String
  }

  pub fn array(items: Schema) -> Self {
    Self::Array {
      items: Box::new(items),
    }
  }

  /// An object schema where every listed property is required and extra keys are kept.
  pub fn object<I, K>(properties: I) -> Self
  where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
  {
    let properties: BTreeMap<String, Schema> = properties
      .into_iter()
      .map(|(k, v)| (k.into(), v))
      .collect();
    let required = properties.keys().cloned().collect();
    Self::Object {
      properties,
      required,
      additional_properties: true,
    }
  }

  pub fn optional(inner: Schema) -> Self {
    Self::Optional {
      inner: Box::new(inner),
    }
  }

  pub fn union(any_of: impl IntoIterator<Item = Schema>) -> Self {
    Self::Union {
      any_of: any_of.into_iter().collect(),
    }
  }

  pub fn literal(value: impl Into<serde_json::Value>) -> Self {
    Self::Literal {
      value: value.into(),
    }
  }

  /// Short human-readable name, used in decode error messages.
  pub fn describe(&self) -> String {
    match self {
      Schema::Any => "any".to_string(),
      Schema::Null => "null".to_string(),
      Schema::Boolean => "boolean".to_string(),
      Schema::Number => "number".to_string(),
      Schema::Integer => "integer".to_string(),
      Schema::String => "string".to_string(),
      Schema::Array { items } => format!("array<{}>", items.describe()),
      Schema::Object { .. } => "object".to_string(),
      Schema::Optional { inner } => format!("optional<{}>", inner.describe()),
      Schema::Union { any_of } => any_of
        .iter()
        .map(Schema::describe)
        .collect::<Vec<_>>()
        .join(" | "),
      Schema::Literal { value } => value.to_string(),
    }
  }
}
