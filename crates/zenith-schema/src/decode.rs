//! Structural decoding of JSON values against a [`Schema`].

use serde_json::Value;

use crate::error::DecodeError;
use crate::schema::Schema;

/// The decode capability consumed by the component runtime.
///
/// Implementations return the decoded value on success. A decoder may
/// normalize the value it returns, but must fail with a human-readable
/// [`DecodeError`] when the value does not match.
pub trait Decoder: Send + Sync {
  fn decode(&self, schema: &Schema, value: &Value) -> Result<Value, DecodeError>;
}

/// Checks values structurally without coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl Decoder for StandardDecoder {
  fn decode(&self, schema: &Schema, value: &Value) -> Result<Value, DecodeError> {
    decode_at(schema, value, "")
  }
}

/// Decode `value` against `schema` with the [`StandardDecoder`].
pub fn decode(schema: &Schema, value: &Value) -> Result<Value, DecodeError> {
  StandardDecoder.decode(schema, value)
}

fn decode_at(schema: &Schema, value: &Value, path: &str) -> Result<Value, DecodeError> {
  match schema {
    Schema::Any => Ok(value.clone()),
    Schema::Null => expect(value.is_null(), schema, value, path),
    Schema::Boolean => expect(value.is_boolean(), schema, value, path),
    Schema::Number => expect(value.is_number(), schema, value, path),
    Schema::Integer => expect(is_integer(value), schema, value, path),
    Schema::String => expect(value.is_string(), schema, value, path),

    Schema::Array { items } => {
      let elements = value.as_array().ok_or_else(|| mismatch(schema, value, path))?;
      elements
        .iter()
        .enumerate()
        .map(|(i, element)| decode_at(items, element, &format!("{}/{}", path, i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
    }

    Schema::Object {
      properties,
      required,
      additional_properties,
    } => {
      let object = value.as_object().ok_or_else(|| mismatch(schema, value, path))?;

      for key in required {
        if !object.contains_key(key) {
          return Err(DecodeError::new(
            path,
            format!("missing required property '{}'", key),
          ));
        }
      }

      let mut decoded = serde_json::Map::new();
      for (key, field) in object {
        let field_path = format!("{}/{}", path, key);
        match properties.get(key) {
          Some(field_schema) => {
            decoded.insert(key.clone(), decode_at(field_schema, field, &field_path)?);
          }
          None if *additional_properties => {
            decoded.insert(key.clone(), field.clone());
          }
          None => {
            return Err(DecodeError::new(
              field_path,
              format!("unexpected property '{}'", key),
            ));
          }
        }
      }
      Ok(Value::Object(decoded))
    }

    Schema::Optional { inner } => {
      if value.is_null() {
        Ok(Value::Null)
      } else {
        decode_at(inner, value, path)
      }
    }

    Schema::Union { any_of } => any_of
      .iter()
      .find_map(|alternative| decode_at(alternative, value, path).ok())
      .ok_or_else(|| mismatch(schema, value, path)),

    Schema::Literal { value: expected } => expect(value == expected, schema, value, path),
  }
}

fn expect(ok: bool, schema: &Schema, value: &Value, path: &str) -> Result<Value, DecodeError> {
  if ok {
    Ok(value.clone())
  } else {
    Err(mismatch(schema, value, path))
  }
}

fn mismatch(schema: &Schema, value: &Value, path: &str) -> DecodeError {
  DecodeError::new(
    path,
    format!("expected {}, found {}", schema.describe(), kind_of(value)),
  )
}

fn is_integer(value: &Value) -> bool {
  match value {
    Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
    _ => false,
  }
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
