//! Zenith Schema
//!
//! This crate provides the schema language used to type component parameters,
//! and the `decode` capability the runtime consumes to validate raw values
//! against it.
//!
//! The runtime only depends on the [`Decoder`] trait. [`StandardDecoder`] is the
//! default implementation: it checks JSON values structurally and never coerces
//! (a string `"1"` is not a number).
//!
//! # Usage
//!
//! ```ignore
//! use zenith_schema::{Schema, decode};
//!
//! let schema = Schema::array(Schema::number());
//! let value = decode(&schema, &serde_json::json!([1, 2]))?;
//! ```

mod decode;
mod error;
mod schema;

pub use decode::{Decoder, StandardDecoder, decode};
pub use error::DecodeError;
pub use schema::Schema;
