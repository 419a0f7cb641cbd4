//! Values that arrive as either a JSON string or a JSON integer.
//!
//! Some APIs send `"id": 42` on one endpoint and `"id": "42"` on another.
//! [`Flexible<T>`] accepts both for `String` and `i64` targets:
//!
//! ```
//! use kitbag_types::Flexible;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Product {
//!     int_id: Flexible<i64>,
//!     #[serde(deserialize_with = "kitbag_types::flexible::string")]
//!     string_id: String,
//! }
//!
//! let product: Product = serde_json::from_str(r#"{"int_id": "7", "string_id": 7}"#).unwrap();
//! assert_eq!(*product.int_id, 7);
//! assert_eq!(product.string_id, "7");
//! ```

use std::fmt;
use std::ops::Deref;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlexibleError {
    #[error("invalid int value '{0}'")]
    InvalidInt(String),
}

/// A target type that can be built from either representation.
pub trait FlexibleValue: Sized {
    fn from_int(value: i64) -> Result<Self, FlexibleError>;
    fn from_text(value: String) -> Result<Self, FlexibleError>;
}

impl FlexibleValue for String {
    fn from_int(value: i64) -> Result<Self, FlexibleError> {
        Ok(value.to_string())
    }

    fn from_text(value: String) -> Result<Self, FlexibleError> {
        Ok(value)
    }
}

impl FlexibleValue for i64 {
    fn from_int(value: i64) -> Result<Self, FlexibleError> {
        Ok(value)
    }

    fn from_text(value: String) -> Result<Self, FlexibleError> {
        value.parse().map_err(|_| FlexibleError::InvalidInt(value))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Flexible<T>(pub T);

impl<T> Flexible<T> {
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Flexible<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Display> fmt::Display for Flexible<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de, T: FlexibleValue> Deserialize<'de> for Flexible<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Raw::deserialize(deserializer)
            .map_err(|_| D::Error::custom("expected a string or an integer"))?;
        let value = match raw {
            Raw::Int(value) => T::from_int(value),
            Raw::Text(value) => T::from_text(value),
        };
        value.map(Flexible).map_err(D::Error::custom)
    }
}

impl<T: Serialize> Serialize for Flexible<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// `deserialize_with` helper for `String` fields.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Flexible::<String>::deserialize(deserializer).map(Flexible::into_inner)
}

/// `deserialize_with` helper for `i64` fields.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Flexible::<i64>::deserialize(deserializer).map(Flexible::into_inner)
}
