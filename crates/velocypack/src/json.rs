//! Conversion between JSON text and VelocyPack.
//!
//! Parsing goes through `serde_json::Value` (with `preserve_order`, so object
//! keys keep their document order until the builder sorts the index table).
//! Dumping walks a [`Slice`] and produces a `serde_json::Value`.
//!
//! # Example
//!
//! ```
//! use velocypack::json::Parser;
//!
//! let builder = Parser::from_json(r#"{"name": "alice", "age": 30}"#).unwrap();
//! let slice = builder.slice().unwrap();
//! assert_eq!(slice.get("age").unwrap().get_uint().unwrap(), 30);
//! assert_eq!(slice.to_json().unwrap(), r#"{"age":30,"name":"alice"}"#);
//! ```
//!
//! # VelocyPack to JSON Mapping
//!
//! | VelocyPack               | JSON                                      |
//! |--------------------------|-------------------------------------------|
//! | null                     | null                                      |
//! | bool                     | true/false                                |
//! | int, uint, smallint      | integer                                   |
//! | double                   | number (non-finite values are unsupported)|
//! | string                   | string                                    |
//! | array / object           | array / object (index table order)        |
//! | binary                   | unsupported, base64 string when converted |
//! | utc-date                 | unsupported, integer when converted       |
//! | none, illegal, min/max-key, external, bcd | unsupported, null when converted |
//! | custom                   | whatever the custom type handler returns  |

use std::fmt;

use base64::Engine;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::options::{Options, UnsupportedTypeBehavior};
use crate::slice::{Slice, TypedValue};

/// Builds VelocyPack from JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    /// Parse JSON into a new builder using the default options.
    ///
    /// # Errors
    ///
    /// Returns `Error::JsonParse` if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Builder<'static>> {
        Self::from_json_with_options(json, Options::defaults())
    }

    /// Parse JSON into a new builder. Object layout follows `options`.
    ///
    /// # Errors
    ///
    /// Returns `Error::JsonParse` if the JSON is invalid, or any builder error
    /// (e.g. `DuplicateAttributeName`) raised while closing compounds.
    pub fn from_json_with_options<'o>(json: &str, options: &'o Options) -> Result<Builder<'o>> {
        let value: JsonValue =
            serde_json::from_str(json).map_err(|e| Error::JsonParse(e.to_string()))?;
        let mut builder = Builder::with_options(options);
        let depth = Self::add_value(&mut builder, &value)?;
        debug!(
            input_len = json.len(),
            byte_size = builder.size(),
            depth,
            "parsed JSON document"
        );
        Ok(builder)
    }

    /// Append an already parsed JSON value to `builder`. Returns the nesting
    /// depth of the value (0 for scalars).
    pub fn add_value(builder: &mut Builder<'_>, value: &JsonValue) -> Result<usize> {
        match value {
            JsonValue::Null => builder.add(crate::encode::Null).map(|()| 0),
            JsonValue::Bool(b) => builder.add(*b).map(|()| 0),
            JsonValue::Number(n) => {
                if let Some(u) = n.as_u64() {
                    builder.add(u)?;
                } else if let Some(i) = n.as_i64() {
                    builder.add(i)?;
                } else {
                    builder.add(n.as_f64().unwrap_or(0.0))?;
                }
                Ok(0)
            }
            JsonValue::String(s) => builder.add(s.as_str()).map(|()| 0),
            JsonValue::Array(items) => {
                builder.open_array()?;
                let mut depth = 0;
                for item in items {
                    depth = depth.max(Self::add_value(builder, item)?);
                }
                builder.close()?;
                Ok(depth + 1)
            }
            JsonValue::Object(entries) => {
                builder.open_object()?;
                let mut depth = 0;
                for (key, item) in entries {
                    builder.add_key(key)?;
                    depth = depth.max(Self::add_value(builder, item)?);
                }
                builder.close()?;
                Ok(depth + 1)
            }
        }
    }
}

/// Converts slices to `serde_json::Value` under a set of options.
#[derive(Debug, Clone, Copy)]
pub struct Dumper<'o> {
    options: &'o Options,
}

impl<'o> Dumper<'o> {
    #[must_use]
    pub fn new(options: &'o Options) -> Self {
        Self { options }
    }

    /// Convert `value` (and everything below it) to JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoJsonEquivalent` for types JSON cannot express when
    /// the unsupported type behavior is `Fail`, `Error::NeedCustomTypeHandler`
    /// for custom values without a handler, and `Error::InvalidUtf8` for
    /// strings that are not UTF-8.
    pub fn dump(&self, value: &Slice<'_>) -> Result<JsonValue> {
        self.dump_value(value, value, 0)
    }

    fn dump_value(&self, value: &Slice<'_>, base: &Slice<'_>, nesting: usize) -> Result<JsonValue> {
        match value.typed()? {
            TypedValue::Null => Ok(JsonValue::Null),
            TypedValue::Bool(b) => Ok(JsonValue::Bool(b)),
            TypedValue::Int(n) | TypedValue::SmallInt(n) => Ok(JsonValue::from(n)),
            TypedValue::UInt(n) => Ok(JsonValue::from(n)),
            TypedValue::Double(f) => match serde_json::Number::from_f64(f) {
                Some(num) => Ok(JsonValue::Number(num)),
                None => self.unsupported(value, || JsonValue::Null),
            },
            TypedValue::String(s) => Ok(JsonValue::String(s.to_owned())),
            TypedValue::Binary(bytes) => self.unsupported(value, || {
                JsonValue::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }),
            TypedValue::UtcDate(ms) => self.unsupported(value, || JsonValue::from(ms)),
            TypedValue::None
            | TypedValue::Illegal
            | TypedValue::MinKey
            | TypedValue::MaxKey
            | TypedValue::External(_)
            | TypedValue::Bcd(_) => self.unsupported(value, || JsonValue::Null),
            TypedValue::Custom(custom) => match &self.options.custom_type_handler {
                Some(handler) => handler.to_json(&custom, base),
                None => Err(Error::NeedCustomTypeHandler),
            },
            TypedValue::Array(array) => {
                let mut items = Vec::with_capacity(array.compound_length());
                for member in array.iter_array()? {
                    items.push(self.dump_value(&member, &array, nesting + 1)?);
                }
                Ok(JsonValue::Array(items))
            }
            TypedValue::Object(object) => {
                let mut map = serde_json::Map::new();
                for pair in object.iter_object()? {
                    if self.options.excludes(&pair.key, nesting) {
                        continue;
                    }
                    let key = pair.key.copy_string()?;
                    map.insert(key, self.dump_value(&pair.value, &object, nesting + 1)?);
                }
                Ok(JsonValue::Object(map))
            }
        }
    }

    fn unsupported(
        &self,
        value: &Slice<'_>,
        converted: impl FnOnce() -> JsonValue,
    ) -> Result<JsonValue> {
        match self.options.unsupported_type_behavior {
            UnsupportedTypeBehavior::Fail => Err(Error::NoJsonEquivalent(value.value_type())),
            UnsupportedTypeBehavior::Nullify => Ok(JsonValue::Null),
            UnsupportedTypeBehavior::Convert => Ok(converted()),
        }
    }
}

impl Slice<'_> {
    /// Convert to a `serde_json::Value` using this slice's options.
    ///
    /// # Errors
    ///
    /// See [`Dumper::dump`].
    pub fn to_json_value(&self) -> Result<JsonValue> {
        Dumper::new(self.options()).dump(self)
    }

    /// Compact JSON text.
    ///
    /// # Errors
    ///
    /// See [`Dumper::dump`]; `Error::JsonSerialize` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let value = self.to_json_value()?;
        serde_json::to_string(&value).map_err(|e| Error::JsonSerialize(e.to_string()))
    }

    /// Indented JSON text.
    ///
    /// # Errors
    ///
    /// See [`Slice::to_json`].
    pub fn to_json_pretty(&self) -> Result<String> {
        let value = self.to_json_value()?;
        serde_json::to_string_pretty(&value).map_err(|e| Error::JsonSerialize(e.to_string()))
    }
}

/// Pretty JSON, or the `Debug` form if the value has no JSON rendering.
impl fmt::Display for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_pretty() {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}
