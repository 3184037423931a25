//! # Storage value model
//!
//! A format-agnostic nested value used on both sides of the client: the
//! serializer produces `Value` trees free of [`Value::Document`] variants
//! (storage-ready data), the deserializer reconstructs document graphs from
//! them. The variant set is closed: mapping, ordered sequence, fixed-size
//! sequence, document instance, and opaque scalars.
//!
//! Maps are backed by [`IndexMap`] so key order survives a round trip where
//! the target format preserves it.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;

use crate::document::Document;
use crate::error::{DocumentError, Result};

/// Shared handle to a document instance inside a value graph
pub type DocRef = Arc<dyn Document>;

/// Attribute mapping of a document instance
pub type Attributes = IndexMap<String, Value>;

/// Map key.
///
/// Storage formats generally require string keys; `convert_keys_to_string`
/// in the serializer options stringifies the other variants via [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Str(String),
	Int(i64),
	Bool(bool),
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Str(s) => f.write_str(s),
			Key::Int(i) => write!(f, "{}", i),
			Key::Bool(b) => write!(f, "{}", b),
		}
	}
}

impl From<&str> for Key {
	fn from(s: &str) -> Self {
		Key::Str(s.to_owned())
	}
}

impl From<String> for Key {
	fn from(s: String) -> Self {
		Key::Str(s)
	}
}

impl From<i64> for Key {
	fn from(i: i64) -> Self {
		Key::Int(i)
	}
}

/// A nested storage value.
///
/// `List` is the ordered, variable-size sequence; `Tuple` the fixed-size
/// sequence. The distinction is preserved on serialization but collapsed to
/// `List` on deserialization (stored formats do not carry it).
#[derive(Debug, Clone)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	Bytes(Vec<u8>),
	List(Vec<Value>),
	Tuple(Vec<Value>),
	Map(IndexMap<Key, Value>),
	Document(DocRef),
}

impl Value {
	/// Wrap a document instance.
	pub fn document(doc: impl Document + 'static) -> Self {
		Value::Document(Arc::new(doc))
	}

	/// Build a map value from a string-keyed attribute mapping, cloning the
	/// values.
	pub fn from_attributes(attributes: &Attributes) -> Self {
		Value::Map(
			attributes
				.iter()
				.map(|(k, v)| (Key::Str(k.clone()), v.clone()))
				.collect(),
		)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&IndexMap<Key, Value>> {
		match self {
			Value::Map(m) => Some(m),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(items) | Value::Tuple(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_document(&self) -> Option<&DocRef> {
		match self {
			Value::Document(doc) => Some(doc),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Convert a map value back into a string-keyed attribute mapping.
	///
	/// Non-string keys are stringified, the same rule the serializer applies
	/// under `convert_keys_to_string`. Returns `None` for non-map values.
	pub fn to_attributes(&self) -> Option<Attributes> {
		let map = self.as_map()?;
		Some(
			map.iter()
				.map(|(k, v)| (k.to_string(), v.clone()))
				.collect(),
		)
	}

	/// Encode as JSON for storage backends that speak JSON-shaped data.
	///
	/// Tuples degrade to arrays, bytes to base64 strings, non-string keys to
	/// strings. Document instances are not storage-representable and must be
	/// serialized into reference stubs first.
	pub fn to_json(&self) -> Result<serde_json::Value> {
		Ok(match self {
			Value::Null => serde_json::Value::Null,
			Value::Bool(b) => serde_json::Value::Bool(*b),
			Value::Int(i) => serde_json::Value::from(*i),
			Value::Float(f) => serde_json::Number::from_f64(*f)
				.map(serde_json::Value::Number)
				.ok_or_else(|| {
					DocumentError::Serialization(format!("non-finite float: {}", f))
				})?,
			Value::Str(s) => serde_json::Value::String(s.clone()),
			Value::Bytes(bytes) => serde_json::Value::String(BASE64.encode(bytes)),
			Value::List(items) | Value::Tuple(items) => serde_json::Value::Array(
				items.iter().map(Value::to_json).collect::<Result<_>>()?,
			),
			Value::Map(map) => {
				let mut out = serde_json::Map::new();
				for (key, value) in map {
					out.insert(key.to_string(), value.to_json()?);
				}
				serde_json::Value::Object(out)
			}
			Value::Document(doc) => {
				return Err(DocumentError::Serialization(format!(
					"unserialized document instance in storage value: {:?}",
					doc
				)));
			}
		})
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(b) => Value::Bool(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Value::Int(i),
				None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
			},
			serde_json::Value::String(s) => Value::Str(s),
			serde_json::Value::Array(items) => {
				Value::List(items.into_iter().map(Value::from).collect())
			}
			serde_json::Value::Object(map) => Value::Map(
				map.into_iter()
					.map(|(k, v)| (Key::Str(k), Value::from(v)))
					.collect(),
			),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Str(s.to_owned())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Str(s)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Value::List(items)
	}
}

impl From<DocRef> for Value {
	fn from(doc: DocRef) -> Self {
		Value::Document(doc)
	}
}

// Structural equality; document references compare by instance identity.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::Bytes(a), Value::Bytes(b)) => a == b,
			(Value::List(a), Value::List(b)) => a == b,
			(Value::Tuple(a), Value::Tuple(b)) => a == b,
			(Value::Map(a), Value::Map(b)) => a == b,
			(Value::Document(a), Value::Document(b)) => {
				std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
			}
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(Key::Str("name".into()), "name")]
	#[case(Key::Int(42), "42")]
	#[case(Key::Bool(true), "true")]
	fn test_key_display_stringifies_variants(#[case] key: Key, #[case] expected: &str) {
		assert_eq!(key.to_string(), expected);
	}

	#[test]
	fn test_json_round_trip_preserves_structure() {
		let json = serde_json::json!({
			"name": "Jane",
			"age": 41,
			"tags": ["jazz", "guitar"],
			"score": 1.5,
			"active": true,
			"bio": null,
		});
		let value = Value::from(json.clone());
		assert_eq!(value.to_json().unwrap(), json);
	}

	#[test]
	fn test_tuple_degrades_to_json_array() {
		let value = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
		assert_eq!(value.to_json().unwrap(), serde_json::json!([1, 2]));
	}

	#[test]
	fn test_bytes_encode_as_base64() {
		let value = Value::Bytes(vec![0x68, 0x69]);
		assert_eq!(value.to_json().unwrap(), serde_json::json!("aGk="));
	}

	#[test]
	fn test_non_string_keys_stringify_in_json() {
		let mut map = IndexMap::new();
		map.insert(Key::Int(7), Value::from("seven"));
		let json = Value::Map(map).to_json().unwrap();
		assert_eq!(json, serde_json::json!({"7": "seven"}));
	}

	#[test]
	fn test_non_finite_float_is_a_serialization_error() {
		let err = Value::Float(f64::NAN).to_json().unwrap_err();
		assert!(matches!(err, DocumentError::Serialization(_)));
	}

	#[test]
	fn test_from_attributes_preserves_key_order() {
		let mut attrs = Attributes::new();
		attrs.insert("z".into(), Value::Int(1));
		attrs.insert("a".into(), Value::Int(2));
		let keys: Vec<String> = Value::from_attributes(&attrs)
			.as_map()
			.unwrap()
			.keys()
			.map(Key::to_string)
			.collect();
		assert_eq!(keys, vec!["z", "a"]);
	}
}
