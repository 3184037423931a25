//! # Reference deserializer
//!
//! Recursively converts stored nested data back into an object graph.
//! Mappings shaped like reference stubs — a primary key under `pk` (or the
//! legacy `__pk__`) plus a `__collection__` known to the registry — become
//! lazy document instances; every other mapping stays a plain mapping, so
//! data written under a different registry configuration deserializes
//! without error.
//!
//! Sequences come back as the canonical ordered sequence: the fixed-size
//! distinction the serializer preserves is collapsed here, since stored
//! formats do not carry it.

use indexmap::IndexMap;

use grappelli_core::document::{COLLECTION_KEY, LEGACY_PK_KEY, PK_KEY};
use grappelli_core::value::{Attributes, Key, Value};

use crate::codec::{Codec, apply_pipeline};
use crate::factory::{InstanceFactory, TypeTarget};

/// Recursive object-graph deserializer for one backend's registry.
pub struct Deserializer {
	factory: InstanceFactory,
	decoders: Vec<Codec>,
}

impl Deserializer {
	pub fn new(factory: InstanceFactory) -> Self {
		Self {
			factory,
			decoders: Vec::new(),
		}
	}

	/// Append a decoder to the pipeline; decoders run in insertion order
	/// against every value before the recursion rules classify it.
	pub fn with_decoder(mut self, decoder: Codec) -> Self {
		self.decoders.push(decoder);
		self
	}

	pub fn factory(&self) -> &InstanceFactory {
		&self.factory
	}

	/// Deserialize stored data into an object graph.
	///
	/// Infallible: malformed reference stubs degrade to plain mappings
	/// instead of failing.
	pub fn deserialize(&self, value: &Value) -> Value {
		let transformed = apply_pipeline(&self.decoders, value);
		let value = transformed.as_ref().unwrap_or(value);

		match value {
			Value::Map(map) => {
				if let Some(document) = self.reconstruct_reference(map) {
					return document;
				}
				Value::Map(
					map.iter()
						.map(|(key, child)| (key.clone(), self.deserialize(child)))
						.collect(),
				)
			}
			Value::List(items) | Value::Tuple(items) => {
				Value::List(items.iter().map(|item| self.deserialize(item)).collect())
			}
			other => other.clone(),
		}
	}

	/// Rebuild a lazy instance from a stub-shaped mapping, or `None` when
	/// the mapping is not a resolvable reference stub.
	fn reconstruct_reference(&self, map: &IndexMap<Key, Value>) -> Option<Value> {
		let legacy_key = Key::Str(LEGACY_PK_KEY.to_owned());
		let current_key = Key::Str(PK_KEY.to_owned());
		let pk_key = if map.contains_key(&legacy_key) {
			legacy_key
		} else if map.contains_key(&current_key) {
			current_key
		} else {
			return None;
		};

		let collection_key = Key::Str(COLLECTION_KEY.to_owned());
		let collection = map.get(&collection_key)?.as_str()?.to_owned();
		if !self.factory.registry().has_collection(&collection) {
			return None;
		}

		let pk = map.get(&pk_key)?.clone();
		let attributes: Attributes = map
			.iter()
			.filter(|(key, _)| **key != pk_key && **key != collection_key)
			.map(|(key, value)| (key.to_string(), value.clone()))
			.collect();

		// A concurrent re-registration can still invalidate the collection
		// between the check above and the factory call; degrade to the
		// plain-mapping form in that case as well.
		let document = self
			.factory
			.create_instance(TypeTarget::Collection(&collection), attributes, true)
			.ok()?;
		document.set_pk(pk);
		Some(Value::Document(document))
	}
}

impl std::fmt::Debug for Deserializer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Deserializer")
			.field("factory", &self.factory)
			.field("decoders", &self.decoders.len())
			.finish()
	}
}
