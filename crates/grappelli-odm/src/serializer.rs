//! # Reference serializer
//!
//! Recursively converts an in-memory object graph into storage-ready nested
//! data. Document instances become either embedded copies (bounded by the
//! embed level, or forced by the instance's embed flag) or reference stubs
//! `{pk, __collection__, ...included fields}`. Unsaved documents encountered
//! on the reference path are autosaved first so a valid reference can be
//! emitted; that save is the serializer's only side effect, and the input
//! graph is never mutated.

use indexmap::IndexMap;

use grappelli_core::backend::Backend;
use grappelli_core::document::{COLLECTION_KEY, FetchOutcome, PK_KEY};
use grappelli_core::error::{DocumentError, Result};
use grappelli_core::value::{Attributes, DocRef, Key, Value};

use crate::codec::{Codec, apply_pipeline};
use crate::config::OdmSettings;
use crate::registry::ClassRegistry;

/// Per-call serialization options.
#[derive(Debug, Clone, Copy)]
pub struct SerializeOptions {
	/// Stringify all map keys (required by string-keyed storage formats)
	pub convert_keys_to_string: bool,
	/// While positive, referenced documents are embedded instead of
	/// referenced; decremented on each document boundary
	pub embed_level: u32,
	/// Automatically save documents that have no primary key yet
	pub autosave: bool,
	/// The produced value is part of query construction
	pub for_query: bool,
}

impl Default for SerializeOptions {
	fn default() -> Self {
		Self {
			convert_keys_to_string: false,
			embed_level: 0,
			autosave: true,
			for_query: false,
		}
	}
}

impl SerializeOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn convert_keys_to_string(mut self, convert: bool) -> Self {
		self.convert_keys_to_string = convert;
		self
	}

	pub fn embed_level(mut self, level: u32) -> Self {
		self.embed_level = level;
		self
	}

	pub fn autosave(mut self, autosave: bool) -> Self {
		self.autosave = autosave;
		self
	}

	pub fn for_query(mut self, for_query: bool) -> Self {
		self.for_query = for_query;
		self
	}
}

/// Recursive object-graph serializer for one backend's registry.
pub struct Serializer<'a> {
	registry: &'a ClassRegistry,
	backend: &'a dyn Backend,
	settings: OdmSettings,
	encoders: Vec<Codec>,
}

impl<'a> Serializer<'a> {
	pub fn new(registry: &'a ClassRegistry, backend: &'a dyn Backend) -> Self {
		Self {
			registry,
			backend,
			settings: OdmSettings::default(),
			encoders: Vec::new(),
		}
	}

	pub fn with_settings(mut self, settings: OdmSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Append an encoder to the pipeline; encoders run in insertion order
	/// against every value before the recursion rules classify it.
	pub fn with_encoder(mut self, encoder: Codec) -> Self {
		self.encoders.push(encoder);
		self
	}

	/// Serialize a value graph into storage-ready data.
	pub fn serialize(&self, value: &Value, options: &SerializeOptions) -> Result<Value> {
		self.serialize_value(value, options.embed_level, options)
	}

	fn serialize_value(
		&self,
		value: &Value,
		embed_level: u32,
		options: &SerializeOptions,
	) -> Result<Value> {
		let transformed = apply_pipeline(&self.encoders, value);
		let value = transformed.as_ref().unwrap_or(value);

		match value {
			Value::Map(map) => {
				let mut out = IndexMap::with_capacity(map.len());
				for (key, child) in map {
					let key = if options.convert_keys_to_string {
						Key::Str(key.to_string())
					} else {
						key.clone()
					};
					out.insert(key, self.serialize_value(child, embed_level, options)?);
				}
				Ok(Value::Map(out))
			}
			Value::List(items) => Ok(Value::List(
				items
					.iter()
					.map(|item| self.serialize_value(item, embed_level, options))
					.collect::<Result<_>>()?,
			)),
			Value::Tuple(items) => Ok(Value::Tuple(
				items
					.iter()
					.map(|item| self.serialize_value(item, embed_level, options))
					.collect::<Result<_>>()?,
			)),
			Value::Document(doc) => self.serialize_document(doc, embed_level, options),
			other => Ok(other.clone()),
		}
	}

	fn serialize_document(
		&self,
		doc: &DocRef,
		embed_level: u32,
		options: &SerializeOptions,
	) -> Result<Value> {
		let entry = self.registry.entry_for(&doc.descriptor());

		if embed_level > 0 {
			let attributes = match doc.eager_attributes()? {
				FetchOutcome::Loaded(attributes) => attributes,
				FetchOutcome::Missing => {
					// The referenced record is gone; embed what is known.
					tracing::debug!(
						collection = %entry.collection,
						"referenced document no longer exists, embedding known attributes"
					);
					doc.attributes()
				}
			};
			return self.serialize_value(
				&Value::from_attributes(&attributes),
				embed_level - 1,
				options,
			);
		}

		if doc.embed() {
			// Explicit embedding choice: inline the full attribute set.
			// Nested embed-flagged documents keep inlining, everything else
			// at this point is referenced.
			return self.serialize_value(&Value::from_attributes(&doc.attributes()), 0, options);
		}

		if doc.pk().is_none() && options.autosave {
			tracing::debug!(
				collection = %entry.collection,
				"autosaving unsaved document before emitting a reference"
			);
			doc.save(self.backend)?;
		}

		if doc.is_lazy() {
			// Carry every locally known field in the reference; the primary
			// key travels separately under the `pk` key.
			let pk_field = doc.pk_field_name();
			let mut stub: IndexMap<Key, Value> = IndexMap::new();
			for (key, value) in doc.lazy_attributes() {
				if key != pk_field {
					stub.insert(Key::Str(key), value);
				}
			}
			stub.insert(Key::Str(PK_KEY.to_owned()), doc.pk().unwrap_or(Value::Null));
			stub.insert(
				Key::Str(COLLECTION_KEY.to_owned()),
				Value::Str(entry.collection.clone()),
			);
			return Ok(Value::Map(stub));
		}

		if options.for_query && !self.settings.documents_allowed_in_query() {
			return Err(DocumentError::QueryDocumentNotAllowed);
		}

		let mut stub: IndexMap<Key, Value> = IndexMap::new();
		stub.insert(Key::Str(PK_KEY.to_owned()), doc.pk().unwrap_or(Value::Null));
		stub.insert(
			Key::Str(COLLECTION_KEY.to_owned()),
			Value::Str(entry.collection.clone()),
		);
		if !entry.ref_includes.is_empty() {
			let attributes = doc.attributes();
			for path in &entry.ref_includes {
				// Missing include paths are silently skipped.
				if let Some(value) = lookup_path(&attributes, path) {
					stub.insert(Key::Str(path.replace('.', "_")), value.clone());
				}
			}
		}
		Ok(Value::Map(stub))
	}
}

/// Resolve a dotted path against an attribute mapping, descending through
/// nested string-keyed maps.
fn lookup_path<'v>(attributes: &'v Attributes, path: &str) -> Option<&'v Value> {
	let mut fragments = path.split('.');
	let mut current = attributes.get(fragments.next()?)?;
	for fragment in fragments {
		current = current.as_map()?.get(&Key::Str(fragment.to_owned()))?;
	}
	Some(current)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lookup_path_descends_nested_maps() {
		let mut inner = IndexMap::new();
		inner.insert(Key::Str("isbn".to_owned()), Value::from("978-3"));
		let mut attributes = Attributes::new();
		attributes.insert("meta".to_owned(), Value::Map(inner));
		attributes.insert("title".to_owned(), Value::from("Minor Swing"));

		assert_eq!(
			lookup_path(&attributes, "meta.isbn"),
			Some(&Value::from("978-3"))
		);
		assert_eq!(
			lookup_path(&attributes, "title"),
			Some(&Value::from("Minor Swing"))
		);
		assert_eq!(lookup_path(&attributes, "meta.missing"), None);
		assert_eq!(lookup_path(&attributes, "title.isbn"), None);
	}
}
