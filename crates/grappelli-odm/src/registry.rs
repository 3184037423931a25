//! # Class registry
//!
//! Mapping between document types and named collections, the piece both the
//! serializer and the deserializer depend on to resolve references. Exactly
//! one type owns a collection name at any time: registering a second type
//! under an already-used collection evicts the prior owner entirely, so the
//! registry map and its reverse index stay mutually consistent.
//!
//! There is no process-global registry; each backend instance owns one
//! explicitly, populated by [`ClassRegistry::register`] calls at startup or
//! by auto-registration the first time the serializer encounters an
//! unregistered document type.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use parking_lot::RwLock;

use grappelli_core::document::{Constructor, TypeDescriptor, TypeMeta};
use grappelli_core::error::{DocumentError, Result};
use grappelli_core::value::Value;

/// Parameters for explicit registration.
///
/// `collection` takes precedence over the type's declared metadata, which in
/// turn beats the lowercased type name.
#[derive(Clone, Default)]
pub struct RegisterParams {
	/// Explicit collection-name override
	pub collection: Option<String>,
	/// Custom constructor, preferred by the instance factory over the
	/// type's default construction contract
	pub constructor: Option<Constructor>,
	/// Dotted attribute paths flattened into reference stubs
	pub ref_includes: Vec<String>,
	/// Extra parameters, stored verbatim
	pub extra: IndexMap<String, Value>,
}

impl RegisterParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parameters equivalent to a type's declared metadata, as used by
	/// auto-registration.
	pub fn from_meta(meta: &TypeMeta) -> Self {
		Self {
			collection: meta.collection.clone(),
			constructor: None,
			ref_includes: meta.ref_includes.clone(),
			extra: meta.extra.clone(),
		}
	}

	pub fn collection(mut self, collection: impl Into<String>) -> Self {
		self.collection = Some(collection.into());
		self
	}

	pub fn constructor(mut self, constructor: Constructor) -> Self {
		self.constructor = Some(constructor);
		self
	}

	pub fn ref_includes<I, S>(mut self, paths: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.ref_includes = paths.into_iter().map(Into::into).collect();
		self
	}
}

impl fmt::Debug for RegisterParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegisterParams")
			.field("collection", &self.collection)
			.field("constructor", &self.constructor.is_some())
			.field("ref_includes", &self.ref_includes)
			.field("extra", &self.extra)
			.finish()
	}
}

/// A registry entry: the registered descriptor plus its resolved parameters.
#[derive(Clone)]
pub struct ClassEntry {
	pub descriptor: TypeDescriptor,
	/// Resolved collection name owning this type
	pub collection: String,
	pub constructor: Option<Constructor>,
	pub ref_includes: Vec<String>,
	pub extra: IndexMap<String, Value>,
}

impl fmt::Debug for ClassEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClassEntry")
			.field("descriptor", &self.descriptor)
			.field("collection", &self.collection)
			.field("constructor", &self.constructor.is_some())
			.field("ref_includes", &self.ref_includes)
			.finish()
	}
}

#[derive(Default)]
struct RegistryInner {
	classes: HashMap<TypeId, ClassEntry>,
	/// Reverse index, kept consistent with `classes` under the write lock
	collections: HashMap<String, TypeId>,
}

impl RegistryInner {
	fn register(&mut self, descriptor: &TypeDescriptor, params: RegisterParams) {
		let collection = params
			.collection
			.clone()
			.or_else(|| descriptor.meta().collection.clone())
			.unwrap_or_else(|| descriptor.name().to_lowercase());

		// Collision is by collection name, not type identity: evict any
		// prior owner of the collection along with its reverse mapping.
		let evicted: Vec<TypeId> = self
			.classes
			.iter()
			.filter(|(_, entry)| entry.collection == collection)
			.map(|(type_id, _)| *type_id)
			.collect();
		for type_id in evicted {
			if let Some(entry) = self.classes.remove(&type_id) {
				self.collections.remove(&entry.collection);
				tracing::debug!(
					collection = %collection,
					evicted = entry.descriptor.name(),
					"evicting prior owner of collection"
				);
			}
		}
		// Re-registering a type under a new collection must not leave its
		// old reverse mapping behind.
		if let Some(previous) = self.classes.remove(&descriptor.type_id()) {
			self.collections.remove(&previous.collection);
		}

		tracing::debug!(
			collection = %collection,
			class = descriptor.name(),
			"registered document class"
		);
		self.collections.insert(collection.clone(), descriptor.type_id());
		self.classes.insert(
			descriptor.type_id(),
			ClassEntry {
				descriptor: descriptor.clone(),
				collection,
				constructor: params.constructor,
				ref_includes: params.ref_includes,
				extra: params.extra,
			},
		);
	}
}

/// Mapping between document types and collection names.
///
/// Interior mutability follows a single-writer, multi-reader discipline:
/// registrations are rare relative to lookups.
#[derive(Default)]
pub struct ClassRegistry {
	inner: RwLock<RegistryInner>,
}

impl ClassRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Explicitly register a document type.
	///
	/// Collection-name precedence: `params.collection`, then the type's
	/// declared metadata, then the lowercased type name. Always succeeds.
	pub fn register(&self, descriptor: &TypeDescriptor, params: RegisterParams) {
		self.inner.write().register(descriptor, params);
	}

	/// Register a type from its declared metadata, as happens the first
	/// time an unregistered type is encountered during serialization.
	pub fn autoregister(&self, descriptor: &TypeDescriptor) {
		self.register(descriptor, RegisterParams::from_meta(descriptor.meta()));
	}

	/// Collection name for a document type, auto-registering it on first
	/// encounter (holding a descriptor is proof of the document capability).
	pub fn collection_for(&self, descriptor: &TypeDescriptor) -> String {
		self.entry_for(descriptor).collection
	}

	/// Collection name for a raw type id; fails with `UnknownType` since no
	/// descriptor is available to auto-register.
	pub fn collection_for_type_id(&self, type_id: TypeId) -> Result<String> {
		self.inner
			.read()
			.classes
			.get(&type_id)
			.map(|entry| entry.collection.clone())
			.ok_or_else(|| DocumentError::UnknownType(format!("{:?}", type_id)))
	}

	/// Document type owning a collection name.
	pub fn type_for_collection(&self, collection: &str) -> Result<TypeDescriptor> {
		self.inner
			.read()
			.classes
			.values()
			.find(|entry| entry.collection == collection)
			.map(|entry| entry.descriptor.clone())
			.ok_or_else(|| DocumentError::UnknownCollection(collection.to_owned()))
	}

	/// Whether any registered type owns the collection name. Used by the
	/// deserializer to decide whether a mapping is a reference stub.
	pub fn has_collection(&self, collection: &str) -> bool {
		self.inner.read().collections.contains_key(collection)
	}

	/// Registry entry for a document type, auto-registering on a miss.
	pub fn entry_for(&self, descriptor: &TypeDescriptor) -> ClassEntry {
		if let Some(entry) = self.inner.read().classes.get(&descriptor.type_id()) {
			return entry.clone();
		}
		let mut inner = self.inner.write();
		// Racing auto-registrations are idempotent, but re-check to avoid
		// clobbering an explicit registration that won the lock first.
		if let Some(entry) = inner.classes.get(&descriptor.type_id()) {
			return entry.clone();
		}
		inner.register(descriptor, RegisterParams::from_meta(descriptor.meta()));
		inner.classes[&descriptor.type_id()].clone()
	}

	/// Registry entry for a raw type id.
	pub fn entry_for_type_id(&self, type_id: TypeId) -> Result<ClassEntry> {
		self.inner
			.read()
			.classes
			.get(&type_id)
			.cloned()
			.ok_or_else(|| DocumentError::UnknownType(format!("{:?}", type_id)))
	}

	/// Registry entry for a collection name.
	pub fn entry_for_collection(&self, collection: &str) -> Result<ClassEntry> {
		let inner = self.inner.read();
		inner
			.collections
			.get(collection)
			.and_then(|type_id| inner.classes.get(type_id).cloned())
			.ok_or_else(|| DocumentError::UnknownCollection(collection.to_owned()))
	}

	/// Number of registered document types.
	pub fn len(&self) -> usize {
		self.inner.read().classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.read().classes.is_empty()
	}
}

impl fmt::Debug for ClassRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.read();
		f.debug_struct("ClassRegistry")
			.field("classes", &inner.classes.len())
			.field("collections", &inner.collections.keys())
			.finish()
	}
}
