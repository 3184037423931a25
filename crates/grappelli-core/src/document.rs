//! # Document capability set
//!
//! The client core never defines concrete document types; it works against
//! the [`Document`] trait, the capability set a document collaborator must
//! provide: a nullable primary key, an attribute mapping, a lazy/eager
//! materialization state, an embed flag, eager fetching, and persistence.
//!
//! Each document type additionally exposes a [`TypeDescriptor`] — a runtime
//! handle carrying its declared metadata and a default constructor — which
//! is what the class registry stores and the instance factory invokes.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::backend::Backend;
use crate::error::Result;
use crate::value::{Attributes, DocRef, Value};

/// Wire key naming the owning collection in a reference stub
pub const COLLECTION_KEY: &str = "__collection__";

/// Wire key carrying the primary key in a reference stub
pub const PK_KEY: &str = "pk";

/// Legacy wire key for the primary key; still accepted on deserialization
pub const LEGACY_PK_KEY: &str = "__pk__";

/// Outcome of an eager attribute fetch.
///
/// A referenced record that no longer exists is an expected condition during
/// embedding, so it is reported as a value rather than an error; every other
/// fetch failure propagates through the `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
	/// The full attribute set was loaded
	Loaded(Attributes),
	/// The referenced record is gone from the backend
	Missing,
}

/// Capability set required from document instances.
///
/// Primary key and attribute state use interior mutability: the serializer
/// may assign a primary key through a shared handle when autosaving an
/// unsaved document it encounters inside a value graph.
pub trait Document: fmt::Debug + Send + Sync {
	/// Runtime handle for this document's type
	fn descriptor(&self) -> TypeDescriptor;

	/// Primary key, `None` until first save
	fn pk(&self) -> Option<Value>;

	/// Assign the primary key (called by backends after insertion and by the
	/// deserializer when reconstructing a reference stub)
	fn set_pk(&self, pk: Value);

	/// Name of the primary-key field inside the attribute mapping
	fn pk_field_name(&self) -> String {
		PK_KEY.to_owned()
	}

	/// Currently known attributes
	fn attributes(&self) -> Attributes;

	/// Attributes known locally for a lazy instance (the fields its
	/// reference stub carried)
	fn lazy_attributes(&self) -> Attributes;

	/// Whether only the reference stub's fields are known
	fn is_lazy(&self) -> bool;

	/// Whether this instance must always be serialized as a full embedded
	/// copy instead of a reference stub
	fn embed(&self) -> bool {
		false
	}

	/// Fetch the full attribute set from the owning backend
	fn eager_attributes(&self) -> Result<FetchOutcome>;

	/// Persist this instance, assigning a primary key if absent
	fn save(&self, backend: &dyn Backend) -> Result<()>;
}

/// Declared per-type metadata, the static enumerable configuration a
/// document type ships with.
#[derive(Debug, Clone, Default)]
pub struct TypeMeta {
	/// Collection-name override; defaults to the lowercased type name
	pub collection: Option<String>,
	/// Dotted attribute paths flattened into reference stubs
	pub ref_includes: Vec<String>,
	/// Additional declared parameters, stored verbatim in the registry
	pub extra: IndexMap<String, Value>,
}

impl TypeMeta {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
		self.collection = Some(collection.into());
		self
	}

	pub fn with_ref_includes<I, S>(mut self, paths: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.ref_includes = paths.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
		self.extra.insert(key.into(), value);
		self
	}
}

/// Default document construction contract: attributes, lazy flag, owning
/// backend, and the autoload setting.
#[derive(Clone)]
pub struct InstanceOptions {
	pub lazy: bool,
	pub autoload: bool,
	pub backend: Option<Arc<dyn Backend>>,
}

impl fmt::Debug for InstanceOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InstanceOptions")
			.field("lazy", &self.lazy)
			.field("autoload", &self.autoload)
			.field("backend", &self.backend.is_some())
			.finish()
	}
}

/// Constructor invoked to build a document instance
pub type Constructor = Arc<dyn Fn(Attributes, InstanceOptions) -> DocRef + Send + Sync>;

/// Runtime handle for a registered (or registrable) document type.
///
/// A descriptor is proof that a type satisfies the document capability set:
/// holding one is what allows the registry to auto-register the type when it
/// is first encountered during serialization.
#[derive(Clone)]
pub struct TypeDescriptor {
	type_id: TypeId,
	name: &'static str,
	meta: TypeMeta,
	construct: Constructor,
}

impl TypeDescriptor {
	/// Build a descriptor for document type `T`.
	pub fn new<T: Document + 'static>(
		name: &'static str,
		meta: TypeMeta,
		construct: Constructor,
	) -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			name,
			meta,
			construct,
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn meta(&self) -> &TypeMeta {
		&self.meta
	}

	/// Invoke the type's default constructor.
	pub fn construct(&self, attributes: Attributes, options: InstanceOptions) -> DocRef {
		(self.construct)(attributes, options)
	}

	/// Clone of the default constructor, for storage in registry entries.
	pub fn constructor(&self) -> Constructor {
		Arc::clone(&self.construct)
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("name", &self.name)
			.field("meta", &self.meta)
			.finish_non_exhaustive()
	}
}

// Descriptors for the same Rust type are interchangeable.
impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for TypeDescriptor {}
