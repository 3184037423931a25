//! Fixture document types.
//!
//! Concrete implementations of the document capability set, the way an
//! application defines them: a shared interior-mutable state plus one thin
//! wrapper per document type. `Author` uses every default, `Book` is its
//! referenced counterpart, and `Scrapbook` declares a collection override
//! and the embed flag.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use grappelli_core::backend::Backend;
use grappelli_core::document::{
	Document, FetchOutcome, InstanceOptions, PK_KEY, TypeDescriptor, TypeMeta,
};
use grappelli_core::error::{DocumentError, Result};
use grappelli_core::value::{Attributes, Value};

/// Shared per-instance state: nullable primary key, attribute mapping,
/// materialization flag, and the owning backend used for eager fetches.
pub struct DocState {
	pk: RwLock<Option<Value>>,
	attributes: RwLock<Attributes>,
	lazy: RwLock<bool>,
	backend: RwLock<Option<Arc<dyn Backend>>>,
}

impl DocState {
	/// Eager state with no backend attached.
	pub fn eager(attributes: Attributes) -> Self {
		Self {
			pk: RwLock::new(None),
			attributes: RwLock::new(attributes),
			lazy: RwLock::new(false),
			backend: RwLock::new(None),
		}
	}

	/// State following the default construction contract.
	pub fn from_options(attributes: Attributes, options: InstanceOptions) -> Self {
		Self {
			pk: RwLock::new(None),
			attributes: RwLock::new(attributes),
			lazy: RwLock::new(options.lazy),
			backend: RwLock::new(options.backend),
		}
	}

	pub fn pk(&self) -> Option<Value> {
		self.pk.read().clone()
	}

	pub fn set_pk(&self, pk: Value) {
		*self.pk.write() = Some(pk);
	}

	pub fn attributes(&self) -> Attributes {
		self.attributes.read().clone()
	}

	pub fn set_attribute(&self, key: impl Into<String>, value: Value) {
		self.attributes.write().insert(key.into(), value);
	}

	pub fn is_lazy(&self) -> bool {
		*self.lazy.read()
	}

	pub fn attach_backend(&self, backend: Arc<dyn Backend>) {
		*self.backend.write() = Some(backend);
	}

	/// Eager fetch through the owning backend; a missing record is an
	/// outcome, not an error.
	pub fn eager_attributes(&self, descriptor: &TypeDescriptor) -> Result<FetchOutcome> {
		if !self.is_lazy() {
			return Ok(FetchOutcome::Loaded(self.attributes()));
		}
		let backend = self.backend.read().clone().ok_or_else(|| {
			DocumentError::Backend("lazy document has no owning backend".to_owned())
		})?;
		let pk = self.pk().ok_or_else(|| {
			DocumentError::Backend("lazy document has no primary key".to_owned())
		})?;
		let mut properties = Attributes::new();
		properties.insert(PK_KEY.to_owned(), pk);
		match backend.get(descriptor, &properties) {
			Ok(document) => Ok(FetchOutcome::Loaded(document.attributes())),
			Err(DocumentError::DoesNotExist(_)) => Ok(FetchOutcome::Missing),
			Err(err) => Err(err),
		}
	}
}

impl fmt::Debug for DocState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DocState")
			.field("pk", &*self.pk.read())
			.field("lazy", &*self.lazy.read())
			.field("backend", &self.backend.read().is_some())
			.finish_non_exhaustive()
	}
}

macro_rules! delegate_document_state {
	() => {
		fn pk(&self) -> Option<Value> {
			self.state.pk()
		}

		fn set_pk(&self, pk: Value) {
			self.state.set_pk(pk);
		}

		fn attributes(&self) -> Attributes {
			self.state.attributes()
		}

		fn lazy_attributes(&self) -> Attributes {
			self.state.attributes()
		}

		fn is_lazy(&self) -> bool {
			self.state.is_lazy()
		}

		fn eager_attributes(&self) -> Result<FetchOutcome> {
			self.state.eager_attributes(&Document::descriptor(self))
		}

		fn save(&self, backend: &dyn Backend) -> Result<()> {
			backend.save(self)
		}
	};
}

/// Referencing side of the classic author/book pair; all defaults.
#[derive(Debug)]
pub struct Author {
	state: DocState,
}

impl Author {
	pub fn new(attributes: Attributes) -> Self {
		Self {
			state: DocState::eager(attributes),
		}
	}

	pub fn state(&self) -> &DocState {
		&self.state
	}

	pub fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::new::<Author>(
			"Author",
			TypeMeta::new(),
			Arc::new(|attributes, options| {
				Arc::new(Author {
					state: DocState::from_options(attributes, options),
				})
			}),
		)
	}
}

impl Document for Author {
	fn descriptor(&self) -> TypeDescriptor {
		Author::type_descriptor()
	}

	delegate_document_state!();
}

/// Referenced side of the pair; all defaults.
#[derive(Debug)]
pub struct Book {
	state: DocState,
}

impl Book {
	pub fn new(attributes: Attributes) -> Self {
		Self {
			state: DocState::eager(attributes),
		}
	}

	pub fn state(&self) -> &DocState {
		&self.state
	}

	pub fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::new::<Book>(
			"Book",
			TypeMeta::new(),
			Arc::new(|attributes, options| {
				Arc::new(Book {
					state: DocState::from_options(attributes, options),
				})
			}),
		)
	}
}

impl Document for Book {
	fn descriptor(&self) -> TypeDescriptor {
		Book::type_descriptor()
	}

	delegate_document_state!();
}

/// Always embedded inline; declares a collection override in its metadata.
#[derive(Debug)]
pub struct Scrapbook {
	state: DocState,
}

impl Scrapbook {
	pub fn new(attributes: Attributes) -> Self {
		Self {
			state: DocState::eager(attributes),
		}
	}

	pub fn state(&self) -> &DocState {
		&self.state
	}

	pub fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::new::<Scrapbook>(
			"Scrapbook",
			TypeMeta::new().with_collection("scrapbooks"),
			Arc::new(|attributes, options| {
				Arc::new(Scrapbook {
					state: DocState::from_options(attributes, options),
				})
			}),
		)
	}
}

impl Document for Scrapbook {
	fn descriptor(&self) -> TypeDescriptor {
		Scrapbook::type_descriptor()
	}

	fn embed(&self) -> bool {
		true
	}

	delegate_document_state!();
}

/// Attribute-map literal used throughout the test suites.
///
/// # Examples
///
/// ```
/// use grappelli_testkit::attrs;
///
/// let attributes = attrs([("name", "Jane".into()), ("age", 41i64.into())]);
/// assert_eq!(attributes.len(), 2);
/// ```
pub fn attrs<const N: usize>(entries: [(&str, Value); N]) -> Attributes {
	entries
		.into_iter()
		.map(|(key, value)| (key.to_owned(), value))
		.collect()
}
