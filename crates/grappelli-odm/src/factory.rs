//! # Instance factory
//!
//! Ties a collection name or document type to a constructible instance.
//! Prefers a custom constructor registered for the type; otherwise invokes
//! the type's default construction contract with the attributes, the lazy
//! flag, the owning backend, and the autoload setting.

use std::any::TypeId;
use std::sync::Arc;

use grappelli_core::backend::Backend;
use grappelli_core::document::InstanceOptions;
use grappelli_core::error::Result;
use grappelli_core::value::{Attributes, DocRef};

use crate::config::OdmSettings;
use crate::registry::{ClassEntry, ClassRegistry};

/// Either side of the `collection_or_type` argument to
/// [`InstanceFactory::create_instance`].
#[derive(Debug, Clone, Copy)]
pub enum TypeTarget<'a> {
	/// A document type, by runtime type id
	Type(TypeId),
	/// A collection name
	Collection(&'a str),
}

/// Builds document instances for a registry, on behalf of one backend.
#[derive(Clone)]
pub struct InstanceFactory {
	registry: Arc<ClassRegistry>,
	backend: Option<Arc<dyn Backend>>,
	settings: OdmSettings,
}

impl InstanceFactory {
	pub fn new(registry: Arc<ClassRegistry>, settings: OdmSettings) -> Self {
		Self {
			registry,
			backend: None,
			settings,
		}
	}

	/// Attach the owning backend handed to default-constructed instances.
	pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
		self.backend = Some(backend);
		self
	}

	pub fn registry(&self) -> &Arc<ClassRegistry> {
		&self.registry
	}

	/// Create an instance of the document type registered for `target`.
	///
	/// Fails with `UnknownType` / `UnknownCollection` when neither a type
	/// nor a collection name matches a registry entry.
	pub fn create_instance(
		&self,
		target: TypeTarget<'_>,
		attributes: Attributes,
		lazy: bool,
	) -> Result<DocRef> {
		let entry = self.resolve(target)?;
		let options = InstanceOptions {
			lazy,
			autoload: self.settings.autoload_embedded(),
			backend: self.backend.clone(),
		};
		Ok(match entry.constructor {
			Some(constructor) => constructor(attributes, options),
			None => entry.descriptor.construct(attributes, options),
		})
	}

	fn resolve(&self, target: TypeTarget<'_>) -> Result<ClassEntry> {
		match target {
			TypeTarget::Type(type_id) => self.registry.entry_for_type_id(type_id),
			TypeTarget::Collection(name) => self.registry.entry_for_collection(name),
		}
	}
}

impl std::fmt::Debug for InstanceFactory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InstanceFactory")
			.field("registry", &self.registry)
			.field("backend", &self.backend.is_some())
			.field("settings", &self.settings)
			.finish()
	}
}
