//! Integration tests for the class registry and instance factory.

use std::any::TypeId;
use std::sync::Arc;

use grappelli_core::document::Document;
use grappelli_core::error::DocumentError;
use grappelli_core::value::Value;
use grappelli_odm::{ClassRegistry, InstanceFactory, OdmSettings, RegisterParams, TypeTarget};
use grappelli_testkit::{Author, Book, Scrapbook, attrs};

#[test]
fn test_register_defaults_to_lowercased_type_name() {
	let registry = ClassRegistry::new();
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	assert_eq!(
		registry.collection_for(&Author::type_descriptor()),
		"author"
	);
}

#[test]
fn test_declared_meta_collection_beats_type_name() {
	let registry = ClassRegistry::new();
	registry.register(&Scrapbook::type_descriptor(), RegisterParams::new());
	assert_eq!(
		registry.collection_for(&Scrapbook::type_descriptor()),
		"scrapbooks"
	);
}

#[test]
fn test_explicit_params_collection_beats_declared_meta() {
	let registry = ClassRegistry::new();
	registry.register(
		&Scrapbook::type_descriptor(),
		RegisterParams::new().collection("albums"),
	);
	assert_eq!(
		registry.collection_for(&Scrapbook::type_descriptor()),
		"albums"
	);
	assert!(registry.has_collection("albums"));
	assert!(!registry.has_collection("scrapbooks"));
}

#[test]
fn test_registration_is_idempotent() {
	let registry = ClassRegistry::new();
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	assert_eq!(registry.len(), 1);
	assert_eq!(
		registry.type_for_collection("author").unwrap(),
		Author::type_descriptor()
	);
}

#[test]
fn test_collection_collision_evicts_prior_owner() {
	let registry = ClassRegistry::new();
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	registry.register(
		&Book::type_descriptor(),
		RegisterParams::new().collection("author"),
	);

	// The collection now resolves to Book; Author is gone entirely.
	assert_eq!(
		registry.type_for_collection("author").unwrap(),
		Book::type_descriptor()
	);
	assert_eq!(registry.len(), 1);
	assert!(matches!(
		registry.collection_for_type_id(TypeId::of::<Author>()),
		Err(DocumentError::UnknownType(_))
	));
}

#[test]
fn test_reregistering_under_new_collection_drops_old_reverse_mapping() {
	let registry = ClassRegistry::new();
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	registry.register(
		&Author::type_descriptor(),
		RegisterParams::new().collection("writers"),
	);

	assert!(registry.has_collection("writers"));
	assert!(!registry.has_collection("author"));
	assert!(matches!(
		registry.type_for_collection("author"),
		Err(DocumentError::UnknownCollection(_))
	));
}

#[test]
fn test_collection_for_autoregisters_unseen_types() {
	let registry = ClassRegistry::new();
	assert!(registry.is_empty());
	assert_eq!(registry.collection_for(&Book::type_descriptor()), "book");
	assert_eq!(registry.len(), 1);
	assert!(registry.has_collection("book"));
}

#[test]
fn test_autoregister_uses_declared_metadata() {
	let registry = ClassRegistry::new();
	registry.autoregister(&Scrapbook::type_descriptor());
	assert_eq!(
		registry.type_for_collection("scrapbooks").unwrap(),
		Scrapbook::type_descriptor()
	);
}

#[test]
fn test_type_for_unknown_collection_fails() {
	let registry = ClassRegistry::new();
	let err = registry.type_for_collection("nowhere").unwrap_err();
	assert_eq!(err, DocumentError::UnknownCollection("nowhere".to_owned()));
}

#[test]
fn test_create_instance_by_collection_name() {
	let registry = Arc::new(ClassRegistry::new());
	registry.register(&Book::type_descriptor(), RegisterParams::new());
	let factory = InstanceFactory::new(Arc::clone(&registry), OdmSettings::default());

	let doc = factory
		.create_instance(
			TypeTarget::Collection("book"),
			attrs([("title", "Nuages".into())]),
			true,
		)
		.unwrap();

	assert!(doc.is_lazy());
	assert!(doc.pk().is_none());
	assert_eq!(doc.descriptor(), Book::type_descriptor());
	assert_eq!(doc.attributes()["title"], Value::from("Nuages"));
}

#[test]
fn test_create_instance_by_type_id() {
	let registry = Arc::new(ClassRegistry::new());
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	let factory = InstanceFactory::new(Arc::clone(&registry), OdmSettings::default());

	let doc = factory
		.create_instance(
			TypeTarget::Type(TypeId::of::<Author>()),
			attrs([("name", "Jane".into())]),
			false,
		)
		.unwrap();

	assert!(!doc.is_lazy());
	assert_eq!(doc.descriptor(), Author::type_descriptor());
}

#[test]
fn test_create_instance_prefers_custom_constructor() {
	let registry = Arc::new(ClassRegistry::new());
	registry.register(
		&Book::type_descriptor(),
		RegisterParams::new().constructor(Arc::new(|mut attributes, _options| {
			attributes.insert("stamped".to_owned(), Value::Bool(true));
			Arc::new(Book::new(attributes)) as grappelli_core::DocRef
		})),
	);
	let factory = InstanceFactory::new(Arc::clone(&registry), OdmSettings::default());

	let doc = factory
		.create_instance(TypeTarget::Collection("book"), attrs([]), false)
		.unwrap();
	assert_eq!(doc.attributes()["stamped"], Value::Bool(true));
}

#[test]
fn test_create_instance_for_unknown_target_fails() {
	let registry = Arc::new(ClassRegistry::new());
	let factory = InstanceFactory::new(Arc::clone(&registry), OdmSettings::default());

	assert!(matches!(
		factory.create_instance(TypeTarget::Collection("ghosts"), attrs([]), false),
		Err(DocumentError::UnknownCollection(_))
	));
	assert!(matches!(
		factory.create_instance(TypeTarget::Type(TypeId::of::<Author>()), attrs([]), false),
		Err(DocumentError::UnknownType(_))
	));
}
