//! Smoke test for the facade crate: the full register/serialize/deserialize
//! flow driven through the re-exported surface only.

use std::sync::Arc;

use grappelli::{
	ClassRegistry, Deserializer, Document, InstanceFactory, Key, OdmSettings, RegisterParams,
	SerializeOptions, Serializer, Value,
};
use grappelli_testkit::{Author, Book, MemoryBackend, attrs};

#[test]
fn test_document_graph_survives_a_storage_round_trip() {
	let registry = Arc::new(ClassRegistry::new());
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	registry.register(&Book::type_descriptor(), RegisterParams::new());
	let backend = Arc::new(MemoryBackend::new(Arc::clone(&registry)));

	let book = Arc::new(Book::new(attrs([("title", "Nuages".into())])));
	let author = Author::new(attrs([
		("name", "Jane".into()),
		("book", Value::Document(book)),
	]));

	let wire = Serializer::new(&registry, &*backend)
		.serialize(
			&Value::from_attributes(&author.attributes()),
			&SerializeOptions::default(),
		)
		.unwrap();
	// The unsaved book was autosaved so its reference stub is valid.
	assert_eq!(backend.save_count(), 1);
	wire.to_json().unwrap();

	let factory = InstanceFactory::new(Arc::clone(&registry), OdmSettings::default())
		.with_backend(backend.clone());
	let out = Deserializer::new(factory).deserialize(&wire);

	let map = out.as_map().unwrap();
	assert_eq!(map.get(&Key::from("name")), Some(&Value::from("Jane")));
	let reference = map
		.get(&Key::from("book"))
		.unwrap()
		.as_document()
		.expect("reference should come back as a document");
	assert!(reference.is_lazy());
	assert!(reference.pk().is_some());
}
