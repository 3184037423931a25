//! Integration tests for the reference deserializer.

use std::sync::Arc;

use grappelli_core::document::{COLLECTION_KEY, Document, LEGACY_PK_KEY, PK_KEY};
use grappelli_core::value::{Key, Value};
use grappelli_odm::{
	ClassRegistry, Codec, Deserializer, InstanceFactory, OdmSettings, RegisterParams,
};
use grappelli_testkit::{Author, Book, attrs};
use rstest::rstest;

fn deserializer() -> Deserializer {
	let registry = Arc::new(ClassRegistry::new());
	registry.register(&Author::type_descriptor(), RegisterParams::new());
	registry.register(&Book::type_descriptor(), RegisterParams::new());
	Deserializer::new(InstanceFactory::new(registry, OdmSettings::default()))
}

fn stub(pk_key: &str, pk: Value, collection: &str, extra: &[(&str, Value)]) -> Value {
	let mut fields = vec![(pk_key, pk), (COLLECTION_KEY, collection.into())];
	fields.extend(extra.iter().cloned());
	let map: indexmap::IndexMap<Key, Value> = fields
		.into_iter()
		.map(|(k, v)| (Key::from(k), v))
		.collect();
	Value::Map(map)
}

#[test]
fn test_stub_becomes_a_lazy_instance() {
	let out = deserializer().deserialize(&stub(
		PK_KEY,
		Value::Int(7),
		"book",
		&[("title", "Nuages".into())],
	));

	let doc = out.as_document().expect("expected a document instance");
	assert!(doc.is_lazy());
	assert_eq!(doc.pk(), Some(Value::Int(7)));
	assert_eq!(doc.descriptor(), Book::type_descriptor());
	// pk and __collection__ are stripped from the attributes.
	assert_eq!(
		doc.lazy_attributes(),
		attrs([("title", "Nuages".into())])
	);
}

#[test]
fn test_legacy_pk_key_still_deserializes() {
	let out = deserializer().deserialize(&stub(LEGACY_PK_KEY, Value::Int(3), "author", &[]));
	let doc = out.as_document().expect("expected a document instance");
	assert_eq!(doc.pk(), Some(Value::Int(3)));
	assert_eq!(doc.descriptor(), Author::type_descriptor());
}

#[rstest]
#[case::unknown_collection(stub(PK_KEY, Value::Int(7), "zines", &[]))]
#[case::missing_primary_key(Value::from_attributes(&attrs([
	(COLLECTION_KEY, "book".into()),
	("title", "Nuages".into()),
])))]
#[case::non_string_collection(Value::from_attributes(&attrs([
	(PK_KEY, Value::Int(7)),
	(COLLECTION_KEY, Value::Int(1)),
])))]
fn test_malformed_stubs_degrade_to_plain_mappings(#[case] value: Value) {
	let out = deserializer().deserialize(&value);
	assert_eq!(out, value);
}

#[test]
fn test_ordinary_mappings_recurse_per_key() {
	let inner = stub(PK_KEY, Value::Int(7), "book", &[]);
	let value = Value::from_attributes(&attrs([
		("name", "Jane".into()),
		("favorite", inner),
	]));

	let out = deserializer().deserialize(&value);
	let map = out.as_map().unwrap();
	assert_eq!(map.get(&Key::from("name")), Some(&Value::from("Jane")));
	assert!(
		map.get(&Key::from("favorite"))
			.unwrap()
			.as_document()
			.is_some()
	);
}

#[test]
fn test_sequences_collapse_to_ordered_lists() {
	let value = Value::Tuple(vec![
		Value::Int(1),
		Value::List(vec![stub(PK_KEY, Value::Int(7), "book", &[])]),
	]);

	let out = deserializer().deserialize(&value);
	match out {
		Value::List(items) => {
			assert_eq!(items[0], Value::Int(1));
			let inner = items[1].as_list().unwrap();
			assert!(inner[0].as_document().is_some());
		}
		other => panic!("expected a list, got {:?}", other),
	}
}

#[test]
fn test_scalars_pass_through_unchanged() {
	let d = deserializer();
	assert_eq!(d.deserialize(&Value::Int(42)), Value::Int(42));
	assert_eq!(d.deserialize(&Value::Null), Value::Null);
	assert_eq!(
		d.deserialize(&Value::Bytes(vec![1, 2])),
		Value::Bytes(vec![1, 2])
	);
}

#[test]
fn test_decoders_transform_values_before_classification() {
	let d = deserializer().with_decoder(Codec::new(
		|value| value.as_str() == Some("__marker__"),
		|_| Value::Int(99),
	));

	let value = Value::from_attributes(&attrs([("field", "__marker__".into())]));
	let out = d.deserialize(&value);
	assert_eq!(
		out,
		Value::from_attributes(&attrs([("field", Value::Int(99))]))
	);
}

#[test]
fn test_non_string_stub_keys_are_stringified_into_attributes() {
	let mut map = indexmap::IndexMap::new();
	map.insert(Key::from(PK_KEY), Value::Int(7));
	map.insert(Key::from(COLLECTION_KEY), "book".into());
	map.insert(Key::Int(3), "third".into());

	let out = deserializer().deserialize(&Value::Map(map));
	let doc = out.as_document().expect("expected a document instance");
	assert_eq!(doc.lazy_attributes(), attrs([("3", "third".into())]));
}
