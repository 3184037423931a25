//! In-memory storage backend.
//!
//! Implements the abstract backend operations against per-collection vectors
//! so serializer and deserializer behavior can be exercised without a real
//! database. Saves are counted to let tests assert on autosave side effects.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use parking_lot::RwLock;
use uuid::Uuid;

use grappelli_core::backend::{Backend, FilterOptions, ResultSet, SortOrder};
use grappelli_core::document::{Document, InstanceOptions, PK_KEY, TypeDescriptor};
use grappelli_core::error::{DocumentError, Result};
use grappelli_core::value::{Attributes, DocRef, Value};
use grappelli_odm::registry::ClassRegistry;

#[derive(Clone)]
struct Record {
	pk: Value,
	attributes: Attributes,
}

/// Registry-aware in-memory backend.
pub struct MemoryBackend {
	registry: Arc<ClassRegistry>,
	store: RwLock<HashMap<String, Vec<Record>>>,
	save_calls: AtomicUsize,
}

impl MemoryBackend {
	pub fn new(registry: Arc<ClassRegistry>) -> Self {
		Self {
			registry,
			store: RwLock::new(HashMap::new()),
			save_calls: AtomicUsize::new(0),
		}
	}

	pub fn registry(&self) -> &Arc<ClassRegistry> {
		&self.registry
	}

	/// Number of save operations performed since construction.
	pub fn save_count(&self) -> usize {
		self.save_calls.load(AtomicOrdering::SeqCst)
	}

	/// Number of records stored in a collection.
	pub fn collection_len(&self, collection: &str) -> usize {
		self.store
			.read()
			.get(collection)
			.map_or(0, |records| records.len())
	}

	/// Remove a record directly, bypassing `delete`. Lets tests simulate a
	/// referenced document disappearing behind a lazy instance.
	pub fn evict(&self, collection: &str, pk: &Value) {
		if let Some(records) = self.store.write().get_mut(collection) {
			records.retain(|record| record.pk != *pk);
		}
	}

	fn matching(&self, collection: &str, properties: &Attributes) -> Vec<Record> {
		self.store
			.read()
			.get(collection)
			.map(|records| {
				records
					.iter()
					.filter(|record| record_matches(record, properties))
					.cloned()
					.collect()
			})
			.unwrap_or_default()
	}

	fn construct(&self, ty: &TypeDescriptor, record: Record) -> DocRef {
		let document = ty.construct(
			record.attributes,
			InstanceOptions {
				lazy: false,
				autoload: true,
				backend: None,
			},
		);
		document.set_pk(record.pk);
		document
	}
}

impl Backend for MemoryBackend {
	fn save(&self, document: &dyn Document) -> Result<()> {
		let collection = self.registry.collection_for(&document.descriptor());
		let pk = match document.pk() {
			Some(pk) => pk,
			None => {
				let pk = Value::Str(Uuid::new_v4().to_string());
				document.set_pk(pk.clone());
				pk
			}
		};
		let record = Record {
			pk: pk.clone(),
			attributes: document.attributes(),
		};
		let mut store = self.store.write();
		let records = store.entry(collection).or_default();
		match records.iter_mut().find(|existing| existing.pk == pk) {
			Some(existing) => *existing = record,
			None => records.push(record),
		}
		self.save_calls.fetch_add(1, AtomicOrdering::SeqCst);
		Ok(())
	}

	fn get(&self, ty: &TypeDescriptor, properties: &Attributes) -> Result<DocRef> {
		let collection = self.registry.collection_for(ty);
		let mut matches = self.matching(&collection, properties);
		match matches.len() {
			0 => Err(DocumentError::DoesNotExist(ty.name().to_owned())),
			1 => Ok(self.construct(ty, matches.remove(0))),
			_ => Err(DocumentError::MultipleObjectsReturned(ty.name().to_owned())),
		}
	}

	fn delete(&self, document: &dyn Document) -> Result<()> {
		let collection = self.registry.collection_for(&document.descriptor());
		let pk = document.pk().ok_or_else(|| {
			DocumentError::Backend("cannot delete a document without a primary key".to_owned())
		})?;
		let mut store = self.store.write();
		let records = store.get_mut(&collection).ok_or_else(|| {
			DocumentError::DoesNotExist(document.descriptor().name().to_owned())
		})?;
		let before = records.len();
		records.retain(|record| record.pk != pk);
		if records.len() == before {
			return Err(DocumentError::DoesNotExist(
				document.descriptor().name().to_owned(),
			));
		}
		Ok(())
	}

	fn filter(
		&self,
		ty: &TypeDescriptor,
		properties: &Attributes,
		options: FilterOptions,
	) -> Result<Box<dyn ResultSet + '_>> {
		let collection = self.registry.collection_for(ty);
		let mut matches = self.matching(&collection, properties);
		for (field, order) in options.sort_by.iter().rev() {
			matches.sort_by(|a, b| {
				let ordering = compare_field(a, b, field);
				match order {
					SortOrder::Ascending => ordering,
					SortOrder::Descending => ordering.reverse(),
				}
			});
		}
		let offset = options.offset.unwrap_or(0);
		let limit = options.limit.unwrap_or(usize::MAX);
		let ty = ty.clone();
		Ok(Box::new(
			matches
				.into_iter()
				.skip(offset)
				.take(limit)
				.map(move |record| Ok(self.construct(&ty, record))),
		))
	}
}

fn record_matches(record: &Record, properties: &Attributes) -> bool {
	properties.iter().all(|(key, expected)| {
		if key == PK_KEY {
			record.pk == *expected
		} else {
			record.attributes.get(key) == Some(expected)
		}
	})
}

fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
	compare_values(a.attributes.get(field), b.attributes.get(field))
}

// Total enough for test data; mixed-type fields compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	match (a, b) {
		(Some(Value::Int(a)), Some(Value::Int(b))) => a.cmp(b),
		(Some(Value::Float(a)), Some(Value::Float(b))) => {
			a.partial_cmp(b).unwrap_or(Ordering::Equal)
		}
		(Some(Value::Str(a)), Some(Value::Str(b))) => a.cmp(b),
		(Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		_ => Ordering::Equal,
	}
}
