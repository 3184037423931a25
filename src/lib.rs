//! # Grappelli
//!
//! A document-database client for Rust, organized around an explicit class
//! registry and a recursive reference serializer/deserializer.
//!
//! Document types are registered against named collections; the serializer
//! converts in-memory document graphs into storage-ready nested data
//! (embedding referenced documents up to a configurable depth, or emitting
//! `{pk, __collection__}` reference stubs), and the deserializer
//! reconstructs object graphs from stored data, materializing references as
//! lazy instances.
//!
//! Concrete storage backends implement the [`Backend`] trait; the engine
//! itself never touches a database.
//!
//! ## Feature Flags
//!
//! - `testkit` - In-memory backend and fixture document types for tests

pub use grappelli_core::{
	Attributes, Backend, COLLECTION_KEY, Constructor, DocRef, Document, DocumentError,
	FetchOutcome, FilterOptions, InstanceOptions, Key, LEGACY_PK_KEY, PK_KEY, Result, ResultSet,
	SortOrder, TypeDescriptor, TypeMeta, Value,
};
pub use grappelli_odm::{
	ClassEntry, ClassRegistry, Codec, Deserializer, InstanceFactory, OdmSettings, RegisterParams,
	SerializeOptions, Serializer, TypeTarget,
};

/// Core contracts: value model, document capability set, backend interface.
pub mod core {
	pub use grappelli_core::*;
}

/// The reference-resolution and serialization engine.
pub mod odm {
	pub use grappelli_odm::*;
}

/// Test tooling: in-memory backend and fixture document types.
#[cfg(feature = "testkit")]
pub mod testkit {
	pub use grappelli_testkit::*;
}
