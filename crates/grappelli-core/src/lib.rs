//! # Grappelli core contracts
//!
//! Shared contracts for the Grappelli document-database client: the nested
//! [`value::Value`] model, the [`document::Document`] capability set, the
//! abstract [`backend::Backend`] interface, and the unified error type.
//!
//! The reference-resolution engine itself (class registry, instance factory,
//! serializer, deserializer) lives in `grappelli-odm`.

pub mod backend;
pub mod document;
pub mod error;
pub mod value;

pub use backend::{Backend, FilterOptions, ResultSet, SortOrder};
pub use document::{
	COLLECTION_KEY, Constructor, Document, FetchOutcome, InstanceOptions, LEGACY_PK_KEY, PK_KEY,
	TypeDescriptor, TypeMeta,
};
pub use error::{DocumentError, Result};
pub use value::{Attributes, DocRef, Key, Value};
