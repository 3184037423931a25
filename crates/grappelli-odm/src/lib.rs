//! # Grappelli ODM engine
//!
//! The reference-resolution and object-graph serialization engine of the
//! Grappelli document-database client. Four components, leaves first:
//!
//! - [`registry::ClassRegistry`] — document types mapped to collection names
//! - [`factory::InstanceFactory`] — collection-or-type to constructible instance
//! - [`serializer::Serializer`] — object graph to storage-ready nested data
//! - [`deserializer::Deserializer`] — stored data back to lazy/eager documents
//!
//! Application code hands a document graph to the serializer, whose output
//! goes to a backend's write path; the backend's read path hands stored
//! data to the deserializer, which yields documents back.

pub mod codec;
pub mod config;
pub mod deserializer;
pub mod factory;
pub mod registry;
pub mod serializer;

pub use codec::Codec;
pub use config::OdmSettings;
pub use deserializer::Deserializer;
pub use factory::{InstanceFactory, TypeTarget};
pub use registry::{ClassEntry, ClassRegistry, RegisterParams};
pub use serializer::{SerializeOptions, Serializer};
