//! # Storage backend interface
//!
//! Abstract operations the client core expects from a concrete storage
//! backend. Implementations live outside the core (a real database driver,
//! or the in-memory backend in `grappelli-testkit`); the core only calls
//! these entry points, synchronously, and never schedules or retries them.

use crate::document::{Document, TypeDescriptor};
use crate::error::Result;
use crate::value::{Attributes, DocRef};

/// Sort direction for filtered result sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
	Ascending,
	Descending,
}

/// Options for [`Backend::filter`]
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
	/// Fields to sort by, applied in order
	pub sort_by: Vec<(String, SortOrder)>,
	/// Maximal number of documents to return
	pub limit: Option<usize>,
	/// Offset from the beginning of the result list
	pub offset: Option<usize>,
}

impl FilterOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
		self.sort_by.push((field.into(), order));
		self
	}

	pub fn limit(mut self, limit: usize) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn offset(mut self, offset: usize) -> Self {
		self.offset = Some(offset);
		self
	}
}

/// Lazy result set yielded by [`Backend::filter`]
pub trait ResultSet: Iterator<Item = Result<DocRef>> {}

impl<T: Iterator<Item = Result<DocRef>>> ResultSet for T {}

/// Abstract storage operations implemented by concrete backends.
pub trait Backend: Send + Sync {
	/// Persist a document instance, assigning a primary key if absent.
	fn save(&self, document: &dyn Document) -> Result<()>;

	/// Retrieve the single document matching `properties`.
	///
	/// Fails with `DoesNotExist` when nothing matches and
	/// `MultipleObjectsReturned` when more than one document does.
	fn get(&self, ty: &TypeDescriptor, properties: &Attributes) -> Result<DocRef>;

	/// Delete a document instance.
	fn delete(&self, document: &dyn Document) -> Result<()>;

	/// Filter documents matching `properties`, honoring sort/limit/offset.
	fn filter(
		&self,
		ty: &TypeDescriptor,
		properties: &Attributes,
		options: FilterOptions,
	) -> Result<Box<dyn ResultSet + '_>>;
}
