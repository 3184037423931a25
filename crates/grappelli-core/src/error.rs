//! Unified error type for document-database client operations.

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Unified error type for the document client core.
///
/// Registry misses (`UnknownType`, `UnknownCollection`) and the query
/// restriction (`QueryDocumentNotAllowed`) are surfaced to the caller and
/// never retried. `DoesNotExist` is raised by storage backends and by eager
/// attribute fetching; `MultipleObjectsReturned` only by `Backend::get`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
	/// The document type has not been registered with the class registry
	#[error("unknown document type: {0}")]
	UnknownType(String),

	/// No registered document type owns the given collection name
	#[error("unknown collection: {0}")]
	UnknownCollection(String),

	/// A non-lazy document instance was embedded in a query while
	/// documents are disallowed in queries
	#[error("documents are not allowed in queries")]
	QueryDocumentNotAllowed,

	/// The referenced record does not exist in the backend
	#[error("document does not exist: {0}")]
	DoesNotExist(String),

	/// More than one record matched a single-object lookup
	#[error("multiple documents returned: {0}")]
	MultipleObjectsReturned(String),

	/// A value could not be encoded for storage
	#[error("serialization error: {0}")]
	Serialization(String),

	/// A storage backend operation failed
	#[error("backend error: {0}")]
	Backend(String),
}

impl From<serde_json::Error> for DocumentError {
	fn from(err: serde_json::Error) -> Self {
		DocumentError::Serialization(err.to_string())
	}
}
