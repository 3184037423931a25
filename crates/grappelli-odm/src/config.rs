//! Client-wide settings shared by the serializer and the instance factory.

/// Settings owned by one backend instance.
///
/// # Examples
///
/// ```
/// use grappelli_odm::OdmSettings;
///
/// let settings = OdmSettings::new().allow_documents_in_query(false);
/// assert!(settings.autoload_embedded());
/// assert!(!settings.documents_allowed_in_query());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OdmSettings {
	/// Whether lazily constructed embedded documents fetch their missing
	/// attributes on access
	autoload_embedded: bool,
	/// Whether raw document instances may appear inside query construction
	allow_documents_in_query: bool,
}

impl Default for OdmSettings {
	fn default() -> Self {
		Self {
			autoload_embedded: true,
			allow_documents_in_query: true,
		}
	}
}

impl OdmSettings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn autoload_embedded_documents(mut self, autoload: bool) -> Self {
		self.autoload_embedded = autoload;
		self
	}

	pub fn allow_documents_in_query(mut self, allow: bool) -> Self {
		self.allow_documents_in_query = allow;
		self
	}

	pub fn autoload_embedded(&self) -> bool {
		self.autoload_embedded
	}

	pub fn documents_allowed_in_query(&self) -> bool {
		self.allow_documents_in_query
	}
}
