//! Pluggable value transforms applied before the serializer's and
//! deserializer's own rules.

use std::fmt;

use grappelli_core::value::Value;

/// A `(predicate, transform)` pair.
///
/// Codecs are checked in order against the current value; each matching
/// predicate's transform replaces the value before the next pair is
/// checked, and the final value is then classified by the ordinary
/// recursion rules.
pub struct Codec {
	matches: Box<dyn Fn(&Value) -> bool + Send + Sync>,
	transform: Box<dyn Fn(&Value) -> Value + Send + Sync>,
}

impl Codec {
	pub fn new<M, T>(matches: M, transform: T) -> Self
	where
		M: Fn(&Value) -> bool + Send + Sync + 'static,
		T: Fn(&Value) -> Value + Send + Sync + 'static,
	{
		Self {
			matches: Box::new(matches),
			transform: Box::new(transform),
		}
	}

	pub fn matches(&self, value: &Value) -> bool {
		(self.matches)(value)
	}

	pub fn apply(&self, value: &Value) -> Value {
		(self.transform)(value)
	}
}

impl fmt::Debug for Codec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Codec").finish_non_exhaustive()
	}
}

/// Run a codec pipeline over a value, returning the transformed value if
/// any codec matched.
pub(crate) fn apply_pipeline(codecs: &[Codec], value: &Value) -> Option<Value> {
	let mut current: Option<Value> = None;
	for codec in codecs {
		let target = current.as_ref().unwrap_or(value);
		if codec.matches(target) {
			current = Some(codec.apply(target));
		}
	}
	current
}
