//! Ordered header collections with case-insensitive name matching.

// crates.io
use serde::ser::SerializeMap;
// self
use crate::_prelude::*;

/// Header names minted or overridden by the client itself.
pub mod names {
	/// Unique id attached to every outgoing request.
	pub const X_REQUEST_ID: &str = "X-Request-ID";
	/// Correlation id propagated across service hops.
	pub const X_CORRELATION_ID: &str = "X-Correlation-ID";
	/// Body media type.
	pub const CONTENT_TYPE: &str = "Content-Type";
	/// Credentials header produced by auth factories.
	pub const AUTHORIZATION: &str = "Authorization";
}

/// Ordered header map with case-insensitive name matching and overlay merge semantics.
///
/// Insertion order is preserved. Replacing an entry keeps its position while adopting the
/// newer spelling and value, so a sequence of [`overlay`](Self::overlay) calls behaves as
/// last-writer-wins regardless of how each layer capitalizes a name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderBag(Vec<(String, String)>);
impl HeaderBag {
	/// Creates an empty bag.
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, value);

		self
	}

	/// Inserts a header, replacing any entry whose name matches case-insensitively.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();

		match self.position(&name) {
			Some(idx) => self.0[idx] = (name, value),
			None => self.0.push((name, value)),
		}
	}

	/// Returns the value of the first header matching `name` case-insensitively.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.position(name).map(|idx| self.0[idx].1.as_str())
	}

	/// Returns `true` when a header matching `name` case-insensitively exists.
	pub fn contains(&self, name: &str) -> bool {
		self.position(name).is_some()
	}

	/// Removes the header matching `name` case-insensitively, returning its value.
	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.position(name).map(|idx| self.0.remove(idx).1)
	}

	/// Applies `other` on top of `self`; colliding names take `other`'s value.
	pub fn overlay(&mut self, other: &HeaderBag) {
		for (name, value) in other.iter() {
			self.insert(name, value);
		}
	}

	/// Iterates entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the bag holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn position(&self, name: &str) -> Option<usize> {
		self.0.iter().position(|(existing, _)| existing.eq_ignore_ascii_case(name))
	}
}
impl Serialize for HeaderBag {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.0.len()))?;

		for (name, value) in &self.0 {
			map.serialize_entry(name, value)?;
		}

		map.end()
	}
}
impl<N, V> FromIterator<(N, V)> for HeaderBag
where
	N: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (N, V)>>(entries: I) -> Self {
		let mut bag = Self::new();

		for (name, value) in entries {
			bag.insert(name, value);
		}

		bag
	}
}
impl IntoIterator for HeaderBag {
	type IntoIter = std::vec::IntoIter<Self::Item>;
	type Item = (String, String);

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
