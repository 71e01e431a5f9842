//! Iterator and range helpers shared by services built on the client.
//!
//! These are the crate's pure utility surface: first-occurrence deduplication, ordered
//! grouping, inclusive integer ranges, and a case-insensitive sort comparator. Multi-key
//! sorts compose the comparator with [`Ordering::then_with`] from std.

// std
use std::{
	cmp::Ordering,
	collections::{HashMap, HashSet},
	hash::Hash,
};
// self
use crate::_prelude::*;

/// Error returned by [`range`] when the bounds are inverted.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Invalid range bounds: start {start} must not exceed end {end}.")]
pub struct InvalidRangeError {
	/// Requested start bound.
	pub start: i64,
	/// Requested end bound.
	pub end: i64,
}

/// Produces the inclusive integer range `start..=end` as a vector.
pub fn range(start: i64, end: i64) -> Result<Vec<i64>, InvalidRangeError> {
	if start > end {
		return Err(InvalidRangeError { start, end });
	}

	Ok((start..=end).collect())
}

/// One group produced by [`IteratorExt::group_ordered`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group<K, T> {
	/// Key shared by every item in the group.
	pub key: K,
	/// Items carrying the key, in their original order.
	pub items: Vec<T>,
}

/// Extra combinators available on every iterator.
pub trait IteratorExt
where
	Self: Iterator + Sized,
{
	/// Keeps the first item for every key produced by `key_of`, preserving order.
	fn distinct_by<K, F>(self, key_of: F) -> DistinctBy<Self, K, F>
	where
		K: Eq + Hash,
		F: FnMut(&Self::Item) -> K,
	{
		DistinctBy { iter: self, seen: HashSet::new(), key_of }
	}

	/// Keeps the first occurrence of every item, preserving order.
	fn distinct(self) -> DistinctBy<Self, Self::Item, fn(&Self::Item) -> Self::Item>
	where
		Self::Item: Clone + Eq + Hash,
	{
		self.distinct_by(clone_item as fn(&Self::Item) -> Self::Item)
	}

	/// Groups items by key, preserving first-occurrence key order and item order.
	fn group_ordered<K, F>(self, mut key_of: F) -> Vec<Group<K, Self::Item>>
	where
		K: Clone + Eq + Hash,
		F: FnMut(&Self::Item) -> K,
	{
		let mut slots: HashMap<K, usize> = HashMap::new();
		let mut groups: Vec<Group<K, Self::Item>> = Vec::new();

		for item in self {
			let key = key_of(&item);

			match slots.get(&key) {
				Some(&slot) => groups[slot].items.push(item),
				None => {
					slots.insert(key.clone(), groups.len());
					groups.push(Group { key, items: vec![item] });
				},
			}
		}

		groups
	}
}
impl<I> IteratorExt for I where I: Iterator {}

fn clone_item<T>(item: &T) -> T
where
	T: Clone,
{
	item.clone()
}

/// Iterator adapter behind [`IteratorExt::distinct_by`].
#[derive(Clone, Debug)]
pub struct DistinctBy<I, K, F> {
	iter: I,
	seen: HashSet<K>,
	key_of: F,
}
impl<I, K, F> Iterator for DistinctBy<I, K, F>
where
	I: Iterator,
	K: Eq + Hash,
	F: FnMut(&I::Item) -> K,
{
	type Item = I::Item;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let item = self.iter.next()?;

			if self.seen.insert((self.key_of)(&item)) {
				return Some(item);
			}
		}
	}
}

/// Builds an ASCII case-insensitive comparator over a string key.
///
/// Compose multi-key sorts with [`Ordering::then_with`]:
///
/// ```
/// use http_courier::ext::case_insensitive;
///
/// let mut users = vec![("Zoe", "adams"), ("ann", "Baker"), ("Bob", "Adams")];
/// let by_last = case_insensitive(|user: &(&str, &str)| user.1);
/// let by_first = case_insensitive(|user: &(&str, &str)| user.0);
///
/// users.sort_by(|a, b| by_last(a, b).then_with(|| by_first(a, b)));
///
/// assert_eq!(users, [("Bob", "Adams"), ("Zoe", "adams"), ("ann", "Baker")]);
/// ```
pub fn case_insensitive<T, F>(key_of: F) -> impl Fn(&T, &T) -> Ordering
where
	F: Fn(&T) -> &str,
{
	move |a, b| {
		let a = key_of(a);
		let b = key_of(b);

		a.chars().map(|c| c.to_ascii_lowercase()).cmp(b.chars().map(|c| c.to_ascii_lowercase()))
	}
}
