use std::cmp::Ordering;

use serde::Serialize;

use super::{
	collation::Collation,
	contact::{Contact, ContactKey, SortAttribute},
	error::StoreError,
};

/// Cached sort value of a single contact, as of its last (re)indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortEntry {
	pub key: ContactKey,
	pub value: String,
}

impl SortEntry {
	#[must_use]
	pub fn of(contact: &Contact, attribute: SortAttribute) -> Self {
		Self {
			key: contact.key().clone(),
			value: contact.sort_value(attribute),
		}
	}
}

/// Ordered list of contacts, kept sorted incrementally instead of re-sorting on every change.
///
/// Incremental insertions place a new entry before the first entry comparing greater or
/// equal, so entries with equal values keep insertion order. Only [`SortIndex::rebuild_all`]
/// breaks ties by key.
#[derive(Debug, Default)]
pub struct SortIndex {
	entries: Vec<SortEntry>,
	collation: Collation,
}

impl SortIndex {
	#[must_use]
	pub fn new(collation: Collation) -> Self {
		Self {
			entries: Vec::new(),
			collation,
		}
	}

	#[must_use]
	pub const fn collation(&self) -> &Collation {
		&self.collation
	}

	pub fn insert(&mut self, entry: SortEntry) {
		// Entries are always sorted by value, so a binary search finds the same slot a linear
		// scan for the first `>=` entry would.
		let idx = self.entries.partition_point(|existing| {
			self.collation.compare(&existing.value, &entry.value) == Ordering::Less
		});

		self.entries.insert(idx, entry);
	}

	pub fn remove(&mut self, key: &ContactKey) -> Option<SortEntry> {
		self.position(key).map(|idx| self.entries.remove(idx))
	}

	/// Moves `key` to the slot matching `value`.
	///
	/// Returns `Ok(false)` without touching anything when the cached value is already `value`.
	pub fn reposition(&mut self, key: &ContactKey, value: String) -> Result<bool, StoreError> {
		let idx = self
			.position(key)
			.ok_or_else(|| StoreError::NotFound(key.clone()))?;

		if self.entries[idx].value == value {
			return Ok(false);
		}

		let mut entry = self.entries.remove(idx);
		entry.value = value;
		self.insert(entry);

		Ok(true)
	}

	/// Discards every entry and sorts all non group contacts from scratch, breaking ties by key.
	pub fn rebuild_all<'c>(
		&mut self,
		contacts: impl IntoIterator<Item = &'c Contact>,
		attribute: SortAttribute,
	) {
		let mut entries = contacts
			.into_iter()
			.filter(|contact| !contact.kind().is_group())
			.map(|contact| SortEntry::of(contact, attribute))
			.collect::<Vec<_>>();

		entries.sort_by(|a, b| {
			self.collation
				.compare(&a.value, &b.value)
				.then_with(|| {
					self.collation
						.compare_exact(a.key.as_str(), b.key.as_str())
				})
				.then_with(|| a.key.cmp(&b.key))
		});

		self.entries = entries;
	}

	#[must_use]
	pub fn entries(&self) -> &[SortEntry] {
		&self.entries
	}

	pub fn keys(&self) -> impl Iterator<Item = &ContactKey> {
		self.entries.iter().map(|entry| &entry.key)
	}

	#[must_use]
	pub fn position(&self, key: &ContactKey) -> Option<usize> {
		self.entries.iter().position(|entry| &entry.key == key)
	}

	#[must_use]
	pub fn get(&self, key: &ContactKey) -> Option<&SortEntry> {
		self.position(key).map(|idx| &self.entries[idx])
	}

	#[must_use]
	pub fn contains(&self, key: &ContactKey) -> bool {
		self.position(key).is_some()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	#[must_use]
	pub fn is_sorted(&self) -> bool {
		self.entries
			.windows(2)
			.all(|pair| self.collation.compare(&pair[0].value, &pair[1].value) != Ordering::Greater)
	}
}
