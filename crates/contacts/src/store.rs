use std::{collections::HashMap, fmt::Display};

use tracing::{debug, warn};

use super::{
	addressbook::AddressbookId,
	collation::Collation,
	config::ContactsConfig,
	contact::{Contact, ContactKey, SortAttribute},
	error::StoreError,
	index::{SortEntry, SortIndex},
	remote::RemoteLink,
};

/// In memory contacts collection with its sorted index.
///
/// Every mutation is synchronous and restores the index invariants before returning. Failed
/// mutations leave the store untouched, are logged and kept as diagnostics until drained with
/// [`ContactStore::take_diagnostics`].
#[derive(Debug, Default)]
pub struct ContactStore {
	contacts: HashMap<ContactKey, Contact>,
	index: SortIndex,
	order: SortAttribute,
	index_stale: bool,
	diagnostics: Vec<StoreError>,
}

impl ContactStore {
	#[must_use]
	pub fn new(order: SortAttribute, collation: Collation) -> Self {
		Self {
			contacts: HashMap::new(),
			index: SortIndex::new(collation),
			order,
			index_stale: false,
			diagnostics: Vec::new(),
		}
	}

	#[must_use]
	pub fn from_config(config: &ContactsConfig) -> Self {
		Self::new(config.default_order, Collation::new(&config.locale))
	}

	fn diagnose(&mut self, e: StoreError) -> StoreError {
		warn!("{e}");
		self.diagnostics.push(e.clone());
		e
	}

	/// Bulk insert, mostly for the initial load.
	///
	/// The sorted index is NOT updated, call [`ContactStore::sort_contacts`] once everything is
	/// in. Items failing validation are skipped. Returns how many contacts were stored.
	pub fn append_contacts<I, C>(&mut self, items: I) -> usize
	where
		I: IntoIterator<Item = C>,
		C: TryInto<Contact>,
		C::Error: Display,
	{
		let mut appended = 0;

		for item in items {
			match item.try_into() {
				Ok(contact) => {
					self.contacts.insert(contact.key().clone(), contact);
					appended += 1;
				}
				Err(e) => {
					self.diagnose(StoreError::MalformedEntity(e.to_string()));
				}
			}
		}

		if appended > 0 {
			self.index_stale = true;
		}

		debug!(appended, total = self.contacts.len(), "Appended contacts;");

		appended
	}

	pub fn add_contact(&mut self, contact: Contact) -> Result<(), StoreError> {
		if self.contacts.contains_key(contact.key()) {
			return Err(self.diagnose(StoreError::DuplicateKey(contact.key().clone())));
		}

		if !contact.kind().is_group() {
			self.index.insert(SortEntry::of(&contact, self.order));
		}

		debug!("Added contact <key='{}'>", contact.key());
		self.contacts.insert(contact.key().clone(), contact);

		Ok(())
	}

	pub fn delete_contact(&mut self, contact: &Contact) -> Result<(), StoreError> {
		self.delete_contact_by_key(contact.key()).map(|_| ())
	}

	pub fn delete_contact_by_key(&mut self, key: &ContactKey) -> Result<Contact, StoreError> {
		let Some(removed) = self.contacts.remove(key) else {
			return Err(self.diagnose(StoreError::NotFound(key.clone())));
		};

		if self.index.remove(key).is_none() && !removed.kind().is_group() && !self.index_stale {
			warn!("Deleted contact was missing from the sorted index <key='{key}'>");
		}

		debug!("Deleted contact <key='{key}'>");

		Ok(removed)
	}

	/// Replaces the stored contact's data in place, repositioning it only if its sort value
	/// actually changed.
	pub fn update_contact(&mut self, contact: Contact) -> Result<(), StoreError> {
		let key = contact.key().clone();
		let order = self.order;

		let Some(stored) = self.contacts.get_mut(&key) else {
			return Err(self.diagnose(StoreError::NotFound(key)));
		};

		let was_group = stored.kind().is_group();
		stored.replace_from(contact);
		let is_group = stored.kind().is_group();
		let value = stored.sort_value(order);

		match (was_group, is_group) {
			(true, true) => {}
			(false, true) => {
				self.index.remove(&key);
			}
			(true, false) => {
				// A bulk append may have turned an indexed contact into a group
				self.index.remove(&key);
				self.index.insert(SortEntry { key: key.clone(), value });
			}
			(false, false) => match self.index.reposition(&key, value.clone()) {
				Ok(true) => debug!("Repositioned contact <key='{key}'>"),
				Ok(false) => {}
				// Only possible between a bulk append and the following sort
				Err(_) => self.index.insert(SortEntry { key: key.clone(), value }),
			},
		}

		debug!("Updated contact <key='{key}'>");

		Ok(())
	}

	/// Moves the stored contact to `addressbook`, returning the one it belonged to.
	pub fn update_contact_addressbook(
		&mut self,
		key: &ContactKey,
		addressbook: AddressbookId,
	) -> Result<AddressbookId, StoreError> {
		let Some(stored) = self.contacts.get_mut(key) else {
			return Err(self.diagnose(StoreError::NotFound(key.clone())));
		};

		let previous = stored.addressbook().clone();
		stored.set_addressbook(addressbook);

		Ok(previous)
	}

	/// Links the stored contact to its freshly created remote resource.
	pub fn attach_remote_link(
		&mut self,
		key: &ContactKey,
		link: RemoteLink,
	) -> Result<(), StoreError> {
		let Some(stored) = self.contacts.get_mut(key) else {
			return Err(self.diagnose(StoreError::NotFound(key.clone())));
		};

		stored.set_remote(link);

		Ok(())
	}

	/// Changes the active sort attribute. Does not rebuild the index by itself.
	pub fn set_order(&mut self, order: SortAttribute) {
		debug!(%order, "Changed contacts order;");
		self.order = order;
	}

	pub fn sort_contacts(&mut self) {
		self.index.rebuild_all(self.contacts.values(), self.order);
		self.index_stale = false;
	}

	#[must_use]
	pub const fn contacts(&self) -> &HashMap<ContactKey, Contact> {
		&self.contacts
	}

	#[must_use]
	pub fn ordered(&self) -> &[SortEntry] {
		self.index.entries()
	}

	/// Sorted contacts, resolved from the index.
	pub fn ordered_contacts(&self) -> impl Iterator<Item = &Contact> {
		self.index
			.keys()
			.filter_map(|key| self.contacts.get(key))
	}

	#[must_use]
	pub fn get(&self, key: &ContactKey) -> Option<&Contact> {
		self.contacts.get(key)
	}

	#[must_use]
	pub const fn order(&self) -> SortAttribute {
		self.order
	}

	#[must_use]
	pub const fn index(&self) -> &SortIndex {
		&self.index
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.contacts.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.contacts.is_empty()
	}

	/// Whether contacts were bulk appended since the last [`ContactStore::sort_contacts`].
	#[must_use]
	pub const fn is_index_stale(&self) -> bool {
		self.index_stale
	}

	#[must_use]
	pub fn diagnostics(&self) -> &[StoreError] {
		&self.diagnostics
	}

	pub fn take_diagnostics(&mut self) -> Vec<StoreError> {
		std::mem::take(&mut self.diagnostics)
	}
}
