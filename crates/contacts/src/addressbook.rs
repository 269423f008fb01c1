use std::{
	collections::{BTreeSet, HashMap},
	fmt,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::contact::{Contact, ContactKey};

/// Identifier of the address book owning a contact. Holds no reference to the book itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressbookId(String);

impl AddressbookId {
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for AddressbookId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for AddressbookId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl fmt::Display for AddressbookId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Which contacts each address book holds.
#[derive(Debug, Default)]
pub struct Addressbooks {
	members: HashMap<AddressbookId, BTreeSet<ContactKey>>,
}

impl Addressbooks {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_contact(&mut self, contact: &Contact) {
		let inserted = self
			.members
			.entry(contact.addressbook().clone())
			.or_default()
			.insert(contact.key().clone());

		if !inserted {
			debug!(
				"Contact already member of addressbook <key='{}', addressbook='{}'>",
				contact.key(),
				contact.addressbook()
			);
		}
	}

	pub fn remove_contact(&mut self, contact: &Contact) {
		let removed = self
			.members
			.get_mut(contact.addressbook())
			.is_some_and(|keys| keys.remove(contact.key()));

		if !removed {
			debug!(
				"Contact was not a member of addressbook <key='{}', addressbook='{}'>",
				contact.key(),
				contact.addressbook()
			);
		}
	}

	pub fn move_contact(&mut self, key: &ContactKey, from: &AddressbookId, to: &AddressbookId) {
		if let Some(keys) = self.members.get_mut(from) {
			keys.remove(key);
		}

		self.members
			.entry(to.clone())
			.or_default()
			.insert(key.clone());
	}

	#[must_use]
	pub fn contains(&self, addressbook: &AddressbookId, key: &ContactKey) -> bool {
		self.members
			.get(addressbook)
			.is_some_and(|keys| keys.contains(key))
	}

	pub fn contacts_of(&self, addressbook: &AddressbookId) -> impl Iterator<Item = &ContactKey> {
		self.members.get(addressbook).into_iter().flatten()
	}
}
