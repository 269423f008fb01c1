use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

use super::{addressbook::AddressbookId, remote::RemoteLink};

/// Stable, unique identifier of a contact inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactKey(String);

impl ContactKey {
	pub fn new(key: impl Into<String>) -> Result<Self, ContactError> {
		let key = key.into();
		if key.trim().is_empty() {
			return Err(ContactError::EmptyKey);
		}

		Ok(Self(key))
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ContactKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for ContactKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
	#[error("contact key must not be empty")]
	EmptyKey,
	#[error("contact data must be an object")]
	NotAnObject,
	#[error("unknown contact kind: {0}")]
	UnknownKind(String),
	#[error("invalid property <name='{name}'>: expected {expected}")]
	InvalidProperty {
		name: &'static str,
		expected: &'static str,
	},
}

/// Attribute driving the order of the sorted contacts list.
#[derive(
	Debug,
	Default,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
)]
pub enum SortAttribute {
	#[default]
	#[serde(rename = "displayName")]
	#[strum(serialize = "displayName")]
	DisplayName,
	#[serde(rename = "firstName")]
	#[strum(serialize = "firstName")]
	FirstName,
	#[serde(rename = "lastName")]
	#[strum(serialize = "lastName")]
	LastName,
	#[serde(rename = "org")]
	#[strum(serialize = "org")]
	Company,
}

/// Mirrors the vCard `KIND` property.
#[derive(
	Debug,
	Default,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContactKind {
	#[default]
	Individual,
	#[strum(serialize = "org")]
	#[serde(rename = "org")]
	Organization,
	Location,
	Group,
}

impl ContactKind {
	/// Group-like entities are never part of the sorted contacts list.
	#[must_use]
	pub const fn is_group(self) -> bool {
		matches!(self, Self::Group)
	}
}

/// Where a contact stands with regards to its remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
	Unlinked,
	Creating,
	Linked,
	Updating,
	Deleting,
	Removed,
}

/// Structured contact properties, vCard-like, kept as a JSON object.
///
/// Known properties used by the store:
/// - `fn`: formatted name, a string;
/// - `n`: structured name, an array of strings `[last, first, additional, prefix, suffix]`;
/// - `org`: company, a string;
/// - `kind`: one of [`ContactKind`], as a string.
///
/// Anything else is carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactData(Map<String, Value>);

impl ContactData {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(name.into(), value.into());
		self
	}

	pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(name.into(), value.into());
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	#[must_use]
	pub fn properties(&self) -> &Map<String, Value> {
		&self.0
	}

	fn str_prop(&self, name: &str) -> Option<&str> {
		self.0
			.get(name)
			.and_then(Value::as_str)
			.filter(|s| !s.is_empty())
	}

	fn name_part(&self, idx: usize) -> Option<&str> {
		self.0
			.get("n")
			.and_then(Value::as_array)
			.and_then(|parts| parts.get(idx))
			.and_then(Value::as_str)
			.filter(|s| !s.is_empty())
	}

	#[must_use]
	pub fn display_name(&self) -> String {
		if let Some(name) = self.str_prop("fn") {
			return name.to_string();
		}

		match (self.name_part(1), self.name_part(0)) {
			(Some(first), Some(last)) => return format!("{first} {last}"),
			(Some(name), None) | (None, Some(name)) => return name.to_string(),
			(None, None) => {}
		}

		self.str_prop("org").unwrap_or_default().to_string()
	}

	fn kind(&self) -> Result<ContactKind, ContactError> {
		match self.0.get("kind") {
			None | Some(Value::Null) => Ok(ContactKind::default()),
			Some(Value::String(kind)) => kind
				.parse()
				.map_err(|_| ContactError::UnknownKind(kind.clone())),
			Some(_) => Err(ContactError::InvalidProperty {
				name: "kind",
				expected: "a string",
			}),
		}
	}

	fn validate(&self) -> Result<ContactKind, ContactError> {
		for name in ["fn", "org"] {
			if let Some(value) = self.0.get(name) {
				if !(value.is_string() || value.is_null()) {
					return Err(ContactError::InvalidProperty {
						name,
						expected: "a string",
					});
				}
			}
		}

		if let Some(value) = self.0.get("n") {
			let valid = value.is_null()
				|| value
					.as_array()
					.is_some_and(|parts| parts.iter().all(Value::is_string));
			if !valid {
				return Err(ContactError::InvalidProperty {
					name: "n",
					expected: "an array of strings",
				});
			}
		}

		self.kind()
	}
}

impl TryFrom<Value> for ContactData {
	type Error = ContactError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			_ => Err(ContactError::NotAnObject),
		}
	}
}

/// Unvalidated contact input, as received from a bulk load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
	pub key: String,
	pub data: Value,
	pub addressbook: AddressbookId,
	#[serde(default)]
	pub remote: Option<RemoteLink>,
}

/// A single contact, always structurally valid once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
	key: ContactKey,
	data: ContactData,
	kind: ContactKind,
	remote: Option<RemoteLink>,
	addressbook: AddressbookId,
}

impl Contact {
	pub fn new(
		key: impl Into<String>,
		data: ContactData,
		addressbook: AddressbookId,
	) -> Result<Self, ContactError> {
		let key = ContactKey::new(key)?;
		let kind = data.validate()?;

		Ok(Self {
			key,
			data,
			kind,
			remote: None,
			addressbook,
		})
	}

	#[must_use]
	pub fn with_remote(mut self, link: RemoteLink) -> Self {
		self.remote = Some(link);
		self
	}

	#[must_use]
	pub const fn key(&self) -> &ContactKey {
		&self.key
	}

	#[must_use]
	pub const fn data(&self) -> &ContactData {
		&self.data
	}

	#[must_use]
	pub const fn kind(&self) -> ContactKind {
		self.kind
	}

	#[must_use]
	pub const fn remote(&self) -> Option<&RemoteLink> {
		self.remote.as_ref()
	}

	#[must_use]
	pub const fn addressbook(&self) -> &AddressbookId {
		&self.addressbook
	}

	#[must_use]
	pub const fn sync_state(&self) -> SyncState {
		if self.remote.is_some() {
			SyncState::Linked
		} else {
			SyncState::Unlinked
		}
	}

	/// Replaces the record payload, keeping key and linkage untouched.
	pub fn set_data(&mut self, data: ContactData) -> Result<(), ContactError> {
		self.kind = data.validate()?;
		self.data = data;
		Ok(())
	}

	pub fn set_remote(&mut self, link: RemoteLink) {
		self.remote = Some(link);
	}

	pub fn set_addressbook(&mut self, addressbook: AddressbookId) {
		self.addressbook = addressbook;
	}

	/// Value this contact is ordered by under `attribute`.
	#[must_use]
	pub fn sort_value(&self, attribute: SortAttribute) -> String {
		match attribute {
			SortAttribute::DisplayName => self.data.display_name(),
			SortAttribute::FirstName => self
				.data
				.name_part(1)
				.map_or_else(|| self.data.display_name(), ToString::to_string),
			SortAttribute::LastName => self
				.data
				.name_part(0)
				.map_or_else(|| self.data.display_name(), ToString::to_string),
			SortAttribute::Company => self.data.str_prop("org").unwrap_or_default().to_string(),
		}
	}

	/// Takes data, kind and (when present) the remote link from `other`.
	pub(crate) fn replace_from(&mut self, other: Self) {
		self.data = other.data;
		self.kind = other.kind;
		if other.remote.is_some() {
			self.remote = other.remote;
		}
	}
}

impl TryFrom<RawContact> for Contact {
	type Error = ContactError;

	fn try_from(
		RawContact {
			key,
			data,
			addressbook,
			remote,
		}: RawContact,
	) -> Result<Self, Self::Error> {
		let contact = Self::new(key, ContactData::try_from(data)?, addressbook)?;

		Ok(match remote {
			Some(link) => contact.with_remote(link),
			None => contact,
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn book() -> AddressbookId {
		AddressbookId::from("contacts")
	}

	#[test]
	fn display_name_fallbacks() {
		let with_fn = ContactData::new().with("fn", "Ada Lovelace");
		assert_eq!(with_fn.display_name(), "Ada Lovelace");

		let with_n = ContactData::new().with("n", json!(["Lovelace", "Ada", "", "", ""]));
		assert_eq!(with_n.display_name(), "Ada Lovelace");

		let with_org = ContactData::new().with("org", "Analytical Engines");
		assert_eq!(with_org.display_name(), "Analytical Engines");

		assert_eq!(ContactData::new().display_name(), "");
	}

	#[test]
	fn sort_value_per_attribute() {
		let contact = Contact::new(
			"ada",
			ContactData::new()
				.with("fn", "Countess Ada")
				.with("n", json!(["Lovelace", "Ada"]))
				.with("org", "Engines Ltd"),
			book(),
		)
		.unwrap();

		assert_eq!(contact.sort_value(SortAttribute::DisplayName), "Countess Ada");
		assert_eq!(contact.sort_value(SortAttribute::FirstName), "Ada");
		assert_eq!(contact.sort_value(SortAttribute::LastName), "Lovelace");
		assert_eq!(contact.sort_value(SortAttribute::Company), "Engines Ltd");
	}

	#[test]
	fn rejects_malformed_input() {
		assert_eq!(
			Contact::new("  ", ContactData::new(), book()),
			Err(ContactError::EmptyKey)
		);

		assert_eq!(
			Contact::new("a", ContactData::new().with("fn", 42), book()),
			Err(ContactError::InvalidProperty {
				name: "fn",
				expected: "a string"
			})
		);

		assert_eq!(
			Contact::new("a", ContactData::new().with("kind", "robot"), book()),
			Err(ContactError::UnknownKind("robot".to_string()))
		);

		let raw = RawContact {
			key: "a".to_string(),
			data: json!("BEGIN:VCARD"),
			addressbook: book(),
			remote: None,
		};
		assert_eq!(Contact::try_from(raw), Err(ContactError::NotAnObject));
	}

	#[test]
	fn kind_is_derived_from_data() {
		let group = Contact::new("g", ContactData::new().with("kind", "GROUP"), book()).unwrap();
		assert!(group.kind().is_group());

		let org = Contact::new("o", ContactData::new().with("kind", "org"), book()).unwrap();
		assert_eq!(org.kind(), ContactKind::Organization);
		assert!(!org.kind().is_group());
	}

	#[test]
	fn sort_attribute_wire_names() {
		assert_eq!(SortAttribute::default().to_string(), "displayName");
		assert_eq!("org".parse::<SortAttribute>(), Ok(SortAttribute::Company));
		assert!("nickname".parse::<SortAttribute>().is_err());
	}

	#[test]
	fn sync_state_follows_remote_link() {
		let mut contact = Contact::new("a", ContactData::new(), book()).unwrap();
		assert_eq!(contact.sync_state(), SyncState::Unlinked);

		contact.set_remote(RemoteLink::new("/dav/contacts/a.vcf", Some("1")));
		assert_eq!(contact.sync_state(), SyncState::Linked);
	}
}
