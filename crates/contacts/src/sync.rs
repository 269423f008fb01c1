use std::{fmt, sync::Arc};

use strum_macros::Display;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument, trace};

use super::{
	addressbook::{AddressbookId, Addressbooks},
	codec::{CodecError, PayloadCodec},
	contact::{Contact, ContactError, ContactKey, SortAttribute, SyncState},
	error::StoreError,
	notifications::{Notification, Notifier},
	remote::{RemoteConnector, RemoteError, RemoteLink},
	store::ContactStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RemoteOperation {
	Create,
	Update,
	Fetch,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("remote {operation} request failed <key='{key}'>: {source}")]
	RemoteRequest {
		operation: RemoteOperation,
		key: ContactKey,
		#[source]
		source: RemoteError,
	},
	#[error("contact has no remote resource <key='{0}'>")]
	NotLinked(ContactKey),
	#[error(transparent)]
	Codec(#[from] CodecError),
	#[error("remote returned a malformed contact <key='{key}'>: {source}")]
	Malformed {
		key: ContactKey,
		#[source]
		source: ContactError,
	},
}

/// What happened on the remote side of a delete. The local delete is always applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteDelete {
	Deleted,
	/// Contact was never persisted remotely, nothing to delete there.
	LocalOnly,
	Failed(RemoteError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct DeleteOutcome {
	pub remote: RemoteDelete,
	pub local: Result<(), StoreError>,
}

impl DeleteOutcome {
	/// Local and remote state disagree: the contact is gone here but still exists remotely.
	#[must_use]
	pub const fn diverged(&self) -> bool {
		matches!(self.remote, RemoteDelete::Failed(_))
	}
}

/// Sequences contact store mutations with their remote counterpart.
///
/// Store locks are only taken once a remote request settled, never across an await on the
/// connector. Nothing here serializes actions targeting the same contact: issuing a second
/// action for a key while one is in flight leaves the outcome to whichever settles last.
pub struct ContactsSync<R, C> {
	store: Arc<RwLock<ContactStore>>,
	addressbooks: Arc<RwLock<Addressbooks>>,
	connector: R,
	codec: C,
	notifier: Arc<Notifier>,
}

impl<R, C> fmt::Debug for ContactsSync<R, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContactsSync").finish_non_exhaustive()
	}
}

impl<R: RemoteConnector, C: PayloadCodec> ContactsSync<R, C> {
	pub fn new(store: ContactStore, connector: R, codec: C) -> Self {
		Self {
			store: Arc::new(RwLock::new(store)),
			addressbooks: Arc::new(RwLock::new(Addressbooks::new())),
			connector,
			codec,
			notifier: Notifier::new(),
		}
	}

	#[must_use]
	pub fn store(&self) -> Arc<RwLock<ContactStore>> {
		Arc::clone(&self.store)
	}

	#[must_use]
	pub fn addressbooks(&self) -> Arc<RwLock<Addressbooks>> {
		Arc::clone(&self.addressbooks)
	}

	#[must_use]
	pub fn notifier(&self) -> Arc<Notifier> {
		Arc::clone(&self.notifier)
	}

	pub async fn snapshot_ordered(&self) -> Vec<Contact> {
		self.store.read().await.ordered_contacts().cloned().collect()
	}

	/// The caller's link if it has one, else whatever the stored copy is linked to.
	async fn known_link(&self, contact: &Contact) -> Option<RemoteLink> {
		if let Some(link) = contact.remote() {
			return Some(link.clone());
		}

		self.store
			.read()
			.await
			.get(contact.key())
			.and_then(Contact::remote)
			.cloned()
	}

	/// Creates the remote resource if needed, then pushes the current data and only then
	/// commits the update locally.
	///
	/// A successful create is kept even if the following update fails, `contact` stays linked
	/// while the store keeps its previous data.
	#[instrument(skip_all, fields(key = %contact.key()), err)]
	pub async fn save_contact(&self, contact: &mut Contact) -> Result<(), Error> {
		let link = if let Some(link) = self.known_link(contact).await {
			contact.set_remote(link.clone());
			link
		} else {
			trace!(state = ?SyncState::Creating, "Creating remote contact;");
			let payload = self.codec.encode(contact.data())?;

			let link = self
				.connector
				.create(contact.addressbook(), &payload)
				.await
				.map_err(|source| Error::RemoteRequest {
					operation: RemoteOperation::Create,
					key: contact.key().clone(),
					source,
				})?;

			contact.set_remote(link.clone());

			let mut store = self.store.write().await;
			if store.get(contact.key()).is_some() {
				store.attach_remote_link(contact.key(), link.clone()).ok();
			}

			link
		};

		trace!(state = ?SyncState::Updating, url = %link.url, "Updating remote contact;");
		let payload = self.codec.encode(contact.data())?;

		let refreshed = self
			.connector
			.update(&link, &payload)
			.await
			.map_err(|source| Error::RemoteRequest {
				operation: RemoteOperation::Update,
				key: contact.key().clone(),
				source,
			})?;

		contact.set_remote(refreshed);

		if let Err(e) = self.store.write().await.update_contact(contact.clone()) {
			debug!(?e, "Remote update settled for a contact no longer in the store;");
		}

		Ok(())
	}

	/// Best effort remote delete, the local delete happens no matter what.
	#[instrument(skip_all, fields(key = %contact.key()))]
	pub async fn delete_contact(&self, contact: &Contact) -> DeleteOutcome {
		let remote = match self.known_link(contact).await {
			None => RemoteDelete::LocalOnly,
			Some(link) => {
				trace!(state = ?SyncState::Deleting, url = %link.url, "Deleting remote contact;");
				match self.connector.delete(&link).await {
					Ok(()) => RemoteDelete::Deleted,
					Err(e) => {
						error!(?e, "Failed to delete remote contact, deleting it locally anyway;");
						self.notifier
							.emit(Notification::RemoteDeleteFailed {
								key: contact.key().clone(),
								reason: e.to_string(),
							})
							.await;
						RemoteDelete::Failed(e)
					}
				}
			}
		};

		let (local, member) = match self.store.write().await.delete_contact_by_key(contact.key()) {
			Ok(removed) => (Ok(()), removed),
			Err(e) => (Err(e), contact.clone()),
		};

		self.addressbooks.write().await.remove_contact(&member);
		trace!(state = ?SyncState::Removed, "Contact removed;");

		DeleteOutcome { remote, local }
	}

	/// Local only, the remote resource gets created on the next [`ContactsSync::save_contact`].
	pub async fn add_contact(&self, contact: Contact) -> Result<(), StoreError> {
		self.store.write().await.add_contact(contact.clone())?;
		self.addressbooks.write().await.add_contact(&contact);

		Ok(())
	}

	/// Replaces the stored contact with the complete remote representation.
	#[instrument(skip_all, fields(key = %contact.key()), err)]
	pub async fn fetch_full_contact(&self, contact: &Contact) -> Result<Contact, Error> {
		let link = self
			.known_link(contact)
			.await
			.ok_or_else(|| Error::NotLinked(contact.key().clone()))?;

		let payload = self
			.connector
			.fetch_complete_data(&link)
			.await
			.map_err(|source| Error::RemoteRequest {
				operation: RemoteOperation::Fetch,
				key: contact.key().clone(),
				source,
			})?;

		let fresh = Contact::new(
			contact.key().as_str(),
			self.codec.decode(&payload)?,
			contact.addressbook().clone(),
		)
		.map_err(|source| Error::Malformed {
			key: contact.key().clone(),
			source,
		})?
		.with_remote(link);

		if let Err(e) = self.store.write().await.update_contact(fresh.clone()) {
			debug!(?e, "Fetched a contact no longer in the store;");
		}

		Ok(fresh)
	}

	pub async fn update_contact_addressbook(
		&self,
		contact: &Contact,
		addressbook: AddressbookId,
	) -> Result<(), StoreError> {
		let previous = self
			.store
			.write()
			.await
			.update_contact_addressbook(contact.key(), addressbook.clone())?;

		self.addressbooks
			.write()
			.await
			.move_contact(contact.key(), &previous, &addressbook);

		Ok(())
	}

	pub async fn append_contacts<I>(&self, items: I) -> usize
	where
		I: IntoIterator<Item = Contact>,
	{
		let contacts = items.into_iter().collect::<Vec<_>>();

		// Appending overwrites, so drop the memberships of the replaced copies first
		let replaced = {
			let store = self.store.read().await;
			contacts
				.iter()
				.filter_map(|contact| store.get(contact.key()).cloned())
				.collect::<Vec<_>>()
		};

		{
			let mut addressbooks = self.addressbooks.write().await;
			for contact in &replaced {
				addressbooks.remove_contact(contact);
			}
			for contact in &contacts {
				addressbooks.add_contact(contact);
			}
		}

		self.store.write().await.append_contacts(contacts)
	}

	pub async fn set_order(&self, order: SortAttribute) {
		self.store.write().await.set_order(order);
	}

	pub async fn sort_contacts(&self) {
		self.store.write().await.sort_contacts();
	}
}
