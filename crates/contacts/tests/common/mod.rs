use sd_contacts::{
	AddressbookId, Contact, ContactData, ContactStore, ContactsSync, JsonCodec, RemoteConnector,
	RemoteError, RemoteLink,
};

use std::sync::{
	atomic::{AtomicU32, Ordering},
	Arc, Mutex,
};

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	Create { addressbook: String, payload: String },
	Update { url: String, payload: String },
	Delete { url: String },
	Fetch { url: String },
}

/// In memory stand-in for a CardDAV server, with switchable failures.
#[derive(Debug, Default)]
pub struct MockConnector {
	pub calls: Mutex<Vec<Call>>,
	pub fail_create: Mutex<bool>,
	pub fail_update: Mutex<bool>,
	pub fail_delete: Mutex<bool>,
	pub fail_fetch: Mutex<bool>,
	pub fetch_payload: Mutex<String>,
	etag: AtomicU32,
}

impl MockConnector {
	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub fn fail(flag: &Mutex<bool>) {
		*flag.lock().unwrap() = true;
	}

	fn next_etag(&self) -> String {
		format!("etag-{}", self.etag.fetch_add(1, Ordering::Relaxed) + 1)
	}

	fn outage() -> RemoteError {
		RemoteError::new("server unreachable").with_status(503)
	}
}

#[async_trait]
impl RemoteConnector for MockConnector {
	async fn create(
		&self,
		addressbook: &AddressbookId,
		payload: &str,
	) -> Result<RemoteLink, RemoteError> {
		self.calls.lock().unwrap().push(Call::Create {
			addressbook: addressbook.to_string(),
			payload: payload.to_string(),
		});

		if *self.fail_create.lock().unwrap() {
			return Err(Self::outage());
		}

		let count = self.calls.lock().unwrap().len();
		Ok(RemoteLink::new(
			format!("/dav/{addressbook}/{count}.vcf"),
			Some(self.next_etag().as_str()),
		))
	}

	async fn update(&self, link: &RemoteLink, payload: &str) -> Result<RemoteLink, RemoteError> {
		self.calls.lock().unwrap().push(Call::Update {
			url: link.url.clone(),
			payload: payload.to_string(),
		});

		if *self.fail_update.lock().unwrap() {
			return Err(Self::outage());
		}

		Ok(RemoteLink::new(link.url.clone(), Some(self.next_etag().as_str())))
	}

	async fn delete(&self, link: &RemoteLink) -> Result<(), RemoteError> {
		self.calls.lock().unwrap().push(Call::Delete {
			url: link.url.clone(),
		});

		if *self.fail_delete.lock().unwrap() {
			return Err(Self::outage());
		}

		Ok(())
	}

	async fn fetch_complete_data(&self, link: &RemoteLink) -> Result<String, RemoteError> {
		self.calls.lock().unwrap().push(Call::Fetch {
			url: link.url.clone(),
		});

		if *self.fail_fetch.lock().unwrap() {
			return Err(Self::outage());
		}

		Ok(self.fetch_payload.lock().unwrap().clone())
	}
}

pub fn book() -> AddressbookId {
	AddressbookId::from("contacts")
}

pub fn contact(key: &str, name: &str) -> Contact {
	Contact::new(key, ContactData::new().with("fn", name), book()).unwrap()
}

pub fn linked(key: &str, name: &str) -> Contact {
	contact(key, name).with_remote(RemoteLink::new(
		format!("/dav/contacts/{key}.vcf"),
		Some("etag-0"),
	))
}

pub fn sync() -> (
	ContactsSync<Arc<MockConnector>, JsonCodec>,
	Arc<MockConnector>,
) {
	let connector = Arc::new(MockConnector::default());

	(
		ContactsSync::new(ContactStore::default(), Arc::clone(&connector), JsonCodec),
		connector,
	)
}
