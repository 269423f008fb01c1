use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::addressbook::AddressbookId;

/// Handle to the persisted remote resource of a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLink {
	pub url: String,
	pub etag: Option<String>,
}

impl RemoteLink {
	pub fn new(url: impl Into<String>, etag: Option<&str>) -> Self {
		Self {
			url: url.into(),
			etag: etag.map(ToString::to_string),
		}
	}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
pub struct RemoteError {
	pub message: String,
	pub status: Option<u16>,
}

impl RemoteError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			status: None,
		}
	}

	#[must_use]
	pub const fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);
		self
	}
}

/// Network side of contact persistence, CardDAV or anything shaped like it.
///
/// Payloads are opaque serialized records produced by a [`PayloadCodec`](crate::PayloadCodec).
#[async_trait]
pub trait RemoteConnector: Send + Sync {
	/// Creates a new remote resource inside `addressbook`.
	async fn create(
		&self,
		addressbook: &AddressbookId,
		payload: &str,
	) -> Result<RemoteLink, RemoteError>;

	/// Persists `payload` against an existing resource, returning the refreshed handle.
	async fn update(&self, link: &RemoteLink, payload: &str) -> Result<RemoteLink, RemoteError>;

	async fn delete(&self, link: &RemoteLink) -> Result<(), RemoteError>;

	async fn fetch_complete_data(&self, link: &RemoteLink) -> Result<String, RemoteError>;
}

#[async_trait]
impl<T: RemoteConnector + ?Sized> RemoteConnector for Arc<T> {
	async fn create(
		&self,
		addressbook: &AddressbookId,
		payload: &str,
	) -> Result<RemoteLink, RemoteError> {
		(**self).create(addressbook, payload).await
	}

	async fn update(&self, link: &RemoteLink, payload: &str) -> Result<RemoteLink, RemoteError> {
		(**self).update(link, payload).await
	}

	async fn delete(&self, link: &RemoteLink) -> Result<(), RemoteError> {
		(**self).delete(link).await
	}

	async fn fetch_complete_data(&self, link: &RemoteLink) -> Result<String, RemoteError> {
		(**self).fetch_complete_data(link).await
	}
}
