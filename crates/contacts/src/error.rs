use super::contact::{ContactError, ContactKey};

/// Local store failures. These never escape as hard errors: the store records them as
/// diagnostics and leaves its state untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
	#[error("contact already exists <key='{0}'>")]
	DuplicateKey(ContactKey),
	#[error("contact not found <key='{0}'>")]
	NotFound(ContactKey),
	#[error("malformed contact: {0}")]
	MalformedEntity(String),
}

impl From<ContactError> for StoreError {
	fn from(e: ContactError) -> Self {
		Self::MalformedEntity(e.to_string())
	}
}
