//!
//! # Contacts
//!
//! Client side contacts collection, kept sorted in memory and synchronized with a remote
//! CardDAV-like store.
//!
//! - [`ContactStore`] owns the contacts and their sorted index. All its mutations are
//!   synchronous and never leave the index half updated;
//! - [`ContactsSync`] runs the remote requests and decides when a local mutation waits for the
//!   remote (create, update, fetch) and when it doesn't (delete);
//! - [`RemoteConnector`] and [`PayloadCodec`] are the seams to the network and to the vCard
//!   serialization.
//!

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod addressbook;
mod codec;
mod collation;
mod config;
mod contact;
mod error;
mod index;
mod notifications;
mod remote;
mod store;
mod sync;

pub use addressbook::{AddressbookId, Addressbooks};
pub use codec::{CodecError, JsonCodec, PayloadCodec};
pub use collation::{Collation, DEFAULT_LOCALE};
pub use config::{ConfigError, ContactsConfig};
pub use contact::{
	Contact, ContactData, ContactError, ContactKey, ContactKind, RawContact, SortAttribute,
	SyncState,
};
pub use error::StoreError;
pub use index::{SortEntry, SortIndex};
pub use notifications::{Notification, Notifier, RETAINED_NOTIFICATIONS};
pub use remote::{RemoteConnector, RemoteError, RemoteLink};
pub use store::ContactStore;
pub use sync::{ContactsSync, DeleteOutcome, Error as SyncError, RemoteDelete, RemoteOperation};
