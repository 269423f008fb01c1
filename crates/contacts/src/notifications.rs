use std::{collections::VecDeque, sync::Arc};

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use super::contact::ContactKey;

/// Non blocking, user facing reports of things that went wrong in the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
	/// The contact was removed locally but its remote resource could not be deleted.
	RemoteDeleteFailed { key: ContactKey, reason: String },
}

/// Oldest notifications are dropped past this many.
pub const RETAINED_NOTIFICATIONS: usize = 64;

pub struct Notifier {
	notifications: Mutex<VecDeque<Notification>>,
	chan: broadcast::Sender<Notification>,
}

impl Notifier {
	#[must_use]
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			notifications: Mutex::new(VecDeque::with_capacity(RETAINED_NOTIFICATIONS)),
			chan: broadcast::channel(15).0,
		})
	}

	pub async fn emit(&self, notification: Notification) {
		{
			let mut retained = self.notifications.lock().await;
			if retained.len() == RETAINED_NOTIFICATIONS {
				retained.pop_front();
			}
			retained.push_back(notification.clone());
		}

		if self.chan.receiver_count() > 0 {
			self.chan.send(notification).ok();
		}
	}

	pub async fn get_notifications(&self) -> Vec<Notification> {
		self.notifications.lock().await.iter().cloned().collect()
	}

	/// Hands over every retained notification, leaving none behind.
	pub async fn take_notifications(&self) -> Vec<Notification> {
		self.notifications.lock().await.drain(..).collect()
	}

	pub async fn clear_notifications(&self) {
		self.notifications.lock().await.clear();
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
		self.chan.subscribe()
	}
}
