use std::{
	fs, io,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{collation::DEFAULT_LOCALE, contact::SortAttribute};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	#[error("failed to access contacts config <path='{}'>: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("invalid contacts config: {0}")]
	Json(#[from] serde_json::Error),
}

/// Persisted preferences of the contacts store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsConfig {
	pub version: u32,
	/// Attribute contacts are sorted by when the store is created.
	#[serde(default)]
	pub default_order: SortAttribute,
	/// Locale used to collate sort values, e.g. `en` or `sv`.
	#[serde(default = "default_locale")]
	pub locale: String,
}

fn default_locale() -> String {
	DEFAULT_LOCALE.to_string()
}

impl Default for ContactsConfig {
	fn default() -> Self {
		Self {
			version: Self::CURRENT_VERSION,
			default_order: SortAttribute::default(),
			locale: default_locale(),
		}
	}
}

impl ContactsConfig {
	pub const CURRENT_VERSION: u32 = 1;

	pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;

		let mut config = serde_json::from_str::<Self>(&json)?;
		if config.version < Self::CURRENT_VERSION {
			info!(
				"Migrating contacts config from v{} to v{}",
				config.version,
				Self::CURRENT_VERSION
			);
			config.version = Self::CURRENT_VERSION;
		}

		Ok(config)
	}

	/// Loads the config at `path`, writing the defaults there if nothing exists yet.
	pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		if path.exists() {
			return Self::load_from(path);
		}

		warn!("No contacts config found, creating default at {}", path.display());
		let config = Self::default();
		config.save(path)?;

		Ok(config)
	}

	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
		let path = path.as_ref();
		let io_err = |source: io::Error| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		};

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).map_err(io_err)?;
		}

		fs::write(path, serde_json::to_string_pretty(self)?).map_err(io_err)
	}
}

#[cfg(test)]
mod tests {
	use tempfile::tempdir;

	use super::*;

	#[test]
	fn creates_defaults_then_reloads() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("contacts").join("config.json");

		let created = ContactsConfig::load_or_default(&path).unwrap();
		assert_eq!(created, ContactsConfig::default());
		assert!(path.exists());

		let mut changed = created;
		changed.default_order = SortAttribute::LastName;
		changed.locale = "sv".to_string();
		changed.save(&path).unwrap();

		assert_eq!(ContactsConfig::load_from(&path).unwrap(), changed);
	}

	#[test]
	fn fills_missing_fields() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("config.json");
		fs::write(&path, r#"{ "version": 0, "defaultOrder": "org" }"#).unwrap();

		let config = ContactsConfig::load_from(&path).unwrap();
		assert_eq!(config.version, ContactsConfig::CURRENT_VERSION);
		assert_eq!(config.default_order, SortAttribute::Company);
		assert_eq!(config.locale, DEFAULT_LOCALE);
	}

	#[test]
	fn reports_missing_file_with_path() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("missing.json");

		let err = ContactsConfig::load_from(&path).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
		assert!(err.to_string().contains("missing.json"));
	}
}
