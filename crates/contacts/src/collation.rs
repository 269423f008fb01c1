use std::{cmp::Ordering, fmt};

use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use icu_provider::DataLocale;
use tracing::warn;

pub const DEFAULT_LOCALE: &str = "en";

/// Case-insensitive, language-sensitive string comparison used to order contacts.
///
/// Both sides are folded to upper case before being handed to the ICU collator, so
/// "alice" and "ALICE" always compare as equal.
pub struct Collation {
	locale: String,
	collator: Option<Collator>,
}

impl Collation {
	#[must_use]
	pub fn new(locale: &str) -> Self {
		let parsed = locale.parse::<Locale>().unwrap_or_else(|e| {
			warn!(%locale, ?e, "Invalid collation locale, falling back to root collation;");
			Locale::UND
		});

		let collator = match Collator::try_new(&DataLocale::from(&parsed), CollatorOptions::new())
		{
			Ok(collator) => Some(collator),
			Err(e) => {
				warn!(
					%locale,
					?e,
					"Failed to build collator, falling back to code point ordering;"
				);
				None
			}
		};

		Self {
			locale: locale.to_string(),
			collator,
		}
	}

	#[must_use]
	pub fn locale(&self) -> &str {
		&self.locale
	}

	#[must_use]
	pub fn compare(&self, a: &str, b: &str) -> Ordering {
		self.compare_exact(&a.to_uppercase(), &b.to_uppercase())
	}

	/// Collates without folding case, so "a" and "A" stay distinct.
	#[must_use]
	pub fn compare_exact(&self, a: &str, b: &str) -> Ordering {
		self.collator
			.as_ref()
			.map_or_else(|| a.cmp(b), |collator| collator.compare(a, b))
	}
}

impl Default for Collation {
	fn default() -> Self {
		Self::new(DEFAULT_LOCALE)
	}
}

impl fmt::Debug for Collation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Collation")
			.field("locale", &self.locale)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ignores_case() {
		let collation = Collation::default();

		assert_eq!(collation.compare("alice", "ALICE"), Ordering::Equal);
		assert_eq!(collation.compare("alice", "Bob"), Ordering::Less);
		assert_eq!(collation.compare("Bob", "alice"), Ordering::Greater);
	}

	#[test]
	fn orders_accented_letters_with_their_base_letter() {
		let collation = Collation::default();

		// Code point ordering would put 'É' after 'Z'
		assert_eq!(collation.compare("Émile", "Zoe"), Ordering::Less);
		assert_eq!(collation.compare("Eve", "Émile"), Ordering::Greater);
	}

	#[test]
	fn exact_comparison_keeps_case_apart() {
		let collation = Collation::default();

		assert_eq!(collation.compare_exact("a", "A"), Ordering::Less);
		assert_eq!(collation.compare_exact("a", "b"), Ordering::Less);
	}

	#[test]
	fn invalid_locale_still_compares() {
		let collation = Collation::new("not a locale!");

		assert_eq!(collation.compare("a", "B"), Ordering::Less);
	}
}
