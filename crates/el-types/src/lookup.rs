//! Process-wide property lookups.
//!
//! Discovery sources never read process state directly; they are handed a
//! `PropertyLookup` so callers decide where "process properties" come from.

use crate::Properties;
use std::sync::Arc;

/// Read-only access to named process properties.
pub trait PropertyLookup: Send + Sync {
	/// Returns the value of `key`, if set.
	fn get(&self, key: &str) -> Option<String>;
}

impl PropertyLookup for Properties {
	fn get(&self, key: &str) -> Option<String> {
		Properties::get(self, key).map(str::to_string)
	}
}

/// Looks properties up in the process environment.
///
/// The key is tried verbatim first, then in its environment form: upper-cased
/// with every non-alphanumeric character replaced by `_`, so `java.home`
/// maps to `JAVA_HOME`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvLookup;

impl EnvLookup {
	/// Environment variable name used for `key`.
	pub fn env_name(key: &str) -> String {
		key.chars()
			.map(|c| {
				if c.is_ascii_alphanumeric() {
					c.to_ascii_uppercase()
				} else {
					'_'
				}
			})
			.collect()
	}
}

impl PropertyLookup for EnvLookup {
	fn get(&self, key: &str) -> Option<String> {
		std::env::var(key)
			.ok()
			.or_else(|| std::env::var(Self::env_name(key)).ok())
	}
}

/// Consults several lookups in order; the first one holding the key wins.
#[derive(Clone, Default)]
pub struct ChainedLookup {
	lookups: Vec<Arc<dyn PropertyLookup>>,
}

impl ChainedLookup {
	pub fn new(lookups: Vec<Arc<dyn PropertyLookup>>) -> Self {
		Self { lookups }
	}

	/// Appends a lookup with lower priority than the existing ones.
	pub fn then(mut self, lookup: Arc<dyn PropertyLookup>) -> Self {
		self.lookups.push(lookup);
		self
	}
}

impl PropertyLookup for ChainedLookup {
	fn get(&self, key: &str) -> Option<String> {
		self.lookups.iter().find_map(|lookup| lookup.get(key))
	}
}
