//! Process property discovery.

use crate::{non_blank, string_setting, DiscoverySource, ResourceLoader};
use el_types::{ElError, ImplementationRegistry, PropertyLookup, PROVIDER_PROPERTY};
use std::sync::Arc;

/// Source reading a single process-wide property.
#[derive(Clone)]
pub struct ProcessPropertySource {
	lookup: Arc<dyn PropertyLookup>,
	key: String,
}

impl ProcessPropertySource {
	/// Source reading `javax.el.ExpressionFactory` through `lookup`.
	pub fn new(lookup: Arc<dyn PropertyLookup>) -> Self {
		Self {
			lookup,
			key: PROVIDER_PROPERTY.to_string(),
		}
	}

	/// Reads `key` instead of the interface name.
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = key.into();
		self
	}
}

impl DiscoverySource for ProcessPropertySource {
	fn name(&self) -> &'static str {
		Registry::NAME
	}

	fn lookup(&self, _resources: &dyn ResourceLoader) -> Result<Option<String>, ElError> {
		let value = self.lookup.get(&self.key).and_then(|v| non_blank(&v));
		if value.is_none() {
			tracing::debug!("Process property {} not set", self.key);
		}
		Ok(value)
	}
}

/// Factory function to create the process property source from configuration.
///
/// Optional configuration parameters:
/// - `key`: property name (default: `javax.el.ExpressionFactory`)
pub fn create_source(
	config: &toml::Value,
	lookup: &Arc<dyn PropertyLookup>,
) -> Result<Box<dyn DiscoverySource>, ElError> {
	let mut source = ProcessPropertySource::new(Arc::clone(lookup));
	if let Some(key) = string_setting(config, Registry::NAME, "key")? {
		source = source.with_key(key);
	}
	Ok(Box::new(source))
}

/// Registry for the process property source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "process";
	type Factory = crate::DiscoveryFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl crate::DiscoveryRegistry for Registry {}
