//! Built-in default provider.

use crate::{non_blank, string_setting, DiscoverySource, ResourceLoader};
use el_types::{ElError, ImplementationRegistry, PropertyLookup, DEFAULT_PROVIDER};
use std::sync::Arc;

/// Source that always names the same provider.
#[derive(Debug, Clone)]
pub struct DefaultSource {
	provider: String,
}

impl DefaultSource {
	/// Source naming `provider`, which must not be blank.
	pub fn new(provider: impl Into<String>) -> Result<Self, ElError> {
		let provider = provider.into();
		let provider = non_blank(&provider).ok_or_else(|| {
			ElError::Configuration("default provider name cannot be empty".into())
		})?;
		Ok(Self { provider })
	}

	pub fn provider(&self) -> &str {
		&self.provider
	}
}

impl Default for DefaultSource {
	fn default() -> Self {
		Self {
			provider: DEFAULT_PROVIDER.to_string(),
		}
	}
}

impl DiscoverySource for DefaultSource {
	fn name(&self) -> &'static str {
		Registry::NAME
	}

	fn lookup(&self, _resources: &dyn ResourceLoader) -> Result<Option<String>, ElError> {
		Ok(Some(self.provider.clone()))
	}
}

/// Factory function to create the default source from configuration.
///
/// Optional configuration parameters:
/// - `provider`: provider name (default: `org.apache.el.ExpressionFactoryImpl`)
pub fn create_source(
	config: &toml::Value,
	_lookup: &Arc<dyn PropertyLookup>,
) -> Result<Box<dyn DiscoverySource>, ElError> {
	let source = match string_setting(config, Registry::NAME, "provider")? {
		Some(provider) => DefaultSource::new(provider)?,
		None => DefaultSource::default(),
	};
	Ok(Box::new(source))
}

/// Registry for the default source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "default";
	type Factory = crate::DiscoveryFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl crate::DiscoveryRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::EmbeddedLoader;

	#[test]
	fn test_default_provider() {
		let source = DefaultSource::default();
		assert_eq!(
			source.lookup(&EmbeddedLoader::new()).unwrap(),
			Some(DEFAULT_PROVIDER.to_string())
		);
	}

	#[test]
	fn test_blank_override_rejected() {
		assert!(matches!(
			DefaultSource::new("   "),
			Err(ElError::Configuration(_))
		));
		assert_eq!(DefaultSource::new(" x.Y ").unwrap().provider(), "x.Y");
	}
}
