//! Provider discovery module for the expression factory resolver.
//!
//! This module defines the sources consulted, in order, to find the name of
//! the expression factory provider: a loader-scoped service resource, the
//! platform properties file, a process property and a built-in default.
//! Each source reports "no match" for absent data and fails only when data
//! exists but cannot be read.

use el_types::{ElError, ImplementationRegistry, PropertyLookup};
use std::sync::Arc;

pub mod resources;

/// Re-export implementations
pub mod implementations {
	pub mod default;
	pub mod platform;
	pub mod process;
	pub mod services;
}

pub use resources::{ClasspathLoader, EmbeddedLoader, ResourceLoader, CLASSPATH_ENV};

/// Trait defining the interface for provider discovery sources.
pub trait DiscoverySource: Send + Sync {
	/// Short name identifying the source in logs and resolution reports.
	fn name(&self) -> &'static str;

	/// Returns the provider name this source holds, if any.
	///
	/// `resources` is the loader of the active loading context. Returned names
	/// are trimmed and never empty.
	fn lookup(&self, resources: &dyn ResourceLoader) -> Result<Option<String>, ElError>;
}

/// Type alias for discovery source factory functions.
///
/// Factories receive their own configuration section and the process
/// property lookup of the resolver being built.
pub type DiscoveryFactory =
	fn(&toml::Value, &Arc<dyn PropertyLookup>) -> Result<Box<dyn DiscoverySource>, ElError>;

/// Registry trait for discovery sources.
///
/// This trait extends the base ImplementationRegistry to specify that
/// discovery sources must provide a DiscoveryFactory.
pub trait DiscoveryRegistry: ImplementationRegistry<Factory = DiscoveryFactory> {}

/// Get all registered discovery sources.
///
/// Returned in precedence order, which is also the default resolution order.
pub fn get_all_implementations() -> Vec<(&'static str, DiscoveryFactory)> {
	use implementations::{default, platform, process, services};

	vec![
		(services::Registry::NAME, services::Registry::factory()),
		(platform::Registry::NAME, platform::Registry::factory()),
		(process::Registry::NAME, process::Registry::factory()),
		(default::Registry::NAME, default::Registry::factory()),
	]
}

/// Builds the standard source chain with built-in names and paths.
pub fn default_sources(lookup: Arc<dyn PropertyLookup>) -> Vec<Box<dyn DiscoverySource>> {
	use implementations::{default, platform, process, services};

	vec![
		Box::new(services::ServiceResourceSource::default()),
		Box::new(platform::PlatformPropertiesSource::from_lookup(
			lookup.as_ref(),
		)),
		Box::new(process::ProcessPropertySource::new(lookup)),
		Box::new(default::DefaultSource::default()),
	]
}

/// Trims `value` and drops it if nothing is left.
///
/// Every character up to and including U+0020 is trimmed, control characters
/// included; other Unicode whitespace such as U+00A0 is kept.
pub(crate) fn non_blank(value: &str) -> Option<String> {
	let trimmed = value.trim_matches(|c: char| c <= ' ');
	(!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads an optional string entry of a source configuration section.
pub(crate) fn string_setting(
	config: &toml::Value,
	source: &str,
	key: &str,
) -> Result<Option<String>, ElError> {
	match config.get(key) {
		None => Ok(None),
		Some(value) => value.as_str().map(|s| Some(s.to_string())).ok_or_else(|| {
			ElError::Configuration(format!(
				"discovery.sources.{}.{} must be a string",
				source, key
			))
		}),
	}
}
