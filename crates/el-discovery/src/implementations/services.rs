//! Service resource discovery.
//!
//! Reads the provider name from the first line of a service manifest found
//! through the active resource loader.

use crate::{non_blank, string_setting, DiscoverySource, ResourceLoader};
use el_types::{ElError, ImplementationRegistry, PropertyLookup, SERVICE_RESOURCE};
use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

/// Source backed by the service manifest resource.
#[derive(Debug, Clone)]
pub struct ServiceResourceSource {
	resource: String,
}

impl ServiceResourceSource {
	/// Source reading the manifest called `resource`.
	pub fn new(resource: impl Into<String>) -> Self {
		Self {
			resource: resource.into(),
		}
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}
}

impl Default for ServiceResourceSource {
	fn default() -> Self {
		Self::new(SERVICE_RESOURCE)
	}
}

/// Reads the first line of `reader` as UTF-8, replacing invalid sequences.
///
/// A line ends at `\n` or `\r`.
fn read_first_line(reader: impl Read) -> io::Result<String> {
	let mut buf = Vec::new();
	BufReader::new(reader).read_until(b'\n', &mut buf)?;
	let text = String::from_utf8_lossy(&buf);
	Ok(text.split(['\r', '\n']).next().unwrap_or_default().to_string())
}

impl DiscoverySource for ServiceResourceSource {
	fn name(&self) -> &'static str {
		Registry::NAME
	}

	fn lookup(&self, resources: &dyn ResourceLoader) -> Result<Option<String>, ElError> {
		let reader = match resources.open(&self.resource) {
			Ok(Some(reader)) => reader,
			Ok(None) => {
				tracing::debug!("Service resource {} not present", self.resource);
				return Ok(None);
			},
			Err(e) => {
				tracing::warn!("Service resource {} cannot be opened: {}", self.resource, e);
				return Err(ElError::unreadable(&self.resource, e));
			},
		};

		// The reader is consumed here and dropped on every path
		let line = read_first_line(reader).map_err(|e| {
			tracing::warn!("Failed to read service resource {}: {}", self.resource, e);
			ElError::unreadable(&self.resource, e)
		})?;

		Ok(non_blank(&line))
	}
}

/// Factory function to create the service resource source from configuration.
///
/// Optional configuration parameters:
/// - `resource`: manifest name (default: `META-INF/services/javax.el.ExpressionFactory`)
pub fn create_source(
	config: &toml::Value,
	_lookup: &Arc<dyn PropertyLookup>,
) -> Result<Box<dyn DiscoverySource>, ElError> {
	let source = match string_setting(config, Registry::NAME, "resource")? {
		Some(resource) => ServiceResourceSource::new(resource),
		None => ServiceResourceSource::default(),
	};
	Ok(Box::new(source))
}

/// Registry for the service resource source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "services";
	type Factory = crate::DiscoveryFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl crate::DiscoveryRegistry for Registry {}
