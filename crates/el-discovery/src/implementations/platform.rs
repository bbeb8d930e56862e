//! Platform properties file discovery.
//!
//! Looks the provider up in `<platform-root>/jre/lib/el.properties`. A missing
//! or unopenable file is simply skipped; a file that opens but fails while
//! being read is an error.

use crate::{non_blank, string_setting, DiscoverySource, ResourceLoader};
use el_types::{
	ElError, ImplementationRegistry, Properties, PropertyLookup, PLATFORM_ROOT_PROPERTY,
	PROPERTY_FILE_SEGMENTS, PROVIDER_PROPERTY,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source backed by the platform-wide properties file.
#[derive(Debug, Clone)]
pub struct PlatformPropertiesSource {
	/// Location of the file; `None` when the platform root is unknown.
	path: Option<PathBuf>,
	key: String,
}

impl PlatformPropertiesSource {
	/// Source reading the properties file at `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: Some(path.into()),
			key: PROVIDER_PROPERTY.to_string(),
		}
	}

	/// Source for the properties file below `root`.
	pub fn from_root(root: impl AsRef<Path>) -> Self {
		let path = PROPERTY_FILE_SEGMENTS
			.iter()
			.fold(root.as_ref().to_path_buf(), |path, segment| path.join(segment));
		Self::new(path)
	}

	/// Source for the platform root named by the `java.home` property.
	///
	/// Without a platform root the source never matches.
	pub fn from_lookup(lookup: &dyn PropertyLookup) -> Self {
		match lookup
			.get(PLATFORM_ROOT_PROPERTY)
			.and_then(|root| non_blank(&root))
		{
			Some(root) => Self::from_root(root),
			None => Self {
				path: None,
				key: PROVIDER_PROPERTY.to_string(),
			},
		}
	}

	/// Looks `key` up instead of the interface name.
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = key.into();
		self
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}
}

impl DiscoverySource for PlatformPropertiesSource {
	fn name(&self) -> &'static str {
		Registry::NAME
	}

	fn lookup(&self, _resources: &dyn ResourceLoader) -> Result<Option<String>, ElError> {
		let Some(path) = &self.path else {
			tracing::debug!("Platform root unknown, skipping properties file");
			return Ok(None);
		};

		if !path.is_file() {
			tracing::debug!("Platform properties {} not present", path.display());
			return Ok(None);
		}

		let file = match File::open(path) {
			Ok(file) => file,
			Err(e) => {
				tracing::debug!("Platform properties {} not readable: {}", path.display(), e);
				return Ok(None);
			},
		};

		let properties = Properties::load(file).map_err(|e| {
			tracing::warn!("Failed to read {}: {}", path.display(), e);
			ElError::unreadable(path.display().to_string(), e)
		})?;

		Ok(properties.get(&self.key).and_then(non_blank))
	}
}

/// Factory function to create the platform properties source from configuration.
///
/// Optional configuration parameters:
/// - `path`: explicit properties file location
/// - `root`: platform root (default: the `java.home` property)
/// - `key`: property key (default: `javax.el.ExpressionFactory`)
pub fn create_source(
	config: &toml::Value,
	lookup: &Arc<dyn PropertyLookup>,
) -> Result<Box<dyn DiscoverySource>, ElError> {
	let path = string_setting(config, Registry::NAME, "path")?;
	let root = string_setting(config, Registry::NAME, "root")?;

	let mut source = match (path, root) {
		(Some(_), Some(_)) => {
			return Err(ElError::Configuration(
				"discovery.sources.platform accepts either 'path' or 'root', not both".into(),
			));
		},
		(Some(path), None) => PlatformPropertiesSource::new(path),
		(None, Some(root)) => PlatformPropertiesSource::from_root(root),
		(None, None) => PlatformPropertiesSource::from_lookup(lookup.as_ref()),
	};

	if let Some(key) = string_setting(config, Registry::NAME, "key")? {
		source = source.with_key(key);
	}

	Ok(Box::new(source))
}

/// Registry for the platform properties source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "platform";
	type Factory = crate::DiscoveryFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl crate::DiscoveryRegistry for Registry {}
