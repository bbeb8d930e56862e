//! Configuration module for the expression factory resolver.
//!
//! This module describes how a resolver is wired: which discovery sources are
//! consulted and in which order, the settings of each source, the classpath
//! roots service manifests are read from, process property overrides and the
//! configuration bag handed to the provider.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use el_types::Properties;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the resolver.
///
/// Every section is optional; an empty document yields the standard
/// discovery chain.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Discovery order and per-source settings.
	#[serde(default)]
	pub discovery: DiscoveryConfig,
	/// Roots searched for service manifests.
	#[serde(default)]
	pub classpath: ClasspathConfig,
	/// Process property overrides, consulted before the environment.
	#[serde(default)]
	pub properties: Properties,
	/// Configuration bag passed to the provider's configured constructor.
	pub configuration: Option<Properties>,
}

/// Discovery order and per-source settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
	/// Source names in the order they are consulted.
	#[serde(default = "default_order")]
	pub order: Vec<String>,
	/// Map of source names to their settings, stored as raw TOML values.
	#[serde(default)]
	pub sources: HashMap<String, toml::Value>,
}

impl Default for DiscoveryConfig {
	fn default() -> Self {
		Self {
			order: default_order(),
			sources: HashMap::new(),
		}
	}
}

/// Returns the standard discovery order.
fn default_order() -> Vec<String> {
	["services", "platform", "process", "default"]
		.into_iter()
		.map(String::from)
		.collect()
}

/// Roots searched for service manifests.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClasspathConfig {
	/// Directories in search order. Relative paths are resolved against the
	/// directory of the configuration file.
	#[serde(default)]
	pub roots: Vec<PathBuf>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following include directives.
	///
	/// Relative classpath roots are made absolute against the file's directory.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};

		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		let mut loader = loader::ConfigLoader::new(base_dir);
		let mut config = loader.load_config(file_name)?;

		for root in &mut config.classpath.roots {
			if root.is_relative() {
				*root = base_dir.join(&*root);
			}
		}

		Ok(config)
	}

	/// Validates the configuration.
	///
	/// - The discovery order is non-empty and free of duplicates
	/// - Every configured source section is referenced by the order
	/// - Property and configuration keys are non-empty
	fn validate(&self) -> Result<(), ConfigError> {
		if self.discovery.order.is_empty() {
			return Err(ConfigError::Validation(
				"discovery.order must name at least one source".into(),
			));
		}

		let mut seen = HashSet::new();
		for name in &self.discovery.order {
			if name.trim().is_empty() {
				return Err(ConfigError::Validation(
					"discovery.order cannot contain empty names".into(),
				));
			}
			if !seen.insert(name.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Source '{}' appears more than once in discovery.order",
					name
				)));
			}
		}

		for name in self.discovery.sources.keys() {
			if !seen.contains(name.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Source '{}' is configured but not listed in discovery.order",
					name
				)));
			}
		}

		for (section, bag) in [
			("properties", Some(&self.properties)),
			("configuration", self.configuration.as_ref()),
		] {
			if bag.is_some_and(|bag| bag.iter().any(|(key, _)| key.trim().is_empty())) {
				return Err(ConfigError::Validation(format!(
					"Keys in [{}] cannot be empty",
					section
				)));
			}
		}

		Ok(())
	}
}

/// Parses configuration from TOML text.
///
/// Environment variables are resolved first and the result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
