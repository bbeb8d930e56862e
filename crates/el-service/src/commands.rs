//! Command implementations for `el-resolve`.
//!
//! Each command returns a serializable report; printing is left to `main`.

use el_config::Config;
use el_core::{get_registry, ResolverBuilder};
use serde::Serialize;
use std::sync::Arc;

/// Result of the `locate` command.
#[derive(Debug, Serialize)]
pub struct LocateReport {
	pub provider: String,
	pub source: &'static str,
	/// Sources in consultation order.
	pub chain: Vec<&'static str>,
}

/// Result of the `instantiate` command.
#[derive(Debug, Serialize)]
pub struct InstantiateReport {
	pub provider: String,
	pub source: &'static str,
	/// Whether the configuration object reached the provider.
	pub configured: bool,
}

/// One entry of the `providers` command.
#[derive(Debug, Serialize)]
pub struct ProviderEntry {
	pub name: String,
	pub accepts_configuration: bool,
	pub default: bool,
}

/// Parses a `key=value` argument.
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
	let (key, value) = arg
		.split_once('=')
		.ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
	let key = key.trim();
	if key.is_empty() {
		return Err(format!("empty key in '{}'", arg));
	}
	Ok((key.to_string(), value.to_string()))
}

/// Applies `-D` overrides on top of the configured process properties.
pub fn apply_defines(config: &mut Config, defines: &[(String, String)]) {
	for (key, value) in defines {
		config.properties.set(key.clone(), value.clone());
	}
}

/// Finds the provider without instantiating it.
pub fn locate(config: Config) -> Result<LocateReport, Box<dyn std::error::Error>> {
	let resolver = ResolverBuilder::new(config).build()?;
	let location = resolver.locate()?;
	Ok(LocateReport {
		provider: location.provider,
		source: location.source,
		chain: resolver.source_names(),
	})
}

/// Resolves and instantiates the provider.
///
/// Command-line properties are layered over the `[configuration]` section;
/// no configuration object is passed when both are empty.
pub fn instantiate(
	mut config: Config,
	properties: &[(String, String)],
) -> Result<InstantiateReport, Box<dyn std::error::Error>> {
	let mut configuration = config.configuration.take().unwrap_or_default();
	for (key, value) in properties {
		configuration.set(key.clone(), value.clone());
	}
	let configuration = (!configuration.is_empty()).then(|| Arc::new(configuration));
	let has_configuration = configuration.is_some();

	let resolver = ResolverBuilder::new(config).build()?;
	let (location, _factory) = resolver.resolve_located(configuration)?;

	let accepts = get_registry()
		.providers
		.get(&location.provider)
		.is_some_and(|provider| provider.accepts_configuration());

	Ok(InstantiateReport {
		configured: has_configuration && accepts,
		provider: location.provider,
		source: location.source,
	})
}

/// Lists the built-in providers.
pub fn providers() -> Vec<ProviderEntry> {
	let registry = &get_registry().providers;
	registry
		.names()
		.into_iter()
		.filter_map(|name| {
			registry.get(name).map(|provider| ProviderEntry {
				name: name.to_string(),
				accepts_configuration: provider.accepts_configuration(),
				default: name == el_types::DEFAULT_PROVIDER,
			})
		})
		.collect()
}

/// Configuration used when no file is given.
pub fn load_config(path: Option<&std::path::Path>) -> Result<Config, el_config::ConfigError> {
	match path {
		Some(path) => Config::from_file(path),
		None => Ok(Config::default()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use el_types::DEFAULT_PROVIDER;
	use std::fs;
	use tempfile::TempDir;

	fn config(text: &str) -> Config {
		text.parse().unwrap()
	}

	#[test]
	fn test_parse_key_value() {
		assert_eq!(
			parse_key_value("java.home=/opt/jdk").unwrap(),
			("java.home".to_string(), "/opt/jdk".to_string())
		);
		assert_eq!(
			parse_key_value("k=a=b").unwrap(),
			("k".to_string(), "a=b".to_string())
		);
		assert!(parse_key_value("novalue").is_err());
		assert!(parse_key_value(" =x").is_err());
	}

	#[test]
	fn test_locate_with_define() {
		let mut cfg = config("[discovery]\norder = [\"process\", \"default\"]\n");
		apply_defines(
			&mut cfg,
			&[(
				"javax.el.ExpressionFactory".to_string(),
				DEFAULT_PROVIDER.to_string(),
			)],
		);

		let report = locate(cfg).unwrap();
		assert_eq!(report.source, "process");
		assert_eq!(report.provider, DEFAULT_PROVIDER);
		assert_eq!(report.chain, vec!["process", "default"]);
	}

	#[test]
	fn test_instantiate_reports_configuration() {
		let cfg = config("[discovery]\norder = [\"default\"]\n");
		let report = instantiate(cfg, &[("cache.size".to_string(), "8".to_string())]).unwrap();
		assert!(report.configured);
		assert_eq!(report.source, "default");

		let cfg = config("[discovery]\norder = [\"default\"]\n");
		let report = instantiate(cfg, &[]).unwrap();
		assert!(!report.configured);
	}

	#[test]
	fn test_instantiate_unknown_provider() {
		let cfg = config(
			"[discovery]\norder = [\"default\"]\n[discovery.sources.default]\nprovider = \"com.example.Missing\"\n",
		);
		let err = instantiate(cfg, &[]).unwrap_err();
		assert!(err.to_string().contains("com.example.Missing"));
	}

	#[test]
	fn test_providers_lists_default() {
		let entries = providers();
		let default = entries.iter().find(|entry| entry.default).unwrap();
		assert_eq!(default.name, DEFAULT_PROVIDER);
		assert!(default.accepts_configuration);
	}

	#[test]
	fn test_load_config_from_file() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("el.toml");
		fs::write(&path, "[discovery]\norder = [\"default\"]\n").unwrap();

		let cfg = load_config(Some(&path)).unwrap();
		assert_eq!(cfg.discovery.order, vec!["default"]);
		assert_eq!(load_config(None).unwrap().discovery.order.len(), 4);
	}

	#[test]
	fn test_report_json() {
		let report = LocateReport {
			provider: "a.B".into(),
			source: "services",
			chain: vec!["services"],
		};
		let json = serde_json::to_value(&report).unwrap();
		assert_eq!(json["provider"], "a.B");
		assert_eq!(json["chain"][0], "services");
	}
}
