//! Builds resolvers from configuration.
//!
//! Turns a `Config` into a `FactoryResolver`: discovery sources are created by
//! name from the global registry, process properties declared in the
//! configuration shadow the base lookup, and classpath roots become the
//! resource loader of the pinned loading context.

use crate::context::{LoadingContext, ProviderRegistry};
use crate::registry::get_registry;
use crate::resolver::FactoryResolver;
use el_config::Config;
use el_discovery::{ClasspathLoader, ResourceLoader};
use el_types::{ChainedLookup, EnvLookup, PropertyLookup};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a resolver.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Unknown discovery source '{name}'. Available: [{available}]")]
	UnknownSource { name: String, available: String },
}

/// Builder for constructing a `FactoryResolver` from configuration.
pub struct ResolverBuilder {
	config: Config,
	lookup: Arc<dyn PropertyLookup>,
	providers: Option<Arc<ProviderRegistry>>,
}

impl ResolverBuilder {
	/// Creates a builder reading process properties from the environment.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			lookup: Arc::new(EnvLookup),
			providers: None,
		}
	}

	/// Replaces the base process property lookup.
	pub fn with_lookup(mut self, lookup: Arc<dyn PropertyLookup>) -> Self {
		self.lookup = lookup;
		self
	}

	/// Resolves providers from `providers` instead of the global registry.
	pub fn with_providers(mut self, providers: Arc<ProviderRegistry>) -> Self {
		self.providers = Some(providers);
		self
	}

	/// Builds the resolver.
	pub fn build(self) -> Result<FactoryResolver, BuilderError> {
		let registry = get_registry();

		let lookup: Arc<dyn PropertyLookup> = if self.config.properties.is_empty() {
			self.lookup
		} else {
			Arc::new(
				ChainedLookup::new(vec![
					Arc::new(self.config.properties.clone()) as Arc<dyn PropertyLookup>
				])
				.then(self.lookup),
			)
		};

		let empty_section = toml::Value::Table(toml::map::Map::new());
		let mut sources = Vec::with_capacity(self.config.discovery.order.len());

		for name in &self.config.discovery.order {
			let factory = registry.sources.get(name).ok_or_else(|| BuilderError::UnknownSource {
				name: name.clone(),
				available: registry.source_names().join(", "),
			})?;

			let section = self
				.config
				.discovery
				.sources
				.get(name)
				.unwrap_or(&empty_section);

			match factory(section, &lookup) {
				Ok(source) => {
					tracing::info!(component = "discovery", source = %name, "Loaded");
					sources.push(source);
				},
				Err(e) => {
					tracing::error!(
						component = "discovery",
						source = %name,
						error = %e,
						"Failed to create discovery source"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create discovery source '{}': {}",
						name, e
					)));
				},
			}
		}

		let mut resolver = FactoryResolver::new(sources);

		let roots = &self.config.classpath.roots;
		if self.providers.is_some() || !roots.is_empty() {
			let providers = self
				.providers
				.unwrap_or_else(|| Arc::clone(&registry.providers));
			let resources: Arc<dyn ResourceLoader> = if roots.is_empty() {
				Arc::new(ClasspathLoader::from_env())
			} else {
				Arc::new(ClasspathLoader::new(roots.clone()))
			};
			resolver = resolver.with_context(LoadingContext::new(providers, resources));
		}

		Ok(resolver)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use el_types::{Properties, DEFAULT_PROVIDER, PROVIDER_PROPERTY, SERVICE_RESOURCE};
	use std::fs;
	use tempfile::TempDir;

	fn build(config: &str, lookup: Properties) -> Result<FactoryResolver, BuilderError> {
		let config: Config = config.parse().unwrap();
		ResolverBuilder::new(config)
			.with_lookup(Arc::new(lookup))
			.build()
	}

	#[test]
	fn test_default_order() {
		let resolver = build("", Properties::new()).unwrap();
		assert_eq!(
			resolver.source_names(),
			vec!["services", "platform", "process", "default"]
		);
	}

	#[test]
	fn test_unknown_source_lists_available() {
		let err = build("[discovery]\norder = [\"ldap\"]\n", Properties::new())
			.err()
			.unwrap();
		let message = err.to_string();
		assert!(message.contains("Unknown discovery source 'ldap'"));
		assert!(message.contains("default, platform, process, services"));
	}

	#[test]
	fn test_invalid_source_settings() {
		let err = build(
			"[discovery]\norder = [\"default\"]\n[discovery.sources.default]\nprovider = \" \"\n",
			Properties::new(),
		)
		.err()
		.unwrap();
		assert!(matches!(err, BuilderError::Config(_)));
	}

	#[test]
	fn test_config_properties_shadow_lookup() {
		let lookup: Properties = [(PROVIDER_PROPERTY, "from.Lookup")].into_iter().collect();
		let resolver = build(
			r#"
[discovery]
order = ["process", "default"]

[properties]
"javax.el.ExpressionFactory" = "from.Config"
"#,
			lookup.clone(),
		)
		.unwrap();
		assert_eq!(resolver.locate().unwrap().provider, "from.Config");

		let resolver = build("[discovery]\norder = [\"process\"]\n", lookup).unwrap();
		assert_eq!(resolver.locate().unwrap().provider, "from.Lookup");
	}

	#[test]
	fn test_classpath_roots_pin_context() {
		let root = TempDir::new().unwrap();
		let manifest = root.path().join(SERVICE_RESOURCE);
		fs::create_dir_all(manifest.parent().unwrap()).unwrap();
		fs::write(&manifest, format!("{}\n", DEFAULT_PROVIDER)).unwrap();

		let mut config: Config = "[discovery]\norder = [\"services\"]\n".parse().unwrap();
		config.classpath.roots = vec![root.path().to_path_buf()];

		let resolver = ResolverBuilder::new(config)
			.with_lookup(Arc::new(Properties::new()))
			.build()
			.unwrap();
		let (location, _factory) = resolver.resolve_located(None).unwrap();
		assert_eq!(location.source, "services");
		assert_eq!(location.provider, DEFAULT_PROVIDER);
	}

	#[test]
	fn test_custom_provider_registry() {
		let builtins = ProviderRegistry::with_builtins();
		let mut providers = ProviderRegistry::new();
		providers.register("com.example.Alias", builtins.get(DEFAULT_PROVIDER).unwrap());

		let config: Config = r#"
[discovery]
order = ["default"]
[discovery.sources.default]
provider = "com.example.Alias"
"#
		.parse()
		.unwrap();

		let resolver = ResolverBuilder::new(config)
			.with_providers(Arc::new(providers))
			.build()
			.unwrap();
		assert!(resolver.resolve(None).is_ok());
	}
}
