//! Expression factory resolution.
//!
//! Walks the discovery sources in order, takes the first provider name found
//! and instantiates that provider from the active loading context. Nothing is
//! cached: every call repeats the whole walk.

use crate::context::LoadingContext;
use el_discovery::{default_sources, DiscoverySource};
use el_expression::ExpressionFactory;
use el_types::{ElError, EnvLookup, Properties};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of the discovery walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
	/// Provider name to instantiate.
	pub provider: String,
	/// Name of the source that supplied it.
	pub source: &'static str,
}

/// Resolves and instantiates expression factories.
pub struct FactoryResolver {
	sources: Vec<Box<dyn DiscoverySource>>,
	context: Option<LoadingContext>,
}

impl FactoryResolver {
	/// Resolver consulting `sources` in order.
	pub fn new(sources: Vec<Box<dyn DiscoverySource>>) -> Self {
		Self {
			sources,
			context: None,
		}
	}

	/// Standard chain reading process properties from the environment.
	pub fn standard() -> Self {
		Self::new(default_sources(Arc::new(EnvLookup)))
	}

	/// Pins the loading context instead of using the thread or global one.
	pub fn with_context(mut self, context: LoadingContext) -> Self {
		self.context = Some(context);
		self
	}

	/// Names of the configured sources, in consultation order.
	pub fn source_names(&self) -> Vec<&'static str> {
		self.sources.iter().map(|source| source.name()).collect()
	}

	fn active_context(&self) -> LoadingContext {
		self.context
			.clone()
			.or_else(LoadingContext::current)
			.unwrap_or_else(LoadingContext::global)
	}

	/// Finds the provider name without instantiating it.
	pub fn locate(&self) -> Result<Location, ElError> {
		self.locate_in(&self.active_context())
	}

	fn locate_in(&self, context: &LoadingContext) -> Result<Location, ElError> {
		for source in &self.sources {
			if let Some(provider) = source.lookup(context.resources())? {
				tracing::info!(source = source.name(), provider = %provider, "Selected expression factory provider");
				return Ok(Location {
					provider,
					source: source.name(),
				});
			}
			tracing::debug!(source = source.name(), "No provider named");
		}

		Err(ElError::Configuration(
			"No discovery source named an ExpressionFactory provider".into(),
		))
	}

	/// Resolves and instantiates the provider.
	///
	/// `configuration` is handed to the provider's configured constructor
	/// when it has one; otherwise the plain constructor is used.
	pub fn resolve(
		&self,
		configuration: Option<Arc<Properties>>,
	) -> Result<Box<dyn ExpressionFactory>, ElError> {
		self.resolve_located(configuration).map(|(_, factory)| factory)
	}

	/// Like [`resolve`](Self::resolve), also reporting where the provider came from.
	pub fn resolve_located(
		&self,
		configuration: Option<Arc<Properties>>,
	) -> Result<(Location, Box<dyn ExpressionFactory>), ElError> {
		let context = self.active_context();
		let location = self.locate_in(&context)?;
		let factory = instantiate(&context, &location.provider, configuration)?;
		Ok((location, factory))
	}
}

/// Instantiates the provider registered as `provider_name` in `context`.
pub fn instantiate(
	context: &LoadingContext,
	provider_name: &str,
	configuration: Option<Arc<Properties>>,
) -> Result<Box<dyn ExpressionFactory>, ElError> {
	let provider = context
		.registry()
		.get(provider_name)
		.ok_or_else(|| ElError::ProviderNotFound(provider_name.to_string()))?;

	let result = match (configuration, provider.configured_constructor()) {
		(Some(configuration), Some(configured)) => {
			tracing::debug!(provider = provider_name, "Constructing with configuration");
			configured(configuration)
		},
		_ => match provider.plain_constructor() {
			Some(plain) => {
				tracing::debug!(provider = provider_name, "Constructing without configuration");
				plain()
			},
			None => Err(ElError::Unsupported(
				"provider requires a configuration object".into(),
			)),
		},
	};

	result.map_err(|e| ElError::construction(provider_name, e))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::ProviderRegistry;
	use el_discovery::implementations::{
		default::DefaultSource, platform::PlatformPropertiesSource, process::ProcessPropertySource,
		services::ServiceResourceSource,
	};
	use el_discovery::{EmbeddedLoader, ResourceLoader};
	use el_expression::implementations::reference::ReferenceExpressionFactory;
	use el_expression::Provider;
	use el_types::{ElContext, ElValue, ValueType, DEFAULT_PROVIDER, PROVIDER_PROPERTY, SERVICE_RESOURCE};
	use std::any::Any;
	use std::fs;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tempfile::TempDir;

	/// Test factory recording which constructor built it.
	struct NamedFactory {
		name: &'static str,
		configuration: Option<Arc<Properties>>,
	}

	impl ExpressionFactory for NamedFactory {
		fn coerce_to_type(&self, value: &ElValue, _expected: ValueType) -> Result<ElValue, ElError> {
			Ok(value.clone())
		}

		fn create_value_expression(
			&self,
			_context: &ElContext,
			_expression: &str,
			_expected: ValueType,
		) -> Result<Box<dyn el_expression::ValueExpression>, ElError> {
			Err(ElError::Unsupported(self.name.into()))
		}

		fn create_object_value_expression(
			&self,
			_instance: ElValue,
			_expected: ValueType,
		) -> Result<Box<dyn el_expression::ValueExpression>, ElError> {
			Err(ElError::Unsupported(self.name.into()))
		}

		fn create_method_expression(
			&self,
			_context: &ElContext,
			_expression: &str,
			_expected_return: ValueType,
			_expected_params: &[ValueType],
		) -> Result<Box<dyn el_expression::MethodExpression>, ElError> {
			Err(ElError::Unsupported(self.name.into()))
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	fn my_factory() -> Result<Box<dyn ExpressionFactory>, ElError> {
		Ok(Box::new(NamedFactory {
			name: "com.example.MyFactory",
			configuration: None,
		}))
	}

	fn my_factory_with(
		configuration: Arc<Properties>,
	) -> Result<Box<dyn ExpressionFactory>, ElError> {
		Ok(Box::new(NamedFactory {
			name: "com.example.MyFactory",
			configuration: Some(configuration),
		}))
	}

	fn failing_factory() -> Result<Box<dyn ExpressionFactory>, ElError> {
		Err(ElError::Evaluation("constructor blew up".into()))
	}

	fn named(factory: &dyn ExpressionFactory) -> &NamedFactory {
		factory.as_any().downcast_ref::<NamedFactory>().unwrap()
	}

	fn context(resources: impl ResourceLoader + 'static) -> LoadingContext {
		let mut registry = ProviderRegistry::with_builtins();
		registry.register(
			"com.example.MyFactory",
			Provider::configurable(my_factory, my_factory_with),
		);
		registry.register("com.example.PlainOnly", Provider::plain(my_factory));
		registry.register(
			"com.example.ConfiguredOnly",
			Provider::configured_only(my_factory_with),
		);
		registry.register("com.example.Failing", Provider::plain(failing_factory));
		LoadingContext::new(Arc::new(registry), Arc::new(resources))
	}

	fn process_props(value: &str) -> Arc<Properties> {
		Arc::new([(PROVIDER_PROPERTY, value)].into_iter().collect())
	}

	fn standard_chain(
		platform_root: &std::path::Path,
		process: Arc<Properties>,
	) -> Vec<Box<dyn DiscoverySource>> {
		vec![
			Box::new(ServiceResourceSource::default()),
			Box::new(PlatformPropertiesSource::from_root(platform_root)),
			Box::new(ProcessPropertySource::new(process)),
			Box::new(DefaultSource::default()),
		]
	}

	fn write_platform(root: &std::path::Path, provider: &str) {
		let dir = root.join("jre").join("lib");
		fs::create_dir_all(&dir).unwrap();
		fs::write(
			dir.join("el.properties"),
			format!("{}={}\n", PROVIDER_PROPERTY, provider),
		)
		.unwrap();
	}

	#[test]
	fn test_precedence_with_all_sources_populated() {
		let root = TempDir::new().unwrap();
		write_platform(root.path(), "from.Platform");
		let resources = EmbeddedLoader::new().with_resource(SERVICE_RESOURCE, "from.Services\n");

		let resolver = FactoryResolver::new(standard_chain(root.path(), process_props("from.Process")))
			.with_context(context(resources));
		assert_eq!(
			resolver.locate().unwrap(),
			Location {
				provider: "from.Services".into(),
				source: "services",
			}
		);
	}

	#[test]
	fn test_each_source_in_turn() {
		let root = TempDir::new().unwrap();
		let empty = Arc::new(Properties::new());

		// Blank service resource falls through to the platform file
		write_platform(root.path(), "from.Platform");
		let resources = EmbeddedLoader::new().with_resource(SERVICE_RESOURCE, "  \n");
		let resolver = FactoryResolver::new(standard_chain(root.path(), process_props("from.Process")))
			.with_context(context(resources));
		assert_eq!(resolver.locate().unwrap().source, "platform");

		// No platform file: process property
		let other_root = TempDir::new().unwrap();
		let resolver =
			FactoryResolver::new(standard_chain(other_root.path(), process_props("from.Process")))
				.with_context(context(EmbeddedLoader::new()));
		let location = resolver.locate().unwrap();
		assert_eq!(location.source, "process");
		assert_eq!(location.provider, "from.Process");

		// Nothing set: default
		let resolver = FactoryResolver::new(standard_chain(other_root.path(), empty))
			.with_context(context(EmbeddedLoader::new()));
		assert_eq!(
			resolver.locate().unwrap(),
			Location {
				provider: DEFAULT_PROVIDER.into(),
				source: "default",
			}
		);
	}

	#[test]
	fn test_control_character_manifest_falls_through() {
		let root = TempDir::new().unwrap();
		write_platform(root.path(), "from.Platform");
		let resources =
			EmbeddedLoader::new().with_resource(SERVICE_RESOURCE, "\u{0}\u{1}\t\u{1f}\ncom.example.Second\n");

		let resolver = FactoryResolver::new(standard_chain(root.path(), process_props("from.Process")))
			.with_context(context(resources));
		assert_eq!(
			resolver.locate().unwrap(),
			Location {
				provider: "from.Platform".into(),
				source: "platform",
			}
		);
	}

	#[test]
	fn test_process_property_names_registered_provider() {
		let root = TempDir::new().unwrap();
		let resolver = FactoryResolver::new(standard_chain(
			root.path(),
			process_props("com.example.MyFactory"),
		))
		.with_context(context(EmbeddedLoader::new()));

		let factory = resolver.resolve(None).unwrap();
		assert_eq!(named(factory.as_ref()).name, "com.example.MyFactory");
	}

	#[test]
	fn test_all_sources_empty_yields_reference_factory() {
		let root = TempDir::new().unwrap();
		let resolver = FactoryResolver::new(standard_chain(root.path(), Arc::new(Properties::new())))
			.with_context(context(EmbeddedLoader::new()));

		let factory = resolver.resolve(None).unwrap();
		assert!(factory
			.as_any()
			.downcast_ref::<ReferenceExpressionFactory>()
			.is_some());
	}

	#[test]
	fn test_unknown_provider_error_names_it() {
		let root = TempDir::new().unwrap();
		let resolver = FactoryResolver::new(standard_chain(
			root.path(),
			process_props("com.example.DoesNotExist"),
		))
		.with_context(context(EmbeddedLoader::new()));

		let err = resolver.resolve(None).err().unwrap();
		assert!(matches!(err, ElError::ProviderNotFound(ref name) if name == "com.example.DoesNotExist"));
		assert!(err.to_string().contains("com.example.DoesNotExist"));
	}

	#[test]
	fn test_configuration_passed_through_unchanged() {
		let ctx = context(EmbeddedLoader::new());
		let configuration = Arc::new(Properties::from_iter([("k", "v")]));

		let factory =
			instantiate(&ctx, "com.example.MyFactory", Some(Arc::clone(&configuration))).unwrap();
		let built = named(factory.as_ref());
		assert!(Arc::ptr_eq(
			built.configuration.as_ref().unwrap(),
			&configuration
		));
		assert_eq!(configuration.get("k"), Some("v"));
	}

	#[test]
	fn test_configuration_without_configured_constructor() {
		let ctx = context(EmbeddedLoader::new());
		let configuration = Arc::new(Properties::from_iter([("k", "v")]));

		let factory = instantiate(&ctx, "com.example.PlainOnly", Some(configuration)).unwrap();
		assert!(named(factory.as_ref()).configuration.is_none());
	}

	#[test]
	fn test_no_configuration_uses_plain_constructor() {
		let ctx = context(EmbeddedLoader::new());
		let factory = instantiate(&ctx, "com.example.MyFactory", None).unwrap();
		assert!(named(factory.as_ref()).configuration.is_none());
	}

	#[test]
	fn test_construction_failures() {
		let ctx = context(EmbeddedLoader::new());

		let err = instantiate(&ctx, "com.example.ConfiguredOnly", None).err().unwrap();
		assert!(matches!(err, ElError::Construction { ref provider, .. } if provider == "com.example.ConfiguredOnly"));

		let err = instantiate(&ctx, "com.example.Failing", None).err().unwrap();
		assert!(err
			.to_string()
			.starts_with("Unable to create ExpressionFactory of type: com.example.Failing"));
	}

	/// Source returning a fixed answer and counting how often it is asked.
	struct CountingSource {
		answer: Option<&'static str>,
		calls: Arc<AtomicUsize>,
	}

	impl DiscoverySource for CountingSource {
		fn name(&self) -> &'static str {
			"counting"
		}

		fn lookup(&self, _resources: &dyn ResourceLoader) -> Result<Option<String>, ElError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(self.answer.map(String::from))
		}
	}

	#[test]
	fn test_later_sources_not_consulted_after_match() {
		let later_calls = Arc::new(AtomicUsize::new(0));
		let resolver = FactoryResolver::new(vec![
			Box::new(CountingSource {
				answer: Some(DEFAULT_PROVIDER),
				calls: Arc::new(AtomicUsize::new(0)),
			}),
			Box::new(CountingSource {
				answer: Some("never.Used"),
				calls: Arc::clone(&later_calls),
			}),
		])
		.with_context(context(EmbeddedLoader::new()));

		resolver.resolve(None).unwrap();
		resolver.resolve(None).unwrap();
		assert_eq!(later_calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_every_call_repeats_discovery() {
		let calls = Arc::new(AtomicUsize::new(0));
		let resolver = FactoryResolver::new(vec![Box::new(CountingSource {
			answer: Some(DEFAULT_PROVIDER),
			calls: Arc::clone(&calls),
		})])
		.with_context(context(EmbeddedLoader::new()));

		resolver.resolve(None).unwrap();
		resolver.locate().unwrap();
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_unreadable_source_stops_resolution() {
		struct BrokenSource;
		impl DiscoverySource for BrokenSource {
			fn name(&self) -> &'static str {
				"broken"
			}
			fn lookup(&self, _resources: &dyn ResourceLoader) -> Result<Option<String>, ElError> {
				Err(ElError::unreadable(
					"broken",
					std::io::Error::new(std::io::ErrorKind::Other, "boom"),
				))
			}
		}

		let resolver = FactoryResolver::new(vec![
			Box::new(BrokenSource),
			Box::new(DefaultSource::default()),
		])
		.with_context(context(EmbeddedLoader::new()));
		assert!(matches!(
			resolver.resolve(None),
			Err(ElError::SourceUnreadable { .. })
		));
	}

	#[test]
	fn test_no_source_matches() {
		let calls = Arc::new(AtomicUsize::new(0));
		let resolver = FactoryResolver::new(vec![Box::new(CountingSource { answer: None, calls })])
			.with_context(context(EmbeddedLoader::new()));
		assert!(matches!(
			resolver.locate(),
			Err(ElError::Configuration(_))
		));
	}

	#[test]
	fn test_thread_context_used_when_not_pinned() {
		let resources = EmbeddedLoader::new().with_resource(SERVICE_RESOURCE, "com.example.MyFactory");
		let ctx = context(resources);
		let _guard = ctx.enter();

		let resolver = FactoryResolver::new(vec![Box::new(ServiceResourceSource::default())]);
		let (location, factory) = resolver.resolve_located(None).unwrap();
		assert_eq!(location.source, "services");
		assert_eq!(named(factory.as_ref()).name, "com.example.MyFactory");
	}

	#[test]
	fn test_location_serializes() {
		let location = Location {
			provider: "a.B".into(),
			source: "process",
		};
		assert_eq!(
			serde_json::to_value(&location).unwrap(),
			serde_json::json!({"provider": "a.B", "source": "process"})
		);
	}
}
